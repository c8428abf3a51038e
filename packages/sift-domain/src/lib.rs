mod context;
mod conversation;
mod hit;
mod plan;

pub use context::{ContextWindow, render_entry};
pub use conversation::{ConversationTurn, Role, bounded_tail};
pub use hit::{BackendQuery, HitKind, NormalizedHit, RawHit};
pub use plan::QueryPlan;

use std::collections::BTreeSet;

/// Final answer produced by the generation stage. `cited_sources` holds the
/// source tags the model referenced, restricted to tags that were actually
/// present in the context window.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Answer {
	pub text: String,
	pub cited_sources: BTreeSet<String>,
}
