use serde_json::{Map, Value};

/// Entity kind of a normalized hit. Variant order is also the context
/// section order: structured records first, then notes, then file chunks.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum HitKind {
	Person,
	Company,
	Note,
	Document,
}
impl HitKind {
	pub const ALL: [Self; 4] = [Self::Person, Self::Company, Self::Note, Self::Document];

	pub fn tag_prefix(self) -> &'static str {
		match self {
			Self::Person => "person",
			Self::Company => "company",
			Self::Note => "note",
			Self::Document => "document",
		}
	}

	pub fn section_header(self) -> &'static str {
		match self {
			Self::Person => "=== PEOPLE (Database Records) ===",
			Self::Company => "=== COMPANIES (Database Records) ===",
			Self::Note => "=== INTERNAL NOTES ===",
			Self::Document => "=== DOCUMENTS (Uploaded Files) ===",
		}
	}
}

/// One search request against one backend, already scoped to that
/// backend's field layout.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BackendQuery {
	pub backend_id: String,
	pub query_text: String,
	pub fields: Vec<String>,
	pub limit: usize,
}

/// Backend-native hit. Scores are on the backend's own scale and must not
/// be compared across backends.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RawHit {
	pub backend_id: String,
	pub source_id: String,
	pub score: f32,
	pub fields: Map<String, Value>,
	pub snippet: Option<String>,
}

/// Backend-agnostic hit shape consumed by synthesis. `rank_score` is
/// normalized within one backend response (0..1) and is only meaningful
/// for intra-backend ordering and top-K selection.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NormalizedHit {
	pub kind: HitKind,
	pub source_id: String,
	pub display_title: String,
	pub rank_score: f32,
	pub metadata: Vec<(String, String)>,
	pub snippet: Option<String>,
}
impl NormalizedHit {
	/// Citation tag used in the serialized context and expected back from
	/// the generator, e.g. `person:7f3a` or `document:d41`.
	pub fn source_tag(&self) -> String {
		format!("{}:{}", self.kind.tag_prefix(), self.source_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn kind_order_matches_context_layout() {
		let mut kinds = HitKind::ALL.to_vec();

		kinds.sort();

		assert_eq!(kinds, vec![HitKind::Person, HitKind::Company, HitKind::Note, HitKind::Document]);
	}

	#[test]
	fn source_tag_joins_prefix_and_id() {
		let hit = NormalizedHit {
			kind: HitKind::Document,
			source_id: "d41".to_string(),
			display_title: "Q3 roster".to_string(),
			rank_score: 1.0,
			metadata: Vec::new(),
			snippet: None,
		};

		assert_eq!(hit.source_tag(), "document:d41");
	}
}
