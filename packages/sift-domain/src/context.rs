use std::collections::BTreeSet;

use crate::hit::{HitKind, NormalizedHit};

/// Bounded, serialized evidence payload handed to the generation stage.
/// Invariant: `serialize().chars().count() <= budget`, maintained by the
/// synthesis stage which only ever drops whole entries.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ContextWindow {
	pub sections: Vec<(HitKind, Vec<NormalizedHit>)>,
	pub budget: usize,
}

impl ContextWindow {
	pub fn empty(budget: usize) -> Self {
		Self { sections: Vec::new(), budget }
	}

	pub fn is_empty(&self) -> bool {
		self.sections.iter().all(|(_, hits)| hits.is_empty())
	}

	pub fn entry_count(&self) -> usize {
		self.sections.iter().map(|(_, hits)| hits.len()).sum()
	}

	/// Source tags of every entry, for validating generator citations.
	pub fn source_tags(&self) -> BTreeSet<String> {
		self.sections
			.iter()
			.flat_map(|(_, hits)| hits.iter().map(NormalizedHit::source_tag))
			.collect()
	}

	/// Deterministic rendering: section order is fixed by `HitKind`,
	/// entries keep their stored order, no timestamps or randomness.
	pub fn serialize(&self) -> String {
		let blocks: Vec<String> = self
			.sections
			.iter()
			.filter(|(_, hits)| !hits.is_empty())
			.map(|(kind, hits)| {
				let entries: Vec<String> = hits.iter().map(render_entry).collect();

				format!("{}\n{}", kind.section_header(), entries.join("\n\n"))
			})
			.collect();

		blocks.join("\n\n")
	}

	pub fn char_len(&self) -> usize {
		self.serialize().chars().count()
	}
}

/// One context entry: a tag-and-title line, labeled metadata lines, then
/// the snippet if the backend produced one.
pub fn render_entry(hit: &NormalizedHit) -> String {
	let mut lines = vec![format!("[{}] {}", hit.source_tag(), hit.display_title)];

	for (label, value) in &hit.metadata {
		lines.push(format!("  - {label}: {value}"));
	}

	if let Some(snippet) = &hit.snippet {
		lines.push(format!("  {snippet}"));
	}

	lines.join("\n")
}
