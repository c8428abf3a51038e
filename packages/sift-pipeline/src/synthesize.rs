use std::collections::BTreeMap;

use sift_domain::{ContextWindow, HitKind, NormalizedHit};

/// Builds the bounded context window: fixed group order, per-group dedup
/// and top-K, then whole-entry truncation until the serialization fits the
/// budget. Pure and deterministic; identical inputs produce byte-identical
/// output.
pub fn synthesize(
	hits_by_kind: &BTreeMap<HitKind, Vec<NormalizedHit>>,
	top_k: usize,
	budget: usize,
) -> ContextWindow {
	let mut sections = Vec::new();

	for kind in HitKind::ALL {
		let Some(hits) = hits_by_kind.get(&kind) else {
			continue;
		};
		let mut selected = dedup_by_source(hits);

		selected.truncate(top_k);

		if !selected.is_empty() {
			sections.push((kind, selected));
		}
	}

	let mut window = ContextWindow { sections, budget };

	while window.char_len() > budget {
		if !drop_lowest_priority_entry(&mut window) {
			break;
		}
	}

	window
}

/// Keeps one entry per source, preferring the higher-ranked occurrence
/// while preserving the position of the first one.
fn dedup_by_source(hits: &[NormalizedHit]) -> Vec<NormalizedHit> {
	let mut deduped: Vec<NormalizedHit> = Vec::with_capacity(hits.len());

	for hit in hits {
		match deduped.iter_mut().find(|kept| kept.source_id == hit.source_id) {
			Some(kept) => {
				if hit.rank_score > kept.rank_score {
					*kept = hit.clone();
				}
			},
			None => deduped.push(hit.clone()),
		}
	}

	deduped
}

/// Drops the single lowest-priority entry: last group first, lowest rank
/// within that group first. Returns false once the window is empty.
fn drop_lowest_priority_entry(window: &mut ContextWindow) -> bool {
	let Some((_, hits)) = window.sections.iter_mut().rev().find(|(_, hits)| !hits.is_empty())
	else {
		return false;
	};
	let mut lowest = 0;

	for index in 1..hits.len() {
		// `<=` prefers the later entry on ties, matching native order.
		if hits[index].rank_score <= hits[lowest].rank_score {
			lowest = index;
		}
	}

	hits.remove(lowest);
	window.sections.retain(|(_, hits)| !hits.is_empty());

	true
}
