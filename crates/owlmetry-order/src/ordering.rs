//! Orderings and variants: which sequences of inputs get merged, and
//! whether the cleanup removals run afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Input-set size above which testing the full permutation group stops
/// being tractable (n! pipeline runs) and the named strategies should
/// be used instead.
pub const PERMUTATION_INPUT_LIMIT: usize = 5;

/// One tested merge order: an identifier plus the source names in the
/// sequence they are handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    pub id: String,
    pub sources: Vec<String>,
}

/// Processing path: merge only, or merge followed by the cleanup
/// removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    MergeOnly,
    WithRemoves,
}

impl Variant {
    pub const BOTH: [Variant; 2] = [Variant::MergeOnly, Variant::WithRemoves];

    pub fn include_removes(self) -> bool {
        matches!(self, Variant::WithRemoves)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::MergeOnly => "merge_only",
            Variant::WithRemoves => "with_removes",
        }
    }
}

/// All permutations of `sources`, ids `perm_01`, `perm_02`, … in
/// generation order (lexicographic in source positions).
pub fn permutations(sources: &[String]) -> Vec<Ordering> {
    let mut sequences: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::with_capacity(sources.len());
    let mut used = vec![false; sources.len()];
    permute(sources, &mut used, &mut current, &mut sequences);

    sequences
        .into_iter()
        .enumerate()
        .map(|(index, sequence)| Ordering {
            id: format!("perm_{:02}", index + 1),
            sources: sequence,
        })
        .collect()
}

fn permute(
    sources: &[String],
    used: &mut [bool],
    current: &mut Vec<String>,
    out: &mut Vec<Vec<String>>,
) {
    if current.len() == sources.len() {
        out.push(current.clone());
        return;
    }
    for index in 0..sources.len() {
        if used[index] {
            continue;
        }
        used[index] = true;
        current.push(sources[index].clone());
        permute(sources, used, current, out);
        current.pop();
        used[index] = false;
    }
}

/// The named deterministic strategies for large input sets:
/// lexicographic, the pre-declared hierarchical order, and
/// size-descending.
///
/// Hierarchy entries naming absent sources are dropped; an empty or
/// missing hierarchy declaration falls back to the lexicographic order.
/// `sizes` maps source name → byte size; unknown sources sort as zero.
pub fn named_strategies(
    sources: &[String],
    hierarchy: &[String],
    sizes: &BTreeMap<String, u64>,
) -> Vec<Ordering> {
    let mut alphabetical = sources.to_vec();
    alphabetical.sort();

    let declared: Vec<String> = hierarchy
        .iter()
        .filter(|name| sources.contains(name))
        .cloned()
        .collect();
    let hierarchical = if declared.is_empty() {
        alphabetical.clone()
    } else {
        declared
    };

    let mut by_size = sources.to_vec();
    // Largest first; name as a deterministic tie-break.
    by_size.sort_by(|a, b| {
        let size_a = sizes.get(a).copied().unwrap_or(0);
        let size_b = sizes.get(b).copied().unwrap_or(0);
        size_b.cmp(&size_a).then_with(|| a.cmp(b))
    });

    vec![
        Ordering {
            id: "alphabetical".to_string(),
            sources: alphabetical,
        },
        Ordering {
            id: "hierarchy".to_string(),
            sources: hierarchical,
        },
        Ordering {
            id: "size".to_string(),
            sources: by_size,
        },
    ]
}
