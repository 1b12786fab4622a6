use std::collections::HashMap;

use indexmap::IndexMap;

use super::{List, Status, Tags};
use crate::Query;

struct Variant {
    tags: Tags,
    statuses: HashMap<Query, Status>,
}

impl List {
    /// Returns the smallest tag combinations that still tell the results apart.
    ///
    /// Starting from the exact tags of each result, every set in `tag_sets` is
    /// tried in order: its tags are removed from all variants at once, and the
    /// removal is kept only if every variant still describes the same statuses
    /// as the results matching the reduced tags. Variants that collapse onto
    /// another variant are dropped.
    ///
    /// The search is greedy, so the order of `tag_sets` matters.
    pub fn minimal_variant_tags(&self, tag_sets: &[Tags]) -> Vec<Tags> {
        let mut by_tags: IndexMap<&Tags, HashMap<Query, Status>> = IndexMap::new();
        for r in self.iter() {
            by_tags
                .entry(&r.tags)
                .or_default()
                .insert(r.query.clone(), r.status);
        }
        let mut variants: Vec<Variant> = by_tags
            .into_iter()
            .map(|(tags, statuses)| Variant {
                tags: tags.clone(),
                statuses,
            })
            .collect();

        for set in tag_sets {
            let Some(reduced) = self.try_remove_tags(&variants, set) else {
                continue;
            };
            for (variant, tags) in variants.iter_mut().zip(reduced) {
                variant.tags = tags;
            }
            variants = fold(variants);
        }

        variants.into_iter().map(|v| v.tags).collect()
    }

    /// The reduced tags of every variant, or `None` if removing `set` from any
    /// variant would change the statuses it describes.
    fn try_remove_tags(&self, variants: &[Variant], set: &Tags) -> Option<Vec<Tags>> {
        let mut reduced = Vec::with_capacity(variants.len());
        for variant in variants {
            let mut tags = variant.tags.clone();
            if tags.contains_any(set) {
                tags.remove_all(set);
                if !self.describes(variant, &tags) {
                    return None;
                }
            }
            reduced.push(tags);
        }
        Some(reduced)
    }

    /// True if every result matching `tags` agrees with `variant`.
    fn describes(&self, variant: &Variant, tags: &Tags) -> bool {
        self.iter()
            .filter(|r| r.tags.contains_all(tags))
            .all(|r| variant.statuses.get(&r.query) == Some(&r.status))
    }
}

/// Drops every variant whose tags include all the tags of a variant with
/// fewer (or equally many) tags that was kept before it.
fn fold(mut variants: Vec<Variant>) -> Vec<Variant> {
    variants.sort_by_key(|v| v.tags.len());
    let mut kept: Vec<Variant> = Vec::with_capacity(variants.len());
    for variant in variants {
        if !kept.iter().any(|k| variant.tags.contains_all(&k.tags)) {
            kept.push(variant);
        }
    }
    kept
}
