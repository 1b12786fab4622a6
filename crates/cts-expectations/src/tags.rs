//! Tag sets declared in the header of an expectation document.

use indexmap::IndexMap;

use cts_core::Tags;

/// A named group of mutually exclusive tags, such as the operating systems.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    pub name: String,
    /// Tags in declaration order. Later tags have higher priority.
    pub tags: Tags,
}

/// The set a tag belongs to and its priority within that set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPriority {
    pub set: String,
    pub priority: usize,
}

/// All tag sets of a document, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagHeader {
    pub sets: Vec<TagSet>,
    pub by_name: IndexMap<String, TagPriority>,
}

impl TagHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a tag set. `tags` is in increasing order of priority.
    pub fn add_set(&mut self, name: impl Into<String>, tags: Vec<String>) {
        let name = name.into();
        for (priority, tag) in tags.iter().enumerate() {
            self.by_name.insert(
                tag.clone(),
                TagPriority {
                    set: name.clone(),
                    priority,
                },
            );
        }
        self.sets.push(TagSet {
            name,
            tags: Tags::new(tags),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.by_name.contains_key(tag)
    }

    /// The tag sets, most recently declared first.
    pub fn reversed_sets(&self) -> Vec<Tags> {
        self.sets.iter().rev().map(|s| s.tags.clone()).collect()
    }

    /// Keeps only the tags declared by some set.
    pub fn remove_unknown_tags(&self, tags: &Tags) -> Tags {
        let mut out = tags.clone();
        out.retain(|t| self.contains(t));
        out
    }

    /// Keeps, for each tag set, only the highest priority tag present.
    ///
    /// Undeclared tags are dropped.
    pub fn remove_lower_priority_tags(&self, tags: &Tags) -> Tags {
        let mut best: IndexMap<&str, (&str, usize)> = IndexMap::new();
        for tag in tags {
            let Some(tp) = self.by_name.get(tag) else {
                continue;
            };
            let entry = best.entry(tp.set.as_str()).or_insert((tag.as_str(), tp.priority));
            if tp.priority > entry.1 {
                *entry = (tag.as_str(), tp.priority);
            }
        }
        best.into_values().map(|(tag, _)| tag).collect()
    }

    /// True if some declared set has members on both sides that differ.
    ///
    /// Such tags can never describe the same configuration.
    pub fn are_disjoint(&self, a: &Tags, b: &Tags) -> bool {
        self.sets.iter().any(|set| {
            let a = a.intersection(&set.tags);
            let b = b.intersection(&set.tags);
            !a.is_empty() && !b.is_empty() && a != b
        })
    }
}
