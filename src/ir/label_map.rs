//! Class-name to category-id mapping.

use std::collections::HashMap;

use super::ids::CategoryId;

/// Reserved name for id 0.
pub const BACKGROUND: &str = "background";

/// Built-in classes used when no label map file is given, in id order
/// starting at 1.
pub const DEFAULT_CLASSES: [&str; 8] = [
    "LGlove", "RGlove", "Shirt", "Gown", "Pants", "Hat", "Mask", "Body",
];

/// Ordered mapping from class name to [`CategoryId`].
///
/// Iteration follows first-insertion order, which is also the order the
/// COCO sidecar lists categories in.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelMap {
    entries: Vec<(String, CategoryId)>,
    index: HashMap<String, usize>,
}

impl LabelMap {
    /// Builds `{background: 0}` followed by `classes` numbered from 1 by
    /// position.
    ///
    /// A repeated name keeps its first position but takes the id of its
    /// last occurrence.
    pub fn from_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        map.insert(BACKGROUND.to_string(), CategoryId(0));
        for (i, name) in classes.into_iter().enumerate() {
            map.insert(name.into(), CategoryId((i + 1) as u64));
        }
        map
    }

    fn insert(&mut self, name: String, id: CategoryId) {
        match self.index.get(&name) {
            Some(&pos) => self.entries[pos].1 = id,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, id));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<CategoryId> {
        self.index.get(name).map(|&pos| self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, CategoryId)> {
        self.entries.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::from_classes(DEFAULT_CLASSES)
    }
}
