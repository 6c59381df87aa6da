//! Autocomplete tag categories and the persisted registry document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A category of autocomplete suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagCategory {
    Languages,
    Ides,
    Misc,
}

impl TagCategory {
    pub const ALL: [TagCategory; 3] = [TagCategory::Languages, TagCategory::Ides, TagCategory::Misc];

    /// Key of this category in the registry document.
    pub fn as_str(&self) -> &'static str {
        match self {
            TagCategory::Languages => "languages",
            TagCategory::Ides => "IDEs",
            TagCategory::Misc => "misc",
        }
    }

    /// Parse a category name. Matching is exact, so `ides` is not `IDEs`.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl std::fmt::Display for TagCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted registry: category name to its list of entries.
///
/// Keys other than the known three, and values that are not lists of
/// strings, are kept as stored.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(transparent)]
pub struct TagDocument {
    pub categories: Map<String, Value>,
}

impl TagDocument {
    /// String entries of `category`, or `None` if it is absent or not a list.
    pub fn entries(&self, category: TagCategory) -> Option<Vec<&str>> {
        let items = self.categories.get(category.as_str())?.as_array()?;
        Some(items.iter().filter_map(Value::as_str).collect())
    }

    /// Remove and return the stored list of `category`.
    ///
    /// A missing category, or one that is not a list, yields an empty list.
    pub fn take_entries(&mut self, category: TagCategory) -> Vec<Value> {
        match self.categories.remove(category.as_str()) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                tracing::warn!("Replacing non-list {} entry: {}", category, other);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    pub fn set_entries(&mut self, category: TagCategory, items: Vec<Value>) {
        self.categories
            .insert(category.as_str().to_string(), Value::Array(items));
    }
}
