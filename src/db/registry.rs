//! Tag registry backing autocomplete.

use serde_json::Value;
use tokio::sync::Mutex;

use crate::errors::AppError;
use crate::models::{TagCategory, TagDocument};
use crate::storage::DocumentStore;

use super::TAGS_KEY;

/// Longest accepted autocomplete query, in characters.
pub const MAX_QUERY_LEN: usize = 16;

/// Categorized string lists used for autocomplete suggestions.
///
/// Every call reloads the registry document; nothing is cached between
/// requests.
pub struct TagRegistry {
    documents: DocumentStore,
    write_lock: Mutex<()>,
}

impl TagRegistry {
    pub fn new(documents: DocumentStore) -> Self {
        Self {
            documents,
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<TagDocument, AppError> {
        Ok(self.documents.load(TAGS_KEY, TagDocument::default).await?)
    }

    /// Entries of `category` that contain `query`, ignoring case, in stored order.
    pub async fn search(&self, category: &str, query: &str) -> Result<Vec<String>, AppError> {
        if category.is_empty() || query.is_empty() {
            return Err(AppError::MissingParameter(
                "type and search are required".to_string(),
            ));
        }

        let category = TagCategory::parse(category)
            .ok_or_else(|| AppError::InvalidCategory("Invalid type".to_string()))?;

        if query.chars().count() > MAX_QUERY_LEN {
            return Err(AppError::QueryTooLong(
                "Search query is too long".to_string(),
            ));
        }

        let doc = self.load().await?;
        let entries = doc.entries(category).ok_or_else(|| {
            AppError::NotFound(format!("No entries registered for type: {}", category))
        })?;

        let needle = query.to_lowercase();
        let results: Vec<String> = entries
            .into_iter()
            .filter(|entry| entry.to_lowercase().contains(&needle))
            .map(str::to_string)
            .collect();

        if results.is_empty() {
            return Err(AppError::NotFound("No matches found".to_string()));
        }
        Ok(results)
    }

    /// Add every name not already present to `languages`, lower-cased.
    ///
    /// Existing entries are lower-cased on the way through as well.
    pub async fn register_languages(&self, names: &[String]) -> Result<(), AppError> {
        if names.is_empty() {
            return Ok(());
        }

        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;

        let mut languages = doc.take_entries(TagCategory::Languages);
        for lang in languages.iter_mut() {
            if let Value::String(s) = lang {
                *s = s.to_lowercase();
            }
        }

        let mut added = 0;
        for name in names {
            let name = name.to_lowercase();
            if !languages.iter().any(|lang| lang.as_str() == Some(name.as_str())) {
                languages.push(Value::String(name));
                added += 1;
            }
        }
        doc.set_entries(TagCategory::Languages, languages);

        self.documents.save(TAGS_KEY, &doc).await?;
        tracing::info!("Registered {} new language(s)", added);
        Ok(())
    }
}
