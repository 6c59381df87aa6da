//! Project audit record.
//!
//! A project is kept as the JSON object it was submitted as. The backend only
//! reads a handful of fields through accessors and never rewrites the
//! document, so explicit `null`s and unknown nested fields are stored and
//! returned exactly as received.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A project audit document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct Project {
    fields: Map<String, Value>,
}

impl Project {
    /// Email of the first user entry, the owner key.
    pub fn owner_email(&self) -> Option<&str> {
        self.fields
            .get("user")?
            .as_array()?
            .first()?
            .get("email")?
            .as_str()
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.get("details")?.get("name")?.as_str()
    }

    /// Whether this project is `name` owned by `owner_email`. Case-sensitive.
    pub fn is(&self, owner_email: &str, name: &str) -> bool {
        self.owner_email() == Some(owner_email) && self.name() == Some(name)
    }

    /// Language names declared under `architecture.languages`, if that is an object.
    ///
    /// Main language first, then `others` in order. Non-string values are skipped.
    pub fn languages(&self) -> Option<Vec<String>> {
        let languages = self
            .fields
            .get("architecture")?
            .get("languages")?
            .as_object()?;

        let main = languages.get("main").and_then(Value::as_str);
        let others = languages
            .get("others")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str);

        Some(main.into_iter().chain(others).map(str::to_string).collect())
    }
}

/// Persisted layout of the project collection.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectsDocument {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
