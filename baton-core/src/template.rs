//! Template domain type
//!
//! Templates carry text with `{{key}}` placeholders. Rendering is an
//! external collaborator concern; the engine only references templates by id
//! through the [`crate::orchestration::collaborators::TemplateEngine`]
//! boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A named body of text with `{{key}}` placeholders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Template {
    /// Create a new template with validation
    pub fn new<S1, S2, S3>(id: S1, name: S2, content: S3) -> Result<Self>
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::validation("Template id cannot be empty"));
        }
        Ok(Self {
            id,
            name: name.into(),
            content: content.into(),
            created_at: Utc::now(),
        })
    }

    /// Placeholder keys referenced by the template body, in order of first
    /// appearance
    pub fn placeholder_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        let mut rest = self.content.as_str();
        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = after[..end].trim().to_string();
                    if !key.is_empty() && !keys.contains(&key) {
                        keys.push(key);
                    }
                    rest = &after[end + 2..];
                }
                None => break,
            }
        }
        keys
    }
}
