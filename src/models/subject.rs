//! Subject model.

use serde::{Deserialize, Serialize};

/// A subject taught at the school (e.g., Mathematics, Science).
///
/// Identity is immutable once created; name and color are freely
/// editable. The color tag is carried for the presentation layer and
/// has no scheduling semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Display color (hex string, e.g. `"#3b82f6"`).
    pub color: String,
}

impl Subject {
    /// Creates a new subject with the given ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            color: String::new(),
        }
    }

    /// Sets the subject name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}
