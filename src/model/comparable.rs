use serde::{Deserialize, Serialize};

/// One option being evaluated. Identity is its position in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparable {
    pub name: String,

    /// Link with more information about this option
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Comparable {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            image_url: None,
        }
    }

    pub fn merge(&mut self, patch: ComparablePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = image_url;
        }
    }
}

/// Partial update for a comparable.
///
/// For the optional links, `Some(None)` clears the field and `None` leaves it
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparablePatch {
    pub name: Option<String>,
    pub url: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
}

impl ComparablePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none() && self.image_url.is_none()
    }
}
