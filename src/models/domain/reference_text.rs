use serde::{Deserialize, Serialize};

/// Full plain-text article body used as question source material.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReferenceText {
    pub title: String,
    pub extract: String,
    pub length: usize, // in chars
    pub language: String,
}

impl ReferenceText {
    pub fn new(title: &str, extract: String, language: &str) -> Self {
        let length = extract.chars().count();
        ReferenceText {
            title: title.to_string(),
            extract,
            length,
            language: language.to_string(),
        }
    }
}
