//! Font descriptor record as stored in the catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One font family: its name, category and the URL of every variant file.
///
/// The JSON shape follows the provider listing, so the variant map lives under
/// `files` (e.g. `{"regular": "https://...", "700": "https://..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub family: String,
    #[serde(default)]
    pub category: String,
    /// Variant id -> absolute URL of the font file.
    #[serde(rename = "files", default)]
    pub variants: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subsets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(
        rename = "lastModified",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl FontDescriptor {
    /// URL of `variant`, if this family has it.
    pub fn variant_url(&self, variant: &str) -> Option<&str> {
        self.variants.get(variant).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_provider_shape() {
        let json = r#"{
            "kind": "webfonts#webfont",
            "family": "Open Sans",
            "category": "sans-serif",
            "variants": ["regular", "700"],
            "subsets": ["latin"],
            "version": "v40",
            "lastModified": "2024-05-02",
            "files": {
                "regular": "https://fonts.gstatic.com/s/opensans/v40/regular.ttf",
                "700": "https://fonts.gstatic.com/s/opensans/v40/700.ttf"
            }
        }"#;
        let d: FontDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.family, "Open Sans");
        assert_eq!(d.category, "sans-serif");
        assert_eq!(d.variants.len(), 2);
        assert_eq!(
            d.variant_url("700"),
            Some("https://fonts.gstatic.com/s/opensans/v40/700.ttf")
        );
        assert_eq!(d.last_modified.as_deref(), Some("2024-05-02"));
        assert!(d.variant_url("italic").is_none());
    }

    #[test]
    fn minimal_record_with_no_files_is_valid() {
        let d: FontDescriptor = serde_json::from_str(r#"{"family": "Empty"}"#).unwrap();
        assert!(d.variants.is_empty());
        assert!(d.category.is_empty());
    }
}
