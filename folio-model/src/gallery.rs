//! Wire model for the ordered gallery structure submitted with a project form.
//!
//! The admin dashboard sends `imageStructure` as a JSON array where each
//! entry is either an already-hosted image (`{"type": "url", "value": ...}`)
//! or a placeholder for the next uploaded file part (`{"type": "file"}`).
//! The tag key may also be spelled `kind`.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{ModelError, Result};

/// One ordered slot of a project gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryEntry {
    /// An image that is already hosted and kept as-is.
    Url(String),
    /// A slot filled by the next uploaded payload, in arrival order.
    File,
}

impl GalleryEntry {
    pub fn url(value: impl Into<String>) -> Self {
        GalleryEntry::Url(value.into())
    }

    pub fn is_file(&self) -> bool {
        matches!(self, GalleryEntry::File)
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireEntry<'a> {
    Url { value: &'a str },
    File {},
}

impl Serialize for GalleryEntry {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match self {
            GalleryEntry::Url(value) => WireEntry::Url { value }.serialize(serializer),
            GalleryEntry::File => WireEntry::File {}.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
struct RawEntry {
    #[serde(rename = "type", alias = "kind")]
    kind: String,
    #[serde(default)]
    value: Option<Value>,
}

impl RawEntry {
    fn into_entry(self, position: usize) -> Result<GalleryEntry> {
        match self.kind.as_str() {
            "url" => match self.value {
                Some(Value::String(url)) if !url.trim().is_empty() => {
                    Ok(GalleryEntry::Url(url.trim().to_string()))
                }
                _ => Err(ModelError::InvalidStructure(format!(
                    "entry {position} is a url without a value"
                ))),
            },
            "file" => Ok(GalleryEntry::File),
            other => Err(ModelError::InvalidStructure(format!(
                "entry {position} has unknown type '{other}'"
            ))),
        }
    }
}

/// The ordered gallery declared by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageStructure {
    entries: Vec<GalleryEntry>,
}

impl ImageStructure {
    pub fn new(entries: Vec<GalleryEntry>) -> Self {
        Self { entries }
    }

    /// Parse the JSON-encoded `imageStructure` form field.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw_entries: Vec<RawEntry> = serde_json::from_str(raw)?;
        let entries = raw_entries
            .into_iter()
            .enumerate()
            .map(|(position, entry)| entry.into_entry(position))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Structure for a submission that sent files but no explicit layout.
    pub fn files_only(count: usize) -> Self {
        Self {
            entries: vec![GalleryEntry::File; count],
        }
    }

    /// Structure that keeps every existing URL in place.
    pub fn retain_all<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: urls.into_iter().map(GalleryEntry::url).collect(),
        }
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn file_slots(&self) -> usize {
        self.entries.iter().filter(|e| e.is_file()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dashboard_payload() {
        let raw = r#"[
            {"type": "url", "value": "https://cdn.example.com/a.png"},
            {"type": "file", "index": 1},
            {"kind": "url", "value": "http://localhost:5000/uploads/b.png"}
        ]"#;
        let structure = ImageStructure::parse(raw).unwrap();
        assert_eq!(
            structure.entries(),
            &[
                GalleryEntry::url("https://cdn.example.com/a.png"),
                GalleryEntry::File,
                GalleryEntry::url("http://localhost:5000/uploads/b.png"),
            ]
        );
        assert_eq!(structure.file_slots(), 1);
    }

    #[test]
    fn rejects_non_array_payloads() {
        assert!(matches!(
            ImageStructure::parse(r#"{"type":"file"}"#),
            Err(ModelError::Json(_))
        ));
        assert!(matches!(
            ImageStructure::parse("not json"),
            Err(ModelError::Json(_))
        ));
    }

    #[test]
    fn rejects_url_entries_without_string_value() {
        for raw in [
            r#"[{"type":"url"}]"#,
            r#"[{"type":"url","value":"  "}]"#,
            r#"[{"type":"url","value":42}]"#,
        ] {
            assert!(matches!(
                ImageStructure::parse(raw),
                Err(ModelError::InvalidStructure(_))
            ));
        }
    }

    #[test]
    fn rejects_unknown_entry_type() {
        let err = ImageStructure::parse(r#"[{"type":"video"}]"#).unwrap_err();
        assert!(err.to_string().contains("unknown type 'video'"));
    }
}
