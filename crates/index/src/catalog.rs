use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::IndexError;

/// Separator placed between the searchable fields of an [`Item`] before embedding.
pub const ITEM_TEXT_SEPARATOR: &str = " ";

/// One catalog entry. Immutable once it is part of a [`CatalogIndex`](crate::CatalogIndex).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// The text that gets embedded for this item.
    ///
    /// Name, description, category, then each tag, trimmed and joined with
    /// [`ITEM_TEXT_SEPARATOR`]. Empty fields are skipped so they never leave
    /// doubled separators behind.
    pub fn search_text(&self) -> String {
        [
            self.name.as_str(),
            self.description.as_str(),
            self.category.as_str(),
        ]
        .into_iter()
        .chain(self.tags.iter().map(String::as_str))
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect::<Vec<_>>()
        .join(ITEM_TEXT_SEPARATOR)
    }
}

/// Catalog ids show up as strings or bare numbers depending on the export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Number(serde_json::Number),
}

impl RecordId {
    fn into_string(self) -> String {
        match self {
            RecordId::Text(s) => s,
            RecordId::Number(n) => n.to_string(),
        }
    }
}

/// Tags as a JSON list or as one comma-separated cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordTags {
    List(Vec<String>),
    Csv(String),
}

impl RecordTags {
    fn into_vec(self) -> Vec<String> {
        let raw = match self {
            RecordTags::List(tags) => tags,
            RecordTags::Csv(cell) => cell.split(',').map(str::to_owned).collect(),
        };
        raw.into_iter()
            .map(|tag| tag.trim().to_owned())
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

/// A raw catalog row before validation. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogRecord {
    pub id: Option<RecordId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<RecordTags>,
}

impl CatalogRecord {
    /// Convert to an [`Item`]. `None` when the id is missing or blank.
    pub fn into_item(self) -> Option<Item> {
        let id = self.id?.into_string().trim().to_owned();
        if id.is_empty() {
            return None;
        }
        Some(Item {
            id,
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            tags: self.tags.map(RecordTags::into_vec).unwrap_or_default(),
        })
    }
}

impl From<Item> for CatalogRecord {
    fn from(item: Item) -> Self {
        Self {
            id: Some(RecordId::Text(item.id)),
            name: Some(item.name),
            description: Some(item.description),
            category: Some(item.category),
            tags: Some(RecordTags::List(item.tags)),
        }
    }
}

/// Parse a JSON array of catalog records.
pub fn parse_catalog(json: &str) -> Result<Vec<CatalogRecord>, IndexError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a JSON catalog file.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<CatalogRecord>, IndexError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| IndexError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let records = parse_catalog(&raw)?;
    tracing::debug!(path = %path.display(), records = records.len(), "catalog loaded");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn search_text_joins_fields_in_order() {
        let item = Item::new("a", "Red running shoes")
            .with_description("Lightweight trainers")
            .with_category("Footwear")
            .with_tags(["sport", "outdoor"]);
        assert_eq!(
            item.search_text(),
            "Red running shoes Lightweight trainers Footwear sport outdoor"
        );
    }

    #[test]
    fn search_text_skips_empty_fields() {
        let item = Item::new("a", "  Desk lamp ").with_tags(["", "led"]);
        assert_eq!(item.search_text(), "Desk lamp led");
        assert_eq!(Item::new("b", "").search_text(), "");
    }

    #[test]
    fn record_tags_accept_list_or_csv() {
        let records = parse_catalog(
            r#"[
                {"id": "1", "name": "Mug", "tags": ["kitchen", " ceramic "]},
                {"id": "2", "name": "Pan", "tags": "kitchen, cast iron,,"}
            ]"#,
        )
        .unwrap();
        let items: Vec<Item> = records.into_iter().filter_map(CatalogRecord::into_item).collect();
        assert_eq!(items[0].tags, vec!["kitchen", "ceramic"]);
        assert_eq!(items[1].tags, vec!["kitchen", "cast iron"]);
    }

    #[test]
    fn missing_or_blank_id_is_dropped() {
        let records = parse_catalog(
            r#"[
                {"name": "No id"},
                {"id": "   ", "name": "Blank id"},
                {"id": null, "name": "Null id"},
                {"id": "ok", "name": "Kept"}
            ]"#,
        )
        .unwrap();
        let items: Vec<Item> = records.into_iter().filter_map(CatalogRecord::into_item).collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "ok");
    }

    #[test]
    fn numeric_ids_become_strings() {
        let records = parse_catalog(r#"[{"id": 42, "name": "Answer"}]"#).unwrap();
        let item = records.into_iter().next().unwrap().into_item().unwrap();
        assert_eq!(item.id, "42");
        assert!(item.description.is_empty());
    }

    #[test]
    fn item_roundtrips_through_record() {
        let item = Item::new("x", "Chair").with_category("Office");
        let back = CatalogRecord::from(item.clone()).into_item().unwrap();
        assert_eq!(item, back);
    }

    #[test]
    fn load_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": "a", "name": "Lamp"}}]"#).unwrap();
        let records = load_catalog(file.path()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn load_catalog_reports_missing_file() {
        let err = load_catalog("/no/such/catalog.json").unwrap_err();
        assert!(matches!(err, IndexError::Io { .. }));
        assert!(err.to_string().contains("/no/such/catalog.json"));
    }

    #[test]
    fn load_catalog_rejects_non_array() {
        let err = parse_catalog(r#"{"id": "a"}"#).unwrap_err();
        assert!(matches!(err, IndexError::Json(_)));
    }
}
