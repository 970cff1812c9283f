//! Document records persisted by the store

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used when a document is saved without one
pub const UNTITLED_TITLE: &str = "Adsız Belge";

/// Kind of a document entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Doc,
    Sheet,
    Slide,
    Pdf,
    Folder,
}

/// A stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    /// Preview image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Serialized rich-text markup
    pub content: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    /// Last write time, stamped by the store
    pub last_modified: String,
    pub icon: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_shared: Option<bool>,
}

impl Document {
    /// Create a plain document with the editor defaults
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            thumbnail: None,
            content: content.into(),
            kind: DocumentKind::Doc,
            last_modified: String::new(),
            icon: "description".to_string(),
            color: "text-blue-600".to_string(),
            is_shared: Some(false),
        }
    }

    /// Title shown in lists, falling back to the placeholder
    pub fn display_title(&self) -> &str {
        let trimmed = self.title.trim();
        if trimmed.is_empty() {
            UNTITLED_TITLE
        } else {
            trimmed
        }
    }

    pub fn is_shared(&self) -> bool {
        self.is_shared.unwrap_or(false)
    }

    pub fn is_folder(&self) -> bool {
        self.kind == DocumentKind::Folder
    }

    /// Parse `last_modified`, accepting RFC 3339 and the zone-less seed form
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.last_modified) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.last_modified, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Short day-month label, e.g. "25 Eki"
    pub fn modified_label(&self) -> String {
        const MONTHS: [&str; 12] = [
            "Oca", "Şub", "Mar", "Nis", "May", "Haz", "Tem", "Ağu", "Eyl", "Eki", "Kas", "Ara",
        ];
        match self.modified_at() {
            Some(dt) => format!("{} {}", dt.day(), MONTHS[dt.month0() as usize]),
            None => String::new(),
        }
    }
}

/// Documents written on first launch
pub fn seed_documents() -> Vec<Document> {
    vec![
        Document {
            id: "1".to_string(),
            title: "Q3 Pazarlama Raporu".to_string(),
            thumbnail: Some("https://lh3.googleusercontent.com/aida-public/AB6AXuA9Un0QYcd1tC_IZhojvmymz__FME1oCaLImysXeeoyQ6qQwKG1Ev14k2hhutnF8NOJLL96sahA3KJiLuy0XVYYeIE31Ojnjb7JzqOxUhvwdVglX9JC5X7RTzJemUY8MT5ZhizM1qLV9alzxbcdlK5oJ6X6uIH8X0Nj_BlYzFDakH462fMyZrXl5ZugnUYQ4wpfz_iQ0JtSQEf8C-kvgHeJ0dQxLXhyDPCsMhY-zm_TaXO-tVzao0D5K527nLPgWGK9prxg6AeJk_s".to_string()),
            content: "<p>Bu rapor, 3. çeyrek pazarlama verilerini içermektedir.</p>".to_string(),
            kind: DocumentKind::Doc,
            last_modified: "2023-10-25T14:30:00".to_string(),
            icon: "description".to_string(),
            color: "text-blue-600".to_string(),
            is_shared: Some(true),
        },
        Document {
            id: "2".to_string(),
            title: "Proje Teklifi - Acme".to_string(),
            thumbnail: Some("https://lh3.googleusercontent.com/aida-public/AB6AXuDSwFsTo333pNws5Y1awKYbXItbGJSHvI3vk7VrE3LK9FHHmyxTrkalwJ6nUoaUiBcaSDZGDNh9dGwmYXjXTtAx1EKSqKz8qVQN4vKFc8FwIOOtNZchc81oPxBqxuPZSmERs0h6nNhqc160Tdu9ZQ5xLd_t-2qV9Xu2TMZf28vecM71_-xfq8NoAmZuDnBvQi98ur2rAW-VJuf-BS7fV5blhIvzhbF9Gmkb-hPhAG91483L89oRC_ox3F68VH2_IB6n_R94ecSY_b8".to_string()),
            content: "<h1>Acme Corp Proje Teklifi</h1><p>Giriş ve amaçlar...</p>".to_string(),
            kind: DocumentKind::Doc,
            last_modified: "2023-10-24T09:15:00".to_string(),
            icon: "article".to_string(),
            color: "text-orange-500".to_string(),
            is_shared: Some(false),
        },
        Document {
            id: "3".to_string(),
            title: "Marka Taslakları v2".to_string(),
            thumbnail: Some("https://lh3.googleusercontent.com/aida-public/AB6AXuAsZPv19yGTdXcCCWjAfkuPjFCKH7d4KA7eYCXE7foKKUj2Wh5lq0WjTQBJllCmtq9v9TofySH3pXhGYoMFQw4CUccXFDJkhHr5ltXGotzjjDu50Qbxo69_922Gp7px-9J1a4COwEU3eecYn5q30iWtvFd6Gf_6FiEq2TiQKYW5kDpgHZ5wQ098zlCK-vpIEfdKp6wjXFijfi8GRZNlzU_j-wwLHo8UPiR299Ovt3Yw9n-aznmOfDVYAL8EIL1T0TcOHsB_I7BYwmM".to_string()),
            content: "<p>Marka renk paleti ve logo kullanımları.</p>".to_string(),
            kind: DocumentKind::Folder,
            last_modified: "2023-10-20T11:00:00".to_string(),
            icon: "folder".to_string(),
            color: "text-purple-500".to_string(),
            is_shared: Some(true),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_field_names() {
        let doc = Document::new("42", "Plan", "<p>x</p>");
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["type"], "doc");
        assert_eq!(value["lastModified"], "");
        assert_eq!(value["isShared"], false);
        assert!(value.get("thumbnail").is_none());
    }

    #[test]
    fn test_missing_optional_fields() {
        let json = r#"{"id":"9","title":"T","content":"","type":"folder",
            "lastModified":"2023-10-20T11:00:00","icon":"folder","color":"c"}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert!(doc.is_folder());
        assert!(!doc.is_shared());
        assert!(doc.thumbnail.is_none());
    }

    #[test]
    fn test_modified_label() {
        let seeds = seed_documents();
        assert_eq!(seeds[0].modified_label(), "25 Eki");

        let mut doc = Document::new("1", "", "");
        doc.last_modified = "2024-02-03T10:00:00.123Z".to_string();
        assert_eq!(doc.modified_label(), "3 Şub");
        assert_eq!(doc.display_title(), UNTITLED_TITLE);
    }
}
