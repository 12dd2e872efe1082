use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer};
use uuid::Uuid;

/// Database-assigned primary key of a book row.
pub type BookId = i64;

/// A persisted catalog entry.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Book {
    pub id: BookId,
    /// Assigned once at creation and never changed.
    pub uuid: String,
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub isbn: Option<String>,
    pub category: Option<String>,
    /// Free-form, e.g. "available".
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields as submitted by the add/edit form.
///
/// Every field is optional; the database decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A row about to be inserted: server-assigned identity plus form fields.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub uuid: String,
    pub fields: BookForm,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewBook {
    pub fn from_form(fields: BookForm) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4().to_string(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Replacement values for every editable field of an existing row.
#[derive(Debug, Clone, PartialEq)]
pub struct BookChanges {
    pub fields: BookForm,
    pub updated_at: DateTime<Utc>,
}

impl BookChanges {
    pub fn from_form(fields: BookForm) -> Self {
        Self {
            fields,
            updated_at: Utc::now(),
        }
    }
}

/// Parse a path segment as a book id.
pub fn parse_book_id(raw: &str) -> Option<BookId> {
    raw.trim().parse().ok()
}

// HTML number inputs submit "" when left blank.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}
