use bookshelf_db::Entity;
use serde::{Deserialize, Serialize};
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// A catalogued book.
///
/// `id` is absent on create requests and always present once persisted.
/// Every other field may be missing or `null`; the record is stored as sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    /// Serialized as `YYYY-MM-DD`
    #[serde(default, with = "iso_date::option")]
    pub published_date: Option<Date>,
}

impl Book {
    /// A fully populated book not yet persisted.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        published_date: Date,
    ) -> Self {
        Self {
            id: None,
            title: Some(title.into()),
            author: Some(author.into()),
            isbn: Some(isbn.into()),
            published_date: Some(published_date),
        }
    }
}

impl Entity for Book {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn with_id(self, id: i64) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }
}
