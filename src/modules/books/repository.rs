//! Storage seam for books.
//!
//! Handlers talk to a [`BookRepository`]; production wires in
//! [`MySqlBookRepository`], tests and `serve --in-memory` use
//! [`InMemoryBookRepository`].

use std::sync::Mutex;

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use sqlx::mysql::MySqlPool;

use super::models::{Book, BookChanges, BookId, NewBook};

/// One SQL statement per operation; no transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// All books, newest first.
    async fn list(&self) -> anyhow::Result<Vec<Book>>;

    async fn find(&self, id: BookId) -> anyhow::Result<Option<Book>>;

    async fn create(&self, book: NewBook) -> anyhow::Result<()>;

    /// Replace every editable field. A missing id is not an error.
    async fn update(&self, id: BookId, changes: BookChanges) -> anyhow::Result<()>;

    /// Hard delete. A missing id is not an error.
    async fn delete(&self, id: BookId) -> anyhow::Result<()>;
}

const SELECT_COLUMNS: &str =
    "SELECT id, uuid, title, author, year, isbn, category, status, created_at, updated_at FROM books";

pub struct MySqlBookRepository {
    pool: MySqlPool,
}

impl MySqlBookRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for MySqlBookRepository {
    async fn list(&self) -> anyhow::Result<Vec<Book>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Book>(&sql)
            .fetch_all(&self.pool)
            .await
            .context("failed to list books")
    }

    async fn find(&self, id: BookId) -> anyhow::Result<Option<Book>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to fetch book {id}"))
    }

    async fn create(&self, book: NewBook) -> anyhow::Result<()> {
        let NewBook {
            uuid,
            fields,
            created_at,
            updated_at,
        } = book;

        sqlx::query(
            "INSERT INTO books \
             (uuid, title, author, year, isbn, category, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&uuid)
        .bind(fields.title)
        .bind(fields.author)
        .bind(fields.year)
        .bind(fields.isbn)
        .bind(fields.category)
        .bind(fields.status)
        .bind(created_at)
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to insert book {uuid}"))?;

        Ok(())
    }

    async fn update(&self, id: BookId, changes: BookChanges) -> anyhow::Result<()> {
        let BookChanges { fields, updated_at } = changes;

        sqlx::query(
            "UPDATE books SET title = ?, author = ?, year = ?, isbn = ?, category = ?, \
             status = ?, updated_at = ? WHERE id = ?",
        )
        .bind(fields.title)
        .bind(fields.author)
        .bind(fields.year)
        .bind(fields.isbn)
        .bind(fields.category)
        .bind(fields.status)
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to update book {id}"))?;

        Ok(())
    }

    async fn delete(&self, id: BookId) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete book {id}"))?;

        Ok(())
    }
}

#[derive(Default)]
struct Store {
    last_id: BookId,
    books: Vec<Book>,
}

/// Process-local repository with the same contract as the MySQL table,
/// including its NOT NULL constraints on `title` and `author`.
#[derive(Default)]
pub struct InMemoryBookRepository {
    store: Mutex<Store>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_store<T>(&self, f: impl FnOnce(&mut Store) -> anyhow::Result<T>) -> anyhow::Result<T> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| anyhow!("book store lock poisoned"))?;
        f(&mut store)
    }
}

fn required(value: Option<String>, column: &str) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => bail!("Column '{column}' cannot be null"),
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn list(&self) -> anyhow::Result<Vec<Book>> {
        self.with_store(|store| {
            let mut books = store.books.clone();
            books.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            });
            Ok(books)
        })
    }

    async fn find(&self, id: BookId) -> anyhow::Result<Option<Book>> {
        self.with_store(|store| Ok(store.books.iter().find(|book| book.id == id).cloned()))
    }

    async fn create(&self, book: NewBook) -> anyhow::Result<()> {
        let NewBook {
            uuid,
            fields,
            created_at,
            updated_at,
        } = book;
        let title = required(fields.title, "title")?;
        let author = required(fields.author, "author")?;

        self.with_store(|store| {
            if store.books.iter().any(|existing| existing.uuid == uuid) {
                bail!("Duplicate entry '{uuid}' for key 'uuid'");
            }
            store.last_id += 1;
            store.books.push(Book {
                id: store.last_id,
                uuid,
                title,
                author,
                year: fields.year,
                isbn: fields.isbn,
                category: fields.category,
                status: fields.status,
                created_at,
                updated_at,
            });
            Ok(())
        })
    }

    async fn update(&self, id: BookId, changes: BookChanges) -> anyhow::Result<()> {
        let BookChanges { fields, updated_at } = changes;
        let title = required(fields.title, "title")?;
        let author = required(fields.author, "author")?;

        self.with_store(|store| {
            if let Some(book) = store.books.iter_mut().find(|book| book.id == id) {
                book.title = title;
                book.author = author;
                book.year = fields.year;
                book.isbn = fields.isbn;
                book.category = fields.category;
                book.status = fields.status;
                book.updated_at = updated_at;
            }
            Ok(())
        })
    }

    async fn delete(&self, id: BookId) -> anyhow::Result<()> {
        self.with_store(|store| {
            store.books.retain(|book| book.id != id);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::models::BookForm;
    use chrono::{Duration, Utc};

    fn form(title: &str) -> BookForm {
        BookForm {
            title: Some(title.to_string()),
            author: Some("B".to_string()),
            year: Some(2020),
            isbn: Some("X".to_string()),
            category: Some("C".to_string()),
            status: Some("available".to_string()),
        }
    }

    #[tokio::test]
    async fn create_then_list_returns_the_book() {
        let repository = InMemoryBookRepository::new();
        let new_book = NewBook::from_form(form("A"));
        let uuid = new_book.uuid.clone();
        repository.create(new_book).await.unwrap();

        let books = repository.list().await.unwrap();
        assert_eq!(books.len(), 1);
        let book = &books[0];
        assert_eq!(book.id, 1);
        assert_eq!(book.uuid, uuid);
        assert_eq!(book.title, "A");
        assert_eq!(book.author, "B");
        assert_eq!(book.year, Some(2020));
        assert_eq!(book.isbn.as_deref(), Some("X"));
        assert_eq!(book.category.as_deref(), Some("C"));
        assert_eq!(book.status.as_deref(), Some("available"));
        assert_eq!(book.created_at, book.updated_at);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let repository = InMemoryBookRepository::new();
        let mut first = NewBook::from_form(form("B1"));
        first.created_at = Utc::now() - Duration::seconds(10);
        repository.create(first).await.unwrap();
        repository.create(NewBook::from_form(form("B2"))).await.unwrap();

        let titles: Vec<_> = repository
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|book| book.title)
            .collect();
        assert_eq!(titles, vec!["B2", "B1"]);
    }

    #[tokio::test]
    async fn same_timestamp_orders_by_id_descending() {
        let repository = InMemoryBookRepository::new();
        let first = NewBook::from_form(form("B1"));
        let mut second = NewBook::from_form(form("B2"));
        second.created_at = first.created_at;
        repository.create(first).await.unwrap();
        repository.create(second).await.unwrap();

        let books = repository.list().await.unwrap();
        assert_eq!(books[0].title, "B2");
        assert_eq!(books[1].title, "B1");
    }

    #[tokio::test]
    async fn missing_title_violates_not_null() {
        let repository = InMemoryBookRepository::new();
        let err = repository
            .create(NewBook::from_form(BookForm::default()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Column 'title' cannot be null");
        assert!(repository.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_identity() {
        let repository = InMemoryBookRepository::new();
        repository.create(NewBook::from_form(form("A"))).await.unwrap();
        let before = repository.find(1).await.unwrap().unwrap();

        let mut changes = BookChanges::from_form(BookForm {
            title: Some("A2".into()),
            author: Some("B2".into()),
            year: None,
            isbn: Some("Y".into()),
            category: Some("D".into()),
            status: Some("borrowed".into()),
        });
        changes.updated_at = before.updated_at + Duration::seconds(1);
        repository.update(1, changes.clone()).await.unwrap();

        let after = repository.find(1).await.unwrap().unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.uuid, before.uuid);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.updated_at, changes.updated_at);
        assert_eq!(after.title, "A2");
        assert_eq!(after.author, "B2");
        assert_eq!(after.year, None);
        assert_eq!(after.isbn.as_deref(), Some("Y"));
        assert_eq!(after.category.as_deref(), Some("D"));
        assert_eq!(after.status.as_deref(), Some("borrowed"));
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_id_succeed() {
        let repository = InMemoryBookRepository::new();
        repository
            .update(99, BookChanges::from_form(form("A")))
            .await
            .unwrap();
        repository.delete(99).await.unwrap();
        assert!(repository.find(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let repository = InMemoryBookRepository::new();
        repository.create(NewBook::from_form(form("A"))).await.unwrap();
        repository.create(NewBook::from_form(form("B"))).await.unwrap();

        repository.delete(1).await.unwrap();
        repository.delete(1).await.unwrap();

        let books = repository.list().await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "B");
    }
}
