//! HTML rendering for the list and form pages.

use minijinja::{context, Environment};
use serde::Serialize;

use super::models::Book;

const INDEX_TEMPLATE: &str = include_str!("../../../templates/index.html");
const FORM_TEMPLATE: &str = include_str!("../../../templates/form.html");

const LIST_TITLE: &str = "Book Catalog";
const ADD_TITLE: &str = "Add Book";
const EDIT_TITLE: &str = "Edit Book";

/// Compiled page templates. HTML auto-escaping applies to both.
pub struct Views {
    env: Environment<'static>,
}

/// Display shape of a book: absent values render as empty strings.
#[derive(Debug, Default, Serialize)]
struct BookView {
    id: String,
    uuid: String,
    title: String,
    author: String,
    year: String,
    isbn: String,
    category: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl From<&Book> for BookView {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.to_string(),
            uuid: book.uuid.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            year: book.year.map(|year| year.to_string()).unwrap_or_default(),
            isbn: book.isbn.clone().unwrap_or_default(),
            category: book.category.clone().unwrap_or_default(),
            status: book.status.clone().unwrap_or_default(),
            created_at: book.created_at.format("%Y-%m-%d %H:%M").to_string(),
            updated_at: book.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

impl Views {
    pub fn new() -> anyhow::Result<Self> {
        let mut env = Environment::new();
        env.add_template("index.html", INDEX_TEMPLATE)?;
        env.add_template("form.html", FORM_TEMPLATE)?;
        Ok(Self { env })
    }

    /// The listing page, rows in the order given.
    pub fn render_list(&self, books: &[Book]) -> anyhow::Result<String> {
        let books: Vec<BookView> = books.iter().map(BookView::from).collect();
        let page = self.env.get_template("index.html")?.render(context! {
            page_title => LIST_TITLE,
            books => books,
        })?;
        Ok(page)
    }

    /// The add form when `book` is `None`, otherwise the edit form pre-filled.
    pub fn render_form(&self, book: Option<&Book>) -> anyhow::Result<String> {
        let (page_title, view) = match book {
            Some(book) => (EDIT_TITLE, BookView::from(book)),
            None => (ADD_TITLE, BookView::default()),
        };

        let page = self.env.get_template("form.html")?.render(context! {
            page_title => page_title,
            editing => book.is_some(),
            book => view,
        })?;
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn book(id: i64, title: &str) -> Book {
        let now = Utc::now();
        Book {
            id,
            uuid: format!("uuid-{id}"),
            title: title.to_string(),
            author: "Ursula K. Le Guin".to_string(),
            year: Some(1969),
            isbn: Some("978-0441478125".to_string()),
            category: None,
            status: Some("available".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn list_renders_rows_in_order_with_actions() {
        let views = Views::new().unwrap();
        let page = views
            .render_list(&[book(2, "The Dispossessed"), book(1, "The Left Hand of Darkness")])
            .unwrap();

        let second = page.find("The Dispossessed").unwrap();
        let first = page.find("The Left Hand of Darkness").unwrap();
        assert!(second < first);
        assert!(page.contains("href=\"/edit/2\""));
        assert!(page.contains("action=\"/books/1\""));
        assert!(page.contains("name=\"_method\" value=\"DELETE\""));
        assert!(page.contains("1969"));
        assert!(!page.contains("none"));
    }

    #[test]
    fn empty_list_says_so() {
        let views = Views::new().unwrap();
        let page = views.render_list(&[]).unwrap();
        assert!(page.contains("No books yet."));
    }

    #[test]
    fn titles_are_escaped() {
        let views = Views::new().unwrap();
        let page = views.render_list(&[book(1, "<script>x</script>")]).unwrap();
        assert!(!page.contains("<script>x</script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn add_form_is_blank_and_posts_to_books() {
        let views = Views::new().unwrap();
        let page = views.render_form(None).unwrap();
        assert!(page.contains("<title>Add Book</title>"));
        assert!(page.contains("action=\"/books\""));
        assert!(!page.contains("_method"));
        assert!(page.contains("name=\"title\" value=\"\""));
    }

    #[test]
    fn edit_form_is_prefilled_and_puts() {
        let views = Views::new().unwrap();
        let page = views.render_form(Some(&book(7, "Lathe of Heaven"))).unwrap();
        assert!(page.contains("<title>Edit Book</title>"));
        assert!(page.contains("action=\"/books/7\""));
        assert!(page.contains("name=\"_method\" value=\"PUT\""));
        assert!(page.contains("value=\"Lathe of Heaven\""));
        assert!(page.contains("value=\"1969\""));
    }
}
