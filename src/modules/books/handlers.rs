//! Route handlers. Each performs at most one repository call, then renders
//! or redirects.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use catalog_http::AppError;

use super::{
    models::{parse_book_id, BookChanges, BookForm, NewBook},
    repository::BookRepository,
    views::Views,
};

const SERVER_ERROR: &str = "A server error occurred.";
const NOT_FOUND: &str = "Book not found.";
const CREATE_FAILED: &str = "Failed to add book.";
const UPDATE_FAILED: &str = "Failed to update book.";
const DELETE_FAILED: &str = "Failed to delete book.";

const LIST_PATH: &str = "/";

/// Shared handler state: the injected repository and compiled views.
#[derive(Clone)]
pub struct BooksState {
    pub repository: Arc<dyn BookRepository>,
    pub views: Arc<Views>,
}

/// `GET /`
pub async fn list_books(State(state): State<BooksState>) -> Result<Html<String>, AppError> {
    let books = state
        .repository
        .list()
        .await
        .map_err(|e| AppError::internal(SERVER_ERROR, e))?;

    let page = state
        .views
        .render_list(&books)
        .map_err(|e| AppError::internal(SERVER_ERROR, e))?;

    Ok(Html(page))
}

/// `GET /add`
pub async fn new_book_form(State(state): State<BooksState>) -> Result<Html<String>, AppError> {
    let page = state
        .views
        .render_form(None)
        .map_err(|e| AppError::internal(SERVER_ERROR, e))?;

    Ok(Html(page))
}

/// `GET /edit/{id}`; lookup failures of any kind are a not-found.
pub async fn edit_book_form(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = parse_book_id(&id).ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    let book = match state.repository.find(id).await {
        Ok(Some(book)) => book,
        Ok(None) => return Err(AppError::not_found(NOT_FOUND)),
        Err(e) => {
            tracing::error!(book_id = id, error.cause_chain = ?e, "book lookup failed");
            return Err(AppError::not_found(NOT_FOUND));
        }
    };

    let page = state
        .views
        .render_form(Some(&book))
        .map_err(|e| AppError::internal(SERVER_ERROR, e))?;

    Ok(Html(page))
}

/// `POST /books`
pub async fn create_book(
    State(state): State<BooksState>,
    Form(form): Form<BookForm>,
) -> Result<Redirect, AppError> {
    let book = NewBook::from_form(form);
    let uuid = book.uuid.clone();

    state
        .repository
        .create(book)
        .await
        .map_err(|e| AppError::internal(CREATE_FAILED, e))?;

    tracing::info!(book_uuid = %uuid, "book created");
    Ok(Redirect::to(LIST_PATH))
}

/// `PUT /books/{id}`
pub async fn update_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
    Form(form): Form<BookForm>,
) -> Result<Redirect, AppError> {
    // A non-numeric id matches no row: same outcome as a missing one.
    let Some(id) = parse_book_id(&id) else {
        tracing::debug!(raw_id = %id, "update of non-numeric id ignored");
        return Ok(Redirect::to(LIST_PATH));
    };

    state
        .repository
        .update(id, BookChanges::from_form(form))
        .await
        .map_err(|e| AppError::internal(UPDATE_FAILED, e))?;

    tracing::info!(book_id = id, "book updated");
    Ok(Redirect::to(LIST_PATH))
}

/// `DELETE /books/{id}`
pub async fn delete_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let Some(id) = parse_book_id(&id) else {
        tracing::debug!(raw_id = %id, "delete of non-numeric id ignored");
        return Ok(Redirect::to(LIST_PATH));
    };

    state
        .repository
        .delete(id)
        .await
        .map_err(|e| AppError::internal(DELETE_FAILED, e))?;

    tracing::info!(book_id = id, "book deleted");
    Ok(Redirect::to(LIST_PATH))
}
