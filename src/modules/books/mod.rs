pub mod handlers;
pub mod models;
pub mod repository;
pub mod views;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    routing::{get, post, put},
    Router,
};
use catalog_kernel::{InitCtx, Module};

use handlers::BooksState;
pub use repository::{BookRepository, InMemoryBookRepository, MySqlBookRepository};
use views::Views;

/// Book catalog pages: list, add, edit, and the form targets behind them.
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(repository: Arc<dyn BookRepository>) -> anyhow::Result<Self> {
        Ok(Self {
            state: BooksState {
                repository,
                views: Arc::new(Views::new()?),
            },
        })
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(handlers::list_books))
            .route("/add", get(handlers::new_book_form))
            .route("/edit/{id}", get(handlers::edit_book_form))
            .route("/books", post(handlers::create_book))
            .route(
                "/books/{id}",
                put(handlers::update_book).delete(handlers::delete_book),
            )
            .with_state(self.state.clone())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module over the given storage
pub fn create_module(repository: Arc<dyn BookRepository>) -> anyhow::Result<Arc<dyn Module>> {
    Ok(Arc::new(BooksModule::new(repository)?))
}
