pub use in_memory_favorites_repository::InMemoryFavoritesRepository;
pub use postgres_favorites_repository::{
    PostgresFavoritesRepository, PostgresFavoritesRepositoryConfig,
};

use crate::api::{BookId, UserId};

mod in_memory_favorites_repository;
mod postgres_favorites_repository;

#[derive(Debug, thiserror::Error)]
pub enum FavoritesRepositoryError {
    #[error("Book {book_id} already favorited by user {user_id}")]
    AlreadyFavorite { book_id: BookId, user_id: UserId },

    #[error("DatabaseFailure failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait FavoritesRepository: Send + Sync {
    /// Marks a book as a favorite of a user. At most one favorite per
    /// (book, user) pair exists.
    async fn add_favorite(
        &self,
        book_id: BookId,
        user_id: UserId,
    ) -> Result<(), FavoritesRepositoryError>;

    /// Removes a favorite. Returns false if there was none.
    async fn remove_favorite(
        &self,
        book_id: BookId,
        user_id: UserId,
    ) -> Result<bool, FavoritesRepositoryError>;

    async fn is_favorite(
        &self,
        book_id: BookId,
        user_id: UserId,
    ) -> Result<bool, FavoritesRepositoryError>;

    /// Removes every favorite of a book. Returns the number removed.
    async fn delete_favorites_for_book(
        &self,
        book_id: BookId,
    ) -> Result<u64, FavoritesRepositoryError>;
}
