pub use in_memory_reviews_repository::InMemoryReviewsRepository;
pub use postgres_reviews_repository::{
    PostgresReviewsRepository, PostgresReviewsRepositoryConfig,
};

use crate::api::{BookId, ReviewForm, ReviewRecord, UserId};

mod in_memory_reviews_repository;
mod postgres_reviews_repository;

#[derive(Debug, thiserror::Error)]
pub enum ReviewsRepositoryError {
    #[error("User {user_id} already reviewed book {book_id}")]
    AlreadyReviewed { book_id: BookId, user_id: UserId },

    #[error("Failed to deserialize review: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("DatabaseFailure failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait ReviewsRepository: Send + Sync {
    /// Persists a review. At most one review per (book, user) pair exists;
    /// a second submission fails with [`ReviewsRepositoryError::AlreadyReviewed`].
    async fn add_review(
        &self,
        book_id: BookId,
        user_id: UserId,
        form: ReviewForm,
    ) -> Result<ReviewRecord, ReviewsRepositoryError>;

    /// Lists the reviews of a book, newest first.
    async fn list_reviews_for_book(
        &self,
        book_id: BookId,
    ) -> Result<Vec<ReviewRecord>, ReviewsRepositoryError>;

    /// Removes every review of a book. Returns the number removed.
    async fn delete_reviews_for_book(
        &self,
        book_id: BookId,
    ) -> Result<u64, ReviewsRepositoryError>;
}
