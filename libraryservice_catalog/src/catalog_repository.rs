pub use in_memory_catalog_repository::InMemoryCatalogRepository;
pub use postgres_catalog_repository::{PostgresCatalogRepository, PostgresCatalogRepositoryConfig};

use crate::api::{
    AuthorDetails, AuthorId, AuthorRecord, BookDetailsPatch, BookId, BookRecord, GenreId,
    GenreRecord, NewBook, PublisherDetails, PublisherId, PublisherRecord,
};

mod in_memory_catalog_repository;
mod postgres_catalog_repository;

#[derive(thiserror::Error, Debug)]
pub enum CatalogRepositoryError {
    #[error("Book {0} not found")]
    BookNotFound(BookId),

    #[error("Book with slug {0} not found")]
    SlugNotFound(String),

    #[error("Author {0} not found")]
    AuthorNotFound(AuthorId),

    #[error("Genre {0} not found")]
    GenreNotFound(GenreId),

    #[error("Publisher {0} not found")]
    PublisherNotFound(PublisherId),

    #[error("Genre {0} already exists")]
    DuplicateGenre(String),

    #[error("Slug {0} already taken")]
    DuplicateSlug(String),

    #[error("Failed to deserialize record: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("DatabaseFailure failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Adds a book, assigning it an id and a unique slug derived from the
    /// title. The slug never changes afterwards. Referenced author, genre and
    /// publisher ids must exist.
    async fn add_book(&self, input: NewBook) -> Result<BookRecord, CatalogRepositoryError>;
    /// Merge-patches the editable fields of a book, refreshing `updated_at`.
    /// Returns false if the book was not found.
    async fn update_book(
        &self,
        book_id: BookId,
        patch: BookDetailsPatch,
    ) -> Result<bool, CatalogRepositoryError>;
    /// Removes a book. Returns false if it was not found. Reviews and
    /// favorites are cascaded by the caller, not here.
    async fn delete_book(&self, book_id: BookId) -> Result<bool, CatalogRepositoryError>;
    async fn get_book(&self, book_id: BookId) -> Result<BookRecord, CatalogRepositoryError>;
    async fn get_book_by_slug(&self, slug: &str) -> Result<BookRecord, CatalogRepositoryError>;
    /// Lists books ordered by publish date descending, then title. `limit`
    /// of None returns everything past the offset.
    async fn list_books(
        &self,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<Vec<BookRecord>, CatalogRepositoryError>;
    async fn count_books(&self) -> Result<u64, CatalogRepositoryError>;

    async fn add_author(&self, details: AuthorDetails)
        -> Result<AuthorId, CatalogRepositoryError>;
    async fn get_author(&self, author_id: AuthorId)
        -> Result<AuthorDetails, CatalogRepositoryError>;
    async fn update_author(
        &self,
        author_id: AuthorId,
        details: AuthorDetails,
    ) -> Result<bool, CatalogRepositoryError>;
    /// Removes an author and unlinks it from every book that references it.
    async fn delete_author(&self, author_id: AuthorId) -> Result<bool, CatalogRepositoryError>;
    /// Lists authors ordered by last name, then first name.
    async fn list_authors(&self) -> Result<Vec<AuthorRecord>, CatalogRepositoryError>;

    /// Adds a genre. Genre names are unique.
    async fn add_genre(&self, name: String) -> Result<GenreId, CatalogRepositoryError>;
    async fn get_genre(&self, genre_id: GenreId) -> Result<String, CatalogRepositoryError>;
    async fn rename_genre(
        &self,
        genre_id: GenreId,
        name: String,
    ) -> Result<bool, CatalogRepositoryError>;
    /// Removes a genre and unlinks it from every book that references it.
    async fn delete_genre(&self, genre_id: GenreId) -> Result<bool, CatalogRepositoryError>;
    /// Lists genres ordered by name.
    async fn list_genres(&self) -> Result<Vec<GenreRecord>, CatalogRepositoryError>;

    async fn add_publisher(
        &self,
        details: PublisherDetails,
    ) -> Result<PublisherId, CatalogRepositoryError>;
    async fn get_publisher(
        &self,
        publisher_id: PublisherId,
    ) -> Result<PublisherDetails, CatalogRepositoryError>;
    async fn update_publisher(
        &self,
        publisher_id: PublisherId,
        details: PublisherDetails,
    ) -> Result<bool, CatalogRepositoryError>;
    /// Removes a publisher. Books referencing it keep existing with no
    /// publisher.
    async fn delete_publisher(
        &self,
        publisher_id: PublisherId,
    ) -> Result<bool, CatalogRepositoryError>;
    async fn list_publishers(&self) -> Result<Vec<PublisherRecord>, CatalogRepositoryError>;
}
