pub use in_memory_users_repository::InMemoryUsersRepository;
pub use postgres_users_repository::{PostgresUsersRepository, PostgresUsersRepositoryConfig};

use crate::api::{UserDetails, UserId};

mod in_memory_users_repository;
mod postgres_users_repository;

#[derive(Debug, thiserror::Error)]
pub enum UsersRepositoryError {
    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("Username {0} already taken")]
    DuplicateUsername(String),

    #[error("DatabaseFailure failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait UsersRepository: Send + Sync {
    /// Adds a user, returns the id assigned to it. Usernames are unique.
    async fn add_user(&self, details: UserDetails) -> Result<UserId, UsersRepositoryError>;

    async fn get_user(&self, user_id: UserId) -> Result<UserDetails, UsersRepositoryError>;

    async fn get_all_user_ids(&self) -> Result<Vec<UserId>, UsersRepositoryError>;
}
