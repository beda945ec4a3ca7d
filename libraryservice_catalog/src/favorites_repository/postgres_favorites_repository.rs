use std::time::UNIX_EPOCH;

use anyhow::Context;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Statement};

use crate::api::{BookId, UserId};
use crate::favorites_repository::{FavoritesRepository, FavoritesRepositoryError};

pub struct PostgresFavoritesRepositoryConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

pub struct PostgresFavoritesRepository {
    client: Client,
}

impl PostgresFavoritesRepository {
    pub async fn init(config: PostgresFavoritesRepositoryConfig) -> anyhow::Result<Self> {
        let connection_str = format!(
            "postgresql://{}:{}@{}",
            config.username, config.password, config.hostname
        );
        tracing::info!("Postgres connection_str: {}", connection_str);
        let (client, connection) = tokio_postgres::connect(&connection_str, NoTls)
            .await
            .context("Failed to start postgres")?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!("connection error: {}", e);
            }
        });

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS favorites (
            book_id              INTEGER NOT NULL,
            user_id              INTEGER NOT NULL,
            created_at           BIGINT NOT NULL,
            UNIQUE (book_id, user_id)
            )
        ",
            )
            .await
            .context("Failed to setup favorites table")?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl FavoritesRepository for PostgresFavoritesRepository {
    async fn add_favorite(
        &self,
        book_id: BookId,
        user_id: UserId,
    ) -> Result<(), FavoritesRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "INSERT INTO favorites (book_id, user_id, created_at) VALUES ($1, $2, $3) \
                 RETURNING book_id",
            )
            .await?;

        let created_at = std::time::SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;
        let rows = self
            .client
            .query(&stmt, &[&book_id, &user_id, &created_at])
            .await;

        match rows {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_db_error()
                    // This is unique constraint validation error
                    .map(|db_err| db_err.code() == &SqlState::from_code("23505"))
                    .unwrap_or_default() =>
            {
                Err(FavoritesRepositoryError::AlreadyFavorite { book_id, user_id })
            }
            Err(other_err) => Err(other_err.into()),
        }
    }

    async fn remove_favorite(
        &self,
        book_id: BookId,
        user_id: UserId,
    ) -> Result<bool, FavoritesRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "DELETE FROM favorites WHERE book_id = $1 AND user_id = $2 RETURNING book_id",
            )
            .await?;
        let rows = self.client.query(&stmt, &[&book_id, &user_id]).await?;
        Ok(!rows.is_empty())
    }

    async fn is_favorite(
        &self,
        book_id: BookId,
        user_id: UserId,
    ) -> Result<bool, FavoritesRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "SELECT EXISTS (SELECT 1 FROM favorites WHERE book_id = $1 AND user_id = $2)",
            )
            .await?;
        let row = self.client.query_one(&stmt, &[&book_id, &user_id]).await?;
        Ok(row.try_get(0)?)
    }

    async fn delete_favorites_for_book(
        &self,
        book_id: BookId,
    ) -> Result<u64, FavoritesRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("DELETE FROM favorites WHERE book_id = $1")
            .await?;
        Ok(self.client.execute(&stmt, &[&book_id]).await?)
    }
}
