use std::time::UNIX_EPOCH;

use anyhow::Context;
use serde_json::json;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Statement};

use crate::api::{BookId, ReviewDetails, ReviewForm, ReviewId, ReviewRecord, UserId};
use crate::reviews_repository::{ReviewsRepository, ReviewsRepositoryError};

pub struct PostgresReviewsRepositoryConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

pub struct PostgresReviewsRepository {
    client: Client,
}

impl PostgresReviewsRepository {
    pub async fn init(config: PostgresReviewsRepositoryConfig) -> anyhow::Result<Self> {
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
        CREATE TABLE IF NOT EXISTS reviews (
            id              SERIAL PRIMARY KEY,
            book_id         INTEGER NOT NULL,
            user_id         INTEGER NOT NULL,
            params          JSONB,
            UNIQUE (book_id, user_id)
            )
        ",
            )
            .await
            .context("Failed to setup reviews table")?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ReviewsRepository for PostgresReviewsRepository {
    async fn add_review(
        &self,
        book_id: BookId,
        user_id: UserId,
        form: ReviewForm,
    ) -> Result<ReviewRecord, ReviewsRepositoryError> {
        let details = ReviewDetails {
            rating: form.rating,
            comment: form.comment,
            created_at: std::time::SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_secs() as i64,
        };

        let stmt: Statement = self
            .client
            .prepare(
                "INSERT INTO reviews (book_id, user_id, params) VALUES ($1, $2, $3) RETURNING id",
            )
            .await?;

        let rows = self
            .client
            .query(&stmt, &[&book_id, &user_id, &json!(details)])
            .await;

        match rows {
            Ok(rows) => {
                let review_id: ReviewId = rows
                    .first()
                    .ok_or_else(|| ReviewsRepositoryError::Other("Id not returned".to_string()))?
                    .try_get(0)?;
                Ok(ReviewRecord {
                    review_id,
                    book_id,
                    user_id,
                    details,
                })
            }
            Err(err)
                if err
                    .as_db_error()
                    // This is unique constraint validation error
                    .map(|db_err| db_err.code() == &SqlState::from_code("23505"))
                    .unwrap_or_default() =>
            {
                Err(ReviewsRepositoryError::AlreadyReviewed { book_id, user_id })
            }
            Err(other_err) => Err(other_err.into()),
        }
    }

    async fn list_reviews_for_book(
        &self,
        book_id: BookId,
    ) -> Result<Vec<ReviewRecord>, ReviewsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "SELECT id, user_id, params FROM reviews WHERE book_id = $1 \
                 ORDER BY (params->>'created_at')::BIGINT DESC, id DESC",
            )
            .await?;
        let rows = self.client.query(&stmt, &[&book_id]).await?;

        rows.iter()
            .map(|row| {
                let review_id: ReviewId = row.try_get(0)?;
                let user_id: UserId = row.try_get(1)?;
                let details: serde_json::Value = row.try_get(2)?;
                Ok(ReviewRecord {
                    review_id,
                    book_id,
                    user_id,
                    details: serde_json::from_value(details)?,
                })
            })
            .collect()
    }

    async fn delete_reviews_for_book(
        &self,
        book_id: BookId,
    ) -> Result<u64, ReviewsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("DELETE FROM reviews WHERE book_id = $1")
            .await?;
        Ok(self.client.execute(&stmt, &[&book_id]).await?)
    }
}
