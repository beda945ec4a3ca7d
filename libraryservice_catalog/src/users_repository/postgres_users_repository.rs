use anyhow::Context;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Statement};

use crate::api::{UserDetails, UserId};
use crate::users_repository::{UsersRepository, UsersRepositoryError};

pub struct PostgresUsersRepositoryConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

pub struct PostgresUsersRepository {
    client: Client,
}

impl PostgresUsersRepository {
    pub async fn init(config: PostgresUsersRepositoryConfig) -> anyhow::Result<Self> {
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
        CREATE TABLE IF NOT EXISTS users (
            id              SERIAL PRIMARY KEY,
            username        TEXT NOT NULL UNIQUE
            )
        ",
            )
            .await
            .context("Failed to setup users table")?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn add_user(&self, details: UserDetails) -> Result<UserId, UsersRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("INSERT INTO users (username) VALUES ($1) RETURNING id")
            .await?;

        let rows = self.client.query(&stmt, &[&details.username]).await;

        match rows {
            Ok(rows) => {
                let user_id: UserId = rows
                    .first()
                    .ok_or_else(|| UsersRepositoryError::Other("Id not returned".to_string()))?
                    .try_get(0)?;
                Ok(user_id)
            }
            Err(err)
                if err
                    .as_db_error()
                    // This is unique constraint validation error
                    .map(|db_err| db_err.code() == &SqlState::from_code("23505"))
                    .unwrap_or_default() =>
            {
                Err(UsersRepositoryError::DuplicateUsername(details.username))
            }
            Err(other_err) => Err(other_err.into()),
        }
    }

    async fn get_user(&self, user_id: UserId) -> Result<UserDetails, UsersRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT username FROM users WHERE id = ($1)")
            .await?;
        let rows = self.client.query(&stmt, &[&user_id]).await?;

        let username: String = rows
            .first()
            .ok_or(UsersRepositoryError::UserNotFound(user_id))?
            .try_get(0)?;
        Ok(UserDetails { username })
    }

    async fn get_all_user_ids(&self) -> Result<Vec<UserId>, UsersRepositoryError> {
        let stmt: Statement = self.client.prepare("SELECT id FROM users").await?;
        let rows = self.client.query(&stmt, &[]).await?;
        rows.iter().map(|row| Ok(row.try_get(0)?)).collect()
    }
}
