use std::time::UNIX_EPOCH;

use anyhow::Context;
use serde_json::json;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Statement};

use crate::api::{
    AuthorDetails, AuthorId, AuthorRecord, BookDetails, BookDetailsPatch, BookId, BookRecord,
    GenreId, GenreRecord, NewBook, PublisherDetails, PublisherId, PublisherRecord,
};
use crate::catalog_repository::{CatalogRepository, CatalogRepositoryError};
use crate::slug;

pub struct PostgresCatalogRepository {
    client: Client,
}

pub struct PostgresCatalogRepositoryConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl PostgresCatalogRepository {
    pub async fn init(config: PostgresCatalogRepositoryConfig) -> anyhow::Result<Self> {
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
        CREATE TABLE IF NOT EXISTS books (
            id              SERIAL PRIMARY KEY,
            slug            TEXT NOT NULL UNIQUE,
            params          JSONB
            )
        ",
            )
            .await
            .context("Failed to setup books table")?;

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS authors (
            id              SERIAL PRIMARY KEY,
            params          JSONB
            )
        ",
            )
            .await
            .context("Failed to setup authors table")?;

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS genres (
            id              SERIAL PRIMARY KEY,
            name            TEXT NOT NULL UNIQUE
            )
        ",
            )
            .await
            .context("Failed to setup genres table")?;

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS publishers (
            id              SERIAL PRIMARY KEY,
            params          JSONB
            )
        ",
            )
            .await
            .context("Failed to setup publishers table")?;

        Ok(Self { client })
    }

    async fn validate_references(
        &self,
        authors: Option<&Vec<AuthorId>>,
        genres: Option<&Vec<GenreId>>,
        publisher: Option<PublisherId>,
    ) -> Result<(), CatalogRepositoryError> {
        if let Some(author_ids) = authors {
            if let Some(missing) = self.find_missing_id("authors", author_ids).await? {
                return Err(CatalogRepositoryError::AuthorNotFound(missing));
            }
        }
        if let Some(genre_ids) = genres {
            if let Some(missing) = self.find_missing_id("genres", genre_ids).await? {
                return Err(CatalogRepositoryError::GenreNotFound(missing));
            }
        }
        if let Some(publisher_id) = publisher {
            let stmt: Statement = self
                .client
                .prepare("SELECT EXISTS (SELECT 1 FROM publishers WHERE id = $1)")
                .await?;
            let row = self.client.query_one(&stmt, &[&publisher_id]).await?;
            let exists: bool = row.try_get(0)?;
            if !exists {
                return Err(CatalogRepositoryError::PublisherNotFound(publisher_id));
            }
        }
        Ok(())
    }

    async fn find_missing_id(
        &self,
        table: &str,
        ids: &[i32],
    ) -> Result<Option<i32>, CatalogRepositoryError> {
        if ids.is_empty() {
            return Ok(None);
        }
        let mut unique_ids = ids.to_vec();
        unique_ids.sort_unstable();
        unique_ids.dedup();
        let stmt: Statement = self
            .client
            .prepare(&format!("SELECT id FROM {} WHERE id = ANY($1)", table))
            .await?;
        let rows = self.client.query(&stmt, &[&unique_ids]).await?;
        let found: Vec<i32> = rows
            .iter()
            .map(|row| row.try_get(0))
            .collect::<Result<_, _>>()?;
        Ok(unique_ids.into_iter().find(|id| !found.contains(id)))
    }
}

fn now_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

fn is_unique_violation(err: &tokio_postgres::Error) -> bool {
    err.as_db_error()
        // This is unique constraint validation error
        .map(|db_err| db_err.code() == &SqlState::from_code("23505"))
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn add_book(&self, input: NewBook) -> Result<BookRecord, CatalogRepositoryError> {
        self.validate_references(Some(&input.authors), Some(&input.genres), input.publisher)
            .await?;

        let base = slug::slug_base(&input.title);
        let mut assigned_slug = base.clone();
        let mut counter = 1;
        let exists_stmt: Statement = self
            .client
            .prepare("SELECT EXISTS (SELECT 1 FROM books WHERE slug = $1)")
            .await?;
        loop {
            let row = self.client.query_one(&exists_stmt, &[&assigned_slug]).await?;
            let taken: bool = row.try_get(0)?;
            if !taken {
                break;
            }
            assigned_slug = format!("{}-{}", base, counter);
            counter += 1;
        }

        let now = now_timestamp();
        let details = BookDetails {
            title: input.title,
            subtitle: input.subtitle,
            publish_date: input.publish_date,
            authors: input.authors,
            genres: input.genres,
            summary: input.summary,
            publisher: input.publisher,
            cover: None,
            created_at: now,
            updated_at: now,
        };

        let stmt: Statement = self
            .client
            .prepare("INSERT INTO books (slug, params) VALUES ($1, $2) RETURNING id")
            .await?;
        let rows = self
            .client
            .query(&stmt, &[&assigned_slug, &json!(details)])
            .await;

        match rows {
            Ok(rows) => {
                let book_id: BookId = rows
                    .first()
                    .ok_or_else(|| CatalogRepositoryError::Other("Id not returned".to_string()))?
                    .try_get(0)?;
                Ok(BookRecord {
                    book_id,
                    slug: assigned_slug,
                    details,
                })
            }
            // A concurrent insert can win the probed slug between the
            // existence check and the insert; the constraint is the backstop.
            Err(err) if is_unique_violation(&err) => {
                Err(CatalogRepositoryError::DuplicateSlug(assigned_slug))
            }
            Err(other_err) => Err(other_err.into()),
        }
    }

    async fn update_book(
        &self,
        book_id: BookId,
        patch: BookDetailsPatch,
    ) -> Result<bool, CatalogRepositoryError> {
        self.validate_references(
            patch.authors.as_ref(),
            patch.genres.as_ref(),
            patch.publisher.flatten(),
        )
        .await?;

        let mut patch_value = json!(patch);
        patch_value["updated_at"] = json!(now_timestamp());

        let stmt: Statement = self
            .client
            .prepare("UPDATE books SET params = params || ($1)::JSONB WHERE id = ($2) RETURNING id")
            .await?;
        let rows = self.client.query(&stmt, &[&patch_value, &book_id]).await?;
        Ok(!rows.is_empty())
    }

    async fn delete_book(&self, book_id: BookId) -> Result<bool, CatalogRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("DELETE FROM books WHERE id = $1 RETURNING id")
            .await?;
        let rows = self.client.query(&stmt, &[&book_id]).await?;
        Ok(!rows.is_empty())
    }

    async fn get_book(&self, book_id: BookId) -> Result<BookRecord, CatalogRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT slug, params FROM books WHERE id = ($1)")
            .await?;
        let rows = self.client.query(&stmt, &[&book_id]).await?;

        let row = rows
            .first()
            .ok_or(CatalogRepositoryError::BookNotFound(book_id))?;
        let assigned_slug: String = row.try_get(0)?;
        let details: serde_json::Value = row.try_get(1)?;
        Ok(BookRecord {
            book_id,
            slug: assigned_slug,
            details: serde_json::from_value(details)?,
        })
    }

    async fn get_book_by_slug(&self, slug: &str) -> Result<BookRecord, CatalogRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT id, params FROM books WHERE slug = ($1)")
            .await?;
        let rows = self.client.query(&stmt, &[&slug]).await?;

        let row = rows
            .first()
            .ok_or_else(|| CatalogRepositoryError::SlugNotFound(slug.to_string()))?;
        let book_id: BookId = row.try_get(0)?;
        let details: serde_json::Value = row.try_get(1)?;
        Ok(BookRecord {
            book_id,
            slug: slug.to_string(),
            details: serde_json::from_value(details)?,
        })
    }

    async fn list_books(
        &self,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<Vec<BookRecord>, CatalogRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "SELECT id, slug, params FROM books \
                 ORDER BY params->>'publish_date' DESC, params->>'title' ASC, id ASC \
                 LIMIT $1 OFFSET $2",
            )
            .await?;
        let limit = limit.map(|l| l as i64);
        let offset = offset as i64;
        let rows = self.client.query(&stmt, &[&limit, &offset]).await?;

        rows.iter()
            .map(|row| {
                let book_id: BookId = row.try_get(0)?;
                let assigned_slug: String = row.try_get(1)?;
                let details: serde_json::Value = row.try_get(2)?;
                Ok(BookRecord {
                    book_id,
                    slug: assigned_slug,
                    details: serde_json::from_value(details)?,
                })
            })
            .collect()
    }

    async fn count_books(&self) -> Result<u64, CatalogRepositoryError> {
        let stmt: Statement = self.client.prepare("SELECT COUNT(*) FROM books").await?;
        let row = self.client.query_one(&stmt, &[]).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count as u64)
    }

    async fn add_author(
        &self,
        details: AuthorDetails,
    ) -> Result<AuthorId, CatalogRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("INSERT INTO authors (params) VALUES ($1) RETURNING id")
            .await?;
        let rows = self.client.query(&stmt, &[&json!(details)]).await?;
        let author_id: AuthorId = rows
            .first()
            .ok_or_else(|| CatalogRepositoryError::Other("Id not returned".to_string()))?
            .try_get(0)?;
        Ok(author_id)
    }

    async fn get_author(
        &self,
        author_id: AuthorId,
    ) -> Result<AuthorDetails, CatalogRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT params FROM authors WHERE id = ($1)")
            .await?;
        let rows = self.client.query(&stmt, &[&author_id]).await?;
        let details: serde_json::Value = rows
            .first()
            .ok_or(CatalogRepositoryError::AuthorNotFound(author_id))?
            .try_get(0)?;
        Ok(serde_json::from_value(details)?)
    }

    async fn update_author(
        &self,
        author_id: AuthorId,
        details: AuthorDetails,
    ) -> Result<bool, CatalogRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("UPDATE authors SET params = $2 WHERE id = $1 RETURNING id")
            .await?;
        let rows = self
            .client
            .query(&stmt, &[&author_id, &json!(details)])
            .await?;
        Ok(!rows.is_empty())
    }

    async fn delete_author(&self, author_id: AuthorId) -> Result<bool, CatalogRepositoryError> {
        let unlink_stmt: Statement = self
            .client
            .prepare(
                "UPDATE books SET params = jsonb_set(params, '{authors}', ( \
                     SELECT COALESCE(jsonb_agg(author), '[]'::jsonb) \
                     FROM jsonb_array_elements(params->'authors') author \
                     WHERE author <> to_jsonb($1::INT4) \
                 )) \
                 WHERE params->'authors' @> to_jsonb(ARRAY[$1::INT4])",
            )
            .await?;
        self.client.execute(&unlink_stmt, &[&author_id]).await?;

        let stmt: Statement = self
            .client
            .prepare("DELETE FROM authors WHERE id = $1 RETURNING id")
            .await?;
        let rows = self.client.query(&stmt, &[&author_id]).await?;
        Ok(!rows.is_empty())
    }

    async fn list_authors(&self) -> Result<Vec<AuthorRecord>, CatalogRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "SELECT id, params FROM authors \
                 ORDER BY params->>'last_name' ASC, params->>'first_name' ASC, id ASC",
            )
            .await?;
        let rows = self.client.query(&stmt, &[]).await?;
        rows.iter()
            .map(|row| {
                let author_id: AuthorId = row.try_get(0)?;
                let details: serde_json::Value = row.try_get(1)?;
                Ok(AuthorRecord {
                    author_id,
                    details: serde_json::from_value(details)?,
                })
            })
            .collect()
    }

    async fn add_genre(&self, name: String) -> Result<GenreId, CatalogRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("INSERT INTO genres (name) VALUES ($1) RETURNING id")
            .await?;
        let rows = self.client.query(&stmt, &[&name]).await;
        match rows {
            Ok(rows) => {
                let genre_id: GenreId = rows
                    .first()
                    .ok_or_else(|| CatalogRepositoryError::Other("Id not returned".to_string()))?
                    .try_get(0)?;
                Ok(genre_id)
            }
            Err(err) if is_unique_violation(&err) => {
                Err(CatalogRepositoryError::DuplicateGenre(name))
            }
            Err(other_err) => Err(other_err.into()),
        }
    }

    async fn get_genre(&self, genre_id: GenreId) -> Result<String, CatalogRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT name FROM genres WHERE id = ($1)")
            .await?;
        let rows = self.client.query(&stmt, &[&genre_id]).await?;
        let name: String = rows
            .first()
            .ok_or(CatalogRepositoryError::GenreNotFound(genre_id))?
            .try_get(0)?;
        Ok(name)
    }

    async fn rename_genre(
        &self,
        genre_id: GenreId,
        name: String,
    ) -> Result<bool, CatalogRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("UPDATE genres SET name = $2 WHERE id = $1 RETURNING id")
            .await?;
        let rows = self.client.query(&stmt, &[&genre_id, &name]).await;
        match rows {
            Ok(rows) => Ok(!rows.is_empty()),
            Err(err) if is_unique_violation(&err) => {
                Err(CatalogRepositoryError::DuplicateGenre(name))
            }
            Err(other_err) => Err(other_err.into()),
        }
    }

    async fn delete_genre(&self, genre_id: GenreId) -> Result<bool, CatalogRepositoryError> {
        let unlink_stmt: Statement = self
            .client
            .prepare(
                "UPDATE books SET params = jsonb_set(params, '{genres}', ( \
                     SELECT COALESCE(jsonb_agg(genre), '[]'::jsonb) \
                     FROM jsonb_array_elements(params->'genres') genre \
                     WHERE genre <> to_jsonb($1::INT4) \
                 )) \
                 WHERE params->'genres' @> to_jsonb(ARRAY[$1::INT4])",
            )
            .await?;
        self.client.execute(&unlink_stmt, &[&genre_id]).await?;

        let stmt: Statement = self
            .client
            .prepare("DELETE FROM genres WHERE id = $1 RETURNING id")
            .await?;
        let rows = self.client.query(&stmt, &[&genre_id]).await?;
        Ok(!rows.is_empty())
    }

    async fn list_genres(&self) -> Result<Vec<GenreRecord>, CatalogRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT id, name FROM genres ORDER BY name ASC, id ASC")
            .await?;
        let rows = self.client.query(&stmt, &[]).await?;
        rows.iter()
            .map(|row| {
                let genre_id: GenreId = row.try_get(0)?;
                let name: String = row.try_get(1)?;
                Ok(GenreRecord { genre_id, name })
            })
            .collect()
    }

    async fn add_publisher(
        &self,
        details: PublisherDetails,
    ) -> Result<PublisherId, CatalogRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("INSERT INTO publishers (params) VALUES ($1) RETURNING id")
            .await?;
        let rows = self.client.query(&stmt, &[&json!(details)]).await?;
        let publisher_id: PublisherId = rows
            .first()
            .ok_or_else(|| CatalogRepositoryError::Other("Id not returned".to_string()))?
            .try_get(0)?;
        Ok(publisher_id)
    }

    async fn get_publisher(
        &self,
        publisher_id: PublisherId,
    ) -> Result<PublisherDetails, CatalogRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT params FROM publishers WHERE id = ($1)")
            .await?;
        let rows = self.client.query(&stmt, &[&publisher_id]).await?;
        let details: serde_json::Value = rows
            .first()
            .ok_or(CatalogRepositoryError::PublisherNotFound(publisher_id))?
            .try_get(0)?;
        Ok(serde_json::from_value(details)?)
    }

    async fn update_publisher(
        &self,
        publisher_id: PublisherId,
        details: PublisherDetails,
    ) -> Result<bool, CatalogRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("UPDATE publishers SET params = $2 WHERE id = $1 RETURNING id")
            .await?;
        let rows = self
            .client
            .query(&stmt, &[&publisher_id, &json!(details)])
            .await?;
        Ok(!rows.is_empty())
    }

    async fn delete_publisher(
        &self,
        publisher_id: PublisherId,
    ) -> Result<bool, CatalogRepositoryError> {
        let unlink_stmt: Statement = self
            .client
            .prepare(
                "UPDATE books SET params = jsonb_set(params, '{publisher}', 'null'::jsonb) \
                 WHERE (params->>'publisher')::INT4 = $1",
            )
            .await?;
        self.client.execute(&unlink_stmt, &[&publisher_id]).await?;

        let stmt: Statement = self
            .client
            .prepare("DELETE FROM publishers WHERE id = $1 RETURNING id")
            .await?;
        let rows = self.client.query(&stmt, &[&publisher_id]).await?;
        Ok(!rows.is_empty())
    }

    async fn list_publishers(&self) -> Result<Vec<PublisherRecord>, CatalogRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT id, params FROM publishers ORDER BY id ASC")
            .await?;
        let rows = self.client.query(&stmt, &[]).await?;
        rows.iter()
            .map(|row| {
                let publisher_id: PublisherId = row.try_get(0)?;
                let details: serde_json::Value = row.try_get(1)?;
                Ok(PublisherRecord {
                    publisher_id,
                    details: serde_json::from_value(details)?,
                })
            })
            .collect()
    }
}
