use anyhow::{bail, Context};
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use libraryservice_catalog::api::BookId;

use crate::api::{BookResponse, ReviewResponse};

pub struct LibraryServiceApiClient {
    url: String,
    client: ClientWithMiddleware,
}

impl LibraryServiceApiClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// Calls GET /books/ endpoint
    pub async fn list_books(&self) -> anyhow::Result<Vec<BookResponse>> {
        let response = self
            .client
            .get(format!("{}/books/", self.url))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to list books {}", error)
        }
    }

    /// Calls GET /books/{book_id} endpoint
    /// Returns None if the book does not exist
    pub async fn get_book(&self, book_id: BookId) -> anyhow::Result<Option<BookResponse>> {
        let response = self
            .client
            .get(format!("{}/books/{}", self.url, book_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to get book {}", error)
        }
    }

    /// Calls GET /books/{book_id}/reviews endpoint
    /// Returns None if the book does not exist
    pub async fn get_reviews(
        &self,
        book_id: BookId,
    ) -> anyhow::Result<Option<Vec<ReviewResponse>>> {
        let response = self
            .client
            .get(format!("{}/books/{}/reviews", self.url, book_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to get reviews {}", error)
        }
    }
}
