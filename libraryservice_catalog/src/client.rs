use anyhow::{bail, Context};
use reqwest::header::LOCATION;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{
    AuthorDetails, AuthorId, AuthorRecord, BookDetailPage, BookListPage, GenreId, NewBook,
    NewGenre, PublisherDetails, PublisherId, ReviewForm, UserDetails, UserId,
};

/// Header carrying the id of the acting user, mirrored from the server side.
const USER_ID_HEADER: &str = "X-User-Id";

pub struct LibraryServiceCatalogClient {
    url: String,
    client: ClientWithMiddleware,
}

impl LibraryServiceCatalogClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            // catalog actions answer with Found + Location, keep them visible
            .redirect(reqwest::redirect::Policy::none())
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

    /// Calls POST /api/user endpoint
    /// Returns user_id of added user parsed from the location header
    pub async fn add_user(&self, user_details: UserDetails) -> anyhow::Result<UserId> {
        let response = self
            .client
            .post(format!("{}/api/user", self.url))
            .json(&user_details)
            .send()
            .await?;

        if !response.status().is_success() {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to add user {}", error)
        }

        let location_header = response
            .headers()
            .get(LOCATION)
            .context("No location header")?;

        location_header
            .to_str()
            .context("Failed to convert header to str")?
            .strip_prefix("/api/user/")
            .context("Invalid location header")?
            .parse()
            .context("Failed to parse user id")
    }

    /// Calls GET /api/user/{user_id} endpoint
    /// Returns user details if user was present
    /// None if user was not in the repository
    /// and error in case of any other failure
    pub async fn get_user(&self, user_id: UserId) -> anyhow::Result<Option<UserDetails>> {
        let response = self
            .client
            .get(format!("{}/api/user/{}", self.url, user_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to get user {}", error)
        }
    }

    /// Calls GET /api/users endpoint
    pub async fn list_users(&self) -> anyhow::Result<Vec<UserId>> {
        let response = self
            .client
            .get(format!("{}/api/users", self.url))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to list users {}", error)
        }
    }

    /// Calls POST /api/author endpoint
    pub async fn add_author(&self, details: AuthorDetails) -> anyhow::Result<AuthorId> {
        let response = self
            .client
            .post(format!("{}/api/author", self.url))
            .json(&details)
            .send()
            .await?;

        if !response.status().is_success() {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to add author {}", error)
        }

        let location_header = response
            .headers()
            .get(LOCATION)
            .context("No location header")?;

        location_header
            .to_str()
            .context("Failed to convert header to str")?
            .strip_prefix("/api/author/")
            .context("Invalid location header")?
            .parse()
            .context("Failed to parse author id")
    }

    /// Calls GET /api/authors endpoint
    pub async fn list_authors(&self) -> anyhow::Result<Vec<AuthorRecord>> {
        let response = self
            .client
            .get(format!("{}/api/authors", self.url))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to list authors {}", error)
        }
    }

    /// Calls POST /api/genre endpoint
    pub async fn add_genre(&self, name: &str) -> anyhow::Result<GenreId> {
        let response = self
            .client
            .post(format!("{}/api/genre", self.url))
            .json(&NewGenre {
                name: name.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to add genre {}", error)
        }

        let location_header = response
            .headers()
            .get(LOCATION)
            .context("No location header")?;

        location_header
            .to_str()
            .context("Failed to convert header to str")?
            .strip_prefix("/api/genre/")
            .context("Invalid location header")?
            .parse()
            .context("Failed to parse genre id")
    }

    /// Calls POST /api/publisher endpoint
    pub async fn add_publisher(&self, details: PublisherDetails) -> anyhow::Result<PublisherId> {
        let response = self
            .client
            .post(format!("{}/api/publisher", self.url))
            .json(&details)
            .send()
            .await?;

        if !response.status().is_success() {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to add publisher {}", error)
        }

        let location_header = response
            .headers()
            .get(LOCATION)
            .context("No location header")?;

        location_header
            .to_str()
            .context("Failed to convert header to str")?
            .strip_prefix("/api/publisher/")
            .context("Invalid location header")?
            .parse()
            .context("Failed to parse publisher id")
    }

    /// Calls POST /books/add/ as the given user
    /// The service answers with a redirect to the list view
    pub async fn add_book(&self, user_id: UserId, details: NewBook) -> anyhow::Result<()> {
        let response = self
            .client
            .post(format!("{}/books/add/", self.url))
            .header(USER_ID_HEADER, user_id)
            .json(&details)
            .send()
            .await?;

        if response.status() == StatusCode::FOUND {
            Ok(())
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to add book {}", error)
        }
    }

    /// Calls GET / endpoint
    pub async fn list_page(&self, page: Option<u32>) -> anyhow::Result<BookListPage> {
        let url = match page {
            Some(page) => format!("{}/?page={}", self.url, page),
            None => format!("{}/", self.url),
        };
        let response = self.client.get(url).send().await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to list books {}", error)
        }
    }

    /// Calls GET /book/{slug} endpoint
    /// Returns None if no book has the slug
    pub async fn get_book_page(
        &self,
        slug: &str,
        user_id: Option<UserId>,
    ) -> anyhow::Result<Option<BookDetailPage>> {
        let mut request = self.client.get(format!("{}/book/{}", self.url, slug));
        if let Some(user_id) = user_id {
            request = request.header(USER_ID_HEADER, user_id);
        }
        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to get book page {}", error)
        }
    }

    /// Calls POST /book/{slug}/edit/ as the given user
    /// Returns false if the book was not found
    pub async fn edit_book(
        &self,
        user_id: UserId,
        slug: &str,
        details: NewBook,
    ) -> anyhow::Result<bool> {
        let response = self
            .client
            .post(format!("{}/book/{}/edit/", self.url, slug))
            .header(USER_ID_HEADER, user_id)
            .json(&details)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else if response.status() == StatusCode::FOUND {
            Ok(true)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to edit book {}", error)
        }
    }

    /// Calls POST /book/{slug}/delete/ as the given user
    /// Returns false if the book was not found
    pub async fn delete_book(&self, user_id: UserId, slug: &str) -> anyhow::Result<bool> {
        let response = self
            .client
            .post(format!("{}/book/{}/delete/", self.url, slug))
            .header(USER_ID_HEADER, user_id)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else if response.status() == StatusCode::FOUND {
            Ok(true)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to delete book {}", error)
        }
    }

    /// Calls POST /book/{slug}/review/ as the given user
    /// Returns false if the book was not found. A duplicate review is
    /// dropped by the service, which still answers with the redirect
    pub async fn add_review(
        &self,
        user_id: UserId,
        slug: &str,
        form: ReviewForm,
    ) -> anyhow::Result<bool> {
        let response = self
            .client
            .post(format!("{}/book/{}/review/", self.url, slug))
            .header(USER_ID_HEADER, user_id)
            .json(&form)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else if response.status() == StatusCode::FOUND {
            Ok(true)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to add review {}", error)
        }
    }

    /// Calls POST /book/{slug}/favorite/ as the given user
    /// Returns false if the book was not found
    pub async fn toggle_favorite(&self, user_id: UserId, slug: &str) -> anyhow::Result<bool> {
        let response = self
            .client
            .post(format!("{}/book/{}/favorite/", self.url, slug))
            .header(USER_ID_HEADER, user_id)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else if response.status() == StatusCode::FOUND {
            Ok(true)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to toggle favorite {}", error)
        }
    }
}
