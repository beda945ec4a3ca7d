use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::UNIX_EPOCH;

use serde_json::json;

use crate::api::{
    AuthorDetails, AuthorId, AuthorRecord, BookDetails, BookDetailsPatch, BookId, BookRecord,
    GenreId, GenreRecord, NewBook, PublisherDetails, PublisherId, PublisherRecord,
};
use crate::catalog_repository::{CatalogRepository, CatalogRepositoryError};
use crate::slug;

pub struct InMemoryCatalogRepository {
    book_sequence_generator: AtomicI32,
    author_sequence_generator: AtomicI32,
    genre_sequence_generator: AtomicI32,
    publisher_sequence_generator: AtomicI32,
    books: parking_lot::RwLock<HashMap<BookId, BookRecord>>,
    authors: parking_lot::RwLock<HashMap<AuthorId, AuthorDetails>>,
    genres: parking_lot::RwLock<HashMap<GenreId, String>>,
    publishers: parking_lot::RwLock<HashMap<PublisherId, PublisherDetails>>,
}

impl Default for InMemoryCatalogRepository {
    fn default() -> Self {
        Self {
            book_sequence_generator: Default::default(),
            author_sequence_generator: Default::default(),
            genre_sequence_generator: Default::default(),
            publisher_sequence_generator: Default::default(),
            books: Default::default(),
            authors: Default::default(),
            genres: Default::default(),
            publishers: Default::default(),
        }
    }
}

impl InMemoryCatalogRepository {
    fn validate_references(
        &self,
        authors: Option<&Vec<AuthorId>>,
        genres: Option<&Vec<GenreId>>,
        publisher: Option<PublisherId>,
    ) -> Result<(), CatalogRepositoryError> {
        if let Some(author_ids) = authors {
            let locked_authors = self.authors.read();
            for author_id in author_ids {
                if !locked_authors.contains_key(author_id) {
                    return Err(CatalogRepositoryError::AuthorNotFound(*author_id));
                }
            }
        }
        if let Some(genre_ids) = genres {
            let locked_genres = self.genres.read();
            for genre_id in genre_ids {
                if !locked_genres.contains_key(genre_id) {
                    return Err(CatalogRepositoryError::GenreNotFound(*genre_id));
                }
            }
        }
        if let Some(publisher_id) = publisher {
            if !self.publishers.read().contains_key(&publisher_id) {
                return Err(CatalogRepositoryError::PublisherNotFound(publisher_id));
            }
        }
        Ok(())
    }
}

fn now_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

#[async_trait::async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn add_book(&self, input: NewBook) -> Result<BookRecord, CatalogRepositoryError> {
        self.validate_references(Some(&input.authors), Some(&input.genres), input.publisher)?;

        let mut locked_books = self.books.write();

        let base = slug::slug_base(&input.title);
        let mut assigned_slug = base.clone();
        let mut counter = 1;
        while locked_books.values().any(|book| book.slug == assigned_slug) {
            assigned_slug = format!("{}-{}", base, counter);
            counter += 1;
        }

        let now = now_timestamp();
        let book_id = self.book_sequence_generator.fetch_add(1, Ordering::Relaxed);
        let record = BookRecord {
            book_id,
            slug: assigned_slug,
            details: BookDetails {
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
            },
        };
        locked_books.insert(book_id, record.clone());
        Ok(record)
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
        )?;

        let mut locked_books = self.books.write();
        if let Some(book) = locked_books.get_mut(&book_id) {
            let mut result_details = json!(book.details);
            json_patch::merge(&mut result_details, &json!(patch));
            let mut result_details: BookDetails = serde_json::from_value(result_details)?;
            result_details.updated_at = now_timestamp();
            book.details = result_details;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete_book(&self, book_id: BookId) -> Result<bool, CatalogRepositoryError> {
        Ok(self.books.write().remove(&book_id).is_some())
    }

    async fn get_book(&self, book_id: BookId) -> Result<BookRecord, CatalogRepositoryError> {
        self.books
            .read()
            .get(&book_id)
            .cloned()
            .ok_or(CatalogRepositoryError::BookNotFound(book_id))
    }

    async fn get_book_by_slug(&self, slug: &str) -> Result<BookRecord, CatalogRepositoryError> {
        self.books
            .read()
            .values()
            .find(|book| book.slug == slug)
            .cloned()
            .ok_or_else(|| CatalogRepositoryError::SlugNotFound(slug.to_string()))
    }

    async fn list_books(
        &self,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<Vec<BookRecord>, CatalogRepositoryError> {
        let mut books: Vec<BookRecord> = self.books.read().values().cloned().collect();
        books.sort_by(|a, b| {
            b.details
                .publish_date
                .cmp(&a.details.publish_date)
                .then_with(|| a.details.title.cmp(&b.details.title))
                .then_with(|| a.book_id.cmp(&b.book_id))
        });
        Ok(books
            .into_iter()
            .skip(offset as usize)
            .take(limit.map(|l| l as usize).unwrap_or(usize::MAX))
            .collect())
    }

    async fn count_books(&self) -> Result<u64, CatalogRepositoryError> {
        Ok(self.books.read().len() as u64)
    }

    async fn add_author(
        &self,
        details: AuthorDetails,
    ) -> Result<AuthorId, CatalogRepositoryError> {
        let author_id = self.author_sequence_generator.fetch_add(1, Ordering::Relaxed);
        self.authors.write().insert(author_id, details);
        Ok(author_id)
    }

    async fn get_author(
        &self,
        author_id: AuthorId,
    ) -> Result<AuthorDetails, CatalogRepositoryError> {
        self.authors
            .read()
            .get(&author_id)
            .cloned()
            .ok_or(CatalogRepositoryError::AuthorNotFound(author_id))
    }

    async fn update_author(
        &self,
        author_id: AuthorId,
        details: AuthorDetails,
    ) -> Result<bool, CatalogRepositoryError> {
        let mut locked_authors = self.authors.write();
        if let Some(author) = locked_authors.get_mut(&author_id) {
            *author = details;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete_author(&self, author_id: AuthorId) -> Result<bool, CatalogRepositoryError> {
        if self.authors.write().remove(&author_id).is_none() {
            return Ok(false);
        }
        let mut locked_books = self.books.write();
        for book in locked_books.values_mut() {
            book.details.authors.retain(|id| *id != author_id);
        }
        Ok(true)
    }

    async fn list_authors(&self) -> Result<Vec<AuthorRecord>, CatalogRepositoryError> {
        let mut authors: Vec<AuthorRecord> = self
            .authors
            .read()
            .iter()
            .map(|(&author_id, details)| AuthorRecord {
                author_id,
                details: details.clone(),
            })
            .collect();
        authors.sort_by(|a, b| {
            a.details
                .last_name
                .cmp(&b.details.last_name)
                .then_with(|| a.details.first_name.cmp(&b.details.first_name))
                .then_with(|| a.author_id.cmp(&b.author_id))
        });
        Ok(authors)
    }

    async fn add_genre(&self, name: String) -> Result<GenreId, CatalogRepositoryError> {
        let mut locked_genres = self.genres.write();
        if locked_genres.values().any(|existing| *existing == name) {
            return Err(CatalogRepositoryError::DuplicateGenre(name));
        }
        let genre_id = self.genre_sequence_generator.fetch_add(1, Ordering::Relaxed);
        locked_genres.insert(genre_id, name);
        Ok(genre_id)
    }

    async fn get_genre(&self, genre_id: GenreId) -> Result<String, CatalogRepositoryError> {
        self.genres
            .read()
            .get(&genre_id)
            .cloned()
            .ok_or(CatalogRepositoryError::GenreNotFound(genre_id))
    }

    async fn rename_genre(
        &self,
        genre_id: GenreId,
        name: String,
    ) -> Result<bool, CatalogRepositoryError> {
        let mut locked_genres = self.genres.write();
        if locked_genres
            .iter()
            .any(|(&id, existing)| id != genre_id && *existing == name)
        {
            return Err(CatalogRepositoryError::DuplicateGenre(name));
        }
        if let Some(genre) = locked_genres.get_mut(&genre_id) {
            *genre = name;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete_genre(&self, genre_id: GenreId) -> Result<bool, CatalogRepositoryError> {
        if self.genres.write().remove(&genre_id).is_none() {
            return Ok(false);
        }
        let mut locked_books = self.books.write();
        for book in locked_books.values_mut() {
            book.details.genres.retain(|id| *id != genre_id);
        }
        Ok(true)
    }

    async fn list_genres(&self) -> Result<Vec<GenreRecord>, CatalogRepositoryError> {
        let mut genres: Vec<GenreRecord> = self
            .genres
            .read()
            .iter()
            .map(|(&genre_id, name)| GenreRecord {
                genre_id,
                name: name.clone(),
            })
            .collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.genre_id.cmp(&b.genre_id)));
        Ok(genres)
    }

    async fn add_publisher(
        &self,
        details: PublisherDetails,
    ) -> Result<PublisherId, CatalogRepositoryError> {
        let publisher_id = self
            .publisher_sequence_generator
            .fetch_add(1, Ordering::Relaxed);
        self.publishers.write().insert(publisher_id, details);
        Ok(publisher_id)
    }

    async fn get_publisher(
        &self,
        publisher_id: PublisherId,
    ) -> Result<PublisherDetails, CatalogRepositoryError> {
        self.publishers
            .read()
            .get(&publisher_id)
            .cloned()
            .ok_or(CatalogRepositoryError::PublisherNotFound(publisher_id))
    }

    async fn update_publisher(
        &self,
        publisher_id: PublisherId,
        details: PublisherDetails,
    ) -> Result<bool, CatalogRepositoryError> {
        let mut locked_publishers = self.publishers.write();
        if let Some(publisher) = locked_publishers.get_mut(&publisher_id) {
            *publisher = details;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete_publisher(
        &self,
        publisher_id: PublisherId,
    ) -> Result<bool, CatalogRepositoryError> {
        if self.publishers.write().remove(&publisher_id).is_none() {
            return Ok(false);
        }
        let mut locked_books = self.books.write();
        for book in locked_books.values_mut() {
            if book.details.publisher == Some(publisher_id) {
                book.details.publisher = None;
            }
        }
        Ok(true)
    }

    async fn list_publishers(&self) -> Result<Vec<PublisherRecord>, CatalogRepositoryError> {
        let mut publishers: Vec<PublisherRecord> = self
            .publishers
            .read()
            .iter()
            .map(|(&publisher_id, details)| PublisherRecord {
                publisher_id,
                details: details.clone(),
            })
            .collect();
        publishers.sort_by_key(|record| record.publisher_id);
        Ok(publishers)
    }
}

#[cfg(test)]
mod in_memory_catalog_repository_tests {
    use super::*;

    async fn repo_with_references() -> (InMemoryCatalogRepository, AuthorId, GenreId, PublisherId)
    {
        let repo = InMemoryCatalogRepository::default();
        let author_id = repo
            .add_author(AuthorDetails {
                first_name: "Ursula".to_string(),
                last_name: "LeGuin".to_string(),
            })
            .await
            .unwrap();
        let genre_id = repo.add_genre("Fantasy".to_string()).await.unwrap();
        let publisher_id = repo
            .add_publisher(PublisherDetails {
                name: "Ace Books".to_string(),
                website: None,
            })
            .await
            .unwrap();
        (repo, author_id, genre_id, publisher_id)
    }

    fn new_book(title: &str, author_id: AuthorId, genre_id: GenreId) -> NewBook {
        NewBook {
            title: title.to_string(),
            subtitle: String::new(),
            publish_date: "1969-03-01".to_string(),
            authors: vec![author_id],
            genres: vec![genre_id],
            summary: "A story".to_string(),
            publisher: None,
        }
    }

    #[tokio::test]
    /// Tests add_book, get_book and get_book_by_slug together
    /// including the not-found paths
    async fn test_add_book_and_get_it() {
        let (repo, author_id, genre_id, publisher_id) = repo_with_references().await;

        let not_existing_book_id = 20000;
        let book_not_found = repo.get_book(not_existing_book_id).await;
        assert!(matches!(
            book_not_found,
            Err(CatalogRepositoryError::BookNotFound(..))
        ));
        let slug_not_found = repo.get_book_by_slug("left-hand-of-darkness").await;
        assert!(matches!(
            slug_not_found,
            Err(CatalogRepositoryError::SlugNotFound(..))
        ));

        let mut input = new_book("The Left Hand of Darkness", author_id, genre_id);
        input.publisher = Some(publisher_id);
        let record = repo.add_book(input).await.expect("Failed to add book");

        assert_eq!(record.slug, "the-left-hand-of-darkness");
        assert_eq!(record.details.created_at, record.details.updated_at);
        assert_eq!(record.details.publisher, Some(publisher_id));
        assert_eq!(record.details.cover, None);

        let by_id = repo.get_book(record.book_id).await.unwrap();
        assert_eq!(by_id, record);
        let by_slug = repo.get_book_by_slug(&record.slug).await.unwrap();
        assert_eq!(by_slug, record);
    }

    #[tokio::test]
    /// Creating several books with the same title must yield distinct slugs
    /// with an incrementing numeric suffix
    async fn test_slug_deduplication() {
        let (repo, author_id, genre_id, _) = repo_with_references().await;

        let first = repo
            .add_book(new_book("Dune", author_id, genre_id))
            .await
            .unwrap();
        let second = repo
            .add_book(new_book("Dune", author_id, genre_id))
            .await
            .unwrap();
        let third = repo
            .add_book(new_book("Dune", author_id, genre_id))
            .await
            .unwrap();

        assert_eq!(first.slug, "dune");
        assert_eq!(second.slug, "dune-1");
        assert_eq!(third.slug, "dune-2");

        let all = repo.list_books(None, 0).await.unwrap();
        let mut slugs: Vec<&str> = all.iter().map(|b| b.slug.as_str()).collect();
        assert!(slugs.iter().all(|s| !s.is_empty()));
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), all.len());
    }

    #[tokio::test]
    /// A punctuation-only title still receives a non-empty slug
    async fn test_slug_fallback_for_unsluggable_title() {
        let (repo, author_id, genre_id, _) = repo_with_references().await;

        let first = repo
            .add_book(new_book("???", author_id, genre_id))
            .await
            .unwrap();
        let second = repo
            .add_book(new_book("!!!", author_id, genre_id))
            .await
            .unwrap();
        assert_eq!(first.slug, "book");
        assert_eq!(second.slug, "book-1");
    }

    #[tokio::test]
    /// Books referencing unknown authors, genres or publishers are rejected
    async fn test_add_book_with_unknown_references() {
        let (repo, author_id, genre_id, _) = repo_with_references().await;

        let mut input = new_book("Dune", 999, genre_id);
        let result = repo.add_book(input.clone()).await;
        assert!(matches!(
            result,
            Err(CatalogRepositoryError::AuthorNotFound(999))
        ));

        input.authors = vec![author_id];
        input.genres = vec![777];
        let result = repo.add_book(input.clone()).await;
        assert!(matches!(
            result,
            Err(CatalogRepositoryError::GenreNotFound(777))
        ));

        input.genres = vec![genre_id];
        input.publisher = Some(555);
        let result = repo.add_book(input).await;
        assert!(matches!(
            result,
            Err(CatalogRepositoryError::PublisherNotFound(555))
        ));
    }

    #[tokio::test]
    /// Patching keeps the slug and the fields the patch does not mention,
    /// and a full form patch can clear the publisher
    async fn test_update_book_patch() {
        let (repo, author_id, genre_id, publisher_id) = repo_with_references().await;

        let not_existing_book = 2000;
        let result = repo
            .update_book(not_existing_book, BookDetailsPatch::default())
            .await
            .expect("Failed to update");
        // false means nothing to update
        assert!(!result);

        let mut input = new_book("A Wizard of Earthsea", author_id, genre_id);
        input.publisher = Some(publisher_id);
        let record = repo.add_book(input.clone()).await.unwrap();

        let patch_title_only = BookDetailsPatch {
            title: Some("A Wizard of Earthsea, Revised".to_string()),
            ..BookDetailsPatch::default()
        };
        assert!(repo
            .update_book(record.book_id, patch_title_only)
            .await
            .unwrap());

        let updated = repo.get_book(record.book_id).await.unwrap();
        assert_eq!(updated.details.title, "A Wizard of Earthsea, Revised");
        // slug is assigned once and never follows the title
        assert_eq!(updated.slug, "a-wizard-of-earthsea");
        assert_eq!(updated.details.summary, record.details.summary);
        assert_eq!(updated.details.publisher, Some(publisher_id));

        // a full edit-form patch with no publisher clears the reference
        input.publisher = None;
        input.summary = "New summary".to_string();
        assert!(repo
            .update_book(record.book_id, BookDetailsPatch::from(input))
            .await
            .unwrap());
        let updated = repo.get_book(record.book_id).await.unwrap();
        assert_eq!(updated.details.publisher, None);
        assert_eq!(updated.details.summary, "New summary");
        assert_eq!(updated.details.created_at, record.details.created_at);
    }

    #[tokio::test]
    async fn test_delete_book() {
        let (repo, author_id, genre_id, _) = repo_with_references().await;
        let record = repo
            .add_book(new_book("Dune", author_id, genre_id))
            .await
            .unwrap();

        assert!(repo.delete_book(record.book_id).await.unwrap());
        assert!(matches!(
            repo.get_book(record.book_id).await,
            Err(CatalogRepositoryError::BookNotFound(..))
        ));
        assert!(!repo.delete_book(record.book_id).await.unwrap());
    }

    #[tokio::test]
    /// List order is publish date descending then title, and limit/offset
    /// window the ordered sequence
    async fn test_list_books_ordering_and_pagination() {
        let (repo, author_id, genre_id, _) = repo_with_references().await;

        let mut older = new_book("Zebra", author_id, genre_id);
        older.publish_date = "1970-01-01".to_string();
        let mut newer_b = new_book("Beta", author_id, genre_id);
        newer_b.publish_date = "1999-12-01".to_string();
        let mut newer_a = new_book("Alpha", author_id, genre_id);
        newer_a.publish_date = "1999-12-01".to_string();

        repo.add_book(older).await.unwrap();
        repo.add_book(newer_b).await.unwrap();
        repo.add_book(newer_a).await.unwrap();

        let titles: Vec<String> = repo
            .list_books(None, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.details.title)
            .collect();
        assert_eq!(titles, vec!["Alpha", "Beta", "Zebra"]);

        let page: Vec<String> = repo
            .list_books(Some(2), 1)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.details.title)
            .collect();
        assert_eq!(page, vec!["Beta", "Zebra"]);

        assert_eq!(repo.count_books().await.unwrap(), 3);
    }

    #[tokio::test]
    /// Author management including list ordering and unlink-on-delete
    async fn test_author_management() {
        let repo = InMemoryCatalogRepository::default();

        let le_guin = repo
            .add_author(AuthorDetails {
                first_name: "Ursula".to_string(),
                last_name: "LeGuin".to_string(),
            })
            .await
            .unwrap();
        let herbert = repo
            .add_author(AuthorDetails {
                first_name: "Frank".to_string(),
                last_name: "Herbert".to_string(),
            })
            .await
            .unwrap();
        let genre_id = repo.add_genre("Science Fiction".to_string()).await.unwrap();

        let listed: Vec<AuthorId> = repo
            .list_authors()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.author_id)
            .collect();
        assert_eq!(listed, vec![herbert, le_guin]);

        assert!(repo
            .update_author(
                herbert,
                AuthorDetails {
                    first_name: "Frank".to_string(),
                    last_name: "Herbert Sr".to_string(),
                },
            )
            .await
            .unwrap());
        assert_eq!(
            repo.get_author(herbert).await.unwrap().last_name,
            "Herbert Sr"
        );

        let book = repo
            .add_book(NewBook {
                title: "Dune".to_string(),
                subtitle: String::new(),
                publish_date: "1965-08-01".to_string(),
                authors: vec![herbert, le_guin],
                genres: vec![genre_id],
                summary: String::new(),
                publisher: None,
            })
            .await
            .unwrap();

        assert!(repo.delete_author(herbert).await.unwrap());
        assert!(!repo.delete_author(herbert).await.unwrap());
        let book = repo.get_book(book.book_id).await.unwrap();
        assert_eq!(book.details.authors, vec![le_guin]);
    }

    #[tokio::test]
    /// Genre names are unique; deleting a genre unlinks it from books
    async fn test_genre_management() {
        let repo = InMemoryCatalogRepository::default();
        let author_id = repo
            .add_author(AuthorDetails {
                first_name: "Frank".to_string(),
                last_name: "Herbert".to_string(),
            })
            .await
            .unwrap();

        let fantasy = repo.add_genre("Fantasy".to_string()).await.unwrap();
        let scifi = repo.add_genre("Science Fiction".to_string()).await.unwrap();

        let duplicate = repo.add_genre("Fantasy".to_string()).await;
        assert!(matches!(
            duplicate,
            Err(CatalogRepositoryError::DuplicateGenre(..))
        ));

        let rename_conflict = repo.rename_genre(scifi, "Fantasy".to_string()).await;
        assert!(matches!(
            rename_conflict,
            Err(CatalogRepositoryError::DuplicateGenre(..))
        ));
        assert!(repo.rename_genre(scifi, "SF".to_string()).await.unwrap());
        assert_eq!(repo.get_genre(scifi).await.unwrap(), "SF");

        let names: Vec<String> = repo
            .list_genres()
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec!["Fantasy", "SF"]);

        let book = repo
            .add_book(NewBook {
                title: "Dune".to_string(),
                subtitle: String::new(),
                publish_date: "1965-08-01".to_string(),
                authors: vec![author_id],
                genres: vec![fantasy, scifi],
                summary: String::new(),
                publisher: None,
            })
            .await
            .unwrap();

        assert!(repo.delete_genre(fantasy).await.unwrap());
        let book = repo.get_book(book.book_id).await.unwrap();
        assert_eq!(book.details.genres, vec![scifi]);
    }

    #[tokio::test]
    /// Deleting a publisher leaves its books in place with no publisher
    async fn test_publisher_management() {
        let repo = InMemoryCatalogRepository::default();
        let author_id = repo
            .add_author(AuthorDetails {
                first_name: "Frank".to_string(),
                last_name: "Herbert".to_string(),
            })
            .await
            .unwrap();
        let genre_id = repo.add_genre("Science Fiction".to_string()).await.unwrap();

        let publisher_id = repo
            .add_publisher(PublisherDetails {
                name: "Chilton".to_string(),
                website: Some("https://example.com".to_string()),
            })
            .await
            .unwrap();

        assert!(repo
            .update_publisher(
                publisher_id,
                PublisherDetails {
                    name: "Chilton Books".to_string(),
                    website: None,
                },
            )
            .await
            .unwrap());
        assert_eq!(
            repo.get_publisher(publisher_id).await.unwrap().name,
            "Chilton Books"
        );

        let book = repo
            .add_book(NewBook {
                title: "Dune".to_string(),
                subtitle: String::new(),
                publish_date: "1965-08-01".to_string(),
                authors: vec![author_id],
                genres: vec![genre_id],
                summary: String::new(),
                publisher: Some(publisher_id),
            })
            .await
            .unwrap();

        assert!(repo.delete_publisher(publisher_id).await.unwrap());
        let book = repo.get_book(book.book_id).await.unwrap();
        assert_eq!(book.details.publisher, None);
        assert!(matches!(
            repo.get_publisher(publisher_id).await,
            Err(CatalogRepositoryError::PublisherNotFound(..))
        ));
    }
}
