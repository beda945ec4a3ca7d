use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

pub type BookId = i32;
pub type AuthorId = i32;
pub type GenreId = i32;
pub type PublisherId = i32;
pub type UserId = i32;
pub type ReviewId = i32;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct AuthorDetails {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct AuthorRecord {
    pub author_id: AuthorId,
    pub details: AuthorDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct GenreRecord {
    pub genre_id: GenreId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct NewGenre {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct PublisherDetails {
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct PublisherRecord {
    pub publisher_id: PublisherId,
    pub details: PublisherDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct UserDetails {
    pub username: String,
}

/// The editable field set of a book, as submitted by the add and edit forms.
/// The slug, cover and timestamps are never part of it.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct NewBook {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub publish_date: String,
    pub authors: Vec<AuthorId>,
    pub genres: Vec<GenreId>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub publisher: Option<PublisherId>,
}

/// Full stored state of a book. `publish_date` is an ISO `YYYY-MM-DD` date,
/// timestamps are unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct BookDetails {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub publish_date: String,
    pub authors: Vec<AuthorId>,
    pub genres: Vec<GenreId>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub publisher: Option<PublisherId>,
    #[serde(default)]
    pub cover: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Merge patch over [`BookDetails`]. Absent fields are left unchanged;
/// `publisher`/`cover` use a nested Option so `Some(None)` clears the value.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct BookDetailsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<AuthorId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<GenreId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<Option<PublisherId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<Option<String>>,
}

impl From<NewBook> for BookDetailsPatch {
    /// The edit form always submits the complete editable field set, so every
    /// editable field of the patch is present.
    fn from(input: NewBook) -> Self {
        BookDetailsPatch {
            title: Some(input.title),
            subtitle: Some(input.subtitle),
            publish_date: Some(input.publish_date),
            authors: Some(input.authors),
            genres: Some(input.genres),
            summary: Some(input.summary),
            publisher: Some(input.publisher),
            cover: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct BookRecord {
    pub book_id: BookId,
    pub slug: String,
    pub details: BookDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct ReviewForm {
    #[serde(default = "default_rating")]
    pub rating: u32,
    #[serde(default)]
    pub comment: String,
}

fn default_rating() -> u32 {
    1
}

impl Default for ReviewForm {
    fn default() -> Self {
        ReviewForm {
            rating: default_rating(),
            comment: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct ReviewDetails {
    pub rating: u32,
    pub comment: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct ReviewRecord {
    pub review_id: ReviewId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub details: ReviewDetails,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// One page of the book list, newest publish date first.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct BookListPage {
    pub books: Vec<BookRecord>,
    pub page: u32,
    pub num_pages: u32,
}

/// Everything the detail view exposes: the book, its reviews (newest first),
/// a blank review form and the viewer's favorite status.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct BookDetailPage {
    pub book: BookRecord,
    pub reviews: Vec<ReviewRecord>,
    pub review_form: ReviewForm,
    pub is_favorite: bool,
}
