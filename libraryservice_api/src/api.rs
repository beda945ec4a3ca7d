use serde::{Deserialize, Serialize};

use libraryservice_catalog::api::{BookId, ReviewId};

/// Read-only projection of a book. `author` carries the first names of the
/// book's authors, `description` is the catalog summary.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct BookResponse {
    pub id: BookId,
    pub title: String,
    pub author: Vec<String>,
    pub description: String,
}

/// Read-only projection of a review with the reviewer's username.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct ReviewResponse {
    pub id: ReviewId,
    pub user: String,
    pub rating: u32,
    pub comment: String,
}
