use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::UNIX_EPOCH;

use crate::api::{BookId, ReviewDetails, ReviewForm, ReviewRecord, UserId};
use crate::reviews_repository::{ReviewsRepository, ReviewsRepositoryError};

pub struct InMemoryReviewsRepository {
    review_sequence_generator: AtomicI32,
    // keyed by (book, user) so the uniqueness invariant is the map itself
    reviews: parking_lot::RwLock<HashMap<(BookId, UserId), ReviewRecord>>,
}

impl Default for InMemoryReviewsRepository {
    fn default() -> Self {
        Self {
            review_sequence_generator: Default::default(),
            reviews: Default::default(),
        }
    }
}

#[async_trait::async_trait]
impl ReviewsRepository for InMemoryReviewsRepository {
    async fn add_review(
        &self,
        book_id: BookId,
        user_id: UserId,
        form: ReviewForm,
    ) -> Result<ReviewRecord, ReviewsRepositoryError> {
        let mut locked_reviews = self.reviews.write();

        match locked_reviews.entry((book_id, user_id)) {
            Entry::Occupied(_) => Err(ReviewsRepositoryError::AlreadyReviewed { book_id, user_id }),
            Entry::Vacant(entry) => {
                let review_id = self.review_sequence_generator.fetch_add(1, Ordering::Relaxed);
                let record = ReviewRecord {
                    review_id,
                    book_id,
                    user_id,
                    details: ReviewDetails {
                        rating: form.rating,
                        comment: form.comment,
                        created_at: std::time::SystemTime::now()
                            .duration_since(UNIX_EPOCH)
                            .unwrap()
                            .as_secs() as i64,
                    },
                };
                entry.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn list_reviews_for_book(
        &self,
        book_id: BookId,
    ) -> Result<Vec<ReviewRecord>, ReviewsRepositoryError> {
        let mut reviews: Vec<ReviewRecord> = self
            .reviews
            .read()
            .values()
            .filter(|review| review.book_id == book_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| {
            b.details
                .created_at
                .cmp(&a.details.created_at)
                .then_with(|| b.review_id.cmp(&a.review_id))
        });
        Ok(reviews)
    }

    async fn delete_reviews_for_book(
        &self,
        book_id: BookId,
    ) -> Result<u64, ReviewsRepositoryError> {
        let mut locked_reviews = self.reviews.write();
        let before = locked_reviews.len();
        locked_reviews.retain(|(review_book_id, _), _| *review_book_id != book_id);
        Ok((before - locked_reviews.len()) as u64)
    }
}
