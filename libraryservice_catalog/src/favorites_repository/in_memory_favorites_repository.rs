use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::UNIX_EPOCH;

use crate::api::{BookId, UserId};
use crate::favorites_repository::{FavoritesRepository, FavoritesRepositoryError};

pub struct InMemoryFavoritesRepository {
    // (book, user) -> created_at unix seconds
    favorites: parking_lot::RwLock<HashMap<(BookId, UserId), i64>>,
}

impl Default for InMemoryFavoritesRepository {
    fn default() -> Self {
        Self {
            favorites: Default::default(),
        }
    }
}

#[async_trait::async_trait]
impl FavoritesRepository for InMemoryFavoritesRepository {
    async fn add_favorite(
        &self,
        book_id: BookId,
        user_id: UserId,
    ) -> Result<(), FavoritesRepositoryError> {
        let mut locked_favorites = self.favorites.write();

        match locked_favorites.entry((book_id, user_id)) {
            Entry::Occupied(_) => {
                Err(FavoritesRepositoryError::AlreadyFavorite { book_id, user_id })
            }
            Entry::Vacant(entry) => {
                entry.insert(
                    std::time::SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .unwrap()
                        .as_secs() as i64,
                );
                Ok(())
            }
        }
    }

    async fn remove_favorite(
        &self,
        book_id: BookId,
        user_id: UserId,
    ) -> Result<bool, FavoritesRepositoryError> {
        Ok(self
            .favorites
            .write()
            .remove(&(book_id, user_id))
            .is_some())
    }

    async fn is_favorite(
        &self,
        book_id: BookId,
        user_id: UserId,
    ) -> Result<bool, FavoritesRepositoryError> {
        Ok(self.favorites.read().contains_key(&(book_id, user_id)))
    }

    async fn delete_favorites_for_book(
        &self,
        book_id: BookId,
    ) -> Result<u64, FavoritesRepositoryError> {
        let mut locked_favorites = self.favorites.write();
        let before = locked_favorites.len();
        locked_favorites.retain(|(favorite_book_id, _), _| *favorite_book_id != book_id);
        Ok((before - locked_favorites.len()) as u64)
    }
}
