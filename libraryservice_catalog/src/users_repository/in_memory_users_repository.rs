use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::api::{UserDetails, UserId};
use crate::users_repository::{UsersRepository, UsersRepositoryError};

pub struct InMemoryUsersRepository {
    users: parking_lot::RwLock<HashMap<UserId, UserDetails>>,
    user_sequence_generator: AtomicI32,
}

impl Default for InMemoryUsersRepository {
    fn default() -> Self {
        Self {
            users: Default::default(),
            user_sequence_generator: Default::default(),
        }
    }
}

#[async_trait::async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn add_user(&self, details: UserDetails) -> Result<UserId, UsersRepositoryError> {
        let mut locked_users = self.users.write();
        if locked_users
            .values()
            .any(|existing| existing.username == details.username)
        {
            return Err(UsersRepositoryError::DuplicateUsername(details.username));
        }
        let id = self.user_sequence_generator.fetch_add(1, Ordering::Relaxed);
        locked_users.insert(id, details);
        Ok(id)
    }

    async fn get_user(&self, user_id: UserId) -> Result<UserDetails, UsersRepositoryError> {
        self.users
            .read()
            .get(&user_id)
            .cloned()
            .ok_or(UsersRepositoryError::UserNotFound(user_id))
    }

    async fn get_all_user_ids(&self) -> Result<Vec<UserId>, UsersRepositoryError> {
        Ok(self.users.read().keys().cloned().collect())
    }
}
