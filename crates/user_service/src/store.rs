//! In-memory user storage.
//!
//! Uses DashMap for concurrent access. Username and email uniqueness is
//! enforced through secondary indexes claimed with `entry`, so two concurrent
//! creates for the same username cannot both succeed.

use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use common::UserDto;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Fields supplied when creating a user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Mutable profile fields. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Persistence collaborator for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_all(&self) -> Vec<UserDto>;

    async fn find_by_id(&self, id: u64) -> Option<UserDto>;

    async fn find_by_username(&self, username: &str) -> Option<UserDto>;

    /// Create a user. Fails if the username or email is taken.
    async fn create(&self, user: NewUser) -> Result<UserDto>;

    /// Apply an update. Returns `None` if the user does not exist.
    async fn update(&self, id: u64, update: UserUpdate) -> Option<UserDto>;

    /// Remove a user. Returns whether it existed.
    async fn delete(&self, id: u64) -> bool;
}

/// DashMap-backed [`UserRepository`].
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: DashMap<u64, UserDto>,
    /// username -> id
    usernames: DashMap<String, u64>,
    /// email -> id
    emails: DashMap<String, u64>,
    next_id: AtomicU64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            usernames: DashMap::new(),
            emails: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_all(&self) -> Vec<UserDto> {
        let mut users: Vec<UserDto> = self.users.iter().map(|u| u.value().clone()).collect();
        users.sort_by_key(|u| u.id);
        users
    }

    async fn find_by_id(&self, id: u64) -> Option<UserDto> {
        self.users.get(&id).map(|u| u.clone())
    }

    async fn find_by_username(&self, username: &str) -> Option<UserDto> {
        let id = *self.usernames.get(username)?;
        self.find_by_id(id).await
    }

    async fn create(&self, user: NewUser) -> Result<UserDto> {
        // Lock order: usernames, then emails.
        let username_slot = match self.usernames.entry(user.username.clone()) {
            Entry::Occupied(_) => return Err(Error::DuplicateUsername(user.username)),
            Entry::Vacant(slot) => slot,
        };
        let email_slot = match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => return Err(Error::DuplicateEmail(user.email)),
            Entry::Vacant(slot) => slot,
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();
        let dto = UserDto {
            id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            phone_number: user.phone_number,
            created_at: Some(now),
            updated_at: Some(now),
        };

        self.users.insert(id, dto.clone());
        email_slot.insert(id);
        username_slot.insert(id);

        Ok(dto)
    }

    async fn update(&self, id: u64, update: UserUpdate) -> Option<UserDto> {
        let mut user = self.users.get_mut(&id)?;
        if let Some(full_name) = update.full_name {
            user.full_name = Some(full_name);
        }
        if let Some(phone_number) = update.phone_number {
            user.phone_number = Some(phone_number);
        }
        user.updated_at = Some(Utc::now());
        Some(user.clone())
    }

    async fn delete(&self, id: u64) -> bool {
        match self.users.remove(&id) {
            Some((_, user)) => {
                self.usernames.remove(&user.username);
                self.emails.remove(&user.email);
                true
            }
            None => false,
        }
    }
}
