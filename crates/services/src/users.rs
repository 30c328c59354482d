//! # Accounts
//!
//! Signup and profile edits. There is no login here: callers identify the
//! user by id, and premium status is only ever written by the payment
//! review flow.

use std::sync::Arc;

use domains::{
    Clock, DomainError, DomainResult, NewUser, PasswordHasher, User, UserPatch, UserRepository,
};
use uuid::Uuid;

use crate::text::{email, required};

pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { users, hasher, clock }
    }

    #[tracing::instrument(skip(self, new), fields(username = %new.username))]
    pub async fn register(&self, new: NewUser) -> DomainResult<User> {
        let email = email(&new.email)?;
        let username = required("username", &new.username)?;
        if new.password.is_empty() {
            return Err(DomainError::validation("password is required"));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::conflict("user already exists"));
        }
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(DomainError::conflict(format!("username {username} is taken")));
        }

        let user = User {
            id: Uuid::new_v4(),
            email,
            username,
            password_hash: self.hasher.hash(&new.password)?,
            is_premium: false,
            plan: None,
            premium_expiry_date: None,
            created_at: self.clock.now(),
        };
        self.users.insert(&user).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", id))
    }

    pub async fn update_profile(&self, id: Uuid, patch: UserPatch) -> DomainResult<User> {
        let mut user = self.get(id).await?;

        if let Some(raw) = patch.email.as_deref() {
            let email = email(raw)?;
            if email != user.email {
                if self.users.find_by_email(&email).await?.is_some() {
                    return Err(DomainError::conflict("email already in use"));
                }
                user.email = email;
            }
        }
        if let Some(raw) = patch.username.as_deref() {
            let username = required("username", raw)?;
            if username != user.username {
                if self.users.find_by_username(&username).await?.is_some() {
                    return Err(DomainError::conflict(format!("username {username} is taken")));
                }
                user.username = username;
            }
        }

        self.users.update_profile(&user).await?;
        Ok(user)
    }
}
