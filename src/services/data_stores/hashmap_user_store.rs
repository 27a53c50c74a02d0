use std::collections::HashMap;

use crate::domain::{
    Email, GoogleId, User, UserId, UserStore, UserStoreError,
};

#[derive(Default)]
pub struct HashmapUserStore {
    users: HashMap<Email, User>,
}

#[async_trait::async_trait]
impl UserStore for HashmapUserStore {
    async fn add_user(&mut self, user: User) -> Result<(), UserStoreError> {
        let email = &user.email;

        if self.users.contains_key(email) {
            return Err(UserStoreError::UserAlreadyExists);
        }
        if let Some(google_id) = user.credential.google_id() {
            if self.users.values().any(|existing| {
                existing.credential.google_id() == Some(google_id)
            }) {
                return Err(UserStoreError::UserAlreadyExists);
            }
        }

        self.users.insert(email.clone(), user);
        Ok(())
    }

    async fn get_user(&self, email: &Email) -> Result<User, UserStoreError> {
        match self.users.get(email) {
            Some(user) => Ok(user.clone()),
            None => Err(UserStoreError::UserNotFound),
        }
    }

    async fn get_user_by_id(
        &self,
        id: &UserId,
    ) -> Result<User, UserStoreError> {
        self.users
            .values()
            .find(|user| user.id == *id)
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn get_user_by_email_or_google_id(
        &self,
        email: &Email,
        google_id: &GoogleId,
    ) -> Result<User, UserStoreError> {
        self.users
            .values()
            .find(|user| {
                user.email == *email
                    || user.credential.google_id() == Some(google_id)
            })
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn update_user(
        &mut self,
        user: User,
    ) -> Result<(), UserStoreError> {
        if !self.users.contains_key(&user.email) {
            return Err(UserStoreError::UserNotFound);
        }
        self.users.insert(user.email.clone(), user);
        Ok(())
    }
}
