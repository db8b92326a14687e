use std::future::Future;

use color_eyre::{eyre::eyre, Result};

use super::tokens::TokenKeys;
use crate::db::{Db, User};
use crate::names;
use crate::utils::normalize_email;

// ---------------------------------------------------------------------------
// AuthRepository trait (DIP: service defines the abstraction it needs)
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait AuthRepository: Send + Sync {
    fn email_exists(&self, email: &str) -> impl Future<Output = Result<bool>> + Send;

    fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> impl Future<Output = Result<User>> + Send;

    fn verify_user_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<bool>> + Send;

    fn find_user_by_email(&self, email: &str) -> impl Future<Output = Result<Option<User>>> + Send;
}

impl AuthRepository for Db {
    async fn email_exists(&self, email: &str) -> Result<bool> {
        Db::email_exists(self, email).await
    }

    async fn create_user(&self, email: &str, password: &str, name: &str) -> Result<User> {
        Db::create_user(self, email, password, name).await
    }

    async fn verify_user_password(&self, email: &str, password: &str) -> Result<bool> {
        Db::verify_user_password(self, email, password).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Db::find_user_by_email(self, email).await
    }
}

// ---------------------------------------------------------------------------
// Outcome enums
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum RegisterOutcome {
    /// User created; carries a fresh bearer token.
    Registered { user: User, token: String },
    /// Required fields were empty.
    EmptyFields,
    /// Password does not meet minimum requirements.
    WeakPassword,
    /// Email already in use.
    EmailTaken,
}

#[derive(Debug)]
pub enum LoginOutcome {
    Success { user: User, token: String },
    EmptyFields,
    /// Password was incorrect (or email not found).
    InvalidCredentials,
}

// ---------------------------------------------------------------------------
// AuthService
// ---------------------------------------------------------------------------

pub struct AuthService<R: AuthRepository = Db> {
    repo: R,
    tokens: TokenKeys,
}

impl<R: AuthRepository + Clone> Clone for AuthService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: R, tokens: TokenKeys) -> Self {
        Self { repo, tokens }
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<RegisterOutcome> {
        let email = normalize_email(email);
        let name = name.trim();

        if email.is_empty() || password.is_empty() || name.is_empty() {
            return Ok(RegisterOutcome::EmptyFields);
        }

        if password.chars().count() < names::MIN_PASSWORD_LENGTH {
            return Ok(RegisterOutcome::WeakPassword);
        }

        if self.repo.email_exists(&email).await? {
            return Ok(RegisterOutcome::EmailTaken);
        }

        let user = self.repo.create_user(&email, password, name).await?;
        let token = self.tokens.issue(&user)?;

        Ok(RegisterOutcome::Registered { user, token })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let email = normalize_email(email);

        if email.is_empty() || password.is_empty() {
            return Ok(LoginOutcome::EmptyFields);
        }

        if !self.repo.verify_user_password(&email, password).await? {
            return Ok(LoginOutcome::InvalidCredentials);
        }

        let user = self
            .repo
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| eyre!("user not found after password verification"))?;
        let token = self.tokens.issue(&user)?;

        tracing::info!("user {} logged in", user.id);
        Ok(LoginOutcome::Success { user, token })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
