use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::domain::Principal;
use super::errors::AuthError;
use super::password::PasswordEncoder;
use super::repository::AuthRepository;

/// Verifies credentials and yields the authenticated identity.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Unknown email and wrong password both map to [`AuthError::Unauthorized`].
    async fn authenticate(&self, email: &str, password: &str) -> Result<Principal, AuthError>;
}

/// Checks the password against the stored hash of the account found by email.
pub struct CredentialsAuthenticator<R: AuthRepository> {
    repo: Arc<R>,
    encoder: Arc<dyn PasswordEncoder>,
}

impl<R: AuthRepository> CredentialsAuthenticator<R> {
    pub fn new(repo: Arc<R>, encoder: Arc<dyn PasswordEncoder>) -> Self {
        Self { repo, encoder }
    }
}

#[async_trait]
impl<R: AuthRepository> Authenticator for CredentialsAuthenticator<R> {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let account = match self.repo.find_by_email(email).await? {
            Some(account) => account,
            None => {
                debug!("no account for email");
                return Err(AuthError::Unauthorized);
            }
        };
        if !self.encoder.matches(password, &account.password_hash)? {
            debug!(user_id = %account.id, "password mismatch");
            return Err(AuthError::Unauthorized);
        }
        Ok(Principal::from(&account))
    }
}
