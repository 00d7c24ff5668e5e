use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, error, info, instrument};

use super::authenticator::{Authenticator, CredentialsAuthenticator};
use super::context::SecurityContext;
use super::domain::{AuthResponse, LoginInput, NewAccount, Principal, RegisterInput, RoleName};
use super::errors::AuthError;
use super::password::{Argon2PasswordEncoder, PasswordEncoder};
use super::repository::AuthRepository;
use super::token::{JwtTokenSigner, SessionClaims, TokenSigner};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    authenticator: Arc<dyn Authenticator>,
    encoder: Arc<dyn PasswordEncoder>,
    signer: Arc<dyn TokenSigner>,
}

impl<R: AuthRepository + 'static> AuthService<R> {
    /// Login goes through a [`CredentialsAuthenticator`] over the same repository and encoder.
    pub fn new(repo: Arc<R>, encoder: Arc<dyn PasswordEncoder>, signer: Arc<dyn TokenSigner>) -> Self {
        let authenticator = Arc::new(CredentialsAuthenticator::new(repo.clone(), encoder.clone()));
        Self { repo, authenticator, encoder, signer }
    }

    /// Argon2 hashing and HS256 tokens.
    pub fn with_config(repo: Arc<R>, cfg: &AuthConfig) -> Self {
        Self::new(
            repo,
            Arc::new(Argon2PasswordEncoder),
            Arc::new(JwtTokenSigner::new(&cfg.jwt_secret, cfg.token_ttl)),
        )
    }

    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    pub fn signer(&self) -> &Arc<dyn TokenSigner> {
        &self.signer
    }

    /// Seed the role catalog. See [`super::bootstrap::seed_roles`].
    pub async fn seed_roles(&self) -> Result<(), AuthError> {
        super::bootstrap::seed_roles(self.repo.as_ref()).await.map(|_| ())
    }

    /// Register a new account with the default role and sign a token for it.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthConfig, AuthService, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, RoleName};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::seeded());
    /// let cfg = AuthConfig { jwt_secret: "secret".into(), token_ttl: chrono::Duration::minutes(5) };
    /// let svc = AuthService::with_config(repo, &cfg);
    /// let input = RegisterInput { name: "Test".into(), email: "user@example.com".into(), password: "Secret123".into() };
    /// let res = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(res.email, "user@example.com");
    /// assert!(res.roles.contains(&RoleName::User));
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthResponse, AuthError> {
        validate_registration(&input)?;
        if self.repo.exists_by_email(&input.email).await? {
            debug!("email already registered");
            return Err(AuthError::Conflict);
        }

        let password_hash = self.encoder.encode(&input.password)?;
        let default_role = match self.repo.find_role_by_name(RoleName::DEFAULT).await? {
            Some(role) => role,
            None => {
                error!(role = %RoleName::DEFAULT, "default role missing; was the role catalog seeded?");
                return Err(AuthError::Configuration(format!("role {} not found", RoleName::DEFAULT)));
            }
        };

        let account = self
            .repo
            .save(NewAccount {
                name: input.name,
                email: input.email,
                password_hash,
                password_algorithm: self.encoder.algorithm().to_string(),
                roles: vec![default_role],
            })
            .await?;
        let principal = Principal::from(&account);
        let token = self.issue_token(&principal)?;
        info!(user_id = %account.id, "user_registered");
        Ok(AuthResponse::new(token, principal))
    }

    /// Verify credentials, record the principal in `ctx` and sign a token.
    ///
    /// On failure `ctx` is left as it was.
    #[instrument(skip(self, ctx, input), fields(email = %input.email))]
    pub async fn login(&self, ctx: &mut SecurityContext, input: LoginInput) -> Result<AuthResponse, AuthError> {
        let principal = self.authenticator.authenticate(&input.email, &input.password).await?;
        ctx.set_principal(principal.clone());
        let token = self.issue_token(&principal)?;
        info!(user_id = %principal.id, "user_logged_in");
        Ok(AuthResponse::new(token, principal))
    }

    /// Decode a bearer token into an authenticated context.
    pub fn verify_token(&self, token: &str) -> Result<SecurityContext, AuthError> {
        let claims = self.signer.verify(token)?;
        Ok(SecurityContext::authenticated(claims.principal()))
    }

    fn issue_token(&self, principal: &Principal) -> Result<String, AuthError> {
        let claims = SessionClaims::for_principal(principal, self.signer.ttl());
        self.signer.sign(&claims)
    }
}

fn validate_registration(input: &RegisterInput) -> Result<(), AuthError> {
    if !input.email.contains('@') {
        return Err(AuthError::Validation("invalid email".into()));
    }
    if input.name.trim().is_empty() {
        return Err(AuthError::Validation("name required".into()));
    }
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
    }
    Ok(())
}
