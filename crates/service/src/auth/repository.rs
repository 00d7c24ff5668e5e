use async_trait::async_trait;

use super::domain::{Account, NewAccount, Role, RoleName};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError>;

    /// Persist a new account with its credentials and roles.
    ///
    /// The email check and the insert are one unit: if the email is taken
    /// (including by a concurrent call) this returns [`AuthError::Conflict`]
    /// and nothing is written.
    async fn save(&self, account: NewAccount) -> Result<Account, AuthError>;

    async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>, AuthError>;
    /// Insert a role; [`AuthError::Conflict`] if the name already exists.
    async fn save_role(&self, name: RoleName, description: &str) -> Result<Role, AuthError>;
    async fn list_roles(&self) -> Result<Vec<Role>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Mutex, MutexGuard};
    use uuid::Uuid;

    #[derive(Default)]
    struct State {
        accounts: HashMap<String, Account>, // key: email
        roles: BTreeMap<RoleName, Role>,
    }

    /// One lock guards everything, so check-then-insert in `save` is atomic.
    #[derive(Default)]
    pub struct MockAuthRepository {
        state: Mutex<State>,
    }

    impl MockAuthRepository {
        /// Repository with the full role catalog already present.
        pub fn seeded() -> Self {
            let repo = Self::default();
            {
                let mut state = repo.state();
                for name in RoleName::ALL {
                    state.roles.insert(name, Role { id: Uuid::new_v4(), name, description: name.description().to_string() });
                }
            }
            repo
        }

        pub fn account_count(&self) -> usize {
            self.state().accounts.len()
        }

        fn state(&self) -> MutexGuard<'_, State> {
            self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
            Ok(self.state().accounts.get(email).cloned())
        }

        async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
            Ok(self.state().accounts.contains_key(email))
        }

        async fn save(&self, account: NewAccount) -> Result<Account, AuthError> {
            let mut state = self.state();
            if state.accounts.contains_key(&account.email) {
                return Err(AuthError::Conflict);
            }
            let saved = Account {
                id: Uuid::new_v4(),
                name: account.name,
                email: account.email,
                password_hash: account.password_hash,
                roles: account.roles.iter().map(|r| r.name).collect(),
            };
            state.accounts.insert(saved.email.clone(), saved.clone());
            Ok(saved)
        }

        async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>, AuthError> {
            Ok(self.state().roles.get(&name).cloned())
        }

        async fn save_role(&self, name: RoleName, description: &str) -> Result<Role, AuthError> {
            let mut state = self.state();
            if state.roles.contains_key(&name) {
                return Err(AuthError::Conflict);
            }
            let role = Role { id: Uuid::new_v4(), name, description: description.to_string() };
            state.roles.insert(name, role.clone());
            Ok(role)
        }

        async fn list_roles(&self) -> Result<Vec<Role>, AuthError> {
            Ok(self.state().roles.values().cloned().collect())
        }
    }
}
