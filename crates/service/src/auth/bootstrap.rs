//! Role catalog seeding, run once at startup.

use tracing::{debug, info, instrument};

use super::domain::{Role, RoleName};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Make sure every [`RoleName`] has a row. Existing rows are left untouched,
/// so running this on every start is safe.
#[instrument(skip(repo))]
pub async fn seed_roles<R: AuthRepository + ?Sized>(repo: &R) -> Result<Vec<Role>, AuthError> {
    let mut seeded = Vec::with_capacity(RoleName::ALL.len());
    for name in RoleName::ALL {
        if let Some(existing) = repo.find_role_by_name(name).await? {
            debug!(role = %name, "role present");
            seeded.push(existing);
            continue;
        }
        match repo.save_role(name, name.description()).await {
            Ok(role) => {
                info!(role = %name, "role_seeded");
                seeded.push(role);
            }
            // Another instance inserted it first.
            Err(AuthError::Conflict) => {
                let role = repo
                    .find_role_by_name(name)
                    .await?
                    .ok_or_else(|| AuthError::Repository(format!("role {name} vanished after conflict")))?;
                seeded.push(role);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(seeded)
}
