use super::domain::{Principal, RoleName};

/// Authenticated identity for the current request, passed explicitly instead
/// of living in process-wide state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    principal: Option<Principal>,
}

impl SecurityContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self { principal: Some(principal) }
    }

    pub fn set_principal(&mut self, principal: Principal) {
        self.principal = Some(principal);
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    pub fn has_role(&self, role: RoleName) -> bool {
        self.principal.as_ref().is_some_and(|p| p.roles.contains(&role))
    }
}
