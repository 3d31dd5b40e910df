//! The authenticated caller and its role.

use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            other => Err(EngineError::Validation(format!("invalid role: {other}"))),
        }
    }
}

/// The caller of an engine operation.
///
/// Every operation that touches user-owned data takes a `Principal` and runs
/// it through the checks in `ops::access`; nothing else branches on the role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Principal {
    pub id: i64,
    pub role: Role,
}

impl Principal {
    pub fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the principal may act on data owned by `user_id`.
    pub fn is_self_or_admin(&self, user_id: i64) -> bool {
        self.is_admin() || self.id == user_id
    }

    pub(crate) fn require_admin(&self) -> Result<(), EngineError> {
        if !self.is_admin() {
            return Err(EngineError::AccessDenied("admin role required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_bypasses_ownership() {
        let admin = Principal::new(1, Role::Admin);
        assert!(admin.is_self_or_admin(1));
        assert!(admin.is_self_or_admin(42));
        assert!(admin.require_admin().is_ok());
    }

    #[test]
    fn user_is_limited_to_self() {
        let user = Principal::new(5, Role::User);
        assert!(user.is_self_or_admin(5));
        assert!(!user.is_self_or_admin(6));
        assert_eq!(
            user.require_admin(),
            Err(EngineError::AccessDenied("admin role required".to_string()))
        );
    }

    #[test]
    fn role_round_trips_through_storage_strings() {
        assert_eq!(Role::try_from(Role::Admin.as_str()).unwrap(), Role::Admin);
        assert_eq!(Role::try_from(Role::User.as_str()).unwrap(), Role::User);
        assert!(Role::try_from("admin").is_err());
    }
}
