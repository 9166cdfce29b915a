use std::{fmt, str::FromStr};

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Profile role, stored as its lowercase name.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "moderador")]
    Moderador,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "superadmin")]
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderador => "moderador",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "moderador" => Ok(Role::Moderador),
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::Superadmin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

pub fn can_access_admin(role: Option<Role>) -> bool {
    matches!(
        role,
        Some(Role::Admin | Role::Superadmin | Role::Moderador)
    )
}

pub fn can_delete(role: Option<Role>) -> bool {
    matches!(role, Some(Role::Admin | Role::Superadmin))
}

pub fn can_manage_roles(role: Option<Role>) -> bool {
    is_superadmin(role)
}

pub fn is_superadmin(role: Option<Role>) -> bool {
    matches!(role, Some(Role::Superadmin))
}

/// The three independent capability flags derived from a role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Capabilities {
    pub has_access: bool,
    pub can_delete: bool,
    pub can_manage_roles: bool,
}

impl Capabilities {
    pub fn for_role(role: Option<Role>) -> Self {
        Self {
            has_access: can_access_admin(role),
            can_delete: can_delete(role),
            can_manage_roles: can_manage_roles(role),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Option<Role>; 5] = [
        None,
        Some(Role::User),
        Some(Role::Moderador),
        Some(Role::Admin),
        Some(Role::Superadmin),
    ];

    #[test]
    fn admin_access_for_staff_roles_only() {
        let allowed: Vec<_> = ALL.into_iter().filter(|r| can_access_admin(*r)).collect();
        assert_eq!(
            allowed,
            vec![Some(Role::Moderador), Some(Role::Admin), Some(Role::Superadmin)]
        );
    }

    #[test]
    fn delete_for_admin_and_superadmin() {
        let allowed: Vec<_> = ALL.into_iter().filter(|r| can_delete(*r)).collect();
        assert_eq!(allowed, vec![Some(Role::Admin), Some(Role::Superadmin)]);
    }

    #[test]
    fn role_management_is_superadmin_only() {
        for role in ALL {
            assert_eq!(can_manage_roles(role), role == Some(Role::Superadmin));
            assert_eq!(is_superadmin(role), role == Some(Role::Superadmin));
        }
    }

    #[test]
    fn missing_role_has_no_capabilities() {
        assert_eq!(Capabilities::for_role(None), Capabilities::none());
        assert_eq!(Capabilities::for_role(Some(Role::User)), Capabilities::none());
    }

    #[test]
    fn parses_known_roles() {
        assert_eq!("moderador".parse::<Role>(), Ok(Role::Moderador));
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::Superadmin.to_string(), "superadmin");
    }
}
