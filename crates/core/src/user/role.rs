use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::UserError;

/// Application role attached to a user.
///
/// Encoded as an integer on the wire and in the `user-roles:<id>` cache
/// entries. `Unknown` stands for a role the identity service reported that
/// is outside the closed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum UserRole {
    #[default]
    Unknown = 0,
    User = 1,
    Member = 2,
    Admin = 3,
}

impl UserRole {
    /// Every role, in encoding order.
    pub const ALL: [UserRole; 4] = [
        UserRole::Unknown,
        UserRole::User,
        UserRole::Member,
        UserRole::Admin,
    ];

    /// Returns the integer encoding of this role.
    pub const fn code(self) -> i64 {
        self as i64
    }

    /// Decodes a role from its integer encoding.
    pub fn from_code(code: i64) -> Result<Self, UserError> {
        Self::ALL
            .into_iter()
            .find(|role| role.code() == code)
            .ok_or(UserError::InvalidRole(code))
    }

    /// Returns the lowercase name of this role.
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Unknown => "unknown",
            UserRole::User => "user",
            UserRole::Member => "member",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for UserRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(deserializer)?;
        Self::from_code(code).map_err(serde::de::Error::custom)
    }
}

/// The identity service's own role vocabulary.
///
/// Only these three names exist on the identity side. Conversions to and
/// from [`UserRole`] are exhaustive matches, so adding a variant on either
/// side fails to compile until the table below is extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityRole {
    User,
    Member,
    Admin,
}

impl IdentityRole {
    /// Every identity-side role.
    pub const ALL: [IdentityRole; 3] = [
        IdentityRole::User,
        IdentityRole::Member,
        IdentityRole::Admin,
    ];

    /// Returns the role name used by the identity service.
    pub fn name(self) -> &'static str {
        match self {
            IdentityRole::User => "user",
            IdentityRole::Member => "member",
            IdentityRole::Admin => "admin",
        }
    }

    /// Looks up an identity role by the name the identity service uses.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.name() == name)
    }
}

impl From<IdentityRole> for UserRole {
    fn from(role: IdentityRole) -> Self {
        match role {
            IdentityRole::User => UserRole::User,
            IdentityRole::Member => UserRole::Member,
            IdentityRole::Admin => UserRole::Admin,
        }
    }
}

impl TryFrom<UserRole> for IdentityRole {
    type Error = UserError;

    fn try_from(role: UserRole) -> Result<Self, Self::Error> {
        match role {
            UserRole::User => Ok(IdentityRole::User),
            UserRole::Member => Ok(IdentityRole::Member),
            UserRole::Admin => Ok(IdentityRole::Admin),
            UserRole::Unknown => Err(UserError::UnassignableRole(role)),
        }
    }
}

/// Maps a role name reported by the identity service to a [`UserRole`].
///
/// Names outside the closed vocabulary map to `Unknown`.
pub fn role_from_identity_name(name: &str) -> UserRole {
    IdentityRole::from_name(name)
        .map(UserRole::from)
        .unwrap_or(UserRole::Unknown)
}
