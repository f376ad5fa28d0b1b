//! Catalog error types

use thiserror::Error;

use super::{ObjectId, ObjectKind, RoleId};

/// Catalog operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Object id does not resolve in its catalog table
    #[error("{kind} with OID {id} does not exist")]
    UndefinedObject { kind: ObjectKind, id: ObjectId },

    /// Role id does not resolve
    #[error("role with OID {0} does not exist")]
    UndefinedRole(RoleId),

    /// Object name already taken within its catalog table
    #[error("{kind} \"{name}\" already exists")]
    DuplicateObject { kind: ObjectKind, name: String },

    /// Role name already taken
    #[error("role \"{0}\" already exists")]
    DuplicateRole(String),

    /// Membership would make a role a member of itself
    #[error("role {role} is a member of role {member}")]
    CircularMembership { member: RoleId, role: RoleId },

    /// Row already written by the current command
    #[error("tuple for {kind} {id} already updated by self")]
    TupleAlreadyUpdated { kind: ObjectKind, id: ObjectId },

    /// Role is still referenced by owned objects or ACL entries
    #[error("role {role} cannot be dropped because {count} objects depend on it")]
    RoleHasDependents { role: RoleId, count: usize },
}

impl CatalogError {
    /// Five-character SQLSTATE for this error
    pub fn sqlstate(&self) -> &'static str {
        match self {
            CatalogError::UndefinedObject { .. } | CatalogError::UndefinedRole(_) => "42704",
            CatalogError::DuplicateObject { .. } | CatalogError::DuplicateRole(_) => "42710",
            CatalogError::CircularMembership { .. } => "0LP01",
            CatalogError::TupleAlreadyUpdated { .. } => "XX000",
            CatalogError::RoleHasDependents { .. } => "2BP01",
        }
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
