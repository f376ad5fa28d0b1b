//! Access control error types

use thiserror::Error;

use crate::catalog::{CatalogError, ObjectId, ObjectKind, RoleId};

/// Errors raised by GRANT/REVOKE and privilege checks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AclError {
    /// Object id does not resolve
    #[error("{kind} with OID {id} does not exist")]
    UndefinedObject { kind: ObjectKind, id: ObjectId },

    /// Object name does not resolve
    #[error("{kind} \"{name}\" does not exist")]
    UndefinedObjectName { kind: ObjectKind, name: String },

    /// Role id does not resolve
    #[error("role with OID {0} does not exist")]
    UndefinedRole(RoleId),

    /// Role name does not resolve
    #[error("role \"{0}\" does not exist")]
    UndefinedRoleName(String),

    /// Object exists but privileges cannot be granted on it
    #[error("{message}")]
    WrongObjectType {
        message: String,
        hint: Option<String>,
    },

    /// Malformed request (bad privilege for the kind, grant option to PUBLIC)
    #[error("{0}")]
    InvalidGrantOperation(String),

    /// Acting role lacks the privilege or ownership required
    #[error("{0}")]
    InsufficientPrivilege(String),

    /// RESTRICT revoke would orphan privileges granted onward
    #[error("dependent privileges exist")]
    DependentPrivilegesExist,

    /// Catalog failure
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Broken internal invariant
    #[error("internal error: {0}")]
    Internal(String),
}

impl AclError {
    /// Five-character SQLSTATE for this error
    pub fn sqlstate(&self) -> &'static str {
        match self {
            AclError::UndefinedObject { .. }
            | AclError::UndefinedObjectName { .. }
            | AclError::UndefinedRole(_)
            | AclError::UndefinedRoleName(_) => "42704",
            AclError::WrongObjectType { .. } => "42809",
            AclError::InvalidGrantOperation(_) => "0LP01",
            AclError::InsufficientPrivilege(_) => "42501",
            AclError::DependentPrivilegesExist => "2BP01",
            AclError::Catalog(err) => err.sqlstate(),
            AclError::Internal(_) => "XX000",
        }
    }

    /// Hint text accompanying the error, if any
    pub fn hint(&self) -> Option<&str> {
        match self {
            AclError::WrongObjectType { hint, .. } => hint.as_deref(),
            AclError::DependentPrivilegesExist => Some("Use CASCADE to revoke them too."),
            _ => None,
        }
    }
}

/// Result type for access control operations
pub type AclResult<T> = Result<T, AclError>;
