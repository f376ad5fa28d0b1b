//! Privilege bits and grant-option bits
//!
//! Each privilege occupies one bit of a [`PrivilegeSet`]. An [`AclMode`]
//! pairs a set of privileges with the set of grant options over them.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::catalog::ObjectKind;

bitflags! {
    /// A set of privileges
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct PrivilegeSet: u16 {
        const INSERT = 1 << 0;
        const SELECT = 1 << 1;
        const UPDATE = 1 << 2;
        const DELETE = 1 << 3;
        const RULE = 1 << 4;
        const REFERENCES = 1 << 5;
        const TRIGGER = 1 << 6;
        const EXECUTE = 1 << 7;
        const USAGE = 1 << 8;
        const CREATE = 1 << 9;
        const CREATE_TEMP = 1 << 10;
        const CONNECT = 1 << 11;
    }
}

/// (bit, ACL letter, keyword) in display order
const PRIVILEGE_TABLE: [(PrivilegeSet, char, &str); 12] = [
    (PrivilegeSet::INSERT, 'a', "INSERT"),
    (PrivilegeSet::SELECT, 'r', "SELECT"),
    (PrivilegeSet::UPDATE, 'w', "UPDATE"),
    (PrivilegeSet::DELETE, 'd', "DELETE"),
    (PrivilegeSet::RULE, 'R', "RULE"),
    (PrivilegeSet::REFERENCES, 'x', "REFERENCES"),
    (PrivilegeSet::TRIGGER, 't', "TRIGGER"),
    (PrivilegeSet::EXECUTE, 'X', "EXECUTE"),
    (PrivilegeSet::USAGE, 'U', "USAGE"),
    (PrivilegeSet::CREATE, 'C', "CREATE"),
    (PrivilegeSet::CREATE_TEMP, 'T', "TEMP"),
    (PrivilegeSet::CONNECT, 'c', "CONNECT"),
];

impl PrivilegeSet {
    /// Parse one privilege keyword (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "insert" => Some(Self::INSERT),
            "select" => Some(Self::SELECT),
            "update" => Some(Self::UPDATE),
            "delete" => Some(Self::DELETE),
            "rule" => Some(Self::RULE),
            "references" => Some(Self::REFERENCES),
            "trigger" => Some(Self::TRIGGER),
            "execute" => Some(Self::EXECUTE),
            "usage" => Some(Self::USAGE),
            "create" => Some(Self::CREATE),
            "temporary" | "temp" => Some(Self::CREATE_TEMP),
            "connect" => Some(Self::CONNECT),
            _ => None,
        }
    }

    /// Keyword for a single privilege bit
    pub fn to_str(self) -> Option<&'static str> {
        PRIVILEGE_TABLE
            .iter()
            .find(|(bit, _, _)| *bit == self)
            .map(|(_, _, name)| *name)
    }

    /// Keywords of every privilege in the set, in display order
    pub fn names(self) -> Vec<&'static str> {
        PRIVILEGE_TABLE
            .iter()
            .filter(|(bit, _, _)| self.contains(*bit))
            .map(|(_, _, name)| *name)
            .collect()
    }

    /// ACL letters for the set, with `*` after each bit also in `grantable`
    pub fn letters(self, grantable: PrivilegeSet) -> String {
        let mut out = String::new();
        for (bit, letter, _) in PRIVILEGE_TABLE {
            if self.contains(bit) {
                out.push(letter);
                if grantable.contains(bit) {
                    out.push('*');
                }
            }
        }
        out
    }
}

impl fmt::Display for PrivilegeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(", "))
    }
}

impl ObjectKind {
    /// Every privilege meaningful for this kind of object
    pub fn all_rights(self) -> PrivilegeSet {
        match self {
            ObjectKind::Relation => {
                PrivilegeSet::INSERT
                    | PrivilegeSet::SELECT
                    | PrivilegeSet::UPDATE
                    | PrivilegeSet::DELETE
                    | PrivilegeSet::RULE
                    | PrivilegeSet::REFERENCES
                    | PrivilegeSet::TRIGGER
            }
            ObjectKind::Database => {
                PrivilegeSet::CREATE | PrivilegeSet::CREATE_TEMP | PrivilegeSet::CONNECT
            }
            ObjectKind::Function => PrivilegeSet::EXECUTE,
            ObjectKind::Language => PrivilegeSet::USAGE,
            ObjectKind::Namespace => PrivilegeSet::USAGE | PrivilegeSet::CREATE,
            ObjectKind::Tablespace => PrivilegeSet::CREATE,
        }
    }

    /// Noun used when a privilege does not apply to this kind
    pub(crate) fn grant_target(self) -> &'static str {
        match self {
            ObjectKind::Relation => "table",
            ObjectKind::Namespace => "schema",
            other => other.name(),
        }
    }
}

/// Whether a mask query needs every requested bit or just one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AclMaskHow {
    All,
    Any,
}

/// Privileges paired with grant options over them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AclMode {
    pub privileges: PrivilegeSet,
    pub grant_options: PrivilegeSet,
}

impl AclMode {
    pub const fn empty() -> Self {
        Self {
            privileges: PrivilegeSet::empty(),
            grant_options: PrivilegeSet::empty(),
        }
    }

    /// Privileges without grant options
    pub const fn privileges(privileges: PrivilegeSet) -> Self {
        Self {
            privileges,
            grant_options: PrivilegeSet::empty(),
        }
    }

    /// Grant options only
    pub const fn grant_options(grant_options: PrivilegeSet) -> Self {
        Self {
            privileges: PrivilegeSet::empty(),
            grant_options,
        }
    }

    /// Privileges together with the grant option on each
    pub const fn with_grant_option(privileges: PrivilegeSet) -> Self {
        Self {
            privileges,
            grant_options: privileges,
        }
    }

    pub fn is_empty(self) -> bool {
        self.privileges.is_empty() && self.grant_options.is_empty()
    }

    pub fn contains(self, other: AclMode) -> bool {
        self.privileges.contains(other.privileges)
            && self.grant_options.contains(other.grant_options)
    }

    pub fn intersects(self, other: AclMode) -> bool {
        self.privileges.intersects(other.privileges)
            || self.grant_options.intersects(other.grant_options)
    }

    #[must_use]
    pub fn union(self, other: AclMode) -> Self {
        Self {
            privileges: self.privileges | other.privileges,
            grant_options: self.grant_options | other.grant_options,
        }
    }

    #[must_use]
    pub fn intersection(self, other: AclMode) -> Self {
        Self {
            privileges: self.privileges & other.privileges,
            grant_options: self.grant_options & other.grant_options,
        }
    }

    #[must_use]
    pub fn difference(self, other: AclMode) -> Self {
        Self {
            privileges: self.privileges - other.privileges,
            grant_options: self.grant_options - other.grant_options,
        }
    }
}
