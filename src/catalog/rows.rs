//! Row layouts for the securable catalog tables

use serde::{Deserialize, Serialize};

use super::system_tables::{PG_CATALOG_NAMESPACE, PG_TOAST_NAMESPACE};
use super::table::CatalogRow;
use super::{ColumnDef, ObjectId, RoleId};
use crate::acl::Acl;

/// What a relation row describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// Ordinary table
    Table,
    /// Secondary index
    Index,
    /// Sequence generator
    Sequence,
    /// View
    View,
    /// Standalone composite type
    CompositeType,
    /// Out-of-line storage for wide values
    Toast,
}

/// Relation metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRow {
    /// Relation name
    pub name: String,
    /// Containing namespace
    pub namespace: ObjectId,
    /// Owning role
    pub owner: RoleId,
    /// Relation kind
    pub kind: RelationKind,
    /// Stored ACL (None = default)
    pub acl: Option<Acl>,
    /// Column definitions
    pub columns: Vec<ColumnDef>,
    /// Pages on disk, from the last statistics pass
    pub pages: u32,
    /// Tuples, from the last statistics pass
    pub tuples: u32,
}

impl RelationRow {
    /// Create an empty ordinary table
    pub fn new(name: impl Into<String>, namespace: ObjectId, owner: RoleId) -> Self {
        Self {
            name: name.into(),
            namespace,
            owner,
            kind: RelationKind::Table,
            acl: None,
            columns: Vec::new(),
            pages: 0,
            tuples: 0,
        }
    }

    /// Set the relation kind
    #[must_use]
    pub fn kind(mut self, kind: RelationKind) -> Self {
        self.kind = kind;
        self
    }

    /// Add a column
    #[must_use]
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Set page and tuple statistics
    #[must_use]
    pub fn stats(mut self, pages: u32, tuples: u32) -> Self {
        self.pages = pages;
        self.tuples = tuples;
        self
    }

    /// Whether this relation lives in a system namespace
    pub fn is_system_class(&self) -> bool {
        self.namespace == PG_CATALOG_NAMESPACE || self.namespace == PG_TOAST_NAMESPACE
    }
}

/// Database metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseRow {
    pub name: String,
    pub owner: RoleId,
    pub acl: Option<Acl>,
}

impl DatabaseRow {
    pub fn new(name: impl Into<String>, owner: RoleId) -> Self {
        Self {
            name: name.into(),
            owner,
            acl: None,
        }
    }
}

/// Function metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRow {
    pub name: String,
    pub namespace: ObjectId,
    pub language: ObjectId,
    pub owner: RoleId,
    pub acl: Option<Acl>,
}

impl FunctionRow {
    pub fn new(
        name: impl Into<String>,
        namespace: ObjectId,
        language: ObjectId,
        owner: RoleId,
    ) -> Self {
        Self {
            name: name.into(),
            namespace,
            language,
            owner,
            acl: None,
        }
    }
}

/// Procedural language metadata
///
/// Languages carry no owner column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRow {
    pub name: String,
    /// Untrusted languages may only be used by superusers
    pub trusted: bool,
    pub acl: Option<Acl>,
}

impl LanguageRow {
    pub fn new(name: impl Into<String>, trusted: bool) -> Self {
        Self {
            name: name.into(),
            trusted,
            acl: None,
        }
    }
}

/// Schema metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceRow {
    pub name: String,
    pub owner: RoleId,
    pub acl: Option<Acl>,
}

impl NamespaceRow {
    pub fn new(name: impl Into<String>, owner: RoleId) -> Self {
        Self {
            name: name.into(),
            owner,
            acl: None,
        }
    }
}

/// Tablespace metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablespaceRow {
    pub name: String,
    pub owner: RoleId,
    pub acl: Option<Acl>,
}

impl TablespaceRow {
    pub fn new(name: impl Into<String>, owner: RoleId) -> Self {
        Self {
            name: name.into(),
            owner,
            acl: None,
        }
    }
}

impl CatalogRow for RelationRow {
    fn name(&self) -> &str {
        &self.name
    }
    fn owner(&self) -> Option<RoleId> {
        Some(self.owner)
    }
    fn acl(&self) -> Option<&Acl> {
        self.acl.as_ref()
    }
    fn set_acl(&mut self, acl: Option<Acl>) {
        self.acl = acl;
    }
}

impl CatalogRow for DatabaseRow {
    fn name(&self) -> &str {
        &self.name
    }
    fn owner(&self) -> Option<RoleId> {
        Some(self.owner)
    }
    fn acl(&self) -> Option<&Acl> {
        self.acl.as_ref()
    }
    fn set_acl(&mut self, acl: Option<Acl>) {
        self.acl = acl;
    }
}

impl CatalogRow for FunctionRow {
    fn name(&self) -> &str {
        &self.name
    }
    fn owner(&self) -> Option<RoleId> {
        Some(self.owner)
    }
    fn acl(&self) -> Option<&Acl> {
        self.acl.as_ref()
    }
    fn set_acl(&mut self, acl: Option<Acl>) {
        self.acl = acl;
    }
}

impl CatalogRow for LanguageRow {
    fn name(&self) -> &str {
        &self.name
    }
    fn owner(&self) -> Option<RoleId> {
        None
    }
    fn acl(&self) -> Option<&Acl> {
        self.acl.as_ref()
    }
    fn set_acl(&mut self, acl: Option<Acl>) {
        self.acl = acl;
    }
}

impl CatalogRow for NamespaceRow {
    fn name(&self) -> &str {
        &self.name
    }
    fn owner(&self) -> Option<RoleId> {
        Some(self.owner)
    }
    fn acl(&self) -> Option<&Acl> {
        self.acl.as_ref()
    }
    fn set_acl(&mut self, acl: Option<Acl>) {
        self.acl = acl;
    }
}

impl CatalogRow for TablespaceRow {
    fn name(&self) -> &str {
        &self.name
    }
    fn owner(&self) -> Option<RoleId> {
        Some(self.owner)
    }
    fn acl(&self) -> Option<&Acl> {
        self.acl.as_ref()
    }
    fn set_acl(&mut self, acl: Option<Acl>) {
        self.acl = acl;
    }
}
