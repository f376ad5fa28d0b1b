//! Catalog - securable object metadata, roles, and shared dependencies
//!
//! The catalog holds one multi-version table per securable object kind.
//! Reads see rows as of the current command id; every DDL or ACL write
//! happens at the current command id and becomes visible once the command
//! counter is advanced with [`Catalog::commit_and_refresh_snapshot`].

pub mod dependency;
pub mod error;
pub mod roles;
pub mod rows;
pub mod system_tables;
pub mod table;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};

pub use dependency::{DependencyType, SharedDependencies, SharedDependency};
pub use error::{CatalogError, CatalogResult};
pub use roles::{RoleGraph, RoleMembership, RoleRow};
pub use rows::{
    DatabaseRow, FunctionRow, LanguageRow, NamespaceRow, RelationKind, RelationRow, TablespaceRow,
};
pub use table::{CatalogRow, CatalogTable, CommandId, RowUpdate};

/// Object identifier, unique within its catalog table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleId(pub u32);

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds of objects that carry an ACL
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Relation,
    Database,
    Function,
    Language,
    Namespace,
    Tablespace,
}

impl ObjectKind {
    /// Every securable kind
    pub const ALL: [ObjectKind; 6] = [
        ObjectKind::Relation,
        ObjectKind::Database,
        ObjectKind::Function,
        ObjectKind::Language,
        ObjectKind::Namespace,
        ObjectKind::Tablespace,
    ];

    /// User-facing name of the kind
    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Relation => "relation",
            ObjectKind::Database => "database",
            ObjectKind::Function => "function",
            ObjectKind::Language => "language",
            ObjectKind::Namespace => "schema",
            ObjectKind::Tablespace => "tablespace",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Column data types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// Boolean (true/false)
    Boolean,
    /// 8-bit signed integer
    TinyInt,
    /// 16-bit signed integer
    SmallInt,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    BigInt,
    /// 32-bit floating point
    Float,
    /// 64-bit floating point
    Double,
    /// Variable-length string with max length
    Varchar(u32),
    /// Unlimited text
    Text,
    /// Binary data
    Blob,
    /// Timestamp (date and time)
    Timestamp,
}

impl DataType {
    /// Fixed storage length in bytes, `None` for variable-length types
    pub fn type_len(&self) -> Option<u32> {
        match self {
            DataType::Boolean | DataType::TinyInt => Some(1),
            DataType::SmallInt => Some(2),
            DataType::Int | DataType::Float => Some(4),
            DataType::BigInt | DataType::Double | DataType::Timestamp => Some(8),
            DataType::Varchar(_) | DataType::Text | DataType::Blob => None,
        }
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
}

impl ColumnDef {
    /// Create a new column definition
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// The system catalog
pub struct Catalog {
    relations: CatalogTable<RelationRow>,
    databases: CatalogTable<DatabaseRow>,
    functions: CatalogTable<FunctionRow>,
    languages: CatalogTable<LanguageRow>,
    namespaces: CatalogTable<NamespaceRow>,
    tablespaces: CatalogTable<TablespaceRow>,
    roles: RwLock<RoleGraph>,
    dependencies: RwLock<SharedDependencies>,
    command_id: AtomicU32,
    next_oid: AtomicU32,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            relations: CatalogTable::new("pg_class", ObjectKind::Relation),
            databases: CatalogTable::new("pg_database", ObjectKind::Database),
            functions: CatalogTable::new("pg_proc", ObjectKind::Function),
            languages: CatalogTable::new("pg_language", ObjectKind::Language),
            namespaces: CatalogTable::new("pg_namespace", ObjectKind::Namespace),
            tablespaces: CatalogTable::new("pg_tablespace", ObjectKind::Tablespace),
            roles: RwLock::new(RoleGraph::new()),
            dependencies: RwLock::new(SharedDependencies::new()),
            command_id: AtomicU32::new(1),
            next_oid: AtomicU32::new(system_tables::FIRST_NORMAL_OBJECT_ID),
        }
    }

    /// Create a catalog populated with the bootstrap objects
    pub fn bootstrap() -> CatalogResult<Self> {
        let catalog = Self::new();
        system_tables::bootstrap(&catalog)?;
        Ok(catalog)
    }

    pub fn relations(&self) -> &CatalogTable<RelationRow> {
        &self.relations
    }

    pub fn databases(&self) -> &CatalogTable<DatabaseRow> {
        &self.databases
    }

    pub fn functions(&self) -> &CatalogTable<FunctionRow> {
        &self.functions
    }

    pub fn languages(&self) -> &CatalogTable<LanguageRow> {
        &self.languages
    }

    pub fn namespaces(&self) -> &CatalogTable<NamespaceRow> {
        &self.namespaces
    }

    pub fn tablespaces(&self) -> &CatalogTable<TablespaceRow> {
        &self.tablespaces
    }

    /// Current command id; reads at this snapshot see all earlier commands
    pub fn command_id(&self) -> CommandId {
        self.command_id.load(Ordering::Acquire)
    }

    /// Advance the command counter so this command's writes become visible
    pub fn commit_and_refresh_snapshot(&self) -> CommandId {
        let next = self.command_id.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::trace!(command_id = next, "advanced command counter");
        next
    }

    /// Read access to the role graph
    pub fn roles(&self) -> RwLockReadGuard<'_, RoleGraph> {
        self.roles.read()
    }

    /// Read access to the shared dependency edges
    pub fn dependencies(&self) -> RwLockReadGuard<'_, SharedDependencies> {
        self.dependencies.read()
    }

    /// Resolve a role name
    pub fn role_id(&self, name: &str) -> Option<RoleId> {
        self.roles.read().by_name(name).map(|r| r.id)
    }

    /// Add a role, allocating its id
    pub fn create_role(&self, name: &str) -> CatalogResult<RoleId> {
        let id = RoleId(self.allocate_oid());
        self.add_role(RoleRow::new(id, name))?;
        Ok(id)
    }

    /// Add a fully specified role
    pub fn add_role(&self, role: RoleRow) -> CatalogResult<()> {
        let id = role.id;
        self.roles.write().insert(role)?;
        tracing::debug!(role = %id, "created role");
        Ok(())
    }

    /// Make `member` a member of `role`
    pub fn grant_role_membership(&self, member: RoleId, role: RoleId) -> CatalogResult<()> {
        self.roles.write().add_membership(member, role)
    }

    /// Drop a role that nothing depends on any more
    pub fn drop_role(&self, role: RoleId) -> CatalogResult<()> {
        let count = self.dependencies.read().dependent_count(role);
        if count > 0 {
            return Err(CatalogError::RoleHasDependents { role, count });
        }
        self.roles.write().remove(role)?;
        tracing::debug!(role = %role, "dropped role");
        Ok(())
    }

    /// Bring ACL dependency edges of one object in line with a changed ACL
    pub fn update_acl_dependencies(
        &self,
        kind: ObjectKind,
        object: ObjectId,
        owner: Option<RoleId>,
        old_members: &BTreeSet<RoleId>,
        new_members: &BTreeSet<RoleId>,
    ) {
        let (added, removed) = self.dependencies.write().update_acl_dependencies(
            kind,
            object,
            owner,
            old_members,
            new_members,
        );
        if added + removed > 0 {
            tracing::debug!(%kind, object = %object, added, removed, "updated acl dependencies");
        }
    }

    pub fn create_relation(&self, row: RelationRow) -> CatalogResult<ObjectId> {
        let owner = row.owner;
        self.create_object(&self.relations, row, Some(owner))
    }

    pub fn create_database(&self, row: DatabaseRow) -> CatalogResult<ObjectId> {
        let owner = row.owner;
        self.create_object(&self.databases, row, Some(owner))
    }

    pub fn create_function(&self, row: FunctionRow) -> CatalogResult<ObjectId> {
        let owner = row.owner;
        self.create_object(&self.functions, row, Some(owner))
    }

    pub fn create_language(&self, row: LanguageRow) -> CatalogResult<ObjectId> {
        self.create_object(&self.languages, row, None)
    }

    pub fn create_namespace(&self, row: NamespaceRow) -> CatalogResult<ObjectId> {
        let owner = row.owner;
        self.create_object(&self.namespaces, row, Some(owner))
    }

    pub fn create_tablespace(&self, row: TablespaceRow) -> CatalogResult<ObjectId> {
        let owner = row.owner;
        self.create_object(&self.tablespaces, row, Some(owner))
    }

    fn create_object<R: CatalogRow>(
        &self,
        table: &CatalogTable<R>,
        row: R,
        owner: Option<RoleId>,
    ) -> CatalogResult<ObjectId> {
        let id = ObjectId(self.allocate_oid());
        self.insert_with_id(table, id, row, owner)?;
        Ok(id)
    }

    pub(crate) fn insert_with_id<R: CatalogRow>(
        &self,
        table: &CatalogTable<R>,
        id: ObjectId,
        row: R,
        owner: Option<RoleId>,
    ) -> CatalogResult<()> {
        if let Some(owner) = owner {
            if !self.roles.read().contains(owner) {
                return Err(CatalogError::UndefinedRole(owner));
            }
        }
        let name = row.name().to_string();
        let _guard = table.acquire_lock();
        table.insert_row(id, row, self.command_id())?;
        if let Some(owner) = owner {
            self.dependencies
                .write()
                .record_owner(table.kind(), id, owner);
        }
        self.commit_and_refresh_snapshot();
        tracing::debug!(kind = %table.kind(), id = %id, name = %name, "created object");
        Ok(())
    }

    fn allocate_oid(&self) -> u32 {
        self.next_oid.fetch_add(1, Ordering::AcqRel)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("command_id", &self.command_id())
            .finish_non_exhaustive()
    }
}
