//! Per-kind adapters for the generic grant and check paths
//!
//! Each securable kind supplies one zero-sized type implementing
//! [`SecurableKind`]. The trait's provided methods cover the common case;
//! a kind only overrides what differs (target validation, the owner of
//! languages, and the special mask rules for system catalogs, temporary
//! schemas, and the global tablespace).

use std::collections::BTreeSet;

use super::check::AccessControl;
use super::default::default_acl;
use super::error::{AclError, AclResult};
use super::item::Acl;
use super::privilege::{AclMaskHow, AclMode, PrivilegeSet};
use crate::catalog::system_tables::{BOOTSTRAP_SUPERUSER_ID, GLOBAL_TABLESPACE_ID};
use crate::catalog::{
    Catalog, CatalogRow, CatalogTable, DatabaseRow, FunctionRow, LanguageRow, NamespaceRow,
    ObjectId, ObjectKind, RelationKind, RelationRow, RoleId, RoleMembership, RowUpdate,
    TablespaceRow,
};

/// Outcome of a kind's special mask rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskGuard {
    /// Continue the normal evaluation with this (possibly reduced) mask
    Proceed(AclMode),
    /// The answer is already known
    Decided(AclMode),
}

/// Capabilities the generic grant and check paths need from one kind
pub trait SecurableKind {
    type Row: CatalogRow;

    const KIND: ObjectKind;

    /// Catalog table holding this kind's rows
    fn table(catalog: &Catalog) -> &CatalogTable<Self::Row>;

    /// Row visible to the current command
    fn fetch_row(catalog: &Catalog, id: ObjectId) -> AclResult<Self::Row> {
        Self::table(catalog)
            .lookup_row(id, catalog.command_id())
            .ok_or(AclError::UndefinedObject {
                kind: Self::KIND,
                id,
            })
    }

    /// Reject rows that cannot carry grants
    fn validate_grant_target(_row: &Self::Row) -> AclResult<()> {
        Ok(())
    }

    fn owner_of(row: &Self::Row) -> RoleId {
        row.owner().unwrap_or(BOOTSTRAP_SUPERUSER_ID)
    }

    /// Stored ACL, or the kind's default when none is stored
    fn acl_of(row: &Self::Row) -> Acl {
        row.acl()
            .cloned()
            .unwrap_or_else(|| Self::default_acl(Self::owner_of(row)))
    }

    fn default_acl(owner: RoleId) -> Acl {
        default_acl(Self::KIND, owner)
    }

    fn all_rights_mask() -> PrivilegeSet {
        Self::KIND.all_rights()
    }

    /// Kind-specific rule applied before the superuser and ACL checks
    fn guard_mask(
        _ctx: &AccessControl<'_>,
        _id: ObjectId,
        _row: &Self::Row,
        _role: RoleId,
        mask: AclMode,
    ) -> AclResult<MaskGuard> {
        Ok(MaskGuard::Proceed(mask))
    }

    /// Write `acl` as a new version of the row at the current command id
    fn persist_new_acl(
        catalog: &Catalog,
        id: ObjectId,
        row: &Self::Row,
        acl: Acl,
    ) -> AclResult<()> {
        let updated = RowUpdate::from_row(row).acl(acl).build();
        Self::table(catalog).insert_new_version(id, updated, catalog.command_id())?;
        Ok(())
    }

    fn record_dependency_delta(
        catalog: &Catalog,
        id: ObjectId,
        owner: RoleId,
        old_members: &BTreeSet<RoleId>,
        new_members: &BTreeSet<RoleId>,
    ) {
        catalog.update_acl_dependencies(Self::KIND, id, Some(owner), old_members, new_members);
    }
}

pub struct Relations;
pub struct Databases;
pub struct Functions;
pub struct Languages;
pub struct Namespaces;
pub struct Tablespaces;

impl SecurableKind for Relations {
    type Row = RelationRow;
    const KIND: ObjectKind = ObjectKind::Relation;

    fn table(catalog: &Catalog) -> &CatalogTable<RelationRow> {
        catalog.relations()
    }

    fn validate_grant_target(row: &RelationRow) -> AclResult<()> {
        let message = match row.kind {
            RelationKind::Index => format!("\"{}\" is an index", row.name),
            RelationKind::CompositeType => format!("\"{}\" is a composite type", row.name),
            _ => return Ok(()),
        };
        Err(AclError::WrongObjectType {
            message,
            hint: None,
        })
    }

    /// Writes to system catalogs need catupdate or explicit permission,
    /// even for superusers. Views are exempt.
    fn guard_mask(
        ctx: &AccessControl<'_>,
        id: ObjectId,
        row: &RelationRow,
        role: RoleId,
        mask: AclMode,
    ) -> AclResult<MaskGuard> {
        let writes = PrivilegeSet::INSERT | PrivilegeSet::UPDATE | PrivilegeSet::DELETE;
        if mask.privileges.intersects(writes)
            && row.is_system_class()
            && row.kind != RelationKind::View
            && !ctx.session().allow_system_table_mods()
            && !ctx.catalog().roles().has_catupdate(role)
        {
            tracing::debug!(relation = %id, role = %role, "denied write on system catalog");
            return Ok(MaskGuard::Proceed(mask.difference(AclMode::with_grant_option(writes))));
        }
        Ok(MaskGuard::Proceed(mask))
    }
}

impl SecurableKind for Databases {
    type Row = DatabaseRow;
    const KIND: ObjectKind = ObjectKind::Database;

    fn table(catalog: &Catalog) -> &CatalogTable<DatabaseRow> {
        catalog.databases()
    }
}

impl SecurableKind for Functions {
    type Row = FunctionRow;
    const KIND: ObjectKind = ObjectKind::Function;

    fn table(catalog: &Catalog) -> &CatalogTable<FunctionRow> {
        catalog.functions()
    }
}

impl SecurableKind for Languages {
    type Row = LanguageRow;
    const KIND: ObjectKind = ObjectKind::Language;

    fn table(catalog: &Catalog) -> &CatalogTable<LanguageRow> {
        catalog.languages()
    }

    /// Applies to every caller, superusers included
    fn validate_grant_target(row: &LanguageRow) -> AclResult<()> {
        if row.trusted {
            return Ok(());
        }
        Err(AclError::WrongObjectType {
            message: format!("language \"{}\" is not trusted", row.name),
            hint: Some("Only superusers may use untrusted languages.".to_string()),
        })
    }

    /// Languages have no owner column; they belong to the bootstrap superuser.
    fn owner_of(_row: &LanguageRow) -> RoleId {
        BOOTSTRAP_SUPERUSER_ID
    }
}

impl SecurableKind for Namespaces {
    type Row = NamespaceRow;
    const KIND: ObjectKind = ObjectKind::Namespace;

    fn table(catalog: &Catalog) -> &CatalogTable<NamespaceRow> {
        catalog.namespaces()
    }

    /// The session's temporary schema is usable by whoever may create
    /// temporary objects in the current database.
    fn guard_mask(
        ctx: &AccessControl<'_>,
        id: ObjectId,
        _row: &NamespaceRow,
        role: RoleId,
        mask: AclMode,
    ) -> AclResult<MaskGuard> {
        if !ctx.session().is_temp_namespace(id) || ctx.catalog().roles().is_superuser(role) {
            return Ok(MaskGuard::Proceed(mask));
        }
        let may_create_temp = !ctx
            .aclmask(
                ObjectKind::Database,
                ctx.session().database(),
                role,
                AclMode::privileges(PrivilegeSet::CREATE_TEMP),
                AclMaskHow::Any,
            )?
            .is_empty();
        let granted = if may_create_temp {
            AclMode::with_grant_option(Self::all_rights_mask())
        } else {
            AclMode::with_grant_option(PrivilegeSet::USAGE)
        };
        tracing::debug!(namespace = %id, role = %role, may_create_temp, "temporary schema check");
        Ok(MaskGuard::Decided(mask.intersection(granted)))
    }
}

impl SecurableKind for Tablespaces {
    type Row = TablespaceRow;
    const KIND: ObjectKind = ObjectKind::Tablespace;

    fn table(catalog: &Catalog) -> &CatalogTable<TablespaceRow> {
        catalog.tablespaces()
    }

    /// Nobody may use the global tablespace outside bootstrap.
    fn guard_mask(
        ctx: &AccessControl<'_>,
        id: ObjectId,
        _row: &TablespaceRow,
        _role: RoleId,
        mask: AclMode,
    ) -> AclResult<MaskGuard> {
        if id == GLOBAL_TABLESPACE_ID && !ctx.session().in_bootstrap_mode() {
            return Ok(MaskGuard::Decided(AclMode::empty()));
        }
        Ok(MaskGuard::Proceed(mask))
    }
}
