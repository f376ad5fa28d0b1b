//! Privilege and ownership predicates
//!
//! These never mutate the catalog. Each call reads the object's row at the
//! current command id and holds the role graph only for the duration of the
//! ACL evaluation.

use super::error::{AclError, AclResult};
use super::privilege::{AclMaskHow, AclMode, PrivilegeSet};
use super::securable::{
    Databases, Functions, Languages, MaskGuard, Namespaces, Relations, SecurableKind, Tablespaces,
};
use crate::catalog::{Catalog, ObjectId, ObjectKind, RoleId, RoleMembership};
use crate::session::Session;

/// Result of a privilege or ownership check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AclCheck {
    Ok,
    NoPrivilege,
    NotOwner,
}

/// Access-control entry points bound to one catalog and session
#[derive(Debug, Clone, Copy)]
pub struct AccessControl<'a> {
    catalog: &'a Catalog,
    session: &'a Session,
}

impl<'a> AccessControl<'a> {
    pub fn new(catalog: &'a Catalog, session: &'a Session) -> Self {
        Self { catalog, session }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn session(&self) -> &'a Session {
        self.session
    }

    /// Subset of `mask` that `role` holds on the object
    pub fn aclmask(
        &self,
        kind: ObjectKind,
        id: ObjectId,
        role: RoleId,
        mask: AclMode,
        how: AclMaskHow,
    ) -> AclResult<AclMode> {
        match kind {
            ObjectKind::Relation => self.aclmask_for::<Relations>(id, role, mask, how),
            ObjectKind::Database => self.aclmask_for::<Databases>(id, role, mask, how),
            ObjectKind::Function => self.aclmask_for::<Functions>(id, role, mask, how),
            ObjectKind::Language => self.aclmask_for::<Languages>(id, role, mask, how),
            ObjectKind::Namespace => self.aclmask_for::<Namespaces>(id, role, mask, how),
            ObjectKind::Tablespace => self.aclmask_for::<Tablespaces>(id, role, mask, how),
        }
    }

    pub(crate) fn aclmask_for<K: SecurableKind>(
        &self,
        id: ObjectId,
        role: RoleId,
        mask: AclMode,
        how: AclMaskHow,
    ) -> AclResult<AclMode> {
        let row = K::fetch_row(self.catalog, id)?;
        let mask = match K::guard_mask(self, id, &row, role, mask)? {
            MaskGuard::Proceed(mask) => mask,
            MaskGuard::Decided(granted) => return Ok(granted),
        };

        let roles = self.catalog.roles();
        if roles.is_superuser(role) {
            return Ok(mask);
        }
        let owner = K::owner_of(&row);
        Ok(K::acl_of(&row).mask(role, owner, mask, how, &*roles))
    }

    /// Whether `role` holds any of `privileges` on the object
    pub fn check_privilege(
        &self,
        kind: ObjectKind,
        id: ObjectId,
        role: RoleId,
        privileges: PrivilegeSet,
    ) -> AclResult<AclCheck> {
        let granted = self.aclmask(kind, id, role, AclMode::privileges(privileges), AclMaskHow::Any)?;
        if granted.is_empty() {
            Ok(AclCheck::NoPrivilege)
        } else {
            Ok(AclCheck::Ok)
        }
    }

    /// Whether `role` owns the object, directly or through membership
    pub fn check_ownership(&self, kind: ObjectKind, id: ObjectId, role: RoleId) -> AclResult<bool> {
        match kind {
            ObjectKind::Relation => self.ownercheck_for::<Relations>(id, role),
            ObjectKind::Database => self.ownercheck_for::<Databases>(id, role),
            ObjectKind::Function => self.ownercheck_for::<Functions>(id, role),
            ObjectKind::Language => self.ownercheck_for::<Languages>(id, role),
            ObjectKind::Namespace => self.ownercheck_for::<Namespaces>(id, role),
            ObjectKind::Tablespace => self.ownercheck_for::<Tablespaces>(id, role),
        }
    }

    fn ownercheck_for<K: SecurableKind>(&self, id: ObjectId, role: RoleId) -> AclResult<bool> {
        let row = K::fetch_row(self.catalog, id)?;
        let roles = self.catalog.roles();
        Ok(roles.is_superuser(role) || roles.has_privs_of(role, K::owner_of(&row)))
    }
}

/// Turn a failed check into the standard error for its kind
///
/// `name` is used as given; callers quote it if needed.
pub fn aclcheck_error(result: AclCheck, kind: ObjectKind, name: &str) -> AclResult<()> {
    match result {
        AclCheck::Ok => Ok(()),
        AclCheck::NoPrivilege => Err(AclError::InsufficientPrivilege(no_privilege_message(
            kind, name,
        ))),
        AclCheck::NotOwner => Err(AclError::InsufficientPrivilege(not_owner_message(
            kind, name,
        ))),
    }
}

pub(crate) fn no_privilege_message(kind: ObjectKind, name: &str) -> String {
    format!("permission denied for {} {name}", kind.name())
}

fn not_owner_message(kind: ObjectKind, name: &str) -> String {
    format!("must be owner of {} {name}", kind.name())
}
