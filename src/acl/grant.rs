//! GRANT and REVOKE execution
//!
//! Every object kind follows the same protocol, implemented once in
//! [`AccessControl::exec_grant`] over a [`SecurableKind`]:
//!
//! 1. resolve the row, failing if it does not exist
//! 2. reject targets that cannot carry grants
//! 3. load the owner and the ACL (default if none is stored)
//! 4. pick the grantor; with no grant options, require some privilege at all
//! 5. clip the privileges to what the grantor may pass on, warning if clipped
//! 6. merge, persist as a new row version, and update dependency edges
//!
//! The command counter is advanced after each object so that an object
//! named twice in one statement sees its own earlier update.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::check::{no_privilege_message, AccessControl};
use super::error::{AclError, AclResult};
use super::grantor::select_best_grantor;
use super::item::{CascadeBehavior, Grantee};
use super::merge::{merge_acl_with_grant, AclChange};
use super::privilege::{AclMaskHow, AclMode, PrivilegeSet};
use super::securable::{
    Databases, Functions, Languages, Namespaces, Relations, SecurableKind, Tablespaces,
};
use crate::catalog::{CatalogRow, DependencyType, ObjectId, ObjectKind, RoleId};

/// A GRANT or REVOKE over object ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRequest {
    pub is_grant: bool,
    pub object_kind: ObjectKind,
    pub objects: Vec<ObjectId>,
    /// ALL [PRIVILEGES]; an empty `privileges` then means every right
    pub all_privileges: bool,
    pub privileges: PrivilegeSet,
    pub grantees: Vec<Grantee>,
    pub grant_option: bool,
    pub cascade: CascadeBehavior,
}

impl GrantRequest {
    /// GRANT `privileges` ON `objects` TO `grantees`
    pub fn grant(
        object_kind: ObjectKind,
        objects: Vec<ObjectId>,
        privileges: PrivilegeSet,
        grantees: Vec<Grantee>,
    ) -> Self {
        Self {
            is_grant: true,
            object_kind,
            objects,
            all_privileges: false,
            privileges,
            grantees,
            grant_option: false,
            cascade: CascadeBehavior::Restrict,
        }
    }

    /// REVOKE `privileges` ON `objects` FROM `grantees`
    pub fn revoke(
        object_kind: ObjectKind,
        objects: Vec<ObjectId>,
        privileges: PrivilegeSet,
        grantees: Vec<Grantee>,
    ) -> Self {
        Self {
            is_grant: false,
            ..Self::grant(object_kind, objects, privileges, grantees)
        }
    }

    /// Switch to ALL PRIVILEGES
    #[must_use]
    pub fn all(mut self) -> Self {
        self.all_privileges = true;
        self.privileges = PrivilegeSet::empty();
        self
    }

    /// WITH GRANT OPTION, or GRANT OPTION FOR on a revoke
    #[must_use]
    pub fn with_grant_option(mut self) -> Self {
        self.grant_option = true;
        self
    }

    #[must_use]
    pub fn cascade(mut self) -> Self {
        self.cascade = CascadeBehavior::Cascade;
        self
    }
}

/// A GRANT or REVOKE over names, as a parser would produce it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantStatement {
    pub is_grant: bool,
    pub object_kind: ObjectKind,
    pub objects: Vec<String>,
    /// Privilege keywords; empty means ALL
    pub privileges: Vec<String>,
    /// Role names; `None` is PUBLIC
    pub grantees: Vec<Option<String>>,
    pub grant_option: bool,
    pub cascade: CascadeBehavior,
}

/// Non-fatal condition raised while granting or revoking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclWarning {
    PrivilegeNotGranted {
        kind: ObjectKind,
        object: ObjectId,
        name: String,
        partial: bool,
    },
    PrivilegeNotRevoked {
        kind: ObjectKind,
        object: ObjectId,
        name: String,
        partial: bool,
    },
}

impl AclWarning {
    pub fn sqlstate(&self) -> &'static str {
        match self {
            AclWarning::PrivilegeNotGranted { .. } => "01007",
            AclWarning::PrivilegeNotRevoked { .. } => "01006",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AclWarning::PrivilegeNotGranted { partial: false, .. } => "no privileges were granted",
            AclWarning::PrivilegeNotGranted { partial: true, .. } => {
                "not all privileges were granted"
            }
            AclWarning::PrivilegeNotRevoked { partial: false, .. } => {
                "no privileges could be revoked"
            }
            AclWarning::PrivilegeNotRevoked { partial: true, .. } => {
                "not all privileges could be revoked"
            }
        }
    }
}

impl fmt::Display for AclWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (AclWarning::PrivilegeNotGranted { name, .. }
        | AclWarning::PrivilegeNotRevoked { name, .. }) = self;
        write!(f, "{} for \"{name}\"", self.message())
    }
}

/// What a successful GRANT/REVOKE produced besides catalog changes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantOutcome {
    pub warnings: Vec<AclWarning>,
    /// Objects whose ACL was rewritten
    pub objects_updated: usize,
}

impl AccessControl<'_> {
    /// Execute a GRANT or REVOKE on behalf of the session's user
    pub fn execute_grant_or_revoke(&self, request: &GrantRequest) -> AclResult<GrantOutcome> {
        let kind = request.object_kind;
        let all_rights = kind.all_rights();
        let privileges = if request.all_privileges && request.privileges.is_empty() {
            all_rights
        } else {
            request.privileges
        };

        if let Some(bad) = (privileges - all_rights).iter().next() {
            return Err(invalid_privilege(bad, kind));
        }
        if request.is_grant
            && request.grant_option
            && request.grantees.iter().any(|g| g.is_public())
        {
            return Err(AclError::InvalidGrantOperation(
                "grant options can only be granted to roles".to_string(),
            ));
        }
        {
            let roles = self.catalog().roles();
            if let Some(missing) = request
                .grantees
                .iter()
                .filter_map(|g| g.role())
                .find(|id| !roles.contains(*id))
            {
                return Err(AclError::UndefinedRole(missing));
            }
        }

        let mut outcome = GrantOutcome::default();
        match kind {
            ObjectKind::Relation => self.exec_grant::<Relations>(request, privileges, &mut outcome),
            ObjectKind::Database => self.exec_grant::<Databases>(request, privileges, &mut outcome),
            ObjectKind::Function => self.exec_grant::<Functions>(request, privileges, &mut outcome),
            ObjectKind::Language => self.exec_grant::<Languages>(request, privileges, &mut outcome),
            ObjectKind::Namespace => {
                self.exec_grant::<Namespaces>(request, privileges, &mut outcome)
            }
            ObjectKind::Tablespace => {
                self.exec_grant::<Tablespaces>(request, privileges, &mut outcome)
            }
        }?;
        Ok(outcome)
    }

    fn exec_grant<K: SecurableKind>(
        &self,
        request: &GrantRequest,
        privileges: PrivilegeSet,
        outcome: &mut GrantOutcome,
    ) -> AclResult<()> {
        let catalog = self.catalog();
        let user = self.session().user();
        let _lock = K::table(catalog).acquire_lock();

        for &id in &request.objects {
            let row = K::fetch_row(catalog, id)?;
            K::validate_grant_target(&row)?;

            let owner = K::owner_of(&row);
            let old_acl = K::acl_of(&row);

            let best = {
                let roles = catalog.roles();
                select_best_grantor(user, privileges, &old_acl, owner, &*roles)
            };

            if best.grant_options.is_empty() {
                let any = AclMode::with_grant_option(K::all_rights_mask());
                if self
                    .aclmask_for::<K>(id, best.grantor, any, AclMaskHow::Any)?
                    .is_empty()
                {
                    return Err(AclError::InsufficientPrivilege(no_privilege_message(
                        K::KIND,
                        row.name(),
                    )));
                }
            }

            let clipped = privileges & best.grant_options;
            if let Some(warning) = clip_warning::<K>(request, id, row.name(), privileges, clipped) {
                tracing::warn!(
                    kind = %K::KIND,
                    object = %id,
                    sqlstate = warning.sqlstate(),
                    "{warning}"
                );
                outcome.warnings.push(warning);
            }

            let old_members = old_acl.members();
            tracing::debug!(kind = %K::KIND, object = %id, acl = %old_acl, "acl before merge");

            let change = AclChange {
                is_grant: request.is_grant,
                grant_option: request.grant_option,
                behavior: request.cascade,
                privileges: clipped,
                grantor: best.grantor,
                owner,
            };
            let new_acl = {
                let roles = catalog.roles();
                merge_acl_with_grant(old_acl, &change, &request.grantees, &*roles)?
            };
            tracing::debug!(kind = %K::KIND, object = %id, acl = %new_acl, "acl after merge");

            let new_members = new_acl.members();
            K::persist_new_acl(catalog, id, &row, new_acl)?;
            K::record_dependency_delta(catalog, id, owner, &old_members, &new_members);

            tracing::info!(
                kind = %K::KIND,
                object = %id,
                grantor = %best.grantor,
                is_grant = request.is_grant,
                members_added = new_members.difference(&old_members).count(),
                members_removed = old_members.difference(&new_members).count(),
                "updated acl"
            );
            outcome.objects_updated += 1;
            catalog.commit_and_refresh_snapshot();
        }
        Ok(())
    }

    /// Execute a GRANT or REVOKE given by names
    pub fn execute_grant_statement(&self, statement: &GrantStatement) -> AclResult<GrantOutcome> {
        let kind = statement.object_kind;

        let mut privileges = PrivilegeSet::empty();
        for keyword in &statement.privileges {
            let privilege = PrivilegeSet::parse(keyword).ok_or_else(|| {
                AclError::InvalidGrantOperation(format!(
                    "unrecognized privilege type \"{keyword}\""
                ))
            })?;
            if !kind.all_rights().contains(privilege) {
                return Err(invalid_privilege(privilege, kind));
            }
            privileges |= privilege;
        }

        let grantees = {
            let roles = self.catalog().roles();
            statement
                .grantees
                .iter()
                .map(|name| match name {
                    None => Ok(Grantee::Public),
                    Some(name) => roles
                        .by_name(name)
                        .map(|r| Grantee::Role(r.id))
                        .ok_or_else(|| AclError::UndefinedRoleName(name.clone())),
                })
                .collect::<AclResult<Vec<_>>>()?
        };

        let objects = statement
            .objects
            .iter()
            .map(|name| self.resolve_object(kind, name))
            .collect::<AclResult<Vec<_>>>()?;

        let request = GrantRequest {
            is_grant: statement.is_grant,
            object_kind: kind,
            objects,
            all_privileges: statement.privileges.is_empty(),
            privileges,
            grantees,
            grant_option: statement.grant_option,
            cascade: statement.cascade,
        };
        self.execute_grant_or_revoke(&request)
    }

    /// Look up an object id by name
    pub fn resolve_object(&self, kind: ObjectKind, name: &str) -> AclResult<ObjectId> {
        let catalog = self.catalog();
        let snapshot = catalog.command_id();
        let found = match kind {
            ObjectKind::Relation => catalog.relations().lookup_by_name(name, snapshot).map(|r| r.0),
            ObjectKind::Database => catalog.databases().lookup_by_name(name, snapshot).map(|r| r.0),
            ObjectKind::Function => catalog.functions().lookup_by_name(name, snapshot).map(|r| r.0),
            ObjectKind::Language => catalog.languages().lookup_by_name(name, snapshot).map(|r| r.0),
            ObjectKind::Namespace => {
                catalog.namespaces().lookup_by_name(name, snapshot).map(|r| r.0)
            }
            ObjectKind::Tablespace => {
                catalog.tablespaces().lookup_by_name(name, snapshot).map(|r| r.0)
            }
        };
        found.ok_or_else(|| AclError::UndefinedObjectName {
            kind,
            name: name.to_string(),
        })
    }

    /// Revoke everything granted to `role` on every object whose ACL
    /// mentions it, so the role can be dropped
    ///
    /// Each entry is revoked as its recorded grantor, with CASCADE. Grants
    /// the role made to others that survive are re-attributed to the owner. Returns the
    /// number of objects rewritten.
    pub fn remove_role_from_acls(&self, role: RoleId) -> AclResult<usize> {
        let targets: Vec<_> = self
            .catalog()
            .dependencies()
            .for_role(role)
            .filter(|d| d.dep_type == DependencyType::Acl)
            .map(|d| (d.kind, d.object))
            .collect();

        for &(kind, object) in &targets {
            match kind {
                ObjectKind::Relation => self.strip_role::<Relations>(object, role),
                ObjectKind::Database => self.strip_role::<Databases>(object, role),
                ObjectKind::Function => self.strip_role::<Functions>(object, role),
                ObjectKind::Language => self.strip_role::<Languages>(object, role),
                ObjectKind::Namespace => self.strip_role::<Namespaces>(object, role),
                ObjectKind::Tablespace => self.strip_role::<Tablespaces>(object, role),
            }?;
        }
        tracing::info!(role = %role, objects = targets.len(), "removed role from acls");
        Ok(targets.len())
    }

    fn strip_role<K: SecurableKind>(&self, id: ObjectId, role: RoleId) -> AclResult<()> {
        let catalog = self.catalog();
        let _lock = K::table(catalog).acquire_lock();

        let row = K::fetch_row(catalog, id)?;
        let owner = K::owner_of(&row);
        let old_acl = K::acl_of(&row);
        let old_members = old_acl.members();
        let grantor = old_acl
            .entry(Grantee::Role(role))
            .map_or(owner, |entry| entry.grantor());

        let change = AclChange {
            is_grant: false,
            grant_option: false,
            behavior: CascadeBehavior::Cascade,
            privileges: K::all_rights_mask(),
            grantor,
            owner,
        };
        let new_acl = {
            let roles = catalog.roles();
            merge_acl_with_grant(old_acl, &change, &[Grantee::Role(role)], &*roles)?
        }
        .reassign_grantor(role, owner);

        let new_members = new_acl.members();
        K::persist_new_acl(catalog, id, &row, new_acl)?;
        K::record_dependency_delta(catalog, id, owner, &old_members, &new_members);
        catalog.commit_and_refresh_snapshot();
        Ok(())
    }
}

fn clip_warning<K: SecurableKind>(
    request: &GrantRequest,
    id: ObjectId,
    name: &str,
    requested: PrivilegeSet,
    clipped: PrivilegeSet,
) -> Option<AclWarning> {
    let partial = if clipped.is_empty() {
        false
    } else if !request.all_privileges && clipped != requested {
        true
    } else {
        return None;
    };
    let kind = K::KIND;
    let name = name.to_string();
    Some(if request.is_grant {
        AclWarning::PrivilegeNotGranted {
            kind,
            object: id,
            name,
            partial,
        }
    } else {
        AclWarning::PrivilegeNotRevoked {
            kind,
            object: id,
            name,
            partial,
        }
    })
}

fn invalid_privilege(privilege: PrivilegeSet, kind: ObjectKind) -> AclError {
    AclError::InvalidGrantOperation(format!(
        "invalid privilege type {} for {}",
        privilege.to_str().unwrap_or("UNKNOWN"),
        kind.grant_target()
    ))
}
