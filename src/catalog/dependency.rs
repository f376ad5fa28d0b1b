//! Shared dependencies between objects and roles
//!
//! An edge is recorded for every role that owns an object or is mentioned in
//! its ACL, so that a role cannot be dropped while still referenced.

use std::collections::BTreeSet;

use super::{ObjectId, ObjectKind, RoleId};

/// Why an object depends on a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DependencyType {
    Owner,
    Acl,
}

/// One object -> role edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SharedDependency {
    pub kind: ObjectKind,
    pub object: ObjectId,
    pub role: RoleId,
    pub dep_type: DependencyType,
}

#[derive(Debug, Default, Clone)]
pub struct SharedDependencies {
    edges: BTreeSet<SharedDependency>,
}

impl SharedDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_owner(&mut self, kind: ObjectKind, object: ObjectId, owner: RoleId) {
        self.edges.insert(SharedDependency {
            kind,
            object,
            role: owner,
            dep_type: DependencyType::Owner,
        });
    }

    /// Bring ACL edges in line with a changed ACL
    ///
    /// `old_members` and `new_members` are the roles mentioned by the ACL
    /// before and after the change. The owner never gets an ACL edge since
    /// it already has an ownership edge. Returns (added, removed).
    pub fn update_acl_dependencies(
        &mut self,
        kind: ObjectKind,
        object: ObjectId,
        owner: Option<RoleId>,
        old_members: &BTreeSet<RoleId>,
        new_members: &BTreeSet<RoleId>,
    ) -> (usize, usize) {
        let edge = |role| SharedDependency {
            kind,
            object,
            role,
            dep_type: DependencyType::Acl,
        };
        let mut removed = 0;
        for &role in old_members.difference(new_members) {
            if Some(role) != owner && self.edges.remove(&edge(role)) {
                removed += 1;
            }
        }
        let mut added = 0;
        for &role in new_members.difference(old_members) {
            if Some(role) != owner && self.edges.insert(edge(role)) {
                added += 1;
            }
        }
        (added, removed)
    }

    /// Edges pointing at `role`
    pub fn for_role(&self, role: RoleId) -> impl Iterator<Item = &SharedDependency> + '_ {
        self.edges.iter().filter(move |d| d.role == role)
    }

    /// Edges recorded for one object
    pub fn for_object(
        &self,
        kind: ObjectKind,
        object: ObjectId,
    ) -> impl Iterator<Item = &SharedDependency> + '_ {
        self.edges
            .iter()
            .filter(move |d| d.kind == kind && d.object == object)
    }

    pub fn dependent_count(&self, role: RoleId) -> usize {
        self.for_role(role).count()
    }
}
