//! Roles and role membership
//!
//! A role "has the privileges of" another role when it is that role, is a
//! superuser, or reaches it through a chain of memberships in which every
//! role along the way inherits.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::error::{CatalogError, CatalogResult};
use super::RoleId;

/// Role membership queries used by privilege checks
pub trait RoleMembership {
    /// Whether `member` holds the privileges of `role`
    fn has_privs_of(&self, member: RoleId, role: RoleId) -> bool;

    /// Whether `role` bypasses privilege checks
    fn is_superuser(&self, role: RoleId) -> bool;
}

/// Role attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRow {
    pub id: RoleId,
    pub name: String,
    pub superuser: bool,
    /// May modify system catalogs directly
    pub catupdate: bool,
    /// Automatically uses privileges of roles it is a member of
    pub inherit: bool,
}

impl RoleRow {
    /// Ordinary login role that inherits
    pub fn new(id: RoleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            superuser: false,
            catupdate: false,
            inherit: true,
        }
    }

    #[must_use]
    pub fn superuser(mut self) -> Self {
        self.superuser = true;
        self.catupdate = true;
        self
    }

    #[must_use]
    pub fn catupdate(mut self, catupdate: bool) -> Self {
        self.catupdate = catupdate;
        self
    }

    #[must_use]
    pub fn inherit(mut self, inherit: bool) -> Self {
        self.inherit = inherit;
        self
    }
}

/// All roles plus the membership graph
#[derive(Debug, Default, Clone)]
pub struct RoleGraph {
    roles: HashMap<RoleId, RoleRow>,
    /// member -> roles it was granted
    member_of: HashMap<RoleId, Vec<RoleId>>,
}

impl RoleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role
    pub fn insert(&mut self, role: RoleRow) -> CatalogResult<()> {
        if self.roles.values().any(|r| r.name == role.name) {
            return Err(CatalogError::DuplicateRole(role.name));
        }
        if self.roles.contains_key(&role.id) {
            return Err(CatalogError::DuplicateRole(role.name));
        }
        self.roles.insert(role.id, role);
        Ok(())
    }

    /// Remove a role and every membership edge touching it
    pub fn remove(&mut self, id: RoleId) -> CatalogResult<RoleRow> {
        let row = self.roles.remove(&id).ok_or(CatalogError::UndefinedRole(id))?;
        self.member_of.remove(&id);
        for granted in self.member_of.values_mut() {
            granted.retain(|r| *r != id);
        }
        Ok(row)
    }

    pub fn get(&self, id: RoleId) -> Option<&RoleRow> {
        self.roles.get(&id)
    }

    pub fn contains(&self, id: RoleId) -> bool {
        self.roles.contains_key(&id)
    }

    pub fn by_name(&self, name: &str) -> Option<&RoleRow> {
        self.roles.values().find(|r| r.name == name)
    }

    /// Make `member` a member of `role`
    pub fn add_membership(&mut self, member: RoleId, role: RoleId) -> CatalogResult<()> {
        if !self.contains(member) {
            return Err(CatalogError::UndefinedRole(member));
        }
        if !self.contains(role) {
            return Err(CatalogError::UndefinedRole(role));
        }
        if member == role || self.is_member_of(role, member) {
            return Err(CatalogError::CircularMembership { member, role });
        }
        let granted = self.member_of.entry(member).or_default();
        if !granted.contains(&role) {
            granted.push(role);
        }
        Ok(())
    }

    /// Whether `role` may update system catalogs
    pub fn has_catupdate(&self, role: RoleId) -> bool {
        self.roles.get(&role).is_some_and(|r| r.catupdate)
    }

    /// Membership reachability ignoring the inherit flag
    pub fn is_member_of(&self, member: RoleId, role: RoleId) -> bool {
        self.reachable(member, role, false)
    }

    fn reachable(&self, member: RoleId, role: RoleId, respect_inherit: bool) -> bool {
        if member == role {
            return true;
        }
        let mut seen = HashSet::from([member]);
        let mut queue = VecDeque::from([member]);
        while let Some(current) = queue.pop_front() {
            if respect_inherit && !self.roles.get(&current).is_some_and(|r| r.inherit) {
                continue;
            }
            for &granted in self.member_of.get(&current).into_iter().flatten() {
                if granted == role {
                    return true;
                }
                if seen.insert(granted) {
                    queue.push_back(granted);
                }
            }
        }
        false
    }
}

impl RoleMembership for RoleGraph {
    fn has_privs_of(&self, member: RoleId, role: RoleId) -> bool {
        if member == role || self.is_superuser(member) {
            return true;
        }
        self.reachable(member, role, true)
    }

    fn is_superuser(&self, role: RoleId) -> bool {
        self.roles.get(&role).is_some_and(|r| r.superuser)
    }
}
