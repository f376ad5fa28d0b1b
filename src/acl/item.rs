//! ACL entries and the per-object ACL
//!
//! An ACL holds at most one entry per grantee. Entries whose privileges
//! become empty are removed, and an entry's grant options are always a
//! subset of its privileges.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{AclError, AclResult};
use super::privilege::{AclMaskHow, AclMode, PrivilegeSet};
use crate::catalog::{RoleId, RoleMembership};

/// Recipient of an ACL entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grantee {
    /// Every role
    Public,
    Role(RoleId),
}

impl Grantee {
    pub fn role(self) -> Option<RoleId> {
        match self {
            Grantee::Public => None,
            Grantee::Role(id) => Some(id),
        }
    }

    pub fn is_public(self) -> bool {
        matches!(self, Grantee::Public)
    }
}

impl From<RoleId> for Grantee {
    fn from(id: RoleId) -> Self {
        Grantee::Role(id)
    }
}

/// Whether an update adds or removes bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChange {
    Add,
    Delete,
}

/// What to do when a revoke would leave dependent grants behind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CascadeBehavior {
    #[default]
    Restrict,
    Cascade,
}

/// One grantee's privileges on an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclItem {
    grantee: Grantee,
    grantor: RoleId,
    privileges: PrivilegeSet,
    grantable: PrivilegeSet,
}

impl AclItem {
    /// Build an item; also used for update deltas, which are not clamped
    pub fn new(
        grantee: Grantee,
        grantor: RoleId,
        privileges: PrivilegeSet,
        grantable: PrivilegeSet,
    ) -> Self {
        Self {
            grantee,
            grantor,
            privileges,
            grantable,
        }
    }

    pub fn grantee(&self) -> Grantee {
        self.grantee
    }

    pub fn grantor(&self) -> RoleId {
        self.grantor
    }

    pub fn privileges(&self) -> PrivilegeSet {
        self.privileges
    }

    pub fn grantable(&self) -> PrivilegeSet {
        self.grantable
    }

    pub fn mode(&self) -> AclMode {
        AclMode {
            privileges: self.privileges,
            grant_options: self.grantable,
        }
    }

    fn is_empty(&self) -> bool {
        self.privileges.is_empty() && self.grantable.is_empty()
    }
}

impl fmt::Display for AclItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Grantee::Role(id) = self.grantee {
            write!(f, "{id}")?;
        }
        write!(
            f,
            "={}/{}",
            self.privileges.letters(self.grantable),
            self.grantor
        )
    }
}

/// Access control list of one object
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Acl {
    items: Vec<AclItem>,
}

impl Acl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an ACL, coalescing items that share a grantee
    pub fn from_items(items: impl IntoIterator<Item = AclItem>) -> Self {
        let mut acl = Acl::new();
        for item in items {
            match acl.items.iter_mut().find(|i| i.grantee == item.grantee) {
                Some(existing) => {
                    existing.privileges |= item.privileges;
                    existing.grantable |= item.grantable;
                }
                None => acl.items.push(item),
            }
        }
        for item in &mut acl.items {
            item.grantable &= item.privileges;
        }
        acl.items.retain(|i| !i.is_empty());
        acl
    }

    pub fn items(&self) -> &[AclItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The entry for `grantee`, if any
    pub fn entry(&self, grantee: Grantee) -> Option<&AclItem> {
        self.items.iter().find(|i| i.grantee == grantee)
    }

    /// Every role mentioned as grantee or grantor; PUBLIC is not a role
    pub fn members(&self) -> BTreeSet<RoleId> {
        self.items
            .iter()
            .flat_map(|i| i.grantee.role().into_iter().chain([i.grantor]))
            .collect()
    }

    /// Effective privileges of `role`, restricted to `mask`
    ///
    /// With [`AclMaskHow::Any`] the scan stops at the first nonempty
    /// result; with [`AclMaskHow::All`] it stops once every bit of `mask`
    /// is present. Anyone with the privileges of the owner implicitly holds
    /// every requested grant option.
    pub fn mask(
        &self,
        role: RoleId,
        owner: RoleId,
        mask: AclMode,
        how: AclMaskHow,
        roles: &dyn RoleMembership,
    ) -> AclMode {
        let done = |result: AclMode| match how {
            AclMaskHow::All => result.contains(mask),
            AclMaskHow::Any => !result.is_empty(),
        };
        let mut result = AclMode::empty();
        if mask.is_empty() {
            return result;
        }

        if !mask.grant_options.is_empty() && roles.has_privs_of(role, owner) {
            result.grant_options = mask.grant_options;
            if done(result) {
                return result;
            }
        }

        for item in &self.items {
            if item.grantee == Grantee::Public || item.grantee == Grantee::Role(role) {
                result = result.union(item.mode().intersection(mask));
                if done(result) {
                    return result;
                }
            }
        }

        // Roles whose privileges `role` inherits
        let mut remaining = mask.difference(result);
        for item in &self.items {
            let Grantee::Role(grantee) = item.grantee else {
                continue;
            };
            if grantee == role || !item.mode().intersects(remaining) {
                continue;
            }
            if roles.has_privs_of(role, grantee) {
                result = result.union(item.mode().intersection(mask));
                if done(result) {
                    return result;
                }
                remaining = mask.difference(result);
            }
        }
        result
    }

    /// Apply one delta to the ACL
    ///
    /// Adding merges into the grantee's entry or creates one. Deleting
    /// clears bits from the entry only when `delta.grantor` recorded it.
    /// When the grantee loses grant options, grants it made onward are
    /// revoked according to `behavior`.
    ///
    /// An entry holds one grantor. Adding from a different grantor that
    /// has the owner's privileges re-attributes the entry to the owner.
    /// Adding from any other grantor is a no-op when it grants nothing new
    /// and an error otherwise.
    pub fn update(
        mut self,
        delta: &AclItem,
        change: ModeChange,
        owner: RoleId,
        behavior: CascadeBehavior,
        roles: &dyn RoleMembership,
    ) -> AclResult<Acl> {
        let position = self.items.iter().position(|i| i.grantee == delta.grantee);
        let old_grantable = position.map_or(PrivilegeSet::empty(), |i| self.items[i].grantable);

        let position = match (change, position) {
            (ModeChange::Add, Some(i)) => {
                let item = &mut self.items[i];
                if item.grantor != delta.grantor {
                    if roles.has_privs_of(delta.grantor, owner) {
                        item.grantor = owner;
                    } else if item.privileges.contains(delta.privileges)
                        && item.grantable.contains(delta.grantable)
                    {
                        return Ok(self);
                    } else {
                        return Err(AclError::InvalidGrantOperation(format!(
                            "{} already holds privileges granted by role {}",
                            grantee_label(item.grantee),
                            item.grantor
                        )));
                    }
                }
                item.privileges |= delta.privileges;
                item.grantable = (item.grantable | delta.grantable) & item.privileges;
                Some(i)
            }
            (ModeChange::Add, None) => {
                let item = AclItem {
                    grantable: delta.grantable & delta.privileges,
                    ..delta.clone()
                };
                if item.is_empty() {
                    None
                } else {
                    self.items.push(item);
                    Some(self.items.len() - 1)
                }
            }
            (ModeChange::Delete, Some(i)) => {
                let item = &mut self.items[i];
                // Only the recorded grantor can take back what it granted
                if item.grantor == delta.grantor {
                    item.privileges -= delta.privileges;
                    item.grantable = (item.grantable - delta.grantable) & item.privileges;
                }
                Some(i)
            }
            (ModeChange::Delete, None) => None,
        };

        let new_grantable = position.map_or(PrivilegeSet::empty(), |i| self.items[i].grantable);
        self.items.retain(|i| !i.is_empty());

        let lost = old_grantable - new_grantable;
        match delta.grantee {
            Grantee::Role(grantee) if !lost.is_empty() => {
                self.recursive_revoke(grantee, lost, owner, behavior, roles)
            }
            _ => Ok(self),
        }
    }

    /// Revoke `revoked` from every entry granted by `grantor`
    fn recursive_revoke(
        self,
        grantor: RoleId,
        revoked: PrivilegeSet,
        owner: RoleId,
        behavior: CascadeBehavior,
        roles: &dyn RoleMembership,
    ) -> AclResult<Acl> {
        // The owner's grant options are implicit and never lost
        if grantor == owner {
            return Ok(self);
        }
        // Options still held some other way keep their dependents valid
        let still_held = self
            .mask(
                grantor,
                owner,
                AclMode::grant_options(revoked),
                AclMaskHow::All,
                roles,
            )
            .grant_options;
        let revoked = revoked - still_held;
        if revoked.is_empty() {
            return Ok(self);
        }

        let mut acl = self;
        while let Some(dependent) = acl
            .items
            .iter()
            .find(|i| {
                i.grantor == grantor
                    && i.grantee != Grantee::Role(grantor)
                    && i.privileges.intersects(revoked)
            })
            .map(|i| i.grantee)
        {
            if behavior == CascadeBehavior::Restrict {
                return Err(AclError::DependentPrivilegesExist);
            }
            let delta = AclItem::new(dependent, grantor, revoked, revoked);
            acl = acl.update(&delta, ModeChange::Delete, owner, behavior, roles)?;
        }
        Ok(acl)
    }

    /// Attribute grants made by `from` to `to` instead
    #[must_use]
    pub fn reassign_grantor(mut self, from: RoleId, to: RoleId) -> Acl {
        for item in &mut self.items {
            if item.grantor == from {
                item.grantor = to;
            }
        }
        self
    }
}

fn grantee_label(grantee: Grantee) -> String {
    match grantee {
        Grantee::Public => "PUBLIC".to_string(),
        Grantee::Role(id) => format!("role {id}"),
    }
}

impl fmt::Display for Acl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str("}")
    }
}
