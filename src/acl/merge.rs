//! Folding one GRANT or REVOKE into an object's ACL

use super::error::{AclError, AclResult};
use super::item::{Acl, AclItem, CascadeBehavior, Grantee, ModeChange};
use super::privilege::PrivilegeSet;
use crate::catalog::{RoleId, RoleMembership};

/// One GRANT/REVOKE applied to a single object
#[derive(Debug, Clone, Copy)]
pub struct AclChange {
    pub is_grant: bool,
    /// GRANT ... WITH GRANT OPTION, or REVOKE GRANT OPTION FOR
    pub grant_option: bool,
    pub behavior: CascadeBehavior,
    pub privileges: PrivilegeSet,
    pub grantor: RoleId,
    pub owner: RoleId,
}

impl AclChange {
    /// Delta applied for each grantee
    fn delta(&self, grantee: Grantee) -> AclItem {
        match (self.is_grant, self.grant_option) {
            (true, true) => AclItem::new(grantee, self.grantor, self.privileges, self.privileges),
            (true, false) => {
                AclItem::new(grantee, self.grantor, self.privileges, PrivilegeSet::empty())
            }
            // REVOKE GRANT OPTION FOR keeps the privileges themselves
            (false, true) => {
                AclItem::new(grantee, self.grantor, PrivilegeSet::empty(), self.privileges)
            }
            (false, false) => AclItem::new(grantee, self.grantor, self.privileges, self.privileges),
        }
    }

    fn mode_change(&self) -> ModeChange {
        if self.is_grant {
            ModeChange::Add
        } else {
            ModeChange::Delete
        }
    }
}

/// Apply `change` to `old_acl` for every grantee, in order
///
/// Grant options can never be granted to PUBLIC; that is rejected before
/// any grantee is processed.
pub fn merge_acl_with_grant(
    old_acl: Acl,
    change: &AclChange,
    grantees: &[Grantee],
    roles: &dyn RoleMembership,
) -> AclResult<Acl> {
    if change.is_grant && change.grant_option && grantees.iter().any(|g| g.is_public()) {
        return Err(AclError::InvalidGrantOperation(
            "grant options can only be granted to roles".to_string(),
        ));
    }

    let mode = change.mode_change();
    grantees.iter().try_fold(old_acl, |acl, &grantee| {
        acl.update(
            &change.delta(grantee),
            mode,
            change.owner,
            change.behavior,
            roles,
        )
    })
}
