//! Choosing whose authority a GRANT or REVOKE is performed under

use super::item::{Acl, Grantee};
use super::privilege::PrivilegeSet;
use crate::catalog::{RoleId, RoleMembership};

/// Grantor recorded for a GRANT/REVOKE and the options it may exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestGrantor {
    pub grantor: RoleId,
    pub grant_options: PrivilegeSet,
}

/// Pick the grantor for `role` acting on an object owned by `owner`
///
/// A superuser acts as the owner. A role holding the owner's privileges
/// acts as itself with every requested option. Anyone else acts as itself
/// with the grant options it holds on `acl`, directly or through roles
/// whose privileges it has.
pub fn select_best_grantor(
    role: RoleId,
    privileges: PrivilegeSet,
    acl: &Acl,
    owner: RoleId,
    roles: &dyn RoleMembership,
) -> BestGrantor {
    if roles.is_superuser(role) {
        return BestGrantor {
            grantor: owner,
            grant_options: privileges,
        };
    }
    if roles.has_privs_of(role, owner) {
        return BestGrantor {
            grantor: role,
            grant_options: privileges,
        };
    }

    let held = acl
        .items()
        .iter()
        .filter(|item| match item.grantee() {
            Grantee::Role(grantee) => roles.has_privs_of(role, grantee),
            Grantee::Public => false,
        })
        .fold(PrivilegeSet::empty(), |acc, item| acc | item.grantable());

    BestGrantor {
        grantor: role,
        grant_options: held & privileges,
    }
}
