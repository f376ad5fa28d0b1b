//! Default ACLs
//!
//! An object whose ACL column is null behaves as if it held the default ACL
//! for its kind: the owner has every privilege of the kind, and PUBLIC has
//! whatever the kind hands out to everybody.

use super::item::{Acl, AclItem, Grantee};
use super::privilege::PrivilegeSet;
use crate::catalog::{ObjectKind, RoleId};

/// Privileges PUBLIC holds on an object with no explicit ACL
pub fn public_default(kind: ObjectKind) -> PrivilegeSet {
    match kind {
        ObjectKind::Database => PrivilegeSet::CONNECT | PrivilegeSet::CREATE_TEMP,
        ObjectKind::Language => PrivilegeSet::USAGE,
        ObjectKind::Relation
        | ObjectKind::Function
        | ObjectKind::Namespace
        | ObjectKind::Tablespace => PrivilegeSet::empty(),
    }
}

/// Synthesize the default ACL for an object of `kind` owned by `owner`
///
/// The owner entry records no grant options; the owner's are implicit.
pub fn default_acl(kind: ObjectKind, owner: RoleId) -> Acl {
    let public = public_default(kind);
    let mut items = Vec::with_capacity(2);
    if !public.is_empty() {
        items.push(AclItem::new(
            Grantee::Public,
            owner,
            public,
            PrivilegeSet::empty(),
        ));
    }
    items.push(AclItem::new(
        Grantee::Role(owner),
        owner,
        kind.all_rights(),
        PrivilegeSet::empty(),
    ));
    Acl::from_items(items)
}
