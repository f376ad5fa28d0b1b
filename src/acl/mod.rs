//! Access control: ACL algebra, GRANT/REVOKE, and privilege checks
//!
//! Objects carry an [`Acl`] of per-grantee entries. GRANT and REVOKE run
//! through [`AccessControl::execute_grant_or_revoke`], which chooses a
//! grantor, clips the request to what that grantor may pass on, and merges
//! the result into the stored ACL. Checks go through
//! [`AccessControl::aclmask`] and the predicates built on it.

pub mod check;
pub mod default;
pub mod error;
pub mod grant;
pub mod grantor;
pub mod item;
pub mod merge;
pub mod privilege;
pub mod securable;

pub use check::{aclcheck_error, AccessControl, AclCheck};
pub use default::{default_acl, public_default};
pub use error::{AclError, AclResult};
pub use grant::{AclWarning, GrantOutcome, GrantRequest, GrantStatement};
pub use grantor::{select_best_grantor, BestGrantor};
pub use item::{Acl, AclItem, CascadeBehavior, Grantee, ModeChange};
pub use merge::{merge_acl_with_grant, AclChange};
pub use privilege::{AclMaskHow, AclMode, PrivilegeSet};
pub use securable::SecurableKind;
