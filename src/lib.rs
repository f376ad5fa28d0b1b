//! privplan - catalog access control and planner cost estimation
//!
//! Features:
//! - Object ACLs with grant options, cascading revoke, and role inheritance
//! - Multi-version in-memory system catalog with shared dependency tracking
//! - Cost formulas and size estimates for scan, sort, and join paths

pub mod acl;
pub mod catalog;
pub mod planner;
pub mod session;
