//! Planner cost model
//!
//! Pure cost and size estimates used when choosing between access and join
//! paths. Nothing here touches the catalog except
//! [`RelOptInfo::from_relation`], which reads relation statistics.

pub mod config;
pub mod cost;
pub mod rel;
pub mod size;

pub use config::CostModelConfig;
pub use cost::{Cost, CostModel, IndexScan, JoinInput};
pub use rel::{RelOptInfo, SortKey, TargetEntry};
pub use size::{compute_joinrel_size, compute_rel_size, product_selectivity};
