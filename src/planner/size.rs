//! Result size and width estimates

use super::cost::CostModel;
use super::rel::TargetEntry;

/// Tuples left after applying a combined restriction selectivity
///
/// Saturates at `u32::MAX`.
pub fn compute_rel_size(tuples: u32, selectivity: f64) -> u32 {
    let estimate = f64::from(tuples) * selectivity;
    debug_assert!(estimate >= 0.0, "negative relation size estimate");
    if estimate >= f64::from(u32::MAX - 1) {
        u32::MAX
    } else {
        estimate.ceil() as u32
    }
}

/// Tuples produced by joining `outer_size` with `inner_size` tuples
///
/// Past half the representable range the estimate grows logarithmically so
/// it never wraps.
pub fn compute_joinrel_size(outer_size: u32, inner_size: u32, selectivity: f64) -> u32 {
    let estimate = f64::from(outer_size) * f64::from(inner_size) * selectivity;
    debug_assert!(estimate >= 0.0, "negative join size estimate");
    let half = f64::from((u32::MAX - 1) / 2);
    if estimate >= half {
        // +1 keeps the log argument positive
        ((estimate + 1.0 - half).ln() + half).ceil() as u32
    } else {
        estimate.ceil() as u32
    }
}

/// Combined selectivity of independent restriction clauses
pub fn product_selectivity(selectivities: &[f64]) -> f64 {
    selectivities.iter().product()
}

impl CostModel {
    /// Bytes per tuple projected by `targets`
    pub fn compute_rel_width(&self, targets: &[TargetEntry]) -> u32 {
        targets
            .iter()
            .map(|t| {
                t.data_type
                    .type_len()
                    .unwrap_or(self.config().default_attribute_width)
            })
            .sum()
    }

    /// Storage bytes for `tuples` tuples of `width` bytes
    pub fn relation_byte_size(&self, tuples: u32, width: u32) -> f64 {
        f64::from(tuples) * (f64::from(width) + f64::from(self.config().tuple_overhead))
    }

    /// Pages covered by `tuples` tuples of `width` bytes
    pub fn page_size(&self, tuples: u32, width: u32) -> u32 {
        let pages = (self.relation_byte_size(tuples, width) / f64::from(self.config().block_size))
            .ceil();
        pages as u32
    }
}
