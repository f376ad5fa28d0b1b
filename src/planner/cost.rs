//! Cost model for access and join paths
//!
//! Costs are in units of one sequential page fetch: disk pages count 1.0
//! each and per-tuple CPU work is scaled by the configured weights. A
//! disabled path type is not refused; it gets a large additive penalty so
//! that it still compares against the alternatives.

use super::config::CostModelConfig;
use super::rel::SortKey;

/// Estimated cost of a path
pub type Cost = f64;

/// Inputs describing an index scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexScan {
    /// Index pages the scan is expected to read
    pub expected_index_pages: u32,
    /// Fraction of the index the scan selects
    pub selectivity: f64,
    pub rel_pages: u32,
    pub rel_tuples: u32,
    pub index_pages: u32,
    pub index_tuples: u32,
    /// Inner side of a nested loop; never penalized when index scans are off
    pub is_injoin: bool,
}

/// One input of a join
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinInput<'a> {
    /// Cost of producing the input
    pub cost: Cost,
    /// Keys the input must be sorted or hashed on
    pub keys: &'a [SortKey],
    pub tuples: u32,
    pub width: u32,
}

/// Cost estimator
#[derive(Debug, Clone, Default)]
pub struct CostModel {
    config: CostModelConfig,
}

impl CostModel {
    pub fn new(config: CostModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CostModelConfig {
        &self.config
    }

    fn penalty(&self, enabled: bool) -> Cost {
        if enabled {
            0.0
        } else {
            self.config.disable_cost
        }
    }

    /// Sequential scan: one page fetch per page plus CPU per tuple
    pub fn cost_seqscan(&self, pages: u32, tuples: u32) -> Cost {
        let cost = self.penalty(self.config.enable_seqscan)
            + f64::from(pages)
            + self.config.cpu_page_weight * f64::from(tuples);
        debug_assert!(cost >= 0.0);
        cost
    }

    /// Sequential scan of a materialized temporary result
    ///
    /// The size of such a result is unknown, so a flat cost is used.
    pub fn cost_materialized_scan(&self) -> Cost {
        self.penalty(self.config.enable_seqscan) + self.config.materialized_scan_cost
    }

    /// Index scan: index pages, heap pages touched, and CPU for both
    pub fn cost_index(&self, scan: &IndexScan) -> Cost {
        let mut cost = self.penalty(self.config.enable_indexscan || scan.is_injoin);

        cost += f64::from(scan.expected_index_pages);

        let pages_per_tuple = if scan.rel_tuples == 0 {
            0.0
        } else {
            f64::from(scan.rel_pages) / f64::from(scan.rel_tuples)
        };
        let heap_pages = (pages_per_tuple * scan.selectivity * f64::from(scan.index_tuples)).ceil();
        cost += heap_pages.min(f64::from(scan.rel_pages));

        cost += self.config.cpu_index_page_weight * scan.selectivity * f64::from(scan.index_tuples);
        cost += self.config.cpu_page_weight * scan.selectivity * f64::from(scan.rel_tuples);

        debug_assert!(cost >= 0.0);
        cost
    }

    /// External sort using two-way merges
    ///
    /// Sorting nothing costs nothing beyond the disabled-sort penalty.
    /// Unless `no_read_back` is set, reading the sorted result back is
    /// charged as a scan of a materialized result.
    pub fn cost_sort(
        &self,
        keys: &[SortKey],
        tuples: u32,
        width: u32,
        no_read_back: bool,
    ) -> Cost {
        let mut cost = self.penalty(self.config.enable_sort);
        if tuples == 0 || keys.is_empty() {
            return cost;
        }

        let pages = f64::from(self.page_size(tuples, width));
        let passes = pages.log2();
        cost += pages * passes;
        cost += self.config.cpu_page_weight * f64::from(tuples) * passes;

        if !no_read_back {
            cost += self.cost_materialized_scan();
        }
        debug_assert!(cost >= 0.0);
        cost
    }

    /// Nested loop: the inner path runs once per outer tuple
    pub fn cost_nestloop(&self, outer_cost: Cost, inner_cost: Cost, outer_tuples: u32) -> Cost {
        let cost = self.penalty(self.config.enable_nestloop)
            + outer_cost
            + f64::from(outer_tuples) * inner_cost;
        debug_assert!(cost >= 0.0);
        cost
    }

    /// Merge join: both inputs, sorting both, then one pass over each
    pub fn cost_mergejoin(&self, outer: &JoinInput<'_>, inner: &JoinInput<'_>) -> Cost {
        let mut cost = self.penalty(self.config.enable_mergejoin);
        cost += outer.cost + inner.cost;
        cost += self.cost_sort(outer.keys, outer.tuples, outer.width, false);
        cost += self.cost_sort(inner.keys, inner.tuples, inner.width, false);
        cost += self.config.cpu_page_weight * (f64::from(outer.tuples) + f64::from(inner.tuples));
        debug_assert!(cost >= 0.0);
        cost
    }

    /// Hash join building its table from `inner`
    ///
    /// A build side larger in bytes than the probe side gets the disable
    /// penalty. A build side larger than the buffer pool is batched,
    /// writing and reading both inputs one extra time.
    pub fn cost_hashjoin(&self, outer: &JoinInput<'_>, inner: &JoinInput<'_>) -> Cost {
        let outer_pages = self.page_size(outer.tuples, outer.width);
        let inner_pages = self.page_size(inner.tuples, inner.width);
        let buffers = self.config.buffer_pool_pages;

        let mut cost = self.penalty(self.config.enable_hashjoin);

        if self.relation_byte_size(outer.tuples, outer.width)
            < self.relation_byte_size(inner.tuples, inner.width)
        {
            tracing::trace!(outer_pages, inner_pages, "hash join builds on the larger input");
            cost += self.config.disable_cost;
        }

        cost += outer.cost + inner.cost;
        cost += self.config.cpu_page_weight * (f64::from(outer.tuples) + f64::from(inner.tuples));
        cost += f64::from(inner_pages.min(buffers));

        if inner_pages > buffers {
            cost += 2.0 * (f64::from(outer_pages) + f64::from(inner_pages));
        }
        debug_assert!(cost >= 0.0);
        cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_seqscan() {
        let model = CostModel::default();
        assert!(approx(model.cost_seqscan(100, 1000), 100.0 + 33.0));

        let off = CostModel::new(CostModelConfig::new().with_seqscan(false));
        assert!(approx(off.cost_seqscan(100, 1000), 30_000_000.0 + 133.0));
    }

    #[test]
    fn test_index_scan_caps_heap_pages() {
        let model = CostModel::default();
        let scan = IndexScan {
            expected_index_pages: 2,
            selectivity: 1.0,
            rel_pages: 10,
            rel_tuples: 100,
            index_pages: 5,
            index_tuples: 1000,
            is_injoin: false,
        };
        // heap pages: ceil(0.1 * 1000) = 100, capped at 10
        let expected = 2.0 + 10.0 + 0.017 * 1000.0 + 0.033 * 100.0;
        assert!(approx(model.cost_index(&scan), expected));

        let empty = IndexScan {
            rel_tuples: 0,
            ..scan
        };
        assert!(approx(model.cost_index(&empty), 2.0 + 0.017 * 1000.0));
    }

    #[test]
    fn test_index_scan_in_join_not_penalized() {
        let model = CostModel::new(CostModelConfig::new().with_indexscan(false));
        let scan = IndexScan {
            expected_index_pages: 1,
            selectivity: 0.01,
            rel_pages: 10,
            rel_tuples: 100,
            index_pages: 2,
            index_tuples: 100,
            is_injoin: true,
        };
        assert!(model.cost_index(&scan) < 100.0);
        let standalone = IndexScan {
            is_injoin: false,
            ..scan
        };
        assert!(model.cost_index(&standalone) >= 30_000_000.0);
    }

    #[test]
    fn test_sort() {
        let model = CostModel::default();
        let keys = [SortKey::asc(0)];
        assert_eq!(model.cost_sort(&keys, 0, 100, false), 0.0);
        assert_eq!(model.cost_sort(&[], 1000, 100, false), 0.0);

        // 1000 tuples of 100 bytes -> 16 pages, log2(16) = 4
        let resident = model.cost_sort(&keys, 1000, 100, true);
        assert!(approx(resident, 16.0 * 4.0 + 0.033 * 1000.0 * 4.0));
        let read_back = model.cost_sort(&keys, 1000, 100, false);
        assert!(approx(read_back, resident + 10.0));
    }

    #[test]
    fn test_disabled_sort_still_penalized_when_trivial() {
        let model = CostModel::new(CostModelConfig::new().with_sort(false));
        assert_eq!(model.cost_sort(&[], 10, 10, false), 30_000_000.0);
    }

    #[test]
    fn test_nestloop() {
        let model = CostModel::default();
        assert!(approx(model.cost_nestloop(10.0, 2.5, 4), 20.0));
    }

    #[test]
    fn test_mergejoin_adds_sorts() {
        let model = CostModel::default();
        let keys = [SortKey::asc(0)];
        let outer = JoinInput {
            cost: 5.0,
            keys: &keys,
            tuples: 1000,
            width: 100,
        };
        let inner = JoinInput {
            cost: 7.0,
            keys: &[],
            tuples: 500,
            width: 100,
        };
        let expected = 12.0 + model.cost_sort(&keys, 1000, 100, false) + 0.033 * 1500.0;
        assert!(approx(model.cost_mergejoin(&outer, &inner), expected));
    }

    #[test]
    fn test_hashjoin_batches_large_build_side() {
        let model = CostModel::default();
        let small = JoinInput {
            cost: 0.0,
            keys: &[],
            tuples: 10,
            width: 10,
        };
        // (10 + 24) * 100_000 bytes -> 416 pages, above the 64-page pool
        let big = JoinInput {
            cost: 0.0,
            keys: &[],
            tuples: 100_000,
            width: 10,
        };
        let big_pages = model.page_size(100_000, 10);
        assert_eq!(big_pages, 416);

        let cost = model.cost_hashjoin(&small, &big);
        let expected = 30_000_000.0
            + 0.033 * 100_010.0
            + 64.0
            + 2.0 * (1.0 + f64::from(big_pages));
        assert!(approx(cost, expected));
    }
}
