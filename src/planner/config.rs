//! Cost model configuration

use serde::{Deserialize, Serialize};

/// Penalty added to the cost of a disabled path type
pub const DEFAULT_DISABLE_COST: f64 = 30_000_000.0;

/// CPU cost per heap tuple, relative to one page fetch
pub const DEFAULT_CPU_PAGE_WEIGHT: f64 = 0.033;

/// CPU cost per index tuple, relative to one page fetch
pub const DEFAULT_CPU_INDEX_PAGE_WEIGHT: f64 = 0.017;

/// Flat cost of scanning a materialized temporary result
pub const DEFAULT_MATERIALIZED_SCAN_COST: f64 = 10.0;

/// Buffer pool size in pages
pub const DEFAULT_BUFFER_POOL_PAGES: u32 = 64;

/// Block size in bytes
pub const DEFAULT_BLOCK_SIZE: u32 = 8192;

/// Per-tuple storage overhead in bytes
pub const DEFAULT_TUPLE_OVERHEAD: u32 = 24;

/// Assumed width of variable-length attributes
pub const DEFAULT_ATTRIBUTE_WIDTH: u32 = 12;

/// Tunables for the planner cost model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModelConfig {
    /// Allow sequential scans
    pub enable_seqscan: bool,
    /// Allow index scans
    pub enable_indexscan: bool,
    /// Allow explicit sorts
    pub enable_sort: bool,
    /// Allow nested loop joins
    pub enable_nestloop: bool,
    /// Allow merge joins
    pub enable_mergejoin: bool,
    /// Allow hash joins
    pub enable_hashjoin: bool,
    /// Hash node switch; none of the formulas here read it
    pub enable_hash: bool,
    /// Added once per disabled path type
    pub disable_cost: f64,
    /// CPU cost per heap tuple, relative to one page fetch
    pub cpu_page_weight: f64,
    /// CPU cost per index tuple, relative to one page fetch
    pub cpu_index_page_weight: f64,
    /// Flat cost of scanning a materialized temporary result
    pub materialized_scan_cost: f64,
    /// Hash tables larger than this spill to disk
    pub buffer_pool_pages: u32,
    /// Block size in bytes
    pub block_size: u32,
    /// Per-tuple storage overhead in bytes
    pub tuple_overhead: u32,
    /// Assumed width of variable-length attributes
    pub default_attribute_width: u32,
}

impl Default for CostModelConfig {
    fn default() -> Self {
        Self {
            enable_seqscan: true,
            enable_indexscan: true,
            enable_sort: true,
            enable_nestloop: true,
            enable_mergejoin: true,
            enable_hashjoin: true,
            enable_hash: true,
            disable_cost: DEFAULT_DISABLE_COST,
            cpu_page_weight: DEFAULT_CPU_PAGE_WEIGHT,
            cpu_index_page_weight: DEFAULT_CPU_INDEX_PAGE_WEIGHT,
            materialized_scan_cost: DEFAULT_MATERIALIZED_SCAN_COST,
            buffer_pool_pages: DEFAULT_BUFFER_POOL_PAGES,
            block_size: DEFAULT_BLOCK_SIZE,
            tuple_overhead: DEFAULT_TUPLE_OVERHEAD,
            default_attribute_width: DEFAULT_ATTRIBUTE_WIDTH,
        }
    }
}

impl CostModelConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_seqscan(mut self, enabled: bool) -> Self {
        self.enable_seqscan = enabled;
        self
    }

    #[must_use]
    pub fn with_indexscan(mut self, enabled: bool) -> Self {
        self.enable_indexscan = enabled;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, enabled: bool) -> Self {
        self.enable_sort = enabled;
        self
    }

    #[must_use]
    pub fn with_nestloop(mut self, enabled: bool) -> Self {
        self.enable_nestloop = enabled;
        self
    }

    #[must_use]
    pub fn with_mergejoin(mut self, enabled: bool) -> Self {
        self.enable_mergejoin = enabled;
        self
    }

    #[must_use]
    pub fn with_hashjoin(mut self, enabled: bool) -> Self {
        self.enable_hashjoin = enabled;
        self
    }

    #[must_use]
    pub fn with_hash(mut self, enabled: bool) -> Self {
        self.enable_hash = enabled;
        self
    }

    /// Set the disabled-path penalty
    #[must_use]
    pub fn with_disable_cost(mut self, cost: f64) -> Self {
        self.disable_cost = cost.max(0.0);
        self
    }

    /// Set the per-tuple CPU weights for heap and index tuples
    #[must_use]
    pub fn with_cpu_weights(mut self, heap: f64, index: f64) -> Self {
        self.cpu_page_weight = heap.max(0.0);
        self.cpu_index_page_weight = index.max(0.0);
        self
    }

    /// Set the buffer pool size in pages
    #[must_use]
    pub fn with_buffer_pool_pages(mut self, pages: u32) -> Self {
        self.buffer_pool_pages = pages;
        self
    }

    /// Set the block size; zero is treated as one byte
    #[must_use]
    pub fn with_block_size(mut self, bytes: u32) -> Self {
        self.block_size = bytes.max(1);
        self
    }
}
