//! Planner-side view of base relations

use serde::{Deserialize, Serialize};

use super::cost::CostModel;
use super::size::{compute_rel_size, product_selectivity};
use crate::catalog::{Catalog, CatalogError, CatalogResult, DataType, ObjectId, ObjectKind};

/// One sort key of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Zero-based attribute position
    pub attribute: u16,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(attribute: u16) -> Self {
        Self {
            attribute,
            descending: false,
        }
    }
}

/// One projected attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    pub name: String,
    pub data_type: DataType,
}

impl TargetEntry {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Statistics and estimates for one base relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelOptInfo {
    pub relation: ObjectId,
    pub pages: u32,
    pub tuples: u32,
    pub targets: Vec<TargetEntry>,
    /// Selectivity of each restriction clause
    pub restrictions: Vec<f64>,
    /// Estimated tuples after restrictions
    pub size: u32,
    /// Estimated bytes per output tuple
    pub width: u32,
}

impl RelOptInfo {
    /// Build from the relation's catalog statistics, projecting every column
    pub fn from_relation(catalog: &Catalog, id: ObjectId, model: &CostModel) -> CatalogResult<Self> {
        let row = catalog
            .relations()
            .lookup_row(id, catalog.command_id())
            .ok_or(CatalogError::UndefinedObject {
                kind: ObjectKind::Relation,
                id,
            })?;
        let targets: Vec<_> = row
            .columns
            .iter()
            .map(|c| TargetEntry::new(c.name.clone(), c.data_type.clone()))
            .collect();
        let width = model.compute_rel_width(&targets);
        Ok(Self {
            relation: id,
            pages: row.pages,
            tuples: row.tuples,
            targets,
            restrictions: Vec::new(),
            size: row.tuples,
            width,
        })
    }

    /// Add a restriction clause and re-estimate the size
    #[must_use]
    pub fn with_restriction(mut self, selectivity: f64) -> Self {
        self.restrictions.push(selectivity);
        self.size = compute_rel_size(self.tuples, product_selectivity(&self.restrictions));
        self
    }
}
