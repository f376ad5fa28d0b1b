//! Multi-version catalog tables
//!
//! Every write produces a new row version stamped with the command id that
//! wrote it. A reader at snapshot `cid` sees the newest version written by a
//! command strictly before `cid`, so a statement never observes its own
//! in-flight writes until the command counter is advanced.

use std::collections::BTreeMap;
use std::fmt;

use parking_lot::{Mutex, MutexGuard, RwLock};

use super::error::{CatalogError, CatalogResult};
use super::{ObjectId, ObjectKind, RoleId};
use crate::acl::Acl;

/// Command counter value used for row visibility
pub type CommandId = u32;

/// Columns shared by every securable catalog row
pub trait CatalogRow: Clone + fmt::Debug + Send + Sync {
    /// Object name
    fn name(&self) -> &str;

    /// Recorded owner, if the row carries an owner column
    fn owner(&self) -> Option<RoleId>;

    /// Stored ACL; `None` means the kind's default applies
    fn acl(&self) -> Option<&Acl>;

    /// Replace the stored ACL
    fn set_acl(&mut self, acl: Option<Acl>);
}

/// Field-keyed update of a catalog row
///
/// Fields that are not set carry over from the base row unchanged.
#[derive(Debug, Clone)]
pub struct RowUpdate<R> {
    row: R,
}

impl<R: CatalogRow> RowUpdate<R> {
    /// Start an update from the currently visible row
    pub fn from_row(row: &R) -> Self {
        RowUpdate { row: row.clone() }
    }

    /// Set the ACL column
    #[must_use]
    pub fn acl(mut self, acl: Acl) -> Self {
        self.row.set_acl(Some(acl));
        self
    }

    /// Produce the new row version
    pub fn build(self) -> R {
        self.row
    }
}

#[derive(Debug, Clone)]
struct RowVersion<R> {
    cid: CommandId,
    row: R,
}

/// One catalog table holding all versions of its rows
pub struct CatalogTable<R> {
    name: &'static str,
    kind: ObjectKind,
    rows: RwLock<BTreeMap<ObjectId, Vec<RowVersion<R>>>>,
    write_lock: Mutex<()>,
}

impl<R: CatalogRow> CatalogTable<R> {
    pub(crate) fn new(name: &'static str, kind: ObjectKind) -> Self {
        CatalogTable {
            name,
            kind,
            rows: RwLock::new(BTreeMap::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Table name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Kind of object stored in this table
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Take the exclusive write lock for a read-modify-write cycle
    ///
    /// Readers are never blocked by this lock.
    pub fn acquire_lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock()
    }

    /// Look up the row visible at `snapshot`
    pub fn lookup_row(&self, id: ObjectId, snapshot: CommandId) -> Option<R> {
        let rows = self.rows.read();
        rows.get(&id)
            .and_then(|versions| Self::visible(versions, snapshot))
            .map(|v| v.row.clone())
    }

    /// Look up a row by name at `snapshot`
    pub fn lookup_by_name(&self, name: &str, snapshot: CommandId) -> Option<(ObjectId, R)> {
        let rows = self.rows.read();
        rows.iter().find_map(|(id, versions)| {
            Self::visible(versions, snapshot)
                .filter(|v| v.row.name() == name)
                .map(|v| (*id, v.row.clone()))
        })
    }

    /// Ids of all rows visible at `snapshot`
    pub fn ids(&self, snapshot: CommandId) -> Vec<ObjectId> {
        let rows = self.rows.read();
        rows.iter()
            .filter(|(_, versions)| Self::visible(versions, snapshot).is_some())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Insert the first version of a new row
    pub(crate) fn insert_row(&self, id: ObjectId, row: R, cid: CommandId) -> CatalogResult<()> {
        let mut rows = self.rows.write();
        let name_taken = rows
            .values()
            .filter_map(|versions| versions.last())
            .any(|v| v.row.name() == row.name());
        if rows.contains_key(&id) || name_taken {
            return Err(CatalogError::DuplicateObject {
                kind: self.kind,
                name: row.name().to_string(),
            });
        }
        rows.insert(id, vec![RowVersion { cid, row }]);
        Ok(())
    }

    /// Write a new version of an existing row
    ///
    /// Fails if the row does not exist or was already written by command `cid`.
    pub fn insert_new_version(&self, id: ObjectId, row: R, cid: CommandId) -> CatalogResult<()> {
        let mut rows = self.rows.write();
        let versions = rows.get_mut(&id).ok_or(CatalogError::UndefinedObject {
            kind: self.kind,
            id,
        })?;
        if versions.last().is_some_and(|v| v.cid >= cid) {
            return Err(CatalogError::TupleAlreadyUpdated {
                kind: self.kind,
                id,
            });
        }
        versions.push(RowVersion { cid, row });
        Ok(())
    }

    /// Number of versions stored for a row (including superseded ones)
    pub fn version_count(&self, id: ObjectId) -> usize {
        self.rows.read().get(&id).map_or(0, Vec::len)
    }

    fn visible(versions: &[RowVersion<R>], snapshot: CommandId) -> Option<&RowVersion<R>> {
        versions.iter().rev().find(|v| v.cid < snapshot)
    }
}

impl<R> fmt::Debug for CatalogTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogTable")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}
