//! Session state consulted by privilege checks

use crate::catalog::{ObjectId, RoleId};

/// Per-connection session state
#[derive(Debug, Clone)]
pub struct Session {
    /// Role on whose behalf commands run (SET ROLE changes it)
    user: RoleId,
    /// Database the session is connected to
    database: ObjectId,
    /// This session's temporary-object namespace, once created
    temp_namespace: Option<ObjectId>,
    /// Permit direct modification of system catalogs
    allow_system_table_mods: bool,
    /// Running bootstrap; unlocks the global tablespace
    bootstrap_mode: bool,
}

impl Session {
    /// Create a session for `user` connected to `database`
    pub fn new(user: RoleId, database: ObjectId) -> Self {
        Self {
            user,
            database,
            temp_namespace: None,
            allow_system_table_mods: false,
            bootstrap_mode: false,
        }
    }

    #[must_use]
    pub fn with_temp_namespace(mut self, namespace: ObjectId) -> Self {
        self.temp_namespace = Some(namespace);
        self
    }

    #[must_use]
    pub fn with_system_table_mods(mut self, allow: bool) -> Self {
        self.allow_system_table_mods = allow;
        self
    }

    #[must_use]
    pub fn with_bootstrap_mode(mut self, bootstrap: bool) -> Self {
        self.bootstrap_mode = bootstrap;
        self
    }

    /// Set the current role
    pub fn set_user(&mut self, user: RoleId) {
        self.user = user;
    }

    pub fn user(&self) -> RoleId {
        self.user
    }

    pub fn database(&self) -> ObjectId {
        self.database
    }

    pub fn temp_namespace(&self) -> Option<ObjectId> {
        self.temp_namespace
    }

    /// Check if `namespace` is this session's temporary namespace
    pub fn is_temp_namespace(&self, namespace: ObjectId) -> bool {
        self.temp_namespace == Some(namespace)
    }

    pub fn allow_system_table_mods(&self) -> bool {
        self.allow_system_table_mods
    }

    pub fn in_bootstrap_mode(&self) -> bool {
        self.bootstrap_mode
    }
}
