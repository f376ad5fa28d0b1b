//! Shared test utilities
//!
//! Note: clippy reports false-positive dead_code warnings because it can't
//! trace usage across test binaries. These utilities are used by multiple tests.

#![allow(dead_code)]

use privplan::acl::securable::{Relations, SecurableKind};
use privplan::acl::{AccessControl, Acl, AclCheck, AclResult, GrantOutcome, GrantRequest};
use privplan::acl::{GrantStatement, PrivilegeSet};
use privplan::catalog::system_tables::{
    BOOTSTRAP_SUPERUSER_ID, PUBLIC_NAMESPACE, TEMPLATE_DATABASE_ID,
};
use privplan::catalog::{Catalog, ColumnDef, DataType, ObjectId, ObjectKind, RelationRow, RoleId};
use privplan::session::Session;
use tracing_subscriber::EnvFilter;

/// Install a test subscriber honouring RUST_LOG; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Bootstrapped catalog with a few roles and one table
pub struct Fixture {
    pub catalog: Catalog,
    pub superuser: RoleId,
    /// Owner of `accounts`; not a superuser
    pub owner: RoleId,
    pub alice: RoleId,
    pub bob: RoleId,
    pub carol: RoleId,
    pub accounts: ObjectId,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        let catalog = Catalog::bootstrap().unwrap();
        let owner = catalog.create_role("olivia").unwrap();
        let alice = catalog.create_role("alice").unwrap();
        let bob = catalog.create_role("bob").unwrap();
        let carol = catalog.create_role("carol").unwrap();

        let accounts = catalog
            .create_relation(
                RelationRow::new("accounts", PUBLIC_NAMESPACE, owner)
                    .column(ColumnDef::new("id", DataType::BigInt))
                    .column(ColumnDef::new("owner_name", DataType::Varchar(64)))
                    .column(ColumnDef::new("balance", DataType::Double))
                    .stats(120, 10_000),
            )
            .unwrap();

        Self {
            catalog,
            superuser: BOOTSTRAP_SUPERUSER_ID,
            owner,
            alice,
            bob,
            carol,
            accounts,
        }
    }

    pub fn session(&self, user: RoleId) -> Session {
        Session::new(user, TEMPLATE_DATABASE_ID)
    }

    /// Run a GRANT/REVOKE as `user`
    pub fn run(&self, user: RoleId, request: GrantRequest) -> AclResult<GrantOutcome> {
        let session = self.session(user);
        AccessControl::new(&self.catalog, &session).execute_grant_or_revoke(&request)
    }

    /// Run a name-based GRANT/REVOKE as `user`
    pub fn run_statement(&self, user: RoleId, statement: GrantStatement) -> AclResult<GrantOutcome> {
        let session = self.session(user);
        AccessControl::new(&self.catalog, &session).execute_grant_statement(&statement)
    }

    /// Effective ACL of a relation (the default when none is stored)
    pub fn relation_acl(&self, id: ObjectId) -> Acl {
        let row = Relations::fetch_row(&self.catalog, id).unwrap();
        Relations::acl_of(&row)
    }

    pub fn check(
        &self,
        user: RoleId,
        kind: ObjectKind,
        id: ObjectId,
        privileges: PrivilegeSet,
    ) -> AclCheck {
        let session = self.session(user);
        AccessControl::new(&self.catalog, &session)
            .check_privilege(kind, id, user, privileges)
            .unwrap()
    }

    /// GRANT `privileges` ON accounts TO `grantee` as `grantor`
    pub fn grant_on_accounts(
        &self,
        grantor: RoleId,
        grantee: RoleId,
        privileges: PrivilegeSet,
        with_grant_option: bool,
    ) -> GrantOutcome {
        let mut request = GrantRequest::grant(
            ObjectKind::Relation,
            vec![self.accounts],
            privileges,
            vec![grantee.into()],
        );
        if with_grant_option {
            request = request.with_grant_option();
        }
        self.run(grantor, request).unwrap()
    }
}
