//! GRANT/REVOKE and privilege check integration tests

mod common;

use common::Fixture;
use privplan::acl::{
    default_acl, AccessControl, AclCheck, AclError, AclWarning, CascadeBehavior, GrantRequest,
    GrantStatement, Grantee, PrivilegeSet,
};
use privplan::catalog::system_tables::{
    C_LANGUAGE_ID, DEFAULT_TABLESPACE_ID, GLOBAL_TABLESPACE_ID, PUBLIC_NAMESPACE,
    RELATION_RELATION_ID, SQL_LANGUAGE_ID, TABLES_VIEW_ID, TEMPLATE_DATABASE_ID,
};
use privplan::catalog::{
    CatalogError, DependencyType, NamespaceRow, ObjectId, ObjectKind, RelationKind, RelationRow,
    RoleId, RoleRow,
};

fn select() -> PrivilegeSet {
    PrivilegeSet::SELECT
}

// ============ End-to-end Scenarios ============

#[test]
fn test_owner_grants_select() {
    let f = Fixture::new();
    assert!(f
        .catalog
        .relations()
        .lookup_row(f.accounts, f.catalog.command_id())
        .unwrap()
        .acl
        .is_none());

    let outcome = f.grant_on_accounts(f.owner, f.alice, select(), false);
    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.objects_updated, 1);

    let acl = f.relation_acl(f.accounts);
    let alice = acl.entry(Grantee::Role(f.alice)).unwrap();
    assert_eq!(alice.grantor(), f.owner);
    assert_eq!(alice.privileges(), PrivilegeSet::SELECT);
    assert!(alice.grantable().is_empty());
    // The owner's default entry plus exactly one for alice
    assert_eq!(acl.len(), 2);
    assert_eq!(
        acl.items()
            .iter()
            .filter(|i| i.grantee() == Grantee::Role(f.alice))
            .count(),
        1
    );
}

#[test]
fn test_revoke_returns_to_default() {
    let f = Fixture::new();
    f.grant_on_accounts(f.owner, f.alice, select(), false);

    let request = GrantRequest::revoke(
        ObjectKind::Relation,
        vec![f.accounts],
        select(),
        vec![f.alice.into()],
    );
    let outcome = f.run(f.owner, request).unwrap();
    assert!(outcome.warnings.is_empty());

    let acl = f.relation_acl(f.accounts);
    assert!(acl.entry(Grantee::Role(f.alice)).is_none());
    assert_eq!(acl, default_acl(ObjectKind::Relation, f.owner));
}

#[test]
fn test_grant_through_grant_option() {
    let f = Fixture::new();
    f.grant_on_accounts(f.owner, f.alice, select(), true);
    let outcome = f.grant_on_accounts(f.alice, f.bob, select(), false);
    assert!(outcome.warnings.is_empty());

    let acl = f.relation_acl(f.accounts);
    let bob = acl.entry(Grantee::Role(f.bob)).unwrap();
    assert_eq!(bob.privileges(), PrivilegeSet::SELECT);
    assert!(bob.grantable().is_empty());
    assert_eq!(bob.grantor(), f.alice);

    assert_eq!(
        f.check(f.bob, ObjectKind::Relation, f.accounts, select()),
        AclCheck::Ok
    );
    assert_eq!(
        f.check(f.bob, ObjectKind::Relation, f.accounts, PrivilegeSet::UPDATE),
        AclCheck::NoPrivilege
    );
}

// ============ Grantor Selection and Warnings ============

#[test]
fn test_superuser_grants_as_owner() {
    let f = Fixture::new();
    f.grant_on_accounts(f.superuser, f.alice, select(), false);

    let acl = f.relation_acl(f.accounts);
    assert_eq!(acl.entry(Grantee::Role(f.alice)).unwrap().grantor(), f.owner);
}

#[test]
fn test_owner_member_grants_as_itself() {
    let f = Fixture::new();
    let dave = f.catalog.create_role("dave").unwrap();
    f.catalog.grant_role_membership(dave, f.owner).unwrap();

    f.grant_on_accounts(dave, f.bob, select(), false);
    let acl = f.relation_acl(f.accounts);
    assert_eq!(acl.entry(Grantee::Role(f.bob)).unwrap().grantor(), dave);
}

#[test]
fn test_partial_grant_warns() {
    let f = Fixture::new();
    f.grant_on_accounts(f.owner, f.alice, select(), true);
    f.grant_on_accounts(f.owner, f.alice, PrivilegeSet::INSERT, false);

    let outcome = f.grant_on_accounts(f.alice, f.bob, select() | PrivilegeSet::INSERT, false);
    assert_eq!(outcome.warnings.len(), 1);
    let warning = &outcome.warnings[0];
    assert!(matches!(
        warning,
        AclWarning::PrivilegeNotGranted { partial: true, .. }
    ));
    assert_eq!(warning.message(), "not all privileges were granted");
    assert_eq!(warning.sqlstate(), "01007");

    let acl = f.relation_acl(f.accounts);
    assert_eq!(
        acl.entry(Grantee::Role(f.bob)).unwrap().privileges(),
        PrivilegeSet::SELECT
    );
}

#[test]
fn test_grant_without_options_warns_and_changes_nothing() {
    let f = Fixture::new();
    f.grant_on_accounts(f.owner, f.carol, select(), false);

    let outcome = f.grant_on_accounts(f.carol, f.bob, select(), false);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].message(), "no privileges were granted");
    assert!(f.relation_acl(f.accounts).entry(Grantee::Role(f.bob)).is_none());
}

#[test]
fn test_revoke_without_options_warns() {
    let f = Fixture::new();
    f.grant_on_accounts(f.owner, f.carol, select(), false);
    f.grant_on_accounts(f.owner, f.bob, select(), false);

    let request = GrantRequest::revoke(
        ObjectKind::Relation,
        vec![f.accounts],
        select(),
        vec![f.bob.into()],
    );
    let outcome = f.run(f.carol, request).unwrap();
    assert_eq!(outcome.warnings[0].message(), "no privileges could be revoked");
    assert_eq!(outcome.warnings[0].sqlstate(), "01006");
    assert!(f.relation_acl(f.accounts).entry(Grantee::Role(f.bob)).is_some());
}

#[test]
fn test_stranger_cannot_grant() {
    let f = Fixture::new();
    let request = GrantRequest::grant(
        ObjectKind::Relation,
        vec![f.accounts],
        select(),
        vec![f.carol.into()],
    );
    let err = f.run(f.bob, request).unwrap_err();
    assert_eq!(
        err,
        AclError::InsufficientPrivilege("permission denied for relation accounts".to_string())
    );
    assert_eq!(err.sqlstate(), "42501");
}

// ============ Request Validation ============

#[test]
fn test_grant_option_to_public_rejected_without_writes() {
    let f = Fixture::new();
    let versions = f.catalog.relations().version_count(f.accounts);

    let request = GrantRequest::grant(
        ObjectKind::Relation,
        vec![f.accounts],
        select(),
        vec![f.alice.into(), Grantee::Public],
    )
    .with_grant_option();
    let err = f.run(f.owner, request).unwrap_err();
    assert!(matches!(err, AclError::InvalidGrantOperation(_)));
    assert_eq!(f.catalog.relations().version_count(f.accounts), versions);
}

#[test]
fn test_privilege_outside_kind_rejected() {
    let f = Fixture::new();
    let request = GrantRequest::grant(
        ObjectKind::Relation,
        vec![f.accounts],
        PrivilegeSet::EXECUTE,
        vec![f.alice.into()],
    );
    let err = f.run(f.owner, request).unwrap_err();
    assert_eq!(err.to_string(), "invalid privilege type EXECUTE for table");
}

#[test]
fn test_unknown_object_and_grantee() {
    let f = Fixture::new();
    let request = GrantRequest::grant(
        ObjectKind::Relation,
        vec![ObjectId(99_999)],
        select(),
        vec![f.alice.into()],
    );
    assert!(matches!(
        f.run(f.owner, request).unwrap_err(),
        AclError::UndefinedObject { .. }
    ));

    let request = GrantRequest::grant(
        ObjectKind::Relation,
        vec![f.accounts],
        select(),
        vec![Grantee::Role(RoleId(99_999))],
    );
    assert_eq!(
        f.run(f.owner, request).unwrap_err(),
        AclError::UndefinedRole(RoleId(99_999))
    );
}

#[test]
fn test_index_and_composite_type_not_grantable() {
    let f = Fixture::new();
    let index = f
        .catalog
        .create_relation(
            RelationRow::new("accounts_pkey", PUBLIC_NAMESPACE, f.owner).kind(RelationKind::Index),
        )
        .unwrap();
    let request = GrantRequest::grant(
        ObjectKind::Relation,
        vec![index],
        select(),
        vec![f.alice.into()],
    );
    let err = f.run(f.owner, request).unwrap_err();
    assert_eq!(err.to_string(), "\"accounts_pkey\" is an index");
    assert_eq!(err.sqlstate(), "42809");

    let composite = f
        .catalog
        .create_relation(
            RelationRow::new("pair", PUBLIC_NAMESPACE, f.owner).kind(RelationKind::CompositeType),
        )
        .unwrap();
    let request = GrantRequest::grant(
        ObjectKind::Relation,
        vec![composite],
        select(),
        vec![f.alice.into()],
    );
    assert_eq!(
        f.run(f.owner, request).unwrap_err().to_string(),
        "\"pair\" is a composite type"
    );
}

#[test]
fn test_untrusted_language_rejected_even_for_superuser() {
    let f = Fixture::new();
    let request = GrantRequest::grant(
        ObjectKind::Language,
        vec![C_LANGUAGE_ID],
        PrivilegeSet::USAGE,
        vec![f.alice.into()],
    );
    let err = f.run(f.superuser, request).unwrap_err();
    assert_eq!(err.to_string(), "language \"c\" is not trusted");
    assert_eq!(err.hint(), Some("Only superusers may use untrusted languages."));

    let request = GrantRequest::grant(
        ObjectKind::Language,
        vec![SQL_LANGUAGE_ID],
        PrivilegeSet::USAGE,
        vec![f.alice.into()],
    );
    f.run(f.superuser, request).unwrap();
}

// ============ Cascading Revoke ============

fn chain(f: &Fixture) {
    f.grant_on_accounts(f.owner, f.alice, select(), true);
    f.grant_on_accounts(f.alice, f.bob, select(), true);
    f.grant_on_accounts(f.bob, f.carol, select(), false);
}

#[test]
fn test_restrict_revoke_fails_with_dependents() {
    let f = Fixture::new();
    chain(&f);
    let before = f.relation_acl(f.accounts);

    let request = GrantRequest::revoke(
        ObjectKind::Relation,
        vec![f.accounts],
        select(),
        vec![f.alice.into()],
    );
    let err = f.run(f.owner, request).unwrap_err();
    assert_eq!(err, AclError::DependentPrivilegesExist);
    assert_eq!(err.hint(), Some("Use CASCADE to revoke them too."));
    assert_eq!(f.relation_acl(f.accounts), before);
}

#[test]
fn test_cascade_revoke_removes_chain() {
    let f = Fixture::new();
    chain(&f);

    let request = GrantRequest::revoke(
        ObjectKind::Relation,
        vec![f.accounts],
        select(),
        vec![f.alice.into()],
    )
    .cascade();
    assert_eq!(request.cascade, CascadeBehavior::Cascade);
    f.run(f.owner, request).unwrap();

    let acl = f.relation_acl(f.accounts);
    for role in [f.alice, f.bob, f.carol] {
        assert!(acl.entry(Grantee::Role(role)).is_none());
    }
    assert_eq!(
        f.check(f.carol, ObjectKind::Relation, f.accounts, select()),
        AclCheck::NoPrivilege
    );
}

#[test]
fn test_revoke_grant_option_only_keeps_privilege() {
    let f = Fixture::new();
    chain(&f);

    let request = GrantRequest::revoke(
        ObjectKind::Relation,
        vec![f.accounts],
        select(),
        vec![f.alice.into()],
    )
    .with_grant_option()
    .cascade();
    f.run(f.owner, request).unwrap();

    let acl = f.relation_acl(f.accounts);
    let alice = acl.entry(Grantee::Role(f.alice)).unwrap();
    assert_eq!(alice.privileges(), PrivilegeSet::SELECT);
    assert!(alice.grantable().is_empty());
    assert!(acl.entry(Grantee::Role(f.bob)).is_none());
    assert!(acl.entry(Grantee::Role(f.carol)).is_none());
}

// ============ Statement Semantics ============

#[test]
fn test_same_object_twice_in_one_statement() {
    let f = Fixture::new();
    let versions = f.catalog.relations().version_count(f.accounts);

    let request = GrantRequest::grant(
        ObjectKind::Relation,
        vec![f.accounts, f.accounts],
        select(),
        vec![f.alice.into()],
    );
    let outcome = f.run(f.owner, request).unwrap();
    assert_eq!(outcome.objects_updated, 2);
    assert_eq!(f.catalog.relations().version_count(f.accounts), versions + 2);
}

#[test]
fn test_later_objects_see_earlier_updates() {
    let f = Fixture::new();
    let ledger = f
        .catalog
        .create_relation(RelationRow::new("ledger", PUBLIC_NAMESPACE, f.owner))
        .unwrap();
    let request = GrantRequest::grant(
        ObjectKind::Relation,
        vec![f.accounts, ledger],
        select(),
        vec![f.alice.into()],
    )
    .with_grant_option();
    f.run(f.owner, request).unwrap();

    for id in [f.accounts, ledger] {
        assert_eq!(f.check(f.alice, ObjectKind::Relation, id, select()), AclCheck::Ok);
    }
}

#[test]
fn test_all_privileges() {
    let f = Fixture::new();
    let request = GrantRequest::grant(
        ObjectKind::Relation,
        vec![f.accounts],
        PrivilegeSet::empty(),
        vec![f.alice.into()],
    )
    .all();
    f.run(f.owner, request).unwrap();

    let acl = f.relation_acl(f.accounts);
    assert_eq!(
        acl.entry(Grantee::Role(f.alice)).unwrap().privileges(),
        ObjectKind::Relation.all_rights()
    );
}

#[test]
fn test_statement_by_name() {
    let f = Fixture::new();
    let statement = GrantStatement {
        is_grant: true,
        object_kind: ObjectKind::Relation,
        objects: vec!["accounts".to_string()],
        privileges: vec!["select".to_string(), "UPDATE".to_string()],
        grantees: vec![Some("alice".to_string()), None],
        grant_option: false,
        cascade: CascadeBehavior::Restrict,
    };
    f.run_statement(f.owner, statement.clone()).unwrap();

    let acl = f.relation_acl(f.accounts);
    assert_eq!(
        acl.entry(Grantee::Role(f.alice)).unwrap().privileges(),
        PrivilegeSet::SELECT | PrivilegeSet::UPDATE
    );
    assert!(acl.entry(Grantee::Public).is_some());
    assert_eq!(
        f.check(f.carol, ObjectKind::Relation, f.accounts, PrivilegeSet::UPDATE),
        AclCheck::Ok
    );

    let unknown_role = GrantStatement {
        grantees: vec![Some("mallory".to_string())],
        ..statement.clone()
    };
    assert_eq!(
        f.run_statement(f.owner, unknown_role).unwrap_err().to_string(),
        "role \"mallory\" does not exist"
    );

    let unknown_keyword = GrantStatement {
        privileges: vec!["fly".to_string()],
        ..statement.clone()
    };
    assert_eq!(
        f.run_statement(f.owner, unknown_keyword).unwrap_err().to_string(),
        "unrecognized privilege type \"fly\""
    );

    let unknown_object = GrantStatement {
        objects: vec!["nope".to_string()],
        ..statement
    };
    assert_eq!(
        f.run_statement(f.owner, unknown_object).unwrap_err().to_string(),
        "relation \"nope\" does not exist"
    );
}

#[test]
fn test_statement_empty_privileges_means_all() {
    let f = Fixture::new();
    let schema = f
        .catalog
        .create_namespace(NamespaceRow::new("reporting", f.owner))
        .unwrap();
    let statement = GrantStatement {
        is_grant: true,
        object_kind: ObjectKind::Namespace,
        objects: vec!["reporting".to_string()],
        privileges: vec![],
        grantees: vec![Some("bob".to_string())],
        grant_option: false,
        cascade: CascadeBehavior::Restrict,
    };
    f.run_statement(f.owner, statement).unwrap();

    for privilege in [PrivilegeSet::USAGE, PrivilegeSet::CREATE] {
        assert_eq!(
            f.check(f.bob, ObjectKind::Namespace, schema, privilege),
            AclCheck::Ok
        );
    }
}

// ============ Privilege Predicates ============

#[test]
fn test_superuser_bypass() {
    let f = Fixture::new();
    let all = ObjectKind::Relation.all_rights();
    assert_eq!(
        f.check(f.superuser, ObjectKind::Relation, f.accounts, all),
        AclCheck::Ok
    );
    assert_eq!(
        f.check(f.alice, ObjectKind::Relation, f.accounts, all),
        AclCheck::NoPrivilege
    );
}

#[test]
fn test_system_catalog_write_guard() {
    let f = Fixture::new();
    let admin = RoleId(500);
    f.catalog
        .add_role(RoleRow::new(admin, "admin").superuser().catupdate(false))
        .unwrap();

    assert_eq!(
        f.check(admin, ObjectKind::Relation, RELATION_RELATION_ID, PrivilegeSet::INSERT),
        AclCheck::NoPrivilege
    );
    assert_eq!(
        f.check(admin, ObjectKind::Relation, RELATION_RELATION_ID, select()),
        AclCheck::Ok
    );
    // Views in the system schema are not protected
    assert_eq!(
        f.check(admin, ObjectKind::Relation, TABLES_VIEW_ID, PrivilegeSet::INSERT),
        AclCheck::Ok
    );
    // The bootstrap superuser carries catupdate
    assert_eq!(
        f.check(f.superuser, ObjectKind::Relation, RELATION_RELATION_ID, PrivilegeSet::DELETE),
        AclCheck::Ok
    );

    let session = f.session(admin).with_system_table_mods(true);
    let ac = AccessControl::new(&f.catalog, &session);
    assert_eq!(
        ac.check_privilege(
            ObjectKind::Relation,
            RELATION_RELATION_ID,
            admin,
            PrivilegeSet::UPDATE
        )
        .unwrap(),
        AclCheck::Ok
    );
}

#[test]
fn test_temporary_schema_follows_database_temp_right() {
    let f = Fixture::new();
    let temp = f
        .catalog
        .create_namespace(NamespaceRow::new("pg_temp_1", f.superuser))
        .unwrap();
    let session = f.session(f.alice).with_temp_namespace(temp);
    let ac = AccessControl::new(&f.catalog, &session);

    // template1's default ACL lets PUBLIC create temporary objects
    assert_eq!(
        ac.check_privilege(ObjectKind::Namespace, temp, f.alice, PrivilegeSet::CREATE)
            .unwrap(),
        AclCheck::Ok
    );

    let revoke = GrantRequest::revoke(
        ObjectKind::Database,
        vec![TEMPLATE_DATABASE_ID],
        PrivilegeSet::CREATE_TEMP,
        vec![Grantee::Public],
    );
    f.run(f.superuser, revoke).unwrap();

    assert_eq!(
        ac.check_privilege(ObjectKind::Namespace, temp, f.alice, PrivilegeSet::CREATE)
            .unwrap(),
        AclCheck::NoPrivilege
    );
    assert_eq!(
        ac.check_privilege(ObjectKind::Namespace, temp, f.alice, PrivilegeSet::USAGE)
            .unwrap(),
        AclCheck::Ok
    );
    // Other sessions see the stored ACL, which grants alice nothing
    assert_eq!(
        f.check(f.alice, ObjectKind::Namespace, temp, PrivilegeSet::USAGE),
        AclCheck::NoPrivilege
    );
}

#[test]
fn test_global_tablespace_reserved() {
    let f = Fixture::new();
    assert_eq!(
        f.check(f.superuser, ObjectKind::Tablespace, GLOBAL_TABLESPACE_ID, PrivilegeSet::CREATE),
        AclCheck::NoPrivilege
    );
    assert_eq!(
        f.check(f.superuser, ObjectKind::Tablespace, DEFAULT_TABLESPACE_ID, PrivilegeSet::CREATE),
        AclCheck::Ok
    );
    assert_eq!(
        f.check(f.alice, ObjectKind::Tablespace, DEFAULT_TABLESPACE_ID, PrivilegeSet::CREATE),
        AclCheck::NoPrivilege
    );

    let session = f.session(f.superuser).with_bootstrap_mode(true);
    let ac = AccessControl::new(&f.catalog, &session);
    assert_eq!(
        ac.check_privilege(
            ObjectKind::Tablespace,
            GLOBAL_TABLESPACE_ID,
            f.superuser,
            PrivilegeSet::CREATE
        )
        .unwrap(),
        AclCheck::Ok
    );
}

#[test]
fn test_database_default_grants_public_connect() {
    let f = Fixture::new();
    assert_eq!(
        f.check(f.alice, ObjectKind::Database, TEMPLATE_DATABASE_ID, PrivilegeSet::CONNECT),
        AclCheck::Ok
    );
    assert_eq!(
        f.check(f.alice, ObjectKind::Database, TEMPLATE_DATABASE_ID, PrivilegeSet::CREATE),
        AclCheck::NoPrivilege
    );
}

#[test]
fn test_inherited_privileges() {
    let f = Fixture::new();
    let staff = f.catalog.create_role("staff").unwrap();
    f.catalog.grant_role_membership(f.carol, staff).unwrap();
    f.grant_on_accounts(f.owner, staff, select(), false);

    assert_eq!(
        f.check(f.carol, ObjectKind::Relation, f.accounts, select()),
        AclCheck::Ok
    );

    let loner = RoleId(600);
    f.catalog
        .add_role(RoleRow::new(loner, "loner").inherit(false))
        .unwrap();
    f.catalog.grant_role_membership(loner, staff).unwrap();
    assert_eq!(
        f.check(loner, ObjectKind::Relation, f.accounts, select()),
        AclCheck::NoPrivilege
    );
}

#[test]
fn test_ownership() {
    let f = Fixture::new();
    let dave = f.catalog.create_role("dave").unwrap();
    f.catalog.grant_role_membership(dave, f.owner).unwrap();

    let session = f.session(f.alice);
    let ac = AccessControl::new(&f.catalog, &session);
    let owns = |role| ac.check_ownership(ObjectKind::Relation, f.accounts, role).unwrap();
    assert!(owns(f.owner));
    assert!(owns(f.superuser));
    assert!(owns(dave));
    assert!(!owns(f.alice));

    assert!(matches!(
        ac.check_ownership(ObjectKind::Relation, ObjectId(99_999), f.owner),
        Err(AclError::UndefinedObject { .. })
    ));
    // Languages are owned by the bootstrap superuser
    assert!(!ac
        .check_ownership(ObjectKind::Language, SQL_LANGUAGE_ID, f.owner)
        .unwrap());
}

// ============ Dependencies and Role Removal ============

#[test]
fn test_acl_dependencies_track_grantees() {
    let f = Fixture::new();
    f.grant_on_accounts(f.owner, f.alice, select(), false);

    let edges: Vec<_> = f
        .catalog
        .dependencies()
        .for_object(ObjectKind::Relation, f.accounts)
        .filter(|d| d.dep_type == DependencyType::Acl)
        .map(|d| d.role)
        .collect();
    assert_eq!(edges, vec![f.alice]);

    let err = f.catalog.drop_role(f.alice).unwrap_err();
    assert!(matches!(err, CatalogError::RoleHasDependents { count: 1, .. }));

    let request = GrantRequest::revoke(
        ObjectKind::Relation,
        vec![f.accounts],
        select(),
        vec![f.alice.into()],
    );
    f.run(f.owner, request).unwrap();
    f.catalog.drop_role(f.alice).unwrap();
}

#[test]
fn test_remove_role_from_acls() {
    let f = Fixture::new();
    chain(&f);
    let schema = f
        .catalog
        .create_namespace(NamespaceRow::new("reporting", f.owner))
        .unwrap();
    let request = GrantRequest::grant(
        ObjectKind::Namespace,
        vec![schema],
        PrivilegeSet::USAGE,
        vec![f.alice.into()],
    );
    f.run(f.owner, request).unwrap();

    let session = f.session(f.superuser);
    let rewritten = AccessControl::new(&f.catalog, &session)
        .remove_role_from_acls(f.alice)
        .unwrap();
    assert_eq!(rewritten, 2);

    let acl = f.relation_acl(f.accounts);
    for role in [f.alice, f.bob, f.carol] {
        assert!(acl.entry(Grantee::Role(role)).is_none());
    }
    f.catalog.drop_role(f.alice).unwrap();
}

#[test]
fn test_remove_role_reassigns_its_grants() {
    let f = Fixture::new();
    let dave = f.catalog.create_role("dave").unwrap();
    f.catalog.grant_role_membership(dave, f.owner).unwrap();
    f.grant_on_accounts(dave, f.bob, select(), false);

    let session = f.session(f.superuser);
    AccessControl::new(&f.catalog, &session)
        .remove_role_from_acls(dave)
        .unwrap();

    let acl = f.relation_acl(f.accounts);
    assert_eq!(acl.entry(Grantee::Role(f.bob)).unwrap().grantor(), f.owner);
    f.catalog.drop_role(dave).unwrap();
}

// ============ Grantor Attribution ============

#[test]
fn test_revoke_only_touches_own_grants() {
    let f = Fixture::new();
    f.grant_on_accounts(f.owner, f.alice, select(), true);
    f.grant_on_accounts(f.owner, f.bob, select(), false);

    let request = GrantRequest::revoke(
        ObjectKind::Relation,
        vec![f.accounts],
        select(),
        vec![f.bob.into(), f.owner.into()],
    );
    let outcome = f.run(f.alice, request).unwrap();
    assert!(outcome.warnings.is_empty());

    let acl = f.relation_acl(f.accounts);
    let bob = acl.entry(Grantee::Role(f.bob)).unwrap();
    assert_eq!(bob.grantor(), f.owner);
    assert_eq!(bob.privileges(), PrivilegeSet::SELECT);
    assert_eq!(
        acl.entry(Grantee::Role(f.owner)).unwrap().privileges(),
        ObjectKind::Relation.all_rights()
    );
    assert_eq!(
        f.check(f.bob, ObjectKind::Relation, f.accounts, select()),
        AclCheck::Ok
    );
}

#[test]
fn test_owner_grant_survives_cascade() {
    let f = Fixture::new();
    f.grant_on_accounts(f.owner, f.alice, select(), true);
    f.grant_on_accounts(f.alice, f.bob, select(), false);
    f.grant_on_accounts(f.owner, f.bob, select() | PrivilegeSet::INSERT, false);

    let acl = f.relation_acl(f.accounts);
    assert_eq!(acl.entry(Grantee::Role(f.bob)).unwrap().grantor(), f.owner);

    let request = GrantRequest::revoke(
        ObjectKind::Relation,
        vec![f.accounts],
        select(),
        vec![f.alice.into()],
    )
    .cascade();
    f.run(f.owner, request).unwrap();

    let acl = f.relation_acl(f.accounts);
    assert!(acl.entry(Grantee::Role(f.alice)).is_none());
    let bob = acl.entry(Grantee::Role(f.bob)).unwrap();
    assert_eq!(bob.grantor(), f.owner);
    assert_eq!(bob.privileges(), PrivilegeSet::SELECT | PrivilegeSet::INSERT);
    assert_eq!(
        f.check(f.bob, ObjectKind::Relation, f.accounts, select()),
        AclCheck::Ok
    );
}

#[test]
fn test_second_grantor_cannot_extend_entry() {
    let f = Fixture::new();
    f.grant_on_accounts(f.owner, f.alice, select(), true);
    f.grant_on_accounts(f.owner, f.carol, select() | PrivilegeSet::INSERT, true);
    f.grant_on_accounts(f.alice, f.bob, select(), false);
    let versions = f.catalog.relations().version_count(f.accounts);

    // Already held: accepted, nothing recorded for carol
    f.grant_on_accounts(f.carol, f.bob, select(), false);
    let acl = f.relation_acl(f.accounts);
    assert_eq!(acl.entry(Grantee::Role(f.bob)).unwrap().grantor(), f.alice);

    let request = GrantRequest::grant(
        ObjectKind::Relation,
        vec![f.accounts],
        PrivilegeSet::INSERT,
        vec![f.bob.into()],
    );
    let err = f.run(f.carol, request).unwrap_err();
    assert!(matches!(err, AclError::InvalidGrantOperation(_)));
    assert_eq!(f.catalog.relations().version_count(f.accounts), versions + 1);
    assert_eq!(
        f.check(f.bob, ObjectKind::Relation, f.accounts, PrivilegeSet::INSERT),
        AclCheck::NoPrivilege
    );
}

#[test]
fn test_remove_role_granted_by_non_owner() {
    let f = Fixture::new();
    f.grant_on_accounts(f.owner, f.alice, select(), true);
    f.grant_on_accounts(f.alice, f.bob, select(), false);

    let session = f.session(f.superuser);
    AccessControl::new(&f.catalog, &session)
        .remove_role_from_acls(f.bob)
        .unwrap();

    let acl = f.relation_acl(f.accounts);
    assert!(acl.entry(Grantee::Role(f.bob)).is_none());
    assert!(acl.entry(Grantee::Role(f.alice)).is_some());
    f.catalog.drop_role(f.bob).unwrap();
}
