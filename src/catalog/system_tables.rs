//! Bootstrap objects
//!
//! A freshly bootstrapped catalog contains the bootstrap superuser, the
//! template database, the system and public schemas, the two built-in
//! tablespaces, the built-in languages, and the core system relations.

use super::error::CatalogResult;
use super::rows::{
    DatabaseRow, LanguageRow, NamespaceRow, RelationKind, RelationRow, TablespaceRow,
};
use super::{Catalog, ColumnDef, DataType, ObjectId, RoleId, RoleRow};

/// Bootstrap superuser; also the nominal owner of languages
pub const BOOTSTRAP_SUPERUSER_ID: RoleId = RoleId(10);
pub const BOOTSTRAP_SUPERUSER_NAME: &str = "postgres";

pub const TEMPLATE_DATABASE_ID: ObjectId = ObjectId(1);

pub const PG_CATALOG_NAMESPACE: ObjectId = ObjectId(11);
pub const PG_TOAST_NAMESPACE: ObjectId = ObjectId(99);
pub const PUBLIC_NAMESPACE: ObjectId = ObjectId(2200);

pub const DEFAULT_TABLESPACE_ID: ObjectId = ObjectId(1663);
/// Shared tablespace for cluster-wide catalogs
pub const GLOBAL_TABLESPACE_ID: ObjectId = ObjectId(1664);

pub const INTERNAL_LANGUAGE_ID: ObjectId = ObjectId(12);
pub const C_LANGUAGE_ID: ObjectId = ObjectId(13);
pub const SQL_LANGUAGE_ID: ObjectId = ObjectId(14);

pub const PROCEDURE_RELATION_ID: ObjectId = ObjectId(1255);
pub const RELATION_RELATION_ID: ObjectId = ObjectId(1259);
pub const NAMESPACE_RELATION_ID: ObjectId = ObjectId(2615);
pub const TABLES_VIEW_ID: ObjectId = ObjectId(10_000);

/// First id handed out to user-created objects
pub const FIRST_NORMAL_OBJECT_ID: u32 = 16384;

fn pg_class_row() -> RelationRow {
    RelationRow::new("pg_class", PG_CATALOG_NAMESPACE, BOOTSTRAP_SUPERUSER_ID)
        .column(ColumnDef::new("relname", DataType::Varchar(64)))
        .column(ColumnDef::new("relnamespace", DataType::Int))
        .column(ColumnDef::new("relowner", DataType::Int))
        .column(ColumnDef::new("relkind", DataType::TinyInt))
        .column(ColumnDef::new("relpages", DataType::Int))
        .column(ColumnDef::new("reltuples", DataType::Float))
        .column(ColumnDef::new("relacl", DataType::Text))
}

fn pg_proc_row() -> RelationRow {
    RelationRow::new("pg_proc", PG_CATALOG_NAMESPACE, BOOTSTRAP_SUPERUSER_ID)
        .column(ColumnDef::new("proname", DataType::Varchar(64)))
        .column(ColumnDef::new("pronamespace", DataType::Int))
        .column(ColumnDef::new("proowner", DataType::Int))
        .column(ColumnDef::new("prolang", DataType::Int))
        .column(ColumnDef::new("prosrc", DataType::Text))
        .column(ColumnDef::new("proacl", DataType::Text))
}

fn pg_namespace_row() -> RelationRow {
    RelationRow::new("pg_namespace", PG_CATALOG_NAMESPACE, BOOTSTRAP_SUPERUSER_ID)
        .column(ColumnDef::new("nspname", DataType::Varchar(64)))
        .column(ColumnDef::new("nspowner", DataType::Int))
        .column(ColumnDef::new("nspacl", DataType::Text))
}

fn pg_tables_row() -> RelationRow {
    RelationRow::new("pg_tables", PG_CATALOG_NAMESPACE, BOOTSTRAP_SUPERUSER_ID)
        .kind(RelationKind::View)
        .column(ColumnDef::new("schemaname", DataType::Varchar(64)))
        .column(ColumnDef::new("tablename", DataType::Varchar(64)))
        .column(ColumnDef::new("tableowner", DataType::Varchar(64)))
}

/// Populate an empty catalog with the bootstrap objects
pub(crate) fn bootstrap(catalog: &Catalog) -> CatalogResult<()> {
    let owner = Some(BOOTSTRAP_SUPERUSER_ID);
    catalog.add_role(RoleRow::new(BOOTSTRAP_SUPERUSER_ID, BOOTSTRAP_SUPERUSER_NAME).superuser())?;

    let namespaces = [
        (PG_CATALOG_NAMESPACE, "pg_catalog"),
        (PG_TOAST_NAMESPACE, "pg_toast"),
        (PUBLIC_NAMESPACE, "public"),
    ];
    for (id, name) in namespaces {
        catalog.insert_with_id(
            catalog.namespaces(),
            id,
            NamespaceRow::new(name, BOOTSTRAP_SUPERUSER_ID),
            owner,
        )?;
    }

    catalog.insert_with_id(
        catalog.databases(),
        TEMPLATE_DATABASE_ID,
        DatabaseRow::new("template1", BOOTSTRAP_SUPERUSER_ID),
        owner,
    )?;

    for (id, name) in [
        (DEFAULT_TABLESPACE_ID, "pg_default"),
        (GLOBAL_TABLESPACE_ID, "pg_global"),
    ] {
        catalog.insert_with_id(
            catalog.tablespaces(),
            id,
            TablespaceRow::new(name, BOOTSTRAP_SUPERUSER_ID),
            owner,
        )?;
    }

    let languages = [
        (INTERNAL_LANGUAGE_ID, "internal", false),
        (C_LANGUAGE_ID, "c", false),
        (SQL_LANGUAGE_ID, "sql", true),
    ];
    for (id, name, trusted) in languages {
        catalog.insert_with_id(catalog.languages(), id, LanguageRow::new(name, trusted), None)?;
    }

    let relations = [
        (PROCEDURE_RELATION_ID, pg_proc_row()),
        (RELATION_RELATION_ID, pg_class_row()),
        (NAMESPACE_RELATION_ID, pg_namespace_row()),
        (TABLES_VIEW_ID, pg_tables_row()),
    ];
    for (id, row) in relations {
        catalog.insert_with_id(catalog.relations(), id, row, owner)?;
    }

    tracing::debug!(command_id = catalog.command_id(), "bootstrapped catalog");
    Ok(())
}
