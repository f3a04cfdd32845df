// Copyright 2023 Remi Bernotavicius

use crate::validation::ValidationError;
use diesel::prelude::Connection as _;
use diesel::RunQueryDsl as _;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::path::Path;

pub mod models;
pub mod query;
pub mod schema;

pub type Connection = diesel::sqlite::SqliteConnection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Query(#[from] diesel::result::Error),
    #[error(transparent)]
    Connection(#[from] diesel::ConnectionError),
    #[error("failed to run migrations: {0}")]
    Migration(Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no {entity} with id {id}")]
    NotFound { entity: &'static str, id: i32 },
    #[error("{entity} is missing {field}")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },
    #[error("ingredient {name:?} has to be saved before it can be used")]
    UnsavedIngredient { name: String },
    #[error("bad value {value:?} stored in {column}: {reason}")]
    Malformed {
        column: &'static str,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Opens the database at the given path (or `:memory:`), creating it if needed, and brings its
/// schema up to date.
pub fn establish_connection(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let mut connection = Connection::establish(&path.to_string_lossy())?;

    // Must happen outside of a transaction, so before the migrations run.
    diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut connection)?;

    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(Error::Migration)?;
    for version in &applied {
        log::info!("applied migration {version}");
    }
    log::debug!("opened recipe book at {}", path.display());
    Ok(connection)
}

#[test]
fn migrations() {
    let mut connection = establish_connection(":memory:").unwrap();
    assert!(connection.has_pending_migration(MIGRATIONS).is_ok_and(|p| !p));

    connection.revert_all_migrations(MIGRATIONS).unwrap();
    assert!(connection.has_pending_migration(MIGRATIONS).unwrap());

    connection.run_pending_migrations(MIGRATIONS).unwrap();
    assert!(!connection.has_pending_migration(MIGRATIONS).unwrap());
}
