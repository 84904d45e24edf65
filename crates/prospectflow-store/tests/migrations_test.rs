// Integration tests for the migration framework

use rusqlite::Connection;

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    let names = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap();
    names
}

#[test]
fn test_apply_migrations_on_empty_db() {
    // Given: An empty SQLite database
    let mut conn = setup_test_db();

    // When: Migrations are applied
    let result = prospectflow_store::migrations::apply_migrations(&mut conn);

    // Then: All migrations succeed and the collections exist
    assert!(
        result.is_ok(),
        "Migrations should succeed: {:?}",
        result.err()
    );
    let tables = get_table_names(&conn);
    for expected in ["schema_version", "prospects", "clients", "interactions"] {
        assert!(
            tables.contains(&expected.to_string()),
            "Missing table: {}",
            expected
        );
    }
}

#[test]
fn test_migration_idempotency() {
    let mut conn = setup_test_db();
    prospectflow_store::migrations::apply_migrations(&mut conn).unwrap();
    prospectflow_store::migrations::apply_migrations(&mut conn).unwrap();

    let applied = prospectflow_store::migrations::applied_migrations(&conn).unwrap();
    assert_eq!(applied, vec!["001_initial_schema".to_string()]);
}

#[test]
fn test_checksum_is_recorded() {
    let mut conn = setup_test_db();
    prospectflow_store::migrations::apply_migrations(&mut conn).unwrap();

    let checksum: String = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = '001_initial_schema'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(checksum.len(), 64);
}

#[test]
fn test_edited_migration_is_refused() {
    let mut conn = setup_test_db();
    prospectflow_store::migrations::apply_migrations(&mut conn).unwrap();

    // Simulate the embedded SQL having changed after it was applied
    conn.execute(
        "UPDATE schema_version SET checksum = 'deadbeef' WHERE migration_id = '001_initial_schema'",
        [],
    )
    .unwrap();

    let err = prospectflow_store::migrations::apply_migrations(&mut conn).unwrap_err();
    assert!(err.to_string().contains("Checksum mismatch"));
}

#[test]
fn test_unique_indexes_exist() {
    let mut conn = setup_test_db();
    prospectflow_store::migrations::apply_migrations(&mut conn).unwrap();

    let unique_indexes: Vec<String> = conn
        .prepare(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND sql LIKE 'CREATE UNIQUE%' ORDER BY name",
        )
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(
        unique_indexes,
        vec!["idx_clients_prospect_id", "idx_prospects_email"]
    );
}
