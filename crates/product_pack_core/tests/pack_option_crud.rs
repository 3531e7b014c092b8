use product_pack_core::db::migrations::latest_version;
use product_pack_core::db::open_db_in_memory;
use product_pack_core::{
    DiscountType, PackOption, PackOptionRepository, RepoError, ResourceError,
    SqlitePackOptionRepository,
};
use rusqlite::Connection;

#[test]
fn save_populates_id_and_keeps_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePackOptionRepository::try_new(&conn).unwrap();

    let mut input = PackOption::new(101, 6).with_discount(DiscountType::Percentage, 10.0);
    input.sort_order = 3;
    let saved = repo.save(&input).unwrap();

    assert!(saved.packoption_id.is_some());
    assert_eq!(
        PackOption {
            packoption_id: None,
            ..saved.clone()
        },
        input
    );
    assert_eq!(input.packoption_id, None);
}

#[test]
fn get_after_save_returns_equal_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePackOptionRepository::try_new(&conn).unwrap();

    let mut input = PackOption::new(7, 12).with_discount(DiscountType::Fixed, 2.5);
    input
        .extension_attributes
        .insert("label".to_string(), "Dozen".to_string());
    let saved = repo.save(&input).unwrap();

    let loaded = repo.get(saved.packoption_id.unwrap()).unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.extension_attributes.get("label").unwrap(), "Dozen");
}

#[test]
fn get_missing_id_fails_with_no_such_entity_naming_the_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePackOptionRepository::try_new(&conn).unwrap();

    let err = repo.get(4242).unwrap_err();
    assert!(matches!(err, RepoError::NoSuchEntity(4242)));
    assert_eq!(err.to_string(), "PackOption with id \"4242\" does not exist.");
}

#[test]
fn save_with_existing_id_updates_in_place() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePackOptionRepository::try_new(&conn).unwrap();

    let mut saved = repo.save(&PackOption::new(1, 2)).unwrap();
    saved.pack_size = 4;
    saved
        .extension_attributes
        .insert("badge".to_string(), "best value".to_string());
    let updated = repo.save(&saved).unwrap();
    assert_eq!(updated.packoption_id, saved.packoption_id);

    saved.extension_attributes.clear();
    repo.save(&saved).unwrap();

    let loaded = repo.get(saved.packoption_id.unwrap()).unwrap();
    assert_eq!(loaded.pack_size, 4);
    assert!(loaded.extension_attributes.is_empty());

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM pack_options;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn save_with_unknown_explicit_id_inserts_under_that_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePackOptionRepository::try_new(&conn).unwrap();

    let input = PackOption {
        packoption_id: Some(900),
        ..PackOption::new(5, 3)
    };
    let saved = repo.save(&input).unwrap();

    assert_eq!(saved.packoption_id, Some(900));
    assert_eq!(repo.get(900).unwrap().product_id, 5);
}

#[test]
fn validation_failure_becomes_could_not_save() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePackOptionRepository::try_new(&conn).unwrap();

    let err = repo.save(&PackOption::new(1, 0)).unwrap_err();
    match err {
        RepoError::CouldNotSave(message) => assert!(message.contains("pack_size")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn storage_failure_becomes_could_not_save_with_original_message() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER pack_options_read_only BEFORE INSERT ON pack_options
         BEGIN
            SELECT RAISE(ABORT, 'pack options are read-only');
         END;",
    )
    .unwrap();
    let repo = SqlitePackOptionRepository::try_new(&conn).unwrap();

    let err = repo.save(&PackOption::new(1, 2)).unwrap_err();
    assert!(matches!(err, RepoError::CouldNotSave(_)));
    assert_eq!(
        err.to_string(),
        "could not save the pack option: pack options are read-only"
    );
}

#[test]
fn failed_save_leaves_no_partial_extension_attributes() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_blocked_code BEFORE INSERT ON pack_option_extension_attributes
         WHEN NEW.code = 'blocked'
         BEGIN
            SELECT RAISE(ABORT, 'blocked attribute');
         END;",
    )
    .unwrap();
    let repo = SqlitePackOptionRepository::try_new(&conn).unwrap();

    let mut input = PackOption::new(1, 2);
    input
        .extension_attributes
        .insert("blocked".to_string(), "x".to_string());
    assert!(matches!(
        repo.save(&input),
        Err(RepoError::CouldNotSave(_))
    ));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM pack_options;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn save_inside_caller_transaction_is_visible_after_commit() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePackOptionRepository::try_new(&conn).unwrap();

    conn.execute_batch("BEGIN;").unwrap();
    let mut input = PackOption::new(1, 2);
    input
        .extension_attributes
        .insert("label".to_string(), "Pair".to_string());
    let saved = repo.save(&input).unwrap();
    assert!(!conn.is_autocommit());
    conn.execute_batch("COMMIT;").unwrap();

    let loaded = repo.get(saved.packoption_id.unwrap()).unwrap();
    assert_eq!(loaded, saved);
}

#[test]
fn failed_save_inside_caller_transaction_keeps_earlier_work() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_blocked_code BEFORE INSERT ON pack_option_extension_attributes
         WHEN NEW.code = 'blocked'
         BEGIN
            SELECT RAISE(ABORT, 'blocked attribute');
         END;",
    )
    .unwrap();
    let repo = SqlitePackOptionRepository::try_new(&conn).unwrap();

    conn.execute_batch("BEGIN;").unwrap();
    let kept = repo.save(&PackOption::new(1, 2)).unwrap();
    let mut rejected = PackOption::new(1, 6);
    rejected
        .extension_attributes
        .insert("blocked".to_string(), "x".to_string());
    assert!(matches!(
        repo.save(&rejected),
        Err(RepoError::CouldNotSave(_))
    ));
    assert!(!conn.is_autocommit());
    conn.execute_batch("COMMIT;").unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM pack_options;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
    assert!(repo.get(kept.packoption_id.unwrap()).is_ok());
}

#[test]
fn delete_then_get_fails_with_no_such_entity() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePackOptionRepository::try_new(&conn).unwrap();

    let mut input = PackOption::new(3, 2);
    input
        .extension_attributes
        .insert("label".to_string(), "Twin".to_string());
    let saved = repo.save(&input).unwrap();
    let id = saved.packoption_id.unwrap();

    assert!(repo.delete(&saved).unwrap());
    assert!(matches!(repo.get(id), Err(RepoError::NoSuchEntity(missing)) if missing == id));

    let orphaned: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pack_option_extension_attributes WHERE packoption_id = ?1;",
            [id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphaned, 0);
}

#[test]
fn delete_reloads_by_id_and_ignores_stale_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePackOptionRepository::try_new(&conn).unwrap();

    let saved = repo.save(&PackOption::new(3, 2)).unwrap();
    let stale = PackOption {
        product_id: 999,
        pack_size: 0,
        ..saved.clone()
    };

    assert!(repo.delete(&stale).unwrap());
    assert!(repo.get(saved.packoption_id.unwrap()).is_err());
}

#[test]
fn delete_of_unsaved_or_missing_record_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePackOptionRepository::try_new(&conn).unwrap();
    let kept = repo.save(&PackOption::new(3, 2)).unwrap();

    assert!(repo.delete(&PackOption::new(3, 2)).unwrap());
    let ghost = PackOption {
        packoption_id: Some(777),
        ..PackOption::new(3, 2)
    };
    assert!(repo.delete(&ghost).unwrap());

    assert!(repo.get(kept.packoption_id.unwrap()).is_ok());
}

#[test]
fn storage_failure_becomes_could_not_delete_with_original_message() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePackOptionRepository::try_new(&conn).unwrap();
    let saved = repo.save(&PackOption::new(1, 2)).unwrap();

    conn.execute_batch(
        "CREATE TRIGGER pack_options_locked BEFORE DELETE ON pack_options
         BEGIN
            SELECT RAISE(ABORT, 'pack option is locked');
         END;",
    )
    .unwrap();

    let err = repo.delete(&saved).unwrap_err();
    assert!(matches!(err, RepoError::CouldNotDelete(_)));
    assert_eq!(
        err.to_string(),
        "could not delete the pack option: pack option is locked"
    );
}

#[test]
fn reload_failure_during_delete_becomes_could_not_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePackOptionRepository::try_new(&conn).unwrap();
    let saved = repo.save(&PackOption::new(1, 2)).unwrap();
    let id = saved.packoption_id.unwrap();

    conn.execute_batch(&format!(
        "PRAGMA ignore_check_constraints = ON;
         UPDATE pack_options SET discount_type = 'bogus' WHERE packoption_id = {id};
         PRAGMA ignore_check_constraints = OFF;"
    ))
    .unwrap();

    let err = repo.delete(&saved).unwrap_err();
    match err {
        RepoError::CouldNotDelete(message) => {
            assert!(message.contains("invalid persisted pack option data"));
            assert!(message.contains("bogus"));
        }
        other => panic!("unexpected error: {other}"),
    }

    let still_there: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pack_options WHERE packoption_id = ?1;",
            [id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(still_there, 1);
}

#[test]
fn delete_by_id_removes_existing_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePackOptionRepository::try_new(&conn).unwrap();
    let saved = repo.save(&PackOption::new(1, 2)).unwrap();
    let id = saved.packoption_id.unwrap();

    assert!(repo.delete_by_id(id).unwrap());
    assert!(matches!(repo.get(id), Err(RepoError::NoSuchEntity(_))));
}

#[test]
fn delete_by_missing_id_fails_with_no_such_entity_not_could_not_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePackOptionRepository::try_new(&conn).unwrap();

    let err = repo.delete_by_id(31337).unwrap_err();
    assert!(matches!(err, RepoError::NoSuchEntity(31337)));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqlitePackOptionRepository::try_new(&conn) {
        Err(RepoError::Resource(ResourceError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        })) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqlitePackOptionRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::Resource(ResourceError::MissingRequiredTable(
            "pack_options"
        )))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE pack_options (
            packoption_id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL,
            pack_size INTEGER NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqlitePackOptionRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::Resource(ResourceError::MissingRequiredColumn {
            table: "pack_options",
            column: "discount_type"
        }))
    ));
}
