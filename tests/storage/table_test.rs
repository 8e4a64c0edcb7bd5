use std::fs;

use tinysql::{
    storage::table::Table,
    types::{PAGE_SIZE, error::DatabaseError, row::Row},
    utils::mock::TempDatabase,
};

fn create_user_row(id: i32) -> Row {
    Row::new(id, format!("user{}", id), format!("person{}@example.com", id))
}

#[test]
fn test_open_new_table() {
    let temp_db = TempDatabase::with_prefix("table_new");
    let mut table = temp_db.open_table().unwrap();
    assert_eq!(table.root_page_id(), 0);
    assert_eq!(table.page_count(), 1);
    assert!(table.select_all().unwrap().is_empty());
}

#[test]
fn test_select_all_is_ascending() {
    let temp_db = TempDatabase::with_prefix("table_ascending");
    let mut table = temp_db.open_table().unwrap();
    let keys: Vec<i32> = (0..200).map(|i| (i * 53) % 211).collect();
    for &key in &keys {
        table.insert(&create_user_row(key)).unwrap();
    }

    let ids: Vec<i32> = table.select_all().unwrap().iter().map(|row| row.id).collect();
    let mut expected = keys.clone();
    expected.sort();
    assert_eq!(ids, expected);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_find() {
    let temp_db = TempDatabase::with_prefix("table_find");
    let mut table = temp_db.open_table().unwrap();
    for key in 1..=30 {
        table.insert(&create_user_row(key)).unwrap();
    }
    assert_eq!(table.find(17).unwrap(), Some(create_user_row(17)));
    assert_eq!(table.find(31).unwrap(), None);
}

#[test]
fn test_duplicate_keeps_original_row() {
    let temp_db = TempDatabase::with_prefix("table_duplicate");
    let mut table = temp_db.open_table().unwrap();
    table.insert(&Row::new(1, "a", "b")).unwrap();
    let result = table.insert(&Row::new(1, "c", "d"));
    assert!(matches!(result, Err(DatabaseError::DuplicateKey { key: 1 })));
    assert_eq!(table.select_all().unwrap(), vec![Row::new(1, "a", "b")]);
}

#[test]
fn test_persistence_across_reopen() {
    let temp_db = TempDatabase::with_prefix("table_persist");
    let rows: Vec<Row> = (1..=50).rev().map(create_user_row).collect();
    {
        let mut table = temp_db.open_table().unwrap();
        for row in &rows {
            table.insert(row).unwrap();
        }
        table.close().unwrap();
    }
    let page_count = fs::metadata(&temp_db.path).unwrap().len() / PAGE_SIZE as u64;

    let mut table = temp_db.open_table().unwrap();
    assert_eq!(table.page_count() as u64, page_count);
    let expected: Vec<Row> = (1..=50).map(create_user_row).collect();
    assert_eq!(table.select_all().unwrap(), expected);

    table.insert(&create_user_row(51)).unwrap();
    assert_eq!(table.find(51).unwrap(), Some(create_user_row(51)));
}

#[test]
fn test_unflushed_changes_are_lost() {
    let temp_db = TempDatabase::with_prefix("table_unflushed");
    {
        let mut table = temp_db.open_table().unwrap();
        table.insert(&create_user_row(1)).unwrap();
    }
    let mut table = temp_db.open_table().unwrap();
    assert!(table.select_all().unwrap().is_empty());
}

#[test]
fn test_capacity_exhaustion_is_sticky() {
    let temp_db = TempDatabase::with_prefix("table_capacity");
    let mut table = temp_db.open_table_with_max_pages(4).unwrap();

    let mut inserted = Vec::new();
    let mut first_failure = None;
    for key in 1..=100 {
        match table.insert(&create_user_row(key)) {
            Ok(()) => inserted.push(key),
            Err(DatabaseError::CapacityExceeded { max_pages: 4 }) => {
                first_failure = Some(key);
                break;
            }
            Err(err) => panic!("unexpected error: {}", err),
        }
    }

    // Sequential leaves settle at 7 rows; three leaves fill to 7 + 7 + 13.
    assert_eq!(first_failure, Some(28));
    assert!(table.is_capacity_exhausted());
    assert_eq!(table.page_count(), 4);

    // A key that would fit in a half-empty leaf is still refused.
    table.insert(&Row::new(0, "x", "y")).unwrap_err();
    assert!(matches!(
        table.insert(&create_user_row(1000)),
        Err(DatabaseError::CapacityExceeded { .. })
    ));

    let ids: Vec<i32> = table.select_all().unwrap().iter().map(|row| row.id).collect();
    assert_eq!(ids, inserted);
}
