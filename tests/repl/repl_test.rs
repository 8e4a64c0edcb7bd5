use std::path::Path;

use tinysql::{repl, storage::table::Table, utils::mock::TempDatabase};

/// Feed `commands` to a fresh session on `path` and return its output lines.
fn run_script(path: &Path, commands: &[&str]) -> Vec<String> {
    let mut input = commands.join("\n");
    input.push('\n');

    let table = Table::open(path).unwrap();
    let mut out = Vec::new();
    repl::run(table, input.as_bytes(), &mut out).unwrap();

    String::from_utf8(out)
        .unwrap()
        .split('\n')
        .map(str::to_string)
        .collect()
}

#[test]
fn test_insert_and_select() {
    let temp_db = TempDatabase::with_prefix("repl_insert");
    let output = run_script(
        &temp_db.path,
        &["insert 1 user1 person@example.com", "select", ".exit"],
    );
    assert_eq!(
        output,
        vec![
            "sqlite>Executed.",
            "sqlite>(1, user1, person@example.com)",
            "sqlite>",
        ]
    );
}

#[test]
fn test_select_on_empty_table_prints_nothing() {
    let temp_db = TempDatabase::with_prefix("repl_empty");
    let output = run_script(&temp_db.path, &["select", ".exit"]);
    assert_eq!(output, vec!["sqlite>sqlite>"]);
}

#[test]
fn test_maximum_length_strings() {
    let temp_db = TempDatabase::with_prefix("repl_long");
    let username = "a".repeat(32);
    let email = "a".repeat(255);
    let insert = format!("insert 1 {} {}", username, email);
    let output = run_script(&temp_db.path, &[&insert, "select", ".exit"]);
    assert_eq!(
        output,
        vec![
            "sqlite>Executed.".to_string(),
            format!("sqlite>(1, {}, {})", username, email),
            "sqlite>".to_string(),
        ]
    );
}

#[test]
fn test_too_long_strings() {
    let temp_db = TempDatabase::with_prefix("repl_too_long");
    let insert = format!("insert 1 {} {}", "a".repeat(33), "a".repeat(256));
    let output = run_script(&temp_db.path, &[&insert, "select", ".exit"]);
    assert_eq!(output, vec!["sqlite>String is too long", "sqlite>sqlite>"]);
}

#[test]
fn test_bad_id() {
    let temp_db = TempDatabase::with_prefix("repl_bad_id");
    let output = run_script(
        &temp_db.path,
        &["insert hello hello hello", "insert -1 hello hello", ".exit"],
    );
    assert_eq!(
        output,
        vec![
            "sqlite>Could not parse int argument",
            "sqlite>Could not parse int argument",
            "sqlite>",
        ]
    );
}

#[test]
fn test_syntax_errors() {
    let temp_db = TempDatabase::with_prefix("repl_syntax");
    let output = run_script(&temp_db.path, &["insert", "insert 1 a", "select *", ".exit"]);
    assert_eq!(
        output,
        vec![
            "sqlite>Syntax error. Could not parse statement.",
            "sqlite>Syntax error. Could not parse statement.",
            "sqlite>Syntax error. Could not parse statement.",
            "sqlite>",
        ]
    );
}

#[test]
fn test_unrecognized_commands() {
    let temp_db = TempDatabase::with_prefix("repl_unrecognized");
    let output = run_script(&temp_db.path, &[".tables", "update 1 a b", ".exit"]);
    assert_eq!(
        output,
        vec!["sqlite>Unrecognized command", "sqlite>Unrecognized command", "sqlite>"]
    );
}

#[test]
fn test_empty_lines_are_ignored() {
    let temp_db = TempDatabase::with_prefix("repl_blank");
    let output = run_script(&temp_db.path, &["", "   ", ".exit"]);
    assert_eq!(output, vec!["sqlite>sqlite>sqlite>"]);
}

#[test]
fn test_duplicate_id() {
    let temp_db = TempDatabase::with_prefix("repl_dup");
    let output = run_script(
        &temp_db.path,
        &["insert 1 a b", "insert 1 a b", "select", ".exit"],
    );
    assert_eq!(
        output,
        vec![
            "sqlite>Executed.",
            "sqlite>Could not insert. Error: Duplicate Key",
            "sqlite>(1, a, b)",
            "sqlite>",
        ]
    );
}

#[test]
fn test_btree_print() {
    let temp_db = TempDatabase::with_prefix("repl_btree");
    let output = run_script(
        &temp_db.path,
        &["insert 3 user3 person3@example.com", "insert 1 user1 person1@example.com", "insert 2 user2 person2@example.com", ".btree", ".exit"],
    );
    assert_eq!(
        output,
        vec![
            "sqlite>Executed.",
            "sqlite>Executed.",
            "sqlite>Executed.",
            "sqlite>Tree:",
            "leaf (size 3)",
            "  - 0 : 1",
            "  - 1 : 2",
            "  - 2 : 3",
            "sqlite>",
        ]
    );
}

#[test]
fn test_leaf_split_keeps_every_row() {
    let temp_db = TempDatabase::with_prefix("repl_split");
    let inserts: Vec<String> = (1..=14)
        .map(|i| format!("insert {} user{} person{}@example.com", i, i, i))
        .collect();
    let mut commands: Vec<&str> = inserts.iter().map(String::as_str).collect();
    commands.extend(["select", ".exit"]);

    let output = run_script(&temp_db.path, &commands);
    assert_eq!(output.len(), 14 + 14 + 1);
    assert!(output[..14].iter().all(|line| line == "sqlite>Executed."));
    assert_eq!(output[14], "sqlite>(1, user1, person1@example.com)");
    assert_eq!(output[27], "(14, user14, person14@example.com)");
    assert_eq!(output[28], "sqlite>");
}

#[test]
fn test_persistence_across_sessions() {
    let temp_db = TempDatabase::with_prefix("repl_persist");
    let first = run_script(
        &temp_db.path,
        &["insert 1 user1 person", "insert 2 user2 person", ".exit"],
    );
    assert_eq!(first, vec!["sqlite>Executed.", "sqlite>Executed.", "sqlite>"]);

    let second = run_script(&temp_db.path, &["select", ".exit"]);
    assert_eq!(
        second,
        vec!["sqlite>(1, user1, person)", "(2, user2, person)", "sqlite>"]
    );
}

#[test]
fn test_end_of_input_flushes_like_exit() {
    let temp_db = TempDatabase::with_prefix("repl_eof");
    let first = run_script(&temp_db.path, &["insert 5 five five@example.com"]);
    assert_eq!(first, vec!["sqlite>Executed.", "sqlite>"]);

    let second = run_script(&temp_db.path, &["select", ".exit"]);
    assert_eq!(second, vec!["sqlite>(5, five, five@example.com)", "sqlite>"]);
}

#[test]
fn test_table_full() {
    let temp_db = TempDatabase::with_prefix("repl_full");
    let inserts: Vec<String> = (1..=1402)
        .map(|i| format!("insert {} user{} person{}@example.com", i, i, i))
        .collect();
    let mut commands: Vec<&str> = inserts.iter().map(String::as_str).collect();
    commands.push(".exit");

    let output = run_script(&temp_db.path, &commands);
    assert_eq!(output.len(), 1403);
    assert_eq!(output[output.len() - 2], "sqlite>Could not insert into table");
    let executed = output.iter().filter(|line| *line == "sqlite>Executed.").count();
    assert_eq!(executed, 699);
    assert_eq!(output[699], "sqlite>Could not insert into table");
}
