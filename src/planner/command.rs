use crate::types::row::Row;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    BTree,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

/// One parsed line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Meta(MetaCommand),
    Statement(Statement),
}
