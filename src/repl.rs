//! Line-oriented front end: one command per input line, each response
//! printed right after the prompt it answers.

use std::io::{BufRead, Write};

use log::debug;

use crate::{
    executor::{self, ExecuteResult},
    planner::{
        command::{Command, MetaCommand},
        parser::CommandParser,
    },
    storage::table::Table,
    types::error::DatabaseError,
};

pub const PROMPT: &str = "sqlite>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Process one input line against `table`, writing the response to `out`.
///
/// Command failures are reported on `out` and never returned; the only
/// errors that escape are failures to write the response itself.
pub fn process_line<W: Write>(table: &mut Table, line: &str, out: &mut W) -> Result<Flow, DatabaseError> {
    let command = match CommandParser::new().parse(line) {
        Ok(command) => command,
        Err(err) => {
            writeln!(out, "{}", err)?;
            return Ok(Flow::Continue);
        }
    };

    match command {
        Command::Empty => {}
        Command::Meta(MetaCommand::Exit) => return Ok(Flow::Exit),
        Command::Meta(MetaCommand::BTree) => match table.debug_dump() {
            Ok(dump) => write!(out, "{}", dump)?,
            Err(err) => report(out, &err)?,
        },
        Command::Statement(statement) => match executor::execute(&statement, table) {
            Ok(ExecuteResult::Inserted) => writeln!(out, "Executed.")?,
            Ok(ExecuteResult::Rows(rows)) => {
                for row in rows {
                    match row {
                        Ok(row) => writeln!(out, "{}", row)?,
                        Err(err) => {
                            report(out, &err)?;
                            break;
                        }
                    }
                }
            }
            Err(err) => report(out, &err)?,
        },
    }

    Ok(Flow::Continue)
}

fn report<W: Write>(out: &mut W, err: &DatabaseError) -> Result<(), DatabaseError> {
    match err {
        DatabaseError::DuplicateKey { .. } | DatabaseError::CapacityExceeded { .. } => {
            writeln!(out, "{}", err)?
        }
        _ => writeln!(out, "Error: {}", err)?,
    }
    Ok(())
}

/// Drive the prompt loop until `.exit` or end of input, then flush the table.
pub fn run<R: BufRead, W: Write>(mut table: Table, mut input: R, out: &mut W) -> Result<(), DatabaseError> {
    let mut line = String::new();
    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            debug!("End of input");
            break;
        }
        if process_line(&mut table, &line, out)? == Flow::Exit {
            break;
        }
    }
    out.flush()?;
    table.close()
}
