use crate::{
    planner::{
        command::{Command, MetaCommand, Statement},
        error::PlannerError,
    },
    types::{EMAIL_SIZE, Key, USERNAME_SIZE, row::Row},
};

pub struct CommandParser;

impl CommandParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, line: &str) -> Result<Command, PlannerError> {
        let input = line.trim();
        if input.is_empty() {
            return Ok(Command::Empty);
        }
        if input.starts_with('.') {
            return self.parse_meta(input).map(Command::Meta);
        }
        self.parse_statement(input).map(Command::Statement)
    }

    fn parse_meta(&self, input: &str) -> Result<MetaCommand, PlannerError> {
        match input {
            ".exit" => Ok(MetaCommand::Exit),
            ".btree" => Ok(MetaCommand::BTree),
            _ => Err(PlannerError::UnrecognizedCommand(input.to_string())),
        }
    }

    fn parse_statement(&self, input: &str) -> Result<Statement, PlannerError> {
        let mut tokens = input.split_whitespace();
        let keyword = tokens.next().unwrap_or_default();

        if keyword.eq_ignore_ascii_case("insert") {
            return self.parse_insert(tokens.collect()).map(Statement::Insert);
        }
        if keyword.eq_ignore_ascii_case("select") {
            if tokens.next().is_some() {
                return Err(PlannerError::Syntax);
            }
            return Ok(Statement::Select);
        }
        Err(PlannerError::UnrecognizedCommand(input.to_string()))
    }

    /// `insert <id> <username> <email>`. A bad id is reported before the
    /// argument count so it wins regardless of the rest of the line.
    fn parse_insert(&self, args: Vec<&str>) -> Result<Row, PlannerError> {
        let id = args.first().ok_or(PlannerError::Syntax)?;
        let id = Self::parse_id(id)?;

        let [_, username, email] = args.as_slice() else {
            return Err(PlannerError::Syntax);
        };
        Self::check_length("username", username, USERNAME_SIZE)?;
        Self::check_length("email", email, EMAIL_SIZE)?;
        if username.contains('\0') || email.contains('\0') {
            return Err(PlannerError::Syntax);
        }

        Ok(Row::new(id, *username, *email))
    }

    fn parse_id(token: &str) -> Result<Key, PlannerError> {
        match token.parse::<Key>() {
            Ok(id) if id >= 0 => Ok(id),
            _ => Err(PlannerError::ParseInt(token.to_string())),
        }
    }

    fn check_length(column: &'static str, value: &str, max: usize) -> Result<(), PlannerError> {
        if value.len() > max {
            return Err(PlannerError::StringTooLong {
                column,
                length: value.len(),
                max,
            });
        }
        Ok(())
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}
