#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlannerError {
    #[error("Syntax error. Could not parse statement.")]
    Syntax,
    #[error("Could not parse int argument")]
    ParseInt(String),
    #[error("String is too long")]
    StringTooLong { column: &'static str, length: usize, max: usize },
    #[error("Unrecognized command")]
    UnrecognizedCommand(String),
}
