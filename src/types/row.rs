use std::fmt;

use crate::types::{
    EMAIL_OFFSET, EMAIL_SIZE, ID_OFFSET, ID_SIZE, Key, ROW_SIZE, USERNAME_OFFSET, USERNAME_SIZE,
    error::DatabaseError,
};

/*
 * Row Layout (fixed width, 291 bytes)
 * ┌────────────┬──────────────────────────┬─────────────────────────────┐
 * │  id (4 LE) │ username (32, NUL pad)   │ email (255, NUL pad)        │
 * └────────────┴──────────────────────────┴─────────────────────────────┘
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: Key,
    pub username: String,
    pub email: String,
}

impl Row {
    pub fn new(id: Key, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
        }
    }

    pub fn to_bytes(&self) -> Result<[u8; ROW_SIZE], DatabaseError> {
        let mut buffer = [0u8; ROW_SIZE];
        buffer[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&self.id.to_le_bytes());
        write_text(&mut buffer[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE], &self.username, "username")?;
        write_text(&mut buffer[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE], &self.email, "email")?;
        Ok(buffer)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DatabaseError> {
        if bytes.len() != ROW_SIZE {
            return Err(DatabaseError::SerializationError {
                details: format!("Expected {} row bytes, got {}", ROW_SIZE, bytes.len()),
            });
        }

        let id = Key::from_le_bytes([
            bytes[ID_OFFSET],
            bytes[ID_OFFSET + 1],
            bytes[ID_OFFSET + 2],
            bytes[ID_OFFSET + 3],
        ]);
        let username = read_text(&bytes[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE], "username")?;
        let email = read_text(&bytes[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE], "email")?;

        Ok(Row { id, username, email })
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}

fn write_text(field: &mut [u8], text: &str, name: &str) -> Result<(), DatabaseError> {
    let bytes = text.as_bytes();
    if bytes.len() > field.len() {
        return Err(DatabaseError::SerializationError {
            details: format!("{} is {} bytes, column holds {}", name, bytes.len(), field.len()),
        });
    }
    if bytes.contains(&0) {
        return Err(DatabaseError::SerializationError {
            details: format!("{} contains a NUL byte", name),
        });
    }
    field[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}

fn read_text(field: &[u8], name: &str) -> Result<String, DatabaseError> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8(field[..end].to_vec()).map_err(|e| DatabaseError::SerializationError {
        details: format!("{} is not valid UTF-8: {}", name, e),
    })
}
