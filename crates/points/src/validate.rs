use crate::record::{Comment, NewSharePoint, SharePoint};

pub const MAX_NAME_CHARS: usize = 50;
pub const MAX_DESC_CHARS: usize = 2000;
pub const MAX_USERNAME_CHARS: usize = 50;
pub const MAX_CONTENTS_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Malformed(String),
    Empty(&'static str),
    TooLong { field: &'static str, max: usize },
    Coordinate(String),
    NoFiles,
    TooManyFiles { max: usize },
    FileTooLarge { file: String, max: usize },
    UnsupportedFile { file: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Malformed(msg) => write!(f, "malformed payload: {msg}"),
            ValidationError::Empty(field) => write!(f, "{field} is required"),
            ValidationError::TooLong { field, max } => {
                write!(f, "{field} exceeds {max} characters")
            }
            ValidationError::Coordinate(msg) => write!(f, "invalid location: {msg}"),
            ValidationError::NoFiles => write!(f, "no files uploaded"),
            ValidationError::TooManyFiles { max } => write!(f, "at most {max} files per upload"),
            ValidationError::FileTooLarge { file, max } => {
                write!(f, "{file} exceeds {max} bytes")
            }
            ValidationError::UnsupportedFile { file } => {
                write!(f, "{file}: only image uploads are allowed")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

fn required_text(
    value: &str,
    field: &'static str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    optional_text(trimmed, field, max)
}

fn optional_text(value: &str, field: &'static str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_string())
}

impl NewSharePoint {
    /// Check and normalize (trim) a creation payload.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.position()
            .map_err(|e| ValidationError::Coordinate(e.to_string()))?;
        self.name = required_text(&self.name, "name", MAX_NAME_CHARS)?;
        self.desc = optional_text(&self.desc, "desc", MAX_DESC_CHARS)?;
        Ok(self)
    }
}

impl Comment {
    /// Check and normalize (trim) a comment.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.username = required_text(&self.username, "username", MAX_USERNAME_CHARS)?;
        self.contents = required_text(&self.contents, "contents", MAX_CONTENTS_CHARS)?;
        Ok(self)
    }
}

/// Parse and validate a creation payload from raw JSON.
pub fn decode_new_point(body: &[u8]) -> Result<NewSharePoint, ValidationError> {
    let point: NewSharePoint =
        serde_json::from_slice(body).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    point.validated()
}

/// Parse and validate a comment from raw JSON.
pub fn decode_comment(body: &[u8]) -> Result<Comment, ValidationError> {
    let comment: Comment =
        serde_json::from_slice(body).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    comment.validated()
}

/// Check a record received from a store before it enters display state.
pub fn check_record(point: &SharePoint) -> Result<(), ValidationError> {
    point
        .position()
        .map_err(|e| ValidationError::Coordinate(e.to_string()))?;
    Ok(())
}
