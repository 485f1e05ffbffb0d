//! The share point store contract.
//!
//! Stores are used through `dyn`-compatible traits returning boxed futures so
//! the display state, the server and the CLI can swap implementations freely.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::record::{Comment, NewSharePoint, SharePoint};
use crate::validate::ValidationError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Store unreachable or the request timed out.
    Network(String),
    /// Payload rejected, locally or by the remote store.
    Validation(String),
    NotFound(String),
    Forbidden(String),
    Remote { status: u16, message: String },
    /// Response body was not a valid record.
    Decode(String),
    /// The backing storage failed.
    Storage(String),
}

impl StoreError {
    pub fn is_network(&self) -> bool {
        matches!(self, StoreError::Network(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Network(msg) => write!(f, "store unreachable: {msg}"),
            StoreError::Validation(msg) => write!(f, "rejected payload: {msg}"),
            StoreError::NotFound(what) => write!(f, "not found: {what}"),
            StoreError::Forbidden(msg) => write!(f, "forbidden: {msg}"),
            StoreError::Remote { status, message } => {
                write!(f, "store returned {status}: {message}")
            }
            StoreError::Decode(msg) => write!(f, "invalid store response: {msg}"),
            StoreError::Storage(msg) => write!(f, "storage failure: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<ValidationError> for StoreError {
    fn from(e: ValidationError) -> Self {
        StoreError::Validation(e.to_string())
    }
}

/// Persistence for share points and their comment threads.
pub trait SharePointStore: Send + Sync {
    /// The full current list; the unit of consistency for readers.
    fn list(&self) -> BoxFuture<'_, Result<Vec<SharePoint>, StoreError>>;

    /// Store a new point and return the record with its assigned id.
    fn create(&self, point: NewSharePoint) -> BoxFuture<'_, Result<SharePoint, StoreError>>;

    /// Append a comment and return the full updated record.
    fn add_comment<'a>(
        &'a self,
        id: &'a str,
        comment: Comment,
    ) -> BoxFuture<'a, Result<SharePoint, StoreError>>;

    /// Delete a point. Returns the store's `success` flag; a wrong password is
    /// [`StoreError::Forbidden`].
    fn delete<'a>(
        &'a self,
        id: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<bool, StoreError>>;
}

impl<T: SharePointStore + ?Sized> SharePointStore for Arc<T> {
    fn list(&self) -> BoxFuture<'_, Result<Vec<SharePoint>, StoreError>> {
        (**self).list()
    }

    fn create(&self, point: NewSharePoint) -> BoxFuture<'_, Result<SharePoint, StoreError>> {
        (**self).create(point)
    }

    fn add_comment<'a>(
        &'a self,
        id: &'a str,
        comment: Comment,
    ) -> BoxFuture<'a, Result<SharePoint, StoreError>> {
        (**self).add_comment(id, comment)
    }

    fn delete<'a>(
        &'a self,
        id: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<bool, StoreError>> {
        (**self).delete(id, password)
    }
}

/// An image file about to be uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Build an upload from a file name, deriving the content type from its
    /// extension. Non-image names are rejected.
    pub fn from_file_name(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, ValidationError> {
        let file_name = file_name.into();
        let content_type = crate::upload::extension_of(&file_name)
            .and_then(|ext| crate::upload::content_type_for_extension(&ext))
            .ok_or_else(|| ValidationError::UnsupportedFile {
                file: file_name.clone(),
            })?;
        Ok(Self {
            file_name,
            content_type: content_type.to_string(),
            bytes,
        })
    }

    pub fn check(&self) -> Result<(), ValidationError> {
        crate::upload::check_file(&self.file_name, Some(&self.content_type), self.bytes.len())
            .map(|_| ())
    }
}

/// Image storage returning public URLs in upload order.
pub trait ImageUploader: Send + Sync {
    fn upload(&self, files: Vec<ImageUpload>) -> BoxFuture<'_, Result<Vec<String>, StoreError>>;
}

#[cfg(test)]
mod tests {
    use super::{ImageUpload, StoreError};
    use crate::validate::ValidationError;

    #[test]
    fn classifies_errors() {
        assert!(StoreError::Network("timeout".into()).is_network());
        assert!(!StoreError::Network("timeout".into()).is_validation());
        let e: StoreError = ValidationError::Empty("name").into();
        assert!(e.is_validation());
        assert_eq!(e.to_string(), "rejected payload: name is required");
        assert!(!StoreError::NotFound("x".into()).is_network());
    }

    #[test]
    fn uploads_derive_content_type() {
        let up = ImageUpload::from_file_name("shot.JPG", vec![1, 2, 3]).unwrap();
        assert_eq!(up.content_type, "image/jpeg");
        assert!(up.check().is_ok());
        assert!(ImageUpload::from_file_name("notes.txt", Vec::new()).is_err());
    }
}
