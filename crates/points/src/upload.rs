//! Image upload rules shared by the service and its clients.

use crate::validate::ValidationError;

pub const MAX_FILES: usize = 10;
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;
pub const FIELD_NAME: &str = "files";
pub const PUBLIC_PREFIX: &str = "/uploads";

const ALLOWED: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

/// Lower-cased extension of `file_name`, if any.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn content_type_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.to_ascii_lowercase();
    ALLOWED
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

fn mime_allowed(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED.iter().any(|(_, mime)| *mime == essence)
}

pub fn check_file_count(count: usize) -> Result<(), ValidationError> {
    match count {
        0 => Err(ValidationError::NoFiles),
        n if n > MAX_FILES => Err(ValidationError::TooManyFiles { max: MAX_FILES }),
        _ => Ok(()),
    }
}

/// Check one file and return the extension it will be stored under.
///
/// Both the extension and the declared content type must name an image.
pub fn check_file(
    file_name: &str,
    content_type: Option<&str>,
    len: usize,
) -> Result<String, ValidationError> {
    let unsupported = || ValidationError::UnsupportedFile {
        file: file_name.to_string(),
    };
    let ext = extension_of(file_name)
        .filter(|e| content_type_for_extension(e).is_some())
        .ok_or_else(unsupported)?;
    if !content_type.is_some_and(mime_allowed) {
        return Err(unsupported());
    }
    if len > MAX_FILE_BYTES {
        return Err(ValidationError::FileTooLarge {
            file: file_name.to_string(),
            max: MAX_FILE_BYTES,
        });
    }
    Ok(ext)
}

/// Fresh collision-free file name for a stored upload.
pub fn stored_name(ext: &str) -> String {
    format!("{}.{}", uuid::Uuid::new_v4(), ext)
}

pub fn public_url(stored_name: &str) -> String {
    format!("{PUBLIC_PREFIX}/{stored_name}")
}
