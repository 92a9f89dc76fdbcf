use crate::errors::ValidationError;
use super::tags::parse_tags;

/// Accepted image kinds; checked against both MIME subtype and file extension.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["jpeg", "jpg", "png", "webp"];
pub const DEFAULT_MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// A file part as received from the client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Lowercased extension of `file_name`, if any.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Unvalidated upload form.
#[derive(Clone, Debug, Default)]
pub struct UploadInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Comma-separated.
    pub tags: Option<String>,
    pub resolution: Option<String>,
    pub file: Option<UploadFile>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedUpload {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub resolution: String,
    pub file: UploadFile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_file_bytes: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self { Self { max_file_bytes: DEFAULT_MAX_FILE_BYTES } }
}

impl UploadPolicy {
    pub fn new(max_file_bytes: usize) -> Self { Self { max_file_bytes } }

    /// Checks run in a fixed order: file presence, type, size, then the
    /// required text fields. The first failure wins.
    pub fn validate(&self, input: UploadInput) -> Result<ValidatedUpload, ValidationError> {
        let file = input.file.ok_or(ValidationError::MissingFile)?;
        check_type(&file)?;
        if file.bytes.len() > self.max_file_bytes {
            return Err(ValidationError::FileTooLarge { size: file.bytes.len(), max: self.max_file_bytes });
        }
        let title = required("title", input.title)?;
        let category = required("category", input.category)?;
        let resolution = required("resolution", input.resolution)?;
        let description = input.description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());

        Ok(ValidatedUpload {
            title,
            description,
            category,
            tags: parse_tags(input.tags.as_deref()),
            resolution,
            file,
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

fn check_type(file: &UploadFile) -> Result<(), ValidationError> {
    let mime = file.content_type.as_deref().unwrap_or("").trim().to_ascii_lowercase();
    let mime_ok = mime
        .strip_prefix("image/")
        .is_some_and(|sub| ALLOWED_IMAGE_TYPES.contains(&sub));
    if !mime_ok {
        let shown = if mime.is_empty() { "unknown".to_string() } else { mime };
        return Err(ValidationError::UnsupportedFileType(shown));
    }
    match file.extension() {
        Some(ext) if ALLOWED_IMAGE_TYPES.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(ValidationError::UnsupportedFileType(format!(".{ext}"))),
        None => Err(ValidationError::UnsupportedFileType(file.file_name.clone())),
    }
}
