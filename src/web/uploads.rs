use std::{collections::HashMap, path::Path};

use axum::extract::Multipart;
use tokio::{fs::File, io::AsyncWriteExt};

/// Result type used by the shared upload helpers.
pub type UploadResult<T> = Result<T, UploadError>;

/// Error returned when parsing or persisting uploaded files.
#[derive(Debug)]
pub struct UploadError {
    message: String,
}

impl UploadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UploadError {}

/// How a stored upload is named relative to the listing that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileNaming {
    /// `img_<listing>_<original>`
    Image,
    /// `doc_<listing>_<original>`
    Brochure,
}

impl FileNaming {
    fn prefix(self) -> &'static str {
        match self {
            FileNaming::Image => "img",
            FileNaming::Brochure => "doc",
        }
    }

    /// Builds the flat-directory file name. The result never contains path separators.
    pub fn build_name(self, listing_name: &str, original_name: &str) -> String {
        let candidate = format!(
            "{}_{}_{}",
            self.prefix(),
            listing_name.trim().replace(' ', "_"),
            original_name
        );
        sanitize_filename::sanitize(candidate)
    }
}

/// A file part held in memory until the rest of the form has been read.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub field_name: String,
    pub original_name: String,
    pub bytes: Vec<u8>,
}

/// Text fields and non-empty file parts of a multipart submission.
#[derive(Debug, Default)]
pub struct FormSubmission {
    pub files: Vec<PendingFile>,
    pub text_fields: HashMap<String, Vec<String>>,
}

impl FormSubmission {
    pub fn file_for(&self, field_name: &str) -> Option<&PendingFile> {
        self.files.iter().find(|file| file.field_name == field_name)
    }

    pub fn first_text(&self, field_name: &str) -> Option<&str> {
        self.text_fields
            .get(field_name)
            .and_then(|values| values.first().map(|s| s.as_str()))
    }

    pub fn has_field(&self, field_name: &str) -> bool {
        self.text_fields.contains_key(field_name)
    }
}

/// Reads the whole multipart body. File inputs left empty by the browser are skipped.
pub async fn read_form_submission(mut multipart: Multipart) -> UploadResult<FormSubmission> {
    let mut submission = FormSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| UploadError::new(format!("failed to parse upload form: {err}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field
                .text()
                .await
                .map_err(|err| UploadError::new(format!("failed to read field `{field_name}`: {err}")))?;
            submission
                .text_fields
                .entry(field_name)
                .or_default()
                .push(value);
            continue;
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|err| UploadError::new(format!("failed to read upload data: {err}")))?;

        if file_name.trim().is_empty() && bytes.is_empty() {
            continue;
        }

        submission.files.push(PendingFile {
            field_name,
            original_name: file_name,
            bytes: bytes.to_vec(),
        });
    }

    Ok(submission)
}

/// Writes `file` into `dest_dir` and returns the stored name. Existing files are overwritten.
pub async fn store_upload(
    dest_dir: &Path,
    naming: FileNaming,
    listing_name: &str,
    file: &PendingFile,
) -> UploadResult<String> {
    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|err| UploadError::new(format!("failed to create upload directory: {err}")))?;

    let stored_name = naming.build_name(listing_name, &file.original_name);
    if stored_name.is_empty() {
        return Err(UploadError::new("upload has no usable file name"));
    }

    let stored_path = dest_dir.join(&stored_name);
    let mut handle = File::create(&stored_path)
        .await
        .map_err(|err| UploadError::new(format!("failed to save file: {err}")))?;
    handle
        .write_all(&file.bytes)
        .await
        .map_err(|err| UploadError::new(format!("failed to write file: {err}")))?;
    handle
        .flush()
        .await
        .map_err(|err| UploadError::new(format!("failed to flush file: {err}")))?;

    Ok(stored_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pending(field_name: &str, original_name: &str, body: &[u8]) -> PendingFile {
        PendingFile {
            field_name: field_name.to_string(),
            original_name: original_name.to_string(),
            bytes: body.to_vec(),
        }
    }

    #[test]
    fn naming_follows_listing_name() {
        assert_eq!(
            FileNaming::Image.build_name("Vanier Graduate", "cover.png"),
            "img_Vanier_Graduate_cover.png"
        );
        assert_eq!(
            FileNaming::Brochure.build_name("DAAD", "guide.pdf"),
            "doc_DAAD_guide.pdf"
        );
    }

    #[test]
    fn naming_strips_path_separators() {
        let name = FileNaming::Brochure.build_name("a/b", "../../etc/passwd");
        assert!(!name.contains('/'));
        assert!(name.starts_with("doc_"));
    }

    #[tokio::test]
    async fn store_upload_writes_bytes() {
        let dir = tempdir().expect("temp dir");
        let file = pending("image_file", "cover.png", b"\x89PNG");

        let stored = store_upload(dir.path(), FileNaming::Image, "Chevening", &file)
            .await
            .expect("store");

        assert_eq!(stored, "img_Chevening_cover.png");
        let written = tokio::fs::read(dir.path().join(&stored)).await.expect("read back");
        assert_eq!(written, b"\x89PNG");
    }

    #[test]
    fn submission_lookups() {
        let mut submission = FormSubmission::default();
        submission
            .text_fields
            .insert("name".to_string(), vec!["Fulbright".to_string()]);
        submission.files.push(pending("brochure_file", "info.pdf", b"%PDF"));

        assert_eq!(submission.first_text("name"), Some("Fulbright"));
        assert!(submission.has_field("name"));
        assert!(!submission.has_field("is_international_only"));
        assert!(submission.file_for("brochure_file").is_some());
        assert!(submission.file_for("image_file").is_none());
    }
}
