//! Uploaded file models

use std::fmt;

/// Slot an uploaded file fills in the deploy process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSlot {
    /// The MTA archive itself
    Archive,

    /// An extension descriptor (.mtaext)
    ExtensionDescriptor,
}

impl FileSlot {
    /// Process parameter that references a file in this slot
    pub fn parameter_id(self) -> &'static str {
        match self {
            FileSlot::Archive => "appArchiveId",
            FileSlot::ExtensionDescriptor => "mtaExtDescriptorId",
        }
    }
}

impl fmt::Display for FileSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSlot::Archive => f.write_str("application archive"),
            FileSlot::ExtensionDescriptor => f.write_str("extension descriptor"),
        }
    }
}

/// A file stored by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Backend assigned identifier
    pub id: String,
    pub file_name: String,
    pub digest: String,
    pub digest_algorithm: String,
}

impl UploadedFile {
    /// Whether this backend file has the given name and content digest
    pub fn matches(&self, file_name: &str, digest: &str) -> bool {
        self.file_name == file_name && self.digest.eq_ignore_ascii_case(digest)
    }
}

impl From<openapi_client::File> for UploadedFile {
    fn from(file: openapi_client::File) -> Self {
        Self {
            id: file.id,
            file_name: file.file_name,
            digest: file.digest,
            digest_algorithm: file.digest_algorithm,
        }
    }
}
