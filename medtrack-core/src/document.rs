//! Document references, owned by a device
//!
//! Only the path is stored; file content never passes through medtrack.

use chrono::{DateTime, Utc};

use crate::choices::DocumentType;
use crate::RecordId;

pub const TITLE_MAX: usize = 200;
pub const FILE_PATH_MAX: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDocument {
    pub id: RecordId,
    pub device: RecordId,
    pub document_type: DocumentType,
    pub title: String,
    pub file_path: String,
    /// Set once at insert
    pub upload_date: DateTime<Utc>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentDraft {
    pub device: RecordId,
    pub document_type: DocumentType,
    pub title: String,
    pub file_path: String,
    pub description: String,
}

impl DeviceDocument {
    pub fn from_draft(id: RecordId, draft: DocumentDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            device: draft.device,
            document_type: draft.document_type,
            title: draft.title,
            file_path: draft.file_path,
            upload_date: now,
            description: draft.description,
        }
    }

    pub fn to_draft(&self) -> DocumentDraft {
        DocumentDraft {
            device: self.device,
            document_type: self.document_type,
            title: self.title.clone(),
            file_path: self.file_path.clone(),
            description: self.description.clone(),
        }
    }
}
