//! Document payloads and representation

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use medtrack_core::document::{FILE_PATH_MAX, TITLE_MAX};
use medtrack_core::{DeviceDocument, DocumentDraft, DocumentType, FieldErrors, RecordId};

use super::device::required;
use super::payload::{FieldReader, WriteMode};

#[derive(Debug, Default)]
pub struct DocumentChanges {
    pub device: Option<RecordId>,
    pub document_type: Option<DocumentType>,
    pub title: Option<String>,
    pub file_path: Option<String>,
    pub description: Option<String>,
}

impl DocumentChanges {
    pub fn read(body: &Map<String, Value>, mode: WriteMode) -> Result<Self, FieldErrors> {
        let mut reader = FieldReader::new(body, mode);
        reader.reject_read_only(&["upload_date"]);

        let changes = Self {
            device: reader.reference("device"),
            document_type: reader.choice("document_type", true),
            title: reader.text("title", Some(TITLE_MAX)),
            file_path: reader.text("file_path", Some(FILE_PATH_MAX)),
            description: reader.blank_text("description", None),
        };

        reader.finish()?;
        Ok(changes)
    }

    pub fn into_new_draft(self) -> Result<DocumentDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let device = required(&mut errors, "device", self.device);
        let document_type = required(&mut errors, "document_type", self.document_type);
        let title = required(&mut errors, "title", self.title);
        let file_path = required(&mut errors, "file_path", self.file_path);

        match (device, document_type, title, file_path) {
            (Some(device), Some(document_type), Some(title), Some(file_path)) => {
                Ok(DocumentDraft {
                    device,
                    document_type,
                    title,
                    file_path,
                    description: self.description.unwrap_or_default(),
                })
            }
            _ => Err(errors),
        }
    }

    pub fn apply(self, draft: &mut DocumentDraft) {
        if let Some(v) = self.device {
            draft.device = v;
        }
        if let Some(v) = self.document_type {
            draft.document_type = v;
        }
        if let Some(v) = self.title {
            draft.title = v;
        }
        if let Some(v) = self.file_path {
            draft.file_path = v;
        }
        if let Some(v) = self.description {
            draft.description = v;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentResponse {
    pub id: RecordId,
    pub device: RecordId,
    pub document_type: DocumentType,
    pub title: String,
    pub file_path: String,
    pub upload_date: DateTime<Utc>,
    pub description: String,
}

impl From<DeviceDocument> for DocumentResponse {
    fn from(d: DeviceDocument) -> Self {
        Self {
            id: d.id,
            device: d.device,
            document_type: d.document_type,
            title: d.title,
            file_path: d.file_path,
            upload_date: d.upload_date,
            description: d.description,
        }
    }
}
