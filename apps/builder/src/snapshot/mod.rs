//! Local Snapshot Store — persists the draft document through a [`StoragePort`].
//!
//! # Stored shape
//! One key (`resumeData`) holding a JSON envelope:
//! ```text
//! { "schemaVersion": 1, "savedAt": "2026-01-01T00:00:00Z", "document": { ...ResumeDocument... } }
//! ```
//!
//! # Version policy
//! - `schemaVersion == SCHEMA_VERSION` → read `document`, missing fields take defaults.
//! - no `schemaVersion`, value looks like a bare document → legacy snapshot, upgraded
//!   the same way.
//! - newer `schemaVersion` → rejected; the session starts from an empty draft.
//! - anything else → malformed.
//!
//! `load` never fails: every problem is logged and reported as "no snapshot".

pub mod storage;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::resume::ResumeDocument;

pub use storage::{FileStorage, MemoryStorage, StoragePort};

/// Fixed namespace key the draft is stored under.
pub const SNAPSHOT_KEY: &str = "resumeData";
/// Current envelope version written by `save`.
pub const SCHEMA_VERSION: u32 = 1;

const LEGACY_KEYS: &[&str] = &["personalInfo", "experience", "education", "skills"];

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("malformed snapshot: {0}")]
    Malformed(String),

    #[error("snapshot schema version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u64, supported: u32 },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeOut<'a> {
    schema_version: u32,
    saved_at: DateTime<Utc>,
    document: &'a ResumeDocument,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeIn {
    document: ResumeDocument,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
}

pub struct SnapshotStore {
    storage: Box<dyn StoragePort>,
}

impl SnapshotStore {
    pub fn new(storage: Box<dyn StoragePort>) -> Self {
        Self { storage }
    }

    /// Serializes the document under [`SNAPSHOT_KEY`], replacing any prior value.
    pub fn save(&self, doc: &ResumeDocument) -> Result<(), SnapshotError> {
        let envelope = EnvelopeOut {
            schema_version: SCHEMA_VERSION,
            saved_at: Utc::now(),
            document: doc,
        };
        let encoded = serde_json::to_string(&envelope)?;
        self.storage.set(SNAPSHOT_KEY, &encoded)?;
        info!(
            key = SNAPSHOT_KEY,
            bytes = encoded.len(),
            experience = doc.experience.len(),
            education = doc.education.len(),
            skills = doc.skills.len(),
            "Saved resume snapshot"
        );
        Ok(())
    }

    /// Reads the saved draft. Missing, malformed or unsupported snapshots yield `None`.
    pub fn load(&self) -> Option<ResumeDocument> {
        match self.try_load() {
            Ok(doc) => doc,
            Err(e) => {
                warn!(key = SNAPSHOT_KEY, error = %e, "Discarding unreadable resume snapshot");
                None
            }
        }
    }

    /// Like [`SnapshotStore::load`] but surfaces the reason a snapshot was rejected.
    pub fn try_load(&self) -> Result<Option<ResumeDocument>, SnapshotError> {
        let Some(raw) = self.storage.get(SNAPSHOT_KEY)? else {
            debug!(key = SNAPSHOT_KEY, "No saved resume snapshot");
            return Ok(None);
        };
        let mut doc = decode(&raw)?;
        if doc.ensure_list_floor() {
            debug!("Padded empty lists in loaded snapshot");
        }
        Ok(Some(doc))
    }
}

/// Decodes a stored value according to the version policy.
fn decode(raw: &str) -> Result<ResumeDocument, SnapshotError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| SnapshotError::Malformed(e.to_string()))?;
    let Some(object) = value.as_object() else {
        return Err(SnapshotError::Malformed("expected a JSON object".to_string()));
    };

    match object.get("schemaVersion") {
        Some(version) => {
            let found = version.as_u64().ok_or_else(|| {
                SnapshotError::Malformed(format!("invalid schemaVersion {version}"))
            })?;
            if found > u64::from(SCHEMA_VERSION) {
                return Err(SnapshotError::UnsupportedVersion {
                    found,
                    supported: SCHEMA_VERSION,
                });
            }
            if found < u64::from(SCHEMA_VERSION) {
                return Err(SnapshotError::Malformed(format!(
                    "unknown schemaVersion {found}"
                )));
            }
            let envelope: EnvelopeIn = serde_json::from_value(value.clone())
                .map_err(|e| SnapshotError::Malformed(e.to_string()))?;
            if let Some(saved_at) = envelope.saved_at {
                debug!(%saved_at, "Loaded versioned snapshot");
            }
            Ok(envelope.document)
        }
        None if LEGACY_KEYS.iter().any(|k| object.contains_key(*k)) => {
            let doc: ResumeDocument = serde_json::from_value(value.clone())
                .map_err(|e| SnapshotError::Malformed(e.to_string()))?;
            info!("Upgraded unversioned resume snapshot");
            Ok(doc)
        }
        None => Err(SnapshotError::Malformed(
            "no schemaVersion and no resume fields".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{EducationEntry, ExperienceEntry, PersonalInfo};

    fn sample_document() -> ResumeDocument {
        ResumeDocument {
            personal_info: PersonalInfo {
                full_name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                phone: "555-123-4567".to_string(),
                location: "Lisbon".to_string(),
                summary: "Engineer.".to_string(),
            },
            experience: vec![
                ExperienceEntry {
                    company: "Acme".to_string(),
                    position: "Engineer".to_string(),
                    start_date: "2019".to_string(),
                    end_date: "Present".to_string(),
                    description: "Billing.".to_string(),
                },
                ExperienceEntry::default(),
            ],
            education: vec![EducationEntry {
                institution: "IST".to_string(),
                degree: "BSc".to_string(),
                field_of_study: "CS".to_string(),
                graduation_year: "2018".to_string(),
            }],
            skills: vec!["Rust".to_string(), String::new()],
        }
    }

    fn store_with(raw: &str) -> SnapshotStore {
        SnapshotStore::new(Box::new(MemoryStorage::with_entry(SNAPSHOT_KEY, raw)))
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let store = SnapshotStore::new(Box::new(MemoryStorage::new()));
        let doc = sample_document();
        store.save(&doc).unwrap();
        assert_eq!(store.load(), Some(doc));
    }

    #[test]
    fn test_round_trip_pads_empty_lists() {
        let store = SnapshotStore::new(Box::new(MemoryStorage::new()));
        let mut doc = sample_document();
        doc.experience.clear();
        doc.skills.clear();
        store.save(&doc).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.experience, vec![ExperienceEntry::default()]);
        assert_eq!(loaded.skills, vec![String::new()]);
        assert_eq!(loaded.education, doc.education);
        assert_eq!(loaded.personal_info, doc.personal_info);
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let store = SnapshotStore::new(Box::new(MemoryStorage::new()));
        store.save(&sample_document()).unwrap();
        let blank = ResumeDocument::default();
        store.save(&blank).unwrap();
        assert_eq!(store.load(), Some(blank));
    }

    #[test]
    fn test_round_trip_through_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(Box::new(FileStorage::new(dir.path())));
        store.save(&sample_document()).unwrap();

        let reopened = SnapshotStore::new(Box::new(FileStorage::new(dir.path())));
        assert_eq!(reopened.load(), Some(sample_document()));
    }

    #[test]
    fn test_saved_value_is_versioned_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(Box::new(FileStorage::new(dir.path())));
        store.save(&sample_document()).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("resumeData.json")).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["schemaVersion"], 1);
        assert!(value["savedAt"].is_string());
        assert_eq!(value["document"]["personalInfo"]["fullName"], "Jane Doe");
        assert_eq!(value["document"]["skills"][0], "Rust");
    }

    #[test]
    fn test_missing_key_is_none() {
        let store = SnapshotStore::new(Box::new(MemoryStorage::new()));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_corrupted_value_is_none() {
        assert_eq!(store_with("{\"schemaVersion\": 1, \"document\": {").load(), None);
        assert_eq!(store_with("not json at all").load(), None);
        assert_eq!(store_with("[1, 2, 3]").load(), None);
        assert_eq!(store_with("{}").load(), None);
    }

    #[test]
    fn test_corrupted_value_reports_malformed() {
        let err = store_with("{oops").try_load().unwrap_err();
        assert!(matches!(err, SnapshotError::Malformed(_)));
    }

    #[test]
    fn test_newer_schema_version_is_rejected() {
        let raw = r#"{"schemaVersion": 7, "document": {"personalInfo": {"fullName": "X"}}}"#;
        let store = store_with(raw);
        assert!(matches!(
            store.try_load().unwrap_err(),
            SnapshotError::UnsupportedVersion { found: 7, supported: 1 }
        ));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_legacy_bare_document_is_upgraded() {
        let raw = r#"{
            "personalInfo": {"fullName": "Jane Doe", "email": "jane@example.com"},
            "experience": [],
            "skills": ["Rust", "SQL"]
        }"#;
        let doc = store_with(raw).load().unwrap();
        assert_eq!(doc.personal_info.full_name, "Jane Doe");
        assert_eq!(doc.personal_info.phone, "");
        // Empty list re-padded; absent list defaulted.
        assert_eq!(doc.experience, vec![ExperienceEntry::default()]);
        assert_eq!(doc.education, vec![EducationEntry::default()]);
        assert_eq!(doc.skills, vec!["Rust".to_string(), "SQL".to_string()]);
    }

    #[test]
    fn test_wrong_field_type_is_none() {
        assert_eq!(store_with(r#"{"skills": "Rust"}"#).load(), None);
    }
}
