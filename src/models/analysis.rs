use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ImageCategory;

/// One persisted analysis run.
///
/// Created once and immutable afterwards except for `custom_label`, which
/// the owner may rename; the owner may also delete the record. The
/// structured/segmented views are derived from `raw_text` on each render and
/// are never stored, so the stored text and its presentation cannot skew.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    /// The clinician who ran the analysis — exclusive owner for
    /// access-control purposes.
    pub owner_id: Uuid,
    /// Opaque pointer into the image-storage collaborator.
    pub image_ref: String,
    pub image_category: ImageCategory,
    /// The model's output, verbatim. Opaque: no structure guaranteed.
    pub raw_text: String,
    pub custom_label: Option<String>,
    pub created_at: NaiveDateTime,
}

impl AnalysisRecord {
    /// Build a fresh record with a new id.
    pub fn new(
        owner_id: Uuid,
        image_ref: impl Into<String>,
        image_category: ImageCategory,
        raw_text: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            image_ref: image_ref.into(),
            image_category,
            raw_text: raw_text.into(),
            custom_label: None,
            created_at,
        }
    }

    /// Derive the display view from the stored raw text. Recomputed on
    /// every call: a reloaded record renders exactly like a fresh one.
    pub fn view(&self) -> crate::pipeline::AnalysisView {
        crate::pipeline::AnalysisView::derive(&self.raw_text)
    }

    /// Display name: the owner's label when set, else a generic title from
    /// the image category.
    pub fn display_label(&self) -> String {
        match &self.custom_label {
            Some(label) if !label.trim().is_empty() => label.clone(),
            _ => format!("{} analysis", self.image_category.as_str()),
        }
    }
}
