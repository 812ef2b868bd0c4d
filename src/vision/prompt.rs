//! Prompt templates for the vision model.
//!
//! The model is asked for the fixed JSON schema the structured parser
//! expects. Real answers drift from it anyway, which is the whole reason the
//! freeform pipeline exists.

use crate::models::ImageCategory;

/// Shared system prompt: the schema contract, stated once.
pub const SYSTEM_PROMPT: &str = "\
You are a radiology analysis assistant reviewing a medical image for a clinician. \
Respond with a single JSON object and nothing else — no code fences, no prose around it. \
The object must contain exactly these keys: \
\"finalResult\" (a conclusion of at most a few sentences), \
\"biRadsOrNA\" (the BI-RADS category code for mammograms, or the string \"N/A\" otherwise), \
\"findings\" (an object with exactly the keys \"breastDensity\", \"masses\", \"calcifications\" and \"asymmetry\"), \
\"detailedAnalysis\" (a non-empty elaboration), and \
\"recommendations\" (a non-empty array of strings).";

/// Per-category analysis instruction.
pub fn user_prompt(category: ImageCategory) -> String {
    let focus = match category {
        ImageCategory::Mammogram => {
            "This is a mammogram. Assess breast density, masses, calcifications and asymmetry, \
             and assign a BI-RADS category."
        }
        ImageCategory::Xray => {
            "This is an X-ray. Describe bone and soft-tissue findings; use \"N/A\" for biRadsOrNA \
             and for the breast-specific finding fields."
        }
        ImageCategory::CtScan => {
            "This is a CT scan. Describe the visible anatomy and any abnormal findings; use \"N/A\" \
             for biRadsOrNA and for the breast-specific finding fields."
        }
        ImageCategory::Mri => {
            "This is an MRI. Describe signal characteristics and any abnormal findings; use \"N/A\" \
             for biRadsOrNA and for the breast-specific finding fields."
        }
        ImageCategory::Ultrasound => {
            "This is an ultrasound. Describe echogenicity and any focal findings; use \"N/A\" for \
             biRadsOrNA unless this is a breast ultrasound."
        }
    };
    format!("{focus} Answer with the JSON object only.")
}
