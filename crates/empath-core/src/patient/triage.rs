//! Keyword triage deciding whether to ask for extra medical detail.

/// Disease, symptom and anatomy terms matched as case-insensitive substrings.
pub const MEDICAL_KEYWORDS: &[&str] = &[
    "cancer",
    "tumor",
    "diabetes",
    "disease",
    "syndrome",
    "disorder",
    "diagnosis",
    "diagnosed",
    "illness",
    "symptom",
    "stage",
    "medical",
    "heart",
    "lung",
    "liver",
    "kidney",
    "brain",
    "infection",
    "virus",
    "pain",
    "hurt",
    "ache",
    "fever",
    "cough",
    "blood",
];

/// Returns true if `text` mentions any of [`MEDICAL_KEYWORDS`].
///
/// Substring semantics: "headache" matches "ache", "stages" matches "stage".
pub fn is_medical_context(text: &str) -> bool {
    let lowered = text.to_lowercase();
    MEDICAL_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}
