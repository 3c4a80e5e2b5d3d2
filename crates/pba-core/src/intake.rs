use std::fmt;
use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

use crate::identity::mint_asset_id;
use crate::model::{ExtractedProfile, IntakeDraft, UserProfile};
use crate::numerology::life_path;
use crate::time::{CalendarDate, DateError};

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    MissingName,
    InvalidDob(DateError),
}

impl fmt::Display for IntakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntakeError::MissingName => write!(f, "full name is required"),
            IntakeError::InvalidDob(e) => write!(f, "date of birth: {e}"),
        }
    }
}

impl std::error::Error for IntakeError {}

/// Overlay OCR output onto a draft.
///
/// Only fields the scan actually produced replace draft values. A scanned date
/// of birth is accepted only when it contains a `YYYY-MM-DD` run, and only that
/// run is kept.
pub fn merge_extracted(draft: &IntakeDraft, extracted: &ExtractedProfile) -> IntakeDraft {
    let pick = |scanned: &Option<String>, current: &str| -> String {
        match scanned.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => current.to_string(),
        }
    };

    let dob = extracted
        .dob
        .as_deref()
        .and_then(|d| ISO_DATE.find(d))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| draft.dob.clone());

    IntakeDraft {
        full_name: pick(&extracted.full_name, &draft.full_name),
        dob,
        birth_time: pick(&extracted.birth_time, &draft.birth_time),
        birth_location: pick(&extracted.birth_location, &draft.birth_location),
    }
}

/// Overlay explicitly supplied form values onto a draft; empty inputs keep the draft.
pub fn apply_fields(draft: &IntakeDraft, fields: &IntakeDraft) -> IntakeDraft {
    let keep = |new: &str, old: &str| {
        if new.trim().is_empty() {
            old.to_string()
        } else {
            new.trim().to_string()
        }
    };
    IntakeDraft {
        full_name: keep(&fields.full_name, &draft.full_name),
        dob: keep(&fields.dob, &draft.dob),
        birth_time: keep(&fields.birth_time, &draft.birth_time),
        birth_location: keep(&fields.birth_location, &draft.birth_location),
    }
}

/// Check the required fields without minting anything.
pub fn validate(draft: &IntakeDraft) -> Result<CalendarDate, IntakeError> {
    if draft.full_name.trim().is_empty() {
        return Err(IntakeError::MissingName);
    }
    CalendarDate::parse(&draft.dob).map_err(IntakeError::InvalidDob)
}

/// Turn a complete draft into a new profile with a freshly minted id.
pub fn complete<R: Rng + ?Sized>(draft: &IntakeDraft, rng: &mut R) -> Result<UserProfile, IntakeError> {
    let date = validate(draft)?;
    let dob = date.to_string();
    Ok(UserProfile {
        id: mint_asset_id(rng),
        full_name: draft.full_name.trim().to_string(),
        life_path_number: Some(life_path(&dob)),
        dob,
        birth_time: draft.birth_time.trim().to_string(),
        birth_location: draft.birth_location.trim().to_string(),
        archetype: None,
        is_premium: None,
        avatar_url: None,
    })
}
