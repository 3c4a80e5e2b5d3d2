//! Storage key layout. User-scoped keys carry the profile id as a suffix.

pub const PROFILE: &str = "rav_user_profile";
pub const THEME: &str = "rav_app_theme";
pub const VIEW: &str = "rav_current_view";
pub const INTAKE_DRAFT: &str = "rav_intake_draft";
pub const AUTH_EMAIL: &str = "rav_auth_email";

pub fn chat_history(profile_id: &str) -> String {
    format!("chat_history_{profile_id}")
}

pub fn allies(profile_id: &str) -> String {
    format!("rav_allies_{profile_id}")
}

pub fn reports(profile_id: &str) -> String {
    format!("rav_reports_{profile_id}")
}

pub fn portrait(profile_id: &str) -> String {
    format!("rav_portrait_{profile_id}")
}

pub fn video(profile_id: &str) -> String {
    format!("rav_video_{profile_id}")
}

pub fn briefing(profile_id: &str) -> String {
    format!("rav_briefing_{profile_id}")
}

/// Every key scoped to one profile.
pub fn user_scoped(profile_id: &str) -> [String; 6] {
    [
        chat_history(profile_id),
        allies(profile_id),
        reports(profile_id),
        portrait(profile_id),
        video(profile_id),
        briefing(profile_id),
    ]
}
