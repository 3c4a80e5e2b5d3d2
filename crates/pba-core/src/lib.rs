//! Pre-Birth Archive domain core.
//!
//! Data model for an asset's dossier, the numerology and zodiac calculators,
//! intake validation, and the view routing state machine.
//!
//! Zero I/O: persistence lives in `pba-store`, the model gateway and the
//! terminal surface in `pba-cli`.

pub mod constants;
pub mod identity;
pub mod intake;
pub mod model;
pub mod numerology;
pub mod router;
pub mod time;
pub mod zodiac;

pub use constants::{CHAT_HISTORY_LIMIT, CINEMATIC_SEQUENCE, MASTER_NUMBERS, TERMINAL_GREETING};
pub use identity::{is_asset_id, mint_asset_id, short_id};
pub use intake::{IntakeError, apply_fields, complete as complete_intake, merge_extracted};
pub use model::{
    AllyType, AppView, ChatMessage, CircleMember, CompatibilityReport, ExtractedProfile,
    IntakeDraft, LogType, MissionStatus, MonthlyFrequency, Priority, Role, Subject,
    TacticalLog, TacticalMission, Theme, UserProfile,
};
pub use numerology::{is_master_number, life_path};
pub use router::{Action, RouterError, effective_view, is_resumable, resolve_initial, transition};
pub use time::{CalendarDate, DateError, now_clock, now_unix_millis, now_unix_secs};
pub use zodiac::{EARTH_CYCLE, EarthSign, ProfileReadout, WesternSign, earth_zodiac_index, western_zodiac};
