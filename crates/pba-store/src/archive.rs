//! JSON persistence adapter over a [`KeyValueStore`].
//!
//! Reads never fail: a missing key, a backend error, or an undecodable value
//! all come back as `None`. Undecodable values are removed on the spot so a
//! corrupted session degrades to "logged out" instead of failing every start.

use std::path::Path;

use pba_core::{
    AppView, CHAT_HISTORY_LIMIT, ChatMessage, CircleMember, IntakeDraft, TacticalLog, Theme,
    UserProfile, is_resumable,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::keys;
use crate::store::{KeyValueStore, MemoryStore, SqliteStore};

pub struct Archive {
    backend: Box<dyn KeyValueStore>,
}

impl Archive {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// SQLite-backed archive at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let store = SqliteStore::open(path)?;
        tracing::debug!(
            "opened archive {} (schema v{}, {} bytes)",
            path.display(),
            store.get_metadata("schema_version")?.unwrap_or_default(),
            store.db_size()
        );
        Ok(Self::new(store))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn backend(&self) -> &dyn KeyValueStore {
        self.backend.as_ref()
    }

    // --- Generic JSON contract ---

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get_raw(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("archive read of '{key}' failed: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("archive entry '{key}' failed integrity check, discarding: {e}");
                if let Err(e) = self.backend.remove(key) {
                    tracing::warn!("failed to discard corrupted entry '{key}': {e}");
                }
                None
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.backend.set_raw(key, &json)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.backend.remove(key)
    }

    // --- Session ---

    pub fn profile(&self) -> Option<UserProfile> {
        self.get(keys::PROFILE)
    }

    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.set(keys::PROFILE, profile)
    }

    pub fn clear_profile(&self) -> Result<()> {
        self.remove(keys::PROFILE)
    }

    pub fn theme(&self) -> Theme {
        self.get(keys::THEME).unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.set(keys::THEME, &theme)
    }

    pub fn last_view(&self) -> Option<AppView> {
        self.get(keys::VIEW)
    }

    /// Record the last view. CINEMATIC and DASHBOARD are never written; the
    /// call is a no-op for them and returns `false`.
    pub fn set_last_view(&self, view: AppView) -> Result<bool> {
        if !is_resumable(view) {
            tracing::debug!("not persisting non-resumable view {view}");
            return Ok(false);
        }
        self.set(keys::VIEW, &view)?;
        Ok(true)
    }

    pub fn clear_last_view(&self) -> Result<()> {
        self.remove(keys::VIEW)
    }

    pub fn intake_draft(&self) -> Option<IntakeDraft> {
        self.get(keys::INTAKE_DRAFT)
    }

    pub fn save_intake_draft(&self, draft: &IntakeDraft) -> Result<()> {
        self.set(keys::INTAKE_DRAFT, draft)
    }

    pub fn clear_intake_draft(&self) -> Result<()> {
        self.remove(keys::INTAKE_DRAFT)
    }

    pub fn auth_email(&self) -> Option<String> {
        self.get(keys::AUTH_EMAIL)
    }

    /// Remember the login identifier. Empty values are ignored.
    pub fn set_auth_email(&self, email: &str) -> Result<()> {
        if email.is_empty() {
            return Ok(());
        }
        self.set(keys::AUTH_EMAIL, email)
    }

    // --- Chat ---

    pub fn chat_history(&self, profile_id: &str) -> Vec<ChatMessage> {
        self.get(&keys::chat_history(profile_id)).unwrap_or_default()
    }

    /// Persist the most recent [`CHAT_HISTORY_LIMIT`] messages, oldest first.
    /// An empty history is not written.
    pub fn save_chat_history(&self, profile_id: &str, history: &[ChatMessage]) -> Result<()> {
        if history.is_empty() {
            return Ok(());
        }
        let start = history.len().saturating_sub(CHAT_HISTORY_LIMIT);
        self.set(&keys::chat_history(profile_id), &history[start..])
    }

    /// Append messages and persist the capped window. Returns the stored window.
    pub fn append_chat(
        &self,
        profile_id: &str,
        messages: impl IntoIterator<Item = ChatMessage>,
    ) -> Result<Vec<ChatMessage>> {
        let mut history = self.chat_history(profile_id);
        history.extend(messages);
        self.save_chat_history(profile_id, &history)?;
        let start = history.len().saturating_sub(CHAT_HISTORY_LIMIT);
        Ok(history.split_off(start))
    }

    // --- Network ---

    pub fn allies(&self, profile_id: &str) -> Vec<CircleMember> {
        self.get(&keys::allies(profile_id)).unwrap_or_default()
    }

    /// New allies go to the front of the list.
    pub fn add_ally(&self, profile_id: &str, ally: CircleMember) -> Result<Vec<CircleMember>> {
        let mut allies = self.allies(profile_id);
        allies.insert(0, ally);
        self.set(&keys::allies(profile_id), &allies)?;
        Ok(allies)
    }

    /// Remove exactly the ally with `ally_id`. Returns whether one was removed.
    pub fn remove_ally(&self, profile_id: &str, ally_id: &str) -> Result<bool> {
        let mut allies = self.allies(profile_id);
        let before = allies.len();
        allies.retain(|a| a.id != ally_id);
        if allies.len() == before {
            return Ok(false);
        }
        self.set(&keys::allies(profile_id), &allies)?;
        Ok(true)
    }

    // --- Field reports ---

    pub fn reports(&self, profile_id: &str) -> Vec<TacticalLog> {
        self.get(&keys::reports(profile_id)).unwrap_or_default()
    }

    /// New reports go to the front of the log.
    pub fn add_report(&self, profile_id: &str, report: TacticalLog) -> Result<Vec<TacticalLog>> {
        let mut reports = self.reports(profile_id);
        reports.insert(0, report);
        self.set(&keys::reports(profile_id), &reports)?;
        Ok(reports)
    }

    // --- Cached media and briefings ---

    pub fn portrait(&self, profile_id: &str) -> Option<String> {
        self.get(&keys::portrait(profile_id))
    }

    pub fn set_portrait(&self, profile_id: &str, data_uri: &str) -> Result<()> {
        self.set(&keys::portrait(profile_id), data_uri)
    }

    pub fn video(&self, profile_id: &str) -> Option<String> {
        self.get(&keys::video(profile_id))
    }

    pub fn set_video(&self, profile_id: &str, reference: &str) -> Result<()> {
        self.set(&keys::video(profile_id), reference)
    }

    pub fn briefing(&self, profile_id: &str) -> Option<String> {
        self.get(&keys::briefing(profile_id))
    }

    pub fn set_briefing(&self, profile_id: &str, text: &str) -> Result<()> {
        self.set(&keys::briefing(profile_id), text)
    }

    // --- Purge ---

    /// Erase everything scoped to `profile_id` plus the session keys.
    pub fn purge_user(&self, profile_id: &str) -> Result<()> {
        for key in keys::user_scoped(profile_id) {
            self.remove(&key)?;
        }
        self.clear_profile()?;
        self.clear_last_view()?;
        tracing::info!("purged archive data for {profile_id}");
        Ok(())
    }
}
