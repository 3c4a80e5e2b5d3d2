//! Session driver: owns the current view and applies router transitions
//! together with their persistence side effects.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use pba_core::{
    Action, AppView, CINEMATIC_SEQUENCE, ExtractedProfile, IntakeDraft, IntakeError, RouterError,
    UserProfile, apply_fields, complete_intake, effective_view, merge_extracted, resolve_initial,
    transition,
};
use pba_store::{Archive, StoreError};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::Config;

#[derive(Debug)]
pub enum SessionError {
    Router(RouterError),
    Store(StoreError),
    MissingCredentials,
    NoProfile,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Router(e) => write!(f, "{e}"),
            SessionError::Store(e) => write!(f, "{e}"),
            SessionError::MissingCredentials => write!(f, "email and access code are required"),
            SessionError::NoProfile => write!(f, "no asset profile on file"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<RouterError> for SessionError {
    fn from(e: RouterError) -> Self {
        SessionError::Router(e)
    }
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        SessionError::Store(e)
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub auth_delay: Duration,
    pub cinematic_step: Duration,
    pub cinematic_final: Duration,
}

impl Timing {
    pub fn from_config(config: &Config) -> Self {
        Self {
            auth_delay: config.auth_delay(),
            cinematic_step: config.cinematic_step(),
            cinematic_final: config.cinematic_final(),
        }
    }

    pub fn instant() -> Self {
        Self {
            auth_delay: Duration::ZERO,
            cinematic_step: Duration::ZERO,
            cinematic_final: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    /// Profile minted and persisted; the session is now CINEMATIC.
    Complete(UserProfile),
    /// Draft saved, intake stays open.
    Incomplete { draft: IntakeDraft, error: IntakeError },
}

pub struct Session {
    archive: Arc<Archive>,
    timing: Timing,
    view: AppView,
    profile: Option<UserProfile>,
}

impl Session {
    /// Rebuild the session from storage. Nothing is written during restore;
    /// only transitions after it persist the view.
    pub fn restore(archive: Arc<Archive>, timing: Timing) -> Self {
        let profile = archive.profile();
        let view = resolve_initial(profile.is_some(), archive.last_view());
        tracing::debug!("restored session at {view}");
        Self {
            archive,
            timing,
            view,
            profile,
        }
    }

    pub fn view(&self) -> AppView {
        effective_view(self.view, self.profile.is_some())
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn archive(&self) -> &Arc<Archive> {
        &self.archive
    }

    pub fn remembered_email(&self) -> Option<String> {
        self.archive.auth_email()
    }

    fn set_view(&mut self, view: AppView) {
        self.view = view;
        if let Err(e) = self.archive.set_last_view(view) {
            tracing::warn!("failed to persist view {view}: {e}");
        }
    }

    fn step(&self, action: Action) -> Result<AppView> {
        Ok(transition(self.view(), action, self.profile.is_some())?)
    }

    pub fn uplink(&mut self) -> Result<AppView> {
        let next = self.step(Action::Uplink)?;
        self.set_view(next);
        Ok(next)
    }

    /// Simulated clearance check: any non-empty pair passes after the
    /// configured delay.
    pub async fn authenticate(&mut self, email: &str, code: &str) -> Result<AppView> {
        let next = self.step(Action::Authenticated)?;
        if email.trim().is_empty() || code.trim().is_empty() {
            return Err(SessionError::MissingCredentials);
        }
        tokio::time::sleep(self.timing.auth_delay).await;
        self.archive.set_auth_email(email.trim())?;
        tracing::info!("clearance granted for {}", email.trim());
        self.set_view(next);
        Ok(next)
    }

    /// Merge `fields` and an optional document scan over the stored draft,
    /// persist it, and complete intake if the draft is valid.
    pub fn submit_intake(
        &mut self,
        fields: &IntakeDraft,
        scanned: Option<&ExtractedProfile>,
    ) -> Result<IntakeOutcome> {
        let next = self.step(Action::IntakeComplete)?;

        let stored = self.archive.intake_draft().unwrap_or_default();
        let mut draft = apply_fields(&stored, fields);
        if let Some(scan) = scanned {
            draft = merge_extracted(&draft, scan);
        }
        if !draft.is_blank() {
            self.archive.save_intake_draft(&draft)?;
        }

        let mut rng = SmallRng::from_os_rng();
        let profile = match complete_intake(&draft, &mut rng) {
            Ok(profile) => profile,
            Err(error) => {
                tracing::info!("intake incomplete: {error}");
                return Ok(IntakeOutcome::Incomplete { draft, error });
            }
        };

        self.archive.save_profile(&profile)?;
        self.archive.clear_intake_draft()?;
        self.archive.clear_last_view()?;
        tracing::info!("asset {} registered", profile.id);

        self.profile = Some(profile.clone());
        self.set_view(next);
        Ok(IntakeOutcome::Complete(profile))
    }

    /// Discard the saved intake draft. Only available from the intake view.
    pub fn clear_intake_draft(&self) -> Result<()> {
        self.step(Action::IntakeComplete)?;
        Ok(self.archive.clear_intake_draft()?)
    }

    /// Play the initiation sequence, then move to the dashboard.
    pub async fn run_cinematic(&mut self, mut on_step: impl FnMut(usize, &str)) -> Result<AppView> {
        let next = self.step(Action::InitiationComplete)?;
        for (i, line) in CINEMATIC_SEQUENCE.iter().enumerate() {
            on_step(i, line);
            if i + 1 < CINEMATIC_SEQUENCE.len() {
                tokio::time::sleep(self.timing.cinematic_step).await;
            }
        }
        tokio::time::sleep(self.timing.cinematic_final).await;
        self.set_view(next);
        Ok(next)
    }

    pub fn logout(&mut self) -> Result<AppView> {
        let next = self.step(Action::Logout)?;
        self.archive.clear_profile()?;
        self.archive.clear_last_view()?;
        self.profile = None;
        self.view = next;
        tracing::info!("session terminated");
        Ok(next)
    }

    /// Erase the asset's archive data, then log out.
    pub fn purge(&mut self) -> Result<AppView> {
        let id = self
            .profile
            .as_ref()
            .map(|p| p.id.clone())
            .ok_or(SessionError::NoProfile)?;
        self.step(Action::Logout)?;
        self.archive.purge_user(&id)?;
        self.logout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pba_store::keys;

    fn session(archive: &Arc<Archive>) -> Session {
        Session::restore(archive.clone(), Timing::instant())
    }

    fn fields(name: &str, dob: &str) -> IntakeDraft {
        IntakeDraft {
            full_name: name.into(),
            dob: dob.into(),
            ..IntakeDraft::default()
        }
    }

    #[test]
    fn test_fresh_restore_is_landing_and_writes_nothing() {
        let archive = Arc::new(Archive::in_memory());
        let s = session(&archive);
        assert_eq!(s.view(), AppView::Landing);
        assert!(archive.backend().keys().unwrap().is_empty());
    }

    #[test]
    fn test_restore_resumes_stored_view() {
        let archive = Arc::new(Archive::in_memory());
        archive.set_last_view(AppView::Intake).unwrap();
        assert_eq!(session(&archive).view(), AppView::Intake);
    }

    #[test]
    fn test_corrupted_profile_restores_to_landing() {
        let archive = Arc::new(Archive::in_memory());
        archive.backend().set_raw(keys::PROFILE, "{{{").unwrap();
        let s = session(&archive);
        assert_eq!(s.view(), AppView::Landing);
        assert!(archive.backend().get_raw(keys::PROFILE).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_full_onboarding_flow() {
        let archive = Arc::new(Archive::in_memory());
        let mut s = session(&archive);

        assert_eq!(s.uplink().unwrap(), AppView::Auth);
        assert_eq!(archive.last_view(), Some(AppView::Auth));

        assert_eq!(
            s.authenticate("agent@archive.test", "0000").await.unwrap(),
            AppView::Intake
        );
        assert_eq!(archive.auth_email().as_deref(), Some("agent@archive.test"));
        assert_eq!(archive.last_view(), Some(AppView::Intake));

        let outcome = s.submit_intake(&fields("Ada Lovelace", "1815-12-10"), None).unwrap();
        let IntakeOutcome::Complete(profile) = outcome else {
            panic!("expected completed intake");
        };
        assert_eq!(s.view(), AppView::Cinematic);
        assert_eq!(archive.profile(), Some(profile.clone()));
        assert!(archive.intake_draft().is_none());
        assert!(archive.last_view().is_none());

        let mut steps = Vec::new();
        let view = s.run_cinematic(|i, line| steps.push((i, line.to_string()))).await.unwrap();
        assert_eq!(view, AppView::Dashboard);
        assert_eq!(steps.len(), CINEMATIC_SEQUENCE.len());
        assert!(archive.last_view().is_none());

        // A restart lands on the dashboard.
        assert_eq!(session(&archive).view(), AppView::Dashboard);
    }

    #[tokio::test]
    async fn test_authenticate_with_existing_profile_goes_to_dashboard() {
        let archive = Arc::new(Archive::in_memory());
        let mut s = session(&archive);
        s.uplink().unwrap();
        s.authenticate("a@b.c", "x").await.unwrap();
        s.submit_intake(&fields("Ada", "1815-12-10"), None).unwrap();

        let mut s = Session {
            view: AppView::Auth,
            ..session(&archive)
        };
        assert_eq!(s.authenticate("a@b.c", "x").await.unwrap(), AppView::Dashboard);
    }

    #[tokio::test]
    async fn test_authenticate_requires_credentials() {
        let archive = Arc::new(Archive::in_memory());
        let mut s = session(&archive);
        s.uplink().unwrap();
        let err = s.authenticate("", "code").await.unwrap_err();
        assert!(matches!(err, SessionError::MissingCredentials));
        assert_eq!(s.view(), AppView::Auth);
    }

    #[test]
    fn test_invalid_transition_names_view_and_action() {
        let archive = Arc::new(Archive::in_memory());
        let mut s = session(&archive);
        let err = s.logout().unwrap_err();
        assert_eq!(err.to_string(), "action 'logout' is not available from view LANDING");
    }

    #[tokio::test]
    async fn test_incomplete_intake_keeps_draft() {
        let archive = Arc::new(Archive::in_memory());
        let mut s = session(&archive);
        s.uplink().unwrap();
        s.authenticate("a@b.c", "x").await.unwrap();

        let outcome = s.submit_intake(&fields("Grace", ""), None).unwrap();
        assert!(matches!(
            outcome,
            IntakeOutcome::Incomplete { error: IntakeError::InvalidDob(_), .. }
        ));
        assert_eq!(s.view(), AppView::Intake);
        assert_eq!(archive.intake_draft().unwrap().full_name, "Grace");

        // Second attempt supplies the missing date from a scan.
        let scan = ExtractedProfile {
            dob: Some("Born 1906-12-09 in NYC".into()),
            ..ExtractedProfile::default()
        };
        let outcome = s.submit_intake(&IntakeDraft::default(), Some(&scan)).unwrap();
        let IntakeOutcome::Complete(profile) = outcome else {
            panic!("expected completed intake");
        };
        assert_eq!(profile.full_name, "Grace");
        assert_eq!(profile.dob, "1906-12-09");
    }

    #[tokio::test]
    async fn test_clear_draft_only_from_intake() {
        let archive = Arc::new(Archive::in_memory());
        archive.save_intake_draft(&fields("Grace", "")).unwrap();
        let mut s = session(&archive);

        assert!(matches!(
            s.clear_intake_draft(),
            Err(SessionError::Router(_))
        ));
        assert_eq!(archive.intake_draft().unwrap().full_name, "Grace");

        s.uplink().unwrap();
        s.authenticate("a@b.c", "x").await.unwrap();
        s.clear_intake_draft().unwrap();
        assert!(archive.intake_draft().is_none());

        let outcome = s.submit_intake(&IntakeDraft::default(), None).unwrap();
        assert!(matches!(outcome, IntakeOutcome::Incomplete { .. }));
        assert!(archive.backend().get_raw(keys::INTAKE_DRAFT).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_and_purge() {
        let archive = Arc::new(Archive::in_memory());
        let mut s = session(&archive);
        s.uplink().unwrap();
        s.authenticate("a@b.c", "x").await.unwrap();
        let IntakeOutcome::Complete(profile) =
            s.submit_intake(&fields("Ada", "1815-12-10"), None).unwrap()
        else {
            panic!("expected completed intake");
        };
        s.run_cinematic(|_, _| {}).await.unwrap();
        archive.set_briefing(&profile.id, "cached").unwrap();

        assert_eq!(s.purge().unwrap(), AppView::Landing);
        assert!(archive.profile().is_none());
        assert!(archive.last_view().is_none());
        assert!(archive.briefing(&profile.id).is_none());
        assert!(matches!(s.purge(), Err(SessionError::NoProfile)));
    }
}
