//! View routing state machine.
//!
//! Pure transition logic only. The session driver in `pba-cli` owns the side
//! effects (minting the profile, clearing storage on logout, writing the
//! last-view key).

use std::fmt;

use crate::model::AppView;

/// User actions that move between views.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Uplink,
    Authenticated,
    IntakeComplete,
    InitiationComplete,
    Logout,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Uplink => "uplink",
            Action::Authenticated => "authenticated",
            Action::IntakeComplete => "intake-complete",
            Action::InitiationComplete => "initiation-complete",
            Action::Logout => "logout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterError {
    pub from: AppView,
    pub action: Action,
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "action '{}' is not available from view {}",
            self.action.as_str(),
            self.from
        )
    }
}

impl std::error::Error for RouterError {}

/// Initial view at startup.
///
/// A stored profile always wins. Otherwise a stored last view is resumed
/// unless it is CINEMATIC or DASHBOARD, which must be re-derived from the
/// profile rather than replayed.
pub fn resolve_initial(profile_present: bool, last_view: Option<AppView>) -> AppView {
    if profile_present {
        return AppView::Dashboard;
    }
    match last_view {
        Some(view) if is_resumable(view) => view,
        _ => AppView::Landing,
    }
}

/// Whether a view may be written to (and resumed from) the last-view key.
pub fn is_resumable(view: AppView) -> bool {
    !matches!(view, AppView::Cinematic | AppView::Dashboard)
}

/// Apply an action to the current view.
pub fn transition(
    from: AppView,
    action: Action,
    profile_present: bool,
) -> Result<AppView, RouterError> {
    let next = match (from, action) {
        (AppView::Landing, Action::Uplink) => AppView::Auth,
        (AppView::Auth, Action::Authenticated) if profile_present => AppView::Dashboard,
        (AppView::Auth, Action::Authenticated) => AppView::Intake,
        (AppView::Intake, Action::IntakeComplete) => AppView::Cinematic,
        (AppView::Cinematic, Action::InitiationComplete) => AppView::Dashboard,
        (AppView::Dashboard, Action::Logout) => AppView::Landing,
        _ => return Err(RouterError { from, action }),
    };
    Ok(next)
}

/// The view actually shown: profile-gated views fall back to LANDING.
pub fn effective_view(view: AppView, profile_present: bool) -> AppView {
    match view {
        AppView::Cinematic | AppView::Dashboard if !profile_present => AppView::Landing,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_profile_wins() {
        for last in [None, Some(AppView::Auth), Some(AppView::Intake), Some(AppView::Landing)] {
            assert_eq!(resolve_initial(true, last), AppView::Dashboard);
        }
    }

    #[test]
    fn test_initial_resumes_safe_views() {
        assert_eq!(resolve_initial(false, Some(AppView::Auth)), AppView::Auth);
        assert_eq!(resolve_initial(false, Some(AppView::Intake)), AppView::Intake);
        assert_eq!(resolve_initial(false, None), AppView::Landing);
    }

    #[test]
    fn test_initial_never_replays_cinematic_or_dashboard() {
        assert_eq!(resolve_initial(false, Some(AppView::Dashboard)), AppView::Landing);
        assert_eq!(resolve_initial(false, Some(AppView::Cinematic)), AppView::Landing);
    }

    #[test]
    fn test_happy_path() {
        let v = transition(AppView::Landing, Action::Uplink, false).unwrap();
        assert_eq!(v, AppView::Auth);
        let v = transition(v, Action::Authenticated, false).unwrap();
        assert_eq!(v, AppView::Intake);
        let v = transition(v, Action::IntakeComplete, false).unwrap();
        assert_eq!(v, AppView::Cinematic);
        let v = transition(v, Action::InitiationComplete, true).unwrap();
        assert_eq!(v, AppView::Dashboard);
        let v = transition(v, Action::Logout, true).unwrap();
        assert_eq!(v, AppView::Landing);
    }

    #[test]
    fn test_returning_asset_skips_intake() {
        assert_eq!(
            transition(AppView::Auth, Action::Authenticated, true).unwrap(),
            AppView::Dashboard
        );
    }

    #[test]
    fn test_unlisted_pairs_rejected() {
        let allowed = [
            (AppView::Landing, Action::Uplink),
            (AppView::Auth, Action::Authenticated),
            (AppView::Intake, Action::IntakeComplete),
            (AppView::Cinematic, Action::InitiationComplete),
            (AppView::Dashboard, Action::Logout),
        ];
        let actions = [
            Action::Uplink,
            Action::Authenticated,
            Action::IntakeComplete,
            Action::InitiationComplete,
            Action::Logout,
        ];
        for view in AppView::ALL {
            for action in actions {
                let result = transition(view, action, false);
                if allowed.contains(&(view, action)) {
                    assert!(result.is_ok(), "{view} + {action:?} should be allowed");
                } else {
                    let err = result.unwrap_err();
                    assert_eq!(err, RouterError { from: view, action });
                }
            }
        }
    }

    #[test]
    fn test_resumable() {
        assert!(is_resumable(AppView::Landing));
        assert!(is_resumable(AppView::Auth));
        assert!(is_resumable(AppView::Intake));
        assert!(!is_resumable(AppView::Cinematic));
        assert!(!is_resumable(AppView::Dashboard));
    }

    #[test]
    fn test_effective_view_without_profile() {
        assert_eq!(effective_view(AppView::Dashboard, false), AppView::Landing);
        assert_eq!(effective_view(AppView::Cinematic, false), AppView::Landing);
        assert_eq!(effective_view(AppView::Dashboard, true), AppView::Dashboard);
        assert_eq!(effective_view(AppView::Intake, false), AppView::Intake);
    }

    #[test]
    fn test_error_message() {
        let err = transition(AppView::Landing, Action::Logout, false).unwrap_err();
        assert_eq!(err.to_string(), "action 'logout' is not available from view LANDING");
    }
}
