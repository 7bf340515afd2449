//! Navigation guard predicate

use super::routes::Route;

/// Outcome of evaluating the guard for one target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(Route),
}

/// Decide whether `target` may be shown given the session state
pub fn evaluate(target: Route, authenticated: bool) -> GuardDecision {
    if target.requires_auth() && !authenticated {
        GuardDecision::Redirect(Route::Login)
    } else if target.is_guest_only() && authenticated {
        GuardDecision::Redirect(Route::Dashboard)
    } else {
        GuardDecision::Proceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_users_are_sent_to_login() {
        assert_eq!(evaluate(Route::Dashboard, false), GuardDecision::Redirect(Route::Login));
        assert_eq!(evaluate(Route::Login, false), GuardDecision::Proceed);
        assert_eq!(evaluate(Route::Signup, false), GuardDecision::Proceed);
    }

    #[test]
    fn signed_in_users_skip_guest_pages() {
        assert_eq!(evaluate(Route::Login, true), GuardDecision::Redirect(Route::Dashboard));
        assert_eq!(evaluate(Route::Signup, true), GuardDecision::Redirect(Route::Dashboard));
        assert_eq!(evaluate(Route::Dashboard, true), GuardDecision::Proceed);
    }
}
