//! Sensitivity decision component.
//!
//! Computes the per-request hide flag from the requester identity and the
//! optional toggle signal. Pure: audit events are returned to the caller
//! (the sensitivity middleware), never emitted here.

use serde_json::json;

use crate::audit::{AuditAction, AuditEvent};
use crate::middleware::auth::AuthUser;
use crate::policy::Role;

/// Tri-state toggle signal read from the `hideSensitive` query parameter or
/// the `x-hide-sensitive` header. `"false"` asks for sensitive data to be
/// shown; anything unrecognized counts as unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensitiveToggle {
    Show,
    Hide,
    Unset,
}

impl SensitiveToggle {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("false") => SensitiveToggle::Show,
            Some(v) if v.eq_ignore_ascii_case("true") => SensitiveToggle::Hide,
            _ => SensitiveToggle::Unset,
        }
    }
}

/// Outcome of the sensitivity decision for one request.
#[derive(Debug)]
pub struct Decision {
    /// Whether sensitive fields must be masked for this request.
    pub hide: bool,
    /// Event to record immediately (an attempted bypass).
    pub immediate: Option<AuditEvent>,
    /// Event to record only after the response completes 2xx.
    pub deferred: Option<AuditEvent>,
}

impl Decision {
    fn hidden() -> Self {
        Decision {
            hide: true,
            immediate: None,
            deferred: None,
        }
    }
}

/// Resolve the hide flag for a request.
///
/// Policy, in order: anonymous requests always hide and honor no override;
/// workers and customers are forced to hide, and an explicit show request is
/// recorded as an attempted bypass; admins and owners follow the toggle,
/// defaulting to hide when unset, and a resolved show schedules a deferred
/// "Sensitive Data Viewed" event.
pub fn decide(requester: Option<&AuthUser>, toggle: SensitiveToggle, route: &str) -> Decision {
    let Some(user) = requester else {
        return Decision::hidden();
    };

    match user.role {
        Role::Worker | Role::Customer => {
            let immediate = (toggle == SensitiveToggle::Show).then(|| {
                AuditEvent::new(
                    AuditAction::UnauthorizedSensitiveToggle,
                    user.user_id,
                    json!({
                        "role": user.role.as_str(),
                        "route": route,
                        "requested": "show-sensitive",
                    }),
                )
            });
            Decision {
                hide: true,
                immediate,
                deferred: None,
            }
        }
        Role::Admin | Role::Owner => {
            let hide = toggle != SensitiveToggle::Show;
            let deferred = (!hide).then(|| {
                AuditEvent::new(
                    AuditAction::SensitiveDataViewed,
                    user.user_id,
                    json!({
                        "role": user.role.as_str(),
                        "route": route,
                    }),
                )
            });
            Decision {
                hide,
                immediate: None,
                deferred,
            }
        }
    }
}
