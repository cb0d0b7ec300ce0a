// Role and visibility policy for API responses.
//
// Everything in this module is pure: the decision component computes the
// per-request hide flag, the filter functions reshape raw records, and the
// visibility tables describe which fields each role may see. Side effects
// (audit writes, extensions) live in the middleware and audit modules.

pub mod decision;
pub mod filters;
pub mod list;
pub mod visibility;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder substituted for every masked field, across all entities.
/// A fixed string (not null, not empty) so clients can tell "hidden"
/// apart from "absent".
pub const REDACTED: &str = "[REDACTED]";

/// Job statuses under which workers may see technical winding fields.
pub const WINDING_VISIBLE_STATUSES: &[&str] = &["Approved By Customer", "Work In Progress"];

/// Body of the stub returned when winding details are stage-gated away.
pub const WINDING_STAGE_MESSAGE: &str = "not available at this stage";

/// Requester roles. Unknown role strings fail to parse; the auth layer
/// then treats the request as anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Owner,
    Worker,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Owner => "Owner",
            Role::Worker => "Worker",
            Role::Customer => "Customer",
        }
    }

    /// Roles that see unmasked records when the hide flag is off.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin | Role::Owner)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Owner" => Ok(Role::Owner),
            "Worker" => Ok(Role::Worker),
            "Customer" => Ok(Role::Customer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

/// Admin and Owner.
pub const MANAGERS: &[Role] = &[Role::Admin, Role::Owner];

/// Admin, Owner and Worker.
pub const STAFF: &[Role] = &[Role::Admin, Role::Owner, Role::Worker];

/// Every authenticated role.
pub const ANY_ROLE: &[Role] = &[Role::Admin, Role::Owner, Role::Worker, Role::Customer];

/// True when the parent job status allows workers to see winding internals.
pub fn winding_visible(job_status: &str) -> bool {
    WINDING_VISIBLE_STATUSES.contains(&job_status)
}
