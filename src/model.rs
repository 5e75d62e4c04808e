//! Core domain types for the lead lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lead identifier, as assigned by the external lead service.
pub type LeadId = String;

const SECONDS_PER_DAY: i64 = 86_400;

/// Status of a loan lead.
///
/// `NewLead` is the pseudo-initial status of a lead that has not reached
/// `Pending` yet. It only matters to authorization and has no transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[serde(rename = "new lead")]
    NewLead,
    Pending,
    Login,
    Approved,
    Rejected,
    Disbursed,
    Closed,
    Expired,
}

impl LeadStatus {
    /// Every status, pseudo-initial one included.
    pub const ALL: [LeadStatus; 8] = [
        LeadStatus::NewLead,
        LeadStatus::Pending,
        LeadStatus::Login,
        LeadStatus::Approved,
        LeadStatus::Rejected,
        LeadStatus::Disbursed,
        LeadStatus::Closed,
        LeadStatus::Expired,
    ];

    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::NewLead => "new lead",
            LeadStatus::Pending => "pending",
            LeadStatus::Login => "login",
            LeadStatus::Approved => "approved",
            LeadStatus::Rejected => "rejected",
            LeadStatus::Disbursed => "disbursed",
            LeadStatus::Closed => "closed",
            LeadStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized lead status '{0}'")]
pub struct StatusParseError(pub String);

impl FromStr for LeadStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == name)
            .ok_or_else(|| StatusParseError(s.to_string()))
    }
}

/// Role of the portal user asking for a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Partner,
    Associate,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::Partner, Role::Associate];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Partner => "partner",
            Role::Associate => "associate",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized role '{0}'")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == name)
            .ok_or_else(|| RoleParseError(s.to_string()))
    }
}

/// Lead state as the lead service hands it over, before any flags are derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadRecord {
    pub status: LeadStatus,
    pub lender_name: Option<String>,
    pub manager_id: Option<String>,
    pub disbursement_ref: Option<String>,
    /// Unix seconds of the last status change.
    pub status_updated_at: Option<i64>,
}

/// The subset of lead state the lifecycle engine consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSnapshot {
    pub status: LeadStatus,
    pub lender_assigned: bool,
    pub manager_assigned: bool,
    pub disbursement_recorded: bool,
    /// Unix seconds of the last status change.
    pub status_updated_at: Option<i64>,
}

impl LeadSnapshot {
    /// Snapshot with every flag cleared.
    pub fn new(status: LeadStatus) -> Self {
        Self {
            status,
            lender_assigned: false,
            manager_assigned: false,
            disbursement_recorded: false,
            status_updated_at: None,
        }
    }

    /// Whole days since the last status change, relative to `now`.
    pub fn days_since_status_update(&self, now: i64) -> u32 {
        days_since(self.status_updated_at, now)
    }

    /// The disbursement flag disagrees with the status.
    ///
    /// Both directions are tolerated by the engine; callers may want to flag them.
    pub fn is_inconsistent(&self) -> bool {
        self.disbursement_recorded != (self.status == LeadStatus::Disbursed)
    }
}

/// Present and not blank.
fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl From<&LeadRecord> for LeadSnapshot {
    fn from(record: &LeadRecord) -> Self {
        Self {
            status: record.status,
            lender_assigned: is_set(&record.lender_name),
            manager_assigned: is_set(&record.manager_id),
            disbursement_recorded: is_set(&record.disbursement_ref),
            status_updated_at: record.status_updated_at,
        }
    }
}

/// Whole days elapsed from `updated_at` to `now`, both unix seconds.
///
/// Unknown update time maps to `u32::MAX` so any day-based window is closed.
/// An update time in the future counts as zero days.
pub fn days_since(updated_at: Option<i64>, now: i64) -> u32 {
    let Some(updated_at) = updated_at else {
        return u32::MAX;
    };
    let days = now.saturating_sub(updated_at).max(0) / SECONDS_PER_DAY;
    u32::try_from(days).unwrap_or(u32::MAX)
}
