//! Lead status state machine.
//!
//! Holds the fixed transition graph between lead statuses, the extra fields
//! each target status asks for, and validation of a status-change request.
//! Everything here is a pure lookup over constant tables.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount::{Amount, AmountError};
use crate::model::LeadStatus;

mod error;
pub use error::{SubmitError, ValidationError};

use LeadStatus::*;

/// Legal targets per source status. `NewLead` is not part of the graph.
///
/// The graph is asymmetric on purpose: `approved -> rejected` exists,
/// `rejected -> login` does not.
const TRANSITIONS: &[(LeadStatus, &[LeadStatus])] = &[
    (Pending, &[Login, Closed]),
    (Login, &[Approved, Rejected, Closed]),
    (Approved, &[Disbursed, Closed, Rejected]),
    (Rejected, &[Approved, Closed]),
    (Disbursed, &[Closed]),
    (Closed, &[]),
    (Expired, &[Login]),
];

/// Input field a status change may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    Comment,
    RejectReason,
    RejectProof,
    ApprovedAmount,
    CloseReason,
}

impl FieldKey {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Comment => "comment",
            FieldKey::RejectReason => "rejectReason",
            FieldKey::RejectProof => "rejectProof",
            FieldKey::ApprovedAmount => "approvedAmount",
            FieldKey::CloseReason => "closeReason",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statuses reachable in one step from `from`. Empty for terminal statuses and `NewLead`.
pub fn legal_targets(from: LeadStatus) -> &'static [LeadStatus] {
    TRANSITIONS
        .iter()
        .find(|(status, _)| *status == from)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

/// Like [`legal_targets`] for a raw status name. Unrecognized names have no targets.
pub fn legal_targets_by_name(from: &str) -> &'static [LeadStatus] {
    from.parse().map(legal_targets).unwrap_or(&[])
}

/// `true` for statuses inside the graph that have no way out.
pub fn is_terminal(status: LeadStatus) -> bool {
    TRANSITIONS
        .iter()
        .any(|(from, targets)| *from == status && targets.is_empty())
}

/// Fields that must be filled in when moving a lead to `to`.
///
/// The comment is required for every change; it is checked on its own by
/// [`validate`] and only listed here for targets without a dedicated field.
pub fn required_fields(to: LeadStatus) -> &'static [FieldKey] {
    match to {
        Rejected => &[FieldKey::RejectReason],
        Approved => &[FieldKey::ApprovedAmount],
        Closed => &[FieldKey::CloseReason],
        _ => &[FieldKey::Comment],
    }
}

/// Like [`required_fields`] for a raw status name. Unrecognized names need no extra fields.
pub fn required_fields_by_name(to: &str) -> &'static [FieldKey] {
    to.parse().map(required_fields).unwrap_or(&[])
}

/// Fields the form may offer for `to` without requiring them.
pub fn optional_fields(to: LeadStatus) -> &'static [FieldKey] {
    match to {
        Rejected => &[FieldKey::RejectProof],
        _ => &[],
    }
}

/// A status change as entered by the user, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub from: LeadStatus,
    pub to: LeadStatus,
    pub comment: String,
    pub reject_reason: Option<String>,
    /// Reference to an uploaded rejection proof document.
    pub reject_proof: Option<String>,
    /// Raw approved amount as typed, parsed on submit.
    pub approved_amount: Option<String>,
    pub close_reason: Option<String>,
}

impl TransitionRequest {
    pub fn new(from: LeadStatus, to: LeadStatus, comment: impl Into<String>) -> Self {
        Self {
            from,
            to,
            comment: comment.into(),
            reject_reason: None,
            reject_proof: None,
            approved_amount: None,
            close_reason: None,
        }
    }

    pub fn with_reject_reason(mut self, reason: impl Into<String>) -> Self {
        self.reject_reason = Some(reason.into());
        self
    }

    pub fn with_reject_proof(mut self, proof: impl Into<String>) -> Self {
        self.reject_proof = Some(proof.into());
        self
    }

    pub fn with_approved_amount(mut self, amount: impl Into<String>) -> Self {
        self.approved_amount = Some(amount.into());
        self
    }

    pub fn with_close_reason(mut self, reason: impl Into<String>) -> Self {
        self.close_reason = Some(reason.into());
        self
    }

    /// Value of `field`, if present and not blank.
    pub fn field(&self, field: FieldKey) -> Option<&str> {
        let value = match field {
            FieldKey::Comment => Some(self.comment.as_str()),
            FieldKey::RejectReason => self.reject_reason.as_deref(),
            FieldKey::RejectProof => self.reject_proof.as_deref(),
            FieldKey::ApprovedAmount => self.approved_amount.as_deref(),
            FieldKey::CloseReason => self.close_reason.as_deref(),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    /// Validate, then turn the request into a typed [`StatusChange`] for the lead service.
    pub fn submit(&self) -> Result<StatusChange, SubmitError> {
        validate(self)?;

        // validate guarantees every required field is present
        let required = |field| self.field(field).unwrap_or_default().to_string();
        let payload = match self.to {
            Rejected => StatusPayload::Rejected {
                reason: required(FieldKey::RejectReason),
                proof: self.field(FieldKey::RejectProof).map(str::to_string),
            },
            Approved => {
                let amount: Amount = required(FieldKey::ApprovedAmount).parse()?;
                if !amount.is_positive() {
                    return Err(AmountError::NotPositive.into());
                }
                StatusPayload::Approved { amount }
            }
            Closed => StatusPayload::Closed {
                reason: required(FieldKey::CloseReason),
            },
            _ => StatusPayload::Advanced,
        };

        Ok(StatusChange {
            from: self.from,
            to: self.to,
            comment: self.comment.trim().to_string(),
            payload,
        })
    }
}

/// Status-specific data of an accepted status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusPayload {
    Rejected { reason: String, proof: Option<String> },
    Approved { amount: Amount },
    Closed { reason: String },
    /// Plain move forward, nothing beyond the comment.
    Advanced,
}

/// A validated status change, ready to hand to the lead update service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: LeadStatus,
    pub to: LeadStatus,
    pub comment: String,
    pub payload: StatusPayload,
}

/// Check a status change request:
/// - target differs from the current status
/// - target is reachable from the current status
/// - comment is filled in
/// - every status-specific required field is filled in
pub fn validate(request: &TransitionRequest) -> Result<(), ValidationError> {
    if request.to == request.from {
        return Err(ValidationError::NoChange(request.from));
    }

    if !legal_targets(request.from).contains(&request.to) {
        return Err(ValidationError::IllegalTransition {
            from: request.from,
            to: request.to,
        });
    }

    if request.field(FieldKey::Comment).is_none() {
        return Err(ValidationError::MissingComment);
    }

    if let Some(missing) = required_fields(request.to)
        .iter()
        .find(|field| request.field(**field).is_none())
    {
        return Err(ValidationError::MissingRequiredField(*missing));
    }

    Ok(())
}
