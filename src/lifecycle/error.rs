//! Error types for status-change validation.

use thiserror::Error;

use super::FieldKey;
use crate::amount::AmountError;
use crate::model::LeadStatus;

/// Reason a [`TransitionRequest`](super::TransitionRequest) was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("lead is already {0}")]
    NoChange(LeadStatus),

    #[error("cannot move a lead from {from} to {to}")]
    IllegalTransition { from: LeadStatus, to: LeadStatus },

    #[error("comment is required")]
    MissingComment,

    #[error("{0} is required")]
    MissingRequiredField(FieldKey),
}

/// Top-level error returned by [`TransitionRequest::submit`](super::TransitionRequest::submit).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("approved amount: {0}")]
    Amount(#[from] AmountError),
}
