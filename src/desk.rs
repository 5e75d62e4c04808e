//! Caller-side driver for the lifecycle engine.
//!
//! The desk takes lead commands one at a time, asks the pure engine for a
//! decision, logs it and keeps the outcome in arrival order. It also accepts an
//! async stream of commands.

use thiserror::Error;
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::authz::{self, Action};
use crate::lifecycle::{StatusChange, SubmitError, TransitionRequest};
use crate::model::{LeadId, LeadSnapshot, LeadStatus, Role};

/// Input of the desk.
#[derive(Debug, Clone)]
pub enum Command {
    /// Compute the row menu of a lead for a role.
    Menu {
        lead: LeadId,
        role: Role,
        snapshot: LeadSnapshot,
    },
    /// Check a status change and build the command for the lead service.
    ChangeStatus {
        lead: LeadId,
        request: TransitionRequest,
    },
}

/// Decision recorded for one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Menu {
        lead: LeadId,
        actions: Vec<Action>,
    },
    StatusChanged {
        lead: LeadId,
        change: StatusChange,
    },
    StatusRefused {
        lead: LeadId,
        from: LeadStatus,
        to: LeadStatus,
        error: SubmitError,
    },
}

impl Outcome {
    pub fn lead(&self) -> &str {
        match self {
            Outcome::Menu { lead, .. }
            | Outcome::StatusChanged { lead, .. }
            | Outcome::StatusRefused { lead, .. } => lead,
        }
    }
}

/// Error returned by [`Desk::apply`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("lead {lead}: {source}")]
pub struct DeskError {
    pub lead: LeadId,
    pub source: SubmitError,
}

pub struct Desk {
    /// Reference clock, unix seconds.
    now: i64,
    outcomes: Vec<Outcome>,
}

/// Public API
impl Desk {
    pub fn new(now: i64) -> Self {
        Self {
            now,
            outcomes: Vec::new(),
        }
    }

    /// Run the desk over a command stream until it ends
    pub async fn run(&mut self, mut stream: impl Stream<Item = Command> + Unpin) {
        while let Some(command) = stream.next().await {
            // a refused status change must not stop the batch
            let _ = self.apply(command);
        }
    }

    /// Outcomes in the order commands were applied.
    pub fn outcomes(&self) -> impl Iterator<Item = &Outcome> + '_ {
        self.outcomes.iter()
    }

    /// Apply a single command
    pub fn apply(&mut self, command: Command) -> Result<(), DeskError> {
        match command {
            Command::Menu {
                lead,
                role,
                snapshot,
            } => {
                let actions = self.menu(&lead, role, &snapshot);
                self.outcomes.push(Outcome::Menu { lead, actions });
                Ok(())
            }
            Command::ChangeStatus { lead, request } => {
                let result = request.submit();
                Self::log_result(&lead, &request, &result);
                match result {
                    Ok(change) => {
                        self.outcomes.push(Outcome::StatusChanged { lead, change });
                        Ok(())
                    }
                    Err(error) => {
                        self.outcomes.push(Outcome::StatusRefused {
                            lead: lead.clone(),
                            from: request.from,
                            to: request.to,
                            error: error.clone(),
                        });
                        Err(DeskError {
                            lead,
                            source: error,
                        })
                    }
                }
            }
        }
    }
}

/// Private API
impl Desk {
    fn menu(&self, lead: &str, role: Role, snapshot: &LeadSnapshot) -> Vec<Action> {
        if snapshot.is_inconsistent() {
            warn!(
                lead,
                status = %snapshot.status,
                disbursement_recorded = snapshot.disbursement_recorded,
                "disbursement record does not match lead status"
            );
        }

        let days = snapshot.days_since_status_update(self.now);
        let actions = authz::authorize(role, snapshot, days);
        info!(
            lead,
            role = %role,
            status = %snapshot.status,
            actions = actions.len(),
            "menu computed"
        );
        actions
    }

    /// Small helper to log `submit` results
    fn log_result(lead: &str, request: &TransitionRequest, result: &Result<StatusChange, SubmitError>) {
        match result {
            Ok(_) => {
                info!(
                    lead,
                    from = %request.from,
                    to = %request.to,
                    "status change applied"
                );
            }
            Err(e) => {
                info!(
                    lead,
                    from = %request.from,
                    to = %request.to,
                    reason = %e,
                    "status change rejected"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::ActionKey;
    use crate::lifecycle::{StatusPayload, ValidationError};

    const DAY: i64 = 86_400;

    fn menu(lead: &str, role: Role, snapshot: LeadSnapshot) -> Command {
        Command::Menu {
            lead: lead.to_string(),
            role,
            snapshot,
        }
    }

    fn change(lead: &str, request: TransitionRequest) -> Command {
        Command::ChangeStatus {
            lead: lead.to_string(),
            request,
        }
    }

    fn pending_since(updated_at: i64) -> LeadSnapshot {
        LeadSnapshot {
            lender_assigned: true,
            status_updated_at: Some(updated_at),
            ..LeadSnapshot::new(LeadStatus::Pending)
        }
    }

    fn menu_keys(outcome: &Outcome) -> Vec<ActionKey> {
        match outcome {
            Outcome::Menu { actions, .. } => actions.iter().map(|a| a.key).collect(),
            other => panic!("expected menu, got {other:?}"),
        }
    }

    #[test]
    fn new_desk_has_no_outcomes() {
        let desk = Desk::new(0);
        assert_eq!(desk.outcomes().count(), 0);
    }

    #[test]
    fn menu_uses_injected_clock() {
        let now = 100 * DAY;
        let mut desk = Desk::new(now);
        desk.apply(menu("L1", Role::Manager, pending_since(now - 10 * DAY)))
            .unwrap();
        desk.apply(menu("L2", Role::Manager, pending_since(now - 40 * DAY)))
            .unwrap();

        let outcomes: Vec<_> = desk.outcomes().collect();
        assert!(menu_keys(outcomes[0]).contains(&ActionKey::Edit));
        assert!(!menu_keys(outcomes[1]).contains(&ActionKey::Edit));
    }

    #[test]
    fn menu_without_update_time_closes_edit_window() {
        let mut desk = Desk::new(0);
        let snapshot = LeadSnapshot {
            status_updated_at: None,
            ..pending_since(0)
        };
        desk.apply(menu("L1", Role::Manager, snapshot)).unwrap();
        let outcome = desk.outcomes().next().unwrap();
        assert!(!menu_keys(outcome).contains(&ActionKey::Edit));
    }

    #[test]
    fn accepted_change_is_recorded() {
        let mut desk = Desk::new(0);
        let request = TransitionRequest::new(LeadStatus::Login, LeadStatus::Approved, "ok")
            .with_approved_amount("50000");
        desk.apply(change("L9", request)).unwrap();

        match desk.outcomes().next().unwrap() {
            Outcome::StatusChanged { lead, change } => {
                assert_eq!(lead, "L9");
                assert!(matches!(change.payload, StatusPayload::Approved { .. }));
            }
            other => panic!("expected change, got {other:?}"),
        }
    }

    #[test]
    fn refused_change_returns_error_and_is_recorded() {
        let mut desk = Desk::new(0);
        let request = TransitionRequest::new(LeadStatus::Closed, LeadStatus::Login, "reopen");
        let err = desk.apply(change("L3", request)).unwrap_err();

        let expected = SubmitError::Validation(ValidationError::IllegalTransition {
            from: LeadStatus::Closed,
            to: LeadStatus::Login,
        });
        assert_eq!(err.lead, "L3");
        assert_eq!(err.source, expected);
        assert_eq!(
            desk.outcomes().next(),
            Some(&Outcome::StatusRefused {
                lead: "L3".to_string(),
                from: LeadStatus::Closed,
                to: LeadStatus::Login,
                error: expected,
            })
        );
    }

    #[tokio::test]
    async fn run_processes_all_commands_in_order() {
        let mut desk = Desk::new(0);
        let commands = vec![
            menu("A", Role::Admin, pending_since(0)),
            change(
                "B",
                TransitionRequest::new(LeadStatus::Pending, LeadStatus::Login, "docs in"),
            ),
            menu("C", Role::Partner, LeadSnapshot::new(LeadStatus::NewLead)),
        ];

        desk.run(tokio_stream::iter(commands)).await;

        let leads: Vec<_> = desk.outcomes().map(Outcome::lead).collect();
        assert_eq!(leads, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn run_continues_after_refused_change() {
        let mut desk = Desk::new(0);
        let commands = vec![
            change(
                "A",
                TransitionRequest::new(LeadStatus::Login, LeadStatus::Rejected, "no"),
            ),
            change(
                "B",
                TransitionRequest::new(LeadStatus::Expired, LeadStatus::Login, "revived"),
            ),
        ];

        desk.run(tokio_stream::iter(commands)).await;

        let outcomes: Vec<_> = desk.outcomes().collect();
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], Outcome::StatusRefused { .. }));
        assert!(matches!(outcomes[1], Outcome::StatusChanged { .. }));
    }
}
