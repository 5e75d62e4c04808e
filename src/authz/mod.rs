//! Lead-row action authorization.
//!
//! Starts from the full action menu and removes entries through a fixed
//! pipeline of named rules: universal rules first, then the rules registered
//! for the caller's role. A rule only ever removes actions, so the outcome of
//! overlapping rules does not depend on anything but the inputs.

use crate::model::{LeadSnapshot, LeadStatus, Role};

mod action;
pub use action::{Action, ActionKey, ActionSet};

use ActionKey::*;

/// Days after the last status change during which a manager may still edit a pending lead.
pub const MANAGER_EDIT_WINDOW_DAYS: u32 = 30;

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub role: Role,
    pub lead: LeadSnapshot,
    pub days_since_status_update: u32,
}

/// A named filter: removes `hides` from the menu whenever `when` holds.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub hides: &'static [ActionKey],
    pub when: fn(&Context) -> bool,
}

impl Rule {
    pub fn applies(&self, ctx: &Context) -> bool {
        (self.when)(ctx)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("hides", &self.hides)
            .finish()
    }
}

/// Applied to every role, before the role rules.
const UNIVERSAL_RULES: &[Rule] = &[
    Rule {
        name: "disbursement-needs-disbursed-status",
        hides: &[Disbursement],
        when: not_disbursed,
    },
    // redundant for partner and associate, whose own rules drop `status`
    Rule {
        name: "status-needs-lender",
        hides: &[Status],
        when: back_office_without_lender,
    },
    Rule {
        name: "status-needs-mid-flow-lead",
        hides: &[Status],
        when: not_mid_flow,
    },
];

const ADMIN_RULES: &[Rule] = &[Rule {
    name: "admin-disbursement-needs-disbursed-status",
    hides: &[Disbursement],
    when: not_disbursed,
}];

const MANAGER_RULES: &[Rule] = &[
    Rule {
        name: "manager-never-deletes-or-assigns",
        hides: &[Delete, Assign],
        when: always,
    },
    Rule {
        name: "manager-records-disbursement-once",
        hides: &[Disbursement],
        when: disbursement_not_pending_record,
    },
    Rule {
        name: "manager-status-frozen-once-disbursed",
        hides: &[Status],
        when: is_disbursed,
    },
    Rule {
        name: "manager-edit-window",
        hides: &[Edit],
        when: outside_edit_window,
    },
];

/// Shared by partner and associate.
const ORIGINATOR_RULES: &[Rule] = &[
    Rule {
        name: "originator-has-no-back-office-actions",
        hides: &[Duplicate, Assign, Status, Disbursement],
        when: always,
    },
    Rule {
        name: "originator-edits-new-leads-only",
        hides: &[Edit, Delete],
        when: not_new_lead,
    },
    Rule {
        name: "originator-loses-edit-once-managed",
        hides: &[Edit, Delete],
        when: manager_assigned,
    },
];

/// Role rule registry. Adding a role means adding one entry here.
const ROLE_RULES: &[(Role, &[Rule])] = &[
    (Role::Admin, ADMIN_RULES),
    (Role::Manager, MANAGER_RULES),
    (Role::Partner, ORIGINATOR_RULES),
    (Role::Associate, ORIGINATOR_RULES),
];

fn always(_: &Context) -> bool {
    true
}

fn is_disbursed(ctx: &Context) -> bool {
    ctx.lead.status == LeadStatus::Disbursed
}

fn not_disbursed(ctx: &Context) -> bool {
    !is_disbursed(ctx)
}

fn back_office_without_lender(ctx: &Context) -> bool {
    matches!(ctx.role, Role::Admin | Role::Manager) && !ctx.lead.lender_assigned
}

fn not_mid_flow(ctx: &Context) -> bool {
    matches!(
        ctx.lead.status,
        LeadStatus::NewLead | LeadStatus::Closed | LeadStatus::Expired
    )
}

fn disbursement_not_pending_record(ctx: &Context) -> bool {
    !(is_disbursed(ctx) && !ctx.lead.disbursement_recorded)
}

fn outside_edit_window(ctx: &Context) -> bool {
    !(ctx.lead.status == LeadStatus::Pending
        && ctx.days_since_status_update <= MANAGER_EDIT_WINDOW_DAYS)
}

fn not_new_lead(ctx: &Context) -> bool {
    ctx.lead.status != LeadStatus::NewLead
}

fn manager_assigned(ctx: &Context) -> bool {
    ctx.lead.manager_assigned
}

/// Rules applied to every role, in application order.
pub fn universal_rules() -> &'static [Rule] {
    UNIVERSAL_RULES
}

/// Rules registered for `role`, in application order.
pub fn rules_for(role: Role) -> &'static [Rule] {
    ROLE_RULES
        .iter()
        .find(|(r, _)| *r == role)
        .map(|(_, rules)| *rules)
        .unwrap_or(&[])
}

/// Action keys left after running the whole pipeline.
pub fn permitted(role: Role, lead: &LeadSnapshot, days_since_status_update: u32) -> ActionSet {
    let ctx = Context {
        role,
        lead: *lead,
        days_since_status_update,
    };

    let mut actions = ActionSet::all();
    for rule in universal_rules().iter().chain(rules_for(role)) {
        if rule.applies(&ctx) {
            actions.remove_all(rule.hides);
        }
    }
    actions
}

/// Display label for `key` as seen by `role` on `lead`.
pub fn label(key: ActionKey, role: Role, lead: &LeadSnapshot) -> &'static str {
    match key {
        // managers only ever create the record, so never "Edit"
        Disbursement if role != Role::Manager && lead.disbursement_recorded => {
            "Edit Disbursement"
        }
        _ => key.default_label(),
    }
}

/// Ordered action menu for one lead row.
///
/// Never fails: an action that is not permitted is simply absent.
pub fn authorize(role: Role, lead: &LeadSnapshot, days_since_status_update: u32) -> Vec<Action> {
    permitted(role, lead, days_since_status_update)
        .iter()
        .map(|key| Action {
            key,
            label: label(key, role, lead),
        })
        .collect()
}
