pub mod amount;
pub mod authz;
pub mod csv;
pub mod desk;
pub mod lifecycle;
pub mod model;

pub use amount::Amount;
pub use authz::{Action, ActionKey, authorize};
pub use desk::Desk;
pub use lifecycle::{
    FieldKey, TransitionRequest, ValidationError, legal_targets, required_fields, validate,
};
pub use model::{LeadSnapshot, LeadStatus, Role};
