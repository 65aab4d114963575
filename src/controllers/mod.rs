//! Generic list and detail-form controllers configured by entity descriptors.

pub mod detail;
pub mod error;
pub mod list;
pub mod validation;

pub use detail::{draft_payload, DetailForm, Draft, FormOutcome, FormPhase, FormState};
pub use error::ControllerError;
pub use list::{FetchOutcome, ListController, ListState, ListView};
pub use validation::{validate, FieldErrors, FORM_KEY};
