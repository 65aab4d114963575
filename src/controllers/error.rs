use senselib_kernel::{ApiError, Id};
use thiserror::Error;

use super::validation::FieldErrors;

/// Failures surfaced by the list and form controllers.
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("field '{0}' is not sortable")]
    UnsortableField(String),

    #[error("{entity} {id} is referenced by {usage} records and cannot be deleted")]
    DeleteBlocked {
        entity: &'static str,
        id: Id,
        usage: u64,
    },

    #[error("status change already in progress for {0}")]
    ToggleInFlight(Id),

    #[error("{0} has no activation flag")]
    NotToggleable(&'static str),

    #[error("row {0} is not on the current page")]
    UnknownRow(Id),

    #[error("validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("cannot {action} while the form is {phase}")]
    InvalidPhase {
        action: &'static str,
        phase: &'static str,
    },

    #[error("entity '{0}' is not registered")]
    Unregistered(&'static str),
}
