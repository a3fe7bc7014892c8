//! Slash command definitions.

mod bank;
mod category;
mod food;
mod foods;
mod general;
mod kiss;
mod random;

pub use bank::bank;
pub use food::food;
pub use general::{length, ping};
pub use kiss::kiss;

use crate::errors::Error;

/// Text shown to the user when a flow operation fails. Validation failures
/// carry their own wording; anything else stays generic and is only logged.
pub(crate) fn describe_error(error: &Error) -> String {
    match error {
        Error::DuplicateName { .. } | Error::InvalidUpload { .. } | Error::Config { .. } => {
            error.to_string()
        }
        Error::NotFound { what, .. } => format!("That {what} no longer exists."),
        _ => "Something went wrong. Please try again.".to_string(),
    }
}
