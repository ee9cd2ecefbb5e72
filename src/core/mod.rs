//! Core module containing field names, parameter sets, guards and errors

pub mod error;
pub mod field;
pub mod guard;
pub mod params;

pub use error::{ErrorKind, MissingParameterError, ParamsError};
pub use field::{FieldName, humanize, normalize};
pub use guard::{AllowGuard, Guard, GuardOutcome, RequireGuard};
pub use params::{DefaultPolicy, ParameterSet, is_blank};
