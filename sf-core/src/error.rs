//! Error types re-exported from sf-error

pub use sf_error::{ErrorKind, Result, SynofanError};
