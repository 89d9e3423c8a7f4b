//! Module for the error management
use thiserror::Error;

/// An error that can occur when handling feed entity values.
#[derive(Error, Debug)]
pub enum Error {
    /// The date is not a valid calendar date, in `YYYYMMDD` digit-string or `YYYY-MM-DD` form
    #[error("'{0}' is not a valid date; YYYYMMDD or YYYY-MM-DD format is expected.")]
    InvalidDate(String),
    /// The time is not given in the HH:MM:SS format
    #[error("'{0}' is not a valid time; HH:MM:SS format is expected.")]
    InvalidTime(String),
}
