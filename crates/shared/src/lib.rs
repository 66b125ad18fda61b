//! Records exchanged with the change-point analytics API.

pub mod dates;
pub mod domain;
pub mod protocol;
