//! Database query modules.

pub mod responses;
pub mod surveys;
