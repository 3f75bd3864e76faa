//! Route handlers.

pub mod export;
pub mod live;
pub mod responses;
pub mod surveys;
