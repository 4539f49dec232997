//! Models shared between the rankings backend and its clients.

pub mod jobs;
pub mod model;
pub mod requests;
