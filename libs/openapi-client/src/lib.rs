//! Wire models for the MTA deploy service REST API.

pub mod models;

pub use models::*;
