//! Deploy service REST client

pub mod backend;
pub mod client;
pub mod files;
pub mod operations;
