//! MTA deployer library
//!
//! Uploads multi-target app archives to a deploy service, starts deploy
//! processes and follows them to completion.

pub mod app;
pub mod backend;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod storage;
pub mod terminal;
pub mod utils;
