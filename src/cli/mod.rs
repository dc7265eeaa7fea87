//! CLI command implementations

pub mod activity;
pub mod init;
pub mod status;
pub mod sync;
