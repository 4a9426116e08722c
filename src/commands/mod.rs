//! CLI command implementations.
//!
//! Available commands:
//! - **check**: Run the compliance checks over files and directories
//! - **init**: Write a default `.pycomply.toml`

pub mod check;
pub mod init;

pub use check::{check_project, CheckConfig};
pub use init::init_config;
