//! User-wide state: the global configuration directory and the settings
//! file stored in it.

pub mod utils;
pub mod config;
