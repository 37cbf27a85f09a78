//! # libswitch Core Library
//!
//! This crate contains the switching engine behind the `libswitch` tool: it flips a project's
//! dependencies between a local checkout (`file:../my-lib`) and the published package, and keeps
//! the `compilerOptions.paths` aliases in `tsconfig.json` pointing at the right place.
//!
//! The libraries under control are declared in the project's `package.json`:
//!
//! ```json
//! {
//!   "libswitch": [
//!     { "name": "ui-kit", "local": "file:../ui-kit", "remote": "ui-kit@^2", "alias": "src/index.ts" }
//!   ]
//! }
//! ```
//!
//! ## Modules Overview
//! - [`manifest`] – Reading and reloading `package.json`
//! - [`registry`] – The validated list of managed libraries
//! - [`mode`] – Deriving local/remote mode from the manifest
//! - [`installer`] – Running the external package manager
//! - [`alias`] – Synchronizing path aliases in the alias file
//! - [`switcher`] – The [`Libswitch`] engine tying it all together
//! - [`global`] – User-wide settings (installer command, alias file)
//! - [`error`] – The [`SwitchError`] taxonomy


pub mod error;
pub mod manifest;
pub mod registry;
pub mod mode;
pub mod util;
pub mod installer;
pub mod alias;
pub mod switcher;
pub mod global;

pub use error::*;
pub use manifest::*;
pub use registry::*;
pub use mode::Mode;
pub use installer::*;
pub use alias::{AliasMapping, AliasSync};
pub use switcher::*;
pub use global::config::Settings;
