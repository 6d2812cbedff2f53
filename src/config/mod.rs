//! Window configuration
//!
//! `WindowOptions` describe how a window is built. They can be constructed
//! in code or loaded from a TOML file.

pub mod options;

pub use options::{ConfigError, WindowOptions, load_options};
