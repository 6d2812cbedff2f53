//! Frameless window chrome
//!
//! A top-level window controller that removes the platform title bar while
//! keeping native resizing, DPI-correct sizing borders, maximize behavior,
//! full-screen toggling and min/max size constraints.

pub mod app;
pub mod config;
pub mod domain;
pub mod logging;
pub mod platform;

pub use app::{WindowController, WindowError};
pub use config::WindowOptions;
