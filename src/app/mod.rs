//! Window orchestration layer
//!
//! The controller owns one native window, answers the platform's events
//! with the chrome handlers and keeps the geometry state in sync.

pub mod chrome;
pub mod controller;
pub mod event;
pub mod listener;

pub use controller::{WindowController, WindowError};
pub use event::{EventResult, Reply, WindowEvent};
pub use listener::PositionListener;
