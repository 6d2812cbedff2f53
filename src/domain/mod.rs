//! Domain logic and core data structures
//!
//! Pure window-chrome algorithms that are independent of Win32 APIs and
//! can be exercised without a running windowing system.

pub mod core;
pub mod dpi;
pub mod frame;
pub mod geometry;
pub mod hit_test;
