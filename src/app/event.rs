//! Typed window-system events and dispatch results
//!
//! Backends translate raw platform messages into [`WindowEvent`] before the
//! controller sees them, and translate [`EventResult`] back into whatever
//! return value the platform expects.

use crate::domain::core::{Point, Rect};
use crate::domain::dpi::MonitorDpi;
use crate::domain::hit_test::HitRegion;

/// An inbound notification from the windowing system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// The native window finished construction
    Created,
    /// Left mouse button pressed over the non-client area
    NonClientLeftButtonDown,
    /// The window has moved
    Moved,
    /// The window is being dragged
    Moving,
    /// The window now sits on a monitor with a different DPI
    DpiChanged {
        dpi: MonitorDpi,
        /// Placement suggested by the platform for the new scale
        suggested: Rect,
    },
    /// "What does this point represent", in screen coordinates
    HitTest { cursor: Point },
    /// "How much of this rectangle is content"
    ///
    /// `in_place` is true when the platform supplies a rectangle it expects
    /// to be adjusted and handed back.
    CalculateFrame { proposed: Rect, in_place: bool },
    /// The native window is being torn down
    Destroyed,
    /// Any message this layer does not interpret, identified by its raw id
    Other(u32),
}

/// The value returned to the platform for a handled event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Answer to a hit test
    Hit(HitRegion),
    /// Answer to a frame calculation: the adjusted content rectangle
    ClientArea(Rect),
}

/// Outcome of dispatching one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// The controller overrode default behavior
    Handled(Reply),
    /// Let the platform's default handling run
    Unhandled,
}
