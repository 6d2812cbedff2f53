//! Client-area override for frameless windows
//!
//! Answers the platform's "how much of this rectangle is content" query.
//! The sizing border stays reserved on the left, right and bottom so native
//! resizing keeps working, while the top edge is handed to the content so
//! no caption is drawn.

use crate::domain::core::{Insets, Rect};
use crate::domain::dpi::FrameMetrics;

/// Insets to remove from the proposed window rectangle.
///
/// A maximized window is positioned partly off-screen by the platform, so
/// the top additionally gives up `padding` to keep content from clipping.
pub fn client_insets(metrics: FrameMetrics, maximized: bool) -> Insets {
    let side = metrics.frame_x + metrics.padding;
    Insets {
        left: side,
        top: if maximized { metrics.padding } else { 0 },
        right: side,
        bottom: metrics.frame_y + metrics.padding,
    }
}

/// Computes the client rectangle for a proposed window rectangle.
///
/// Without metrics (monitor information unavailable) the client area is
/// the whole window rectangle.
pub fn adjust_client_rect(proposed: Rect, metrics: Option<FrameMetrics>, maximized: bool) -> Rect {
    match metrics {
        Some(metrics) => proposed.inset(client_insets(metrics, maximized)),
        None => proposed,
    }
}
