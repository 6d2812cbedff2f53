//! Chrome handlers
//!
//! Glue between the pure chrome algorithms in `domain` and a live platform
//! window. Every function here is total: when the platform cannot answer a
//! query the handler falls back to a degraded but valid result.

use tracing::debug;

use crate::domain::core::{Point, Rect};
use crate::domain::dpi::{FrameMetrics, MonitorDpi};
use crate::domain::frame;
use crate::domain::hit_test::{self, HitRegion, TopEdgeProbe};
use crate::platform::{Feature, Platform, PlatformError, WindowHandle, WindowStyle};

/// Frame metrics scaled to the monitor hosting `window`.
///
/// `None` when monitor information is unavailable. A failed DPI query
/// alone falls back to the reference DPI.
pub fn scaled_frame_metrics<P: Platform>(platform: &P, window: WindowHandle) -> Option<FrameMetrics> {
    let dpi = match platform.monitor_dpi(window) {
        Ok(dpi) => dpi,
        Err(PlatformError::FeatureUnavailable(Feature::Dpi)) => {
            debug!(event = "window.dpi_unavailable", ?window);
            MonitorDpi::REFERENCE
        }
        Err(error) => {
            debug!(event = "window.monitor_info_unavailable", ?window, error = %error);
            return None;
        }
    };
    Some(platform.system_frame_metrics().scaled(dpi))
}

/// Answers a hit-test query for a frameless window.
pub fn classify_hit<P: Platform>(platform: &P, window: WindowHandle, cursor: Point) -> HitRegion {
    let default = platform.default_hit_test(window, cursor);

    hit_test::classify(default, || {
        // Without a sizing border there is no top edge to restore
        if !platform.style(window).contains(WindowStyle::THICK_FRAME) {
            return None;
        }
        let metrics = scaled_frame_metrics(platform, window)?;
        let client = match platform.screen_to_client(window, cursor) {
            Ok(point) => point,
            Err(error) => {
                debug!(event = "window.cursor_mapping_failed", ?window, error = %error);
                return None;
            }
        };
        Some(TopEdgeProbe {
            client_y: client.y,
            metrics,
        })
    })
}

/// Answers an in-place frame calculation for a frameless window.
pub fn calculate_client_area<P: Platform>(platform: &P, window: WindowHandle, proposed: Rect) -> Rect {
    let style = platform.style(window);
    if !style.contains(WindowStyle::THICK_FRAME) {
        return proposed;
    }

    let metrics = scaled_frame_metrics(platform, window);
    frame::adjust_client_rect(proposed, metrics, style.contains(WindowStyle::MAXIMIZED))
}

/// Moves the window to the placement the platform suggested for the new
/// DPI. Size constraints are left alone.
pub fn apply_dpi_change<P: Platform>(platform: &P, window: WindowHandle, dpi: MonitorDpi, suggested: Rect) {
    debug!(
        event = "window.dpi_changed",
        ?window,
        dpi_x = dpi.x,
        dpi_y = dpi.y,
        ?suggested
    );
    platform.set_bounds(window, suggested);
}
