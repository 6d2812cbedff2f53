//! Hit-test classification for frameless windows
//!
//! With the native caption suppressed the platform still knows where the
//! sizing border is on the left, right and bottom edges, because the window
//! keeps its thick-frame style. The top edge is different: the client area
//! now starts at the very first pixel row, so the platform reports "client"
//! there and the window can no longer be resized from the top. The
//! classifier keeps every edge the platform recognises and restores the
//! missing top band from DPI-scaled frame metrics.

use crate::domain::dpi::FrameMetrics;

/// What a point on a window represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitRegion {
    /// Outside the window or on a separator
    Nowhere,
    Caption,
    Client,
    ResizeTop,
    ResizeBottom,
    ResizeLeft,
    ResizeRight,
    ResizeTopLeft,
    ResizeTopRight,
    ResizeBottomLeft,
    ResizeBottomRight,
}

impl HitRegion {
    /// Returns true for the eight named sides and corners
    pub fn is_resize_edge(&self) -> bool {
        matches!(
            self,
            HitRegion::ResizeTop
                | HitRegion::ResizeBottom
                | HitRegion::ResizeLeft
                | HitRegion::ResizeRight
                | HitRegion::ResizeTopLeft
                | HitRegion::ResizeTopRight
                | HitRegion::ResizeBottomLeft
                | HitRegion::ResizeBottomRight
        )
    }
}

/// Location data the top-edge correction needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopEdgeProbe {
    /// Cursor offset from the top of the client area
    pub client_y: i32,
    /// Frame metrics scaled to the hosting monitor
    pub metrics: FrameMetrics,
}

/// Classifies a point on a frameless window.
///
/// `default` is the platform's own answer for the point. `probe` is only
/// evaluated when the correction is needed; returning `None` (monitor or
/// cursor information unavailable) yields [`HitRegion::Client`].
pub fn classify<F>(default: HitRegion, probe: F) -> HitRegion
where
    F: FnOnce() -> Option<TopEdgeProbe>,
{
    if default.is_resize_edge() {
        return default;
    }

    // Nowhere, Caption and Client all fall through to the top-band check
    match probe() {
        Some(probe) if in_top_band(probe) => HitRegion::ResizeTop,
        _ => HitRegion::Client,
    }
}

fn in_top_band(probe: TopEdgeProbe) -> bool {
    (0..probe.metrics.top_resize_band()).contains(&probe.client_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dpi::{MonitorDpi, SystemFrameMetrics};

    fn probe_at(client_y: i32, dpi: u32) -> Option<TopEdgeProbe> {
        Some(TopEdgeProbe {
            client_y,
            metrics: SystemFrameMetrics::WINDOWS_DEFAULT.scaled(MonitorDpi::new(dpi, dpi)),
        })
    }

    #[test]
    fn named_edges_are_returned_unchanged() {
        let edges = [
            HitRegion::ResizeTop,
            HitRegion::ResizeBottom,
            HitRegion::ResizeLeft,
            HitRegion::ResizeRight,
            HitRegion::ResizeTopLeft,
            HitRegion::ResizeTopRight,
            HitRegion::ResizeBottomLeft,
            HitRegion::ResizeBottomRight,
        ];

        for edge in edges {
            // A probe inside the top band must not override a corner
            assert_eq!(classify(edge, || probe_at(0, 96)), edge);
        }
    }

    #[test]
    fn probe_is_not_evaluated_for_edges() {
        let result = classify(HitRegion::ResizeLeft, || {
            panic!("probe must not run for a recognised edge")
        });
        assert_eq!(result, HitRegion::ResizeLeft);
    }

    #[test]
    fn top_band_becomes_top_resize_edge() {
        // 4px frame + 4px padding at 96 DPI
        for default in [HitRegion::Client, HitRegion::Caption, HitRegion::Nowhere] {
            assert_eq!(classify(default, || probe_at(0, 96)), HitRegion::ResizeTop);
            assert_eq!(classify(default, || probe_at(2, 96)), HitRegion::ResizeTop);
            assert_eq!(classify(default, || probe_at(7, 96)), HitRegion::ResizeTop);
            assert_eq!(classify(default, || probe_at(8, 96)), HitRegion::Client);
        }
    }

    #[test]
    fn top_band_scales_with_dpi() {
        // 192 DPI doubles the band to 16px
        assert_eq!(classify(HitRegion::Client, || probe_at(12, 192)), HitRegion::ResizeTop);
        assert_eq!(classify(HitRegion::Client, || probe_at(12, 96)), HitRegion::Client);
    }

    #[test]
    fn points_above_the_client_area_are_client() {
        assert_eq!(classify(HitRegion::Client, || probe_at(-1, 96)), HitRegion::Client);
    }

    #[test]
    fn missing_probe_defaults_to_client() {
        assert_eq!(classify(HitRegion::Caption, || None), HitRegion::Client);
        assert_eq!(classify(HitRegion::Nowhere, || None), HitRegion::Client);
    }
}
