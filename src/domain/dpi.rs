//! DPI scaling for fixed chrome measurements
//!
//! Frame thickness and padded-border values are queried from the platform
//! at the reference DPI (96), so they are unscaled. Everything the chrome algorithms
//! compare against cursor positions or client rectangles must first be
//! scaled to the DPI of the monitor hosting the window.

/// Reference DPI at which unscaled measurements are expressed
pub const REFERENCE_DPI: u32 = 96;

/// Dots-per-inch of the monitor currently hosting a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorDpi {
    pub x: u32,
    pub y: u32,
}

impl MonitorDpi {
    pub const REFERENCE: MonitorDpi = MonitorDpi {
        x: REFERENCE_DPI,
        y: REFERENCE_DPI,
    };

    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl Default for MonitorDpi {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Scale a pixel value defined at 96 DPI to `dpi`.
pub fn scale_with_dpi(px: i32, dpi: u32) -> i32 {
    (px as i64 * dpi as i64 / REFERENCE_DPI as i64) as i32
}

/// Unscaled frame measurements as reported by the platform's system metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemFrameMetrics {
    /// Horizontal sizing-border thickness
    pub frame_x: i32,
    /// Vertical sizing-border thickness
    pub frame_y: i32,
    /// Extra padding around the sizing border
    pub padded_border: i32,
}

impl SystemFrameMetrics {
    /// Values Windows 10/11 report at 96 DPI with default settings
    pub const WINDOWS_DEFAULT: SystemFrameMetrics = SystemFrameMetrics {
        frame_x: 4,
        frame_y: 4,
        padded_border: 4,
    };

    /// Applies the monitor DPI to every measurement.
    ///
    /// Padding follows the horizontal DPI; the platform only exposes a
    /// single padded-border metric.
    pub fn scaled(&self, dpi: MonitorDpi) -> FrameMetrics {
        FrameMetrics {
            frame_x: scale_with_dpi(self.frame_x, dpi.x),
            frame_y: scale_with_dpi(self.frame_y, dpi.y),
            padding: scale_with_dpi(self.padded_border, dpi.x),
        }
    }
}

/// Frame measurements already scaled to a monitor's DPI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMetrics {
    pub frame_x: i32,
    pub frame_y: i32,
    pub padding: i32,
}

impl FrameMetrics {
    /// Height of the band along the top edge that acts as a resize handle
    pub fn top_resize_band(&self) -> i32 {
        self.frame_y + self.padding
    }
}
