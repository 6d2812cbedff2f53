//! Windowing-system backends
//!
//! The window controller talks to the windowing system only through the
//! [`Platform`] trait. Two backends implement it:
//!
//! - `win32` (Windows only): real native windows via the Win32 API
//! - `headless`: an in-memory simulation used by tests and on hosts
//!   without a frameless-capable windowing system

use std::fmt;
use std::rc::Weak;

use bitflags::bitflags;
use thiserror::Error;

use crate::app::event::{EventResult, WindowEvent};
use crate::domain::core::{Point, Rect, Size};
use crate::domain::dpi::{MonitorDpi, SystemFrameMetrics};
use crate::domain::geometry::SizeConstraints;
use crate::domain::hit_test::HitRegion;

pub mod headless;
#[cfg(windows)]
pub mod win32;

pub use headless::HeadlessPlatform;
#[cfg(windows)]
pub use win32::Win32Platform;

/// Opaque identifier of a native window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

bitflags! {
    /// Window style bits the controller chooses at creation time
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WindowStyle: u32 {
        const THICK_FRAME = 1 << 0;
        const SYSTEM_MENU = 1 << 1;
        const MINIMIZE_BOX = 1 << 2;
        const MAXIMIZE_BOX = 1 << 3;
        /// Reported by backends, never requested
        const MAXIMIZED = 1 << 4;
    }

    /// Extended style bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExtendedStyle: u32 {
        const TOPMOST = 1 << 0;
        const APP_WINDOW = 1 << 1;
        const CONTROL_PARENT = 1 << 2;
        /// Composited without a redirection surface, for translucency
        const NO_REDIRECTION_BITMAP = 1 << 3;
    }
}

/// Everything a backend needs to allocate a native window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDescriptor {
    pub title: String,
    pub size: Size,
    pub style: WindowStyle,
    pub ex_style: ExtendedStyle,
    /// Paint no background so composited content shows through
    pub transparent_background: bool,
}

/// Optional platform features that may be unavailable at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Icon,
    MonitorInfo,
    Dpi,
    CursorMapping,
    Placement,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Icon => write!(f, "application icon"),
            Feature::MonitorInfo => write!(f, "monitor information"),
            Feature::Dpi => write!(f, "monitor DPI"),
            Feature::CursorMapping => write!(f, "screen-to-client mapping"),
            Feature::Placement => write!(f, "window placement"),
        }
    }
}

/// Platform errors
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Failed to initialize windowing platform: {0}")]
    InitializationFailed(String),

    #[error("Failed to register window class")]
    ClassRegistrationFailed,

    #[error("Failed to create native window: {0}")]
    CreationFailed(String),

    #[error("{0} is unavailable")]
    FeatureUnavailable(Feature),
}

/// Receives events the platform delivers for one window
///
/// Called synchronously on the event-loop thread, possibly re-entrantly
/// when handling one event causes the platform to send another.
pub trait EventHandler {
    fn handle_event(&self, event: WindowEvent) -> EventResult;
}

/// Capability interface of a windowing system that supports frameless
/// windows.
///
/// All methods take `&self`: backends run on a single thread and may be
/// re-entered from inside their own event dispatch.
pub trait Platform {
    /// Allocates a native window. The only fallible call that is fatal.
    fn create_window(
        &self,
        descriptor: &WindowDescriptor,
        parent: Option<WindowHandle>,
    ) -> Result<WindowHandle, PlatformError>;

    /// Routes the window's events to `handler` from now on.
    fn attach_handler(&self, window: WindowHandle, handler: Weak<dyn EventHandler>);

    fn destroy_window(&self, window: WindowHandle);

    fn show_window(&self, window: WindowHandle);

    /// Blocks dispatching events until [`Platform::request_exit`] is called.
    fn run_event_loop(&self) -> i32;

    fn request_exit(&self, exit_code: i32);

    fn load_app_icon(&self, window: WindowHandle) -> Result<(), PlatformError>;

    fn clear_icon(&self, window: WindowHandle);

    /// Makes keyboard focus cues visible from the start
    fn initialize_keyboard_cues(&self, window: WindowHandle);

    fn set_title(&self, window: WindowHandle, title: &str);

    /// Replaces the min/max track size enforced by the platform.
    fn set_size_constraints(&self, window: WindowHandle, constraints: SizeConstraints);

    fn set_size(&self, window: WindowHandle, size: Size);

    /// Moves and resizes without changing z-order or activation.
    fn set_bounds(&self, window: WindowHandle, bounds: Rect);

    fn bounds(&self, window: WindowHandle) -> Rect;

    fn client_rect(&self, window: WindowHandle) -> Rect;

    /// Switches to full-screen presentation on the hosting monitor. Fails
    /// when the current placement cannot be saved or the monitor is unknown.
    fn enter_full_screen(&self, window: WindowHandle) -> Result<(), PlatformError>;

    fn exit_full_screen(&self, window: WindowHandle);

    /// Asks the platform to recompute the non-client frame in place.
    fn refresh_frame(&self, window: WindowHandle);

    fn set_focus(&self, window: WindowHandle);

    fn style(&self, window: WindowHandle) -> WindowStyle;

    /// The platform's own hit-test answer for a screen point.
    fn default_hit_test(&self, window: WindowHandle, cursor: Point) -> HitRegion;

    /// DPI of the monitor nearest to the window.
    fn monitor_dpi(&self, window: WindowHandle) -> Result<MonitorDpi, PlatformError>;

    /// Unscaled sizing-border measurements.
    fn system_frame_metrics(&self) -> SystemFrameMetrics;

    fn screen_to_client(&self, window: WindowHandle, point: Point) -> Result<Point, PlatformError>;
}
