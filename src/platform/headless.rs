//! In-memory windowing backend
//!
//! Simulates the parts of a frameless-capable windowing system the chrome
//! layer depends on: window bounds, a frame query sent whenever the frame
//! changes, a default hit test that only knows about the non-client border,
//! per-monitor DPI and an event queue drained by `run_event_loop`. Every
//! optional feature can be switched off to exercise the degraded paths.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Weak;

use crate::app::event::{EventResult, Reply, WindowEvent};
use crate::domain::core::{Point, Rect, Size};
use crate::domain::dpi::{MonitorDpi, SystemFrameMetrics, scale_with_dpi};
use crate::domain::geometry::SizeConstraints;
use crate::domain::hit_test::HitRegion;
use crate::platform::{
    EventHandler, Feature, Platform, PlatformError, WindowDescriptor, WindowHandle, WindowStyle,
};

/// Caption height of a framed window at 96 DPI
const CAPTION_HEIGHT: i32 = 23;

/// A simulated native window
#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    pub descriptor: WindowDescriptor,
    pub parent: Option<WindowHandle>,
    pub bounds: Rect,
    /// Client area in screen coordinates, as of the last frame query
    pub client: Rect,
    pub constraints: SizeConstraints,
    pub full_screen: bool,
    pub maximized: bool,
    pub visible: bool,
    pub has_icon: bool,
    pub keyboard_cues: bool,
    pub frame_refreshes: u32,
    pub destroyed: bool,
    restore_bounds: Option<Rect>,
}

impl HeadlessWindow {
    fn style(&self) -> WindowStyle {
        let mut style = self.descriptor.style;
        if self.full_screen {
            style.remove(WindowStyle::THICK_FRAME | WindowStyle::MAXIMIZE_BOX);
        }
        if self.maximized {
            style.insert(WindowStyle::MAXIMIZED);
        }
        style
    }
}

enum Queued {
    Event(WindowHandle, WindowEvent),
    Close(WindowHandle),
}

struct HeadlessState {
    windows: HashMap<WindowHandle, HeadlessWindow>,
    handlers: HashMap<WindowHandle, Weak<dyn EventHandler>>,
    queue: VecDeque<Queued>,
    next_handle: isize,
    exit_code: Option<i32>,
    focused: Option<WindowHandle>,
    monitor: Rect,
    /// `None` simulates a failed monitor-information query
    dpi: Option<MonitorDpi>,
    dpi_query_fails: bool,
    cursor_mapping_fails: bool,
    icon_available: bool,
    fail_creation: bool,
    full_screen_fails: bool,
    forced_hit: Option<HitRegion>,
    metrics: SystemFrameMetrics,
}

/// In-memory [`Platform`] implementation
pub struct HeadlessPlatform {
    state: RefCell<HeadlessState>,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(HeadlessState {
                windows: HashMap::new(),
                handlers: HashMap::new(),
                queue: VecDeque::new(),
                next_handle: 1,
                exit_code: None,
                focused: None,
                monitor: Rect::new(0, 0, 1920, 1080),
                dpi: Some(MonitorDpi::REFERENCE),
                dpi_query_fails: false,
                cursor_mapping_fails: false,
                icon_available: true,
                fail_creation: false,
                full_screen_fails: false,
                forced_hit: None,
                metrics: SystemFrameMetrics::WINDOWS_DEFAULT,
            }),
        }
    }

    /// Sets the DPI of the simulated monitor; `None` makes monitor
    /// information unavailable.
    pub fn set_monitor_dpi(&self, dpi: Option<MonitorDpi>) {
        self.state.borrow_mut().dpi = dpi;
    }

    pub fn set_dpi_query_fails(&self, fails: bool) {
        self.state.borrow_mut().dpi_query_fails = fails;
    }

    pub fn set_cursor_mapping_fails(&self, fails: bool) {
        self.state.borrow_mut().cursor_mapping_fails = fails;
    }

    pub fn set_icon_available(&self, available: bool) {
        self.state.borrow_mut().icon_available = available;
    }

    pub fn set_fail_creation(&self, fail: bool) {
        self.state.borrow_mut().fail_creation = fail;
    }

    /// Makes full-screen requests fail as if the placement could not be saved
    pub fn set_full_screen_fails(&self, fails: bool) {
        self.state.borrow_mut().full_screen_fails = fails;
    }

    /// Overrides the default hit test for every point
    pub fn force_default_hit(&self, region: Option<HitRegion>) {
        self.state.borrow_mut().forced_hit = region;
    }

    pub fn window(&self, window: WindowHandle) -> Option<HeadlessWindow> {
        self.state.borrow().windows.get(&window).cloned()
    }

    pub fn focused(&self) -> Option<WindowHandle> {
        self.state.borrow().focused
    }

    /// Queues an event for `run_event_loop`
    pub fn post_event(&self, window: WindowHandle, event: WindowEvent) {
        self.state
            .borrow_mut()
            .queue
            .push_back(Queued::Event(window, event));
    }

    /// Queues a user-initiated close
    pub fn post_close(&self, window: WindowHandle) {
        self.state.borrow_mut().queue.push_back(Queued::Close(window));
    }

    /// Delivers an event immediately and returns the handler's answer
    pub fn dispatch(&self, window: WindowHandle, event: WindowEvent) -> EventResult {
        let handler = self.state.borrow().handlers.get(&window).cloned();
        match handler.and_then(|weak| weak.upgrade()) {
            Some(handler) => handler.handle_event(event),
            None => EventResult::Unhandled,
        }
    }

    /// Maximizes the window the way the platform does: the window rect
    /// overhangs the monitor by the scaled sizing border.
    pub fn maximize(&self, window: WindowHandle) {
        let bounds = {
            let mut state = self.state.borrow_mut();
            let dpi = state.dpi.unwrap_or_default();
            let overhang = state.metrics.scaled(dpi);
            let border_x = overhang.frame_x + overhang.padding;
            let border_y = overhang.frame_y + overhang.padding;
            let monitor = state.monitor;
            let Some(entry) = state.windows.get_mut(&window) else {
                return;
            };
            entry.maximized = true;
            entry.bounds = Rect::from_edges(
                monitor.x - border_x,
                monitor.y - border_y,
                monitor.right() + border_x,
                monitor.bottom() + border_y,
            );
            entry.bounds
        };
        self.recalculate_client(window, bounds);
    }

    /// Sends the frame query and stores the resulting client area
    fn recalculate_client(&self, window: WindowHandle, bounds: Rect) {
        let result = self.dispatch(
            window,
            WindowEvent::CalculateFrame {
                proposed: bounds,
                in_place: true,
            },
        );

        let mut state = self.state.borrow_mut();
        let dpi = state.dpi.unwrap_or_default();
        let metrics = state.metrics;
        let Some(entry) = state.windows.get_mut(&window) else {
            return;
        };
        entry.client = match result {
            EventResult::Handled(Reply::ClientArea(client)) => client,
            _ => framed_client(bounds, entry.style(), metrics, dpi),
        };
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

/// Client area the platform would compute for a window with native chrome
fn framed_client(bounds: Rect, style: WindowStyle, metrics: SystemFrameMetrics, dpi: MonitorDpi) -> Rect {
    if !style.contains(WindowStyle::THICK_FRAME) {
        return bounds;
    }
    let scaled = metrics.scaled(dpi);
    let border_x = scaled.frame_x + scaled.padding;
    let border_y = scaled.frame_y + scaled.padding;
    let caption = scale_with_dpi(CAPTION_HEIGHT, dpi.y);
    Rect::from_edges(
        bounds.x + border_x,
        bounds.y + border_y + caption,
        bounds.right() - border_x,
        bounds.bottom() - border_y,
    )
}

impl Platform for HeadlessPlatform {
    fn create_window(
        &self,
        descriptor: &WindowDescriptor,
        parent: Option<WindowHandle>,
    ) -> Result<WindowHandle, PlatformError> {
        let mut state = self.state.borrow_mut();
        if state.fail_creation {
            return Err(PlatformError::CreationFailed(String::from(
                "simulated creation failure",
            )));
        }

        let handle = WindowHandle(state.next_handle);
        state.next_handle += 1;

        let bounds = Rect::new(0, 0, descriptor.size.width, descriptor.size.height);
        let dpi = state.dpi.unwrap_or_default();
        let client = framed_client(bounds, descriptor.style, state.metrics, dpi);
        state.windows.insert(
            handle,
            HeadlessWindow {
                descriptor: descriptor.clone(),
                parent,
                bounds,
                client,
                constraints: SizeConstraints::UNCONSTRAINED,
                full_screen: false,
                maximized: false,
                visible: false,
                has_icon: false,
                keyboard_cues: false,
                frame_refreshes: 0,
                destroyed: false,
                restore_bounds: None,
            },
        );
        Ok(handle)
    }

    fn attach_handler(&self, window: WindowHandle, handler: Weak<dyn EventHandler>) {
        self.state.borrow_mut().handlers.insert(window, handler);
    }

    fn destroy_window(&self, window: WindowHandle) {
        {
            let mut state = self.state.borrow_mut();
            match state.windows.get_mut(&window) {
                Some(entry) if !entry.destroyed => entry.destroyed = true,
                _ => return,
            }
        }
        self.dispatch(window, WindowEvent::Destroyed);
        self.state.borrow_mut().handlers.remove(&window);
    }

    fn show_window(&self, window: WindowHandle) {
        if let Some(entry) = self.state.borrow_mut().windows.get_mut(&window) {
            entry.visible = true;
        }
    }

    fn run_event_loop(&self) -> i32 {
        loop {
            if let Some(code) = self.state.borrow_mut().exit_code.take() {
                return code;
            }

            let next = self.state.borrow_mut().queue.pop_front();
            match next {
                Some(Queued::Event(window, event)) => {
                    self.dispatch(window, event);
                }
                Some(Queued::Close(window)) => self.destroy_window(window),
                // The queue running dry stands in for the last window closing
                None => return 0,
            }
        }
    }

    fn request_exit(&self, exit_code: i32) {
        self.state.borrow_mut().exit_code = Some(exit_code);
    }

    fn load_app_icon(&self, window: WindowHandle) -> Result<(), PlatformError> {
        let mut state = self.state.borrow_mut();
        if !state.icon_available {
            return Err(PlatformError::FeatureUnavailable(Feature::Icon));
        }
        if let Some(entry) = state.windows.get_mut(&window) {
            entry.has_icon = true;
        }
        Ok(())
    }

    fn clear_icon(&self, window: WindowHandle) {
        if let Some(entry) = self.state.borrow_mut().windows.get_mut(&window) {
            entry.has_icon = false;
        }
    }

    fn initialize_keyboard_cues(&self, window: WindowHandle) {
        if let Some(entry) = self.state.borrow_mut().windows.get_mut(&window) {
            entry.keyboard_cues = true;
        }
    }

    fn set_title(&self, window: WindowHandle, title: &str) {
        if let Some(entry) = self.state.borrow_mut().windows.get_mut(&window) {
            entry.descriptor.title = title.to_string();
        }
    }

    fn set_size_constraints(&self, window: WindowHandle, constraints: SizeConstraints) {
        if let Some(entry) = self.state.borrow_mut().windows.get_mut(&window) {
            entry.constraints = constraints;
        }
    }

    /// Resize requests are clamped to the pushed constraints, as interactive
    /// sizing is.
    fn set_size(&self, window: WindowHandle, size: Size) {
        let bounds = {
            let mut state = self.state.borrow_mut();
            let Some(entry) = state.windows.get_mut(&window) else {
                return;
            };
            let size = entry.constraints.clamp(size);
            entry.bounds = Rect::new(entry.bounds.x, entry.bounds.y, size.width, size.height);
            entry.bounds
        };
        self.recalculate_client(window, bounds);
    }

    fn set_bounds(&self, window: WindowHandle, bounds: Rect) {
        {
            let mut state = self.state.borrow_mut();
            let Some(entry) = state.windows.get_mut(&window) else {
                return;
            };
            entry.bounds = bounds;
        }
        self.recalculate_client(window, bounds);
        self.dispatch(window, WindowEvent::Moved);
    }

    fn bounds(&self, window: WindowHandle) -> Rect {
        self.state
            .borrow()
            .windows
            .get(&window)
            .map(|entry| entry.bounds)
            .unwrap_or_default()
    }

    fn client_rect(&self, window: WindowHandle) -> Rect {
        self.state
            .borrow()
            .windows
            .get(&window)
            .map(|entry| Rect::new(0, 0, entry.client.w, entry.client.h))
            .unwrap_or_default()
    }

    fn enter_full_screen(&self, window: WindowHandle) -> Result<(), PlatformError> {
        let bounds = {
            let mut state = self.state.borrow_mut();
            if state.full_screen_fails {
                return Err(PlatformError::FeatureUnavailable(Feature::Placement));
            }
            let monitor = state.monitor;
            let Some(entry) = state.windows.get_mut(&window) else {
                return Err(PlatformError::FeatureUnavailable(Feature::Placement));
            };
            if entry.full_screen {
                return Ok(());
            }
            entry.restore_bounds = Some(entry.bounds);
            entry.full_screen = true;
            entry.bounds = monitor;
            monitor
        };
        self.recalculate_client(window, bounds);
        Ok(())
    }

    fn exit_full_screen(&self, window: WindowHandle) {
        let bounds = {
            let mut state = self.state.borrow_mut();
            let Some(entry) = state.windows.get_mut(&window) else {
                return;
            };
            if !entry.full_screen {
                return;
            }
            entry.full_screen = false;
            if let Some(restore) = entry.restore_bounds.take() {
                entry.bounds = restore;
            }
            entry.bounds
        };
        self.recalculate_client(window, bounds);
    }

    fn refresh_frame(&self, window: WindowHandle) {
        let bounds = {
            let mut state = self.state.borrow_mut();
            let Some(entry) = state.windows.get_mut(&window) else {
                return;
            };
            entry.frame_refreshes += 1;
            entry.bounds
        };
        self.recalculate_client(window, bounds);
    }

    fn set_focus(&self, window: WindowHandle) {
        self.state.borrow_mut().focused = Some(window);
    }

    fn style(&self, window: WindowHandle) -> WindowStyle {
        self.state
            .borrow()
            .windows
            .get(&window)
            .map(HeadlessWindow::style)
            .unwrap_or(WindowStyle::empty())
    }

    fn default_hit_test(&self, window: WindowHandle, cursor: Point) -> HitRegion {
        let state = self.state.borrow();
        if let Some(region) = state.forced_hit {
            return region;
        }
        let Some(entry) = state.windows.get(&window) else {
            return HitRegion::Nowhere;
        };

        let bounds = entry.bounds;
        let client = entry.client;
        if !bounds.contains_point(cursor.x, cursor.y) {
            return HitRegion::Nowhere;
        }
        if client.contains_point(cursor.x, cursor.y) {
            return HitRegion::Client;
        }

        let style = entry.style();
        if !style.contains(WindowStyle::THICK_FRAME) || style.contains(WindowStyle::MAXIMIZED) {
            return HitRegion::Caption;
        }

        let scaled = state.metrics.scaled(state.dpi.unwrap_or_default());
        let band = scaled.frame_y + scaled.padding;
        let left = cursor.x < client.x;
        let right = cursor.x >= client.right();
        let top = cursor.y < client.y && cursor.y < bounds.y + band;
        let bottom = cursor.y >= client.bottom();
        // Side borders turn into corners near the top and bottom
        let near_top = cursor.y < bounds.y + band;

        match (left, right, top || near_top, bottom) {
            (true, _, true, _) => HitRegion::ResizeTopLeft,
            (_, true, true, _) => HitRegion::ResizeTopRight,
            (true, _, _, true) => HitRegion::ResizeBottomLeft,
            (_, true, _, true) => HitRegion::ResizeBottomRight,
            (true, _, _, _) => HitRegion::ResizeLeft,
            (_, true, _, _) => HitRegion::ResizeRight,
            (_, _, _, true) => HitRegion::ResizeBottom,
            (_, _, true, _) if top => HitRegion::ResizeTop,
            _ => HitRegion::Caption,
        }
    }

    fn monitor_dpi(&self, _window: WindowHandle) -> Result<MonitorDpi, PlatformError> {
        let state = self.state.borrow();
        let dpi = state
            .dpi
            .ok_or(PlatformError::FeatureUnavailable(Feature::MonitorInfo))?;
        if state.dpi_query_fails {
            return Err(PlatformError::FeatureUnavailable(Feature::Dpi));
        }
        Ok(dpi)
    }

    fn system_frame_metrics(&self) -> SystemFrameMetrics {
        self.state.borrow().metrics
    }

    fn screen_to_client(&self, window: WindowHandle, point: Point) -> Result<Point, PlatformError> {
        let state = self.state.borrow();
        if state.cursor_mapping_fails {
            return Err(PlatformError::FeatureUnavailable(Feature::CursorMapping));
        }
        let entry = state
            .windows
            .get(&window)
            .ok_or(PlatformError::FeatureUnavailable(Feature::CursorMapping))?;
        Ok(Point::new(point.x - entry.client.x, point.y - entry.client.y))
    }
}
