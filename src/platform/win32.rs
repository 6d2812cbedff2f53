//! Win32 windowing backend
//!
//! Native top-level windows with a shared window procedure. Each window
//! carries a [`WindowSlot`] in `GWLP_USERDATA` holding its event handler,
//! its size constraints and its full-screen restore data. Raw messages are
//! translated into [`WindowEvent`]s, handed to the attached controller, and
//! its [`EventResult`] translated back into an `LRESULT`.
//!
//! CRITICAL: `Win32Platform::initialize` must run before any window is
//! created so the process is per-monitor DPI aware and coordinates are real
//! pixels.

use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::rc::{Rc, Weak};
use std::sync::OnceLock;

use tracing::{debug, info};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    GetMonitorInfoW, HBRUSH, MONITOR_DEFAULTTONEAREST, MONITORINFO, MonitorFromWindow, ScreenToClient,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::HiDpi::{
    DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, GetDpiForMonitor, GetDpiForWindow,
    GetSystemMetricsForDpi, MDT_EFFECTIVE_DPI, SetProcessDpiAwarenessContext,
};
use windows::Win32::UI::Input::KeyboardAndMouse::SetFocus;
use windows::Win32::UI::WindowsAndMessaging::*;
use windows::core::{HSTRING, PCWSTR, w};

use crate::app::event::{EventResult, Reply, WindowEvent};
use crate::domain::core::{Point, Rect, Size};
use crate::domain::dpi::{MonitorDpi, REFERENCE_DPI, SystemFrameMetrics, scale_with_dpi};
use crate::domain::geometry::SizeConstraints;
use crate::domain::hit_test::HitRegion;
use crate::platform::{
    EventHandler, ExtendedStyle, Feature, Platform, PlatformError, WindowDescriptor, WindowHandle,
    WindowStyle,
};

const CLASS_NAME: PCWSTR = w!("FramelessChromeWindow");

/// Resource id of the application icon embedded by the build
const APP_ICON_ID: u16 = 1;

#[derive(Debug, Clone, Copy)]
enum InitFailure {
    ModuleHandle,
    ClassRegistration,
}

/// Module instance, registered once per process
static INIT: OnceLock<Result<isize, InitFailure>> = OnceLock::new();

#[derive(Clone, Copy)]
struct FullScreenRestore {
    placement: WINDOWPLACEMENT,
    style: i32,
}

/// Per-window state reachable from the window procedure
struct WindowSlot {
    handler: RefCell<Option<Weak<dyn EventHandler>>>,
    constraints: Cell<SizeConstraints>,
    restore: Cell<Option<FullScreenRestore>>,
    transparent_background: bool,
}

impl WindowSlot {
    fn dispatch(&self, event: WindowEvent) -> EventResult {
        // Clone out so no borrow is held while the handler re-enters
        let handler = self.handler.borrow().clone();
        match handler.and_then(|weak| weak.upgrade()) {
            Some(handler) => handler.handle_event(event),
            None => EventResult::Unhandled,
        }
    }
}

/// Looks up the slot stored at `WM_NCCREATE`
unsafe fn slot_for<'a>(hwnd: HWND) -> Option<&'a WindowSlot> {
    unsafe {
        let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const WindowSlot;
        if ptr.is_null() { None } else { Some(&*ptr) }
    }
}

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0)
}

fn rect_from_win32(rect: &RECT) -> Rect {
    Rect::from_edges(rect.left, rect.top, rect.right, rect.bottom)
}

fn rect_to_win32(rect: Rect) -> RECT {
    RECT {
        left: rect.x,
        top: rect.y,
        right: rect.right(),
        bottom: rect.bottom(),
    }
}

/// Signed cursor coordinates packed into an `LPARAM`; secondary monitors
/// can sit at negative coordinates.
fn point_from_lparam(lparam: LPARAM) -> Point {
    Point::new(
        (lparam.0 & 0xFFFF) as u16 as i16 as i32,
        ((lparam.0 >> 16) & 0xFFFF) as u16 as i16 as i32,
    )
}

fn point_to_lparam(point: Point) -> LPARAM {
    LPARAM(((point.x as u16 as u32) | ((point.y as u16 as u32) << 16)) as i32 as isize)
}

fn native_style(style: WindowStyle) -> WINDOW_STYLE {
    let mut native = WINDOW_STYLE(0);
    if style.contains(WindowStyle::THICK_FRAME) {
        native |= WS_THICKFRAME;
    }
    if style.contains(WindowStyle::SYSTEM_MENU) {
        native |= WS_SYSMENU;
    }
    if style.contains(WindowStyle::MINIMIZE_BOX) {
        native |= WS_MINIMIZEBOX;
    }
    if style.contains(WindowStyle::MAXIMIZE_BOX) {
        native |= WS_MAXIMIZEBOX;
    }
    native
}

fn style_from_native(native: WINDOW_STYLE) -> WindowStyle {
    let mut style = WindowStyle::empty();
    let pairs = [
        (WS_THICKFRAME, WindowStyle::THICK_FRAME),
        (WS_SYSMENU, WindowStyle::SYSTEM_MENU),
        (WS_MINIMIZEBOX, WindowStyle::MINIMIZE_BOX),
        (WS_MAXIMIZEBOX, WindowStyle::MAXIMIZE_BOX),
        (WS_MAXIMIZE, WindowStyle::MAXIMIZED),
    ];
    for (bit, flag) in pairs {
        if (native & bit) != WINDOW_STYLE(0) {
            style |= flag;
        }
    }
    style
}

fn native_ex_style(ex_style: ExtendedStyle) -> WINDOW_EX_STYLE {
    let mut native = WINDOW_EX_STYLE(0);
    if ex_style.contains(ExtendedStyle::TOPMOST) {
        native |= WS_EX_TOPMOST;
    }
    if ex_style.contains(ExtendedStyle::APP_WINDOW) {
        native |= WS_EX_APPWINDOW;
    }
    if ex_style.contains(ExtendedStyle::CONTROL_PARENT) {
        native |= WS_EX_CONTROLPARENT;
    }
    if ex_style.contains(ExtendedStyle::NO_REDIRECTION_BITMAP) {
        native |= WS_EX_NOREDIRECTIONBITMAP;
    }
    native
}

fn region_from_code(code: isize) -> HitRegion {
    match code as u32 {
        HTCAPTION => HitRegion::Caption,
        HTCLIENT => HitRegion::Client,
        HTTOP => HitRegion::ResizeTop,
        HTBOTTOM => HitRegion::ResizeBottom,
        HTLEFT => HitRegion::ResizeLeft,
        HTRIGHT => HitRegion::ResizeRight,
        HTTOPLEFT => HitRegion::ResizeTopLeft,
        HTTOPRIGHT => HitRegion::ResizeTopRight,
        HTBOTTOMLEFT => HitRegion::ResizeBottomLeft,
        HTBOTTOMRIGHT => HitRegion::ResizeBottomRight,
        _ => HitRegion::Nowhere,
    }
}

fn region_to_code(region: HitRegion) -> u32 {
    match region {
        HitRegion::Nowhere => HTNOWHERE,
        HitRegion::Caption => HTCAPTION,
        HitRegion::Client => HTCLIENT,
        HitRegion::ResizeTop => HTTOP,
        HitRegion::ResizeBottom => HTBOTTOM,
        HitRegion::ResizeLeft => HTLEFT,
        HitRegion::ResizeRight => HTRIGHT,
        HitRegion::ResizeTopLeft => HTTOPLEFT,
        HitRegion::ResizeTopRight => HTTOPRIGHT,
        HitRegion::ResizeBottomLeft => HTBOTTOMLEFT,
        HitRegion::ResizeBottomRight => HTBOTTOMRIGHT,
    }
}

/// Sizing-border metrics at the reference DPI. A per-monitor aware process
/// gets system-DPI values from `GetSystemMetrics`, which would be scaled twice.
fn reference_frame_metrics() -> SystemFrameMetrics {
    unsafe {
        SystemFrameMetrics {
            frame_x: GetSystemMetricsForDpi(SM_CXFRAME, REFERENCE_DPI),
            frame_y: GetSystemMetricsForDpi(SM_CYFRAME, REFERENCE_DPI),
            padded_border: GetSystemMetricsForDpi(SM_CXPADDEDBORDER, REFERENCE_DPI),
        }
    }
}

/// Translates a raw message into a typed event.
///
/// # Safety
/// `lparam` must be the pointer the system supplied with `msg`.
unsafe fn translate(msg: u32, wparam: WPARAM, lparam: LPARAM) -> WindowEvent {
    unsafe {
        match msg {
            WM_CREATE => WindowEvent::Created,
            WM_NCLBUTTONDOWN => WindowEvent::NonClientLeftButtonDown,
            WM_MOVE => WindowEvent::Moved,
            WM_MOVING => WindowEvent::Moving,
            WM_DPICHANGED => {
                let suggested = &*(lparam.0 as *const RECT);
                WindowEvent::DpiChanged {
                    dpi: MonitorDpi::new(
                        (wparam.0 & 0xFFFF) as u32,
                        ((wparam.0 >> 16) & 0xFFFF) as u32,
                    ),
                    suggested: rect_from_win32(suggested),
                }
            }
            WM_NCHITTEST => WindowEvent::HitTest {
                cursor: point_from_lparam(lparam),
            },
            WM_NCCALCSIZE => {
                let in_place = wparam.0 != 0;
                // Both variants start with the proposed window rectangle
                let proposed = &*(lparam.0 as *const RECT);
                WindowEvent::CalculateFrame {
                    proposed: rect_from_win32(proposed),
                    in_place,
                }
            }
            WM_DESTROY => WindowEvent::Destroyed,
            other => WindowEvent::Other(other),
        }
    }
}

/// Fills the min/max track sizes from the pushed constraints, scaled from
/// reference pixels to the window's current DPI.
unsafe fn apply_min_max_info(hwnd: HWND, slot: &WindowSlot, lparam: LPARAM) {
    unsafe {
        let constraints = slot.constraints.get();
        let dpi = match GetDpiForWindow(hwnd) {
            0 => REFERENCE_DPI,
            dpi => dpi,
        };
        let info = &mut *(lparam.0 as *mut MINMAXINFO);
        if constraints.min.width > 0 {
            info.ptMinTrackSize.x = scale_with_dpi(constraints.min.width, dpi);
        }
        if constraints.min.height > 0 {
            info.ptMinTrackSize.y = scale_with_dpi(constraints.min.height, dpi);
        }
        if constraints.max.width > 0 {
            info.ptMaxTrackSize.x = scale_with_dpi(constraints.max.width, dpi);
        }
        if constraints.max.height > 0 {
            info.ptMaxTrackSize.y = scale_with_dpi(constraints.max.height, dpi);
        }
    }
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    unsafe {
        if msg == WM_NCCREATE {
            let create = &*(lparam.0 as *const CREATESTRUCTW);
            let slot = create.lpCreateParams as *const WindowSlot;
            if !slot.is_null() {
                // The window keeps its own reference until WM_NCDESTROY
                Rc::increment_strong_count(slot);
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, slot as isize);
            }
            return DefWindowProcW(hwnd, msg, wparam, lparam);
        }

        let Some(slot) = slot_for(hwnd) else {
            return DefWindowProcW(hwnd, msg, wparam, lparam);
        };

        match msg {
            WM_GETMINMAXINFO => {
                apply_min_max_info(hwnd, slot, lparam);
                return LRESULT(0);
            }
            WM_ERASEBKGND if slot.transparent_background => return LRESULT(1),
            _ => {}
        }

        let result = match slot.dispatch(translate(msg, wparam, lparam)) {
            EventResult::Handled(Reply::Hit(region)) => LRESULT(region_to_code(region) as isize),
            EventResult::Handled(Reply::ClientArea(client)) => {
                if msg == WM_NCCALCSIZE && wparam.0 != 0 {
                    let params = &mut *(lparam.0 as *mut NCCALCSIZE_PARAMS);
                    params.rgrc[0] = rect_to_win32(client);
                }
                LRESULT(0)
            }
            EventResult::Unhandled => DefWindowProcW(hwnd, msg, wparam, lparam),
        };

        if msg == WM_NCDESTROY {
            let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const WindowSlot;
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
            drop(Rc::from_raw(ptr));
        }

        result
    }
}

/// Win32 implementation of [`Platform`]
pub struct Win32Platform {
    instance: HINSTANCE,
}

impl Win32Platform {
    /// Performs process-wide setup once: per-monitor DPI awareness and
    /// window class registration. Later calls reuse the first result.
    pub fn initialize() -> Result<Self, PlatformError> {
        let result = INIT.get_or_init(|| unsafe {
            // Fails harmlessly when a manifest already set the awareness
            if let Err(error) = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) {
                debug!(event = "platform.dpi_awareness_skipped", error = %error);
            }

            let module = GetModuleHandleW(None).map_err(|_| InitFailure::ModuleHandle)?;
            let class = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(window_proc),
                hInstance: module.into(),
                hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
                hbrBackground: HBRUSH((COLOR_WINDOW.0 + 1) as isize),
                lpszClassName: CLASS_NAME,
                ..Default::default()
            };
            if RegisterClassExW(&class) == 0 {
                return Err(InitFailure::ClassRegistration);
            }

            info!(event = "platform.initialized");
            Ok(module.0)
        });

        match *result {
            Ok(instance) => Ok(Self {
                instance: HINSTANCE(instance),
            }),
            Err(InitFailure::ModuleHandle) => Err(PlatformError::InitializationFailed(String::from(
                "module handle unavailable",
            ))),
            Err(InitFailure::ClassRegistration) => Err(PlatformError::ClassRegistrationFailed),
        }
    }

    fn send_icon(&self, window: WindowHandle, icon: isize) {
        unsafe {
            SendMessageW(hwnd(window), WM_SETICON, WPARAM(ICON_BIG as usize), LPARAM(icon));
            SendMessageW(hwnd(window), WM_SETICON, WPARAM(ICON_SMALL as usize), LPARAM(icon));
        }
    }

    fn set_pos(&self, window: WindowHandle, bounds: Rect, flags: SET_WINDOW_POS_FLAGS) {
        let result = unsafe {
            SetWindowPos(
                hwnd(window),
                HWND(0),
                bounds.x,
                bounds.y,
                bounds.w,
                bounds.h,
                flags,
            )
        };
        if let Err(error) = result {
            debug!(event = "platform.set_window_pos_failed", ?window, error = %error);
        }
    }
}

impl Platform for Win32Platform {
    fn create_window(
        &self,
        descriptor: &WindowDescriptor,
        parent: Option<WindowHandle>,
    ) -> Result<WindowHandle, PlatformError> {
        let slot = Rc::new(WindowSlot {
            handler: RefCell::new(None),
            constraints: Cell::new(SizeConstraints::UNCONSTRAINED),
            restore: Cell::new(None),
            transparent_background: descriptor.transparent_background,
        });

        let handle = unsafe {
            CreateWindowExW(
                native_ex_style(descriptor.ex_style),
                CLASS_NAME,
                &HSTRING::from(descriptor.title.as_str()),
                native_style(descriptor.style),
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                descriptor.size.width,
                descriptor.size.height,
                parent.map(hwnd).unwrap_or_default(),
                None,
                self.instance,
                Some(Rc::as_ptr(&slot) as *const c_void),
            )
        };

        if handle.0 == 0 {
            let error = windows::core::Error::from_win32();
            return Err(PlatformError::CreationFailed(error.to_string()));
        }

        Ok(WindowHandle(handle.0))
    }

    fn attach_handler(&self, window: WindowHandle, handler: Weak<dyn EventHandler>) {
        if let Some(slot) = unsafe { slot_for(hwnd(window)) } {
            slot.handler.replace(Some(handler));
        }
    }

    fn destroy_window(&self, window: WindowHandle) {
        unsafe {
            let _ = DestroyWindow(hwnd(window));
        }
    }

    fn show_window(&self, window: WindowHandle) {
        unsafe {
            let _ = ShowWindow(hwnd(window), SW_SHOW);
        }
    }

    fn run_event_loop(&self) -> i32 {
        let mut msg = MSG::default();
        unsafe {
            loop {
                let status = GetMessageW(&mut msg, None, 0, 0);
                match status.0 {
                    0 => return msg.wParam.0 as i32,
                    -1 => return -1,
                    _ => {
                        let _ = TranslateMessage(&msg);
                        DispatchMessageW(&msg);
                    }
                }
            }
        }
    }

    fn request_exit(&self, exit_code: i32) {
        unsafe { PostQuitMessage(exit_code) };
    }

    fn load_app_icon(&self, window: WindowHandle) -> Result<(), PlatformError> {
        let icon = unsafe { LoadIconW(self.instance, PCWSTR(APP_ICON_ID as usize as *const u16)) }
            .map_err(|_| PlatformError::FeatureUnavailable(Feature::Icon))?;
        self.send_icon(window, icon.0);
        Ok(())
    }

    fn clear_icon(&self, window: WindowHandle) {
        self.send_icon(window, 0);
    }

    fn initialize_keyboard_cues(&self, window: WindowHandle) {
        unsafe {
            SendMessageW(
                hwnd(window),
                WM_CHANGEUISTATE,
                WPARAM(UIS_INITIALIZE as usize),
                LPARAM(0),
            );
        }
    }

    fn set_title(&self, window: WindowHandle, title: &str) {
        unsafe {
            let _ = SetWindowTextW(hwnd(window), &HSTRING::from(title));
        }
    }

    fn set_size_constraints(&self, window: WindowHandle, constraints: SizeConstraints) {
        if let Some(slot) = unsafe { slot_for(hwnd(window)) } {
            slot.constraints.set(constraints);
        }
    }

    fn set_size(&self, window: WindowHandle, size: Size) {
        self.set_pos(
            window,
            Rect::new(0, 0, size.width, size.height),
            SWP_NOMOVE | SWP_NOZORDER | SWP_NOACTIVATE,
        );
    }

    fn set_bounds(&self, window: WindowHandle, bounds: Rect) {
        self.set_pos(window, bounds, SWP_NOZORDER | SWP_NOACTIVATE);
    }

    fn bounds(&self, window: WindowHandle) -> Rect {
        let mut rect = RECT::default();
        match unsafe { GetWindowRect(hwnd(window), &mut rect) } {
            Ok(()) => rect_from_win32(&rect),
            Err(_) => Rect::default(),
        }
    }

    fn client_rect(&self, window: WindowHandle) -> Rect {
        let mut rect = RECT::default();
        match unsafe { GetClientRect(hwnd(window), &mut rect) } {
            Ok(()) => rect_from_win32(&rect),
            Err(_) => Rect::default(),
        }
    }

    fn enter_full_screen(&self, window: WindowHandle) -> Result<(), PlatformError> {
        let Some(slot) = (unsafe { slot_for(hwnd(window)) }) else {
            return Err(PlatformError::FeatureUnavailable(Feature::Placement));
        };
        if slot.restore.get().is_some() {
            return Ok(());
        }

        unsafe {
            let handle = hwnd(window);
            let style = GetWindowLongW(handle, GWL_STYLE);
            let mut placement = WINDOWPLACEMENT {
                length: std::mem::size_of::<WINDOWPLACEMENT>() as u32,
                ..Default::default()
            };
            GetWindowPlacement(handle, &mut placement)
                .map_err(|_| PlatformError::FeatureUnavailable(Feature::Placement))?;

            let monitor = MonitorFromWindow(handle, MONITOR_DEFAULTTONEAREST);
            let mut info = MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFO>() as u32,
                ..Default::default()
            };
            if !GetMonitorInfoW(monitor, &mut info).as_bool() {
                return Err(PlatformError::FeatureUnavailable(Feature::MonitorInfo));
            }

            slot.restore.set(Some(FullScreenRestore { placement, style }));
            SetWindowLongW(handle, GWL_STYLE, style & !(WS_OVERLAPPEDWINDOW.0 as i32));
            self.set_pos(
                window,
                rect_from_win32(&info.rcMonitor),
                SWP_NOOWNERZORDER | SWP_FRAMECHANGED,
            );
        }
        Ok(())
    }

    fn exit_full_screen(&self, window: WindowHandle) {
        let Some(slot) = (unsafe { slot_for(hwnd(window)) }) else {
            return;
        };
        let Some(restore) = slot.restore.take() else {
            return;
        };

        unsafe {
            let handle = hwnd(window);
            SetWindowLongW(handle, GWL_STYLE, restore.style);
            let _ = SetWindowPlacement(handle, &restore.placement);
        }
        self.set_pos(
            window,
            Rect::default(),
            SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOOWNERZORDER | SWP_FRAMECHANGED,
        );
    }

    fn refresh_frame(&self, window: WindowHandle) {
        let bounds = self.bounds(window);
        self.set_pos(window, bounds, SWP_FRAMECHANGED | SWP_NOMOVE | SWP_NOSIZE);
    }

    fn set_focus(&self, window: WindowHandle) {
        unsafe {
            let _ = SetFocus(hwnd(window));
        }
    }

    fn style(&self, window: WindowHandle) -> WindowStyle {
        let native = unsafe { GetWindowLongW(hwnd(window), GWL_STYLE) };
        style_from_native(WINDOW_STYLE(native as u32))
    }

    fn default_hit_test(&self, window: WindowHandle, cursor: Point) -> HitRegion {
        let code = unsafe {
            DefWindowProcW(hwnd(window), WM_NCHITTEST, WPARAM(0), point_to_lparam(cursor))
        };
        region_from_code(code.0)
    }

    fn monitor_dpi(&self, window: WindowHandle) -> Result<MonitorDpi, PlatformError> {
        unsafe {
            let monitor = MonitorFromWindow(hwnd(window), MONITOR_DEFAULTTONEAREST);
            let mut info = MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFO>() as u32,
                ..Default::default()
            };
            if !GetMonitorInfoW(monitor, &mut info).as_bool() {
                return Err(PlatformError::FeatureUnavailable(Feature::MonitorInfo));
            }

            let mut dpi_x: u32 = 0;
            let mut dpi_y: u32 = 0;
            GetDpiForMonitor(monitor, MDT_EFFECTIVE_DPI, &mut dpi_x, &mut dpi_y)
                .map_err(|_| PlatformError::FeatureUnavailable(Feature::Dpi))?;
            Ok(MonitorDpi::new(dpi_x, dpi_y))
        }
    }

    fn system_frame_metrics(&self) -> SystemFrameMetrics {
        reference_frame_metrics()
    }

    fn screen_to_client(&self, window: WindowHandle, point: Point) -> Result<Point, PlatformError> {
        let mut native = POINT {
            x: point.x,
            y: point.y,
        };
        if unsafe { ScreenToClient(hwnd(window), &mut native) }.as_bool() {
            Ok(Point::new(native.x, native.y))
        } else {
            Err(PlatformError::FeatureUnavailable(Feature::CursorMapping))
        }
    }
}
