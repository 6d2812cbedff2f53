//! Window controller
//!
//! Owns one native window for its whole lifetime. The controller builds the
//! window from [`WindowOptions`], keeps its size constraints and full-screen
//! state, and answers every event the platform routes to it. It composes a
//! [`Platform`] rather than extending any toolkit window type.
//!
//! All methods take `&self`. Event dispatch can re-enter the controller
//! (moving the window from a DPI change makes the platform ask for the
//! frame again before the move returns), so mutable state lives in cells
//! and no borrow is held across a platform call.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{info, warn};

use crate::app::chrome;
use crate::app::event::{EventResult, Reply, WindowEvent};
use crate::app::listener::{PositionListener, PositionListenerSlot};
use crate::config::WindowOptions;
use crate::domain::core::{Rect, Size};
use crate::domain::geometry::{GeometryState, SizeConstraints};
use crate::platform::{
    EventHandler, ExtendedStyle, Platform, PlatformError, WindowDescriptor, WindowHandle,
    WindowStyle,
};

/// Window controller errors
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Failed to create window: {0}")]
    PlatformCreation(#[source] PlatformError),
}

/// Style bits and creation parameters derived from options
pub fn window_descriptor(options: &WindowOptions) -> WindowDescriptor {
    let mut style = WindowStyle::THICK_FRAME
        | WindowStyle::SYSTEM_MENU
        | WindowStyle::MINIMIZE_BOX
        | WindowStyle::MAXIMIZE_BOX;
    if !options.resizable {
        style.remove(WindowStyle::THICK_FRAME | WindowStyle::MAXIMIZE_BOX);
    }

    let mut ex_style = ExtendedStyle::empty();
    if options.app_window {
        ex_style |= ExtendedStyle::APP_WINDOW | ExtendedStyle::CONTROL_PARENT;
    }
    if options.translucent {
        ex_style |= ExtendedStyle::NO_REDIRECTION_BITMAP;
    }
    if options.always_on_top {
        ex_style |= ExtendedStyle::TOPMOST;
    }

    WindowDescriptor {
        title: options.title.clone(),
        size: options.initial_size(),
        style,
        ex_style,
        transparent_background: options.translucent,
    }
}

/// Controller for a single native window
pub struct WindowController<P: Platform + 'static> {
    platform: Rc<P>,
    handle: WindowHandle,
    parent: Option<WindowHandle>,
    options: WindowOptions,
    geometry: RefCell<GeometryState>,
    position_listener: PositionListenerSlot,
    alive: Cell<bool>,
}

impl<P: Platform + 'static> WindowController<P> {
    /// Creates the native window and installs the controller as its event
    /// handler.
    ///
    /// Only the native window allocation can fail; icon and monitor
    /// problems are logged and skipped.
    pub fn create(
        platform: Rc<P>,
        options: WindowOptions,
        parent: Option<WindowHandle>,
    ) -> Result<Rc<Self>, WindowError> {
        if let Err(error) = options.validate() {
            warn!(event = "window.options_invalid", error = %error);
        }

        let descriptor = window_descriptor(&options);
        let handle = platform
            .create_window(&descriptor, parent)
            .map_err(WindowError::PlatformCreation)?;

        let controller = Rc::new(Self {
            platform: Rc::clone(&platform),
            handle,
            parent,
            geometry: RefCell::new(GeometryState::new(options.constraints())),
            options,
            position_listener: PositionListenerSlot::new(),
            alive: Cell::new(true),
        });

        let handler: Weak<dyn EventHandler> = Rc::downgrade(&controller) as Weak<dyn EventHandler>;
        platform.attach_handler(handle, handler);

        controller.apply_icon();
        if !controller.options.full_screen {
            controller.push_constraints();
        }
        platform.initialize_keyboard_cues(handle);

        // Creation-time messages arrived before the handler was attached
        controller.handle_event(WindowEvent::Created);

        if controller.options.full_screen {
            controller.enter_full_screen();
        }

        info!(
            event = "window.create_completed",
            window = ?handle,
            title = %controller.options.title,
            frameless = controller.options.frameless,
            width = descriptor.size.width,
            height = descriptor.size.height
        );

        Ok(controller)
    }

    fn apply_icon(&self) {
        if self.options.hide_icon {
            self.platform.clear_icon(self.handle);
            return;
        }
        if let Err(error) = self.platform.load_app_icon(self.handle) {
            warn!(event = "window.icon_unavailable", window = ?self.handle, error = %error);
        }
    }

    /// Pushes whichever constraints are currently in force to the platform
    fn push_constraints(&self) {
        let constraints = self.geometry.borrow().effective_constraints();
        self.platform.set_size_constraints(self.handle, constraints);
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    /// Whether the native window still exists
    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    /// Stored constraints; unaffected by full-screen suspension
    pub fn constraints(&self) -> SizeConstraints {
        self.geometry.borrow().constraints()
    }

    pub fn is_full_screen(&self) -> bool {
        self.geometry.borrow().is_full_screen()
    }

    /// Runs the platform event loop until it is told to terminate.
    ///
    /// Blocks the calling thread.
    pub fn run(&self) -> i32 {
        info!(event = "window.run_started", window = ?self.handle);
        let exit_code = self.platform.run_event_loop();
        info!(event = "window.run_completed", window = ?self.handle, exit_code);
        exit_code
    }

    pub fn show(&self) {
        self.platform.show_window(self.handle);
    }

    /// Suspends size constraints and switches to full-screen presentation.
    /// Does nothing when already full-screen. If the platform cannot go
    /// full-screen the window stays as it was, constraints included.
    pub fn enter_full_screen(&self) {
        let entered = self.geometry.borrow_mut().enter_full_screen();
        if !entered {
            return;
        }
        self.platform
            .set_size_constraints(self.handle, SizeConstraints::UNCONSTRAINED);

        if let Err(error) = self.platform.enter_full_screen(self.handle) {
            warn!(event = "window.full_screen_failed", window = ?self.handle, error = %error);
            self.geometry.borrow_mut().exit_full_screen();
            self.push_constraints();
            return;
        }
        info!(event = "window.full_screen_entered", window = ?self.handle);
    }

    /// Returns to normal presentation and reinstates the stored constraints.
    /// Does nothing when not full-screen.
    pub fn exit_full_screen(&self) {
        let exited = self.geometry.borrow_mut().exit_full_screen();
        if !exited {
            return;
        }
        self.platform.exit_full_screen(self.handle);
        self.push_constraints();
        info!(event = "window.full_screen_exited", window = ?self.handle);
    }

    /// Sets the minimum size; (0, 0) removes it. Takes effect at the
    /// platform immediately unless the window is full-screen.
    pub fn set_min_size(&self, width: i32, height: i32) {
        self.geometry.borrow_mut().set_min(Size::new(width, height));
        self.push_constraints();
    }

    /// Sets the maximum size; (0, 0) removes it. Takes effect at the
    /// platform immediately unless the window is full-screen.
    pub fn set_max_size(&self, width: i32, height: i32) {
        self.geometry.borrow_mut().set_max(Size::new(width, height));
        self.push_constraints();
    }

    /// Requests a new window size. Constraint enforcement is left to the
    /// platform.
    pub fn set_size(&self, width: i32, height: i32) {
        self.platform.set_size(self.handle, Size::new(width, height));
    }

    pub fn set_title(&self, title: &str) {
        self.platform.set_title(self.handle, title);
    }

    /// Content rectangle in client coordinates, for sizing the hosted surface
    pub fn client_rect(&self) -> Rect {
        self.platform.client_rect(self.handle)
    }

    /// Window rectangle in screen coordinates
    pub fn bounds(&self) -> Rect {
        self.platform.bounds(self.handle)
    }

    /// Registers the position-changed listener, replacing any previous one.
    ///
    /// The listener runs synchronously on the event-loop thread for every
    /// move and must not block.
    pub fn set_position_listener<F>(&self, listener: F)
    where
        F: FnMut(Rect) -> Result<(), Box<dyn std::error::Error>> + 'static,
    {
        let listener: PositionListener = Box::new(listener);
        self.position_listener.replace(Some(listener));
    }

    pub fn clear_position_listener(&self) {
        self.position_listener.replace(None);
    }

    /// Maps one platform event to a result.
    pub fn dispatch(&self, event: WindowEvent) -> EventResult {
        match event {
            WindowEvent::NonClientLeftButtonDown => {
                // Keep embedded content from holding on to focus
                self.platform.set_focus(self.handle);
                EventResult::Unhandled
            }
            WindowEvent::Moved | WindowEvent::Moving => {
                if self.position_listener.is_registered() {
                    self.position_listener.notify(self.bounds());
                }
                EventResult::Unhandled
            }
            WindowEvent::DpiChanged { dpi, suggested } => {
                chrome::apply_dpi_change(self.platform.as_ref(), self.handle, dpi, suggested);
                EventResult::Unhandled
            }
            WindowEvent::Destroyed => {
                self.alive.set(false);
                info!(event = "window.destroyed", window = ?self.handle);
                if self.parent.is_none() {
                    self.platform.request_exit(0);
                }
                EventResult::Unhandled
            }
            event if self.options.frameless => self.dispatch_frameless(event),
            _ => EventResult::Unhandled,
        }
    }

    fn dispatch_frameless(&self, event: WindowEvent) -> EventResult {
        let platform = self.platform.as_ref();
        match event {
            WindowEvent::Created => {
                platform.refresh_frame(self.handle);
                EventResult::Unhandled
            }
            WindowEvent::HitTest { cursor } => {
                EventResult::Handled(Reply::Hit(chrome::classify_hit(platform, self.handle, cursor)))
            }
            WindowEvent::CalculateFrame {
                proposed,
                in_place: true,
            } => EventResult::Handled(Reply::ClientArea(chrome::calculate_client_area(
                platform,
                self.handle,
                proposed,
            ))),
            _ => EventResult::Unhandled,
        }
    }
}

impl<P: Platform + 'static> EventHandler for WindowController<P> {
    fn handle_event(&self, event: WindowEvent) -> EventResult {
        self.dispatch(event)
    }
}

impl<P: Platform + 'static> Drop for WindowController<P> {
    fn drop(&mut self) {
        if self.alive.get() {
            self.alive.set(false);
            self.platform.destroy_window(self.handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::core::Point;
    use crate::domain::dpi::MonitorDpi;
    use crate::domain::hit_test::HitRegion;
    use crate::platform::HeadlessPlatform;

    fn frameless_options() -> WindowOptions {
        WindowOptions {
            width: 800,
            height: 600,
            min_width: 400,
            min_height: 300,
            frameless: true,
            ..WindowOptions::default()
        }
    }

    fn create(options: WindowOptions) -> (Rc<HeadlessPlatform>, Rc<WindowController<HeadlessPlatform>>) {
        let platform = Rc::new(HeadlessPlatform::new());
        let controller = WindowController::create(Rc::clone(&platform), options, None).unwrap();
        (platform, controller)
    }

    fn hit(controller: &WindowController<HeadlessPlatform>, x: i32, y: i32) -> EventResult {
        controller.dispatch(WindowEvent::HitTest {
            cursor: Point::new(x, y),
        })
    }

    #[test]
    fn descriptor_uses_sizable_style_by_default() {
        let descriptor = window_descriptor(&WindowOptions::default());
        assert!(descriptor.style.contains(
            WindowStyle::THICK_FRAME
                | WindowStyle::SYSTEM_MENU
                | WindowStyle::MINIMIZE_BOX
                | WindowStyle::MAXIMIZE_BOX
        ));
        assert_eq!(
            descriptor.ex_style,
            ExtendedStyle::APP_WINDOW | ExtendedStyle::CONTROL_PARENT
        );
        assert!(!descriptor.transparent_background);
    }

    #[test]
    fn descriptor_reflects_options() {
        let descriptor = window_descriptor(&WindowOptions {
            resizable: false,
            always_on_top: true,
            translucent: true,
            ..WindowOptions::default()
        });
        assert!(!descriptor.style.contains(WindowStyle::THICK_FRAME));
        assert!(!descriptor.style.contains(WindowStyle::MAXIMIZE_BOX));
        assert!(descriptor.ex_style.contains(
            ExtendedStyle::TOPMOST | ExtendedStyle::NO_REDIRECTION_BITMAP
        ));
        assert!(descriptor.transparent_background);
    }

    #[test]
    fn create_applies_options() {
        let (platform, controller) = create(WindowOptions {
            title: String::from("Main"),
            max_width: 1600,
            max_height: 1200,
            ..frameless_options()
        });

        let expected = SizeConstraints::new(Size::new(400, 300), Size::new(1600, 1200));
        assert_eq!(controller.constraints(), expected);

        let window = platform.window(controller.handle()).unwrap();
        assert_eq!(window.constraints, expected);
        assert_eq!(window.descriptor.title, "Main");
        assert_eq!(window.bounds.size(), Size::new(800, 600));
        assert!(window.has_icon);
        assert!(window.keyboard_cues);
        assert!(controller.is_alive());
    }

    #[test]
    fn frameless_create_refreshes_frame_with_override() {
        let (platform, controller) = create(frameless_options());
        let window = platform.window(controller.handle()).unwrap();

        assert_eq!(window.frame_refreshes, 1);
        // Content reaches the top edge; sides and bottom keep the sizing border
        assert_eq!(window.client, Rect::from_edges(8, 0, 792, 592));
        assert_eq!(controller.client_rect(), Rect::new(0, 0, 784, 592));
    }

    #[test]
    fn framed_create_does_not_override_chrome() {
        let (platform, controller) = create(WindowOptions::default());
        let window = platform.window(controller.handle()).unwrap();
        assert_eq!(window.frame_refreshes, 0);
        assert_eq!(hit(&controller, 400, 2), EventResult::Unhandled);
        assert_eq!(
            controller.dispatch(WindowEvent::CalculateFrame {
                proposed: Rect::new(0, 0, 800, 600),
                in_place: true,
            }),
            EventResult::Unhandled
        );
    }

    #[test]
    fn creation_failure_is_fatal() {
        let platform = Rc::new(HeadlessPlatform::new());
        platform.set_fail_creation(true);
        let result = WindowController::create(platform, frameless_options(), None);
        assert!(matches!(result, Err(WindowError::PlatformCreation(_))));
    }

    #[test]
    fn missing_icon_does_not_fail_creation() {
        let platform = Rc::new(HeadlessPlatform::new());
        platform.set_icon_available(false);
        let controller = WindowController::create(Rc::clone(&platform), frameless_options(), None).unwrap();
        assert!(!platform.window(controller.handle()).unwrap().has_icon);
    }

    #[test]
    fn hidden_icon_is_cleared() {
        let (platform, controller) = create(WindowOptions {
            hide_icon: true,
            ..WindowOptions::default()
        });
        assert!(!platform.window(controller.handle()).unwrap().has_icon);
    }

    #[test]
    fn hit_test_scenario() {
        let (_platform, controller) = create(frameless_options());
        assert_eq!(hit(&controller, 400, 2), EventResult::Handled(Reply::Hit(HitRegion::ResizeTop)));
        assert_eq!(hit(&controller, 400, 300), EventResult::Handled(Reply::Hit(HitRegion::Client)));
    }

    #[test]
    fn hit_test_keeps_native_edges() {
        let (_platform, controller) = create(frameless_options());
        assert_eq!(hit(&controller, 2, 2), EventResult::Handled(Reply::Hit(HitRegion::ResizeTopLeft)));
        assert_eq!(hit(&controller, 797, 300), EventResult::Handled(Reply::Hit(HitRegion::ResizeRight)));
        assert_eq!(hit(&controller, 400, 596), EventResult::Handled(Reply::Hit(HitRegion::ResizeBottom)));
    }

    #[test]
    fn corner_beats_top_override() {
        let (platform, controller) = create(frameless_options());
        platform.force_default_hit(Some(HitRegion::ResizeBottomLeft));
        assert_eq!(
            hit(&controller, 400, 1),
            EventResult::Handled(Reply::Hit(HitRegion::ResizeBottomLeft))
        );
    }

    #[test]
    fn hit_test_without_monitor_info_is_client() {
        let (platform, controller) = create(frameless_options());
        platform.set_monitor_dpi(None);
        assert_eq!(hit(&controller, 400, 2), EventResult::Handled(Reply::Hit(HitRegion::Client)));
    }

    #[test]
    fn hit_test_band_scales_with_monitor_dpi() {
        let (platform, controller) = create(frameless_options());
        platform.set_monitor_dpi(Some(MonitorDpi::new(192, 192)));
        // Client origin is unchanged until the next frame query
        assert_eq!(hit(&controller, 400, 12), EventResult::Handled(Reply::Hit(HitRegion::ResizeTop)));
    }

    #[test]
    fn frame_query_maximized_adds_top_padding() {
        let (platform, controller) = create(frameless_options());
        platform.maximize(controller.handle());

        let window = platform.window(controller.handle()).unwrap();
        assert_eq!(window.bounds, Rect::from_edges(-8, -8, 1928, 1088));
        assert_eq!(window.client, Rect::from_edges(0, -4, 1920, 1080));
    }

    #[test]
    fn frame_query_restored_has_no_top_inset() {
        let (_platform, controller) = create(frameless_options());
        let result = controller.dispatch(WindowEvent::CalculateFrame {
            proposed: Rect::new(100, 100, 800, 600),
            in_place: true,
        });
        assert_eq!(
            result,
            EventResult::Handled(Reply::ClientArea(Rect::from_edges(108, 100, 892, 692)))
        );
    }

    #[test]
    fn frame_query_without_in_place_data_falls_through() {
        let (_platform, controller) = create(frameless_options());
        let result = controller.dispatch(WindowEvent::CalculateFrame {
            proposed: Rect::new(0, 0, 800, 600),
            in_place: false,
        });
        assert_eq!(result, EventResult::Unhandled);
    }

    #[test]
    fn frame_query_without_monitor_accepts_full_rect() {
        let (platform, controller) = create(frameless_options());
        platform.set_monitor_dpi(None);
        let proposed = Rect::new(0, 0, 800, 600);
        assert_eq!(
            controller.dispatch(WindowEvent::CalculateFrame {
                proposed,
                in_place: true,
            }),
            EventResult::Handled(Reply::ClientArea(proposed))
        );
    }

    #[test]
    fn full_screen_round_trip_restores_constraints() {
        let (platform, controller) = create(frameless_options());
        controller.set_min_size(500, 400);
        controller.set_max_size(1500, 1000);
        let before = controller.constraints();

        controller.enter_full_screen();
        assert!(controller.is_full_screen());
        let window = platform.window(controller.handle()).unwrap();
        assert!(window.full_screen);
        assert!(window.constraints.is_unconstrained());
        assert_eq!(controller.constraints(), before);

        controller.exit_full_screen();
        assert!(!controller.is_full_screen());
        assert_eq!(controller.constraints(), before);
        assert_eq!(platform.window(controller.handle()).unwrap().constraints, before);
    }

    #[test]
    fn full_screen_is_idempotent() {
        let (platform, controller) = create(frameless_options());
        controller.enter_full_screen();
        controller.set_max_size(1200, 900);
        controller.enter_full_screen();
        assert!(platform.window(controller.handle()).unwrap().constraints.is_unconstrained());

        controller.exit_full_screen();
        controller.exit_full_screen();
        assert_eq!(
            platform.window(controller.handle()).unwrap().constraints,
            SizeConstraints::new(Size::new(400, 300), Size::new(1200, 900))
        );
    }

    #[test]
    fn exit_without_full_screen_is_noop() {
        let (platform, controller) = create(frameless_options());
        let bounds = controller.bounds();
        controller.exit_full_screen();
        assert_eq!(controller.bounds(), bounds);
        assert!(!platform.window(controller.handle()).unwrap().full_screen);
    }

    #[test]
    fn full_screen_at_start_defers_constraints() {
        let (platform, controller) = create(WindowOptions {
            full_screen: true,
            ..frameless_options()
        });

        assert!(controller.is_full_screen());
        assert!(platform.window(controller.handle()).unwrap().constraints.is_unconstrained());
        assert_eq!(
            controller.constraints(),
            SizeConstraints::new(Size::new(400, 300), Size::ZERO)
        );

        controller.exit_full_screen();
        assert_eq!(
            platform.window(controller.handle()).unwrap().constraints.min,
            Size::new(400, 300)
        );
    }

    #[test]
    fn clearing_max_size_allows_large_resize() {
        let (_platform, controller) = create(WindowOptions {
            max_width: 1000,
            max_height: 1000,
            ..frameless_options()
        });

        controller.set_size(5000, 5000);
        assert_eq!(controller.bounds().size(), Size::new(1000, 1000));

        controller.set_max_size(0, 0);
        controller.set_size(5000, 5000);
        assert_eq!(controller.bounds().size(), Size::new(5000, 5000));
    }

    #[test]
    fn dpi_change_applies_suggested_rect() {
        let (platform, controller) = create(frameless_options());
        let before = controller.constraints();
        platform.set_monitor_dpi(Some(MonitorDpi::new(144, 144)));

        let suggested = Rect::from_edges(100, 100, 1600, 1200);
        let result = controller.dispatch(WindowEvent::DpiChanged {
            dpi: MonitorDpi::new(144, 144),
            suggested,
        });

        assert_eq!(result, EventResult::Unhandled);
        assert_eq!(controller.bounds(), suggested);
        assert_eq!(controller.constraints(), before);
        // The nested frame query already used the new scale
        assert_eq!(
            platform.window(controller.handle()).unwrap().client,
            Rect::from_edges(112, 100, 1588, 1188)
        );
    }

    #[test]
    fn failed_full_screen_keeps_window_and_constraints() {
        let (platform, controller) = create(frameless_options());
        controller.set_max_size(1500, 1000);
        let before = controller.constraints();
        let bounds = controller.bounds();
        platform.set_full_screen_fails(true);

        controller.enter_full_screen();

        assert!(!controller.is_full_screen());
        let window = platform.window(controller.handle()).unwrap();
        assert!(!window.full_screen);
        assert_eq!(window.constraints, before);
        assert_eq!(controller.bounds(), bounds);

        // A later attempt is not mistaken for a repeat
        platform.set_full_screen_fails(false);
        controller.enter_full_screen();
        assert!(controller.is_full_screen());
        assert!(platform.window(controller.handle()).unwrap().full_screen);
    }

    #[test]
    fn failed_full_screen_at_start_applies_constraints() {
        let platform = Rc::new(HeadlessPlatform::new());
        platform.set_full_screen_fails(true);
        let controller = WindowController::create(
            Rc::clone(&platform),
            WindowOptions {
                full_screen: true,
                ..frameless_options()
            },
            None,
        )
        .unwrap();

        assert!(!controller.is_full_screen());
        assert_eq!(
            platform.window(controller.handle()).unwrap().constraints,
            controller.constraints()
        );
    }

    #[test]
    fn non_client_click_takes_focus() {
        let (platform, controller) = create(frameless_options());
        assert_eq!(platform.focused(), None);
        let result = controller.dispatch(WindowEvent::NonClientLeftButtonDown);
        assert_eq!(result, EventResult::Unhandled);
        assert_eq!(platform.focused(), Some(controller.handle()));
    }

    #[test]
    fn moves_notify_position_listener() {
        let (platform, controller) = create(frameless_options());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        controller.set_position_listener(move |bounds| {
            sink.borrow_mut().push(bounds);
            Ok(())
        });

        platform.post_event(controller.handle(), WindowEvent::Moving);
        platform.post_event(controller.handle(), WindowEvent::Moved);
        platform.run_event_loop();

        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[0], controller.bounds());
    }

    #[test]
    fn cleared_listener_is_not_notified() {
        let (platform, controller) = create(frameless_options());
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        controller.set_position_listener(move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        platform.set_bounds(controller.handle(), Rect::new(10, 10, 800, 600));
        controller.clear_position_listener();
        platform.set_bounds(controller.handle(), Rect::new(50, 50, 800, 600));

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn child_window_tracks_parent_moves() {
        let platform = Rc::new(HeadlessPlatform::new());
        let main = WindowController::create(Rc::clone(&platform), frameless_options(), None).unwrap();
        let overlay = WindowController::create(
            Rc::clone(&platform),
            WindowOptions {
                width: 200,
                height: 100,
                ..WindowOptions::default()
            },
            Some(main.handle()),
        )
        .unwrap();

        let follower = Rc::downgrade(&overlay);
        main.set_position_listener(move |bounds| {
            let overlay = follower.upgrade().ok_or("overlay closed")?;
            overlay.platform.set_bounds(
                overlay.handle(),
                Rect::new(bounds.x + 20, bounds.y + 40, 200, 100),
            );
            Ok(())
        });

        platform.set_bounds(main.handle(), Rect::new(300, 200, 800, 600));
        assert_eq!(overlay.bounds(), Rect::new(320, 240, 200, 100));
    }

    #[test]
    fn listener_error_is_swallowed() {
        let (platform, controller) = create(frameless_options());
        controller.set_position_listener(|_| Err("observer failed".into()));
        platform.post_event(controller.handle(), WindowEvent::Moved);
        assert_eq!(platform.run_event_loop(), 0);
        assert!(controller.is_alive());
    }

    #[test]
    fn closing_top_level_window_ends_run() {
        let (platform, controller) = create(frameless_options());
        platform.post_close(controller.handle());
        platform.post_event(controller.handle(), WindowEvent::Moved);

        assert_eq!(controller.run(), 0);
        assert!(!controller.is_alive());
        assert!(platform.window(controller.handle()).unwrap().destroyed);
    }

    #[test]
    fn closing_child_window_keeps_loop_running() {
        let platform = Rc::new(HeadlessPlatform::new());
        let main = WindowController::create(Rc::clone(&platform), frameless_options(), None).unwrap();
        let child = WindowController::create(
            Rc::clone(&platform),
            WindowOptions::default(),
            Some(main.handle()),
        )
        .unwrap();

        let moves = Rc::new(Cell::new(0));
        let counter = Rc::clone(&moves);
        main.set_position_listener(move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        platform.post_close(child.handle());
        platform.post_event(main.handle(), WindowEvent::Moved);
        platform.post_close(main.handle());

        assert_eq!(main.run(), 0);
        assert_eq!(moves.get(), 1);
        assert!(!child.is_alive());
        assert!(!main.is_alive());
    }

    #[test]
    fn dropping_controller_destroys_window() {
        let (platform, controller) = create(frameless_options());
        let handle = controller.handle();
        drop(controller);
        assert!(platform.window(handle).unwrap().destroyed);
    }

    #[test]
    fn unrecognised_events_fall_through() {
        let (_platform, controller) = create(frameless_options());
        assert_eq!(controller.dispatch(WindowEvent::Other(0x000F)), EventResult::Unhandled);
    }
}
