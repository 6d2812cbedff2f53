//! Demo host: opens one frameless window described by an optional TOML
//! options file and runs it until closed.

use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use tracing::{error, info};

use frameless_chrome::config::{WindowOptions, load_options};
use frameless_chrome::logging::init_logging;
use frameless_chrome::platform::Platform;
use frameless_chrome::{WindowController, WindowError};

fn open_and_run<P: Platform + 'static>(
    platform: Rc<P>,
    options: WindowOptions,
    before_run: impl FnOnce(&P, &WindowController<P>),
) -> Result<i32, WindowError> {
    let controller = WindowController::create(Rc::clone(&platform), options, None)?;
    controller.set_position_listener(|bounds| {
        info!(event = "demo.window_moved", x = bounds.x, y = bounds.y);
        Ok(())
    });
    controller.show();
    before_run(platform.as_ref(), controller.as_ref());
    Ok(controller.run())
}

#[cfg(windows)]
fn run(options: WindowOptions) -> Result<i32, Box<dyn std::error::Error>> {
    use frameless_chrome::platform::Win32Platform;

    let platform = Rc::new(Win32Platform::initialize()?);
    Ok(open_and_run(platform, options, |_, _| {})?)
}

#[cfg(not(windows))]
fn run(options: WindowOptions) -> Result<i32, Box<dyn std::error::Error>> {
    use frameless_chrome::platform::HeadlessPlatform;

    info!(event = "demo.headless", "No native frameless backend on this host, simulating");
    let platform = Rc::new(HeadlessPlatform::new());
    Ok(open_and_run(platform, options, |platform, controller| {
        platform.post_close(controller.handle());
    })?)
}

fn main() -> ExitCode {
    let quiet = std::env::args().any(|arg| arg == "--quiet" || arg == "-q");
    init_logging(quiet);

    let path = std::env::args()
        .skip(1)
        .find(|arg| !arg.starts_with('-'))
        .map(PathBuf::from);

    let options = match path {
        Some(path) => match load_options(&path) {
            Ok(options) => options,
            Err(e) => {
                error!(event = "demo.options_failed", error = %e);
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => WindowOptions {
            frameless: true,
            ..WindowOptions::default()
        },
    };

    match run(options) {
        Ok(code) => ExitCode::from(code.clamp(0, 255) as u8),
        Err(e) => {
            error!(event = "demo.failed", error = %e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
