use olosuashi_core::{Navigator, Notifier, ToastLevel};
use tracing::{info, warn};

/// Terminal stand-in for the browser location: routes and external links
/// are printed for the user to follow.
#[derive(Default)]
pub struct ConsoleNavigator;

impl ConsoleNavigator {
    pub fn new() -> Self {
        Self
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: &str) {
        info!("Navigating to {}", route);
        println!("-> {}", route);
    }

    fn open_external(&self, url: &str) {
        info!("Opening external link");
        println!("Open this link to continue: {}", url);
    }
}

pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: ToastLevel, message: &str) {
        match level {
            ToastLevel::Success => println!("[ok] {}", message),
            ToastLevel::Error => {
                warn!("{}", message);
                eprintln!("[error] {}", message);
            }
        }
    }
}
