/// Client routes the flows redirect to.
pub mod routes {
    pub const SIGN_IN: &str = "/signin";
    pub const BOOKING_SUCCESS: &str = "/booking-success";
}

/// Where the user ends up after a flow completes. Implemented by whatever
/// front end hosts the flows.
pub trait Navigator: Send + Sync {
    /// Replace the current location with an in-app route.
    fn navigate(&self, route: &str);

    /// Open a link outside the app (WhatsApp deep link, map, etc).
    fn open_external(&self, url: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

/// Transient notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: ToastLevel, message: &str);
}
