use olosuashi_shared::{Secret, SessionExpiredEvent, UserProfile, UserRole};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{info, warn};

use crate::navigation::{routes, Navigator};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Credential storage unavailable: {0}")]
    Unavailable(String),
    #[error("Stored credentials are corrupt: {0}")]
    Corrupt(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("An expiry subscriber is already registered")]
    AlreadySubscribed,
    #[error(transparent)]
    Credentials(#[from] CredentialError),
}

/// String key/value persistence for credentials, shaped like browser
/// local storage.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError>;

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError>;

    fn remove(&self, key: &str) -> Result<(), CredentialError>;
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| CredentialError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| CredentialError::Unavailable(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CredentialError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| CredentialError::Unavailable(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

/// Receives the end-of-session notification. Exactly one per context.
pub trait ExpirySubscriber: Send + Sync {
    fn on_session_expired(&self, event: &SessionExpiredEvent);
}

/// Sends the user to the sign-in page when the session ends.
pub struct RedirectOnExpiry {
    navigator: Arc<dyn Navigator>,
}

impl RedirectOnExpiry {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }
}

impl ExpirySubscriber for RedirectOnExpiry {
    fn on_session_expired(&self, _event: &SessionExpiredEvent) {
        self.navigator.navigate(routes::SIGN_IN);
    }
}

/// Authenticated session shared by every API call.
///
/// Expiry is latched: the first 401 wipes credentials and notifies the
/// subscriber, any 401 racing behind it is a no-op until the next
/// [`SessionContext::sign_in`].
pub struct SessionContext {
    store: Arc<dyn CredentialStore>,
    subscriber: OnceLock<Arc<dyn ExpirySubscriber>>,
    expired: AtomicBool,
}

impl SessionContext {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            subscriber: OnceLock::new(),
            expired: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self, subscriber: Arc<dyn ExpirySubscriber>) -> Result<(), SessionError> {
        self.subscriber
            .set(subscriber)
            .map_err(|_| SessionError::AlreadySubscribed)
    }

    pub fn sign_in(&self, token: &str, user: &UserProfile) -> Result<(), SessionError> {
        let user_json =
            serde_json::to_string(user).map_err(|e| CredentialError::Corrupt(e.to_string()))?;
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(USER_KEY, &user_json)?;
        self.expired.store(false, Ordering::SeqCst);
        info!("Signed in as {}", user.email);
        Ok(())
    }

    pub fn sign_out(&self) -> Result<(), SessionError> {
        self.clear_credentials()?;
        info!("Signed out");
        Ok(())
    }

    /// Token to attach as `Authorization: Bearer`. Storage failures read as
    /// "no token" so public endpoints keep working.
    pub fn bearer_token(&self) -> Option<Secret<String>> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()).map(Secret),
            Err(e) => {
                warn!("Could not read stored token: {}", e);
                None
            }
        }
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        let raw = match self.store.get(USER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Could not read stored user: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Ignoring unreadable stored user: {}", e);
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer_token().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated()
            && self
                .current_user()
                .map(|u| u.role == UserRole::Admin)
                .unwrap_or(false)
    }

    /// Handle a 401. Returns `true` when this call ended the session.
    pub fn expire(&self, trigger_path: &str) -> bool {
        if self.expired.swap(true, Ordering::SeqCst) {
            return false;
        }

        if let Err(e) = self.clear_credentials() {
            warn!("Failed to clear credentials on expiry: {}", e);
        }

        let event = SessionExpiredEvent {
            trigger_path: trigger_path.to_string(),
            expired_at: chrono::Utc::now().timestamp(),
        };
        warn!("Session expired after 401 on {}", trigger_path);

        match self.subscriber.get() {
            Some(subscriber) => subscriber.on_session_expired(&event),
            None => warn!("Session expired with no subscriber registered"),
        }
        true
    }

    fn clear_credentials(&self) -> Result<(), CredentialError> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingNavigator {
        routes: Mutex<Vec<String>>,
    }

    impl Navigator for CountingNavigator {
        fn navigate(&self, route: &str) {
            self.routes.lock().unwrap().push(route.to_string());
        }

        fn open_external(&self, _url: &str) {}
    }

    struct CountingSubscriber(AtomicUsize);

    impl ExpirySubscriber for CountingSubscriber {
        fn on_session_expired(&self, _event: &SessionExpiredEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn admin() -> UserProfile {
        UserProfile {
            id: "u-1".into(),
            name: "Naserian".into(),
            email: "ops@olosuashi.com".into(),
            role: UserRole::Admin,
        }
    }

    #[test]
    fn test_expiry_clears_credentials_and_redirects() {
        let store = Arc::new(MemoryCredentialStore::new());
        let session = SessionContext::new(store.clone());
        let navigator = Arc::new(CountingNavigator::default());
        session.subscribe(Arc::new(RedirectOnExpiry::new(navigator.clone()))).unwrap();

        session.sign_in("tok-123", &admin()).unwrap();
        assert!(session.is_admin());

        assert!(session.expire("/tours/featured"));

        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(USER_KEY).unwrap(), None);
        assert_eq!(*navigator.routes.lock().unwrap(), vec!["/signin".to_string()]);
    }

    #[test]
    fn test_expiry_is_latched_until_next_sign_in() {
        let session = SessionContext::new(Arc::new(MemoryCredentialStore::new()));
        let subscriber = Arc::new(CountingSubscriber(AtomicUsize::new(0)));
        session.subscribe(subscriber.clone()).unwrap();

        session.sign_in("tok", &admin()).unwrap();
        assert!(session.expire("/a"));
        assert!(!session.expire("/b"));
        assert_eq!(subscriber.0.load(Ordering::SeqCst), 1);

        session.sign_in("tok-2", &admin()).unwrap();
        assert!(session.expire("/c"));
        assert_eq!(subscriber.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_single_subscriber() {
        let session = SessionContext::new(Arc::new(MemoryCredentialStore::new()));
        let sub = Arc::new(CountingSubscriber(AtomicUsize::new(0)));
        session.subscribe(sub.clone()).unwrap();
        assert!(matches!(session.subscribe(sub), Err(SessionError::AlreadySubscribed)));
    }

    #[test]
    fn test_corrupt_user_is_ignored() {
        let store = Arc::new(MemoryCredentialStore::new());
        store.set(TOKEN_KEY, "tok").unwrap();
        store.set(USER_KEY, "{not json").unwrap();
        let session = SessionContext::new(store);

        assert!(session.is_authenticated());
        assert!(session.current_user().is_none());
        assert!(!session.is_admin());
    }
}
