use olosuashi_core::{RedirectOnExpiry, SessionContext};
use olosuashi_store::{ApiClient, Config, FileCredentialStore};
use std::sync::Arc;

use crate::console::{ConsoleNavigator, ConsoleNotifier};

/// Everything a command needs, wired once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub session: Arc<SessionContext>,
    pub client: Arc<ApiClient>,
    pub navigator: Arc<ConsoleNavigator>,
    pub notifier: Arc<ConsoleNotifier>,
}

impl AppState {
    pub fn build(config: Config) -> anyhow::Result<Self> {
        let store = Arc::new(FileCredentialStore::open(&config.session.credentials_path)?);
        let session = Arc::new(SessionContext::new(store));
        let navigator = Arc::new(ConsoleNavigator::new());
        session.subscribe(Arc::new(RedirectOnExpiry::new(navigator.clone())))?;

        let client = Arc::new(ApiClient::new(
            &config.api.base_url,
            config.api.timeout(),
            session.clone(),
        )?);

        Ok(Self {
            config,
            session,
            client,
            navigator,
            notifier: Arc::new(ConsoleNotifier),
        })
    }
}
