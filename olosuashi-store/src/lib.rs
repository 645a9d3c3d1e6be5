pub mod app_config;
pub mod credentials;
pub mod http_client;

pub use app_config::Config;
pub use credentials::FileCredentialStore;
pub use http_client::{ApiClient, ClientBuildError};
