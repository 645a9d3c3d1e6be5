use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub site: SiteConfig,
    pub session: SessionConfig,
    pub sitemap: SitemapConfig,
    pub admin: AdminConfig,
    pub carousel: CarouselConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_timeout() -> u64 { 30 }

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    pub base_url: String,
    /// Business number bookings are sent to, international format.
    pub whatsapp_number: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub credentials_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SitemapConfig {
    pub output_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl AdminConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

fn default_retry_attempts() -> u32 { 3 }
fn default_backoff_ms() -> u64 { 500 }

#[derive(Debug, Deserialize, Clone)]
pub struct CarouselConfig {
    #[serde(default = "default_rotation_ms")]
    pub rotation_interval_ms: u64,
}

impl CarouselConfig {
    pub fn rotation_interval(&self) -> Duration {
        Duration::from_millis(self.rotation_interval_ms)
    }
}

fn default_rotation_ms() -> u64 { 5000 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Path::new("config"))
    }

    /// Layered load from `dir`: `default`, then `$RUN_MODE` and `local`
    /// when present, then `OLOSUASHI__SECTION__KEY` environment variables.
    pub fn load_from(dir: &Path) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let file = |name: &str| dir.join(name).to_string_lossy().into_owned();

        let s = config::Config::builder()
            .add_source(config::File::with_name(&file("default")))
            .add_source(config::File::with_name(&file(&run_mode)).required(false))
            // not checked in
            .add_source(config::File::with_name(&file("local")).required(false))
            .add_source(config::Environment::with_prefix("OLOSUASHI").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const DEFAULTS: &str = r#"
[api]
base_url = "https://olosuashi.com/api"

[site]
base_url = "https://olosuashi.com"
whatsapp_number = "+254 712 345 678"

[session]
credentials_path = ".olosuashi/credentials.json"

[sitemap]
output_path = "public/sitemap.xml"

[admin]

[carousel]
rotation_interval_ms = 4000
"#;

    #[test]
    fn test_layered_load_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), DEFAULTS).unwrap();
        fs::write(
            dir.path().join("local.toml"),
            "[api]\nbase_url = \"http://localhost:5000/api\"\ntimeout_seconds = 5\n",
        )
        .unwrap();

        let config = Config::load_from(dir.path()).unwrap();

        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        assert_eq!(config.api.timeout(), Duration::from_secs(5));
        assert_eq!(config.admin.retry_attempts, 3);
        assert_eq!(config.admin.backoff(), Duration::from_millis(500));
        assert_eq!(config.carousel.rotation_interval(), Duration::from_secs(4));
        assert_eq!(config.sitemap.output_path, PathBuf::from("public/sitemap.xml"));
    }

    #[test]
    fn test_missing_default_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from(dir.path()).is_err());
    }
}
