use olosuashi_core::{CredentialError, CredentialStore};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

/// Credentials persisted as a flat JSON object on disk, the CLI's stand-in
/// for browser local storage. Every write rewrites the whole file.
pub struct FileCredentialStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileCredentialStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CredentialError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| CredentialError::Corrupt(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(CredentialError::Unavailable(e.to_string())),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CredentialError::Unavailable(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| CredentialError::Corrupt(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| CredentialError::Unavailable(e.to_string()))?;
        debug!("Wrote {} credential key(s) to {}", entries.len(), self.path.display());
        Ok(())
    }

    fn edit(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), CredentialError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| CredentialError::Unavailable(e.to_string()))?;
        change(&mut entries);
        self.persist(&entries)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| CredentialError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.edit(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), CredentialError> {
        self.edit(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use olosuashi_core::session::{TOKEN_KEY, USER_KEY};
    use olosuashi_core::SessionContext;
    use olosuashi_shared::{UserProfile, UserRole};
    use std::sync::Arc;

    #[test]
    fn test_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/credentials.json");

        let store = Arc::new(FileCredentialStore::open(&path).unwrap());
        let session = SessionContext::new(store);
        session
            .sign_in(
                "jwt-abc",
                &UserProfile {
                    id: "u1".into(),
                    name: "Wanjiru".into(),
                    email: "wanjiru@olosuashi.com".into(),
                    role: UserRole::Admin,
                },
            )
            .unwrap();

        let reopened = FileCredentialStore::open(&path).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("jwt-abc"));
        assert!(reopened.get(USER_KEY).unwrap().unwrap().contains("admin"));
    }

    #[test]
    fn test_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let store = FileCredentialStore::open(&path).unwrap();
        store.set(TOKEN_KEY, "t").unwrap();
        store.remove(TOKEN_KEY).unwrap();

        assert_eq!(FileCredentialStore::open(&path).unwrap().get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(FileCredentialStore::open(&path), Err(CredentialError::Corrupt(_))));
    }
}
