#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct SessionExpiredEvent {
    /// Request path whose 401 ended the session.
    pub trigger_path: String,
    pub expired_at: i64,
}
