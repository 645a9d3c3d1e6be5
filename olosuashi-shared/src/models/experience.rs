use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tour::{Amount, TourImage};

/// Short bookable activity (game drive, village visit). Priced per person.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub price: Amount,
    pub duration_hours: u16,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<TourImage>,
}
