use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prices are whole currency units as the backend reports them.
pub type Amount = u64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Moderate,
    Challenging,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pricing {
    pub base_price: Amount,
    #[serde(default)]
    pub discount_price: Option<Amount>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            base_price: 0,
            discount_price: None,
            currency: default_currency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TourImage {
    pub id: Uuid,
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub is_cover: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ItineraryDay {
    pub day: u16,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub accommodation: Option<String>,
    #[serde(default)]
    pub meals: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Vehicle {
    pub name: String,
    #[serde(default)]
    pub vehicle_type: String,
    pub capacity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    #[default]
    Included,
    Excluded,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TourService {
    pub name: String,
    pub kind: ServiceKind,
}

/// A bookable date range with a fixed number of seats.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub slots: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Review {
    pub author: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Full tour record as returned by `GET /tours/slug/:slug`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tour {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    pub pricing: Pricing,
    pub duration_days: u16,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_min_group")]
    pub min_group_size: u32,
    #[serde(default)]
    pub max_group_size: Option<u32>,
    #[serde(default)]
    pub images: Vec<TourImage>,
    #[serde(default)]
    pub itinerary: Vec<ItineraryDay>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub services: Vec<TourService>,
    #[serde(default)]
    pub availability: Vec<AvailabilityWindow>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_min_group() -> u32 {
    1
}

/// List-view projection returned by `GET /tours` and `GET /tours/featured`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TourSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub pricing: Pricing,
    pub duration_days: u16,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
}

/// Body of `POST /tours` and `PATCH /tours/:id`. Images travel separately.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TourPayload {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub category: Option<String>,
    pub pricing: Pricing,
    pub duration_days: u16,
    pub difficulty: Difficulty,
    pub min_group_size: u32,
    pub max_group_size: Option<u32>,
    pub itinerary: Vec<ItineraryDay>,
    pub vehicles: Vec<Vehicle>,
    pub locations: Vec<Location>,
    pub services: Vec<TourService>,
    pub availability: Vec<AvailabilityWindow>,
    pub is_featured: bool,
}

/// One file part of a `POST /tours/:id/images` multipart request.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
