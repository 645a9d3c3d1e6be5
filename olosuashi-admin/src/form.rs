use once_cell::sync::Lazy;
use olosuashi_shared::{
    Amount, AvailabilityWindow, Difficulty, ItineraryDay, Location, Pricing, Tour, TourImage,
    TourPayload, TourService, Vehicle,
};
use regex::Regex;
use std::fmt;
use uuid::Uuid;

use crate::collection::{CollectionError, IndexedCollection};
use crate::images::PendingImage;

static SLUG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("slug pattern is valid"));

/// Lowercase, ASCII alphanumerics joined by single hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Which image becomes the cover once the save finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverChoice {
    /// Already on the server.
    Existing(Uuid),
    /// Row in `pending_images`; resolved after upload.
    Pending(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Title is required")]
    MissingTitle,

    #[error("Slug '{0}' may only contain lowercase letters, digits and single hyphens")]
    InvalidSlug(String),

    #[error("Base price must be greater than zero")]
    MissingPrice,

    #[error("Discount price must be below the base price")]
    DiscountNotBelowBase,

    #[error("Duration must be at least one day")]
    MissingDuration,

    #[error("Minimum group size {min} exceeds maximum {max}")]
    GroupSizeInverted { min: u32, max: u32 },

    #[error("Itinerary row {index} is numbered day {day}, expected day {expected}")]
    ItineraryNumbering { index: usize, day: u16, expected: u16 },

    #[error("Availability window {index} ends before it starts")]
    AvailabilityInverted { index: usize },

    #[error("Cover image selection does not match any image")]
    CoverNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormErrors(pub Vec<FormError>);

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for FormErrors {}

/// Edit-time draft of a tour in the admin back-office
#[derive(Debug, Clone, PartialEq)]
pub struct TourForm {
    /// Set when editing an existing record.
    pub id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    pub base_price: Amount,
    pub discount_price: Option<Amount>,
    pub currency: String,
    pub duration_days: u16,
    pub difficulty: Difficulty,
    pub min_group_size: u32,
    pub max_group_size: Option<u32>,
    pub is_featured: bool,
    pub vehicles: IndexedCollection<Vehicle>,
    pub itinerary: IndexedCollection<ItineraryDay>,
    pub locations: IndexedCollection<Location>,
    pub services: IndexedCollection<TourService>,
    pub availability: IndexedCollection<AvailabilityWindow>,
    pub existing_images: Vec<TourImage>,
    pub pending_images: IndexedCollection<PendingImage>,
    pub cover: Option<CoverChoice>,
}

impl Default for TourForm {
    fn default() -> Self {
        Self {
            id: None,
            title: String::new(),
            slug: String::new(),
            description: String::new(),
            category: String::new(),
            base_price: 0,
            discount_price: None,
            currency: Pricing::default().currency,
            duration_days: 1,
            difficulty: Difficulty::default(),
            min_group_size: 1,
            max_group_size: None,
            is_featured: false,
            vehicles: IndexedCollection::new(),
            itinerary: IndexedCollection::new(),
            locations: IndexedCollection::new(),
            services: IndexedCollection::new(),
            availability: IndexedCollection::new(),
            existing_images: Vec::new(),
            pending_images: IndexedCollection::new(),
            cover: None,
        }
    }
}

impl TourForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft copy of a record for editing.
    pub fn from_tour(tour: &Tour) -> Self {
        Self {
            id: Some(tour.id),
            title: tour.title.clone(),
            slug: tour.slug.clone(),
            description: tour.description.clone(),
            category: tour.category.clone().unwrap_or_default(),
            base_price: tour.pricing.base_price,
            discount_price: tour.pricing.discount_price,
            currency: tour.pricing.currency.clone(),
            duration_days: tour.duration_days,
            difficulty: tour.difficulty,
            min_group_size: tour.min_group_size,
            max_group_size: tour.max_group_size,
            is_featured: tour.is_featured,
            vehicles: tour.vehicles.clone().into(),
            itinerary: tour.itinerary.clone().into(),
            locations: tour.locations.clone().into(),
            services: tour.services.clone().into(),
            availability: tour.availability.clone().into(),
            existing_images: tour.images.clone(),
            pending_images: IndexedCollection::new(),
            cover: tour
                .images
                .iter()
                .find(|image| image.is_cover)
                .map(|image| CoverChoice::Existing(image.id)),
        }
    }

    /// Append a day numbered after the current last one.
    pub fn add_itinerary_day(&mut self, title: impl Into<String>, description: impl Into<String>) {
        let day = ItineraryDay {
            day: self.itinerary.len() as u16 + 1,
            title: title.into(),
            description: description.into(),
            ..Default::default()
        };
        self.itinerary = self.itinerary.push(day);
    }

    /// Remove a day and renumber the rest so days stay 1..n.
    pub fn remove_itinerary_day(&mut self, index: usize) -> Result<(), CollectionError> {
        self.itinerary = self.itinerary.remove(index)?.map_indexed(|i, day| ItineraryDay {
            day: i as u16 + 1,
            ..day.clone()
        });
        Ok(())
    }

    pub fn add_image(&mut self, image: PendingImage) {
        self.pending_images = self.pending_images.push(image);
    }

    /// Drop a queued image, keeping the cover choice pointed at the same file.
    pub fn remove_pending_image(&mut self, index: usize) -> Result<(), CollectionError> {
        self.pending_images = self.pending_images.remove(index)?;
        self.cover = match self.cover {
            Some(CoverChoice::Pending(i)) if i == index => None,
            Some(CoverChoice::Pending(i)) if i > index => Some(CoverChoice::Pending(i - 1)),
            other => other,
        };
        Ok(())
    }

    /// Check the draft and build the request body.
    pub fn validate(&self) -> Result<TourPayload, FormErrors> {
        let mut errors = Vec::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push(FormError::MissingTitle);
        }

        let slug = match self.slug.trim() {
            "" => slugify(title),
            given => given.to_string(),
        };
        if !title.is_empty() && !SLUG.is_match(&slug) {
            errors.push(FormError::InvalidSlug(slug.clone()));
        }

        if self.base_price == 0 {
            errors.push(FormError::MissingPrice);
        }
        if let Some(discount) = self.discount_price {
            if discount >= self.base_price {
                errors.push(FormError::DiscountNotBelowBase);
            }
        }
        if self.duration_days == 0 {
            errors.push(FormError::MissingDuration);
        }
        if let Some(max) = self.max_group_size {
            if self.min_group_size > max {
                errors.push(FormError::GroupSizeInverted { min: self.min_group_size, max });
            }
        }

        for (index, day) in self.itinerary.iter().enumerate() {
            let expected = index as u16 + 1;
            if day.day != expected {
                errors.push(FormError::ItineraryNumbering { index, day: day.day, expected });
            }
        }

        for (index, window) in self.availability.iter().enumerate() {
            if window.end_date < window.start_date {
                errors.push(FormError::AvailabilityInverted { index });
            }
        }

        let cover_ok = match self.cover {
            None => true,
            Some(CoverChoice::Existing(id)) => self.existing_images.iter().any(|i| i.id == id),
            Some(CoverChoice::Pending(index)) => index < self.pending_images.len(),
        };
        if !cover_ok {
            errors.push(FormError::CoverNotFound);
        }

        if !errors.is_empty() {
            return Err(FormErrors(errors));
        }

        let category = self.category.trim();
        Ok(TourPayload {
            title: title.to_string(),
            slug,
            description: self.description.trim().to_string(),
            category: (!category.is_empty()).then(|| category.to_string()),
            pricing: Pricing {
                base_price: self.base_price,
                discount_price: self.discount_price,
                currency: self.currency.clone(),
            },
            duration_days: self.duration_days,
            difficulty: self.difficulty,
            min_group_size: self.min_group_size,
            max_group_size: self.max_group_size,
            itinerary: self.itinerary.to_vec(),
            vehicles: self.vehicles.to_vec(),
            locations: self.locations.to_vec(),
            services: self.services.to_vec(),
            availability: self.availability.to_vec(),
            is_featured: self.is_featured,
        })
    }
}
