use olosuashi_shared::{ServiceKind, Tour, TourImage, TourService};

use crate::pricing::PriceTag;

/// Read-side helpers for rendering a tour detail page
pub trait TourView {
    fn price_tag(&self) -> PriceTag;

    /// Flagged cover image, falling back to the first image.
    fn cover_image(&self) -> Option<&TourImage>;

    /// Gallery order: cover first, the rest as uploaded.
    fn gallery(&self) -> Vec<&TourImage>;

    /// Mean review rating rounded to one decimal.
    fn average_rating(&self) -> Option<f32>;

    fn services_of(&self, kind: ServiceKind) -> Vec<&TourService>;

    fn duration_label(&self) -> String;
}

impl TourView for Tour {
    fn price_tag(&self) -> PriceTag {
        PriceTag::from_pricing(&self.pricing)
    }

    fn cover_image(&self) -> Option<&TourImage> {
        self.images
            .iter()
            .find(|image| image.is_cover)
            .or_else(|| self.images.first())
    }

    fn gallery(&self) -> Vec<&TourImage> {
        let cover = self.cover_image();
        let mut gallery: Vec<&TourImage> = cover.into_iter().collect();
        gallery.extend(
            self.images
                .iter()
                .filter(|image| Some(image.id) != cover.map(|c| c.id)),
        );
        gallery
    }

    fn average_rating(&self) -> Option<f32> {
        if self.reviews.is_empty() {
            return None;
        }
        let sum: u32 = self.reviews.iter().map(|r| u32::from(r.rating.min(5))).sum();
        let mean = sum as f32 / self.reviews.len() as f32;
        Some((mean * 10.0).round() / 10.0)
    }

    fn services_of(&self, kind: ServiceKind) -> Vec<&TourService> {
        self.services.iter().filter(|s| s.kind == kind).collect()
    }

    fn duration_label(&self) -> String {
        match self.duration_days {
            1 => "1 day".to_string(),
            days => format!("{} days", days),
        }
    }
}
