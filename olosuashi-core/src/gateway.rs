use async_trait::async_trait;
use olosuashi_shared::{
    Booking, BookingRequest, Experience, HeroSlide, ImageUpload, Page, Tour, TourImage,
    TourPayload, TourSummary, WishlistStatus,
};
use uuid::Uuid;

use crate::query::ListQuery;
use crate::ApiResult;

/// Read and write access to tour records
#[async_trait]
pub trait TourGateway: Send + Sync {
    async fn list_tours(&self, query: &ListQuery) -> ApiResult<Page<TourSummary>>;

    async fn featured_tours(&self) -> ApiResult<Vec<TourSummary>>;

    async fn tour_by_slug(&self, slug: &str) -> ApiResult<Tour>;

    async fn create_tour(&self, payload: &TourPayload) -> ApiResult<Tour>;

    async fn update_tour(&self, id: Uuid, payload: &TourPayload) -> ApiResult<Tour>;

    async fn delete_tour(&self, id: Uuid) -> ApiResult<()>;
}

/// Tour image management. Uploads only make sense once the tour exists.
#[async_trait]
pub trait TourMediaGateway: Send + Sync {
    async fn upload_images(
        &self,
        tour_id: Uuid,
        images: Vec<ImageUpload>,
    ) -> ApiResult<Vec<TourImage>>;

    async fn set_cover_image(&self, tour_id: Uuid, image_id: Uuid) -> ApiResult<()>;

    async fn delete_image(&self, tour_id: Uuid, image_id: Uuid) -> ApiResult<()>;
}

#[async_trait]
pub trait ExperienceGateway: Send + Sync {
    async fn list_experiences(&self, query: &ListQuery) -> ApiResult<Page<Experience>>;

    async fn experience_by_slug(&self, slug: &str) -> ApiResult<Experience>;
}

#[async_trait]
pub trait BookingGateway: Send + Sync {
    /// Create a booking. Repeating the same `idempotency_key` must not
    /// create a second record.
    async fn create_booking(
        &self,
        request: &BookingRequest,
        idempotency_key: Uuid,
    ) -> ApiResult<Booking>;
}

#[async_trait]
pub trait WishlistGateway: Send + Sync {
    async fn wishlist_status(&self, tour_id: Uuid) -> ApiResult<WishlistStatus>;

    async fn add_to_wishlist(&self, tour_id: Uuid) -> ApiResult<WishlistStatus>;

    async fn remove_from_wishlist(&self, tour_id: Uuid) -> ApiResult<WishlistStatus>;
}

#[async_trait]
pub trait ContentGateway: Send + Sync {
    async fn hero_slides(&self) -> ApiResult<Vec<HeroSlide>>;
}

/// Slug listings consumed by the sitemap generator
#[async_trait]
pub trait SlugGateway: Send + Sync {
    async fn tour_slugs(&self) -> ApiResult<Vec<String>>;

    async fn experience_slugs(&self) -> ApiResult<Vec<String>>;
}
