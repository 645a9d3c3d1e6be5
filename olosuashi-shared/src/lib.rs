pub mod models;
pub mod pii;

pub use models::{
    booking::{Booking, BookingRequest, BookingStatus, PaymentMethod},
    events::SessionExpiredEvent,
    experience::Experience,
    hero::HeroSlide,
    page::Page,
    tour::{
        Amount, AvailabilityWindow, Difficulty, ImageUpload, ItineraryDay, Location, Pricing,
        Review, ServiceKind, Tour, TourImage, TourPayload, TourService, TourSummary, Vehicle,
    },
    user::{UserProfile, UserRole},
    wishlist::WishlistStatus,
};
pub use pii::{Masked, Secret};
