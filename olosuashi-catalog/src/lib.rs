pub mod availability;
pub mod carousel;
pub mod listing;
pub mod pricing;
pub mod tour;
pub mod wishlist;

pub use availability::{AvailabilityCalendar, AvailabilityError};
pub use carousel::{AutoRotation, Carousel};
pub use listing::{CatalogPage, HomePage};
pub use pricing::PriceTag;
pub use tour::TourView;
pub use wishlist::{Wishlist, WishlistError};
