pub mod booking;
pub mod events;
pub mod experience;
pub mod hero;
pub mod page;
pub mod tour;
pub mod user;
pub mod wishlist;
