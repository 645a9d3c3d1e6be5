use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response of `GET/POST/DELETE /tours/:id/wishlist`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WishlistStatus {
    pub tour_id: Uuid,
    pub in_wishlist: bool,
}
