use olosuashi_core::{ApiError, SessionContext, WishlistGateway};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum WishlistError {
    #[error("Sign in to save tours to your wishlist")]
    SignInRequired,

    #[error("Wishlist update failed: {0}")]
    Api(#[from] ApiError),
}

/// Per-user saved tours, toggled optimistically.
///
/// The local flag flips before the request goes out and is restored if the
/// request fails. There is no cache invalidation beyond [`Wishlist::refresh`].
pub struct Wishlist {
    gateway: Arc<dyn WishlistGateway>,
    session: Arc<SessionContext>,
    saved: HashMap<Uuid, bool>,
}

impl Wishlist {
    pub fn new(gateway: Arc<dyn WishlistGateway>, session: Arc<SessionContext>) -> Self {
        Self {
            gateway,
            session,
            saved: HashMap::new(),
        }
    }

    pub fn contains(&self, tour_id: Uuid) -> bool {
        self.saved.get(&tour_id).copied().unwrap_or(false)
    }

    pub async fn refresh(&mut self, tour_id: Uuid) -> Result<bool, WishlistError> {
        if !self.session.is_authenticated() {
            self.saved.remove(&tour_id);
            return Ok(false);
        }
        let status = self.gateway.wishlist_status(tour_id).await?;
        self.saved.insert(tour_id, status.in_wishlist);
        Ok(status.in_wishlist)
    }

    /// Flip membership. Returns the confirmed state.
    pub async fn toggle(&mut self, tour_id: Uuid) -> Result<bool, WishlistError> {
        if !self.session.is_authenticated() {
            return Err(WishlistError::SignInRequired);
        }

        let previous = self.contains(tour_id);
        self.saved.insert(tour_id, !previous);

        let result = if previous {
            self.gateway.remove_from_wishlist(tour_id).await
        } else {
            self.gateway.add_to_wishlist(tour_id).await
        };

        match result {
            Ok(status) => {
                self.saved.insert(tour_id, status.in_wishlist);
                info!("Wishlist {} for tour {}", if status.in_wishlist { "add" } else { "remove" }, tour_id);
                Ok(status.in_wishlist)
            }
            Err(e) => {
                warn!("Wishlist toggle failed for {}, rolling back: {}", tour_id, e);
                self.saved.insert(tour_id, previous);
                Err(e.into())
            }
        }
    }
}
