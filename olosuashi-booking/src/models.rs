use chrono::NaiveDate;
use olosuashi_shared::{Amount, PaymentMethod};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What is being booked. Supplied by the detail page that opens the modal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingContext {
    /// Tour or experience id, sent as `tour_id`.
    pub target_id: Uuid,
    pub title: String,
    /// Price per traveler.
    pub unit_price: Amount,
    /// Display duration, e.g. "7 days" or "3 hours".
    pub duration: String,
    /// Upper bound on party size when the tour publishes one.
    pub max_travelers: Option<u32>,
}

/// Form state of the booking modal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingDraft {
    pub travel_date: Option<NaiveDate>,
    pub number_of_travelers: u32,
    pub payment_method: PaymentMethod,
    pub whatsapp_number: String,
    pub special_requests: String,
}

impl Default for BookingDraft {
    fn default() -> Self {
        Self {
            travel_date: None,
            number_of_travelers: 1,
            payment_method: PaymentMethod::Whatsapp,
            whatsapp_number: String::new(),
            special_requests: String::new(),
        }
    }
}

impl BookingDraft {
    pub fn total_price(&self, context: &BookingContext) -> Amount {
        context
            .unit_price
            .saturating_mul(Amount::from(self.number_of_travelers))
    }
}

/// Submission lifecycle: Idle → Validating → Submitting → Completed,
/// falling back to Idle on any failure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingPhase {
    Idle,
    Validating,
    Submitting,
    Completed,
}
