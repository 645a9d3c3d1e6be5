use olosuashi_shared::{Booking, BookingRequest};
use url::Url;

use crate::models::BookingContext;

/// Builds `wa.me` deep links that open a chat with the bookings desk.
#[derive(Debug, Clone)]
pub struct WhatsappLink {
    business_digits: String,
}

impl WhatsappLink {
    /// `business_number` may be written in any human format; only digits
    /// survive into the link.
    pub fn new(business_number: &str) -> Self {
        Self {
            business_digits: business_number.chars().filter(|c| c.is_ascii_digit()).collect(),
        }
    }

    pub fn for_booking(
        &self,
        context: &BookingContext,
        request: &BookingRequest,
        booking: &Booking,
    ) -> Result<Url, url::ParseError> {
        let travelers = match request.number_of_travelers {
            1 => "1 traveler".to_string(),
            n => format!("{} travelers", n),
        };

        let mut message = format!(
            "Hello Olosuashi! I'd like to confirm my booking for {} ({}) on {} for {}. Total: {}. Reference: {}.",
            context.title,
            context.duration,
            request.travel_date.format("%-d %B %Y"),
            travelers,
            request.total_price,
            booking.id,
        );
        if !request.special_requests.is_empty() {
            message.push_str(&format!(" Special requests: {}", request.special_requests));
        }

        Url::parse_with_params(
            &format!("https://wa.me/{}", self.business_digits),
            &[("text", message)],
        )
    }
}
