use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use olosuashi_shared::{BookingRequest, PaymentMethod};
use regex::Regex;
use std::fmt;

use crate::models::{BookingContext, BookingDraft};

/// E.164 with a mandatory leading `+`.
pub const WHATSAPP_NUMBER_PATTERN: &str = r"^\+[1-9]\d{7,14}$";

static WHATSAPP_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(WHATSAPP_NUMBER_PATTERN).expect("WhatsApp number pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Please select a travel date")]
    MissingTravelDate,

    #[error("Travel date must be {earliest} or later")]
    TravelDateTooEarly { earliest: NaiveDate },

    #[error("At least one traveler is required")]
    NoTravelers,

    #[error("This trip accepts at most {max} travelers")]
    TooManyTravelers { max: u32 },

    #[error("Enter a WhatsApp number in international format matching ^\\+[1-9]\\d{{7,14}}$, e.g. +254712345678")]
    InvalidWhatsappNumber,

    #[error("Online payment is coming soon. Please choose WhatsApp or Call.")]
    OnlinePaymentUnavailable,
}

/// Every problem found in one pass, in form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn contains(&self, error: &FieldError) -> bool {
        self.0.contains(error)
    }

    pub fn first(&self) -> Option<&FieldError> {
        self.0.first()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Check the draft against the booking invariants and build the request
/// payload. `today` is injected so callers control the clock.
pub fn validate(
    context: &BookingContext,
    draft: &BookingDraft,
    today: NaiveDate,
) -> Result<BookingRequest, ValidationErrors> {
    let mut errors = Vec::new();
    let earliest = today.checked_add_days(Days::new(1)).unwrap_or(today);

    match draft.travel_date {
        None => errors.push(FieldError::MissingTravelDate),
        Some(date) if date < earliest => errors.push(FieldError::TravelDateTooEarly { earliest }),
        Some(_) => {}
    }

    if draft.number_of_travelers < 1 {
        errors.push(FieldError::NoTravelers);
    } else if let Some(max) = context.max_travelers {
        if draft.number_of_travelers > max {
            errors.push(FieldError::TooManyTravelers { max });
        }
    }

    let whatsapp_number = normalize_number(&draft.whatsapp_number);
    match draft.payment_method {
        method if !method.is_available() => errors.push(FieldError::OnlinePaymentUnavailable),
        PaymentMethod::Whatsapp if !WHATSAPP_NUMBER.is_match(&whatsapp_number) => {
            errors.push(FieldError::InvalidWhatsappNumber)
        }
        _ => {}
    }

    let travel_date = match (errors.is_empty(), draft.travel_date) {
        (true, Some(date)) => date,
        _ => return Err(ValidationErrors(errors)),
    };

    Ok(BookingRequest {
        tour_id: context.target_id,
        travel_date,
        number_of_travelers: draft.number_of_travelers,
        payment_method: draft.payment_method,
        special_requests: draft.special_requests.trim().to_string(),
        whatsapp_number: (draft.payment_method == PaymentMethod::Whatsapp)
            .then_some(whatsapp_number),
        total_price: draft.total_price(context),
    })
}

/// Users paste numbers with spaces; the pattern itself stays strict.
fn normalize_number(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}
