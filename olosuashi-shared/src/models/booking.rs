use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::tour::Amount;

/// How the traveler intends to settle the booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Card checkout. Not live yet; rejected at submit.
    Online,
    #[default]
    Whatsapp,
    Call,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "online",
            PaymentMethod::Whatsapp => "whatsapp",
            PaymentMethod::Call => "call",
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, PaymentMethod::Online)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /experiences/bookings`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingRequest {
    pub tour_id: Uuid,
    pub travel_date: NaiveDate,
    pub number_of_travelers: u32,
    pub payment_method: PaymentMethod,
    pub special_requests: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,
    pub total_price: Amount,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

/// Booking record echoed back by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Booking {
    pub id: Uuid,
    #[serde(default)]
    pub status: BookingStatus,
    pub tour_id: Uuid,
    pub travel_date: NaiveDate,
    pub number_of_travelers: u32,
    pub payment_method: PaymentMethod,
    pub total_price: Amount,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_missing_whatsapp_number() {
        let request = BookingRequest {
            tour_id: Uuid::new_v4(),
            travel_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            number_of_travelers: 2,
            payment_method: PaymentMethod::Call,
            special_requests: String::new(),
            whatsapp_number: None,
            total_price: 3700,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["payment_method"], "call");
        assert_eq!(value["travel_date"], "2026-11-02");
        assert!(value.get("whatsapp_number").is_none());
    }
}
