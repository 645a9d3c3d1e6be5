use chrono::NaiveDate;
use olosuashi_shared::PaymentMethod;

use crate::models::BookingDraft;

/// Edits the modal can apply to its draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftAction {
    SetTravelDate(Option<NaiveDate>),
    SetTravelers(u32),
    AddTraveler,
    RemoveTraveler,
    SetPaymentMethod(PaymentMethod),
    SetWhatsappNumber(String),
    SetSpecialRequests(String),
    Reset,
}

/// Pure transition function. Validation happens at submit time, so raw
/// values (including a zero traveler count) are stored as given, except
/// that the stepper never goes below one.
pub fn reduce(draft: &BookingDraft, action: DraftAction) -> BookingDraft {
    let mut next = draft.clone();

    match action {
        DraftAction::SetTravelDate(date) => next.travel_date = date,
        DraftAction::SetTravelers(count) => next.number_of_travelers = count,
        DraftAction::AddTraveler => {
            next.number_of_travelers = next.number_of_travelers.saturating_add(1)
        }
        DraftAction::RemoveTraveler => {
            next.number_of_travelers = next.number_of_travelers.saturating_sub(1).max(1)
        }
        DraftAction::SetPaymentMethod(method) => next.payment_method = method,
        DraftAction::SetWhatsappNumber(number) => next.whatsapp_number = number,
        DraftAction::SetSpecialRequests(text) => next.special_requests = text,
        DraftAction::Reset => next = BookingDraft::default(),
    }

    next
}
