pub mod models;
pub mod orchestrator;
pub mod reducer;
pub mod validation;
pub mod whatsapp;

pub use models::{BookingContext, BookingDraft, BookingPhase};
pub use orchestrator::{BookingError, BookingModal, SubmitOutcome};
pub use reducer::{reduce, DraftAction};
pub use validation::{validate, FieldError, ValidationErrors, WHATSAPP_NUMBER_PATTERN};
pub use whatsapp::WhatsappLink;
