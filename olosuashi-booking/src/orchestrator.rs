use chrono::NaiveDate;
use olosuashi_core::{routes, ApiError, BookingGateway, Navigator, Notifier, ToastLevel};
use olosuashi_shared::{Booking, Masked, PaymentMethod};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{BookingContext, BookingDraft, BookingPhase};
use crate::reducer::{reduce, DraftAction};
use crate::validation::{validate, FieldError, ValidationErrors};
use crate::whatsapp::WhatsappLink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// `call`: user was sent to the static confirmation page.
    Redirected { booking: Booking },
    /// `whatsapp`: booking recorded and a chat deep link opened.
    OpenedWhatsapp { booking: Booking, link: String },
    /// `online`: selection downgraded to WhatsApp, nothing sent.
    OnlinePaymentUnavailable,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{0}")]
    Invalid(ValidationErrors),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Could not build WhatsApp link: {0}")]
    Link(#[from] url::ParseError),

    #[error("This booking has already been submitted")]
    AlreadyCompleted,
}

/// The booking modal: owns one draft and drives it through submission.
///
/// The idempotency key is minted when the modal opens and reused by every
/// attempt, so a retry after a slow or failed response cannot create a
/// second booking.
pub struct BookingModal {
    context: BookingContext,
    draft: BookingDraft,
    phase: BookingPhase,
    idempotency_key: Uuid,
    inline_error: Option<String>,
    gateway: Arc<dyn BookingGateway>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    whatsapp: WhatsappLink,
}

impl BookingModal {
    pub fn open(
        context: BookingContext,
        gateway: Arc<dyn BookingGateway>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        whatsapp: WhatsappLink,
    ) -> Self {
        Self {
            context,
            draft: BookingDraft::default(),
            phase: BookingPhase::Idle,
            idempotency_key: Uuid::new_v4(),
            inline_error: None,
            gateway,
            navigator,
            notifier,
            whatsapp,
        }
    }

    pub fn context(&self) -> &BookingContext {
        &self.context
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn phase(&self) -> BookingPhase {
        self.phase
    }

    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    pub fn idempotency_key(&self) -> Uuid {
        self.idempotency_key
    }

    pub fn total_price(&self) -> u64 {
        self.draft.total_price(&self.context)
    }

    /// Apply a form edit. Ignored once the booking went through.
    pub fn dispatch(&mut self, action: DraftAction) {
        if self.phase == BookingPhase::Completed {
            return;
        }
        self.draft = reduce(&self.draft, action);
        self.inline_error = None;
    }

    pub async fn submit(&mut self, today: NaiveDate) -> Result<SubmitOutcome, BookingError> {
        if self.phase == BookingPhase::Completed {
            return Err(BookingError::AlreadyCompleted);
        }

        // 1. Online checkout is not live: downgrade and explain
        if !self.draft.payment_method.is_available() {
            self.draft = reduce(&self.draft, DraftAction::SetPaymentMethod(PaymentMethod::Whatsapp));
            let message = FieldError::OnlinePaymentUnavailable.to_string();
            self.notifier.notify(ToastLevel::Error, &message);
            self.inline_error = Some(message);
            self.phase = BookingPhase::Idle;
            info!("Online payment selected for {}, switched to WhatsApp", self.context.target_id);
            return Ok(SubmitOutcome::OnlinePaymentUnavailable);
        }

        // 2. Validate locally; nothing leaves the client on failure
        self.phase = BookingPhase::Validating;
        let request = match validate(&self.context, &self.draft, today) {
            Ok(request) => request,
            Err(errors) => {
                if let Some(first) = errors.first() {
                    self.notifier.notify(ToastLevel::Error, &first.to_string());
                }
                self.inline_error = Some(errors.to_string());
                self.phase = BookingPhase::Idle;
                return Err(BookingError::Invalid(errors));
            }
        };

        // 3. Send
        self.phase = BookingPhase::Submitting;
        info!(
            "Submitting booking for {} ({} travelers, {}, key {})",
            request.tour_id, request.number_of_travelers, request.payment_method, self.idempotency_key
        );

        let booking = match self.gateway.create_booking(&request, self.idempotency_key).await {
            Ok(booking) => booking,
            Err(e) => {
                error!("Booking submission failed: {}", e);
                let message = e.user_message();
                self.notifier.notify(ToastLevel::Error, &message);
                self.inline_error = Some(message);
                self.phase = BookingPhase::Idle;
                return Err(e.into());
            }
        };

        // 4. Hand off
        self.phase = BookingPhase::Completed;
        self.inline_error = None;
        info!("Booking {} created", booking.id);

        let outcome = match request.payment_method {
            PaymentMethod::Call => {
                self.notifier.notify(ToastLevel::Success, "Booking received. Please call us to confirm.");
                self.navigator.navigate(routes::BOOKING_SUCCESS);
                SubmitOutcome::Redirected { booking }
            }
            PaymentMethod::Whatsapp => {
                let link = self.whatsapp.for_booking(&self.context, &request, &booking)?;
                if let Some(number) = request.whatsapp_number.as_deref() {
                    info!("Opening WhatsApp chat for booking {} (contact {})", booking.id, Masked(number));
                }
                self.notifier.notify(ToastLevel::Success, "Booking received. Continue on WhatsApp.");
                self.navigator.open_external(link.as_str());
                SubmitOutcome::OpenedWhatsapp { booking, link: link.into() }
            }
            PaymentMethod::Online => {
                // Filtered out in step 1
                warn!("Online booking reached hand-off");
                SubmitOutcome::OnlinePaymentUnavailable
            }
        };

        self.draft = BookingDraft::default();
        Ok(outcome)
    }

    /// Close the modal, discarding the draft.
    pub fn close(self) {
        info!("Booking modal for {} closed in phase {:?}", self.context.target_id, self.phase);
    }
}
