use crate::{
    backend::ScheduleBackend,
    error::BookingError,
    mailer::{send_in_background, Email, Mailer},
    receipt_storage::{receipt_key, ReceiptStorage},
    types::{Booking, PaymentEvidence},
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct ReceiptFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct ReceiptSubmission {
    pub booking_id: Option<String>,
    pub transaction_id: Option<String>,
    pub receipt: Option<ReceiptFile>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Stores the payment evidence on the booking and queues the confirmation email.
///
/// Input and booking existence are checked before anything is uploaded or written.
/// The email is sent in the background; its failure does not affect the result.
pub async fn attach_receipt<T: ScheduleBackend>(
    backend: &T,
    storage: &dyn ReceiptStorage,
    mailer: Arc<dyn Mailer>,
    submission: ReceiptSubmission,
) -> Result<Booking, BookingError> {
    let booking_id = non_empty(submission.booking_id);
    let transaction_id = non_empty(submission.transaction_id);
    let receipt = submission.receipt.filter(|receipt| !receipt.bytes.is_empty());

    let booking_id = match booking_id {
        Some(booking_id) if receipt.is_some() || transaction_id.is_some() => booking_id,
        _ => {
            return Err(BookingError::Validation(
                "Booking ID and either receipt or transaction ID required".into(),
            ))
        }
    };
    let booking_id = Uuid::parse_str(&booking_id)
        .map_err(|_| BookingError::Validation(format!("Invalid booking ID: {booking_id}")))?;

    if backend.booking(booking_id)?.is_none() {
        return Err(BookingError::NotFound(format!(
            "No booking with id {booking_id}"
        )));
    }

    let receipt_url = match receipt {
        Some(receipt) => {
            let key = receipt_key(receipt.file_name.as_deref());
            let content_type = receipt.content_type.unwrap_or_else(|| {
                mime_guess::from_path(receipt.file_name.as_deref().unwrap_or_default())
                    .first_or_octet_stream()
                    .to_string()
            });
            storage.upload(&key, receipt.bytes, &content_type).await?;
            Some(storage.public_url(&key))
        }
        None => None,
    };

    let evidence = PaymentEvidence {
        transaction_id,
        receipt_url,
    };
    let booking = backend.attach_payment(booking_id, evidence)?;
    info!(
        booking_id = %booking.id,
        has_transaction_id = booking.transaction_id.is_some(),
        has_receipt = booking.receipt_url.is_some(),
        "Payment evidence attached"
    );

    send_in_background(mailer, Email::booking_confirmation(&booking));
    Ok(booking)
}
