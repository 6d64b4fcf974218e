use crate::availability::{
    available_people, available_slots, available_slots_in_occupation, parse_date, Availability,
    OccupationAvailability,
};
use crate::backend::ScheduleBackend;
use crate::error::BookingError;
use crate::payments::{attach_receipt, ReceiptFile, ReceiptSubmission};
use crate::receipt_storage::LocalReceiptStorage;
use crate::types::{NewBooking, PersonSummary};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Query};
use axum::{extract::State, Json};
use axum::{
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

const MAX_RECEIPT_REQUEST_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PeopleQuery {
    name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AvailabilityQuery {
    name: Option<String>,
    date: Option<String>,
    occupation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
enum AvailabilityResponse {
    Person(Availability),
    Occupation(OccupationAvailability),
}

/// `null` is treated like an absent field.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct BookingRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1))]
    person_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1))]
    date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1))]
    time_slot: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(email)]
    user_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookingResponse {
    message: String,
    booking_id: Uuid,
    person_name: String,
    date: NaiveDate,
    time_slot: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageResponse {
    message: String,
}

/// Builds the router. `files_dir` is served under `/files` when receipts are stored locally.
pub fn create_app<T: ScheduleBackend>(state: AppState<T>, files_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let people = Router::new()
        .route("/api/people", get(get_people::<T>))
        .route("/api/people/occupations", get(get_occupations::<T>));

    let slots = Router::new()
        .route("/api/slots/available", get(get_available_slots::<T>))
        .route("/api/slots/book", post(book_slot::<T>))
        .route(
            "/api/slots/upload-receipt",
            post(upload_receipt::<T>).layer(DefaultBodyLimit::max(MAX_RECEIPT_REQUEST_BYTES)),
        );

    let mut app = Router::new()
        .merge(people)
        .merge(slots)
        .with_state(state);

    if let Some(files_dir) = files_dir {
        app = app.nest_service(LocalReceiptStorage::ROUTE, ServeDir::new(files_dir));
    }

    app.layer(TraceLayer::new_for_http()).layer(cors)
}

async fn get_people<T: ScheduleBackend>(
    State(state): State<AppState<T>>,
    Query(query): Query<PeopleQuery>,
) -> Result<Json<Vec<PersonSummary>>, BookingError> {
    let filter = query
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());
    let people = state.schedule.people(filter)?;
    Ok(Json(people.iter().map(PersonSummary::from).collect()))
}

async fn get_occupations<T: ScheduleBackend>(
    State(state): State<AppState<T>>,
) -> Result<Json<Vec<String>>, BookingError> {
    Ok(Json(state.schedule.occupations()?))
}

async fn get_available_slots<T: ScheduleBackend>(
    State(state): State<AppState<T>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, BookingError> {
    let present = |value: Option<String>| value.filter(|value| !value.trim().is_empty());
    let date = present(query.date)
        .ok_or_else(|| BookingError::Validation("Date is required".into()))?;
    let date = parse_date(&date)?;

    let response = match (present(query.name), present(query.occupation)) {
        (Some(name), None) => {
            AvailabilityResponse::Person(available_slots(&state.schedule, &name, date)?)
        }
        (Some(name), Some(occupation)) => AvailabilityResponse::Person(
            available_slots_in_occupation(&state.schedule, &name, &occupation, date)?,
        ),
        (None, Some(occupation)) => {
            AvailabilityResponse::Occupation(available_people(&state.schedule, &occupation, date)?)
        }
        (None, None) => {
            return Err(BookingError::Validation(
                "Name or occupation is required".into(),
            ))
        }
    };
    Ok(Json(response))
}

async fn book_slot<T: ScheduleBackend>(
    State(state): State<AppState<T>>,
    request: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<Json<BookingResponse>, BookingError> {
    let Json(request) = request?;
    request.validate()?;
    let date = parse_date(&request.date)?;

    // Bookings are keyed by the stored name, whatever case the client used.
    let person = state
        .schedule
        .find_person(&request.person_name)?
        .ok_or_else(|| BookingError::NotFound(format!("No person named {}", request.person_name)))?;

    let booking = state.schedule.create_booking(NewBooking {
        person_name: person.name,
        date,
        time_slot: request.time_slot,
        user_email: request.user_email,
    })?;
    info!(booking_id = %booking.id, person = %booking.person_name, %date, slot = %booking.time_slot, "Slot booked");

    Ok(Json(BookingResponse {
        message: "Booking successful".into(),
        booking_id: booking.id,
        person_name: booking.person_name,
        date: booking.date,
        time_slot: booking.time_slot,
    }))
}

fn multipart_error(err: impl std::fmt::Display) -> BookingError {
    BookingError::Validation(format!("Invalid multipart request: {err}"))
}

async fn upload_receipt<T: ScheduleBackend>(
    State(state): State<AppState<T>>,
    mut multipart: Multipart,
) -> Result<Json<MessageResponse>, BookingError> {
    let mut submission = ReceiptSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(|name| name.to_string());
        match name.as_deref() {
            Some("booking_id") => {
                submission.booking_id = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("transaction_id") => {
                submission.transaction_id = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("receipt") => {
                let file_name = field.file_name().map(|name| name.to_string());
                let content_type = field.content_type().map(|mime| mime.to_string());
                let bytes = field.bytes().await.map_err(multipart_error)?;
                submission.receipt = Some(ReceiptFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    attach_receipt(
        &state.schedule,
        state.receipts.as_ref(),
        state.mailer.clone(),
        submission,
    )
    .await?;

    Ok(Json(MessageResponse {
        message: "Receipt info uploaded successfully".into(),
    }))
}
