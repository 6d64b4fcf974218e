use crate::error::BookingError;
use crate::types::{Booking, NewBooking, PaymentEvidence, Person};
use chrono::NaiveDate;
use uuid::Uuid;

/// Store holding people's weekly availability and the bookings made against it.
pub trait ScheduleBackend: Clone + Send + Sync + 'static {
    /// People ordered by name, optionally filtered by a case-insensitive name fragment.
    fn people(&self, name_filter: Option<&str>) -> Result<Vec<Person>, BookingError>;
    /// Distinct occupations, sorted.
    fn occupations(&self) -> Result<Vec<String>, BookingError>;
    /// Case-insensitive lookup by exact name.
    fn find_person(&self, name: &str) -> Result<Option<Person>, BookingError>;
    fn people_by_occupation(&self, occupation: &str) -> Result<Vec<Person>, BookingError>;
    /// Slot labels already booked for the person on the given date.
    fn booked_slots(&self, person_name: &str, date: NaiveDate) -> Result<Vec<String>, BookingError>;
    /// Inserts the booking unless the (person, date, slot) triple is taken,
    /// in which case `BookingError::Conflict` is returned. Check and insert are atomic.
    fn create_booking(&self, booking: NewBooking) -> Result<Booking, BookingError>;
    fn booking(&self, id: Uuid) -> Result<Option<Booking>, BookingError>;
    /// Applies the supplied evidence fields and returns the updated booking.
    fn attach_payment(&self, id: Uuid, evidence: PaymentEvidence) -> Result<Booking, BookingError>;
}
