use crate::schema::{bookings, people};
use chrono::NaiveDate;
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = people)]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub occupation: String,
    /// Weekday names such as "Monday".
    pub days: Vec<String>,
    /// Candidate slot labels in display order.
    pub time_slots: Vec<String>,
}

impl Person {
    pub fn works_on(&self, weekday: &str) -> bool {
        self.days.iter().any(|day| day.eq_ignore_ascii_case(weekday))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<&Person> for PersonSummary {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id,
            name: person.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = bookings)]
pub struct Booking {
    pub id: Uuid,
    pub person_name: String,
    pub date: NaiveDate,
    pub time_slot: String,
    pub user_email: String,
    pub transaction_id: Option<String>,
    pub receipt_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = bookings)]
pub struct NewBooking {
    pub person_name: String,
    pub date: NaiveDate,
    pub time_slot: String,
    pub user_email: String,
}

/// Partial update of a booking's payment fields. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, AsChangeset)]
#[diesel(table_name = bookings)]
pub struct PaymentEvidence {
    pub transaction_id: Option<String>,
    pub receipt_url: Option<String>,
}

impl PaymentEvidence {
    pub fn is_empty(&self) -> bool {
        self.transaction_id.is_none() && self.receipt_url.is_none()
    }
}
