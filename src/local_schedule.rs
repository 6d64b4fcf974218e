use crate::{
    backend::ScheduleBackend,
    error::BookingError,
    types::{Booking, NewBooking, PaymentEvidence, Person},
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::{error, info};
use uuid::Uuid;

/// Entry of the people seed file. Ids are assigned on load.
#[derive(Debug, Deserialize)]
struct PersonSeed {
    name: String,
    occupation: String,
    days: Vec<String>,
    time_slots: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LocalSchedule {
    people: Arc<Mutex<Vec<Person>>>,
    bookings: Arc<Mutex<HashMap<Uuid, Booking>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, BookingError> {
    mutex.lock().map_err(|err| {
        error!(%err, "Local schedule lock poisoned");
        BookingError::Store("Local schedule unavailable".into())
    })
}

impl LocalSchedule {
    pub fn from_people_file(path: &Path) -> Result<Self, BookingError> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            BookingError::Store(format!("Failed to read {}: {err}", path.display()))
        })?;
        let seeds: Vec<PersonSeed> = serde_json::from_str(&content).map_err(|err| {
            BookingError::Store(format!("Failed to parse {}: {err}", path.display()))
        })?;

        let schedule = Self::default();
        for seed in seeds {
            schedule.add_person(Person {
                id: Uuid::new_v4(),
                name: seed.name,
                occupation: seed.occupation,
                days: seed.days,
                time_slots: seed.time_slots,
            })?;
        }
        info!(people = lock(&schedule.people)?.len(), "Loaded people file");
        Ok(schedule)
    }

    pub fn add_person(&self, person: Person) -> Result<(), BookingError> {
        let mut people = lock(&self.people)?;
        people.push(person);
        people.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(())
    }
}

impl ScheduleBackend for LocalSchedule {
    fn people(&self, name_filter: Option<&str>) -> Result<Vec<Person>, BookingError> {
        let filter = name_filter.map(str::to_lowercase);
        Ok(lock(&self.people)?
            .iter()
            .filter(|person| match &filter {
                Some(filter) => person.name.to_lowercase().contains(filter),
                None => true,
            })
            .cloned()
            .collect())
    }

    fn occupations(&self) -> Result<Vec<String>, BookingError> {
        let mut occupations: Vec<String> = lock(&self.people)?
            .iter()
            .map(|person| person.occupation.clone())
            .collect();
        occupations.sort_unstable();
        occupations.dedup();
        Ok(occupations)
    }

    fn find_person(&self, name: &str) -> Result<Option<Person>, BookingError> {
        let name = name.to_lowercase();
        Ok(lock(&self.people)?
            .iter()
            .find(|person| person.name.to_lowercase() == name)
            .cloned())
    }

    fn people_by_occupation(&self, occupation: &str) -> Result<Vec<Person>, BookingError> {
        let occupation = occupation.to_lowercase();
        Ok(lock(&self.people)?
            .iter()
            .filter(|person| person.occupation.to_lowercase() == occupation)
            .cloned()
            .collect())
    }

    fn booked_slots(&self, person_name: &str, date: NaiveDate) -> Result<Vec<String>, BookingError> {
        Ok(lock(&self.bookings)?
            .values()
            .filter(|booking| booking.person_name == person_name && booking.date == date)
            .map(|booking| booking.time_slot.clone())
            .collect())
    }

    fn create_booking(&self, booking: NewBooking) -> Result<Booking, BookingError> {
        // Held across check and insert so that concurrent requests cannot both pass.
        let mut bookings = lock(&self.bookings)?;
        let taken = bookings.values().any(|existing| {
            existing.person_name == booking.person_name
                && existing.date == booking.date
                && existing.time_slot == booking.time_slot
        });
        if taken {
            return Err(BookingError::Conflict);
        }

        let id = Uuid::new_v4();
        let booking = Booking {
            id,
            person_name: booking.person_name,
            date: booking.date,
            time_slot: booking.time_slot,
            user_email: booking.user_email,
            transaction_id: None,
            receipt_url: None,
        };
        bookings.insert(id, booking.clone());
        Ok(booking)
    }

    fn booking(&self, id: Uuid) -> Result<Option<Booking>, BookingError> {
        Ok(lock(&self.bookings)?.get(&id).cloned())
    }

    fn attach_payment(&self, id: Uuid, evidence: PaymentEvidence) -> Result<Booking, BookingError> {
        let mut bookings = lock(&self.bookings)?;
        let booking = bookings
            .get_mut(&id)
            .ok_or_else(|| BookingError::NotFound(format!("No booking with id {id}")))?;

        if let Some(transaction_id) = evidence.transaction_id {
            booking.transaction_id = Some(transaction_id);
        }
        if let Some(receipt_url) = evidence.receipt_url {
            booking.receipt_url = Some(receipt_url);
        }
        Ok(booking.clone())
    }
}
