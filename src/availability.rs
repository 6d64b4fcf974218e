use crate::{backend::ScheduleBackend, error::BookingError, types::Person};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Slots a single person can still be booked into on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Availability {
    /// The person does not work on that weekday.
    Unavailable,
    Ok { slots: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonSlots {
    pub name: String,
    pub slots: Vec<String>,
}

/// Availability of everyone sharing an occupation on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OccupationAvailability {
    /// Nobody with that occupation works on that weekday.
    Unavailable,
    Ok { people: Vec<PersonSlots> },
}

pub fn parse_date(date: &str) -> Result<NaiveDate, BookingError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| BookingError::Validation(format!("Invalid date '{date}', expected YYYY-MM-DD")))
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Candidate slots minus booked ones, keeping the candidate order.
pub fn free_slots(candidates: &[String], booked: &[String]) -> Vec<String> {
    let booked: HashSet<&str> = booked.iter().map(String::as_str).collect();
    candidates
        .iter()
        .filter(|slot| !booked.contains(slot.as_str()))
        .cloned()
        .collect()
}

fn person_availability<T: ScheduleBackend>(
    backend: &T,
    person: &Person,
    date: NaiveDate,
) -> Result<Availability, BookingError> {
    let weekday = weekday_name(date);
    if !person.works_on(weekday) {
        debug!(person = %person.name, weekday, "Person not available on weekday");
        return Ok(Availability::Unavailable);
    }
    let booked = backend.booked_slots(&person.name, date)?;
    Ok(Availability::Ok {
        slots: free_slots(&person.time_slots, &booked),
    })
}

pub fn available_slots<T: ScheduleBackend>(
    backend: &T,
    name: &str,
    date: NaiveDate,
) -> Result<Availability, BookingError> {
    let person = backend
        .find_person(name)?
        .ok_or_else(|| BookingError::NotFound(format!("No availability found for this person: {name}")))?;
    person_availability(backend, &person, date)
}

/// Like [`available_slots`], but the person must also have the given occupation.
pub fn available_slots_in_occupation<T: ScheduleBackend>(
    backend: &T,
    name: &str,
    occupation: &str,
    date: NaiveDate,
) -> Result<Availability, BookingError> {
    let person = backend
        .find_person(name)?
        .filter(|person| person.occupation.to_lowercase() == occupation.to_lowercase())
        .ok_or_else(|| {
            BookingError::NotFound(format!("No {occupation} found with the name {name}"))
        })?;
    person_availability(backend, &person, date)
}

pub fn available_people<T: ScheduleBackend>(
    backend: &T,
    occupation: &str,
    date: NaiveDate,
) -> Result<OccupationAvailability, BookingError> {
    let people = backend.people_by_occupation(occupation)?;
    if people.is_empty() {
        return Err(BookingError::NotFound(format!(
            "No people found for occupation: {occupation}"
        )));
    }

    let mut available = Vec::new();
    for person in &people {
        if let Availability::Ok { slots } = person_availability(backend, person, date)? {
            available.push(PersonSlots {
                name: person.name.clone(),
                slots,
            });
        }
    }

    if available.is_empty() {
        Ok(OccupationAvailability::Unavailable)
    } else {
        Ok(OccupationAvailability::Ok { people: available })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::local_schedule::LocalSchedule;
    use crate::testutils::{example_person, new_booking};
    use test_case::test_case;

    fn alice_schedule() -> LocalSchedule {
        let schedule = LocalSchedule::default();
        schedule
            .add_person(example_person(
                "Alice",
                "Doctor",
                &["Monday", "Wednesday"],
                &["10:00", "11:00"],
            ))
            .unwrap();
        schedule
    }

    #[test_case("2024-06-03", "Monday")]
    #[test_case("2024-06-09", "Sunday")]
    #[test_case("2000-02-29", "Tuesday")]
    #[test_case("1900-01-01", "Monday")]
    fn test_weekday_name(date: &str, expected: &str) {
        assert_eq!(weekday_name(parse_date(date).unwrap()), expected);
    }

    #[test_case("2024-13-01")]
    #[test_case("03/06/2024")]
    #[test_case("")]
    fn test_invalid_date(date: &str) {
        assert!(matches!(parse_date(date), Err(BookingError::Validation(_))));
    }

    #[test]
    fn test_free_slots_preserves_order() {
        let candidates: Vec<String> = ["09:00", "10:00", "11:00", "12:00"]
            .iter()
            .map(|slot| slot.to_string())
            .collect();
        let booked = vec!["12:00".to_string(), "10:00".to_string()];
        assert_eq!(free_slots(&candidates, &booked), vec!["09:00", "11:00"]);
        assert_eq!(free_slots(&candidates, &[]), candidates);
    }

    #[test]
    fn test_booked_slot_is_excluded() {
        let schedule = alice_schedule();
        schedule
            .create_booking(new_booking("Alice", "2024-06-03", "10:00"))
            .unwrap();

        let availability =
            available_slots(&schedule, "Alice", parse_date("2024-06-03").unwrap()).unwrap();
        assert_eq!(
            availability,
            Availability::Ok {
                slots: vec!["11:00".into()]
            }
        );

        // Bookings on other dates do not matter.
        let availability =
            available_slots(&schedule, "alice", parse_date("2024-06-05").unwrap()).unwrap();
        assert_eq!(
            availability,
            Availability::Ok {
                slots: vec!["10:00".into(), "11:00".into()]
            }
        );
    }

    #[test_case("2024-06-04")]
    #[test_case("2024-06-08")]
    #[test_case("2024-06-09")]
    fn test_unavailable_weekday(date: &str) {
        let schedule = alice_schedule();
        let availability = available_slots(&schedule, "Alice", parse_date(date).unwrap()).unwrap();
        assert_eq!(availability, Availability::Unavailable);
    }

    #[test]
    fn test_fully_booked_day_is_empty_not_unavailable() {
        let schedule = alice_schedule();
        for slot in ["10:00", "11:00"] {
            schedule
                .create_booking(new_booking("Alice", "2024-06-03", slot))
                .unwrap();
        }
        let availability =
            available_slots(&schedule, "Alice", parse_date("2024-06-03").unwrap()).unwrap();
        assert_eq!(availability, Availability::Ok { slots: vec![] });
    }

    #[test]
    fn test_unknown_person() {
        let schedule = alice_schedule();
        let err = available_slots(&schedule, "Dave", parse_date("2024-06-03").unwrap()).unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }

    #[test]
    fn test_occupation() {
        let schedule = alice_schedule();
        schedule
            .add_person(example_person("Carol", "Doctor", &["Monday"], &["08:00"]))
            .unwrap();
        schedule
            .add_person(example_person("Dan", "Doctor", &["Friday"], &["08:00"]))
            .unwrap();
        schedule
            .create_booking(new_booking("Alice", "2024-06-03", "11:00"))
            .unwrap();

        let monday = parse_date("2024-06-03").unwrap();
        assert_eq!(
            available_people(&schedule, "doctor", monday).unwrap(),
            OccupationAvailability::Ok {
                people: vec![
                    PersonSlots {
                        name: "Alice".into(),
                        slots: vec!["10:00".into()]
                    },
                    PersonSlots {
                        name: "Carol".into(),
                        slots: vec!["08:00".into()]
                    },
                ]
            }
        );

        let tuesday = parse_date("2024-06-04").unwrap();
        assert_eq!(
            available_people(&schedule, "Doctor", tuesday).unwrap(),
            OccupationAvailability::Unavailable
        );

        assert!(matches!(
            available_people(&schedule, "Plumber", monday),
            Err(BookingError::NotFound(_))
        ));

        assert_eq!(
            available_slots_in_occupation(&schedule, "Carol", "Doctor", monday).unwrap(),
            Availability::Ok {
                slots: vec!["08:00".into()]
            }
        );
        assert!(matches!(
            available_slots_in_occupation(&schedule, "Carol", "Dentist", monday),
            Err(BookingError::NotFound(_))
        ));
    }

    #[test]
    fn test_serialized_shape() {
        assert_eq!(
            serde_json::to_value(Availability::Unavailable).unwrap(),
            serde_json::json!({ "status": "unavailable" })
        );
        assert_eq!(
            serde_json::to_value(Availability::Ok {
                slots: vec!["11:00".into()]
            })
            .unwrap(),
            serde_json::json!({ "status": "ok", "slots": ["11:00"] })
        );
    }
}
