use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::time::sleep;
use uuid::Uuid;

use crate::{
    error::MailError,
    mailer::{Email, Mailer},
    types::{NewBooking, Person},
};

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub fn example_person(name: &str, occupation: &str, days: &[&str], time_slots: &[&str]) -> Person {
    Person {
        id: Uuid::new_v4(),
        name: name.into(),
        occupation: occupation.into(),
        days: days.iter().map(|day| day.to_string()).collect(),
        time_slots: time_slots.iter().map(|slot| slot.to_string()).collect(),
    }
}

pub fn new_booking(person_name: &str, date: &str, time_slot: &str) -> NewBooking {
    NewBooking {
        person_name: person_name.into(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        time_slot: time_slot.into(),
        user_email: "client@example.com".into(),
    }
}

pub struct RecordingMailerInner {
    pub success: AtomicBool,
    pub calls_to_send: AtomicU64,
    pub sent: Mutex<Vec<Email>>,
}

#[derive(Clone)]
pub struct RecordingMailer(pub Arc<RecordingMailerInner>);

impl RecordingMailer {
    pub fn new() -> Self {
        Self(Arc::new(RecordingMailerInner {
            success: AtomicBool::new(true),
            calls_to_send: AtomicU64::default(),
            sent: Mutex::default(),
        }))
    }

    pub fn failing() -> Self {
        let mailer = Self::new();
        mailer.0.success.store(false, Ordering::SeqCst);
        mailer
    }

    pub fn sent(&self) -> Vec<Email> {
        self.0.sent.lock().unwrap().clone()
    }

    /// Emails are sent from a spawned task, so tests poll for them.
    pub async fn wait_for_emails(&self, count: usize) -> Vec<Email> {
        let mut waited = Duration::ZERO;
        loop {
            let sent = self.sent();
            if sent.len() >= count || waited >= WAIT_TIMEOUT {
                return sent;
            }
            sleep(POLL_INTERVAL).await;
            waited += POLL_INTERVAL;
        }
    }

    pub async fn wait_for_attempts(&self, count: u64) -> u64 {
        let mut waited = Duration::ZERO;
        loop {
            let attempts = self.0.calls_to_send.load(Ordering::SeqCst);
            if attempts >= count || waited >= WAIT_TIMEOUT {
                return attempts;
            }
            sleep(POLL_INTERVAL).await;
            waited += POLL_INTERVAL;
        }
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        self.0.calls_to_send.fetch_add(1, Ordering::SeqCst);
        if !self.0.success.load(Ordering::SeqCst) {
            return Err(MailError::Send("Supposed to fail".into()));
        }
        self.0.sent.lock().unwrap().push(email);
        Ok(())
    }
}
