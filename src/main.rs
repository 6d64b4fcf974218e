use std::{sync::Arc, time::Duration};

use crate::{
    backend::ScheduleBackend,
    configuration::Configuration,
    configuration_handler::ConfigurationHandler,
    database_interface::DatabaseInterface,
    http::create_app,
    local_schedule::LocalSchedule,
    mailer::{LogMailer, Mailer, SesMailer},
    receipt_storage::{LocalReceiptStorage, ReceiptStorage, S3ReceiptStorage},
};
use tokio::time::sleep;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod availability;
mod backend;
mod configuration;
mod configuration_handler;
mod database_interface;
mod error;
mod http;
mod local_schedule;
mod mailer;
mod payments;
mod receipt_storage;
mod schema;
#[cfg(test)]
mod testutils;
mod types;

/// Collaborators shared by every request.
#[derive(Clone)]
pub struct AppState<T: ScheduleBackend> {
    pub schedule: T,
    pub receipts: Arc<dyn ReceiptStorage>,
    pub mailer: Arc<dyn Mailer>,
}

async fn connect_database(database_url: &str) -> DatabaseInterface {
    loop {
        match DatabaseInterface::new(database_url) {
            Ok(backend) => {
                info!("Successfully connected to database");
                return backend;
            }
            Err(err) => {
                error!(?err, "Failed to establish database connection. Retry in 1 sec. You may want to restart it with database disabled (bookings kept in memory).");
                sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

fn local_schedule(configuration: &ConfigurationHandler) -> LocalSchedule {
    match configuration.people_file() {
        Some(path) => match LocalSchedule::from_people_file(&path) {
            Ok(schedule) => schedule,
            Err(err) => {
                error!(%err, "Failed to load people file, starting without people");
                LocalSchedule::default()
            }
        },
        None => {
            warn!("No people file configured, the directory is empty");
            LocalSchedule::default()
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("################");
    println!("# Slot Booking #");
    println!("################");

    let configuration = ConfigurationHandler::parse_arguments();

    let receipts: Arc<dyn ReceiptStorage> = match configuration.s3_bucket() {
        Some(bucket) => {
            info!(%bucket, "Storing receipts in S3");
            Arc::new(S3ReceiptStorage::new(bucket).await)
        }
        None => {
            let storage = LocalReceiptStorage::new(
                configuration.receipts_dir(),
                configuration.public_base_url(),
            );
            info!(dir = %storage.root().display(), "Storing receipts locally");
            Arc::new(storage)
        }
    };
    let files_dir = configuration
        .s3_bucket()
        .is_none()
        .then(|| configuration.receipts_dir());

    let mailer: Arc<dyn Mailer> = match configuration.email_from() {
        Some(from) => Arc::new(SesMailer::new(from).await),
        None => {
            warn!("No sender address configured, confirmation emails are only logged");
            Arc::new(LogMailer)
        }
    };

    let address = format!("0.0.0.0:{}", configuration.port());
    println!("Accessable at:\n{}", address.clone());
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%err, %address, "Failed to bind");
            std::process::exit(1);
        }
    };

    let app = if let Some(database_url) = configuration.database_url() {
        let schedule = connect_database(&database_url).await;
        create_app(
            AppState {
                schedule,
                receipts,
                mailer,
            },
            files_dir,
        )
    } else {
        let schedule = local_schedule(&configuration);
        create_app(
            AppState {
                schedule,
                receipts,
                mailer,
            },
            files_dir,
        )
    };

    if let Err(err) = axum::serve(listener, app).await {
        error!(%err, "Server stopped");
    }
}
