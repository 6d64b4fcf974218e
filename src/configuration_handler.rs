use crate::configuration::Configuration;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "slot_booking", about = "Appointment slot booking service")]
pub struct ConfigurationHandler {
    /// Port the HTTP server listens on
    #[arg(long, env = "PORT", default_value = "5000")]
    port: String,

    /// PostgreSQL connection URL. Without it, bookings are kept in memory.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// JSON file with the people offered by the in-memory backend
    #[arg(long, env = "PEOPLE_FILE")]
    people_file: Option<PathBuf>,

    /// Directory for uploaded receipts when no bucket is configured
    #[arg(long, env = "RECEIPTS_DIR", default_value = "./uploads")]
    receipts_dir: PathBuf,

    /// Base URL under which locally stored receipts are reachable
    #[arg(long, env = "PUBLIC_BASE_URL", default_value = "http://localhost:5000")]
    public_base_url: String,

    /// S3 bucket for receipts
    #[arg(long, env = "RECEIPTS_BUCKET")]
    s3_bucket: Option<String>,

    /// Sender address for confirmation emails. Without it, emails are only logged.
    #[arg(long, env = "EMAIL_FROM")]
    email_from: Option<String>,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(%err, "No .env file loaded");
        }
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn port(&self) -> String {
        self.port.clone()
    }

    fn database_url(&self) -> Option<String> {
        self.database_url.clone()
    }

    fn people_file(&self) -> Option<PathBuf> {
        self.people_file.clone()
    }

    fn receipts_dir(&self) -> PathBuf {
        self.receipts_dir.clone()
    }

    fn public_base_url(&self) -> String {
        self.public_base_url.trim_end_matches('/').to_string()
    }

    fn s3_bucket(&self) -> Option<String> {
        self.s3_bucket.clone()
    }

    fn email_from(&self) -> Option<String> {
        self.email_from.clone()
    }
}
