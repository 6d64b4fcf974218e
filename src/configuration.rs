use std::path::PathBuf;

pub trait Configuration: Clone + Send + Sync + 'static {
    fn port(&self) -> String;
    fn database_url(&self) -> Option<String>;
    fn people_file(&self) -> Option<PathBuf>;
    fn receipts_dir(&self) -> PathBuf;
    fn public_base_url(&self) -> String;
    fn s3_bucket(&self) -> Option<String>;
    fn email_from(&self) -> Option<String>;
}
