use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteGenError {
    #[error("configuration error: {0}")] Config(String),
    #[error("provider error: {0}")] Provider(String),
    #[error("schema error: {0}")] Schema(String),
    #[error("persist failed: {0}")] Persist(String),
}
