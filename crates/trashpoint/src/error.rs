use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrashPointError {
    #[error("Dataset fetch error: {0}")]
    Fetch(#[from] trashpoint_data::FetchError),
    #[error("Loader configuration error: {0}")]
    LoaderConfig(#[from] trashpoint_data::ConfigError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TrashPointError>;
