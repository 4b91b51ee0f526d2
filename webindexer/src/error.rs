use thiserror::Error;
use webindexer_storage::StorageError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Render error: {0}")]
    Render(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The run was stopped through [`Indexer::cancel`](crate::Indexer::cancel)
    #[error("Indexing cancelled")]
    Cancelled,
}

impl From<handlebars::RenderError> for Error {
    fn from(e: handlebars::RenderError) -> Self {
        Error::Render(e.to_string())
    }
}

impl From<handlebars::TemplateError> for Error {
    fn from(e: handlebars::TemplateError) -> Self {
        Error::Render(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
