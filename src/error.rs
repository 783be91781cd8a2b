//! Error kinds shared by the library, the server and the CLI.

use crate::fdf::FdfError;
use crate::process::ToolError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed request: bad JSON, bad base64, missing input file
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Temp directory or file I/O failed
    #[error("{context}: {source}")]
    Resource {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("could not create fdf file: {0}")]
    Fdf(#[from] FdfError),

    #[error("pdftk reported an error: {0}")]
    Tool(#[from] ToolError),

    /// pdftk exited cleanly but left no output behind
    #[error("could not open output file: {0}")]
    MissingOutput(#[source] std::io::Error),
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub fn resource(context: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| Error::Resource { context, source }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidInput(_) => 400,
            _ => 500,
        }
    }

    /// Short message safe to show to clients.
    ///
    /// The full error (paths, stderr) only goes to the server log.
    pub fn public_message(&self) -> &str {
        match self {
            Error::InvalidInput(msg) => msg,
            Error::Resource { context, .. } => context,
            Error::Fdf(_) => "could not create fdf file",
            Error::Tool(_) => "pdftk reported an error",
            Error::MissingOutput(_) => "could not open output file",
        }
    }
}
