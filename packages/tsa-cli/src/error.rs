use thiserror::Error;

/// A failure at the CLI boundary. `exit_code` is the process exit status
/// the binaries return via `std::process::exit`.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Argument(String),

    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to close output: {0}")]
    Close(std::io::Error),

    #[error("allocation failed: {0}")]
    Allocation(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Argument(_) => 1,
            CliError::Open { .. } => 2,
            CliError::Close(_) => 3,
            CliError::Allocation(_) => 4,
        }
    }
}
