use std::path::PathBuf;

use crate::parse::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown configuration '{0}'")]
    UnknownConfiguration(String),

    #[error("Mismatching number of inputs ({inputs}) and names ({names})")]
    MismatchedArguments { names: usize, inputs: usize },

    #[error("Baseline configuration '{0}' is not among the inputs")]
    MissingBaseline(String),

    #[error("Plot error: {0}")]
    Plot(String),

    #[error("{} is not valid UTF-8", .0.display())]
    Encoding(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
