use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to invoke `{binary}`, is it installed and on PATH?")]
    Unavailable {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("docker daemon is not running ({0})")]
    DaemonDown(String),

    #[error("no such container: {0}")]
    ContainerNotFound(String),

    #[error("`docker {command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("inspect output did not contain a record for {0}")]
    UnknownReference(String),

    #[error("{reference} matches more than one container: {matches}")]
    AmbiguousReference { reference: String, matches: String },

    #[error("invalid inspect JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
