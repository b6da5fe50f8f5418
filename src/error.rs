use thiserror::Error;

/// Subscriber store backend failures. Logged where they occur; they abort the
/// current operation but never the dispatch loops.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Delivery failure for a single recipient. Never aborts a fan-out batch.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("telegram api error: {0}")]
    Api(#[from] teloxide::RequestError),

    #[error("recipient {0} rejected message")]
    Rejected(i64),
}

/// Unrecoverable setup problems, the only errors `run_relay` propagates.
/// Once the loops are running nothing ends the process but cancellation.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("webhook listener bind error: {0}")]
    Bind(#[source] std::io::Error),

    #[error("webhook server error: {0}")]
    Serve(#[source] std::io::Error),
}
