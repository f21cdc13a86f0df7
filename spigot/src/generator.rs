//! Spigot generators
//!
//! The spigot generator is responsible for pushing synthetic records into an
//! external ingestion endpoint, the variants of [`Server`]. Each variant works
//! in the same basic way: a record is generated, serialized and submitted,
//! then the loop paces itself before the next record. There is exactly one
//! variant today, the Kinesis stream publisher.

use serde::{Deserialize, Serialize};

use crate::signals::Shutdown;

pub mod kinesis;

#[derive(thiserror::Error, Debug)]
/// Errors produced by [`Server`].
pub enum Error {
    /// See [`crate::generator::kinesis::Error`] for details.
    #[error(transparent)]
    Kinesis(#[from] kinesis::Error),
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
/// Configuration for [`Server`]
pub enum Config {
    /// See [`crate::generator::kinesis::Config`] for details.
    Kinesis(kinesis::Config),
}

#[derive(Debug)]
/// The generator server.
///
/// All generators supported by spigot are a variant of this enum. Please see
/// variant documentation for details.
pub enum Server {
    /// See [`crate::generator::kinesis::Kinesis`] for details.
    Kinesis(kinesis::Kinesis),
}

impl Server {
    /// Create a new [`Server`]
    ///
    /// This function creates a new [`Server`] instance, deferring to the
    /// underlying sub-server.
    #[must_use]
    pub fn new(config: Config, shutdown: Shutdown) -> Self {
        match config {
            Config::Kinesis(conf) => Self::Kinesis(kinesis::Kinesis::new(conf, shutdown)),
        }
    }

    /// Run this [`Server`] to completion
    ///
    /// This function runs the sub-server to completion, or until a shutdown
    /// signal is received.
    ///
    /// # Errors
    ///
    /// Function will return an error if the underlying sub-server signals
    /// error.
    pub async fn run(self) -> Result<(), Error> {
        match self {
            Server::Kinesis(inner) => inner.spin().await?,
        }

        Ok(())
    }
}
