//! The Kinesis stream speaking generator.
//!
//! This generator publishes one synthetic website-interaction record per
//! iteration to an AWS Kinesis data stream, partitioned by the record's
//! `user_id`, then pauses for a random interval before the next record. A
//! failed submission is logged and abandoned; the loop never retries and
//! never stops on its own account. Expect one log line per outcome:
//!
//! `Sent record <count>: <event_type> - <timestamp> - <shard_id>`
//! `Error sending to Kinesis: <detail>`

use std::num::NonZeroU64;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_kinesis::{error::DisplayErrorContext, primitives::Blob};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, sleep};
use tracing::{error, info};

use spigot_payload::{Generator, Website};

use crate::signals::Shutdown;

/// Inclusive lower bound on the inter-record pause, in seconds.
const PACE_FLOOR_SECS: f64 = 0.5;
/// Upper bound on the inter-record pause, in seconds.
const PACE_CEILING_SECS: f64 = 2.0;

fn default_stream_name() -> String {
    "website-events-stream".to_string()
}

fn default_region() -> String {
    "eu-north-1".to_string()
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
/// Configuration of this generator.
pub struct Config {
    /// The seed for random operations against this target
    pub seed: [u8; 32],
    /// The name of the stream records are put to
    #[serde(default = "default_stream_name")]
    pub stream_name: String,
    /// The region the stream lives in
    #[serde(default = "default_region")]
    pub region: String,
    /// The number of loop iterations to drive before stopping. When unset the
    /// loop runs until a shutdown signal is received. Not exposed on the
    /// command line; this exists so the loop can be driven a fixed number of
    /// times under test.
    #[serde(default)]
    pub max_records: Option<NonZeroU64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: [0; 32],
            stream_name: default_stream_name(),
            region: default_region(),
            max_records: None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
/// Errors produced by [`Kinesis`].
pub enum Error {
    /// Record generation failed.
    #[error("Record generation error: {0}")]
    Payload(#[from] spigot_payload::Error),
    /// Record could not be encoded to JSON.
    #[error("Record could not be encoded: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
/// Acknowledgment returned by the stream for one accepted record.
pub struct Ack {
    /// The shard that accepted the record.
    pub shard_id: String,
    /// The sequence number the shard assigned to the record.
    pub sequence_number: String,
}

/// A failed record submission. Caught and logged at the call site, never
/// propagated.
#[derive(thiserror::Error, Debug)]
#[error("{0}")]
pub(crate) struct PutError(String);

/// A sink accepting single records routed by a partition key.
///
/// The live implementation speaks Kinesis `PutRecord`; tests substitute a
/// scripted fake.
pub(crate) trait StreamClient {
    /// Submit one record, returning the stream's acknowledgment.
    async fn put_record(
        &self,
        stream_name: &str,
        partition_key: &str,
        data: Vec<u8>,
    ) -> Result<Ack, PutError>;
}

#[derive(Debug, Clone)]
struct KinesisClient {
    client: aws_sdk_kinesis::Client,
}

impl KinesisClient {
    /// Create a new client pinned to `region`. Credentials resolve through
    /// the SDK's default provider chain.
    async fn connect(region: &str) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_owned()))
            .load()
            .await;

        Self {
            client: aws_sdk_kinesis::Client::new(&sdk_config),
        }
    }
}

impl StreamClient for KinesisClient {
    async fn put_record(
        &self,
        stream_name: &str,
        partition_key: &str,
        data: Vec<u8>,
    ) -> Result<Ack, PutError> {
        let response = self
            .client
            .put_record()
            .stream_name(stream_name)
            .partition_key(partition_key)
            .data(Blob::new(data))
            .send()
            .await
            .map_err(|err| PutError(format!("{}", DisplayErrorContext(&err))))?;

        Ok(Ack {
            shard_id: response.shard_id().to_string(),
            sequence_number: response.sequence_number().to_string(),
        })
    }
}

#[derive(Debug)]
/// The Kinesis generator.
///
/// This generator is responsible for publishing synthetic website events to a
/// Kinesis stream, one record per iteration.
pub struct Kinesis {
    config: Config,
    shutdown: Shutdown,
}

impl Kinesis {
    /// Create a new [`Kinesis`] instance
    #[must_use]
    pub fn new(config: Config, shutdown: Shutdown) -> Self {
        Self { config, shutdown }
    }

    /// Run [`Kinesis`] to completion or until a shutdown signal is received.
    ///
    /// # Errors
    ///
    /// Function will return an error if a record cannot be generated or
    /// encoded. Submission failures are logged and recovered, never returned.
    pub async fn spin(self) -> Result<(), Error> {
        let client = KinesisClient::connect(&self.config.region).await;
        self.drive(client).await?;

        Ok(())
    }

    /// Drive the publish loop against `client`, returning the number of
    /// records the stream acknowledged.
    ///
    /// The loop observes shutdown only between iterations: an in-flight
    /// submission always runs to completion, the inter-record pause is cut
    /// short. The final count is reported on every exit path.
    async fn drive<C>(self, client: C) -> Result<u64, Error>
    where
        C: StreamClient,
    {
        let Self {
            config,
            mut shutdown,
        } = self;
        let mut rng = StdRng::from_seed(config.seed);
        let website = Website::new();
        let mut sent: u64 = 0;
        let mut iterations: u64 = 0;

        info!("Starting data producer...");
        let shutdown_wait = shutdown.recv();
        tokio::pin!(shutdown_wait);
        loop {
            if let Some(max) = config.max_records {
                if iterations == max.get() {
                    break;
                }
            }
            iterations += 1;

            let event = website.generate(&mut rng)?;
            let payload = serde_json::to_vec(&event)?;
            let partition_key = event.user_id.to_string();

            match client
                .put_record(&config.stream_name, &partition_key, payload)
                .await
            {
                Ok(ack) => {
                    sent += 1;
                    info!(
                        "Sent record {sent}: {event_type} - {timestamp} - {shard_id}",
                        event_type = event.event_type,
                        timestamp = event.timestamp,
                        shard_id = ack.shard_id,
                    );
                }
                Err(err) => {
                    error!("Error sending to Kinesis: {err}");
                }
            }

            let pause =
                Duration::from_secs_f64(rng.random_range(PACE_FLOOR_SECS..PACE_CEILING_SECS));
            tokio::select! {
                () = sleep(pause) => {}
                () = &mut shutdown_wait => break,
            }
        }

        info!("Stopping producer. Total records sent: {sent}");
        Ok(sent)
    }
}
