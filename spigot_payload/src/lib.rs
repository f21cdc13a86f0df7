//! The spigot payloads
//!
//! This library supports record generation for the spigot project. The only
//! payload today is the website-interaction record, see [`website`].

#![deny(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub use website::{Browser, DeviceType, Event, EventType, Website};

pub mod website;

/// Errors related to record generation
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Timestamp could not be formatted
    #[error("Timestamp could not be formatted: {0}")]
    TimestampFormat(#[from] time::error::Format),
}

/// Generate instances of `Self::Output` from a source of randomness.
///
/// Generation draws every random choice from the `rng` passed in, never from
/// an ambient process-wide source. Callers that need reproducible output seed
/// the rng themselves.
pub trait Generator<'a> {
    /// The type of value produced per call.
    type Output: 'a;
    /// The error produced when generation fails.
    type Error: 'a;

    /// Generate a new instance of `Self::Output`.
    ///
    /// # Errors
    ///
    /// See the implementation for details.
    fn generate<R>(&'a self, rng: &mut R) -> Result<Self::Output, Self::Error>
    where
        R: rand::Rng + ?Sized;
}
