//! Peripheral-side Bluetooth LE controller for IoT pucks.
//!
//! A puck advertises an iBeacon payload while idle, accepts GATT connections,
//! and runs application callbacks for characteristic writes outside of the
//! radio stack's event context. The radio stack itself is a collaborator
//! behind the [`Stack`] trait.
//!
//! ```no_run
//! use puck::gatt::CharProps;
//! use puck::{sim::SimStack, Config, Puck, Uuid};
//!
//! # fn main() -> puck::Result<()> {
//! let svc = Uuid::from_ascii("bftj light      ").unwrap();
//! let chr = Uuid::from_ascii("bftj light color").unwrap();
//! let mut puck = Puck::new(SimStack::new(), Config::default());
//! puck.add_characteristic(svc, chr, 3, CharProps::default());
//! puck.on_characteristic_write(chr, |_: &mut Puck<SimStack>, v: &[u8]| {
//!     tracing::info!("New color: {v:02X?}");
//! });
//! puck.init(0xC0FE)?;
//! while puck.drive()? {}
//! # Ok(())
//! # }
//! ```

pub use {
    config::*,
    gap::{Uuid, Uuid16},
    puck::*,
    stack::*,
};

pub mod att;
mod config;
pub mod gap;
pub mod gatt;
mod puck;
pub mod sim;
mod stack;
mod util;

pub(crate) use util::*;

/// Error type returned by the puck controller.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("radio stack error: {0}")]
    Stack(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[cfg(feature = "fs")]
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wraps an error returned by a [`Stack`] implementation.
    #[inline]
    pub fn stack(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Stack(Box::new(e))
    }
}

/// Common result type.
pub type Result<T> = std::result::Result<T, Error>;
