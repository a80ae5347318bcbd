//! The Bluetooth side of the strip.
//!
//! [`DeviceSession`](crate::device::DeviceSession) only talks to the radio
//! through [`BleTransport`], so it can run against `btleplug` on a real
//! adapter or against an in-memory mock in tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::device::DeviceAddress;

#[cfg(feature = "bluetooth")]
pub mod btle;

#[cfg(test)]
pub(crate) mod mock;

/// Whatever the BLE stack reported, flattened to a message.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

#[async_trait]
pub trait BleTransport: Send + Sync {
    /// An open connection to one peripheral.
    type Link: Send + Sync;
    /// A characteristic that color frames can be written to.
    type Characteristic: Send + Sync;

    async fn connect(&mut self, address: DeviceAddress) -> Result<Self::Link, TransportError>;

    /// The first writable characteristic under `service`, if there is one.
    async fn discover_write_characteristic(
        &mut self,
        link: &Self::Link,
        service: Uuid,
    ) -> Result<Option<Self::Characteristic>, TransportError>;

    async fn write(
        &mut self,
        link: &Self::Link,
        characteristic: &Self::Characteristic,
        data: &[u8],
    ) -> Result<(), TransportError>;

    async fn is_connected(&self, link: &Self::Link) -> bool;

    async fn disconnect(&mut self, link: Self::Link) -> Result<(), TransportError>;
}
