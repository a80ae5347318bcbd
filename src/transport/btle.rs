use async_trait::async_trait;
use btleplug::api::{
    BDAddr, Central, CharPropFlags, Characteristic, Manager as _, Peripheral as _, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use log::{debug, info};
use uuid::Uuid;

use super::{BleTransport, TransportError};
use crate::device::DeviceAddress;

impl From<btleplug::Error> for TransportError {
    fn from(error: btleplug::Error) -> Self {
        TransportError(error.to_string())
    }
}

/// `btleplug` on the first Bluetooth adapter of the host.
pub struct BtleTransport {
    adapter: Adapter,
}

impl BtleTransport {
    pub async fn first_adapter() -> Result<Self, TransportError> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::new("no Bluetooth adapters found"))?;

        info!("Using Bluetooth adapter {}", adapter.adapter_info().await?);

        Ok(Self { adapter })
    }
}

#[async_trait]
impl BleTransport for BtleTransport {
    type Link = Peripheral;
    type Characteristic = Characteristic;

    async fn connect(&mut self, address: DeviceAddress) -> Result<Peripheral, TransportError> {
        let target = BDAddr::from(address.octets());

        // Only peripherals the adapter already knows about, no scanning
        let peripheral = self
            .adapter
            .peripherals()
            .await?
            .into_iter()
            .find(|p| p.address() == target)
            .ok_or_else(|| TransportError::new("device is not known to the adapter"))?;

        if !peripheral.is_connected().await? {
            peripheral.connect().await?;
        }

        Ok(peripheral)
    }

    async fn discover_write_characteristic(
        &mut self,
        link: &Peripheral,
        service: Uuid,
    ) -> Result<Option<Characteristic>, TransportError> {
        link.discover_services().await?;

        let characteristic = link.characteristics().into_iter().find(|c| {
            c.service_uuid == service
                && c.properties
                    .intersects(CharPropFlags::WRITE | CharPropFlags::WRITE_WITHOUT_RESPONSE)
        });

        if let Some(c) = &characteristic {
            debug!("Writing to characteristic {} ({:?})", c.uuid, c.properties);
        }

        Ok(characteristic)
    }

    async fn write(
        &mut self,
        link: &Peripheral,
        characteristic: &Characteristic,
        data: &[u8],
    ) -> Result<(), TransportError> {
        let write_type = if characteristic
            .properties
            .contains(CharPropFlags::WRITE_WITHOUT_RESPONSE)
        {
            WriteType::WithoutResponse
        } else {
            WriteType::WithResponse
        };

        link.write(characteristic, data, write_type).await?;
        Ok(())
    }

    async fn is_connected(&self, link: &Peripheral) -> bool {
        link.is_connected().await.unwrap_or(false)
    }

    async fn disconnect(&mut self, link: Peripheral) -> Result<(), TransportError> {
        link.disconnect().await?;
        Ok(())
    }
}
