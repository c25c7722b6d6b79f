use usb_device::endpoint::EndpointAddress;
use usb_device::UsbDirection;

use crate::{Error, Result};

/// Largest bulk packet a full-speed device can use, and the size of the bridge's transfer buffers.
pub const MAX_PACKET_SIZE: usize = 64;

/// Static description of the bridge: USB identity, endpoint layout, flow control thresholds.
///
/// Built once at startup and handed to [`CdcAcmBridge`](crate::CdcAcmBridge) by reference.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BridgeConfig {
    pub vid: u16,
    pub pid: u16,

    /// Baud rate used until the host sends SET_LINE_CODING.
    pub baud_rate: u32,

    /// Interrupt IN endpoint of the communication interface.
    pub notify_ep: u8,
    pub data_in_ep: u8,
    pub data_out_ep: u8,
    pub max_packet_size: u16,

    /// Once the transmit ring holds this many bytes, OUT transfers are NAKed.
    pub high_water_mark: usize,
    /// NAKing stops when the transmit ring drops below this many bytes.
    pub low_water_mark: usize,
}

impl BridgeConfig {
    pub const fn new() -> Self {
        BridgeConfig {
            vid: 0xcafe,
            pid: 0x5678,
            baud_rate: 115_200,
            notify_ep: 0x82,
            data_in_ep: 0x81,
            data_out_ep: 0x01,
            max_packet_size: MAX_PACKET_SIZE as u16,
            high_water_mark: MAX_PACKET_SIZE,
            low_water_mark: MAX_PACKET_SIZE,
        }
    }

    /// Checks the configuration against a transmit ring of `tx_capacity` usable bytes.
    ///
    /// A packet is only accepted while the ring is below the high-water mark, so the mark plus
    /// one full packet has to fit or the ring could overflow.
    pub fn validate(&self, tx_capacity: usize) -> Result<()> {
        if !matches!(self.max_packet_size, 8 | 16 | 32 | 64) {
            return Err(Error::InvalidConfig("max_packet_size"));
        }

        // The endpoint is released once depth < low_water_mark, which never holds for zero.
        if self.low_water_mark == 0 || self.low_water_mark > self.high_water_mark {
            return Err(Error::InvalidConfig("low_water_mark"));
        }

        let worst_depth = self
            .high_water_mark
            .checked_add(usize::from(self.max_packet_size) - 1);
        if !matches!(worst_depth, Some(depth) if depth <= tx_capacity) {
            return Err(Error::InvalidConfig("high_water_mark"));
        }

        let endpoints = [
            (self.notify_ep, UsbDirection::In),
            (self.data_in_ep, UsbDirection::In),
            (self.data_out_ep, UsbDirection::Out),
        ];
        for (addr, direction) in endpoints {
            let ep = EndpointAddress::from(addr);
            if ep.index() == 0 || ep.index() > 15 || ep.direction() != direction {
                return Err(Error::InvalidConfig("endpoint address"));
            }
        }

        Ok(())
    }

    pub(crate) fn data_in(&self) -> EndpointAddress {
        EndpointAddress::from(self.data_in_ep)
    }

    pub(crate) fn data_out(&self) -> EndpointAddress {
        EndpointAddress::from(self.data_out_ep)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}
