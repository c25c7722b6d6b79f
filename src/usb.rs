//! Boundary between a class driver and the USB peripheral driver that dispatches to it.
//!
//! The peripheral driver (enumeration, descriptors, packet memory) is not part of this crate. It
//! has to provide [`UsbPeripheral`] and call back into a [`ClassDriver`] for class requests and
//! OUT traffic on the endpoints the driver registered. Every callback receives the peripheral,
//! so the class driver never needs to hold a reference to it.

use usb_device::control::Request;
use usb_device::endpoint::{EndpointAddress, EndpointType};
use usb_device::Result;

/// Capabilities a class driver needs from the USB peripheral driver.
pub trait UsbPeripheral {
    /// Routes OUT transactions on `ep` to the registered class driver.
    fn register_out_handler(&mut self, ep: EndpointAddress);

    fn configure_endpoint(
        &mut self,
        ep: EndpointAddress,
        ep_type: EndpointType,
        max_packet_size: u16,
    ) -> Result<()>;

    /// Copies up to `buf.len()` bytes already received on `ep` and returns the count.
    fn read(&mut self, ep: EndpointAddress, buf: &mut [u8]) -> Result<usize>;

    /// Queues `data` for transmission on `ep`. Completion is asynchronous. Returns
    /// `Err(UsbError::WouldBlock)` while a previous transfer is still pending.
    fn write(&mut self, ep: EndpointAddress, data: &[u8]) -> Result<usize>;

    fn set_stalled(&mut self, ep: EndpointAddress, stalled: bool);

    /// While set, OUT transactions on `ep` are answered with NAK and the host retries later.
    fn set_nak(&mut self, ep: EndpointAddress, nak: bool);
}

/// Answer to the setup stage of a control transfer.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupStatus {
    /// Request accepted, a data stage may follow.
    Ok,
    /// Not handled by this class driver. The dispatcher stalls the control endpoint unless
    /// another driver takes it.
    Unhandled,
}

/// How the dispatcher must answer an OUT transaction.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutStatus {
    /// Data consumed, re-arm the endpoint.
    Ack,
    /// Data consumed, but leave the endpoint NAKing until the class driver clears it with
    /// [`UsbPeripheral::set_nak`].
    Nak,
    /// Reject the transfer with a STALL handshake.
    Stall,
}

/// Callbacks a USB class driver receives from the peripheral driver.
pub trait ClassDriver<P: UsbPeripheral> {
    /// Setup stage of a control transfer addressed to the class.
    fn handle_setup(&mut self, usb: &mut P, req: &Request) -> SetupStatus;

    /// `len` bytes arrived on `ep`: a control data stage on endpoint 0, or bulk data on an
    /// endpoint registered with [`UsbPeripheral::register_out_handler`].
    fn handle_out(&mut self, usb: &mut P, ep: EndpointAddress, len: usize) -> OutStatus;

    /// The host selected `configuration`. Zero means unconfigured.
    fn handle_set_configuration(&mut self, usb: &mut P, configuration: u8);

    /// The bus was reset.
    fn handle_reset(&mut self) {}
}
