//! Mock hardware shared by the unit tests.

extern crate std;

use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::vec::Vec;

use usb_device::endpoint::{EndpointAddress, EndpointType};
use usb_device::{Result, UsbError};

use crate::uart::{Control, Registers, Status, SR};
use crate::usb::{ClassDriver, OutStatus, UsbPeripheral};

/// UART clocked at 36 MHz whose transmitter is always ready.
pub struct MockUart {
    pub control: Cell<Control>,
    pub divisor: Cell<u16>,
    pub unmasked: Cell<bool>,
    pub rx_reads: Cell<usize>,
    rx: RefCell<VecDeque<u8>>,
    tx: RefCell<Vec<u8>>,
}

impl MockUart {
    pub fn new() -> Self {
        MockUart {
            control: Cell::new(Control::new(0)),
            divisor: Cell::new(0),
            unmasked: Cell::new(false),
            rx_reads: Cell::new(0),
            rx: RefCell::new(VecDeque::new()),
            tx: RefCell::new(Vec::new()),
        }
    }

    /// Latches one byte in the receive data register.
    pub fn receive(&self, byte: u8) {
        self.rx.borrow_mut().push_back(byte);
    }

    pub fn transmitted(&self) -> Vec<u8> {
        self.tx.borrow().clone()
    }
}

impl Registers for MockUart {
    fn clock_hz(&self) -> u32 {
        36_000_000
    }

    fn control(&self) -> Control {
        self.control.get()
    }

    fn set_control(&self, control: Control) {
        self.control.set(control);
    }

    fn status(&self) -> Status {
        let mut status = Status::new(0);
        status.modify(SR::TXE::SET);
        if !self.rx.borrow().is_empty() {
            status.modify(SR::RXNE::SET);
        }
        status
    }

    fn read_data(&self) -> u8 {
        self.rx_reads.set(self.rx_reads.get() + 1);
        self.rx.borrow_mut().pop_front().unwrap_or(0)
    }

    fn write_data(&self, byte: u8) {
        self.tx.borrow_mut().push(byte);
    }

    fn set_divisor(&self, divisor: u16) {
        self.divisor.set(divisor);
    }

    fn unmask_interrupt(&self) {
        self.unmasked.set(true);
    }
}

/// USB peripheral that records everything a class driver asks of it.
pub struct MockUsb {
    pub out_handlers: Vec<u8>,
    pub configured: Vec<(u8, EndpointType, u16)>,
    /// Non-empty bulk IN transfers as (endpoint address, data).
    pub in_transfers: Vec<(u8, Vec<u8>)>,
    /// Refuse IN writes with `WouldBlock`.
    pub in_busy: bool,
    control_acks: usize,
    received: Vec<(u8, Vec<u8>)>,
    stalled: Vec<u8>,
    nak: Vec<u8>,
}

impl MockUsb {
    pub fn new() -> Self {
        MockUsb {
            out_handlers: Vec::new(),
            configured: Vec::new(),
            in_transfers: Vec::new(),
            in_busy: false,
            control_acks: 0,
            received: Vec::new(),
            stalled: Vec::new(),
            nak: Vec::new(),
        }
    }

    /// Plays the dispatcher for one OUT transaction: latches `data` on `ep`, runs the class
    /// driver and applies its answer to the endpoint.
    pub fn deliver<C: ClassDriver<Self>>(
        &mut self,
        class: &mut C,
        ep: EndpointAddress,
        data: &[u8],
    ) -> OutStatus {
        let addr = u8::from(ep);
        self.received.retain(|(a, _)| *a != addr);
        self.received.push((addr, data.to_vec()));

        let status = class.handle_out(self, ep, data.len());
        match status {
            OutStatus::Ack => {}
            OutStatus::Nak => self.set_nak(ep, true),
            OutStatus::Stall => self.set_stalled(ep, true),
        }
        status
    }

    /// Zero-length packets written to the control IN endpoint.
    pub fn control_acks(&self) -> usize {
        self.control_acks
    }

    pub fn is_stalled(&self, ep: EndpointAddress) -> bool {
        self.stalled.contains(&u8::from(ep))
    }

    pub fn is_nak(&self, ep: EndpointAddress) -> bool {
        self.nak.contains(&u8::from(ep))
    }
}

impl UsbPeripheral for MockUsb {
    fn register_out_handler(&mut self, ep: EndpointAddress) {
        self.out_handlers.push(u8::from(ep));
    }

    fn configure_endpoint(
        &mut self,
        ep: EndpointAddress,
        ep_type: EndpointType,
        max_packet_size: u16,
    ) -> Result<()> {
        self.configured.push((u8::from(ep), ep_type, max_packet_size));
        Ok(())
    }

    fn read(&mut self, ep: EndpointAddress, buf: &mut [u8]) -> Result<usize> {
        let addr = u8::from(ep);
        let pos = self
            .received
            .iter()
            .position(|(a, _)| *a == addr)
            .ok_or(UsbError::WouldBlock)?;
        let (_, data) = self.received.remove(pos);

        if data.len() > buf.len() {
            return Err(UsbError::BufferOverflow);
        }
        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }

    fn write(&mut self, ep: EndpointAddress, data: &[u8]) -> Result<usize> {
        if ep.index() == 0 {
            if data.is_empty() {
                self.control_acks += 1;
            }
            return Ok(data.len());
        }

        if self.in_busy {
            return Err(UsbError::WouldBlock);
        }
        self.in_transfers.push((u8::from(ep), data.to_vec()));
        Ok(data.len())
    }

    fn set_stalled(&mut self, ep: EndpointAddress, stalled: bool) {
        let addr = u8::from(ep);
        self.stalled.retain(|&a| a != addr);
        if stalled {
            self.stalled.push(addr);
        }
    }

    fn set_nak(&mut self, ep: EndpointAddress, nak: bool) {
        let addr = u8::from(ep);
        self.nak.retain(|&a| a != addr);
        if nak {
            self.nak.push(addr);
        }
    }
}
