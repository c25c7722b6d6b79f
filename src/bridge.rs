use usb_device::control::{Recipient, Request, RequestType};
use usb_device::endpoint::{EndpointAddress, EndpointType};
use usb_device::{UsbDirection, UsbError};

use crate::cdc_acm::*;
use crate::config::{BridgeConfig, MAX_PACKET_SIZE};
use crate::serial_port::SerialPort;
use crate::uart::Registers;
use crate::usb::{ClassDriver, OutStatus, SetupStatus, UsbPeripheral};
use crate::Result;

/// USB CDC-ACM class driver that relays bytes between the host and a [`SerialPort`].
///
/// Host to UART: bulk OUT packets are pushed into the transmit ring. When the ring reaches the
/// high-water mark the OUT endpoint is left NAKing, and [`process`](Self::process) releases it
/// once the UART interrupt has drained the ring below the low-water mark. Nothing is ever dropped
/// on this path; the host's retries are the flow control.
///
/// UART to host: every call to [`process`](Self::process) sends whatever the receive ring holds
/// as one bulk IN packet.
pub struct CdcAcmBridge<'a, U: Registers, const RX: usize = 128, const TX: usize = 128> {
    serial: SerialPort<'a, U, RX, TX>,
    config: &'a BridgeConfig,
    pending: PendingRequest,
    line_coding: LineCoding,
    dtr: bool,
    rts: bool,
    out_nak: bool,
}

impl<'a, U: Registers, const RX: usize, const TX: usize> CdcAcmBridge<'a, U, RX, TX> {
    /// Creates the bridge and brings up the UART at the configured baud rate.
    pub fn new(mut serial: SerialPort<'a, U, RX, TX>, config: &'a BridgeConfig) -> Result<Self> {
        config.validate(serial.tx_capacity())?;
        serial.init(config.baud_rate)?;

        Ok(CdcAcmBridge {
            serial,
            config,
            pending: PendingRequest::None,
            line_coding: LineCoding::new(config.baud_rate),
            dtr: false,
            rts: false,
            out_nak: false,
        })
    }

    /// Gets the last line coding applied by the host.
    pub fn line_coding(&self) -> &LineCoding {
        &self.line_coding
    }

    /// Gets the DTR (data terminal ready) state
    pub fn dtr(&self) -> bool {
        self.dtr
    }

    /// Gets the RTS (request to send) state
    pub fn rts(&self) -> bool {
        self.rts
    }

    /// Control request still waiting for its data stage.
    pub fn pending_request(&self) -> PendingRequest {
        self.pending
    }

    /// Whether the bulk OUT endpoint is currently held in NAK.
    pub fn is_out_nak(&self) -> bool {
        self.out_nak
    }

    /// Gets the serial port the bridge relays to.
    pub fn serial(&self) -> &SerialPort<'a, U, RX, TX> {
        &self.serial
    }

    /// Gets the serial port mutably.
    pub fn serial_mut(&mut self) -> &mut SerialPort<'a, U, RX, TX> {
        &mut self.serial
    }

    /// One non-blocking step of the bridge. Call it from the main loop at least once per host
    /// polling interval.
    pub fn process<P: UsbPeripheral>(&mut self, usb: &mut P) {
        // Release the OUT endpoint first so a retry in this same frame sees the freed space.
        if self.out_nak && self.serial.tx_depth() < self.config.low_water_mark {
            usb.set_nak(self.config.data_out(), false);
            self.out_nak = false;
            trace!("bulk out resumed at depth {=usize}", self.serial.tx_depth());
        }

        let mut buf = [0u8; MAX_PACKET_SIZE];
        let max = usize::from(self.config.max_packet_size).min(buf.len());
        let count = self.serial.peek_rx(&mut buf[..max]);
        if count == 0 {
            return;
        }

        // Bytes leave the receive ring only once the peripheral took them. Anything beyond one
        // packet, or refused with WouldBlock, goes out on a later step.
        match usb.write(self.config.data_in(), &buf[..count]) {
            Ok(written) => {
                self.serial.consume_rx(written);
            }
            Err(UsbError::WouldBlock) => {}
            Err(err) => {
                warn!("bulk in write failed: {}", err);
            }
        }
    }

    fn handle_control_out<P: UsbPeripheral>(
        &mut self,
        usb: &mut P,
        ep: EndpointAddress,
        len: usize,
    ) -> OutStatus {
        let request = core::mem::take(&mut self.pending);

        match request {
            PendingRequest::SetLineCoding => {
                let mut buf = [0u8; MAX_PACKET_SIZE];
                let len = len.min(buf.len());

                let coding = match usb.read(ep, &mut buf[..len]) {
                    Ok(count) => LineCoding::parse(&buf[..count]),
                    Err(_) => None,
                };

                let Some(coding) = coding else {
                    warn!("malformed line coding, {=usize} bytes", len);
                    return OutStatus::Stall;
                };

                // Framing fields are accepted but the UART stays at 8N1.
                if self.serial.set_baudrate(coding.data_rate()).is_err() {
                    warn!("unsupported baud rate {=u32}", coding.data_rate());
                    return OutStatus::Stall;
                }

                self.line_coding = coding;
                self.ack_status(usb);
                OutStatus::Ack
            }
            // Already acknowledged in the setup stage, nothing should follow it.
            PendingRequest::SetLineControlState | PendingRequest::None => OutStatus::Stall,
        }
    }

    fn handle_bulk_out<P: UsbPeripheral>(
        &mut self,
        usb: &mut P,
        ep: EndpointAddress,
        len: usize,
    ) -> OutStatus {
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let len = len.min(buf.len());

        let count = match usb.read(ep, &mut buf[..len]) {
            Ok(count) => count,
            Err(UsbError::WouldBlock) => 0,
            Err(err) => {
                error!("bulk out read failed: {}", err);
                return OutStatus::Stall;
            }
        };

        if count > 0 {
            self.serial.push_tx(&buf[..count]);
        }

        if self.serial.tx_depth() >= self.config.high_water_mark {
            self.out_nak = true;
            trace!("bulk out paused at depth {=usize}", self.serial.tx_depth());
            OutStatus::Nak
        } else {
            OutStatus::Ack
        }
    }

    // Zero-length status stage on the control pipe.
    fn ack_status<P: UsbPeripheral>(&self, usb: &mut P) {
        if let Err(err) = usb.write(EndpointAddress::from(0x80), &[]) {
            warn!("control status write failed: {}", err);
        }
    }
}

impl<U, P, const RX: usize, const TX: usize> ClassDriver<P> for CdcAcmBridge<'_, U, RX, TX>
where
    U: Registers,
    P: UsbPeripheral,
{
    fn handle_setup(&mut self, usb: &mut P, req: &Request) -> SetupStatus {
        // A new setup stage abandons whatever the previous one was waiting for.
        self.pending = PendingRequest::None;

        if !(req.direction == UsbDirection::Out
            && req.request_type == RequestType::Class
            && req.recipient == Recipient::Interface)
        {
            return SetupStatus::Unhandled;
        }

        match req.request {
            REQ_SET_LINE_CODING => {
                self.pending = PendingRequest::SetLineCoding;
                SetupStatus::Ok
            }
            REQ_SET_CONTROL_LINE_STATE => {
                // No data stage: record the line state and acknowledge right away.
                self.dtr = (req.value & 0x0001) != 0;
                self.rts = (req.value & 0x0002) != 0;
                self.ack_status(usb);
                SetupStatus::Ok
            }
            other => {
                debug!("unhandled class request {=u8:#x}", other);
                SetupStatus::Unhandled
            }
        }
    }

    fn handle_out(&mut self, usb: &mut P, ep: EndpointAddress, len: usize) -> OutStatus {
        if ep.index() == 0 {
            self.handle_control_out(usb, ep, len)
        } else if ep == self.config.data_out() {
            self.handle_bulk_out(usb, ep, len)
        } else {
            OutStatus::Stall
        }
    }

    fn handle_set_configuration(&mut self, usb: &mut P, configuration: u8) {
        self.out_nak = false;

        if configuration == 0 {
            return;
        }

        let out_ep = self.config.data_out();
        let in_ep = self.config.data_in();
        let mps = self.config.max_packet_size;

        usb.register_out_handler(out_ep);
        for ep in [out_ep, in_ep] {
            if let Err(err) = usb.configure_endpoint(ep, EndpointType::Bulk, mps) {
                error!("configuring endpoint {=u8:#x} failed: {}", u8::from(ep), err);
            }
        }
    }

    fn handle_reset(&mut self) {
        self.pending = PendingRequest::None;
        self.out_nak = false;
        self.dtr = false;
        self.rts = false;
    }
}
