//! USB CDC-ACM to UART bridge for single-core microcontrollers without an operating system.
//!
//! The host sees a virtual serial port. Bytes it sends on the bulk OUT endpoint are queued for
//! the UART, bytes the UART receives are sent back on the bulk IN endpoint. The UART is driven
//! from its interrupt through two lock-free ring buffers ([`RingBuffer`]); the USB side runs from
//! the main loop in [`CdcAcmBridge::process`] and from the callbacks of the USB peripheral driver
//! ([`ClassDriver`]).
//!
//! When the host writes faster than the UART can send, the OUT endpoint is answered with NAK
//! until the transmit ring has room for another full packet, so no byte is ever dropped on the
//! way to the UART.
//!
//! Only SET_LINE_CODING (baud rate) and SET_CONTROL_LINE_STATE are supported on the control
//! pipe. Parity, stop bits, break and modem lines are not acted upon.
//!
//! Example
//! =======
//!
//! The peripheral driver and the register block come from the board support code:
//!
//! ```ignore
//! use usbd_uart_bridge::{BridgeConfig, BufferedSerial, CdcAcmBridge, SerialInterrupt};
//!
//! static CONFIG: BridgeConfig = BridgeConfig::new();
//! static mut SERIAL: BufferedSerial = BufferedSerial::new();
//! static mut UART_IRQ: Option<SerialInterrupt<'static, Usart2>> = None;
//!
//! fn main() -> ! {
//!     let uart: &'static Usart2 = board::usart2();
//!     let usb = board::usb();
//!
//!     // Safety: runs once, before the UART interrupt is unmasked.
//!     let (port, irq) = unsafe { (*core::ptr::addr_of_mut!(SERIAL)).split(uart) };
//!     unsafe { UART_IRQ = Some(irq) };
//!
//!     let mut bridge = CdcAcmBridge::new(port, &CONFIG).unwrap();
//!     usb.register_class(&mut bridge);
//!
//!     loop {
//!         usb.poll(&mut bridge);
//!         bridge.process(usb);
//!     }
//! }
//!
//! #[interrupt]
//! fn USART2() {
//!     if let Some(irq) = unsafe { (*core::ptr::addr_of_mut!(UART_IRQ)).as_mut() } {
//!         irq.on_interrupt();
//!     }
//! }
//! ```

#![no_std]

mod fmt;

mod bridge;
mod buffer;
mod cdc_acm;
mod config;
pub mod descriptor;
mod error;
mod io;
mod serial_port;
pub mod uart;
pub mod usb;

#[cfg(test)]
mod testing;

pub use crate::bridge::CdcAcmBridge;
pub use crate::buffer::{Consumer, Producer, RingBuffer};
pub use crate::cdc_acm::*;
pub use crate::config::{BridgeConfig, MAX_PACKET_SIZE};
pub use crate::error::{Error, Result};
pub use crate::serial_port::{BufferedSerial, SerialInterrupt, SerialPort};
pub use crate::usb::{ClassDriver, OutStatus, SetupStatus, UsbPeripheral};
pub use embedded_io;
pub use usb_device::UsbError;
