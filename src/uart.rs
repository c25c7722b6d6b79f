//! Register-level contract for the UART peripheral driven by [`SerialInterrupt`].
//!
//! [`SerialInterrupt`]: crate::SerialInterrupt

use tock_registers::{register_bitfields, LocalRegisterCopy};

use crate::{Error, Result};

/// Hardware UART registers.
///
/// All methods take `&self`: implementations are expected to perform volatile register accesses,
/// so the interrupt half and the main-loop half of the serial port can both hold a shared
/// reference to the same peripheral.
pub trait Registers {
    /// Frequency of the clock feeding the baud-rate generator, in Hz.
    fn clock_hz(&self) -> u32;

    fn control(&self) -> Control;

    fn set_control(&self, control: Control);

    fn status(&self) -> Status;

    /// Pops the received byte. Reading clears `SR::RXNE`.
    fn read_data(&self) -> u8;

    /// Pushes one byte into the transmit shift register.
    fn write_data(&self, byte: u8);

    fn set_divisor(&self, divisor: u16);

    /// Enables the UART line in the platform's interrupt controller.
    fn unmask_interrupt(&self);
}

register_bitfields![u32,
    /// Control register
    pub CR [
        /// Receiver enable
        RE OFFSET(2) NUMBITS(1) [],
        /// Transmitter enable
        TE OFFSET(3) NUMBITS(1) [],
        /// Receive data register not empty interrupt enable
        RXNEIE OFFSET(5) NUMBITS(1) [],
        /// Transmit data register empty interrupt enable
        TXEIE OFFSET(7) NUMBITS(1) [],
        /// UART enable
        UE OFFSET(13) NUMBITS(1) [],
    ],

    /// Status register
    pub SR [
        /// Received data ready to be read
        RXNE OFFSET(5) NUMBITS(1) [],
        /// Transmit data register empty
        TXE OFFSET(7) NUMBITS(1) [],
    ]
];

/// Local copy of the control register.
pub type Control = LocalRegisterCopy<u32, CR::Register>;

/// Local copy of the status register.
pub type Status = LocalRegisterCopy<u32, SR::Register>;

/// Smallest divisor the 16x oversampling baud-rate generator accepts.
pub const MIN_DIVISOR: u32 = 16;

/// Computes the baud-rate divisor for `baud` from `clock_hz`, rounded to nearest.
pub fn divisor(clock_hz: u32, baud: u32) -> Result<u16> {
    if baud == 0 {
        return Err(Error::InvalidBaudRate(baud));
    }

    let div = (u64::from(clock_hz) + u64::from(baud / 2)) / u64::from(baud);

    if div < u64::from(MIN_DIVISOR) || div > u64::from(u16::MAX) {
        return Err(Error::InvalidBaudRate(baud));
    }

    Ok(div as u16)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn divisor_rounds_to_nearest() {
        assert_eq!(divisor(36_000_000, 115_200).ok(), Some(313));
        assert_eq!(divisor(36_000_000, 9_600).ok(), Some(3750));
        assert_eq!(divisor(8_000_000, 115_200).ok(), Some(69));
    }

    #[test]
    fn divisor_bounds() {
        assert_eq!(divisor(36_000_000, 0), Err(Error::InvalidBaudRate(0)));
        // Faster than clock / 16.
        assert_eq!(
            divisor(8_000_000, 1_000_000),
            Err(Error::InvalidBaudRate(1_000_000))
        );
        // Divisor overflows 16 bits.
        assert_eq!(divisor(72_000_000, 300), Err(Error::InvalidBaudRate(300)));
        assert_eq!(divisor(8_000_000, 500_000).ok(), Some(16));
    }

    #[test]
    fn control_bits() {
        let mut cr = Control::new(0);
        cr.write(CR::UE::SET + CR::TE::SET + CR::RE::SET);
        assert_eq!(cr.get(), (1 << 13) | (0x3 << 2));
        assert!(cr.matches_all(CR::TE::SET + CR::RE::SET));
        assert!(!cr.is_set(CR::TXEIE));

        cr.modify(CR::TXEIE::SET);
        assert_eq!(cr.get(), (1 << 13) | (1 << 7) | (0x3 << 2));
        cr.modify(CR::TXEIE::CLEAR);
        assert_eq!(cr.get(), (1 << 13) | (0x3 << 2));

        let sr = Status::new(1 << 7);
        assert!(sr.is_set(SR::TXE));
        assert!(!sr.is_set(SR::RXNE));
    }
}
