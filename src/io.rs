use core::convert::Infallible;

use crate::serial_port::SerialPort;
use crate::uart::Registers;
use crate::Error;

impl embedded_io::Error for Error {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Error::InvalidBaudRate(_) | Error::InvalidConfig(_) => {
                embedded_io::ErrorKind::InvalidInput
            }
            Error::Usb(usb_device::UsbError::Unsupported) => embedded_io::ErrorKind::Unsupported,
            Error::Usb(
                usb_device::UsbError::BufferOverflow
                | usb_device::UsbError::EndpointOverflow
                | usb_device::UsbError::EndpointMemoryOverflow,
            ) => embedded_io::ErrorKind::OutOfMemory,
            Error::Usb(_) => embedded_io::ErrorKind::Other,
        }
    }
}

impl<U: Registers, const RX: usize, const TX: usize> embedded_io::ErrorType
    for SerialPort<'_, U, RX, TX>
{
    type Error = Error;
}

impl<U: Registers, const RX: usize, const TX: usize> embedded_io::Read for SerialPort<'_, U, RX, TX> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }

        // We are required by `embedded-io` to wait until at least one byte is read. The UART
        // interrupt fills the ring behind our back.
        loop {
            let count = self.peek_rx(buf);
            if count > 0 {
                return Ok(self.consume_rx(count));
            }
        }
    }
}

impl<U: Registers, const RX: usize, const TX: usize> embedded_io::ReadReady
    for SerialPort<'_, U, RX, TX>
{
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.rx_depth() != 0)
    }
}

impl<U: Registers, const RX: usize, const TX: usize> embedded_io::Write
    for SerialPort<'_, U, RX, TX>
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }

        // Same as for reads: block until at least one byte fits, then take what fits.
        loop {
            let count = buf.iter().take_while(|&&byte| self.write_byte(byte)).count();
            if count > 0 {
                return Ok(count);
            }
        }
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        while self.tx_depth() != 0 {}
        Ok(())
    }
}

impl<U: Registers, const RX: usize, const TX: usize> embedded_io::WriteReady
    for SerialPort<'_, U, RX, TX>
{
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.tx_depth() < self.tx_capacity())
    }
}

impl<U: Registers, const RX: usize, const TX: usize> embedded_hal::serial::Write<u8>
    for SerialPort<'_, U, RX, TX>
{
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        if self.write_byte(word) {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        if self.tx_depth() == 0 {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

impl<U: Registers, const RX: usize, const TX: usize> embedded_hal::blocking::serial::write::Default<u8>
    for SerialPort<'_, U, RX, TX>
{
}

impl<U: Registers, const RX: usize, const TX: usize> embedded_hal::serial::Read<u8>
    for SerialPort<'_, U, RX, TX>
{
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        self.read_byte().ok_or(nb::Error::WouldBlock)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use embedded_hal::serial as hal;
    use embedded_io::{Read, ReadReady, Write, WriteReady};

    use crate::serial_port::BufferedSerial;
    use crate::testing::MockUart;
    use crate::Error;

    #[test]
    fn io_read_takes_available_bytes() {
        let uart = MockUart::new();
        let mut serial = BufferedSerial::<16, 16>::new();
        let (mut port, mut irq) = serial.split(&uart);

        assert!(!port.read_ready().unwrap());
        for byte in b"abcd" {
            uart.receive(*byte);
            irq.on_interrupt();
        }
        assert!(port.read_ready().unwrap());

        let mut buf = [0u8; 3];
        assert_eq!(Read::read(&mut port, &mut buf).unwrap(), 3);
        assert_eq!(&buf, b"abc");
        assert_eq!(Read::read(&mut port, &mut buf).unwrap(), 1);
        assert_eq!(buf[0], b'd');
        assert_eq!(Read::read(&mut port, &mut []).unwrap(), 0);
    }

    #[test]
    fn io_write_stops_when_full() {
        let uart = MockUart::new();
        let mut serial = BufferedSerial::<4, 4>::new();
        let (mut port, mut irq) = serial.split(&uart);

        assert!(port.write_ready().unwrap());
        assert_eq!(Write::write(&mut port, b"hello").unwrap(), 3);
        assert!(!port.write_ready().unwrap());

        for _ in 0..4 {
            irq.on_interrupt();
        }
        Write::flush(&mut port).unwrap();
        assert_eq!(uart.transmitted(), b"hel");
    }

    #[test]
    fn nb_serial_would_block() {
        let uart = MockUart::new();
        let mut serial = BufferedSerial::<2, 2>::new();
        let (mut port, mut irq) = serial.split(&uart);

        assert_eq!(hal::Read::read(&mut port), Err(nb::Error::WouldBlock));
        assert_eq!(hal::Write::write(&mut port, b'x'), Ok(()));
        assert_eq!(hal::Write::write(&mut port, b'y'), Err(nb::Error::WouldBlock));
        assert_eq!(hal::Write::flush(&mut port), Err(nb::Error::WouldBlock));

        irq.on_interrupt();
        assert_eq!(hal::Write::flush(&mut port), Ok(()));

        uart.receive(b'z');
        irq.on_interrupt();
        assert_eq!(hal::Read::read(&mut port), Ok(b'z'));
    }

    #[test]
    fn error_kinds() {
        use embedded_io::{Error as _, ErrorKind};

        assert_eq!(Error::InvalidBaudRate(0).kind(), ErrorKind::InvalidInput);
        assert_eq!(
            Error::Usb(usb_device::UsbError::EndpointOverflow).kind(),
            ErrorKind::OutOfMemory
        );
        assert_eq!(Error::Usb(usb_device::UsbError::WouldBlock).kind(), ErrorKind::Other);
    }
}
