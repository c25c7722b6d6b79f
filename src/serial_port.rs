use crate::buffer::{Consumer, Producer, RingBuffer};
use crate::uart::{self, Control, Registers, CR, SR};
use crate::Result;

/// Interrupt-driven UART with one ring buffer per direction.
///
/// The rings live here so they can be placed in static storage; [`split`](Self::split) hands out
/// the two halves that actually move bytes:
///
/// * [`SerialPort`] for the main loop: consumes the receive ring, produces into the transmit ring
///   and owns the baud rate.
/// * [`SerialInterrupt`] for the UART interrupt handler: produces into the receive ring and
///   consumes the transmit ring.
pub struct BufferedSerial<const RX: usize = 128, const TX: usize = 128> {
    rx: RingBuffer<RX>,
    tx: RingBuffer<TX>,
}

impl<const RX: usize, const TX: usize> BufferedSerial<RX, TX> {
    pub const fn new() -> Self {
        BufferedSerial {
            rx: RingBuffer::new(),
            tx: RingBuffer::new(),
        }
    }

    /// Splits the port into its main-loop and interrupt halves, both driving `uart`.
    pub fn split<'a, U: Registers>(
        &'a mut self,
        uart: &'a U,
    ) -> (SerialPort<'a, U, RX, TX>, SerialInterrupt<'a, U, RX, TX>) {
        let (rx_producer, rx_consumer) = self.rx.split();
        let (tx_producer, tx_consumer) = self.tx.split();

        (
            SerialPort {
                uart,
                rx: rx_consumer,
                tx: tx_producer,
                baud_rate: 0,
            },
            SerialInterrupt {
                uart,
                rx: rx_producer,
                tx: tx_consumer,
            },
        )
    }
}

impl<const RX: usize, const TX: usize> Default for BufferedSerial<RX, TX> {
    fn default() -> Self {
        Self::new()
    }
}

/// Main-loop half of a [`BufferedSerial`].
pub struct SerialPort<'a, U: Registers, const RX: usize = 128, const TX: usize = 128> {
    uart: &'a U,
    rx: Consumer<'a, RX>,
    tx: Producer<'a, TX>,
    baud_rate: u32,
}

impl<'a, U: Registers, const RX: usize, const TX: usize> SerialPort<'a, U, RX, TX> {
    /// Programs the baud rate, enables the UART with its receiver, transmitter and receive
    /// interrupt, and unmasks the UART line in the interrupt controller.
    pub fn init(&mut self, baud_rate: u32) -> Result<()> {
        self.set_baudrate(baud_rate)?;
        let mut control = Control::new(0);
        control.write(CR::UE::SET + CR::TE::SET + CR::RE::SET + CR::RXNEIE::SET);
        self.uart.set_control(control);
        self.uart.unmask_interrupt();
        Ok(())
    }

    /// Reprograms the baud-rate divisor.
    ///
    /// This is not synchronized with the interrupt handler. A byte in flight while the divisor
    /// changes may arrive corrupted; callers that care must make sure the line is idle.
    pub fn set_baudrate(&mut self, baud_rate: u32) -> Result<()> {
        let divisor = uart::divisor(self.uart.clock_hz(), baud_rate)?;
        self.uart.set_divisor(divisor);
        self.baud_rate = baud_rate;
        info!("uart baud rate {=u32}", baud_rate);
        Ok(())
    }

    /// Currently programmed baud rate, 0 before [`init`](Self::init).
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Queues `data` for transmission.
    ///
    /// # Panics
    ///
    /// Panics if the transmit ring overflows. Upstream flow control must keep that from ever
    /// happening; dropping bytes here would silently corrupt the stream.
    pub fn push_tx(&mut self, data: &[u8]) {
        for &byte in data {
            if !self.tx.put(byte) {
                panic!("uart transmit ring overflow");
            }
        }

        if !data.is_empty() {
            self.listen_tx();
        }
    }

    /// Queues one byte for transmission, returns `false` if the transmit ring is full.
    pub fn write_byte(&mut self, byte: u8) -> bool {
        if !self.tx.put(byte) {
            return false;
        }

        self.listen_tx();
        true
    }

    /// Takes the oldest received byte.
    pub fn read_byte(&mut self) -> Option<u8> {
        self.rx.get()
    }

    /// Copies up to `data.len()` received bytes into `data` without removing them from the
    /// receive ring. Follow up with [`consume_rx`](Self::consume_rx).
    pub fn peek_rx(&self, data: &mut [u8]) -> usize {
        self.rx.peek_into(data)
    }

    /// Drops `count` received bytes that were previously peeked.
    pub fn consume_rx(&mut self, count: usize) -> usize {
        self.rx.consume(count)
    }

    pub fn rx_depth(&self) -> usize {
        self.rx.depth()
    }

    pub fn tx_depth(&self) -> usize {
        self.tx.depth()
    }

    pub fn tx_capacity(&self) -> usize {
        self.tx.capacity()
    }

    // Enabling TXEIE is a read-modify-write racing with the handler clearing it. Both outcomes are
    // fine: the handler only clears it when the ring is empty, and after a push it is set again.
    fn listen_tx(&self) {
        let mut control = self.uart.control();
        control.modify(CR::TXEIE::SET);
        self.uart.set_control(control);
    }
}

/// Interrupt half of a [`BufferedSerial`].
pub struct SerialInterrupt<'a, U: Registers, const RX: usize = 128, const TX: usize = 128> {
    uart: &'a U,
    rx: Producer<'a, RX>,
    tx: Consumer<'a, TX>,
}

impl<U: Registers, const RX: usize, const TX: usize> SerialInterrupt<'_, U, RX, TX> {
    /// Services the UART interrupt. Call from the UART interrupt vector.
    ///
    /// # Panics
    ///
    /// Panics if a received byte does not fit in the receive ring. A dropped byte would be
    /// indistinguishable from a delivered one on the host side.
    pub fn on_interrupt(&mut self) {
        let status = self.uart.status();

        if status.is_set(SR::RXNE) {
            // Exactly one read: it pops the byte and clears RXNE.
            let byte = self.uart.read_data();
            if !self.rx.put(byte) {
                panic!("uart receive ring overflow");
            }
        }

        let mut control = self.uart.control();
        if status.is_set(SR::TXE) && control.is_set(CR::TXEIE) {
            match self.tx.get() {
                Some(byte) => self.uart.write_data(byte),
                // Nothing left to send, otherwise TXE would keep firing.
                None => {
                    control.modify(CR::TXEIE::CLEAR);
                    self.uart.set_control(control);
                }
            }
        }
    }
}
