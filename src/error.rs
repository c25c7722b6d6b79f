use usb_device::UsbError;

/// Errors returned by the bridge and its serial port.
///
/// Protocol-level problems on the control pipe never show up here; they are answered with a
/// stall instead. Ring overflows are not errors either: they panic.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The requested baud rate cannot be produced from the UART clock.
    InvalidBaudRate(u32),

    /// A [`BridgeConfig`](crate::BridgeConfig) field is out of range.
    InvalidConfig(&'static str),

    /// The USB peripheral driver reported an error.
    Usb(UsbError),
}

impl From<UsbError> for Error {
    fn from(e: UsbError) -> Self {
        Self::Usb(e)
    }
}

pub type Result<T> = core::result::Result<T, Error>;
