/// This should be used as `device_class` when building the `UsbDevice`.
pub const USB_CLASS_CDC: u8 = 0x02;

pub const CDC_SUBCLASS_ACM: u8 = 0x02;
/// AT commands (v.25ter).
pub const CDC_PROTOCOL_AT: u8 = 0x01;
pub const USB_CLASS_CDC_DATA: u8 = 0x0a;

pub(crate) const CS_INTERFACE: u8 = 0x24;
pub(crate) const CDC_TYPE_HEADER: u8 = 0x00;
pub(crate) const CDC_TYPE_CALL_MANAGEMENT: u8 = 0x01;
pub(crate) const CDC_TYPE_ACM: u8 = 0x02;
pub(crate) const CDC_TYPE_UNION: u8 = 0x06;

pub const REQ_SET_LINE_CODING: u8 = 0x20;
pub const REQ_GET_LINE_CODING: u8 = 0x21;
pub const REQ_SET_CONTROL_LINE_STATE: u8 = 0x22;
pub const REQ_SEND_BREAK: u8 = 0x23;

/// Number of stop bits for LineCoding
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    /// 1 stop bit
    One = 0,

    /// 1.5 stop bits
    OnePointFive = 1,

    /// 2 stop bits
    Two = 2,
}

impl From<u8> for StopBits {
    fn from(value: u8) -> Self {
        match value {
            1 => StopBits::OnePointFive,
            2 => StopBits::Two,
            _ => StopBits::One,
        }
    }
}

/// Parity for LineCoding
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParityType {
    None = 0,
    Odd = 1,
    Even = 2,
    Mark = 3,
    Space = 4,
}

impl From<u8> for ParityType {
    fn from(value: u8) -> Self {
        match value {
            1 => ParityType::Odd,
            2 => ParityType::Even,
            3 => ParityType::Mark,
            4 => ParityType::Space,
            _ => ParityType::None,
        }
    }
}

/// Line coding parameters
///
/// This is provided by the host for specifying the standard UART parameters such as baud rate. Only
/// the baud rate is applied to the UART, the framing fields are kept for reference.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct LineCoding {
    stop_bits: StopBits,
    data_bits: u8,
    parity_type: ParityType,
    data_rate: u32,
}

impl LineCoding {
    /// Size of the structure on the wire (`dwDTERate`, `bCharFormat`, `bParityType`,
    /// `bDataBits`).
    pub const SIZE: usize = 7;

    pub const fn new(data_rate: u32) -> Self {
        LineCoding {
            stop_bits: StopBits::One,
            data_bits: 8,
            parity_type: ParityType::None,
            data_rate,
        }
    }

    /// Decodes the data stage of a SET_LINE_CODING request. Returns `None` unless `data` is
    /// exactly [`SIZE`](Self::SIZE) bytes long.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let data: &[u8; Self::SIZE] = data.try_into().ok()?;

        Some(LineCoding {
            data_rate: u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
            stop_bits: data[4].into(),
            parity_type: data[5].into(),
            data_bits: data[6],
        })
    }

    /// Encodes the structure the way GET_LINE_CODING would return it.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let rate = self.data_rate.to_le_bytes();
        [
            rate[0],
            rate[1],
            rate[2],
            rate[3],
            self.stop_bits as u8,
            self.parity_type as u8,
            self.data_bits,
        ]
    }

    /// Gets the number of stop bits for UART communication.
    pub fn stop_bits(&self) -> StopBits {
        self.stop_bits
    }

    /// Gets the number of data bits for UART communication.
    pub fn data_bits(&self) -> u8 {
        self.data_bits
    }

    /// Gets the parity type for UART communication.
    pub fn parity_type(&self) -> ParityType {
        self.parity_type
    }

    /// Gets the data rate in bits per second for UART communication.
    pub fn data_rate(&self) -> u32 {
        self.data_rate
    }
}

impl Default for LineCoding {
    fn default() -> Self {
        LineCoding::new(115_200)
    }
}

/// Control request whose data stage has not arrived yet.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PendingRequest {
    #[default]
    None,
    SetLineCoding,
    /// SET_CONTROL_LINE_STATE has no data stage and is acknowledged during setup, so the bridge
    /// never leaves this pending. A data stage arriving in this state is stalled.
    SetLineControlState,
}
