//! Device and configuration descriptors for the bridge, for peripheral drivers that serve
//! descriptors from plain byte arrays.

use crate::cdc_acm::*;
use crate::config::BridgeConfig;

const DESCRIPTOR_TYPE_DEVICE: u8 = 0x01;
const DESCRIPTOR_TYPE_CONFIGURATION: u8 = 0x02;
const DESCRIPTOR_TYPE_INTERFACE: u8 = 0x04;
const DESCRIPTOR_TYPE_ENDPOINT: u8 = 0x05;

const EP_TYPE_BULK: u8 = 0x02;
const EP_TYPE_INTERRUPT: u8 = 0x03;

/// Bus powered, no remote wakeup.
const CONFIG_ATTRIBUTES: u8 = 0xc0;

const NOTIFY_PACKET_SIZE: u8 = 16;
const NOTIFY_INTERVAL: u8 = 255;

/// ACM capabilities: SET_LINE_CODING, GET_LINE_CODING, SET_CONTROL_LINE_STATE, SERIAL_STATE.
const ACM_CAPABILITIES: u8 = 0x02;

pub const DEVICE_DESCRIPTOR_LEN: usize = 18;
pub const CONFIGURATION_DESCRIPTOR_LEN: usize = 9 + (9 + 5 + 5 + 4 + 5 + 7) + (9 + 7 + 7);

pub const COMM_INTERFACE: u8 = 0;
pub const DATA_INTERFACE: u8 = 1;

pub const fn device_descriptor(config: &BridgeConfig) -> [u8; DEVICE_DESCRIPTOR_LEN] {
    let vid = config.vid.to_le_bytes();
    let pid = config.pid.to_le_bytes();

    [
        DEVICE_DESCRIPTOR_LEN as u8,
        DESCRIPTOR_TYPE_DEVICE,
        0x00,
        0x02, // bcdUSB 2.00
        0x00, // bDeviceClass, given per interface
        0x00,
        0x00,
        64, // bMaxPacketSize0
        vid[0],
        vid[1],
        pid[0],
        pid[1],
        0x00,
        0x00, // bcdDevice
        0,
        0,
        0, // no string descriptors
        1, // bNumConfigurations
    ]
}

pub const fn configuration_descriptor(config: &BridgeConfig) -> [u8; CONFIGURATION_DESCRIPTOR_LEN] {
    let total = (CONFIGURATION_DESCRIPTOR_LEN as u16).to_le_bytes();
    let mps = config.max_packet_size.to_le_bytes();

    [
        // configuration
        9,
        DESCRIPTOR_TYPE_CONFIGURATION,
        total[0],
        total[1],
        2, // bNumInterfaces
        1, // bConfigurationValue
        0,
        CONFIG_ATTRIBUTES,
        0, // bMaxPower
        // communication interface
        9,
        DESCRIPTOR_TYPE_INTERFACE,
        COMM_INTERFACE,
        0,
        1,
        USB_CLASS_CDC,
        CDC_SUBCLASS_ACM,
        CDC_PROTOCOL_AT,
        0,
        // header
        5,
        CS_INTERFACE,
        CDC_TYPE_HEADER,
        0x10,
        0x01, // bcdCDC 1.10
        // call management
        5,
        CS_INTERFACE,
        CDC_TYPE_CALL_MANAGEMENT,
        0x00,
        DATA_INTERFACE,
        // abstract control model
        4,
        CS_INTERFACE,
        CDC_TYPE_ACM,
        ACM_CAPABILITIES,
        // union
        5,
        CS_INTERFACE,
        CDC_TYPE_UNION,
        COMM_INTERFACE,
        DATA_INTERFACE,
        // notification endpoint
        7,
        DESCRIPTOR_TYPE_ENDPOINT,
        config.notify_ep,
        EP_TYPE_INTERRUPT,
        NOTIFY_PACKET_SIZE,
        0,
        NOTIFY_INTERVAL,
        // data interface
        9,
        DESCRIPTOR_TYPE_INTERFACE,
        DATA_INTERFACE,
        0,
        2,
        USB_CLASS_CDC_DATA,
        0x00,
        0x00,
        0,
        // bulk IN
        7,
        DESCRIPTOR_TYPE_ENDPOINT,
        config.data_in_ep,
        EP_TYPE_BULK,
        mps[0],
        mps[1],
        0,
        // bulk OUT
        7,
        DESCRIPTOR_TYPE_ENDPOINT,
        config.data_out_ep,
        EP_TYPE_BULK,
        mps[0],
        mps[1],
        0,
    ]
}
