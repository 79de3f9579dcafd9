//! Ping1D message ids.
//!
//! 0-99 are general protocol messages, 1000-1099 set commands,
//! 1100-1199 control commands, 1200+ device data.

pub const UNDEFINED: u16 = 0;
pub const ACK: u16 = 1;
pub const NACK: u16 = 2;
pub const ASCII_TEXT: u16 = 3;
pub const PROTOCOL_VERSION: u16 = 5;

pub const SET_DEVICE_ID: u16 = 1000;
pub const SET_RANGE: u16 = 1001;
pub const SET_SPEED_OF_SOUND: u16 = 1002;
pub const SET_MODE_AUTO: u16 = 1003;
pub const SET_PING_INTERVAL: u16 = 1004;
pub const SET_GAIN_INDEX: u16 = 1005;
pub const SET_PING_ENABLE: u16 = 1006;

pub const GOTO_BOOTLOADER: u16 = 1100;

pub const FIRMWARE_VERSION: u16 = 1200;
pub const DEVICE_ID: u16 = 1201;
pub const VOLTAGE_5: u16 = 1202;
pub const SPEED_OF_SOUND: u16 = 1203;
pub const RANGE: u16 = 1204;
pub const MODE_AUTO: u16 = 1205;
pub const PING_INTERVAL: u16 = 1206;
pub const GAIN_INDEX: u16 = 1207;
pub const PULSE_DURATION: u16 = 1208;
pub const GENERAL_INFO: u16 = 1210;
pub const DISTANCE_SIMPLE: u16 = 1211;
pub const DISTANCE: u16 = 1212;
pub const PROCESSOR_TEMPERATURE: u16 = 1213;
pub const PCB_TEMPERATURE: u16 = 1214;
pub const PING_ENABLE: u16 = 1215;

pub const PROFILE: u16 = 1300;

pub const CONTINUOUS_START: u16 = 1400;
pub const CONTINUOUS_STOP: u16 = 1401;

/// Returns true for ids in the set-command range.
pub fn is_set_command(id: u16) -> bool {
    (1000..1100).contains(&id)
}
