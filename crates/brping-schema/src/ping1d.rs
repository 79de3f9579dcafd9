use crate::field::FieldType::{self, Bytes, U16, U32, U8};
use crate::ids::*;

pub(crate) type Definition = (u16, &'static str, &'static [(&'static str, FieldType)]);

/// Built-in Ping1D message table.
pub(crate) const PING1D: &[Definition] = &[
    (UNDEFINED, "undefined", &[]),
    (ACK, "ack", &[("acked_id", U16)]),
    (NACK, "nack", &[("nacked_id", U16), ("nack_message", Bytes)]),
    (ASCII_TEXT, "ascii_text", &[("ascii_message", Bytes)]),
    (PROTOCOL_VERSION, "protocol_version", &[("protocol_version", U32)]),
    (SET_DEVICE_ID, "set_device_id", &[("device_id", U8)]),
    (SET_RANGE, "set_range", &[("scan_start", U32), ("scan_length", U32)]),
    (SET_SPEED_OF_SOUND, "set_speed_of_sound", &[("speed_of_sound", U32)]),
    (SET_MODE_AUTO, "set_mode_auto", &[("mode_auto", U8)]),
    (SET_PING_INTERVAL, "set_ping_interval", &[("ping_interval", U16)]),
    (SET_GAIN_INDEX, "set_gain_index", &[("gain_index", U8)]),
    (SET_PING_ENABLE, "set_ping_enable", &[("ping_enabled", U8)]),
    (GOTO_BOOTLOADER, "goto_bootloader", &[]),
    (
        FIRMWARE_VERSION,
        "firmware_version",
        &[
            ("device_type", U8),
            ("device_model", U8),
            ("firmware_version_major", U16),
            ("firmware_version_minor", U16),
        ],
    ),
    (DEVICE_ID, "device_id", &[("device_id", U8)]),
    (VOLTAGE_5, "voltage_5", &[("voltage_5", U16)]),
    (SPEED_OF_SOUND, "speed_of_sound", &[("speed_of_sound", U32)]),
    (RANGE, "range", &[("scan_start", U32), ("scan_length", U32)]),
    (MODE_AUTO, "mode_auto", &[("mode_auto", U8)]),
    (PING_INTERVAL, "ping_interval", &[("ping_interval", U16)]),
    (GAIN_INDEX, "gain_index", &[("gain_index", U32)]),
    (PULSE_DURATION, "pulse_duration", &[("pulse_duration", U16)]),
    (
        GENERAL_INFO,
        "general_info",
        &[
            ("firmware_version_major", U16),
            ("firmware_version_minor", U16),
            ("voltage_5", U16),
            ("ping_interval", U16),
            ("gain_index", U8),
            ("mode_auto", U8),
        ],
    ),
    (
        DISTANCE_SIMPLE,
        "distance_simple",
        &[("distance", U32), ("confidence", U8)],
    ),
    (
        DISTANCE,
        "distance",
        &[
            ("distance", U32),
            ("confidence", U16),
            ("pulse_duration", U16),
            ("ping_number", U32),
            ("scan_start", U32),
            ("scan_length", U32),
            ("gain_index", U32),
        ],
    ),
    (
        PROCESSOR_TEMPERATURE,
        "processor_temperature",
        &[("processor_temperature", U16)],
    ),
    (PCB_TEMPERATURE, "pcb_temperature", &[("pcb_temperature", U16)]),
    (PING_ENABLE, "ping_enable", &[("ping_enabled", U8)]),
    (
        PROFILE,
        "profile",
        &[
            ("distance", U32),
            ("confidence", U16),
            ("pulse_duration", U16),
            ("ping_number", U32),
            ("scan_start", U32),
            ("scan_length", U32),
            ("gain_index", U32),
            ("profile_data_length", U16),
            ("profile_data", Bytes),
        ],
    ),
    (CONTINUOUS_START, "continuous_start", &[("id", U16)]),
    (CONTINUOUS_STOP, "continuous_stop", &[("id", U16)]),
];
