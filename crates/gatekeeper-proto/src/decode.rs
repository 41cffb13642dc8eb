//! Per-operation response decoders (§4.3).
//!
//! Every decoder starts by validating the frame: exactly 64 bytes (enforced
//! by `RawFrame::parse`), a valid start-of-message byte, and a function code
//! matching the operation being decoded. Only then are fields extracted —
//! field extraction itself never fails; invalid BCD degrades to an absent
//! optional value or, for required fields, a default per `crate::bcd`.

use crate::bcd;
use crate::error::Result;
use crate::frame::RawFrame;
use crate::opcode;
use crate::records::{
    Ack, CardRecord, ControllerInfo, ControllerTime, DoorControl, EventFields, EventRecord,
    ListenerConfig, StatusInfo, TimeProfile, TimeSegment,
};

fn decode_ack(frame: &RawFrame) -> Ack {
    Ack { serial: frame.serial(), ok: bcd::get_bool(frame.as_bytes(), 8) }
}

fn event_fields(buf: &[u8; 64]) -> EventFields {
    EventFields {
        index: bcd::get_u32(buf, 8),
        event_type: bcd::get_u8(buf, 12),
        access_granted: bcd::get_bool(buf, 13),
        door: bcd::get_u8(buf, 14),
        direction: bcd::get_u8(buf, 15),
        card: bcd::get_u32(buf, 16),
        timestamp: bcd::get_optional_datetime(buf, 20),
        reason: bcd::get_u8(buf, 27),
    }
}

/// Decodes a `GetController` response.
///
/// # Errors
///
/// Returns `BadFrame` if the frame is not a valid 64-byte `GetController`
/// response.
pub fn get_controller(bytes: &[u8]) -> Result<ControllerInfo> {
    let frame = RawFrame::parse(bytes)?;
    frame.expect_function_code(opcode::GET_CONTROLLER)?;
    let buf = frame.as_bytes();
    let mac_text = bcd::get_mac(buf, 20);
    let mut mac = [0u8; 6];
    for (slot, part) in mac.iter_mut().zip(mac_text.split(':')) {
        *slot = u8::from_str_radix(part, 16).unwrap_or(0);
    }
    Ok(ControllerInfo {
        serial: frame.serial(),
        ip: [buf[8], buf[9], buf[10], buf[11]],
        mask: [buf[12], buf[13], buf[14], buf[15]],
        gateway: [buf[16], buf[17], buf[18], buf[19]],
        mac,
        version: bcd::get_version(buf, 26),
        date: bcd::get_date(buf, 28),
    })
}

/// Decodes a `GetTime`/`SetTime` response.
///
/// # Errors
///
/// Returns `BadFrame` on header validation failure.
pub fn controller_time(bytes: &[u8], expected_function_code: u8) -> Result<ControllerTime> {
    let frame = RawFrame::parse(bytes)?;
    frame.expect_function_code(expected_function_code)?;
    Ok(ControllerTime { serial: frame.serial(), datetime: bcd::get_datetime(frame.as_bytes(), 8) })
}

/// Decodes a `GetStatus` response, applying the "zero event_index means no
/// event" rule (§3.3 invariants).
///
/// # Errors
///
/// Returns `BadFrame` on header validation failure.
pub fn get_status(bytes: &[u8]) -> Result<StatusInfo> {
    let frame = RawFrame::parse(bytes)?;
    frame.expect_function_code(opcode::GET_STATUS)?;
    let buf = frame.as_bytes();
    let mut event = event_fields(buf);
    if event.index == 0 {
        event = EventFields::default();
    }
    Ok(StatusInfo {
        serial: frame.serial(),
        event,
        door_open: [
            bcd::get_bool(buf, 28),
            bcd::get_bool(buf, 29),
            bcd::get_bool(buf, 30),
            bcd::get_bool(buf, 31),
        ],
        door_button: [
            bcd::get_bool(buf, 32),
            bcd::get_bool(buf, 33),
            bcd::get_bool(buf, 34),
            bcd::get_bool(buf, 35),
        ],
        system_error: bcd::get_u8(buf, 36),
        system_time: bcd::get_time(buf, 37),
        sequence_no: bcd::get_u32(buf, 40),
        special_info: bcd::get_u8(buf, 48),
        relays: bcd::get_u8(buf, 49),
        inputs: bcd::get_u8(buf, 50),
        system_date: bcd::get_short_date_required(buf, 51),
    })
}

/// Decodes a standalone `Event` frame (§4.3.2). Unlike `get_status`, the
/// zero-index fields are never suppressed.
///
/// # Errors
///
/// Returns `BadFrame` on header validation failure.
pub fn event(bytes: &[u8]) -> Result<EventRecord> {
    let frame = RawFrame::parse(bytes)?;
    frame.expect_function_code(opcode::GET_STATUS)?;
    Ok(EventRecord { serial: frame.serial(), fields: event_fields(frame.as_bytes()) })
}

/// Decodes a `GetListener` response.
///
/// # Errors
///
/// Returns `BadFrame` on header validation failure.
pub fn get_listener(bytes: &[u8]) -> Result<ListenerConfig> {
    let frame = RawFrame::parse(bytes)?;
    frame.expect_function_code(opcode::GET_LISTENER)?;
    let buf = frame.as_bytes();
    Ok(ListenerConfig {
        serial: frame.serial(),
        ip: [buf[8], buf[9], buf[10], buf[11]],
        port: bcd::get_u16(buf, 12),
    })
}

/// Decodes a `SetListener` acknowledgement.
///
/// # Errors
///
/// Returns `BadFrame` on header validation failure.
pub fn set_listener(bytes: &[u8]) -> Result<Ack> {
    let frame = RawFrame::parse(bytes)?;
    frame.expect_function_code(opcode::SET_LISTENER)?;
    Ok(decode_ack(&frame))
}

/// Decodes a `GetDoorControl`/`SetDoorControl` response.
///
/// # Errors
///
/// Returns `BadFrame` on header validation failure.
pub fn door_control(bytes: &[u8], expected_function_code: u8) -> Result<DoorControl> {
    let frame = RawFrame::parse(bytes)?;
    frame.expect_function_code(expected_function_code)?;
    let buf = frame.as_bytes();
    Ok(DoorControl { door: bcd::get_u8(buf, 8), mode: bcd::get_u8(buf, 9), delay: bcd::get_u8(buf, 10) })
}

/// Decodes an `OpenDoor` response.
///
/// # Errors
///
/// Returns `BadFrame` on header validation failure.
pub fn open_door(bytes: &[u8]) -> Result<bool> {
    let frame = RawFrame::parse(bytes)?;
    frame.expect_function_code(opcode::OPEN_DOOR)?;
    Ok(bcd::get_bool(frame.as_bytes(), 8))
}

/// Decodes a `GetCards` response (card count).
///
/// # Errors
///
/// Returns `BadFrame` on header validation failure.
pub fn get_cards(bytes: &[u8]) -> Result<u32> {
    let frame = RawFrame::parse(bytes)?;
    frame.expect_function_code(opcode::GET_CARDS)?;
    Ok(bcd::get_u32(frame.as_bytes(), 8))
}

/// Decodes a `GetCard`/`GetCardByIndex`/`PutCard` response.
///
/// # Errors
///
/// Returns `BadFrame` on header validation failure.
pub fn card(bytes: &[u8], expected_function_code: u8) -> Result<CardRecord> {
    let frame = RawFrame::parse(bytes)?;
    frame.expect_function_code(expected_function_code)?;
    let buf = frame.as_bytes();
    Ok(CardRecord {
        serial: frame.serial(),
        number: bcd::get_u32(buf, 8),
        start: bcd::get_optional_date(buf, 12),
        end: bcd::get_optional_date(buf, 16),
        doors: [buf[20], buf[21], buf[22], buf[23]],
        pin: bcd::get_pin(buf, 24),
    })
}

/// Decodes a `DeleteCard`/`DeleteAllCards` acknowledgement.
///
/// # Errors
///
/// Returns `BadFrame` on header validation failure.
pub fn ack(bytes: &[u8], expected_function_code: u8) -> Result<Ack> {
    let frame = RawFrame::parse(bytes)?;
    frame.expect_function_code(expected_function_code)?;
    Ok(decode_ack(&frame))
}

/// Decodes a `GetEvent` response.
///
/// # Errors
///
/// Returns `BadFrame` on header validation failure.
pub fn get_event(bytes: &[u8]) -> Result<EventRecord> {
    let frame = RawFrame::parse(bytes)?;
    frame.expect_function_code(opcode::GET_EVENT)?;
    Ok(EventRecord { serial: frame.serial(), fields: event_fields(frame.as_bytes()) })
}

/// Decodes a `GetEventIndex` response.
///
/// # Errors
///
/// Returns `BadFrame` on header validation failure.
pub fn get_event_index(bytes: &[u8]) -> Result<u32> {
    let frame = RawFrame::parse(bytes)?;
    frame.expect_function_code(opcode::GET_EVENT_INDEX)?;
    Ok(bcd::get_u32(frame.as_bytes(), 8))
}

/// Decodes a `GetTimeProfile`/`SetTimeProfile` response.
///
/// # Errors
///
/// Returns `BadFrame` on header validation failure.
pub fn time_profile(bytes: &[u8], expected_function_code: u8) -> Result<TimeProfile> {
    let frame = RawFrame::parse(bytes)?;
    frame.expect_function_code(expected_function_code)?;
    let buf = frame.as_bytes();
    let mut weekdays = [false; 7];
    for (i, slot) in weekdays.iter_mut().enumerate() {
        *slot = bcd::get_bool(buf, 17 + i);
    }
    Ok(TimeProfile {
        id: bcd::get_u8(buf, 8),
        start: bcd::get_optional_date(buf, 9),
        end: bcd::get_optional_date(buf, 13),
        weekdays,
        segments: [
            TimeSegment { start: bcd::get_hhmm(buf, 24), end: bcd::get_hhmm(buf, 26) },
            TimeSegment { start: bcd::get_hhmm(buf, 28), end: bcd::get_hhmm(buf, 30) },
            TimeSegment { start: bcd::get_hhmm(buf, 32), end: bcd::get_hhmm(buf, 34) },
        ],
        linked: bcd::get_u8(buf, 36),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::encode;

    fn reply_like(request: &RawFrame, function_code: u8) -> Vec<u8> {
        let mut bytes = *request.as_bytes();
        bytes[1] = function_code;
        bytes.to_vec()
    }

    #[test]
    fn discovery_reply_scenario() {
        let mut bytes = [0u8; 64];
        let hex = "17 94 00 00 78 37 2a 18 c0 a8 01 64 ff ff ff 00 c0 a8 01 01 00 12 23 34 45 56 08 92 20 18 11 05";
        for (i, b) in hex.split(' ').enumerate() {
            bytes[i] = u8::from_str_radix(b, 16).unwrap();
        }
        let info = get_controller(&bytes).unwrap();
        assert_eq!(info.serial, 405_419_896);
        assert_eq!(info.ip, [192, 168, 1, 100]);
        assert_eq!(info.mask, [255, 255, 255, 0]);
        assert_eq!(info.gateway, [192, 168, 1, 1]);
        assert_eq!(bcd::get_mac(&bytes, 20), "00:12:23:34:45:56");
        assert_eq!(info.version, "v8.92");
        assert_eq!(info.date, chrono::NaiveDate::from_ymd_opt(2018, 11, 5).unwrap());
    }

    #[test]
    fn status_with_event_scenario() {
        let mut bytes = [0u8; 64];
        let head =
            "17 20 00 00 78 37 2a 18 4e 00 00 00 02 01 03 01 a1 98 7c 00 20 22 08 23 09 47 06 2c";
        for (i, b) in head.split(' ').enumerate() {
            bytes[i] = u8::from_str_radix(b, 16).unwrap();
        }
        bytes[36] = 0x03;
        bytes[37] = 0x09;
        bytes[38] = 0x49;
        bytes[39] = 0x39;
        bytes[49] = 0x07;
        bytes[50] = 0x09;
        bytes[51] = 0x22;
        bytes[52] = 0x08;
        bytes[53] = 0x23;
        let status = get_status(&bytes).unwrap();
        assert_eq!(status.system_date, chrono::NaiveDate::from_ymd_opt(2022, 8, 23).unwrap());
        assert_eq!(status.system_time, chrono::NaiveTime::from_hms_opt(9, 49, 39).unwrap());
        assert_eq!(status.relays, 7);
        assert_eq!(status.inputs, 9);
        assert_eq!(status.system_error, 3);
        assert_eq!(status.special_info, 39);
        assert_eq!(status.event.index, 78);
        assert_eq!(status.event.event_type, 2);
        assert!(status.event.access_granted);
        assert_eq!(status.event.door, 3);
        assert_eq!(status.event.direction, 1);
        assert_eq!(status.event.card, 8_165_537);
        assert_eq!(
            status.event.timestamp,
            Some(
                chrono::NaiveDate::from_ymd_opt(2022, 8, 23)
                    .unwrap()
                    .and_hms_opt(9, 47, 6)
                    .unwrap()
            )
        );
        assert_eq!(status.event.reason, 44);
    }

    #[test]
    fn status_with_no_event_scenario() {
        let mut bytes = [0u8; 64];
        bytes[0] = 0x17;
        bytes[1] = 0x20;
        bytes[51] = 0x22;
        bytes[52] = 0x08;
        bytes[53] = 0x23;
        let status = get_status(&bytes).unwrap();
        assert_eq!(status.event.index, 0);
        assert_eq!(status.event.timestamp, None);
        assert_eq!(status.sequence_no, 0);
    }

    #[test]
    fn status_with_invalid_event_timestamp_scenario() {
        let mut bytes = [0u8; 64];
        bytes[0] = 0x17;
        bytes[1] = 0x20;
        bytes[8] = 0x01;
        for (i, b) in [0x20, 0x20, 0x00, 0x00, 0x00, 0x00, 0x00].iter().enumerate() {
            bytes[20 + i] = *b;
        }
        let status = get_status(&bytes).unwrap();
        assert_eq!(status.event.timestamp, None);
    }

    #[test]
    fn get_cards_decodes_count() {
        let request = encode::get_cards(1);
        let bytes = reply_like(&request, opcode::GET_CARDS);
        assert_eq!(get_cards(&bytes).unwrap(), 0);
    }

    #[test]
    fn door_control_round_trips_through_wire_fields() {
        let request = encode::set_door_control(1, 3, 2, 5);
        let bytes = reply_like(&request, opcode::SET_DOOR_CONTROL);
        let decoded = door_control(&bytes, opcode::SET_DOOR_CONTROL).unwrap();
        assert_eq!(decoded, DoorControl { door: 3, mode: 2, delay: 5 });
    }

    #[test]
    fn unexpected_function_code_is_bad_frame() {
        let bytes = reply_like(&encode::get_cards(1), opcode::GET_CARD);
        assert!(get_cards(&bytes).is_err());
    }
}
