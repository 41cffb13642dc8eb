//! Per-operation request encoders (§4.2).
//!
//! Every encoder starts from a 64-byte zero buffer with `0x17` at offset 0,
//! the function code at offset 1, and the serial at offset 4..8, then writes
//! operation-specific fields at the offsets given by `SPEC_FULL.md` §3.
//! Operations listed in `opcode::magic_offset` get the `0x55aaaa55` magic
//! written unconditionally, not left to the caller.

use std::net::Ipv4Addr;

use chrono::{NaiveDateTime, NaiveTime};

use crate::error::Result;
use crate::frame::{RawFrame, MAGIC};
use crate::records::{CardRecord, Task, TimeProfile};
use crate::{bcd, opcode};

fn base_frame(function_code: u8, serial: u32) -> RawFrame {
    let mut frame = RawFrame::new(function_code, serial);
    if let Some(offset) = opcode::magic_offset(function_code) {
        bcd::set_u32(frame.as_bytes_mut(), offset, MAGIC);
    }
    frame
}

fn set_weekdays(buf: &mut [u8; 64], offset: usize, weekdays: [bool; 7]) {
    for (i, &active) in weekdays.iter().enumerate() {
        bcd::set_bool(buf, offset + i, active);
    }
}

/// `GetController` request; serial 0 is the broadcast/discovery form.
#[must_use]
pub fn get_controller(serial: u32) -> RawFrame {
    base_frame(opcode::GET_CONTROLLER, serial)
}

/// `SetIP` request. The controller never replies to this operation.
#[must_use]
pub fn set_ip(serial: u32, ip: Ipv4Addr, mask: Ipv4Addr, gateway: Ipv4Addr) -> RawFrame {
    let mut frame = base_frame(opcode::SET_IP, serial);
    let buf = frame.as_bytes_mut();
    bcd::set_ipv4(buf, 8, ip);
    bcd::set_ipv4(buf, 12, mask);
    bcd::set_ipv4(buf, 16, gateway);
    frame
}

/// `GetTime` request.
#[must_use]
pub fn get_time(serial: u32) -> RawFrame {
    base_frame(opcode::GET_TIME, serial)
}

/// `SetTime` request.
///
/// # Errors
///
/// Returns `InvalidArgument` if `datetime`'s year does not fit the BCD
/// field.
pub fn set_time(serial: u32, datetime: NaiveDateTime) -> Result<RawFrame> {
    let mut frame = base_frame(opcode::SET_TIME, serial);
    bcd::set_datetime(frame.as_bytes_mut(), 8, datetime)?;
    Ok(frame)
}

/// `GetStatus` request.
#[must_use]
pub fn get_status(serial: u32) -> RawFrame {
    base_frame(opcode::GET_STATUS, serial)
}

/// `GetListener` request.
#[must_use]
pub fn get_listener(serial: u32) -> RawFrame {
    base_frame(opcode::GET_LISTENER, serial)
}

/// `SetListener` request.
#[must_use]
pub fn set_listener(serial: u32, ip: Ipv4Addr, port: u16) -> RawFrame {
    let mut frame = base_frame(opcode::SET_LISTENER, serial);
    let buf = frame.as_bytes_mut();
    bcd::set_ipv4(buf, 8, ip);
    bcd::set_u16(buf, 12, port);
    frame
}

/// `GetDoorControl` request.
#[must_use]
pub fn get_door_control(serial: u32, door: u8) -> RawFrame {
    let mut frame = base_frame(opcode::GET_DOOR_CONTROL, serial);
    bcd::set_u8(frame.as_bytes_mut(), 8, door);
    frame
}

/// `SetDoorControl` request.
#[must_use]
pub fn set_door_control(serial: u32, door: u8, mode: u8, delay: u8) -> RawFrame {
    let mut frame = base_frame(opcode::SET_DOOR_CONTROL, serial);
    let buf = frame.as_bytes_mut();
    bcd::set_u8(buf, 8, door);
    bcd::set_u8(buf, 9, mode);
    bcd::set_u8(buf, 10, delay);
    frame
}

/// `OpenDoor` request.
#[must_use]
pub fn open_door(serial: u32, door: u8) -> RawFrame {
    let mut frame = base_frame(opcode::OPEN_DOOR, serial);
    bcd::set_u8(frame.as_bytes_mut(), 8, door);
    frame
}

/// `GetCards` request.
#[must_use]
pub fn get_cards(serial: u32) -> RawFrame {
    base_frame(opcode::GET_CARDS, serial)
}

/// `GetCard` request (card number at offset 8).
#[must_use]
pub fn get_card(serial: u32, number: u32) -> RawFrame {
    let mut frame = base_frame(opcode::GET_CARD, serial);
    bcd::set_u32(frame.as_bytes_mut(), 8, number);
    frame
}

/// `GetCardByIndex` request (index at offset 8).
#[must_use]
pub fn get_card_by_index(serial: u32, index: u32) -> RawFrame {
    let mut frame = base_frame(opcode::GET_CARD_BY_INDEX, serial);
    bcd::set_u32(frame.as_bytes_mut(), 8, index);
    frame
}

/// `PutCard` request.
///
/// # Errors
///
/// Returns `InvalidArgument` if `card`'s dates or PIN do not fit the wire
/// format.
pub fn put_card(serial: u32, card: &CardRecord) -> Result<RawFrame> {
    let mut frame = base_frame(opcode::PUT_CARD, serial);
    let buf = frame.as_bytes_mut();
    bcd::set_u32(buf, 8, card.number);
    bcd::set_optional_date(buf, 12, card.start)?;
    bcd::set_optional_date(buf, 16, card.end)?;
    buf[20..24].copy_from_slice(&card.doors);
    bcd::set_pin(buf, 24, card.pin)?;
    Ok(frame)
}

/// `DeleteCard` request.
#[must_use]
pub fn delete_card(serial: u32, number: u32) -> RawFrame {
    let mut frame = base_frame(opcode::DELETE_CARD, serial);
    bcd::set_u32(frame.as_bytes_mut(), 8, number);
    frame
}

/// `DeleteAllCards` request.
#[must_use]
pub fn delete_all_cards(serial: u32) -> RawFrame {
    base_frame(opcode::DELETE_ALL_CARDS, serial)
}

/// `GetEvent` request (index at offset 8).
#[must_use]
pub fn get_event(serial: u32, index: u32) -> RawFrame {
    let mut frame = base_frame(opcode::GET_EVENT, serial);
    bcd::set_u32(frame.as_bytes_mut(), 8, index);
    frame
}

/// `GetEventIndex` request.
#[must_use]
pub fn get_event_index(serial: u32) -> RawFrame {
    base_frame(opcode::GET_EVENT_INDEX, serial)
}

/// `SetEventIndex` request.
#[must_use]
pub fn set_event_index(serial: u32, index: u32) -> RawFrame {
    let mut frame = base_frame(opcode::SET_EVENT_INDEX, serial);
    bcd::set_u32(frame.as_bytes_mut(), 8, index);
    frame
}

/// `RecordSpecialEvents` request.
#[must_use]
pub fn record_special_events(serial: u32, enable: bool) -> RawFrame {
    let mut frame = base_frame(opcode::RECORD_SPECIAL_EVENTS, serial);
    bcd::set_bool(frame.as_bytes_mut(), 8, enable);
    frame
}

/// `GetTimeProfile` request (profile id at offset 8).
#[must_use]
pub fn get_time_profile(serial: u32, id: u8) -> RawFrame {
    let mut frame = base_frame(opcode::GET_TIME_PROFILE, serial);
    bcd::set_u8(frame.as_bytes_mut(), 8, id);
    frame
}

/// `SetTimeProfile` request.
///
/// # Errors
///
/// Returns `InvalidArgument` if `profile`'s dates do not fit the wire
/// format.
pub fn set_time_profile(serial: u32, profile: &TimeProfile) -> Result<RawFrame> {
    let mut frame = base_frame(opcode::SET_TIME_PROFILE, serial);
    let buf = frame.as_bytes_mut();
    bcd::set_u8(buf, 8, profile.id);
    bcd::set_optional_date(buf, 9, profile.start)?;
    bcd::set_optional_date(buf, 13, profile.end)?;
    set_weekdays(buf, 17, profile.weekdays);
    bcd::set_hhmm(buf, 24, profile.segments[0].start);
    bcd::set_hhmm(buf, 26, profile.segments[0].end);
    bcd::set_hhmm(buf, 28, profile.segments[1].start);
    bcd::set_hhmm(buf, 30, profile.segments[1].end);
    bcd::set_hhmm(buf, 32, profile.segments[2].start);
    bcd::set_hhmm(buf, 34, profile.segments[2].end);
    bcd::set_u8(buf, 36, profile.linked);
    Ok(frame)
}

/// `DeleteAllTimeProfiles` request.
#[must_use]
pub fn delete_all_time_profiles(serial: u32) -> RawFrame {
    base_frame(opcode::DELETE_ALL_TIME_PROFILES, serial)
}

/// `AddTask` request.
///
/// # Errors
///
/// Returns `InvalidArgument` if `task`'s dates do not fit the wire format.
pub fn add_task(serial: u32, task: &Task) -> Result<RawFrame> {
    let mut frame = base_frame(opcode::ADD_TASK, serial);
    let buf = frame.as_bytes_mut();
    bcd::set_optional_date(buf, 8, task.start)?;
    bcd::set_optional_date(buf, 12, task.end)?;
    set_weekdays(buf, 16, task.weekdays);
    bcd::set_hhmm(buf, 23, task.start_time);
    bcd::set_u8(buf, 25, task.door);
    bcd::set_u8(buf, 26, task.task_type);
    bcd::set_u8(buf, 27, task.more_cards);
    Ok(frame)
}

/// `RefreshTasklist` request.
#[must_use]
pub fn refresh_tasklist(serial: u32) -> RawFrame {
    base_frame(opcode::REFRESH_TASKLIST, serial)
}

/// `ClearTasklist` request.
#[must_use]
pub fn clear_tasklist(serial: u32) -> RawFrame {
    base_frame(opcode::CLEAR_TASKLIST, serial)
}

/// `SetPcControl` request.
#[must_use]
pub fn set_pc_control(serial: u32, enable: bool) -> RawFrame {
    let mut frame = base_frame(opcode::SET_PC_CONTROL, serial);
    bcd::set_bool(frame.as_bytes_mut(), 12, enable);
    frame
}

/// `SetInterlock` request. Callers are expected to validate `mode` against
/// the controller's supported enumeration before calling; this encoder
/// writes whatever byte it is given.
#[must_use]
pub fn set_interlock(serial: u32, mode: u8) -> RawFrame {
    let mut frame = base_frame(opcode::SET_INTERLOCK, serial);
    bcd::set_u8(frame.as_bytes_mut(), 8, mode);
    frame
}

/// `ActivateKeypads` request.
#[must_use]
pub fn activate_keypads(serial: u32, readers: [bool; 4]) -> RawFrame {
    let mut frame = base_frame(opcode::ACTIVATE_KEYPADS, serial);
    let buf = frame.as_bytes_mut();
    for (i, &enabled) in readers.iter().enumerate() {
        bcd::set_bool(buf, 8 + i, enabled);
    }
    frame
}

/// `SetDoorPasscodes` request. Callers are expected to validate that each
/// passcode fits `0..=999_999` before calling.
#[must_use]
pub fn set_door_passcodes(serial: u32, door: u8, passcodes: [u32; 4]) -> RawFrame {
    let mut frame = base_frame(opcode::SET_DOOR_PASSCODES, serial);
    let buf = frame.as_bytes_mut();
    bcd::set_u8(buf, 8, door);
    bcd::set_u32(buf, 12, passcodes[0]);
    bcd::set_u32(buf, 16, passcodes[1]);
    bcd::set_u32(buf, 20, passcodes[2]);
    bcd::set_u32(buf, 24, passcodes[3]);
    frame
}

/// `RestoreDefaultParameters` request.
#[must_use]
pub fn restore_default_parameters(serial: u32) -> RawFrame {
    base_frame(opcode::RESTORE_DEFAULT_PARAMETERS, serial)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn get_controller_sets_header_and_serial() {
        let frame = get_controller(405_419_896);
        assert_eq!(frame.som(), crate::frame::SOM);
        assert_eq!(frame.function_code(), opcode::GET_CONTROLLER);
        assert_eq!(frame.serial(), 405_419_896);
    }

    #[test]
    fn delete_all_cards_inserts_magic_unconditionally() {
        let frame = delete_all_cards(1);
        assert_eq!(bcd::get_u32(frame.as_bytes(), 8), MAGIC);
    }

    #[test]
    fn set_time_profile_null_segment_is_0000() {
        let profile = TimeProfile {
            id: 2,
            start: None,
            end: None,
            weekdays: [true; 7],
            segments: [Default::default(); 3],
            linked: 0,
        };
        let frame = set_time_profile(1, &profile).unwrap();
        assert_eq!(&frame.as_bytes()[24..26], &[0x00, 0x00]);
    }
}
