//! Typed request/response records, one per operation family (§3.3).
//!
//! Every response record carries the controller serial as its first field.
//! Optional temporal fields use `Option` rather than a sentinel value — see
//! the module-level docs on `crate::bcd`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A four-octet IPv4 address, stored in the order it appears on the wire.
pub type Ipv4 = [u8; 4];

/// Decoded `GetController` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerInfo {
    /// Controller serial number.
    pub serial: u32,
    /// Controller IPv4 address.
    pub ip: Ipv4,
    /// Subnet mask.
    pub mask: Ipv4,
    /// Gateway address.
    pub gateway: Ipv4,
    /// MAC address, colon-separated lowercase hex (`"00:12:23:34:45:56"`).
    pub mac: [u8; 6],
    /// Firmware version, formatted `"v<major>.<minor>"`.
    pub version: String,
    /// Firmware release date.
    pub date: NaiveDate,
}

/// A generic acknowledgement response: `serial@4, ok@8`. Most
/// state-changing operations share this shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// Controller serial number.
    pub serial: u32,
    /// Whether the controller accepted the request.
    pub ok: bool,
}

/// Decoded `GetTime`/`SetTime` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerTime {
    /// Controller serial number.
    pub serial: u32,
    /// Controller clock value.
    pub datetime: NaiveDateTime,
}

/// The shared event payload decoded by both `GetStatus` and the standalone
/// `Event` frame (§4.3.1, §4.3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventFields {
    /// Monotonically increasing event index; 0 means "no event".
    pub index: u32,
    /// Event type code.
    pub event_type: u8,
    /// Whether access was granted.
    pub access_granted: bool,
    /// Door number the event pertains to.
    pub door: u8,
    /// Direction code (in/out).
    pub direction: u8,
    /// Card number involved, if any.
    pub card: u32,
    /// When the event occurred; absent if the BCD bytes are not a valid
    /// calendar value.
    pub timestamp: Option<NaiveDateTime>,
    /// Reason code for denial/grant.
    pub reason: u8,
}

/// Decoded `GetStatus` response: the live door/system status plus the most
/// recent event (forced absent when `event.index == 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInfo {
    /// Controller serial number.
    pub serial: u32,
    /// Most recent event, or all-absent fields if none has occurred.
    pub event: EventFields,
    /// Whether each of the four doors is currently open.
    pub door_open: [bool; 4],
    /// Whether each of the four door buttons is currently pressed.
    pub door_button: [bool; 4],
    /// System error code.
    pub system_error: u8,
    /// Current controller time-of-day.
    pub system_time: NaiveTime,
    /// Controller-side monotonic sequence number.
    pub sequence_no: u32,
    /// Vendor-specific status byte.
    pub special_info: u8,
    /// Active relay bitmap.
    pub relays: u8,
    /// Active input bitmap.
    pub inputs: u8,
    /// Current controller date (two-digit year, century 2000).
    pub system_date: NaiveDate,
}

/// A standalone `Event` frame: identical fields to `StatusInfo::event`, with
/// the controller serial attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    /// Controller serial number.
    pub serial: u32,
    /// The event payload.
    pub fields: EventFields,
}

/// Decoded `GetListener` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Controller serial number.
    pub serial: u32,
    /// Host IPv4 address events are pushed to.
    pub ip: Ipv4,
    /// Host UDP port events are pushed to.
    pub port: u16,
}

/// Decoded `GetDoorControl` response / `SetDoorControl` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorControl {
    /// Door number, 1-4.
    pub door: u8,
    /// Control mode (controller-defined enumeration).
    pub mode: u8,
    /// Unlock delay, in seconds.
    pub delay: u8,
}

/// Decoded `GetCard`/`GetCardByIndex` response, and `PutCard` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardRecord {
    /// Controller serial number.
    pub serial: u32,
    /// Card number.
    pub number: u32,
    /// First day the card is valid, if bounded.
    pub start: Option<NaiveDate>,
    /// Last day the card is valid, if bounded.
    pub end: Option<NaiveDate>,
    /// Per-door access rights (time-profile id, 0 = no access).
    pub doors: [u8; 4],
    /// Keypad PIN, 0 if none is set.
    pub pin: u32,
}

/// Decoded `GetTimeProfile` response / `SetTimeProfile` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeProfile {
    /// Profile id, 2-254.
    pub id: u8,
    /// First day the profile is active, if bounded.
    pub start: Option<NaiveDate>,
    /// Last day the profile is active, if bounded.
    pub end: Option<NaiveDate>,
    /// Which weekdays (Monday first) the profile is active on.
    pub weekdays: [bool; 7],
    /// Up to three enable/disable time segments during the active day.
    pub segments: [TimeSegment; 3],
    /// Linked profile id, for profile chaining; 0 if none.
    pub linked: u8,
}

/// One enable/disable window within a `TimeProfile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeSegment {
    /// Segment start time, or `None` for a null (`00:00`) segment.
    pub start: Option<NaiveTime>,
    /// Segment end time, or `None` for a null (`00:00`) segment.
    pub end: Option<NaiveTime>,
}

/// Decoded `AddTask` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    /// First day the task is active.
    pub start: Option<NaiveDate>,
    /// Last day the task is active.
    pub end: Option<NaiveDate>,
    /// Which weekdays (Monday first) the task runs on.
    pub weekdays: [bool; 7],
    /// Time of day the task fires.
    pub start_time: Option<NaiveTime>,
    /// Door the task applies to.
    pub door: u8,
    /// Task type code.
    pub task_type: u8,
    /// Extra parameter used by card-related task types.
    pub more_cards: u8,
}
