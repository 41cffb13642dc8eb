//! The 64-byte wire frame: start-of-message byte, function code, serial,
//! and a function-specific payload region.
//!
//! `RawFrame` is a thin, zero-copy view over the wire bytes — it knows the
//! shared header layout (bytes 0..8) but nothing about what a particular
//! function code's payload means. Per-operation encode/decode functions
//! (`crate::encode`, `crate::decode`) build and read the payload region
//! (bytes 8..64) through the offset-addressed helpers in `crate::bcd`.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::error::{ProtocolError, Result};

/// Start-of-message byte written on every transmitted frame.
pub const SOM: u8 = 0x17;

/// Alternative start-of-message byte seen on firmware v6.62, valid only
/// when paired with function code `0x20` (an unsolicited event frame).
pub const SOM_V6_62_EVENT: u8 = 0x19;

/// Magic constant required in the payload of several state-changing
/// operations (see the function code catalog).
pub const MAGIC: u32 = 0x55aa_aa55;

/// A 64-byte protocol frame, addressable by byte offset.
///
/// All-zero bytes are a valid bit pattern (an empty/default frame), and any
/// other 64-byte pattern is structurally valid too — validity is a property
/// of the *fields*, checked by `crate::decode`, not of this byte container.
#[derive(Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct RawFrame([u8; 64]);

impl RawFrame {
    /// Size of every frame on the wire.
    pub const SIZE: usize = 64;

    /// Builds a request frame with the transmit start-of-message byte, the
    /// given function code, and the controller serial at bytes 4..8. The
    /// payload region (bytes 8..64) is zeroed; callers fill it in.
    #[must_use]
    pub fn new(function_code: u8, serial: u32) -> Self {
        let mut bytes = [0u8; 64];
        bytes[0] = SOM;
        bytes[1] = function_code;
        bytes[4..8].copy_from_slice(&serial.to_le_bytes());
        Self(bytes)
    }

    /// Wraps an already-populated 64-byte buffer (used by decode to cast
    /// bytes received off the wire without copying).
    #[must_use]
    pub fn from_array(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Parses a frame from a received datagram/stream chunk.
    ///
    /// # Errors
    ///
    /// Returns `BadFrame` if `bytes` is not exactly 64 bytes long, or if the
    /// start-of-message byte is neither `0x17` nor the `0x19`+`0x20`
    /// firmware v6.62 event variant (§3.1 of the protocol's SOM policy).
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let Ok(array) = <[u8; 64]>::try_from(bytes) else {
            return Err(ProtocolError::BadFrame {
                byte: bytes.len().min(255) as u8,
                reason: "frame is not exactly 64 bytes",
            });
        };
        let frame = Self(array);
        let som = frame.som();
        let function_code = frame.function_code();
        if som == SOM || (som == SOM_V6_62_EVENT && function_code == 0x20) {
            Ok(frame)
        } else {
            Err(ProtocolError::BadFrame { byte: som, reason: "invalid start-of-message byte" })
        }
    }

    /// Start-of-message byte (offset 0).
    #[must_use]
    pub fn som(&self) -> u8 {
        self.0[0]
    }

    /// Function code (offset 1), selecting the operation.
    #[must_use]
    pub fn function_code(&self) -> u8 {
        self.0[1]
    }

    /// Controller serial number (offset 4, little-endian `u32`).
    #[must_use]
    pub fn serial(&self) -> u32 {
        crate::bcd::get_u32(&self.0, 4)
    }

    /// Checks that this frame's function code matches `expected`, the
    /// function code of the operation the caller requested.
    ///
    /// # Errors
    ///
    /// Returns `BadFrame` on mismatch.
    pub fn expect_function_code(&self, expected: u8) -> Result<()> {
        let actual = self.function_code();
        if actual == expected {
            Ok(())
        } else {
            Err(ProtocolError::BadFrame { byte: actual, reason: "unexpected function code" })
        }
    }

    /// Read-only access to the full 64-byte buffer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Mutable access to the full 64-byte buffer, for payload encoders.
    pub fn as_bytes_mut(&mut self) -> &mut [u8; 64] {
        &mut self.0
    }
}

impl std::fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawFrame")
            .field("som", &format_args!("{:#04x}", self.som()))
            .field("function_code", &format_args!("{:#04x}", self.function_code()))
            .field("serial", &self.serial())
            .finish()
    }
}

/// Formats a frame as a four-line hex dump: eight bytes per half, sixteen
/// bytes per line, as described by the host-side debug flag.
#[must_use]
pub fn hex_dump(frame: &RawFrame) -> String {
    let bytes = frame.as_bytes();
    let mut out = String::new();
    for row in 0..4 {
        let offset = row * 16;
        let left = &bytes[offset..offset + 8];
        let right = &bytes[offset + 8..offset + 16];
        let left = left.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(" ");
        let right = right.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(" ");
        out.push_str(&format!("  {offset:08x}  {left}  {right}\n"));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_som_function_code_and_serial() {
        let frame = RawFrame::new(0x94, 405_419_896);
        assert_eq!(frame.som(), SOM);
        assert_eq!(frame.function_code(), 0x94);
        assert_eq!(frame.serial(), 405_419_896);
    }

    #[test]
    fn parse_accepts_normal_som() {
        let mut bytes = [0u8; 64];
        bytes[0] = 0x17;
        bytes[1] = 0x20;
        assert!(RawFrame::parse(&bytes).is_ok());
    }

    #[test]
    fn parse_accepts_v6_62_event_som_only_with_function_0x20() {
        let mut bytes = [0u8; 64];
        bytes[0] = 0x19;
        bytes[1] = 0x20;
        assert!(RawFrame::parse(&bytes).is_ok());

        bytes[1] = 0x94;
        assert!(RawFrame::parse(&bytes).is_err());
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let bytes = [0u8; 63];
        assert!(RawFrame::parse(&bytes).is_err());
    }

    #[test]
    fn parse_rejects_unknown_som() {
        let mut bytes = [0u8; 64];
        bytes[0] = 0x01;
        assert!(RawFrame::parse(&bytes).is_err());
    }

    #[test]
    fn expect_function_code_mismatch_is_bad_frame() {
        let frame = RawFrame::new(0x94, 1);
        assert!(frame.expect_function_code(0x20).is_err());
        assert!(frame.expect_function_code(0x94).is_ok());
    }
}
