use chrono::{DateTime, Utc};

// ============================================================================
// Binary Timestamp Encoding
// ============================================================================
//
// Layout (big-endian), compatible with the time encoding used by the other
// services in the system:
//
//   [0]      version (1, or 2 when the zone offset has a seconds part)
//   [1..9]   i64 seconds since 0001-01-01T00:00:00Z
//   [9..13]  i32 nanoseconds within the second
//   [13..15] i16 zone offset in minutes, -1 meaning UTC
//   [15]     i8 zone offset seconds (version 2 only)
//
// We always encode UTC with version 1. Decoding accepts both versions; the
// zone offset only affects presentation, so the decoded instant is returned
// in UTC.
//
// ============================================================================

const VERSION_V1: u8 = 1;
const VERSION_V2: u8 = 2;
const LEN_V1: usize = 15;
const LEN_V2: usize = 16;

/// Seconds between 0001-01-01 and the Unix epoch.
const UNIX_TO_INTERNAL: i64 = 62_135_596_800;

const UTC_OFFSET_MIN: i16 = -1;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("timestamp is empty")]
    Empty,

    #[error("unsupported timestamp version: {0}")]
    UnsupportedVersion(u8),

    #[error("invalid timestamp length: {0}")]
    InvalidLength(usize),

    #[error("timestamp out of range")]
    OutOfRange,

    #[error("order has no creation timestamp")]
    Missing,
}

pub fn encode_timestamp(t: DateTime<Utc>) -> Vec<u8> {
    let sec = t.timestamp() + UNIX_TO_INTERNAL;
    let nsec = t.timestamp_subsec_nanos() as i32;

    let mut buf = Vec::with_capacity(LEN_V1);
    buf.push(VERSION_V1);
    buf.extend_from_slice(&sec.to_be_bytes());
    buf.extend_from_slice(&nsec.to_be_bytes());
    buf.extend_from_slice(&UTC_OFFSET_MIN.to_be_bytes());
    buf
}

pub fn decode_timestamp(buf: &[u8]) -> Result<DateTime<Utc>, TimestampError> {
    let version = *buf.first().ok_or(TimestampError::Empty)?;

    let expected_len = match version {
        VERSION_V1 => LEN_V1,
        VERSION_V2 => LEN_V2,
        other => return Err(TimestampError::UnsupportedVersion(other)),
    };
    if buf.len() != expected_len {
        return Err(TimestampError::InvalidLength(buf.len()));
    }

    let mut sec = [0u8; 8];
    sec.copy_from_slice(&buf[1..9]);
    let mut nsec = [0u8; 4];
    nsec.copy_from_slice(&buf[9..13]);

    let sec = i64::from_be_bytes(sec)
        .checked_sub(UNIX_TO_INTERNAL)
        .ok_or(TimestampError::OutOfRange)?;
    let nsec = u32::try_from(i32::from_be_bytes(nsec)).map_err(|_| TimestampError::OutOfRange)?;

    DateTime::from_timestamp(sec, nsec).ok_or(TimestampError::OutOfRange)
}
