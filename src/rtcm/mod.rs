//! Pre-parsed RTCM-3 line decoding.
//!
//! Each input line renders one RTCM message as `key=value` tokens
//! (`<RTCM(1019, DF002=1019, DF009=5, ...)>`). Three message types are
//! decoded: 1019 (GPS ephemeris), 1002 (legacy L1 observables) and
//! 1074 (MSM4 observables); everything else is skipped, non fatal.

pub(crate) mod field;

mod eph;
mod legacy;
mod msm;

use thiserror::Error;

use crate::{
    navigation::Ephemeris,
    observation::{LegacyObservations, Msm4Observations},
    rtcm::field::FieldReader,
};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RtcmError {
    /// The line carries no `DF002` message type field.
    #[error("missing message type (DF002)")]
    MissingMessageType,

    /// A structurally mandatory field is missing or out of range
    /// (satellite identifier, cell index overflow, ...).
    #[error("malformed {0} message")]
    Malformed(u16),
}

/// One decoded RTCM message of interest.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// 1019: GPS broadcast ephemeris.
    Ephemeris(Ephemeris),

    /// 1002: legacy extended L1 observables.
    LegacyObservations(LegacyObservations),

    /// 1074: MSM4 observables (L1 C/A cells retained).
    Msm4Observations(Msm4Observations),
}

impl Message {
    /// Decodes one pre-parsed line.
    ///
    /// ## Output
    /// - `Ok(Some(_))` for a supported, well formed message,
    /// - `Ok(None)` for blank lines, comments and unsupported message
    ///   types (skipped, non fatal),
    /// - `Err(_)` for lines that look like messages but cannot be
    ///   decoded. The pipeline counts those and moves on.
    pub fn decode(line: &str) -> Result<Option<Self>, RtcmError> {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let reader = FieldReader::new(trimmed);

        let msg_type = reader.u16("DF002").ok_or(RtcmError::MissingMessageType)?;

        match msg_type {
            1002 => Ok(Some(Self::LegacyObservations(legacy::decode(&reader)?))),
            1019 => Ok(Some(Self::Ephemeris(eph::decode(&reader)?))),
            1074 => Ok(Some(Self::Msm4Observations(msm::decode(&reader)?))),
            _ => Ok(None),
        }
    }
}
