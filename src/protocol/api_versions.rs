//! API versions handshake: version policy and response layout.
//!
//! Response body, big-endian:
//!
//! ```text
//! [CorrelationId(4)] [ErrorCode(2)] [ApiKeyCount(1)]
//!   { [ApiKey(2)] [MinVersion(2)] [MaxVersion(2)] [Tag(1)] } * (ApiKeyCount - 1)
//! [ThrottleTimeMs(4)] [Tag(1)]
//! ```
//!
//! `ApiKeyCount` follows the compact array convention and carries the number
//! of entries plus one.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{ProtocolError, Result};
use crate::protocol::header::RequestHeader;

/// API key of the version negotiation request itself.
pub const API_VERSIONS_KEY: i16 = 18;

/// Lowest handshake version the broker answers without an error.
pub const API_VERSIONS_MIN_VERSION: i16 = 0;

/// Highest handshake version the broker answers without an error.
pub const API_VERSIONS_MAX_VERSION: i16 = 4;

/// Ranges advertised by the broker. The handshake API must come first.
pub const SUPPORTED_APIS: &[SupportedApi] = &[
    SupportedApi::new(API_VERSIONS_KEY, 0, 4),
    SupportedApi::new(3, 0, 4),
    SupportedApi::new(5, 0, 4),
];

/// Largest entry count expressible in the single-byte count field.
pub const MAX_SUPPORTED_APIS: usize = i8::MAX as usize - 1;

const ENTRY_SIZE: usize = 7;
const FIXED_SIZE: usize = 4 + 2 + 1 + 4 + 1;

/// One advertised API key and its inclusive version range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportedApi {
    pub api_key: i16,
    pub min_version: i16,
    pub max_version: i16,
}

impl SupportedApi {
    pub const fn new(api_key: i16, min_version: i16, max_version: i16) -> Self {
        Self {
            api_key,
            min_version,
            max_version,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    None,
    UnsupportedVersion,
    Unknown(i16),
}

impl ErrorCode {
    pub fn code(self) -> i16 {
        match self {
            ErrorCode::None => 0,
            ErrorCode::UnsupportedVersion => 35,
            ErrorCode::Unknown(code) => code,
        }
    }

    pub fn is_ok(self) -> bool {
        self == ErrorCode::None
    }
}

impl From<i16> for ErrorCode {
    fn from(code: i16) -> Self {
        match code {
            0 => ErrorCode::None,
            35 => ErrorCode::UnsupportedVersion,
            other => ErrorCode::Unknown(other),
        }
    }
}

/// Check that `apis` can be advertised: the handshake API comes first and the
/// list fits the single-byte count.
pub fn validate_supported_apis(apis: &[SupportedApi]) -> Result<()> {
    if apis.len() > MAX_SUPPORTED_APIS {
        return Err(ProtocolError::TooManyApis(apis.len()));
    }

    match apis.first() {
        Some(first) if first.api_key == API_VERSIONS_KEY => Ok(()),
        Some(first) => Err(ProtocolError::InvalidSupportedApis(format!(
            "first entry is api key {}, expected {API_VERSIONS_KEY}",
            first.api_key
        ))),
        None => Err(ProtocolError::InvalidSupportedApis(
            "list is empty".to_string(),
        )),
    }
}

/// Decide whether a requested handshake version can be served.
#[inline]
pub fn check_version(api_version: i16) -> ErrorCode {
    if (API_VERSIONS_MIN_VERSION..=API_VERSIONS_MAX_VERSION).contains(&api_version) {
        ErrorCode::None
    } else {
        ErrorCode::UnsupportedVersion
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersionsResponse {
    pub correlation_id: i32,
    pub error_code: ErrorCode,
    pub api_keys: Vec<SupportedApi>,
    pub throttle_time_ms: i32,
}

impl ApiVersionsResponse {
    /// Build the answer to `header`.
    ///
    /// The advertised list is always included, even when the requested version
    /// is unsupported.
    pub fn negotiate(header: &RequestHeader, supported: &[SupportedApi]) -> Self {
        Self {
            correlation_id: header.correlation_id,
            error_code: check_version(header.api_version),
            api_keys: supported.to_vec(),
            throttle_time_ms: 0,
        }
    }

    /// Value written to the count field: entries plus one.
    ///
    /// Saturates at `u8::MAX`; `encode` refuses lists that large.
    pub fn api_key_count(&self) -> u8 {
        u8::try_from(self.api_keys.len() + 1).unwrap_or(u8::MAX)
    }

    /// Exact number of body bytes `encode` writes.
    pub fn encoded_len(&self) -> usize {
        FIXED_SIZE + self.api_keys.len() * ENTRY_SIZE
    }

    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        if self.api_keys.len() > MAX_SUPPORTED_APIS {
            return Err(ProtocolError::TooManyApis(self.api_keys.len()));
        }

        dst.reserve(self.encoded_len());
        dst.put_i32(self.correlation_id);
        dst.put_i16(self.error_code.code());
        dst.put_u8(self.api_key_count());
        for api in &self.api_keys {
            dst.put_i16(api.api_key);
            dst.put_i16(api.min_version);
            dst.put_i16(api.max_version);
            dst.put_u8(0);
        }
        dst.put_i32(self.throttle_time_ms);
        dst.put_u8(0);
        Ok(())
    }

    /// Parse a response body, as a client would.
    pub fn decode(body: &mut Bytes) -> Result<Self> {
        ensure(body, 4 + 2 + 1, "header")?;
        let correlation_id = body.get_i32();
        let error_code = ErrorCode::from(body.get_i16());

        let count = body.get_u8();
        if count == 0 {
            return Err(ProtocolError::MalformedResponse(
                "null api key array".to_string(),
            ));
        }

        let entries = (count - 1) as usize;
        let mut api_keys = Vec::with_capacity(entries);
        for _ in 0..entries {
            ensure(body, ENTRY_SIZE, "api key entry")?;
            let api = SupportedApi::new(body.get_i16(), body.get_i16(), body.get_i16());
            body.advance(1);
            api_keys.push(api);
        }

        ensure(body, 4 + 1, "throttle time")?;
        let throttle_time_ms = body.get_i32();
        body.advance(1);

        Ok(Self {
            correlation_id,
            error_code,
            api_keys,
            throttle_time_ms,
        })
    }
}

fn ensure(body: &Bytes, needed: usize, field: &str) -> Result<()> {
    if body.remaining() < needed {
        return Err(ProtocolError::MalformedResponse(format!(
            "body ends before {field}: {} of {needed} bytes",
            body.remaining()
        )));
    }
    Ok(())
}
