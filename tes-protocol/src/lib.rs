use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Method name the token exchange service dispatches credential requests on.
pub const REQUEST_CREDENTIALS_FORMATTED: &str = "request_credentials_formatted";

/// Exact wire encoding of the credential request. The service speaks a single
/// request shape with no parameters, so the message is fixed: one UTF-8
/// payload, no framing, no length prefix.
pub const CREDENTIAL_REQUEST_WIRE: &str =
    r#"{"method":"request_credentials_formatted","params":{}}"#;

/// Field names used in the service response.
pub const ACCESS_KEY_ID: &str = "AccessKeyId";
pub const SECRET_ACCESS_KEY: &str = "SecretAccessKey";
pub const TOKEN: &str = "Token";
pub const EXPIRATION: &str = "Expiration";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CredentialRequest {
    method: &'static str,
    params: EmptyParams,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EmptyParams {}

impl CredentialRequest {
    /// Request for credentials in the service's formatted rendition.
    pub fn formatted() -> Self {
        Self {
            method: REQUEST_CREDENTIALS_FORMATTED,
            params: EmptyParams {},
        }
    }

    /// The single-message wire encoding of this request. A test pins this
    /// constant to the serde form of the struct.
    pub fn wire(&self) -> &'static str {
        CREDENTIAL_REQUEST_WIRE
    }
}

/// One set of credentials extracted from a service response. A field is
/// `None` when the response did not carry it or it could not be decoded.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialResponse {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub expiration: Option<String>,
}

impl CredentialResponse {
    /// Response field names that came back absent, in wire order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.access_key_id.is_none() {
            missing.push(ACCESS_KEY_ID);
        }
        if self.secret_access_key.is_none() {
            missing.push(SECRET_ACCESS_KEY);
        }
        if self.session_token.is_none() {
            missing.push(TOKEN);
        }
        if self.expiration.is_none() {
            missing.push(EXPIRATION);
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Expiration as a timestamp, when present and RFC 3339 formatted.
    pub fn expiration_time(&self) -> Option<DateTime<Utc>> {
        self.expiration
            .as_deref()
            .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
            .map(|time| time.with_timezone(&Utc))
    }
}

// Secret material must not leak through debug or trace formatting. Only the
// CLI prints secret fields, and it does so explicitly.
impl fmt::Debug for CredentialResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redacted(field: &Option<String>) -> &'static str {
            match field {
                Some(_) => "Some([redacted])",
                None => "None",
            }
        }
        f.debug_struct("CredentialResponse")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &format_args!("{}", redacted(&self.secret_access_key)),
            )
            .field(
                "session_token",
                &format_args!("{}", redacted(&self.session_token)),
            )
            .field("expiration", &self.expiration)
            .finish()
    }
}
