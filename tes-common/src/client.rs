use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::{debug, warn};

use crate::extract::extract_string_field;
use tes_protocol::{
    CredentialRequest, CredentialResponse, ACCESS_KEY_ID, EXPIRATION, SECRET_ACCESS_KEY, TOKEN,
};

/// Well-known rendezvous path of the token exchange service socket.
pub const TES_SOCKET_PATH: &str = "/run/greengrass/aws_iot_tes";

/// Upper bound on a single service response. The service answers each
/// connection with one message that fits this bound; anything beyond it is
/// cut off at the bound.
pub const MAX_RESPONSE_SIZE: usize = 4096;

// Per-field output caps, sized for the service's credential material.
const ACCESS_KEY_MAX: usize = 256;
const SECRET_KEY_MAX: usize = 256;
const SESSION_TOKEN_MAX: usize = 2048;
const EXPIRATION_MAX: usize = 64;

/// Transport failure talking to the token exchange service. Any of these
/// aborts the whole fetch; none is retried.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to token exchange service at {path:?}: {source}")]
    Connect { path: PathBuf, source: io::Error },

    #[error("failed to send credential request: {0}")]
    Write(#[source] io::Error),

    #[error("failed to read credential response: {0}")]
    Read(#[source] io::Error),
}

/// Client for the local token exchange service. Holds no connection; each
/// fetch opens, uses and closes its own.
pub struct TesClient {
    socket_path: PathBuf,
}

impl TesClient {
    pub fn new() -> Self {
        Self {
            socket_path: PathBuf::from(TES_SOCKET_PATH),
        }
    }

    pub fn with_socket_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            socket_path: path.as_ref().to_path_buf(),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Fetch one set of formatted credentials from the service.
    ///
    /// One connect, one request, one bounded read, then the connection is
    /// closed before any field is touched. Fields that cannot be extracted
    /// from the response come back as `None` and are logged; only transport
    /// failures fail the call.
    pub async fn fetch_formatted_credentials(&self) -> Result<CredentialResponse, ClientError> {
        let mut stream =
            UnixStream::connect(&self.socket_path)
                .await
                .map_err(|source| ClientError::Connect {
                    path: self.socket_path.clone(),
                    source,
                })?;
        debug!("connected to token exchange service at {:?}", self.socket_path);

        let request = CredentialRequest::formatted();
        stream
            .write_all(request.wire().as_bytes())
            .await
            .map_err(ClientError::Write)?;
        debug!("sent credential request ({} bytes)", request.wire().len());

        // The service frames one response per connection, small enough for a
        // single read. Zero bytes is an empty response, not an error.
        let mut buffer = vec![0u8; MAX_RESPONSE_SIZE];
        let bytes_read = stream.read(&mut buffer).await.map_err(ClientError::Read)?;
        buffer.truncate(bytes_read);
        debug!("received {} bytes from token exchange service", bytes_read);

        drop(stream);

        let text = String::from_utf8_lossy(&buffer);
        Ok(CredentialResponse {
            access_key_id: extract_field(&text, ACCESS_KEY_ID, ACCESS_KEY_MAX),
            secret_access_key: extract_field(&text, SECRET_ACCESS_KEY, SECRET_KEY_MAX),
            session_token: extract_field(&text, TOKEN, SESSION_TOKEN_MAX),
            expiration: extract_field(&text, EXPIRATION, EXPIRATION_MAX),
        })
    }
}

impl Default for TesClient {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_field(text: &str, key: &str, max_len: usize) -> Option<String> {
    match extract_string_field(text, key, max_len) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("could not extract {} from response: {}", key, err);
            None
        }
    }
}
