pub mod client;
pub mod extract;

mod tests;

pub use client::{ClientError, TesClient, MAX_RESPONSE_SIZE, TES_SOCKET_PATH};
pub use extract::{extract_string_field, ExtractError};
