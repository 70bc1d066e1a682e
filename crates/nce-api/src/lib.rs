// nce-api: Async Rust client for the 1NCE device management API

pub mod actions;
pub mod auth;
pub mod client;
pub mod devices;
pub mod error;
pub mod oauth;
pub mod payload;
pub mod store;
pub mod tlv;
pub mod transport;

pub use actions::{
    ActionKind, ActionOutcome, ActionReport, ActionRequest, ActionStatus, PollPolicy, PollState,
};
pub use auth::AuthScheme;
pub use client::{
    ApiResponse, DEFAULT_DEVICE_ID, DEFAULT_DEVICE_URL, DEFAULT_TOKEN_URL, DeviceId, Endpoints,
    NceClient,
};
pub use devices::{DEFAULT_PSK, PskRequest};
pub use error::Error;
pub use payload::{PayloadDecoder, ResultView, decode_base64, hex_dump, render_result};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use tlv::TlvDecoder;
pub use transport::{TlsMode, TransportConfig};
