// Action result rendering
//
// A finished request may carry `resultData.payload`: base64 of the raw
// LWM2M content. That gets decoded and handed to a `PayloadDecoder`;
// otherwise the JSON result (or the whole response) is shown as-is.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::actions::ActionStatus;
use crate::error::Error;

/// Turns raw payload bytes into display text.
pub trait PayloadDecoder {
    fn decode(&self, payload: &[u8]) -> Result<String, Error>;
}

/// What a finished request has to show.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    /// Decoded bytes of `resultData.payload`.
    Payload(Vec<u8>),
    /// `resultData` without a usable payload.
    Data(Value),
    /// No `resultData` at all: the full response.
    Response(Value),
}

impl ResultView {
    pub fn from_status(status: &ActionStatus) -> Result<Self, Error> {
        if let Some(encoded) = status.payload() {
            return Ok(Self::Payload(decode_base64(encoded)?));
        }
        Ok(match status.result_data() {
            Some(data) => Self::Data(data.clone()),
            None => Self::Response(status.raw().clone()),
        })
    }

    /// Render with `decoder`. JSON views are pretty-printed.
    pub fn render(&self, decoder: &dyn PayloadDecoder) -> Result<String, Error> {
        match self {
            Self::Payload(bytes) => decoder.decode(bytes),
            Self::Data(value) | Self::Response(value) => Ok(pretty_json(value)),
        }
    }
}

/// Render the result of `status` in one go.
pub fn render_result(status: &ActionStatus, decoder: &dyn PayloadDecoder) -> Result<String, Error> {
    ResultView::from_status(status)?.render(decoder)
}

pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, Error> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::Payload(format!("invalid base64: {e}")))
}

/// Classic 16-bytes-per-line hex dump with an ASCII column.
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(line, chunk)| {
            let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
            let ascii: String = chunk
                .iter()
                .map(|b| {
                    if b.is_ascii_graphic() || *b == b' ' {
                        char::from(*b)
                    } else {
                        '.'
                    }
                })
                .collect();
            format!("{:08x}  {:<47}  |{ascii}|", line * 16, hex.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
