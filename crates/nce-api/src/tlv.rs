// OMA LWM2M TLV decoding
//
// Type byte layout:
//   bits 7-6  identifier type (object instance, resource instance,
//             multiple resource, resource with value)
//   bit  5    identifier width (0 = 8 bits, 1 = 16 bits)
//   bits 4-3  length field width (0 = inline, 1..=3 bytes)
//   bits 2-0  inline length when bits 4-3 are 0
//
// Object instances and multiple resources contain nested TLVs.

use std::fmt::{self, Write as _};

use crate::error::Error;
use crate::payload::PayloadDecoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlvKind {
    ObjectInstance,
    ResourceInstance,
    MultipleResource,
    Resource,
}

impl TlvKind {
    fn from_type_byte(byte: u8) -> Self {
        match byte >> 6 {
            0b00 => Self::ObjectInstance,
            0b01 => Self::ResourceInstance,
            0b10 => Self::MultipleResource,
            _ => Self::Resource,
        }
    }

    fn is_container(self) -> bool {
        matches!(self, Self::ObjectInstance | Self::MultipleResource)
    }
}

impl fmt::Display for TlvKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ObjectInstance => "Object Instance",
            Self::ResourceInstance => "Resource Instance",
            Self::MultipleResource => "Multiple Resource",
            Self::Resource => "Resource",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlvValue {
    Bytes(Vec<u8>),
    Nested(Vec<TlvRecord>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlvRecord {
    pub kind: TlvKind,
    pub id: u16,
    pub value: TlvValue,
}

/// Decode a TLV buffer into records.
pub fn parse(bytes: &[u8]) -> Result<Vec<TlvRecord>, Error> {
    parse_at(bytes, 0)
}

fn parse_at(bytes: &[u8], base: usize) -> Result<Vec<TlvRecord>, Error> {
    let mut records = Vec::new();
    let mut cursor = Cursor { bytes, pos: 0, base };

    while !cursor.is_empty() {
        let type_byte = cursor.take_uint(1, "type")?;
        let type_byte = u8::try_from(type_byte).unwrap_or_default();
        let kind = TlvKind::from_type_byte(type_byte);

        let id_width = if type_byte & 0x20 == 0 { 1 } else { 2 };
        let id = u16::try_from(cursor.take_uint(id_width, "identifier")?).unwrap_or_default();

        let length_width = usize::from((type_byte >> 3) & 0b11);
        let length = if length_width == 0 {
            usize::from(type_byte & 0b111)
        } else {
            usize::try_from(cursor.take_uint(length_width, "length")?).unwrap_or(usize::MAX)
        };

        let value_offset = cursor.offset();
        let raw = cursor.take(length, "value")?;
        let value = if kind.is_container() {
            TlvValue::Nested(parse_at(raw, value_offset)?)
        } else {
            TlvValue::Bytes(raw.to_vec())
        };

        records.push(TlvRecord { kind, id, value });
    }

    Ok(records)
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Cursor<'a> {
    fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], Error> {
        let end = self.pos.checked_add(len).filter(|end| *end <= self.bytes.len());
        let Some(end) = end else {
            return Err(Error::Tlv {
                offset: self.offset(),
                message: format!(
                    "truncated {what}: need {len} byte(s), {} left",
                    self.bytes.len() - self.pos
                ),
            });
        };
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_uint(&mut self, width: usize, what: &str) -> Result<u32, Error> {
        Ok(self
            .take(width, what)?
            .iter()
            .fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
    }
}

// ── Rendering ───────────────────────────────────────────────────────

/// Render records one per line, nested records indented.
pub fn render(records: &[TlvRecord]) -> String {
    let mut out = String::new();
    render_into(&mut out, records, 0);
    out.truncate(out.trim_end().len());
    out
}

fn render_into(out: &mut String, records: &[TlvRecord], depth: usize) {
    for record in records {
        let indent = "  ".repeat(depth);
        match &record.value {
            TlvValue::Nested(children) => {
                let _ = writeln!(out, "{indent}{} {}:", record.kind, record.id);
                render_into(out, children, depth + 1);
            }
            TlvValue::Bytes(bytes) => {
                let _ = writeln!(
                    out,
                    "{indent}{} {}: {}",
                    record.kind,
                    record.id,
                    describe_bytes(bytes)
                );
            }
        }
    }
}

/// Hex, plus whichever readings make sense: printable text and/or a
/// big-endian signed integer for 1/2/4/8-byte values.
fn describe_bytes(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "(empty)".into();
    }

    let mut out = hex::encode(bytes);
    let mut readings = Vec::new();

    if let Some(n) = as_integer(bytes) {
        readings.push(format!("int {n}"));
    }
    if let Ok(text) = std::str::from_utf8(bytes) {
        if text.chars().all(|c| !c.is_control()) {
            readings.push(format!("{text:?}"));
        }
    }

    if !readings.is_empty() {
        let _ = write!(out, " ({})", readings.join(", "));
    }
    out
}

fn as_integer(bytes: &[u8]) -> Option<i64> {
    match bytes.len() {
        1 => Some(i64::from(i8::from_be_bytes([bytes[0]]))),
        2 => Some(i64::from(i16::from_be_bytes(bytes.try_into().ok()?))),
        4 => Some(i64::from(i32::from_be_bytes(bytes.try_into().ok()?))),
        8 => Some(i64::from_be_bytes(bytes.try_into().ok()?)),
        _ => None,
    }
}

/// The default payload decoder: LWM2M TLV rendered as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TlvDecoder;

impl PayloadDecoder for TlvDecoder {
    fn decode(&self, payload: &[u8]) -> Result<String, Error> {
        Ok(render(&parse(payload)?))
    }
}
