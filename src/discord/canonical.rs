//! Canonical byte form for the four verification inputs.
//!
//! Body, timestamp, signature and public key can each arrive as text, hex text
//! or raw bytes. Everything is reduced to one byte slice before any
//! cryptography runs.

use std::borrow::Cow;

use axum::body::Bytes;
use serde_json::Value;

use crate::error::{Error, Result};

/// How a plain `Text` input is interpreted for a given field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Body and timestamp: the UTF-8 bytes of the string are signed.
    Utf8,
    /// Signature and public key: the string carries hex-encoded bytes.
    Hex,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputValue<'a> {
    /// A string, read according to the field's [`Encoding`].
    Text(Cow<'a, str>),
    /// A string that is always hex-decoded, whatever the field.
    HexText(Cow<'a, str>),
    /// Raw bytes, used as-is.
    Bytes(Cow<'a, [u8]>),
    /// No value at all. Canonicalizes to an empty sequence.
    Absent,
    /// An already-decoded value such as a JSON object. Never accepted.
    Structured(Value),
}

impl<'a> InputValue<'a> {
    pub fn text(value: impl Into<Cow<'a, str>>) -> Self {
        Self::Text(value.into())
    }

    pub fn hex(value: impl Into<Cow<'a, str>>) -> Self {
        Self::HexText(value.into())
    }

    pub fn bytes(value: impl Into<Cow<'a, [u8]>>) -> Self {
        Self::Bytes(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) | Self::HexText(text) => text.is_empty(),
            Self::Bytes(bytes) => bytes.is_empty(),
            Self::Absent => true,
            Self::Structured(_) => false,
        }
    }

    /// Reduce the value to bytes. `Bytes` inputs are borrowed, never copied.
    pub fn to_bytes(&self, encoding: Encoding) -> Result<Cow<'_, [u8]>> {
        match self {
            Self::Text(text) => match encoding {
                Encoding::Utf8 => Ok(Cow::Borrowed(text.as_bytes())),
                Encoding::Hex => Ok(Cow::Owned(hex::decode(text.as_bytes())?)),
            },
            Self::HexText(text) => Ok(Cow::Owned(hex::decode(text.as_bytes())?)),
            Self::Bytes(bytes) => Ok(Cow::Borrowed(&bytes[..])),
            Self::Absent => Ok(Cow::Borrowed(&[])),
            Self::Structured(value) => Err(Error::UnsupportedInputType(kind_of(value))),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<'a> From<&'a str> for InputValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(Cow::Borrowed(value))
    }
}

impl<'a> From<&'a String> for InputValue<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(Cow::Borrowed(value.as_str()))
    }
}

impl<'a> From<String> for InputValue<'a> {
    fn from(value: String) -> Self {
        Self::Text(Cow::Owned(value))
    }
}

impl<'a> From<&'a [u8]> for InputValue<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::Bytes(Cow::Borrowed(value))
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for InputValue<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        Self::Bytes(Cow::Borrowed(value.as_slice()))
    }
}

impl<'a> From<&'a Vec<u8>> for InputValue<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        Self::Bytes(Cow::Borrowed(value.as_slice()))
    }
}

impl<'a> From<Vec<u8>> for InputValue<'a> {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(Cow::Owned(value))
    }
}

impl<'a> From<&'a Bytes> for InputValue<'a> {
    fn from(value: &'a Bytes) -> Self {
        Self::Bytes(Cow::Borrowed(&value[..]))
    }
}

/// Loosely typed values: `null` is absent, strings are text, anything else is
/// kept as a structured value and rejected on canonicalization.
impl<'a> From<Value> for InputValue<'a> {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::String(text) => Self::Text(Cow::Owned(text)),
            other => Self::Structured(other),
        }
    }
}

impl<'a, T> From<Option<T>> for InputValue<'a>
where
    T: Into<InputValue<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}
