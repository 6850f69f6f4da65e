//! Envelope decoding: turns a transport response into a typed value or a
//! classified error.
//!
//! # Design
//! Every upstream response is wrapped as `{"ret": <int>, "msg": <string>,
//! "data": <any>}`, where only `ret == 1` means success, independent of the
//! HTTP status. Decoding runs in a fixed order:
//!
//! 1. Read the whole body and release the stream.
//! 2. HTTP status >= 400 short-circuits into `ApiError::Http`, using the
//!    envelope `msg` when the body happens to be one.
//! 3. Parse the envelope; a body that is not one is `MalformedEnvelope`.
//! 4. `ret != 1` is `ApiError::Envelope`; `data` is never looked at.
//! 5. Coerce `data` into the caller's type.
//!
//! The upstream is not consistent about single results: some endpoints
//! answer with a bare object where a list is documented, others wrap a single
//! record in a one-element array, and empty maps arrive as `[]`. Step 5
//! absorbs all of these centrally. The destination's shape is learned by
//! probing its `Deserialize` impl (see [`shape_of`]) and the fallbacks are
//! only tried after a direct decode fails, so well-formed payloads never pay
//! for them.

use std::cell::Cell;
use std::io::Read;

use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::{forward_to_deserialize_any, Deserialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, Result, TransportError};
use crate::http::HttpResponse;

/// The `ret` value that marks a successful envelope.
pub const RET_SUCCESS: i64 = 1;

/// The wire wrapper used by every upstream response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    pub ret: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub msg: String,
    /// Absent and `null` both decode to `Value::Null`.
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.ret == RET_SUCCESS
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a response into `T`.
///
/// The response is consumed: its body is read to the end and dropped before
/// this returns, on success and on every error path. Decoding the same
/// response twice does not compile:
///
/// ```compile_fail
/// use dootask_sdk::{envelope, HttpResponse};
///
/// let response = HttpResponse::from_bytes(200, r#"{"ret":1,"msg":"","data":7}"#);
/// let first: u32 = envelope::decode(response).unwrap();
/// let second: u32 = envelope::decode(response).unwrap();
/// ```
///
/// ```
/// use dootask_sdk::{envelope, HttpResponse};
///
/// let response = HttpResponse::from_bytes(200, r#"{"ret":1,"msg":"","data":[7]}"#);
/// let value: u32 = envelope::decode(response).unwrap();
/// assert_eq!(value, 7);
/// ```
pub fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    let (status, body) = read_body(response)?;
    decode_body(status, &body)
}

/// Decode an already-buffered body. Used by callers that perform the HTTP
/// round-trip themselves.
pub fn decode_body<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T> {
    let envelope = parse_envelope(status, body)?;
    if !envelope.is_success() {
        return Err(ApiError::Envelope {
            ret: envelope.ret,
            msg: envelope.msg,
        });
    }
    coerce(envelope.data)
}

/// Apply the HTTP check and parse the envelope without interpreting `ret`.
pub fn parse_envelope(status: u16, body: &[u8]) -> Result<Envelope> {
    if status >= 400 {
        return Err(classify_http_failure(status, body));
    }
    serde_json::from_slice(body).map_err(|source| ApiError::MalformedEnvelope { status, source })
}

/// Read a response that carries file content instead of an envelope.
///
/// HTTP failures are classified as usual. A JSON envelope with `ret != 1`
/// in place of the content is reported as an envelope failure.
pub fn decode_raw(response: HttpResponse) -> Result<Vec<u8>> {
    let (status, body) = read_body(response)?;
    if status >= 400 {
        return Err(classify_http_failure(status, &body));
    }
    if body.first() == Some(&b'{') {
        if let Ok(envelope) = serde_json::from_slice::<Envelope>(&body) {
            if !envelope.is_success() {
                return Err(ApiError::Envelope {
                    ret: envelope.ret,
                    msg: envelope.msg,
                });
            }
        }
    }
    Ok(body)
}

/// Build the HTTP-level failure for a status >= 400 response body.
///
/// Prefers the envelope `msg`, then the raw body text, then a fixed note
/// for an empty body.
pub fn classify_http_failure(status: u16, body: &[u8]) -> ApiError {
    let (ret, msg) = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => (
            fields.get("ret").and_then(Value::as_i64).filter(|ret| *ret != 0),
            fields
                .get("msg")
                .and_then(Value::as_str)
                .filter(|msg| !msg.is_empty())
                .map(str::to_owned),
        ),
        _ => (None, None),
    };
    let message = msg.unwrap_or_else(|| {
        let text = String::from_utf8_lossy(body);
        let text = text.trim();
        if text.is_empty() {
            "empty response body".to_string()
        } else {
            text.to_string()
        }
    });
    ApiError::Http {
        status,
        ret,
        message,
    }
}

/// Coerce an envelope payload into `T`, tolerating the upstream's
/// array/object inconsistencies.
pub fn coerce<T: DeserializeOwned>(data: Value) -> Result<T> {
    let direct = match T::deserialize(&data) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    let fallback = match (shape_of::<T>(), data) {
        (Shape::List, Value::Array(_)) => None,
        (Shape::List, Value::Null) => Some(("absent payload as empty list", Value::Array(Vec::new()))),
        (Shape::List, single) => Some(("bare value wrapped in a list", Value::Array(vec![single]))),
        (_, Value::Array(mut items)) if items.len() == 1 => {
            items.pop().map(|item| ("single element unwrapped", item))
        }
        (Shape::Record, Value::Array(items)) if items.is_empty() => {
            Some(("empty array as empty object", Value::Object(Map::new())))
        }
        _ => None,
    };

    let target = std::any::type_name::<T>();
    if let Some((how, alternative)) = fallback {
        if let Ok(value) = serde_json::from_value::<T>(alternative) {
            tracing::debug!(target_type = target, fallback = how, "normalized payload shape");
            return Ok(value);
        }
    }
    Err(ApiError::PayloadShape {
        target,
        source: direct,
    })
}

fn read_body(response: HttpResponse) -> Result<(u16, Vec<u8>)> {
    let status = response.status;
    let mut body = response.into_body();
    let mut buf = Vec::new();
    let read = body.read_to_end(&mut buf);
    drop(body);
    read.map_err(TransportError::Io)?;
    Ok((status, buf))
}

// ---------------------------------------------------------------------------
// Destination shape probing
// ---------------------------------------------------------------------------

/// What kind of JSON value a destination type expects at its top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Sequences: `Vec<T>`, arrays, tuples.
    List,
    /// Structs and maps.
    Record,
    /// Scalars, options, enums, self-describing values.
    Other,
}

/// Discover the top-level shape `T` deserializes from.
///
/// Runs `T`'s `Deserialize` impl against a deserializer that records the
/// first hint it is asked for and then fails. Newtype wrappers are looked
/// through.
pub fn shape_of<T: DeserializeOwned>() -> Shape {
    let shape = Cell::new(Shape::Other);
    let _ = T::deserialize(ShapeProbe { shape: &shape });
    shape.get()
}

struct ShapeProbe<'a> {
    shape: &'a Cell<Shape>,
}

impl ShapeProbe<'_> {
    fn found<T>(self, shape: Shape) -> std::result::Result<T, de::value::Error> {
        self.shape.set(shape);
        Err(de::Error::custom("shape probe"))
    }
}

impl<'de> Deserializer<'de> for ShapeProbe<'_> {
    type Error = de::value::Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> std::result::Result<V::Value, Self::Error> {
        self.found(Shape::Other)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, _visitor: V) -> std::result::Result<V::Value, Self::Error> {
        self.found(Shape::List)
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        _visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        self.found(Shape::List)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        self.found(Shape::List)
    }

    fn deserialize_map<V: Visitor<'de>>(self, _visitor: V) -> std::result::Result<V::Value, Self::Error> {
        self.found(Shape::Record)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        self.found(Shape::Record)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct enum identifier
        ignored_any
    }
}
