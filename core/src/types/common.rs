//! Wire helpers shared by every domain.
//!
//! # Design
//! The upstream is a PHP application and its JSON is loosely typed: flags
//! arrive as `0`/`1`, `"1"` or `true`, id lists sometimes collapse to a
//! single number, timestamps come in more than one format, and list
//! endpoints answer either with a Laravel paginator or with a bare array.
//! The types here absorb that at the field level so domain DTOs can be
//! plain derives.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// IntBool
// ---------------------------------------------------------------------------

/// A flag the upstream may send as a boolean, a number, a numeric string or
/// `null`. Always serialized as a JSON boolean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IntBool(pub bool);

impl IntBool {
    pub fn get(self) -> bool {
        self.0
    }
}

impl From<bool> for IntBool {
    fn from(value: bool) -> Self {
        IntBool(value)
    }
}

impl From<IntBool> for bool {
    fn from(value: IntBool) -> Self {
        value.0
    }
}

impl Serialize for IntBool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.0)
    }
}

impl<'de> Deserialize<'de> for IntBool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IntBoolVisitor).map(IntBool)
    }
}

struct IntBoolVisitor;

impl<'de> Visitor<'de> for IntBoolVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean, a number or a numeric string")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
        Ok(v != 0)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
        Ok(v != 0)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<bool, E> {
        Ok(v != 0.0)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
        let v = v.trim();
        if v.eq_ignore_ascii_case("true") {
            return Ok(true);
        }
        Ok(v.parse::<f64>().map(|n| n != 0.0).unwrap_or(false))
    }

    fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_none<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<bool, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(false)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<bool, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(false)
    }
}

// ---------------------------------------------------------------------------
// IntArray
// ---------------------------------------------------------------------------

/// A list of integer ids that may arrive as an array, a single number or
/// `null`. Non-numeric array items are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct IntArray(pub Vec<i64>);

impl IntArray {
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<i64> {
        self.0
    }
}

impl From<Vec<i64>> for IntArray {
    fn from(value: Vec<i64>) -> Self {
        IntArray(value)
    }
}

impl<'de> Deserialize<'de> for IntArray {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IntArrayVisitor).map(IntArray)
    }
}

struct IntArrayVisitor;

impl<'de> Visitor<'de> for IntArrayVisitor {
    type Value = Vec<i64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of integers or a single integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Vec<i64>, E> {
        Ok(vec![v])
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Vec<i64>, E> {
        Ok(i64::try_from(v).map(|v| vec![v]).unwrap_or_default())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Vec<i64>, E> {
        Ok(vec![v as i64])
    }

    fn visit_str<E: de::Error>(self, _v: &str) -> Result<Vec<i64>, E> {
        Ok(Vec::new())
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Vec<i64>, E> {
        Ok(Vec::new())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Vec<i64>, E> {
        Ok(Vec::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<Vec<i64>, E> {
        Ok(Vec::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Vec<i64>, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<i64>, A::Error> {
        let mut ids = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<serde_json::Value>()? {
            if let Some(id) = item.as_i64().or_else(|| item.as_f64().map(|f| f as i64)) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Vec<i64>, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Vec::new())
    }
}

// ---------------------------------------------------------------------------
// DateTime
// ---------------------------------------------------------------------------

/// Wire format the upstream uses for timestamps.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A wall-clock timestamp as the upstream reports it.
///
/// Accepts `2024-05-01 08:30:00`, RFC 3339 and RFC 3339 with fractional
/// seconds. RFC 3339 values keep their local wall-clock time. Serialized in
/// the upstream's `YYYY-MM-DD HH:MM:SS` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime(pub NaiveDateTime);

impl DateTime {
    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl From<NaiveDateTime> for DateTime {
    fn from(value: NaiveDateTime) -> Self {
        DateTime(value)
    }
}

impl FromStr for DateTime {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
            Ok(naive) => Ok(DateTime(naive)),
            Err(plain) => chrono::DateTime::parse_from_rfc3339(s)
                .map(|dt| DateTime(dt.naive_local()))
                .map_err(|_| plain),
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATETIME_FORMAT))
    }
}

impl Serialize for DateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|err| de::Error::custom(format!("invalid timestamp {raw:?}: {err}")))
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// One page of a paginated list.
///
/// Decodes the Laravel paginator the upstream returns, or a bare array,
/// which is treated as a single complete page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub current_page: i64,
    pub data: Vec<T>,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub path: Option<String>,
    pub first_page_url: Option<String>,
    pub last_page_url: Option<String>,
    pub next_page_url: Option<String>,
    pub prev_page_url: Option<String>,
}

impl<T> Page<T> {
    /// A single page holding every item.
    pub fn complete(data: Vec<T>) -> Self {
        let total = data.len() as i64;
        Self {
            current_page: 1,
            per_page: total,
            total,
            last_page: 1,
            from: None,
            to: None,
            path: None,
            first_page_url: None,
            last_page_url: None,
            next_page_url: None,
            prev_page_url: None,
            data,
        }
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_items(self) -> Vec<T> {
        self.data
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::complete(Vec::new())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr<T> {
    Paged(Paged<T>),
    Bare(Vec<T>),
}

#[derive(Deserialize)]
struct Paged<T> {
    #[serde(default)]
    current_page: Option<i64>,
    data: Vec<T>,
    #[serde(default)]
    per_page: Option<i64>,
    #[serde(default)]
    total: Option<i64>,
    #[serde(default)]
    last_page: Option<i64>,
    #[serde(default)]
    from: Option<i64>,
    #[serde(default)]
    to: Option<i64>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    first_page_url: Option<String>,
    #[serde(default)]
    last_page_url: Option<String>,
    #[serde(default)]
    next_page_url: Option<String>,
    #[serde(default)]
    prev_page_url: Option<String>,
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match PageRepr::deserialize(deserializer)? {
            PageRepr::Bare(items) => Ok(Page::complete(items)),
            PageRepr::Paged(p) => {
                let len = p.data.len() as i64;
                Ok(Page {
                    current_page: p.current_page.unwrap_or(1),
                    per_page: p.per_page.unwrap_or(len),
                    total: p.total.unwrap_or(len),
                    last_page: p.last_page.unwrap_or(1),
                    from: p.from,
                    to: p.to,
                    path: p.path,
                    first_page_url: p.first_page_url,
                    last_page_url: p.last_page_url,
                    next_page_url: p.next_page_url,
                    prev_page_url: p.prev_page_url,
                    data: p.data,
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// The compact user record embedded in projects, tasks and logs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(alias = "userid")]
    pub id: i64,
    pub email: String,
    pub nickname: String,
    #[serde(alias = "userimg")]
    pub avatar: String,
}

/// Pagination arguments most list endpoints accept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(rename = "pagesize", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
        }
    }
}
