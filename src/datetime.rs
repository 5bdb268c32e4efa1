//! Bare datetime literals for chrono fields.
//!
//! Plain chrono fields encode as quoted RFC 3339 strings, which decode back fine but
//! read as strings in the document. Route a field through this module to write it as
//! a datetime literal instead:
//!
//! ```rust
//! use chrono::{DateTime, FixedOffset};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Event {
//!     #[serde(with = "serde_rj::datetime")]
//!     at: DateTime<FixedOffset>,
//! }
//!
//! let event: Event = serde_rj::from_str("at: 2019-10-11T12:03:04Z\n").unwrap();
//! assert_eq!(serde_rj::to_string(&event).unwrap(), "at: 2019-10-11T12:03:04Z\n");
//! ```
//!
//! Other serializers see an ordinary newtype around the RFC 3339 string.

use crate::Datetime;
use chrono::SecondsFormat;
use serde::{Deserialize, Deserializer, Serializer};

/// Newtype name the encoder recognizes to write its contents unquoted.
pub(crate) const DATETIME_TOKEN: &str = "$serde_rj::private::Datetime";

/// RFC 3339 with `Z` for UTC and fractional seconds only when non-zero.
pub(crate) fn format_datetime(dt: &Datetime) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn serialize<S>(dt: &Datetime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_newtype_struct(DATETIME_TOKEN, &format_datetime(dt))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Datetime, D::Error>
where
    D: Deserializer<'de>,
{
    Datetime::deserialize(deserializer)
}
