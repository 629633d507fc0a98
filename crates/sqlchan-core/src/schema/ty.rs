use crate::{Error, Result};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::{fmt, str::FromStr};

/// Days from 0001-01-01 to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// The declared type of a message field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,

    /// IEEE 754 double
    Double,

    /// IEEE 754-2008 decimal128, BID encoding
    Decimal128,

    /// Fixed-size byte array. When `string` is set the bytes hold NUL padded
    /// text.
    Bytes { size: usize, string: bool },

    /// Variable-length NUL terminated string stored behind an offset pointer
    String,

    /// Variable-length list stored behind an offset pointer
    List(Box<FieldType>),

    /// Signed 64-bit count of `TimeResolution` units since the UNIX epoch
    TimePoint(TimeResolution),
}

impl FieldType {
    /// Fixed byte-array field
    pub fn bytes(size: usize) -> FieldType {
        FieldType::Bytes {
            size,
            string: false,
        }
    }

    /// Fixed byte-array field holding text
    pub fn byte_string(size: usize) -> FieldType {
        FieldType::Bytes { size, string: true }
    }

    /// Size of the field in the fixed part of the message.
    pub fn size(&self) -> usize {
        match self {
            FieldType::Int8 | FieldType::UInt8 => 1,
            FieldType::Int16 | FieldType::UInt16 => 2,
            FieldType::Int32 | FieldType::UInt32 => 4,
            FieldType::Int64 | FieldType::UInt64 | FieldType::Double => 8,
            FieldType::Decimal128 => 16,
            FieldType::Bytes { size, .. } => *size,
            FieldType::String | FieldType::List(_) => 8,
            FieldType::TimePoint(_) => 8,
        }
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            FieldType::UInt8 | FieldType::UInt16 | FieldType::UInt32 | FieldType::UInt64
        )
    }
}

/// Unit of a time point field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeResolution {
    Day,
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl TimeResolution {
    /// Nanoseconds in one unit.
    pub const fn nanos(self) -> i64 {
        match self {
            TimeResolution::Day => 86_400 * 1_000_000_000,
            TimeResolution::Second => 1_000_000_000,
            TimeResolution::Millisecond => 1_000_000,
            TimeResolution::Microsecond => 1_000,
            TimeResolution::Nanosecond => 1,
        }
    }

    /// Converts a count of units since the UNIX epoch into a UTC datetime.
    pub fn to_datetime(self, count: i64) -> Result<NaiveDateTime> {
        let nanos = i128::from(count) * i128::from(self.nanos());
        let secs = nanos.div_euclid(1_000_000_000);
        let subsec = nanos.rem_euclid(1_000_000_000) as u32;

        i64::try_from(secs)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, subsec))
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| Error::marshal(format!("time point {count}{self} is out of range")))
    }

    /// Converts a UTC datetime into a count of units since the UNIX epoch,
    /// truncating anything finer than the unit.
    pub fn from_datetime(self, value: NaiveDateTime) -> Result<i64> {
        let value = value.and_utc();
        let nanos = i128::from(value.timestamp()) * 1_000_000_000
            + i128::from(value.timestamp_subsec_nanos());

        i64::try_from(nanos.div_euclid(i128::from(self.nanos())))
            .map_err(|_| Error::marshal(format!("datetime {value} does not fit in {self} units")))
    }

    /// Converts a count of days since the UNIX epoch into a date.
    pub fn to_date(days: i64) -> Result<NaiveDate> {
        days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
            .and_then(|days| i32::try_from(days).ok())
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .ok_or_else(|| Error::marshal(format!("day count {days} is out of range")))
    }

    /// Converts a date into a count of days since the UNIX epoch.
    pub fn from_date(date: NaiveDate) -> i64 {
        i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE
    }

    /// Number of fractional second digits the unit carries.
    pub const fn fraction_digits(self) -> u8 {
        match self {
            TimeResolution::Day | TimeResolution::Second => 0,
            TimeResolution::Millisecond => 3,
            TimeResolution::Microsecond => 6,
            TimeResolution::Nanosecond => 9,
        }
    }
}

impl fmt::Display for TimeResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimeResolution::Day => "d",
            TimeResolution::Second => "s",
            TimeResolution::Millisecond => "ms",
            TimeResolution::Microsecond => "us",
            TimeResolution::Nanosecond => "ns",
        })
    }
}

impl FromStr for TimeResolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "d" | "day" => Ok(TimeResolution::Day),
            "s" | "second" => Ok(TimeResolution::Second),
            "ms" | "millisecond" => Ok(TimeResolution::Millisecond),
            "us" | "microsecond" => Ok(TimeResolution::Microsecond),
            "ns" | "nanosecond" => Ok(TimeResolution::Nanosecond),
            _ => Err(Error::invalid_schema(format!(
                "unknown time resolution `{s}`"
            ))),
        }
    }
}
