//! Type coercion table: token string → typed [`Value`].
//!
//! The menu of target types is closed. Anything outside [`ParamType`] cannot be
//! bound from the command line.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
};
use regex::Regex;
use rust_decimal::Decimal;
use tracing::trace;
use uuid::Uuid;

use crate::domain::error::{DomainError, DomainResult};

const BOOL_POSITIVE: [&str; 4] = ["yes", "on", "enabled", "true"];
const BOOL_NEGATIVE: [&str; 4] = ["no", "off", "disabled", "false"];

/// `[-]d` or `[-][d.]hh:mm[:ss[.fffffff]]`, ASCII digits only
static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<sign>-)?(?:(?P<days>[0-9]+)|(?:(?P<d>[0-9]+)\.)?(?P<h>[0-9]{1,2}):(?P<m>[0-9]{1,2})(?::(?P<s>[0-9]{1,2})(?:\.(?P<f>[0-9]{1,7}))?)?)$",
    )
    .expect("duration pattern is valid")
});

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f %:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M %:z",
    "%Y-%m-%dT%H:%M%:z",
];

/// Target types a parameter may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    String,
    Bool,
    Char,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Decimal,
    Uuid,
    /// Absolute timestamp carrying a UTC offset
    DateTimeOffset,
    /// Timestamp without offset
    DateTime,
    Duration,
    /// A reference to one of the other types, resolved by name
    Type,
}

impl ParamType {
    pub const ALL: [ParamType; 19] = [
        ParamType::String,
        ParamType::Bool,
        ParamType::Char,
        ParamType::I8,
        ParamType::U8,
        ParamType::I16,
        ParamType::U16,
        ParamType::I32,
        ParamType::U32,
        ParamType::I64,
        ParamType::U64,
        ParamType::F32,
        ParamType::F64,
        ParamType::Decimal,
        ParamType::Uuid,
        ParamType::DateTimeOffset,
        ParamType::DateTime,
        ParamType::Duration,
        ParamType::Type,
    ];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Bool => "bool",
            ParamType::Char => "char",
            ParamType::I8 => "i8",
            ParamType::U8 => "u8",
            ParamType::I16 => "i16",
            ParamType::U16 => "u16",
            ParamType::I32 => "i32",
            ParamType::U32 => "u32",
            ParamType::I64 => "i64",
            ParamType::U64 => "u64",
            ParamType::F32 => "f32",
            ParamType::F64 => "f64",
            ParamType::Decimal => "decimal",
            ParamType::Uuid => "uuid",
            ParamType::DateTimeOffset => "datetimeoffset",
            ParamType::DateTime => "datetime",
            ParamType::Duration => "duration",
            ParamType::Type => "type",
        }
    }

    /// Resolve a type by name, case-insensitively.
    ///
    /// Accepts the canonical names plus the common aliases (`int`, `long`,
    /// `byte`, `double`, `guid`, `timespan`, ...), optionally qualified
    /// with a `System.` namespace (`System.Int32`).
    pub fn from_name(name: &str) -> Option<Self> {
        let lowered = name.trim().to_lowercase();
        let unqualified = lowered.strip_prefix("system.").unwrap_or(&lowered);
        let found = match unqualified {
            "string" | "str" => ParamType::String,
            "bool" | "boolean" => ParamType::Bool,
            "char" => ParamType::Char,
            "i8" | "sbyte" => ParamType::I8,
            "u8" | "byte" => ParamType::U8,
            "i16" | "short" | "int16" => ParamType::I16,
            "u16" | "ushort" | "uint16" => ParamType::U16,
            "i32" | "int" | "int32" => ParamType::I32,
            "u32" | "uint" | "uint32" => ParamType::U32,
            "i64" | "long" | "int64" => ParamType::I64,
            "u64" | "ulong" | "uint64" => ParamType::U64,
            "f32" | "float" | "single" => ParamType::F32,
            "f64" | "double" => ParamType::F64,
            "decimal" => ParamType::Decimal,
            "uuid" | "guid" => ParamType::Uuid,
            "datetimeoffset" => ParamType::DateTimeOffset,
            "datetime" => ParamType::DateTime,
            "duration" | "timespan" => ParamType::Duration,
            "type" => ParamType::Type,
            _ => return None,
        };
        Some(found)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed argument or return value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Bool(bool),
    Char(char),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Uuid(Uuid),
    DateTimeOffset(DateTime<FixedOffset>),
    DateTime(NaiveDateTime),
    Duration(TimeDelta),
    Type(ParamType),
}

impl Value {
    /// The table entry this value belongs to.
    pub fn param_type(&self) -> ParamType {
        match self {
            Value::String(_) => ParamType::String,
            Value::Bool(_) => ParamType::Bool,
            Value::Char(_) => ParamType::Char,
            Value::I8(_) => ParamType::I8,
            Value::U8(_) => ParamType::U8,
            Value::I16(_) => ParamType::I16,
            Value::U16(_) => ParamType::U16,
            Value::I32(_) => ParamType::I32,
            Value::U32(_) => ParamType::U32,
            Value::I64(_) => ParamType::I64,
            Value::U64(_) => ParamType::U64,
            Value::F32(_) => ParamType::F32,
            Value::F64(_) => ParamType::F64,
            Value::Decimal(_) => ParamType::Decimal,
            Value::Uuid(_) => ParamType::Uuid,
            Value::DateTimeOffset(_) => ParamType::DateTimeOffset,
            Value::DateTime(_) => ParamType::DateTime,
            Value::Duration(_) => ParamType::Duration,
            Value::Type(_) => ParamType::Type,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(v) => f.write_str(v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::I8(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Uuid(v) => write!(f, "{}", v),
            Value::DateTimeOffset(v) => write!(f, "{}", v.to_rfc3339()),
            Value::DateTime(v) => write!(f, "{}", v),
            Value::Duration(v) => write!(f, "{}", v),
            Value::Type(v) => write!(f, "{}", v),
        }
    }
}

/// Typed extraction from a bound [`Value`].
pub trait FromValue: Sized {
    const TYPE: ParamType;

    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! value_conversions {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }

            impl FromValue for $ty {
                const TYPE: ParamType = ParamType::$variant;

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

value_conversions! {
    String => String,
    Bool => bool,
    Char => char,
    I8 => i8,
    U8 => u8,
    I16 => i16,
    U16 => u16,
    I32 => i32,
    U32 => u32,
    I64 => i64,
    U64 => u64,
    F32 => f32,
    F64 => f64,
    Decimal => Decimal,
    Uuid => Uuid,
    DateTimeOffset => DateTime<FixedOffset>,
    DateTime => NaiveDateTime,
    Duration => TimeDelta,
    Type => ParamType,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// Convert `token` into a value of type `target`.
pub fn coerce(target: ParamType, token: &str) -> DomainResult<Value> {
    let value = match target {
        ParamType::String => Some(Value::String(token.to_string())),
        ParamType::Bool => parse_bool(token).map(Value::Bool),
        ParamType::Char => parse_char(token).map(Value::Char),
        ParamType::I8 => parse_number(token).map(Value::I8),
        ParamType::U8 => parse_number(token).map(Value::U8),
        ParamType::I16 => parse_number(token).map(Value::I16),
        ParamType::U16 => parse_number(token).map(Value::U16),
        ParamType::I32 => parse_number(token).map(Value::I32),
        ParamType::U32 => parse_number(token).map(Value::U32),
        ParamType::I64 => parse_number(token).map(Value::I64),
        ParamType::U64 => parse_number(token).map(Value::U64),
        ParamType::F32 => parse_number(token).map(Value::F32),
        ParamType::F64 => parse_number(token).map(Value::F64),
        ParamType::Decimal => parse_decimal(token).map(Value::Decimal),
        ParamType::Uuid => Uuid::parse_str(token.trim()).ok().map(Value::Uuid),
        ParamType::DateTimeOffset => parse_datetime_offset(token).map(Value::DateTimeOffset),
        ParamType::DateTime => parse_datetime(token).map(Value::DateTime),
        ParamType::Duration => parse_duration(token).map(Value::Duration),
        ParamType::Type => ParamType::from_name(token).map(Value::Type),
    };

    trace!("coerce {:?} as {}: {:?}", token, target, value);
    value.ok_or_else(|| DomainError::Coercion {
        target,
        token: token.to_string(),
    })
}

/// Case-insensitive membership in the positive or negative word set.
pub fn parse_bool(token: &str) -> Option<bool> {
    if BOOL_POSITIVE.iter().any(|w| w.eq_ignore_ascii_case(token)) {
        Some(true)
    } else if BOOL_NEGATIVE.iter().any(|w| w.eq_ignore_ascii_case(token)) {
        Some(false)
    } else {
        None
    }
}

fn parse_char(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn parse_number<T: FromStr>(token: &str) -> Option<T> {
    token.trim().parse().ok()
}

fn parse_decimal(token: &str) -> Option<Decimal> {
    let trimmed = token.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Naive timestamp. Offset-bearing input is converted to local time.
pub fn parse_datetime(token: &str) -> Option<NaiveDateTime> {
    let trimmed = token.trim();
    parse_naive(trimmed).or_else(|| {
        parse_offset(trimmed).map(|dt| dt.with_timezone(&Local).naive_local())
    })
}

/// Timestamp with offset. Input without an offset is read as local time.
pub fn parse_datetime_offset(token: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = token.trim();
    parse_offset(trimmed).or_else(|| {
        let naive = parse_naive(trimmed)?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.fixed_offset())
    })
}

fn parse_offset(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok().or_else(|| {
        OFFSET_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    })
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Parse `[-]d`, `[-][d.]hh:mm[:ss[.fffffff]]` or `[-]d:hh:mm:ss[.fffffff]`.
pub fn parse_duration(token: &str) -> Option<TimeDelta> {
    let token = token.trim();
    // `d:hh:mm:ss` is the same as `d.hh:mm:ss`
    let token: Cow<'_, str> = if token.matches(':').count() == 3 {
        Cow::Owned(token.replacen(':', ".", 1))
    } else {
        Cow::Borrowed(token)
    };
    let caps = DURATION_PATTERN.captures(&token)?;
    // absent group -> default, present but unparseable -> None
    let field = |name: &str, default: Option<i64>| -> Option<i64> {
        match caps.name(name) {
            Some(m) => m.as_str().parse().ok(),
            None => default,
        }
    };

    let delta = if let Some(days) = caps.name("days") {
        TimeDelta::try_days(days.as_str().parse().ok()?)?
    } else {
        let days = field("d", Some(0))?;
        let hours = field("h", None)?;
        let minutes = field("m", None)?;
        let seconds = field("s", Some(0))?;
        if hours > 23 || minutes > 59 || seconds > 59 {
            return None;
        }
        // fraction is in 100ns ticks, at most seven digits
        let nanos = match caps.name("f") {
            Some(f) => format!("{:0<9}", f.as_str()).parse::<i64>().ok()?,
            None => 0,
        };
        TimeDelta::try_days(days)?
            .checked_add(&TimeDelta::try_hours(hours)?)?
            .checked_add(&TimeDelta::try_minutes(minutes)?)?
            .checked_add(&TimeDelta::try_seconds(seconds)?)?
            .checked_add(&TimeDelta::nanoseconds(nanos))?
    };

    if caps.name("sign").is_some() {
        Some(-delta)
    } else {
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("yes", true)]
    #[case("On", true)]
    #[case("ENABLED", true)]
    #[case("true", true)]
    #[case("no", false)]
    #[case("OFF", false)]
    #[case("Disabled", false)]
    #[case("false", false)]
    fn given_bool_word_when_coercing_then_maps(#[case] token: &str, #[case] expected: bool) {
        assert_eq!(coerce(ParamType::Bool, token), Ok(Value::Bool(expected)));
    }

    #[rstest]
    #[case("1")]
    #[case("0")]
    #[case("y")]
    #[case("")]
    #[case(" yes")]
    fn given_other_word_when_coercing_bool_then_fails(#[case] token: &str) {
        assert!(coerce(ParamType::Bool, token).is_err());
    }

    #[test]
    fn given_single_char_when_coercing_then_succeeds() {
        assert_eq!(coerce(ParamType::Char, "ß"), Ok(Value::Char('ß')));
        assert!(coerce(ParamType::Char, "ab").is_err());
        assert!(coerce(ParamType::Char, "").is_err());
    }

    #[rstest]
    #[case(ParamType::U8, "255", Value::U8(255))]
    #[case(ParamType::I8, "-128", Value::I8(-128))]
    #[case(ParamType::I16, " +42 ", Value::I16(42))]
    #[case(ParamType::U64, "18446744073709551615", Value::U64(u64::MAX))]
    #[case(ParamType::F64, "1.5e3", Value::F64(1500.0))]
    fn given_numeric_token_when_coercing_then_parses(
        #[case] target: ParamType,
        #[case] token: &str,
        #[case] expected: Value,
    ) {
        assert_eq!(coerce(target, token), Ok(expected));
    }

    #[rstest]
    #[case(ParamType::U8, "256")]
    #[case(ParamType::U32, "-1")]
    #[case(ParamType::I32, "12abc")]
    #[case(ParamType::F32, "one")]
    fn given_bad_numeric_token_when_coercing_then_fails(
        #[case] target: ParamType,
        #[case] token: &str,
    ) {
        assert_eq!(
            coerce(target, token),
            Err(DomainError::Coercion {
                target,
                token: token.to_string()
            })
        );
    }

    #[test]
    fn given_decimal_token_when_coercing_then_keeps_precision() {
        let value = coerce(ParamType::Decimal, "0.1000000000000000000000000001").unwrap();
        assert_eq!(value.to_string(), "0.1000000000000000000000000001");
        assert!(coerce(ParamType::Decimal, "1e3").is_ok());
    }

    #[test]
    fn given_uuid_token_when_coercing_then_parses() {
        let value = coerce(ParamType::Uuid, "67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(value.param_type(), ParamType::Uuid);
        assert!(coerce(ParamType::Uuid, "not-a-uuid").is_err());
    }

    #[test]
    fn given_timestamp_with_offset_when_coercing_then_keeps_offset() {
        let Value::DateTimeOffset(dt) =
            coerce(ParamType::DateTimeOffset, "2024-03-01T10:30:00+02:00").unwrap()
        else {
            panic!("expected a timestamp with offset");
        };
        assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(dt.to_rfc3339(), "2024-03-01T10:30:00+02:00");
    }

    #[test]
    fn given_date_only_when_coercing_datetime_then_midnight() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            coerce(ParamType::DateTime, "2024-03-01"),
            Ok(Value::DateTime(expected))
        );
    }

    #[rstest]
    #[case("3", TimeDelta::days(3))]
    #[case("01:30", TimeDelta::minutes(90))]
    #[case("1.02:03:04", TimeDelta::seconds(93_784))]
    #[case("-00:00:05", TimeDelta::seconds(-5))]
    #[case("00:00:01.5", TimeDelta::milliseconds(1500))]
    #[case("1:02:03", TimeDelta::seconds(3_723))]
    #[case("1:02:03:04", TimeDelta::seconds(93_784))]
    #[case("-1:00:00:00.25", -TimeDelta::milliseconds(86_400_250))]
    fn given_duration_token_when_parsing_then_matches(
        #[case] token: &str,
        #[case] expected: TimeDelta,
    ) {
        assert_eq!(parse_duration(token), Some(expected));
    }

    #[rstest]
    #[case("24:00")]
    #[case("10:60")]
    #[case("1h")]
    #[case("")]
    #[case("\u{0663}.01:00")]
    #[case("01:00:\u{0665}")]
    #[case("\u{0661}:00")]
    #[case("\u{0664}")]
    #[case("1:02:03:04:05")]
    fn given_bad_duration_when_parsing_then_none(#[case] token: &str) {
        assert_eq!(parse_duration(token), None);
    }

    #[test]
    fn given_type_name_when_coercing_then_resolves() {
        assert_eq!(
            coerce(ParamType::Type, "Int"),
            Ok(Value::Type(ParamType::I32))
        );
        assert_eq!(
            coerce(ParamType::Type, "timespan"),
            Ok(Value::Type(ParamType::Duration))
        );
        assert!(coerce(ParamType::Type, "widget").is_err());
    }

    #[rstest]
    #[case("System.Int32", ParamType::I32)]
    #[case("system.guid", ParamType::Uuid)]
    #[case("System.TimeSpan", ParamType::Duration)]
    #[case("System.DateTimeOffset", ParamType::DateTimeOffset)]
    fn given_qualified_type_name_when_resolving_then_strips_namespace(
        #[case] name: &str,
        #[case] expected: ParamType,
    ) {
        assert_eq!(ParamType::from_name(name), Some(expected));
    }

    #[test]
    fn given_other_namespace_when_resolving_then_rejected() {
        assert_eq!(ParamType::from_name("Acme.Int32"), None);
        assert_eq!(ParamType::from_name("System."), None);
    }

    #[test]
    fn given_every_type_when_round_tripping_name_then_resolves_itself() {
        for ty in ParamType::ALL {
            assert_eq!(ParamType::from_name(ty.name()), Some(ty));
        }
    }
}
