//! CQL type system and value representations

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// CQL data types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CqlType {
    /// Custom type, rendered as its quoted class name
    Custom(String),
    Ascii,
    Bigint,
    Blob,
    Boolean,
    Counter,
    Decimal,
    Double,
    Float,
    Int,
    Text,
    Timestamp,
    Uuid,
    Varchar,
    Varint,
    Timeuuid,
    Inet,
    Date,
    Time,
    Smallint,
    Tinyint,
    Duration,
    List(Box<CqlType>),
    Map(Box<CqlType>, Box<CqlType>),
    Set(Box<CqlType>),
    Tuple(Vec<CqlType>),
    Frozen(Box<CqlType>),
}

impl CqlType {
    /// `list<element>`
    pub fn list(element: CqlType) -> Self {
        CqlType::List(Box::new(element))
    }

    /// `set<element>`
    pub fn set(element: CqlType) -> Self {
        CqlType::Set(Box::new(element))
    }

    /// `map<key, value>`
    pub fn map(key: CqlType, value: CqlType) -> Self {
        CqlType::Map(Box::new(key), Box::new(value))
    }

    /// `frozen<inner>`
    pub fn frozen(inner: CqlType) -> Self {
        CqlType::Frozen(Box::new(inner))
    }

    /// Whether this is a (non-frozen) collection type
    pub fn is_collection(&self) -> bool {
        matches!(self, CqlType::List(_) | CqlType::Map(_, _) | CqlType::Set(_))
    }
}

impl fmt::Display for CqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CqlType::Custom(class) => write!(f, "'{}'", class),
            CqlType::Ascii => f.write_str("ascii"),
            CqlType::Bigint => f.write_str("bigint"),
            CqlType::Blob => f.write_str("blob"),
            CqlType::Boolean => f.write_str("boolean"),
            CqlType::Counter => f.write_str("counter"),
            CqlType::Decimal => f.write_str("decimal"),
            CqlType::Double => f.write_str("double"),
            CqlType::Float => f.write_str("float"),
            CqlType::Int => f.write_str("int"),
            CqlType::Text => f.write_str("text"),
            CqlType::Timestamp => f.write_str("timestamp"),
            CqlType::Uuid => f.write_str("uuid"),
            CqlType::Varchar => f.write_str("varchar"),
            CqlType::Varint => f.write_str("varint"),
            CqlType::Timeuuid => f.write_str("timeuuid"),
            CqlType::Inet => f.write_str("inet"),
            CqlType::Date => f.write_str("date"),
            CqlType::Time => f.write_str("time"),
            CqlType::Smallint => f.write_str("smallint"),
            CqlType::Tinyint => f.write_str("tinyint"),
            CqlType::Duration => f.write_str("duration"),
            CqlType::List(element) => write!(f, "list<{}>", element),
            CqlType::Set(element) => write!(f, "set<{}>", element),
            CqlType::Map(key, value) => write!(f, "map<{}, {}>", key, value),
            CqlType::Frozen(inner) => write!(f, "frozen<{}>", inner),
            CqlType::Tuple(elements) => {
                f.write_str("tuple<")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                f.write_str(">")
            }
        }
    }
}

/// CQL value representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CqlValue {
    Null,
    Boolean(bool),
    Bigint(i64),
    Int(i32),
    Smallint(i16),
    Tinyint(i8),
    Text(String),
    Double(f64),
    Float(f32),
    Timestamp(i64), // milliseconds since epoch
    Uuid(Uuid),
    /// Version 1 uuid, ordered by its embedded timestamp
    Timeuuid(Uuid),
    Blob(Vec<u8>),
}

impl CqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CqlValue::Null)
    }

    /// Name of the variant, used in range error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CqlValue::Null => "null",
            CqlValue::Boolean(_) => "boolean",
            CqlValue::Bigint(_) => "bigint",
            CqlValue::Int(_) => "int",
            CqlValue::Smallint(_) => "smallint",
            CqlValue::Tinyint(_) => "tinyint",
            CqlValue::Text(_) => "text",
            CqlValue::Double(_) => "double",
            CqlValue::Float(_) => "float",
            CqlValue::Timestamp(_) => "timestamp",
            CqlValue::Uuid(_) => "uuid",
            CqlValue::Timeuuid(_) => "timeuuid",
            CqlValue::Blob(_) => "blob",
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            CqlValue::Bigint(v) => Some(*v),
            CqlValue::Int(v) => Some(i64::from(*v)),
            CqlValue::Smallint(v) => Some(i64::from(*v)),
            CqlValue::Tinyint(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            CqlValue::Double(v) => Some(*v),
            CqlValue::Float(v) => Some(f64::from(*v)),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Natural CQL ordering between two values.
    ///
    /// Integer widths compare with each other, floating point values compare
    /// with any number. Uuids follow the server order: version first, then
    /// the timestamp for version 1, then the raw bytes. `None` when the values are not comparable (different
    /// families, nulls, NaN).
    pub fn compare(&self, other: &CqlValue) -> Option<Ordering> {
        match (self, other) {
            (CqlValue::Null, _) | (_, CqlValue::Null) => None,
            (CqlValue::Boolean(a), CqlValue::Boolean(b)) => Some(a.cmp(b)),
            (CqlValue::Text(a), CqlValue::Text(b)) => Some(a.cmp(b)),
            (CqlValue::Timestamp(a), CqlValue::Timestamp(b)) => Some(a.cmp(b)),
            (CqlValue::Uuid(a), CqlValue::Uuid(b)) => Some(compare_uuids(a, b)),
            (CqlValue::Timeuuid(a), CqlValue::Timeuuid(b)) => Some(compare_timeuuids(a, b)),
            (CqlValue::Blob(a), CqlValue::Blob(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_i64(), b.as_i64()) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => match (a.as_f64(), b.as_f64()) {
                    (Some(x), Some(y)) => x.partial_cmp(&y),
                    _ => None,
                },
            },
        }
    }
}

/// 60-bit timestamp of a version 1 uuid; `time_low` is stored first so the
/// raw bytes are not in time order
fn uuid_timestamp(uuid: &Uuid) -> u64 {
    let b = uuid.as_bytes();
    let time_low = u64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]]));
    let time_mid = u64::from(u16::from_be_bytes([b[4], b[5]]));
    let time_hi = u64::from(u16::from_be_bytes([b[6], b[7]]) & 0x0FFF);
    (time_hi << 48) | (time_mid << 32) | time_low
}

fn compare_timeuuids(a: &Uuid, b: &Uuid) -> Ordering {
    uuid_timestamp(a)
        .cmp(&uuid_timestamp(b))
        .then_with(|| a.as_bytes().cmp(b.as_bytes()))
}

fn compare_uuids(a: &Uuid, b: &Uuid) -> Ordering {
    a.get_version_num()
        .cmp(&b.get_version_num())
        .then_with(|| {
            if a.get_version_num() == 1 {
                compare_timeuuids(a, b)
            } else {
                a.as_bytes().cmp(b.as_bytes())
            }
        })
}

impl From<bool> for CqlValue {
    fn from(v: bool) -> Self {
        CqlValue::Boolean(v)
    }
}

impl From<i64> for CqlValue {
    fn from(v: i64) -> Self {
        CqlValue::Bigint(v)
    }
}

impl From<i32> for CqlValue {
    fn from(v: i32) -> Self {
        CqlValue::Int(v)
    }
}

impl From<f64> for CqlValue {
    fn from(v: f64) -> Self {
        CqlValue::Double(v)
    }
}

impl From<&str> for CqlValue {
    fn from(v: &str) -> Self {
        CqlValue::Text(v.to_string())
    }
}

impl From<String> for CqlValue {
    fn from(v: String) -> Self {
        CqlValue::Text(v)
    }
}

impl From<Uuid> for CqlValue {
    fn from(v: Uuid) -> Self {
        CqlValue::Uuid(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_type_names() {
        assert_eq!(CqlType::Ascii.to_string(), "ascii");
        assert_eq!(CqlType::Text.to_string(), "text");
        assert_eq!(CqlType::Timeuuid.to_string(), "timeuuid");
        assert_eq!(CqlType::Custom("com.example.Foo".into()).to_string(), "'com.example.Foo'");
    }

    #[test]
    fn test_collection_type_names() {
        assert_eq!(CqlType::list(CqlType::Text).to_string(), "list<text>");
        assert_eq!(CqlType::set(CqlType::Uuid).to_string(), "set<uuid>");
        assert_eq!(
            CqlType::map(CqlType::Int, CqlType::Text).to_string(),
            "map<int, text>"
        );
        assert_eq!(
            CqlType::frozen(CqlType::Tuple(vec![CqlType::Int, CqlType::Ascii])).to_string(),
            "frozen<tuple<int, ascii>>"
        );
        assert!(CqlType::list(CqlType::Int).is_collection());
        assert!(!CqlType::frozen(CqlType::list(CqlType::Int)).is_collection());
    }

    #[test]
    fn test_compare_mixed_integer_widths() {
        assert_eq!(
            CqlValue::Int(3).compare(&CqlValue::Bigint(10)),
            Some(Ordering::Less)
        );
        assert_eq!(
            CqlValue::Double(2.5).compare(&CqlValue::Int(2)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_compare_timeuuid_by_timestamp() {
        // Timestamp 0xFFFFFFFF, bytes sort last
        let earlier = Uuid::parse_str("ffffffff-0000-1000-8000-000000000000").unwrap();
        // Timestamp 0x1_0000_0000, bytes sort first
        let later = Uuid::parse_str("00000000-0001-1000-8000-000000000000").unwrap();
        assert!(earlier.as_bytes() > later.as_bytes());

        assert_eq!(
            CqlValue::Timeuuid(earlier).compare(&CqlValue::Timeuuid(later)),
            Some(Ordering::Less)
        );
        assert_eq!(
            CqlValue::Uuid(earlier).compare(&CqlValue::Uuid(later)),
            Some(Ordering::Less)
        );
        assert_eq!(
            CqlValue::Timeuuid(later).compare(&CqlValue::Timeuuid(later)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_compare_uuid_version_first() {
        let time_based = Uuid::parse_str("00000000-0000-1000-8000-000000000000").unwrap();
        let random = Uuid::parse_str("00000000-0000-4000-8000-000000000000").unwrap();
        let later_random = Uuid::parse_str("ffffffff-0000-4000-8000-000000000000").unwrap();
        assert_eq!(
            CqlValue::Uuid(random).compare(&CqlValue::Uuid(time_based)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            CqlValue::Uuid(random).compare(&CqlValue::Uuid(later_random)),
            Some(Ordering::Less)
        );
        assert_eq!(
            CqlValue::Uuid(random).compare(&CqlValue::Timeuuid(random)),
            None
        );
    }

    #[test]
    fn test_compare_incomparable() {
        assert_eq!(CqlValue::Text("a".into()).compare(&CqlValue::Int(1)), None);
        assert_eq!(CqlValue::Null.compare(&CqlValue::Null), None);
        assert_eq!(
            CqlValue::Double(f64::NAN).compare(&CqlValue::Double(1.0)),
            None
        );
    }
}
