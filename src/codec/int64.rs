//! JSON representation of 64-bit integer fields.
//!
//! Values whose magnitude is at most 2^53 are written as JSON numbers; larger
//! values are written as decimal strings so JavaScript clients keep every digit.
//! Both forms are accepted when reading.
//!
//! Use with `#[serde(with = "rpc_http_bridge::codec::int64")]` on `i64`/`u64`
//! fields, or the `repeated`/`optional` submodules for `Vec`/`Option` fields.

use serde::de::{self, Deserializer, Visitor};
use serde::Serializer;
use std::fmt;

/// Largest magnitude that survives a round trip through an IEEE-754 double.
pub const MAX_SAFE_INTEGER: u64 = 1 << 53;

/// An integer type carried by this module.
pub trait Int64: Copy + fmt::Display + Sized {
    fn is_safe(self) -> bool;
    fn serialize_number<S: Serializer>(self, serializer: S) -> Result<S::Ok, S::Error>;
    fn from_i64(v: i64) -> Option<Self>;
    fn from_u64(v: u64) -> Option<Self>;
    fn parse_str(s: &str) -> Option<Self>;
}

impl Int64 for i64 {
    fn is_safe(self) -> bool {
        self.unsigned_abs() <= MAX_SAFE_INTEGER
    }

    fn serialize_number<S: Serializer>(self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self)
    }

    fn from_i64(v: i64) -> Option<Self> {
        Some(v)
    }

    fn from_u64(v: u64) -> Option<Self> {
        i64::try_from(v).ok()
    }

    fn parse_str(s: &str) -> Option<Self> {
        s.trim().parse().ok()
    }
}

impl Int64 for u64 {
    fn is_safe(self) -> bool {
        self <= MAX_SAFE_INTEGER
    }

    fn serialize_number<S: Serializer>(self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self)
    }

    fn from_i64(v: i64) -> Option<Self> {
        u64::try_from(v).ok()
    }

    fn from_u64(v: u64) -> Option<Self> {
        Some(v)
    }

    fn parse_str(s: &str) -> Option<Self> {
        s.trim().parse().ok()
    }
}

pub fn serialize<T: Int64, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_safe() {
        value.serialize_number(serializer)
    } else {
        serializer.collect_str(value)
    }
}

pub fn deserialize<'de, T: Int64, D: Deserializer<'de>>(deserializer: D) -> Result<T, D::Error> {
    deserializer.deserialize_any(Int64Visitor(std::marker::PhantomData))
}

struct Int64Visitor<T>(std::marker::PhantomData<T>);

impl<'de, T: Int64> Visitor<'de> for Int64Visitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a 64-bit integer as a JSON number or decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
        T::from_i64(v).ok_or_else(|| E::custom(format!("integer {v} out of range")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
        T::from_u64(v).ok_or_else(|| E::custom(format!("integer {v} out of range")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<T, E> {
        if v.fract() != 0.0 || v.abs() > MAX_SAFE_INTEGER as f64 {
            return Err(E::custom(format!("{v} is not an exact integer")));
        }
        if v < 0.0 {
            self.visit_i64(v as i64)
        } else {
            self.visit_u64(v as u64)
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        T::parse_str(v).ok_or_else(|| E::custom(format!("invalid integer string {v:?}")))
    }

    fn visit_unit<E: de::Error>(self) -> Result<T, E> {
        T::from_i64(0).ok_or_else(|| E::custom("null integer"))
    }
}

/// `Vec<i64>` / `Vec<u64>` fields.
pub mod repeated {
    use super::Int64;
    use serde::de::{Deserializer, SeqAccess, Visitor};
    use serde::ser::{SerializeSeq, Serializer};
    use std::fmt;
    use std::marker::PhantomData;

    struct Item<T>(T);

    impl<T: Int64> serde::Serialize for Item<T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            super::serialize(&self.0, serializer)
        }
    }

    impl<'de, T: Int64> serde::Deserialize<'de> for Item<T> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            super::deserialize(deserializer).map(Item)
        }
    }

    pub fn serialize<T: Int64, S: Serializer>(values: &[T], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&Item(*value))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, T: Int64, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<T>, D::Error> {
        struct SeqVisitor<T>(PhantomData<T>);

        impl<'de, T: Int64> Visitor<'de> for SeqVisitor<T> {
            type Value = Vec<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of 64-bit integers")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<T>, A::Error> {
                let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(Item(value)) = seq.next_element::<Item<T>>()? {
                    out.push(value);
                }
                Ok(out)
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Vec<T>, E> {
                Ok(Vec::new())
            }
        }

        deserializer.deserialize_any(SeqVisitor(PhantomData))
    }
}

/// `Option<i64>` / `Option<u64>` fields.
pub mod optional {
    use super::Int64;
    use serde::de::Deserializer;
    use serde::ser::Serializer;
    use serde::Deserialize;

    pub fn serialize<T: Int64, S: Serializer>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => super::serialize(v, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T: Int64, D: Deserializer<'de>>(deserializer: D) -> Result<Option<T>, D::Error> {
        #[derive(Deserialize)]
        struct Wrapper<T: Int64>(#[serde(deserialize_with = "super::deserialize")] T);

        Option::<Wrapper<T>>::deserialize(deserializer).map(|w| w.map(|Wrapper(v)| v))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Sample {
        #[serde(with = "super")]
        signed: i64,
        #[serde(with = "super")]
        unsigned: u64,
        #[serde(with = "super::repeated")]
        list: Vec<i64>,
        #[serde(with = "super::optional")]
        maybe: Option<u64>,
    }

    #[test]
    fn test_safe_values_stay_numbers() {
        let sample = Sample {
            signed: -(1 << 53),
            unsigned: 1 << 53,
            list: vec![1, -2],
            maybe: Some(3),
        };
        let value = serde_json::to_value(&sample).unwrap();
        assert_eq!(
            value,
            json!({"signed": -9007199254740992i64, "unsigned": 9007199254740992u64, "list": [1, -2], "maybe": 3})
        );
        assert_eq!(serde_json::from_value::<Sample>(value).unwrap(), sample);
    }

    #[test]
    fn test_large_values_become_strings() {
        let sample = Sample {
            signed: i64::MIN,
            unsigned: (1 << 53) + 1,
            list: vec![i64::MAX],
            maybe: None,
        };
        let value = serde_json::to_value(&sample).unwrap();
        assert_eq!(value["signed"], json!("-9223372036854775808"));
        assert_eq!(value["unsigned"], json!("9007199254740993"));
        assert_eq!(value["list"], json!(["9223372036854775807"]));
        assert_eq!(value["maybe"], json!(null));
        assert_eq!(serde_json::from_value::<Sample>(value).unwrap(), sample);
    }

    #[test]
    fn test_reads_both_forms() {
        let sample: Sample =
            serde_json::from_str(r#"{"signed":"42","unsigned":7,"maybe":"9"}"#).unwrap();
        assert_eq!(sample.signed, 42);
        assert_eq!(sample.unsigned, 7);
        assert_eq!(sample.maybe, Some(9));

        assert!(serde_json::from_str::<Sample>(r#"{"unsigned":-1}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"signed":"abc"}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"signed":1.5}"#).is_err());
    }
}
