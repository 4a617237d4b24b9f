//! Serde adapter storing a uri-keyed [`IndexMap`] as a plain JSON array.
//! 以 JSON 陣列保存以 uri 為鍵的 [`IndexMap`]。
//!
//! Arrays that repeat a key collapse on load; the last entry wins but keeps
//! the position of the first occurrence.

use indexmap::IndexMap;
use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Values that carry their own map key.
pub trait Keyed {
    fn key(&self) -> &str;
}

pub fn serialize<S, T>(map: &IndexMap<String, T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    let mut seq = serializer.serialize_seq(Some(map.len()))?;
    for value in map.values() {
        seq.serialize_element(value)?;
    }
    seq.end()
}

pub fn deserialize<'de, D, T>(deserializer: D) -> Result<IndexMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Keyed,
{
    struct KeyedVisitor<T>(PhantomData<T>);

    impl<'de, T> Visitor<'de> for KeyedVisitor<T>
    where
        T: Deserialize<'de> + Keyed,
    {
        type Value = IndexMap<String, T>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an array of uri-keyed entries")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut map = IndexMap::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(value) = seq.next_element::<T>()? {
                map.insert(value.key().to_string(), value);
            }
            Ok(map)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(IndexMap::new())
        }
    }

    deserializer.deserialize_any(KeyedVisitor(PhantomData))
}
