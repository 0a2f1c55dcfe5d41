//! `tf.train.Example` protobuf messages.
//!
//! Declared by hand with `prost` derives, field-for-field compatible with
//! TensorFlow's `example.proto` and `feature.proto`. The feature map is a
//! `BTreeMap` so entries are encoded in key order and identical inputs give
//! identical bytes.

use std::collections::BTreeMap;

#[derive(Clone, PartialEq, prost::Message)]
pub struct BytesList {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub value: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct FloatList {
    #[prost(float, repeated, tag = "1")]
    pub value: Vec<f32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Int64List {
    #[prost(int64, repeated, tag = "1")]
    pub value: Vec<i64>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Feature {
    #[prost(oneof = "feature::Kind", tags = "1, 2, 3")]
    pub kind: Option<feature::Kind>,
}

pub mod feature {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        #[prost(message, tag = "1")]
        BytesList(super::BytesList),
        #[prost(message, tag = "2")]
        FloatList(super::FloatList),
        #[prost(message, tag = "3")]
        Int64List(super::Int64List),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Features {
    #[prost(btree_map = "string, message", tag = "1")]
    pub feature: BTreeMap<String, Feature>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Example {
    #[prost(message, optional, tag = "1")]
    pub features: Option<Features>,
}

// ============================================================================
// Feature builders
// ============================================================================

pub fn int64_feature(value: i64) -> Feature {
    int64_list_feature(vec![value])
}

pub fn int64_list_feature(values: Vec<i64>) -> Feature {
    Feature {
        kind: Some(feature::Kind::Int64List(Int64List { value: values })),
    }
}

pub fn bytes_feature(value: impl Into<Vec<u8>>) -> Feature {
    bytes_list_feature(vec![value.into()])
}

pub fn bytes_list_feature(values: Vec<Vec<u8>>) -> Feature {
    Feature {
        kind: Some(feature::Kind::BytesList(BytesList { value: values })),
    }
}

pub fn float_list_feature(values: Vec<f32>) -> Feature {
    Feature {
        kind: Some(feature::Kind::FloatList(FloatList { value: values })),
    }
}

// ============================================================================
// Typed access
// ============================================================================

impl Example {
    /// Builds an example from `(key, feature)` pairs.
    pub fn from_features<I, K>(features: I) -> Self
    where
        I: IntoIterator<Item = (K, Feature)>,
        K: Into<String>,
    {
        Self {
            features: Some(Features {
                feature: features.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            }),
        }
    }

    pub fn feature(&self, key: &str) -> Option<&Feature> {
        self.features.as_ref()?.feature.get(key)
    }

    /// Returns the bytes list stored under `key`, or `None` if the key is
    /// absent or holds another kind.
    pub fn bytes_list(&self, key: &str) -> Option<&[Vec<u8>]> {
        match self.feature(key)?.kind.as_ref()? {
            feature::Kind::BytesList(list) => Some(&list.value),
            _ => None,
        }
    }

    pub fn float_list(&self, key: &str) -> Option<&[f32]> {
        match self.feature(key)?.kind.as_ref()? {
            feature::Kind::FloatList(list) => Some(&list.value),
            _ => None,
        }
    }

    pub fn int64_list(&self, key: &str) -> Option<&[i64]> {
        match self.feature(key)?.kind.as_ref()? {
            feature::Kind::Int64List(list) => Some(&list.value),
            _ => None,
        }
    }

    /// Number of values stored under `key`, whatever its kind.
    pub fn list_len(&self, key: &str) -> Option<usize> {
        Some(match self.feature(key)?.kind.as_ref()? {
            feature::Kind::BytesList(list) => list.value.len(),
            feature::Kind::FloatList(list) => list.value.len(),
            feature::Kind::Int64List(list) => list.value.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_typed_access() {
        let example = Example::from_features([
            ("image/height", int64_feature(480)),
            ("image/format", bytes_feature("jpeg")),
            ("image/object/area", float_list_feature(vec![0.25, 0.5])),
        ]);

        assert_eq!(example.int64_list("image/height"), Some(&[480i64][..]));
        assert_eq!(
            example.bytes_list("image/format"),
            Some(&[b"jpeg".to_vec()][..])
        );
        assert_eq!(example.list_len("image/object/area"), Some(2));
        assert_eq!(example.float_list("image/height"), None);
        assert_eq!(example.int64_list("missing"), None);
    }

    #[test]
    fn test_encoding_is_key_ordered() {
        let a = Example::from_features([
            ("b", int64_feature(2)),
            ("a", int64_feature(1)),
        ]);
        let b = Example::from_features([
            ("a", int64_feature(1)),
            ("b", int64_feature(2)),
        ]);
        assert_eq!(a.encode_to_vec(), b.encode_to_vec());
    }

    #[test]
    fn test_decode_matches_encode() {
        let example = Example::from_features([
            ("image/object/class/text", bytes_list_feature(vec![b"Hat".to_vec()])),
            ("image/object/class/label", int64_list_feature(vec![6])),
        ]);
        let bytes = example.encode_to_vec();
        let decoded = Example::decode(bytes.as_slice()).expect("decode failed");
        assert_eq!(decoded, example);
    }
}
