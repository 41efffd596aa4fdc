//! Typed access to primitive store attributes

use std::collections::BTreeMap;
use topology_store::Attributes;

use super::properties::{decode_string_map, encode_string_map};
use crate::errors::{Result, TopologyError};

/// Writes typed fields into a primitive attribute map
pub(crate) struct AttributeWriter<'a> {
    attrs: &'a mut Attributes,
}

impl<'a> AttributeWriter<'a> {
    pub(crate) fn new(attrs: &'a mut Attributes) -> Self {
        Self { attrs }
    }

    pub(crate) fn text(&mut self, key: &str, value: &str) -> &mut Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    pub(crate) fn opt_text(&mut self, key: &str, value: &Option<String>) -> &mut Self {
        if let Some(value) = value {
            self.attrs.insert(key.to_string(), value.as_str().into());
        }
        self
    }

    pub(crate) fn count(&mut self, key: &str, value: u32) -> &mut Self {
        self.attrs.insert(key.to_string(), i64::from(value).into());
        self
    }

    pub(crate) fn opt_count(&mut self, key: &str, value: Option<u32>) -> &mut Self {
        if let Some(value) = value {
            self.count(key, value);
        }
        self
    }

    pub(crate) fn list(&mut self, key: &str, values: &[String]) -> &mut Self {
        self.attrs.insert(key.to_string(), values.to_vec().into());
        self
    }

    /// Maps are not primitives; they cross the boundary as JSON text
    pub(crate) fn string_map(&mut self, key: &str, map: &BTreeMap<String, String>) -> Result<&mut Self> {
        let encoded = encode_string_map(map)?;
        self.attrs.insert(key.to_string(), encoded.into());
        Ok(self)
    }
}

/// Reads typed fields back out of a primitive attribute map
pub(crate) struct AttributeReader<'a> {
    id: &'a str,
    attrs: &'a Attributes,
}

impl<'a> AttributeReader<'a> {
    pub(crate) fn new(id: &'a str, attrs: &'a Attributes) -> Self {
        Self { id, attrs }
    }

    fn mismatch(&self, key: &str, expected: &str) -> TopologyError {
        TopologyError::serialization(format!(
            "record {}: attribute '{}' is not {}",
            self.id, key, expected
        ))
    }

    pub(crate) fn opt_text(&self, key: &str) -> Result<Option<String>> {
        match self.attrs.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_text()
                .map(|s| Some(s.to_string()))
                .ok_or_else(|| self.mismatch(key, "text")),
        }
    }

    pub(crate) fn text(&self, key: &str) -> Result<String> {
        self.opt_text(key)?.ok_or_else(|| {
            TopologyError::serialization(format!(
                "record {}: missing attribute '{}'",
                self.id, key
            ))
        })
    }

    pub(crate) fn opt_count(&self, key: &str) -> Result<Option<u32>> {
        match self.attrs.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_int()
                .and_then(|i| u32::try_from(i).ok())
                .map(Some)
                .ok_or_else(|| self.mismatch(key, "a non-negative integer")),
        }
    }

    pub(crate) fn count(&self, key: &str) -> Result<u32> {
        self.opt_count(key)?.ok_or_else(|| {
            TopologyError::serialization(format!(
                "record {}: missing attribute '{}'",
                self.id, key
            ))
        })
    }

    pub(crate) fn list(&self, key: &str) -> Result<Vec<String>> {
        match self.attrs.get(key) {
            None => Ok(Vec::new()),
            Some(value) => value
                .as_text_list()
                .ok_or_else(|| self.mismatch(key, "a list of text")),
        }
    }

    pub(crate) fn string_map(&self, key: &str) -> Result<BTreeMap<String, String>> {
        match self.opt_text(key)? {
            None => Ok(BTreeMap::new()),
            Some(encoded) => decode_string_map(&encoded),
        }
    }
}
