/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Dynamically-typed property bag with total, defaulted accessors.

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// One scalar value stored under a property key.
///
/// Absence is modelled by the key not being present in [`Properties`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Long(i64),
    Double(f64),
    String(String),
}

impl Display for PropertyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Bool(value) => write!(f, "{value}"),
            PropertyValue::Long(value) => write!(f, "{value}"),
            PropertyValue::Double(value) => write!(f, "{value}"),
            PropertyValue::String(value) => f.write_str(value),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Long(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Double(value)
    }
}

/// Key/value property bag attached to endpoints, registrations and topics.
///
/// The matching engine only ever reads a bag; whoever built it owns it.
///
/// ```
/// use pubsub_matching::Properties;
///
/// let props = Properties::new()
///     .with("pubsub.config", "tcp")
///     .with("service.ranking", 5_i64);
///
/// assert_eq!(props.get_string("pubsub.config"), Some("tcp"));
/// assert_eq!(props.get_long("service.ranking", -1), 5);
/// assert!(!props.get_bool("missing"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    entries: BTreeMap<String, PropertyValue>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Inserts or replaces a value, returning the previous one.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, PropertyValue> {
        self.entries.iter()
    }

    /// Returns the value under `key` when it is a string.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(PropertyValue::String(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns the value under `key` as a boolean, `false` when missing or mistyped.
    ///
    /// The strings `"true"` and `"false"` are accepted in any case.
    pub fn get_bool(&self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(PropertyValue::Bool(value)) => *value,
            Some(PropertyValue::String(value)) => value.trim().eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Returns the value under `key` as a signed integer, or `default`.
    ///
    /// Decimal integer strings and integral doubles are accepted; fractional
    /// doubles are not truncated.
    pub fn get_long(&self, key: &str, default: i64) -> i64 {
        match self.entries.get(key) {
            Some(PropertyValue::Long(value)) => *value,
            Some(PropertyValue::Double(value))
                if value.fract() == 0.0 && value.abs() < i64::MAX as f64 =>
            {
                *value as i64
            }
            Some(PropertyValue::String(value)) => value.trim().parse().unwrap_or(default),
            _ => default,
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
    K: Into<String>,
    V: Into<PropertyValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = (&'a String, &'a PropertyValue);
    type IntoIter = btree_map::Iter<'a, String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
