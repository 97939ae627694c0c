//! Schema reconciliation.
//!
//! Documents written by older versions lack fields newer versions require.
//! [`reconcile`] brings an attribute map up to a [`RequiredFields`] spec by
//! inserting defaults for missing keys only:
//!
//! - a key already present is never touched, whatever its value or type;
//! - keys the spec does not mention are never removed, so data written by a
//!   newer schema survives a round-trip through an older one;
//! - the pass is idempotent: `reconcile(reconcile(m, r), r) == reconcile(m, r)`.

use serde_json::Value;
use storydock_core::AttributeMap;

/// Value type whose empty/zero value serves as a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Boolean,
    Mapping,
    Sequence,
}

impl ValueKind {
    /// The empty/zero value of this kind.
    #[must_use]
    pub fn empty_value(self) -> Value {
        match self {
            Self::String => Value::String(String::new()),
            Self::Integer => Value::from(0_i64),
            Self::Float => Value::from(0.0_f64),
            Self::Boolean => Value::Bool(false),
            Self::Mapping => Value::Object(AttributeMap::new()),
            Self::Sequence => Value::Array(Vec::new()),
        }
    }
}

/// How to produce the default for one required field.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultSpec {
    /// Insert this exact value.
    Literal(Value),
    /// Insert the empty value of a kind.
    EmptyOf(ValueKind),
}

impl DefaultSpec {
    #[must_use]
    pub fn materialize(&self) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::EmptyOf(kind) => kind.empty_value(),
        }
    }
}

/// Ordered list of required keys and their defaults.
///
/// When a key is listed twice, the first entry wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequiredFields {
    fields: Vec<(String, DefaultSpec)>,
}

impl RequiredFields {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `key`, defaulting to `spec`.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, spec: DefaultSpec) -> Self {
        self.fields.push((key.into(), spec));
        self
    }

    /// Require `key`, defaulting to a literal value.
    #[must_use]
    pub fn literal(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.field(key, DefaultSpec::Literal(value.into()))
    }

    /// Require `key`, defaulting to the empty value of `kind`.
    #[must_use]
    pub fn empty(self, key: impl Into<String>, kind: ValueKind) -> Self {
        self.field(key, DefaultSpec::EmptyOf(kind))
    }

    /// Append every field of `other` after this spec's own fields.
    #[must_use]
    pub fn extend(mut self, other: Self) -> Self {
        self.fields.extend(other.fields);
        self
    }

    /// The effective default for `key`, honoring first-entry-wins.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DefaultSpec> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, spec)| spec)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DefaultSpec)> {
        self.fields.iter().map(|(k, spec)| (k.as_str(), spec))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Fill every missing required key, returning the completed map.
#[must_use]
pub fn reconcile(mut map: AttributeMap, spec: &RequiredFields) -> AttributeMap {
    reconcile_in_place(&mut map, spec);
    map
}

/// Fill every missing required key in place.
///
/// Returns the keys that were filled, in spec order; an empty result means
/// the map already satisfied the spec.
pub fn reconcile_in_place(map: &mut AttributeMap, spec: &RequiredFields) -> Vec<String> {
    let mut filled = Vec::new();
    for (key, default) in spec.iter() {
        if !map.contains_key(key) {
            map.insert(key.to_owned(), default.materialize());
            filled.push(key.to_owned());
        }
    }
    filled
}
