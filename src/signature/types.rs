use serde::Deserialize;
use std::fmt;

/// A type name exactly as the host compiler reports it, e.g. `struct GList *`.
pub type TypeDescriptor = String;

/// Ordered parameter types of a message. Position is the argument index,
/// length is the required arity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ParameterSignature(Vec<TypeDescriptor>);

impl ParameterSignature {
    pub fn new(params: Vec<TypeDescriptor>) -> Self {
        Self(params)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeDescriptor> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[TypeDescriptor] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for ParameterSignature {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a ParameterSignature {
    type Item = &'a TypeDescriptor;
    type IntoIter = std::slice::Iter<'a, TypeDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ParameterSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(none)");
        }
        f.write_str(&self.0.join(", "))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageSignature {
    pub name: String,
    pub params: ParameterSignature,
}

impl MessageSignature {
    pub fn new(name: impl Into<String>, params: ParameterSignature) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// Type of one actual argument at a call site, together with the facts the
/// IR exposes beyond the printed descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ArgumentType {
    #[serde(rename = "type")]
    pub descriptor: TypeDescriptor,
    #[serde(default, rename = "integer")]
    pub is_integer: bool,
    #[serde(default, rename = "unsigned")]
    pub is_unsigned: bool,
    #[serde(default, rename = "void_pointer")]
    pub is_void_pointer: bool,
    #[serde(default, rename = "literal")]
    pub integer_literal: Option<i64>,
}

impl ArgumentType {
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            ..Self::default()
        }
    }

    pub fn integer(descriptor: impl Into<String>, unsigned: bool) -> Self {
        Self {
            descriptor: descriptor.into(),
            is_integer: true,
            is_unsigned: unsigned,
            ..Self::default()
        }
    }

    pub fn void_pointer() -> Self {
        Self {
            descriptor: "void *".into(),
            is_void_pointer: true,
            ..Self::default()
        }
    }

    pub fn with_literal(mut self, value: i64) -> Self {
        self.integer_literal = Some(value);
        self
    }
}
