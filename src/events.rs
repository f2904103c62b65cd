//! Declaration and call-site events for one compilation unit, as captured
//! from the compiler's IR and written to a TOML document.

use crate::diagnostics::Location;
use crate::error::EventsError;
use crate::signature::ArgumentType;
use serde::Deserialize;
use std::{fs, path::Path};

/// One argument of an `output_args` attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeArg {
    Literal(String),
    /// Anything that isn't a string constant, rendered for the diagnostic.
    NonLiteral(String),
}

impl AttributeArg {
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            AttributeArg::Literal(text) => Some(text),
            AttributeArg::NonLiteral(_) => None,
        }
    }
}

impl From<toml::Value> for AttributeArg {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(text) => AttributeArg::Literal(text),
            other => AttributeArg::NonLiteral(other.to_string()),
        }
    }
}

impl From<&str> for AttributeArg {
    fn from(text: &str) -> Self {
        AttributeArg::Literal(text.to_string())
    }
}

/// A message declaration: `output_args("name", "type", ...)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub location: Location,
    pub message: AttributeArg,
    pub params: Vec<AttributeArg>,
}

impl Declaration {
    pub fn new(message: impl Into<AttributeArg>, params: Vec<AttributeArg>) -> Self {
        Self {
            location: Location::default(),
            message: message.into(),
            params,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

/// How the message name argument of a call was produced.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageNameSource {
    /// A string constant.
    Literal(String),
    /// The return value of the named function.
    #[serde(rename = "helper")]
    HelperCall(String),
    /// A struct field of the given type.
    #[serde(rename = "field")]
    FieldRead(String),
    Unknown,
}

/// A call through the output object's `message` field. `args` excludes the
/// output object and the message name.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CallSite {
    #[serde(default)]
    pub location: Location,
    pub name: MessageNameSource,
    #[serde(default)]
    pub args: Vec<ArgumentType>,
}

impl CallSite {
    pub fn new(name: MessageNameSource, args: Vec<ArgumentType>) -> Self {
        Self {
            location: Location::default(),
            name,
            args,
        }
    }

    pub fn literal(name: &str, args: Vec<ArgumentType>) -> Self {
        Self::new(MessageNameSource::Literal(name.to_string()), args)
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitEvents {
    pub declarations: Vec<Declaration>,
    pub calls: Vec<CallSite>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUnit {
    #[serde(default, rename = "declaration")]
    declarations: Vec<RawDeclaration>,
    #[serde(default, rename = "call")]
    calls: Vec<CallSite>,
}

#[derive(Deserialize)]
struct RawDeclaration {
    message: toml::Value,
    #[serde(default)]
    params: Vec<toml::Value>,
    #[serde(default)]
    location: Location,
}

impl UnitEvents {
    pub fn load(path: &Path) -> Result<Self, EventsError> {
        let text = fs::read_to_string(path).map_err(|source| EventsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, EventsError> {
        let raw: RawUnit = toml::from_str(text).map_err(|err| EventsError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let declarations = raw
            .declarations
            .into_iter()
            .map(|decl| Declaration {
                location: decl.location,
                message: decl.message.into(),
                params: decl.params.into_iter().map(AttributeArg::from).collect(),
            })
            .collect();
        Ok(Self {
            declarations,
            calls: raw.calls,
        })
    }
}
