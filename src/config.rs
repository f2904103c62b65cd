use crate::checker::NameResolver;
use crate::error::ConfigError;
use crate::signature::rules::{ConstPolicy, MatchRules};
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};

/// Contents of `fosa.toml`. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Merged over the built-in alias table.
    pub aliases: BTreeMap<String, String>,
    pub matching: MatchingConfig,
    pub names: NamesConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchingConfig {
    pub const_policy: ConstPolicy,
    /// Replaces the built-in list when present.
    pub decayed_enums: Option<Vec<String>>,
    /// Replaces the built-in list when present.
    pub option_array_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamesConfig {
    pub helpers: Vec<String>,
    pub field_types: Vec<String>,
    pub candidates: Vec<String>,
}

impl Default for NamesConfig {
    fn default() -> Self {
        let resolver = NameResolver::default();
        Self {
            helpers: resolver.helpers().to_vec(),
            field_types: resolver.field_types().to_vec(),
            candidates: resolver.candidates().to_vec(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    pub fn load_optional(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn match_rules(&self) -> MatchRules {
        let mut rules = MatchRules::default().with_const_policy(self.matching.const_policy);
        rules.aliases.extend(self.aliases.clone());
        if let Some(enums) = &self.matching.decayed_enums {
            rules.decayed_enums = enums.iter().cloned().collect();
        }
        if let Some(types) = &self.matching.option_array_types {
            rules.option_array_types = types.clone();
        }
        rules
    }

    pub fn name_resolver(&self) -> NameResolver {
        NameResolver::new(
            self.names.helpers.clone(),
            self.names.field_types.clone(),
            self.names.candidates.clone(),
        )
    }
}
