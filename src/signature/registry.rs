use super::types::{MessageSignature, ParameterSignature};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Insertion {
    Inserted,
    /// The name was already known with an identical signature.
    Unchanged,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("parameter list for `{name}` is different from previous definition")]
pub struct SignatureConflict {
    pub name: String,
    pub existing: ParameterSignature,
    pub attempted: ParameterSignature,
}

impl SignatureConflict {
    /// Both parameter lists, one per line, in declaration order.
    pub fn describe(&self) -> String {
        format!(
            "Expected:{}\nGot     :{}",
            render_params(&self.existing),
            render_params(&self.attempted)
        )
    }
}

fn render_params(params: &ParameterSignature) -> String {
    params.iter().map(|p| format!(" {p}")).collect()
}

/// Message name to signature. Entries are only ever added.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registry {
    messages: BTreeMap<String, MessageSignature>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, name: &str) -> Option<&MessageSignature> {
        self.messages.get(name)
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        params: ParameterSignature,
    ) -> Result<Insertion, SignatureConflict> {
        let name = name.into();
        if let Some(existing) = self.messages.get(&name) {
            if existing.params == params {
                return Ok(Insertion::Unchanged);
            }
            return Err(SignatureConflict {
                name,
                existing: existing.params.clone(),
                attempted: params,
            });
        }
        self.messages
            .insert(name.clone(), MessageSignature::new(name, params));
        Ok(Insertion::Inserted)
    }

    /// Inserts every entry, stopping at the first conflict. Returns how many
    /// names were new.
    pub fn merge_from_store(
        &mut self,
        entries: impl IntoIterator<Item = MessageSignature>,
    ) -> Result<usize, SignatureConflict> {
        let mut added = 0;
        for entry in entries {
            if self.insert(entry.name, entry.params)? == Insertion::Inserted {
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &MessageSignature> {
        self.messages.values()
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for message in self.iter() {
            writeln!(f, "{}: {}", message.name, message.params)?;
        }
        Ok(())
    }
}
