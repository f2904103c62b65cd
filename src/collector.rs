use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::StoreError;
use crate::events::{AttributeArg, Declaration, UnitEvents};
use crate::signature::{Insertion, ParameterSignature, Registry};
use crate::store::Store;
use tracing::{debug, info};

/// Builds the registry from `output_args` declarations. Types are stored
/// exactly as written; normalization only happens when matching calls.
#[derive(Debug, Default)]
pub struct Collector {
    registry: Registry,
    dirty: bool,
    diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
pub struct CollectReport {
    pub registry: Registry,
    pub diagnostics: Vec<Diagnostic>,
    /// Whether the store was rewritten.
    pub persisted: bool,
}

impl Collector {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            dirty: false,
            diagnostics: Vec::new(),
        }
    }

    pub fn from_store(store: &Store) -> Result<Self, StoreError> {
        Ok(Self::new(store.load()?))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn collect_unit(&mut self, unit: &UnitEvents) {
        for decl in &unit.declarations {
            self.declare(decl);
        }
    }

    /// Records one declaration. Returns `None` if it was rejected, in which
    /// case a diagnostic has been recorded.
    pub fn declare(&mut self, decl: &Declaration) -> Option<Insertion> {
        let Some(name) = decl.message.as_literal() else {
            self.reject(decl, None, "Output message must be a string".into());
            return None;
        };
        if name.trim().is_empty() {
            self.reject(decl, None, "Output message name must not be empty".into());
            return None;
        }

        let params = match literal_params(&decl.params) {
            Ok(params) => params,
            Err(found) => {
                let reason =
                    format!("Output message argument must be a string, found `{found}`");
                self.reject(decl, Some(name), reason);
                return None;
            }
        };

        match self.registry.insert(name, params) {
            Ok(Insertion::Inserted) => {
                debug!(%name, "new output message");
                self.dirty = true;
                Some(Insertion::Inserted)
            }
            Ok(Insertion::Unchanged) => Some(Insertion::Unchanged),
            Err(conflict) => {
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::SignatureConflict(conflict),
                    decl.location.clone(),
                    Some(name.to_string()),
                ));
                None
            }
        }
    }

    /// Rewrites the store if any declaration added a message.
    pub fn finish(self, store: &Store) -> Result<CollectReport, StoreError> {
        if !self.dirty {
            info!(messages = self.registry.len(), "message store unchanged");
            return Ok(CollectReport {
                registry: self.registry,
                diagnostics: self.diagnostics,
                persisted: false,
            });
        }
        let registry = store.persist(&self.registry)?;
        Ok(CollectReport {
            registry,
            diagnostics: self.diagnostics,
            persisted: true,
        })
    }

    fn reject(&mut self, decl: &Declaration, name: Option<&str>, reason: String) {
        self.diagnostics.push(Diagnostic::new(
            DiagnosticKind::MalformedDeclaration { reason },
            decl.location.clone(),
            name.map(str::to_string),
        ));
    }
}

fn literal_params(params: &[AttributeArg]) -> Result<ParameterSignature, &str> {
    params
        .iter()
        .map(|param| match param {
            AttributeArg::Literal(text) => Ok(text.clone()),
            AttributeArg::NonLiteral(found) => Err(found.as_str()),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(ParameterSignature::new)
}
