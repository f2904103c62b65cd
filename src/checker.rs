use crate::diagnostics::{Diagnostic, DiagnosticKind, Location};
use crate::events::{CallSite, MessageNameSource, UnitEvents};
use crate::signature::{Mismatch, Registry, SignatureMatcher};
use tracing::debug;

const HELPER_FUNCTIONS: &[&str] = &[
    "crm_element_name",
    "crm_map_element_name",
    "pcmk__map_element_name",
];
const NAME_FIELD_TYPES: &[&str] = &["const xmlChar *", "const char *"];
/// Every message a computed name is known to resolve to. They all share one
/// signature, so a call is checked against each of them.
const COMPUTED_NAME_CANDIDATES: &[&str] = &["bundle", "clone", "group", "primitive"];

/// Turns the way a call names its message into the set of messages it may
/// actually invoke.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameResolver {
    helpers: Vec<String>,
    field_types: Vec<String>,
    candidates: Vec<String>,
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new(
            owned(HELPER_FUNCTIONS),
            owned(NAME_FIELD_TYPES),
            owned(COMPUTED_NAME_CANDIDATES),
        )
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl NameResolver {
    pub fn new(helpers: Vec<String>, field_types: Vec<String>, candidates: Vec<String>) -> Self {
        Self {
            helpers,
            field_types,
            candidates,
        }
    }

    pub fn helpers(&self) -> &[String] {
        &self.helpers
    }

    pub fn field_types(&self) -> &[String] {
        &self.field_types
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// `None` when the name can't be determined statically, including a
    /// recognized computed name with no configured candidates.
    pub fn resolve(&self, source: &MessageNameSource) -> Option<Vec<String>> {
        match source {
            MessageNameSource::Literal(name) => Some(vec![name.clone()]),
            MessageNameSource::HelperCall(function) if self.helpers.contains(function) => {
                debug!(%function, candidates = ?self.candidates, "message name from helper");
                self.computed_candidates()
            }
            MessageNameSource::FieldRead(field_type) if self.field_types.contains(field_type) => {
                debug!(%field_type, candidates = ?self.candidates, "message name from field");
                self.computed_candidates()
            }
            MessageNameSource::HelperCall(_)
            | MessageNameSource::FieldRead(_)
            | MessageNameSource::Unknown => None,
        }
    }

    fn computed_candidates(&self) -> Option<Vec<String>> {
        (!self.candidates.is_empty()).then(|| self.candidates.clone())
    }
}

/// Checks call sites against a loaded registry. Never modifies it.
pub struct Checker<'a> {
    registry: &'a Registry,
    matcher: SignatureMatcher,
    resolver: NameResolver,
}

impl<'a> Checker<'a> {
    pub fn new(registry: &'a Registry, matcher: SignatureMatcher, resolver: NameResolver) -> Self {
        Self {
            registry,
            matcher,
            resolver,
        }
    }

    pub fn check_unit(&self, unit: &UnitEvents) -> Vec<Diagnostic> {
        unit.calls
            .iter()
            .flat_map(|call| self.check_call(call))
            .collect()
    }

    pub fn check_call(&self, call: &CallSite) -> Vec<Diagnostic> {
        let Some(candidates) = self.resolver.resolve(&call.name) else {
            return vec![Diagnostic::new(
                DiagnosticKind::UnresolvableMessageName,
                call.location.clone(),
                None,
            )];
        };

        candidates
            .iter()
            .flat_map(|name| self.check_message(name, call))
            .collect()
    }

    pub fn check_message(&self, name: &str, call: &CallSite) -> Vec<Diagnostic> {
        let Some(signature) = self.registry.lookup(name) else {
            return vec![diagnostic(
                DiagnosticKind::UnknownMessage,
                &call.location,
                name,
            )];
        };

        self.matcher
            .check(&signature.params, &call.args)
            .into_iter()
            .map(|mismatch| {
                let kind = match mismatch {
                    Mismatch::Arity { expected, got } => {
                        DiagnosticKind::ArityMismatch { expected, got }
                    }
                    Mismatch::Argument {
                        ordinal,
                        expected,
                        got,
                    } => DiagnosticKind::ArgumentTypeMismatch {
                        ordinal,
                        expected,
                        got,
                    },
                };
                diagnostic(kind, &call.location, name)
            })
            .collect()
    }
}

fn diagnostic(kind: DiagnosticKind, location: &Location, name: &str) -> Diagnostic {
    Diagnostic::new(kind, location.clone(), Some(name.to_string()))
}
