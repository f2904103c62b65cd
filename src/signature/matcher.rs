use super::rules::{
    Acceptance, MatchRules, integer_class_match, is_pointer_type, is_signed_integer_name,
    is_unsigned_integer_name, void_pointer_wildcard,
};
use super::types::{ArgumentType, ParameterSignature, TypeDescriptor};
use tracing::debug;

/// `out->message(out, "name", ...)`: the output object and the message name
/// come before the message's own arguments.
pub const LEADING_ARGS: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mismatch {
    /// Counts exclude the leading arguments.
    Arity { expected: usize, got: usize },
    Argument {
        /// 1-based position in the full call, leading arguments included.
        ordinal: usize,
        expected: TypeDescriptor,
        got: TypeDescriptor,
    },
}

impl Mismatch {
    pub fn is_arity(&self) -> bool {
        matches!(self, Mismatch::Arity { .. })
    }
}

pub fn argument_ordinal(index: usize) -> usize {
    index + LEADING_ARGS + 1
}

#[derive(Clone, Debug, Default)]
pub struct SignatureMatcher {
    rules: MatchRules,
}

impl SignatureMatcher {
    pub fn new(rules: MatchRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    /// Checks every argument and returns every mismatch. A wrong argument
    /// count is reported alone, without looking at the arguments.
    pub fn check(&self, expected: &ParameterSignature, actual: &[ArgumentType]) -> Vec<Mismatch> {
        if expected.len() != actual.len() {
            return vec![Mismatch::Arity {
                expected: expected.len(),
                got: actual.len(),
            }];
        }

        expected
            .iter()
            .zip(actual)
            .enumerate()
            .filter_map(|(index, (expected_ty, arg))| {
                match self.match_argument(expected_ty, arg) {
                    Some(reason) => {
                        debug!(
                            argument = argument_ordinal(index),
                            expected = %expected_ty,
                            got = %arg.descriptor,
                            %reason,
                            "argument accepted"
                        );
                        None
                    }
                    None => Some(Mismatch::Argument {
                        ordinal: argument_ordinal(index),
                        expected: expected_ty.clone(),
                        got: arg.descriptor.clone(),
                    }),
                }
            })
            .collect()
    }

    pub fn match_argument(&self, expected: &str, arg: &ArgumentType) -> Option<Acceptance> {
        if void_pointer_wildcard(expected, arg.is_void_pointer) {
            return Some(Acceptance::VoidPointer);
        }

        if let Some(value) = arg.integer_literal {
            if is_signed_integer_name(expected) || is_unsigned_integer_name(expected) {
                return Some(Acceptance::IntegerLiteral);
            }
            if value == 0 && is_pointer_type(expected) {
                return Some(Acceptance::NullLiteral);
            }
        }

        // A failed class check still falls through: platform typedefs such
        // as time_t are reported as integers but matched by name.
        if arg.is_integer && integer_class_match(expected, arg.is_unsigned) {
            return Some(Acceptance::IntegerClass);
        }

        self.rules
            .textual_match(expected, &arg.descriptor)
            .or_else(|| self.rules.both_const_match(expected, &arg.descriptor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::rules::{ConstPolicy, EquivalenceRule};

    fn sig(params: &[&str]) -> ParameterSignature {
        params.iter().copied().collect()
    }

    #[test]
    fn struct_prefix_alias_is_accepted() {
        let matcher = SignatureMatcher::default();
        let mismatches = matcher.check(&sig(&["GList *"]), &[ArgumentType::new("struct GList *")]);
        assert!(mismatches.is_empty());
    }

    #[test]
    fn bool_receives_int() {
        let matcher = SignatureMatcher::default();
        assert!(matcher
            .check(&sig(&["bool"]), &[ArgumentType::integer("int", false)])
            .is_empty());
    }

    #[test]
    fn char_pointer_receives_array() {
        let matcher = SignatureMatcher::default();
        assert!(matcher
            .check(&sig(&["char *"]), &[ArgumentType::new("char[16]")])
            .is_empty());
    }

    #[test]
    fn integer_signedness_is_compared_by_class() {
        let matcher = SignatureMatcher::default();
        assert_eq!(
            matcher.match_argument(
                "unsigned long",
                &ArgumentType::integer("long unsigned int", true)
            ),
            Some(Acceptance::IntegerClass)
        );
        assert_eq!(
            matcher.check(&sig(&["int"]), &[ArgumentType::integer("unsigned int", true)]),
            vec![Mismatch::Argument {
                ordinal: 3,
                expected: "int".into(),
                got: "unsigned int".into(),
            }]
        );
    }

    #[test]
    fn integer_class_miss_falls_back_to_text() {
        let matcher = SignatureMatcher::default();
        assert_eq!(
            matcher.match_argument("time_t", &ArgumentType::integer("long int", false)),
            Some(Acceptance::Rule(EquivalenceRule::TimeTVsLong))
        );
    }

    #[test]
    fn void_pointer_matches_any_pointer() {
        let matcher = SignatureMatcher::default();
        assert_eq!(
            matcher.match_argument("GHashTable *", &ArgumentType::void_pointer()),
            Some(Acceptance::VoidPointer)
        );
        assert_eq!(matcher.match_argument("int", &ArgumentType::void_pointer()), None);
    }

    #[test]
    fn literals_are_lenient() {
        let matcher = SignatureMatcher::default();
        let zero = ArgumentType::integer("int", false).with_literal(0);
        let seven = ArgumentType::integer("int", false).with_literal(7);
        assert_eq!(
            matcher.match_argument("unsigned int", &seven),
            Some(Acceptance::IntegerLiteral)
        );
        assert_eq!(matcher.match_argument("xmlNode *", &zero), Some(Acceptance::NullLiteral));
        assert_eq!(matcher.match_argument("xmlNode *", &seven), None);
    }

    #[test]
    fn arity_mismatch_is_reported_alone() {
        let matcher = SignatureMatcher::default();
        let mismatches = matcher.check(&sig(&["int", "char *"]), &[ArgumentType::new("double")]);
        assert_eq!(mismatches, vec![Mismatch::Arity { expected: 2, got: 1 }]);

        let mismatches = matcher.check(&sig(&[]), &[ArgumentType::new("int")]);
        assert_eq!(mismatches, vec![Mismatch::Arity { expected: 0, got: 1 }]);
    }

    #[test]
    fn every_bad_argument_is_reported() {
        let matcher = SignatureMatcher::default();
        let mismatches = matcher.check(
            &sig(&["xmlNode *", "int", "const char *"]),
            &[
                ArgumentType::new("GList *"),
                ArgumentType::integer("int", false),
                ArgumentType::new("double"),
            ],
        );
        let ordinals: Vec<_> = mismatches
            .iter()
            .map(|m| match m {
                Mismatch::Argument { ordinal, .. } => *ordinal,
                Mismatch::Arity { .. } => 0,
            })
            .collect();
        assert_eq!(ordinals, [3, 5]);
    }

    #[test]
    fn both_const_retry_follows_policy() {
        let arg = ArgumentType::new("const struct xmlNode *");
        let symmetric = SignatureMatcher::default();
        let rules = MatchRules::default().with_const_policy(ConstPolicy::ExpectedOnly);
        let expected_only = SignatureMatcher::new(rules);
        assert_eq!(symmetric.match_argument("const xmlNode *", &arg), Some(Acceptance::BothConst));
        assert_eq!(expected_only.match_argument("const xmlNode *", &arg), None);
        assert_eq!(
            expected_only.match_argument("const xmlNode *", &ArgumentType::new("struct xmlNode *")),
            Some(Acceptance::ExpectedConst)
        );
    }
}
