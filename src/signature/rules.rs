//! Equivalence rules between a declared parameter type and the type gcc
//! reports for the argument actually passed.
//!
//! The compiler normalizes types on its way to the IR: struct tags get added,
//! typedefs collapse, arrays decay, some enums decay to `int`. Declarations
//! are written in source terms, so plain string equality rejects a lot of
//! correct calls. Each rule below recognises one of those divergences. Rules
//! are tried in [`ORDERED_RULES`] order; earlier rules are more specific.

use super::normalize::AliasTable;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

const CONST_PREFIX: &str = "const ";

const DECAYED_ENUMS: &[&str] = &["enum shadow_disp_flags", "enum pcmk__fence_history"];
const OPTION_ARRAY_TYPES: &[&str] = &["pcmk__cluster_option_t"];

const UNSIGNED_NAMES: &[&str] = &["unsigned int", "unsigned long", "unsigned long long", "guint"];
const SIGNED_NAMES: &[&str] = &["int", "long", "long long", "gint"];

pub fn bool_vs_int(expected: &str, got: &str) -> bool {
    expected == "bool" && got == "int"
}

pub fn char_ptr_vs_char_array(expected: &str, got: &str) -> bool {
    expected == "char *" && got.starts_with("char[")
}

pub fn time_t_vs_long(expected: &str, got: &str) -> bool {
    expected == "time_t" && got == "long int"
}

/// gcc reports enums that have a negative sentinel member by their enum name
/// and every other enum as plain `int`. The latter need listing here.
pub fn enum_decayed_to_int(expected: &str, got: &str, known: &HashSet<String>) -> bool {
    got == "int" && known.contains(expected)
}

/// `struct T[N] *` matches `T *` for any `N`.
pub fn option_array_length_insensitive(expected: &str, got: &str, element: &str) -> bool {
    if expected.strip_suffix(" *") != Some(element) {
        return false;
    }
    got.strip_prefix("struct ")
        .and_then(|rest| rest.strip_prefix(element))
        .and_then(|rest| rest.strip_prefix('['))
        .and_then(|rest| rest.strip_suffix("] *"))
        .is_some_and(|len| !len.is_empty() && len.bytes().all(|b| b.is_ascii_digit()))
}

pub fn is_unsigned_integer_name(name: &str) -> bool {
    UNSIGNED_NAMES.contains(&name) || name.starts_with("uint")
}

pub fn is_signed_integer_name(name: &str) -> bool {
    SIGNED_NAMES.contains(&name) || name.starts_with("int")
}

/// Fixed-width and platform-width integer names can't be reconciled from
/// text, so for IR integer types only the signedness class is compared.
pub fn integer_class_match(expected: &str, got_is_unsigned: bool) -> bool {
    if got_is_unsigned {
        is_unsigned_integer_name(expected)
    } else {
        is_signed_integer_name(expected)
    }
}

pub fn is_pointer_type(name: &str) -> bool {
    name.ends_with('*')
}

pub fn void_pointer_wildcard(expected: &str, got_is_void_pointer: bool) -> bool {
    got_is_void_pointer && is_pointer_type(expected)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EquivalenceRule {
    BoolVsInt,
    CharPtrVsCharArray,
    TimeTVsLong,
    EnumDecayedToInt,
    OptionArrayLength,
}

pub const ORDERED_RULES: [EquivalenceRule; 5] = [
    EquivalenceRule::BoolVsInt,
    EquivalenceRule::CharPtrVsCharArray,
    EquivalenceRule::TimeTVsLong,
    EquivalenceRule::EnumDecayedToInt,
    EquivalenceRule::OptionArrayLength,
];

impl EquivalenceRule {
    pub fn name(self) -> &'static str {
        match self {
            EquivalenceRule::BoolVsInt => "bool-vs-int",
            EquivalenceRule::CharPtrVsCharArray => "char-pointer-vs-char-array",
            EquivalenceRule::TimeTVsLong => "time_t-vs-long",
            EquivalenceRule::EnumDecayedToInt => "enum-decayed-to-int",
            EquivalenceRule::OptionArrayLength => "option-array-length",
        }
    }

    pub fn applies(self, expected: &str, got: &str, rules: &MatchRules) -> bool {
        match self {
            EquivalenceRule::BoolVsInt => bool_vs_int(expected, got),
            EquivalenceRule::CharPtrVsCharArray => char_ptr_vs_char_array(expected, got),
            EquivalenceRule::TimeTVsLong => time_t_vs_long(expected, got),
            EquivalenceRule::EnumDecayedToInt => {
                enum_decayed_to_int(expected, got, &rules.decayed_enums)
            }
            EquivalenceRule::OptionArrayLength => rules
                .option_array_types
                .iter()
                .any(|element| option_array_length_insensitive(expected, got, element)),
        }
    }
}

impl fmt::Display for EquivalenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How `const` qualifiers are reconciled. Two variants of this check have
/// shipped and it is not settled which one is right, so both are available.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstPolicy {
    /// Only "expected `const T`, got `T`".
    ExpectedOnly,
    /// Additionally retry once with `const ` stripped from both sides.
    #[default]
    Symmetric,
}

/// Why an argument was accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Acceptance {
    VoidPointer,
    NullLiteral,
    IntegerLiteral,
    IntegerClass,
    Identical,
    Rule(EquivalenceRule),
    ExpectedConst,
    BothConst,
}

impl fmt::Display for Acceptance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Acceptance::VoidPointer => f.write_str("void-pointer"),
            Acceptance::NullLiteral => f.write_str("null-literal"),
            Acceptance::IntegerLiteral => f.write_str("integer-literal"),
            Acceptance::IntegerClass => f.write_str("integer-class"),
            Acceptance::Identical => f.write_str("identical"),
            Acceptance::Rule(rule) => write!(f, "{rule}"),
            Acceptance::ExpectedConst => f.write_str("expected-const"),
            Acceptance::BothConst => f.write_str("both-const"),
        }
    }
}

/// Everything the textual comparison needs to know about the codebase.
#[derive(Clone, Debug)]
pub struct MatchRules {
    pub aliases: AliasTable,
    pub decayed_enums: HashSet<String>,
    pub option_array_types: Vec<String>,
    pub const_policy: ConstPolicy,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            aliases: AliasTable::builtin(),
            decayed_enums: DECAYED_ENUMS.iter().map(|s| s.to_string()).collect(),
            option_array_types: OPTION_ARRAY_TYPES.iter().map(|s| s.to_string()).collect(),
            const_policy: ConstPolicy::default(),
        }
    }
}

impl MatchRules {
    pub fn with_const_policy(mut self, policy: ConstPolicy) -> Self {
        self.const_policy = policy;
        self
    }

    /// Compares type strings only: aliases, then the ordered rules, then
    /// "expected const, got non-const" recursively.
    pub fn textual_match(&self, expected: &str, got: &str) -> Option<Acceptance> {
        let expected_canonical = self.aliases.canonicalize(expected);
        let got = self.aliases.canonicalize(got);

        if expected_canonical == got {
            return Some(Acceptance::Identical);
        }

        if let Some(rule) = ORDERED_RULES
            .into_iter()
            .find(|rule| rule.applies(expected_canonical, got, self))
        {
            return Some(Acceptance::Rule(rule));
        }

        let stripped = expected.strip_prefix(CONST_PREFIX)?;
        self.textual_match(stripped, got)
            .map(|_| Acceptance::ExpectedConst)
    }

    /// Under [`ConstPolicy::Symmetric`], one more comparison with `const `
    /// removed from both sides. Not recursive.
    pub fn both_const_match(&self, expected: &str, got: &str) -> Option<Acceptance> {
        if self.const_policy != ConstPolicy::Symmetric {
            return None;
        }
        let expected = expected.strip_prefix(CONST_PREFIX)?;
        let got = got.strip_prefix(CONST_PREFIX)?;
        self.textual_match(expected, got).map(|_| Acceptance::BothConst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_predicates() {
        assert!(bool_vs_int("bool", "int"));
        assert!(!bool_vs_int("int", "bool"));
        assert!(char_ptr_vs_char_array("char *", "char[16]"));
        assert!(!char_ptr_vs_char_array("const char *", "char[16]"));
        assert!(time_t_vs_long("time_t", "long int"));
        assert!(!time_t_vs_long("time_t", "int"));
    }

    #[test]
    fn decayed_enums_only_match_plain_int() {
        let known: HashSet<String> = ["enum shadow_disp_flags".to_string()].into();
        assert!(enum_decayed_to_int("enum shadow_disp_flags", "int", &known));
        assert!(!enum_decayed_to_int("enum shadow_disp_flags", "unsigned int", &known));
        assert!(!enum_decayed_to_int("enum other", "int", &known));
    }

    #[test]
    fn option_arrays_ignore_length() {
        let element = "pcmk__cluster_option_t";
        let expected = "pcmk__cluster_option_t *";
        let accepts = |expected: &str, actual: &str| {
            option_array_length_insensitive(expected, actual, element)
        };
        assert!(accepts(expected, "struct pcmk__cluster_option_t[10] *"));
        assert!(accepts(expected, "struct pcmk__cluster_option_t[3] *"));
        assert!(!accepts(expected, "struct pcmk__cluster_option_t[] *"));
        assert!(!accepts(expected, "struct pcmk__cluster_option_t[x] *"));
        assert!(!accepts("other_t *", "struct pcmk__cluster_option_t[3] *"));
    }

    #[test]
    fn integer_classes() {
        assert!(integer_class_match("unsigned long", true));
        assert!(integer_class_match("uint32_t", true));
        assert!(integer_class_match("guint", true));
        assert!(!integer_class_match("int", true));
        assert!(integer_class_match("int", false));
        assert!(integer_class_match("int64_t", false));
        assert!(integer_class_match("long long", false));
        assert!(!integer_class_match("unsigned int", false));
        assert!(!integer_class_match("uint8_t", false));
    }

    #[test]
    fn void_pointer_needs_expected_pointer() {
        assert!(void_pointer_wildcard("GHashTable *", true));
        assert!(!void_pointer_wildcard("int", true));
        assert!(!void_pointer_wildcard("GHashTable *", false));
    }

    #[test]
    fn rule_order_is_fixed() {
        let names: Vec<_> = ORDERED_RULES.iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            [
                "bool-vs-int",
                "char-pointer-vs-char-array",
                "time_t-vs-long",
                "enum-decayed-to-int",
                "option-array-length",
            ]
        );
    }

    #[test]
    fn textual_match_reports_the_rule_used() {
        let rules = MatchRules::default();
        assert_eq!(rules.textual_match("GList *", "struct GList *"), Some(Acceptance::Identical));
        assert_eq!(
            rules.textual_match("bool", "int"),
            Some(Acceptance::Rule(EquivalenceRule::BoolVsInt))
        );
        assert_eq!(
            rules.textual_match("enum pcmk__fence_history", "int"),
            Some(Acceptance::Rule(EquivalenceRule::EnumDecayedToInt))
        );
        assert_eq!(rules.textual_match("GList *", "char *"), None);
    }

    #[test]
    fn expected_const_accepts_non_const() {
        let rules = MatchRules::default().with_const_policy(ConstPolicy::ExpectedOnly);
        assert_eq!(rules.textual_match("const char *", "char *"), Some(Acceptance::ExpectedConst));
        assert_eq!(rules.textual_match("const char *", "char[4]"), Some(Acceptance::ExpectedConst));
        assert_eq!(rules.textual_match("char *", "const char *"), None);
    }

    #[test]
    fn both_const_depends_on_policy() {
        let symmetric = MatchRules::default();
        let expected_only = MatchRules::default().with_const_policy(ConstPolicy::ExpectedOnly);
        assert_eq!(
            symmetric.both_const_match("const GList *", "const struct GList *"),
            Some(Acceptance::BothConst)
        );
        assert_eq!(
            expected_only.both_const_match("const GList *", "const struct GList *"),
            None
        );
        assert_eq!(symmetric.both_const_match("GList *", "const GList *"), None);
    }
}
