//! Translation of scenarios into solver scripts.
//!
//! Every script grounds its symbols to the scenario's literal values and
//! then asserts the violation predicate for its invariant class, so the
//! script is satisfiable exactly when the scenario violates the invariant.

use miette::Diagnostic;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use polcheck_smt::backends::smtlib_printer::unrepresentable_char;
use polcheck_smt::script::SmtScript;
use polcheck_smt::sorts::SmtSort;
use polcheck_smt::terms::SmtTerm;

use crate::scenario::{CaseTag, ScenarioDocument};

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum EncodeError {
    #[error("missing key '{field}'")]
    #[diagnostic(code(polcheck::encode::missing_field))]
    MissingField { field: &'static str },

    #[error("{0}")]
    #[diagnostic(code(polcheck::encode::invalid))]
    Invalid(String),
}

/// Fields of a `registry` scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCase {
    pub allowed_registries: Vec<String>,
    pub test_registry: String,
    pub prefix_bad: bool,
}

/// Fields of a `wildcard` scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardCase {
    pub resource_kind: String,
    pub action: String,
    pub subject_is_admin: bool,
    pub wildcard_present: bool,
}

/// Fields of a `tenant` scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantCase {
    pub subject_tenant: String,
    pub resource_tenant: String,
}

/// A scenario whose case-specific fields have been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invariant {
    Registry(RegistryCase),
    Wildcard(WildcardCase),
    Tenant(TenantCase),
}

#[derive(Deserialize)]
struct RegistryFields {
    allowed_registries: Option<Vec<String>>,
    test_registry: Option<String>,
    prefix_bad: Option<bool>,
}

#[derive(Deserialize)]
struct WildcardFields {
    resource_kind: Option<String>,
    action: Option<String>,
    subject_is_admin: Option<bool>,
    wildcard_present: Option<bool>,
}

#[derive(Deserialize)]
struct TenantFields {
    subject_tenant: Option<String>,
    resource_tenant: Option<String>,
}

fn fields<T: DeserializeOwned>(doc: &ScenarioDocument, case: CaseTag) -> Result<T, EncodeError> {
    serde_yaml::from_value(doc.value.clone())
        .map_err(|e| EncodeError::Invalid(format!("invalid {case} scenario: {e}")))
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, EncodeError> {
    value.ok_or(EncodeError::MissingField { field })
}

/// A required string field that a solver string literal can hold.
fn require_literal(value: Option<String>, field: &'static str) -> Result<String, EncodeError> {
    let value = require(value, field)?;
    check_literal(&value, field)?;
    Ok(value)
}

fn check_literal(value: &str, field: &'static str) -> Result<(), EncodeError> {
    match unrepresentable_char(value) {
        Some(c) => Err(EncodeError::Invalid(format!(
            "'{field}' contains U+{:04X}, which solver strings cannot hold",
            u32::from(c)
        ))),
        None => Ok(()),
    }
}

impl Invariant {
    /// Validate the fields `case` requires.
    pub fn from_document(doc: &ScenarioDocument, case: CaseTag) -> Result<Self, EncodeError> {
        match case {
            CaseTag::Registry => {
                let f: RegistryFields = fields(doc, case)?;
                let allowed_registries = require(f.allowed_registries, "allowed_registries")?;
                let test_registry = require_literal(f.test_registry, "test_registry")?;
                for allowed in &allowed_registries {
                    check_literal(allowed, "allowed_registries")?;
                }
                if allowed_registries.is_empty() {
                    return Err(EncodeError::Invalid(
                        "allowed_registries must list at least one registry".into(),
                    ));
                }
                Ok(Invariant::Registry(RegistryCase {
                    allowed_registries,
                    test_registry,
                    prefix_bad: f.prefix_bad.unwrap_or(false),
                }))
            }
            CaseTag::Wildcard => {
                let f: WildcardFields = fields(doc, case)?;
                Ok(Invariant::Wildcard(WildcardCase {
                    resource_kind: require_literal(f.resource_kind, "resource_kind")?,
                    action: require_literal(f.action, "action")?,
                    subject_is_admin: require(f.subject_is_admin, "subject_is_admin")?,
                    wildcard_present: require(f.wildcard_present, "wildcard_present")?,
                }))
            }
            CaseTag::Tenant => {
                let f: TenantFields = fields(doc, case)?;
                Ok(Invariant::Tenant(TenantCase {
                    subject_tenant: require_literal(f.subject_tenant, "subject_tenant")?,
                    resource_tenant: require_literal(f.resource_tenant, "resource_tenant")?,
                }))
            }
        }
    }

    pub fn case(&self) -> CaseTag {
        match self {
            Invariant::Registry(_) => CaseTag::Registry,
            Invariant::Wildcard(_) => CaseTag::Wildcard,
            Invariant::Tenant(_) => CaseTag::Tenant,
        }
    }

    /// Build the violation-search script. `name` only appears in a comment.
    pub fn to_script(&self, name: &str) -> SmtScript {
        match self {
            Invariant::Registry(c) => encode_registry(name, c),
            Invariant::Wildcard(c) => encode_wildcard(name, c),
            Invariant::Tenant(c) => encode_tenant(name, c),
        }
    }
}

/// Validate and encode one document.
pub fn encode(doc: &ScenarioDocument, case: CaseTag) -> Result<SmtScript, EncodeError> {
    let invariant = Invariant::from_document(doc, case)?;
    Ok(invariant.to_script(&doc.name()))
}

/// Registry pinning: a violation is a registry that is not exactly one of
/// the allowed entries. With `prefix_bad`, the registry must additionally
/// start with the first allowed entry (the attacker-suffix shape).
///
/// The two conjuncts are independent, so satisfiability is decided by the
/// exact-match check; `prefix_bad` can only rule a violation out.
pub fn encode_registry(name: &str, case: &RegistryCase) -> SmtScript {
    let mut script = SmtScript::new();
    script.comment(format!("registry case: {name}"));
    let registry = script.declare("registry", SmtSort::String);

    script.assert_with_comment(
        "pin to test_registry",
        registry.clone().eq(SmtTerm::string(&case.test_registry)),
    );

    let exact = case
        .allowed_registries
        .iter()
        .map(|allowed| registry.clone().eq(SmtTerm::string(allowed)))
        .collect();
    let allowed = script.define("allowed", SmtSort::Bool, SmtTerm::or(exact));

    if case.prefix_bad {
        if let Some(first) = case.allowed_registries.first() {
            script.assert_with_comment(
                "prefix match against the first allowed registry",
                SmtTerm::string(first).prefix_of(registry),
            );
        }
    }

    script.assert_with_comment("only exact matches are allowed", allowed.not());
    script
}

/// Wildcard bindings: a violation is a non-admin subject holding a
/// wildcard-scoped role binding.
pub fn encode_wildcard(name: &str, case: &WildcardCase) -> SmtScript {
    let mut script = SmtScript::new();
    script.comment(format!("wildcard role-binding case: {name}"));
    let kind = script.declare("kind", SmtSort::String);
    let action = script.declare("action", SmtSort::String);
    let is_admin = script.declare("isAdmin", SmtSort::Bool);
    let has_wildcard = script.declare("hasWildcard", SmtSort::Bool);

    script.assert(kind.eq(SmtTerm::string(&case.resource_kind)));
    script.assert(action.eq(SmtTerm::string(&case.action)));
    script.assert(is_admin.clone().eq(SmtTerm::bool(case.subject_is_admin)));
    script.assert(has_wildcard.clone().eq(SmtTerm::bool(case.wildcard_present)));

    script.assert_with_comment(
        "non-admin with wildcard is forbidden",
        SmtTerm::and(vec![is_admin.not(), has_wildcard]),
    );
    script
}

/// Tenant isolation: a violation is a subject and resource in different
/// tenants.
pub fn encode_tenant(name: &str, case: &TenantCase) -> SmtScript {
    let mut script = SmtScript::new();
    script.comment(format!("tenant isolation case: {name}"));
    let sub = script.declare("subTenant", SmtSort::String);
    let res = script.declare("resTenant", SmtSort::String);

    script.assert(sub.clone().eq(SmtTerm::string(&case.subject_tenant)));
    script.assert(res.clone().eq(SmtTerm::string(&case.resource_tenant)));

    script.assert_with_comment("cross-tenant access is forbidden", sub.eq(res).not());
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> ScenarioDocument {
        ScenarioDocument::new("inline.yaml", 0, serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn registry_script_with_prefix() {
        let script = encode(
            &doc(
                "name: suffix-attack\n\
                 case: registry\n\
                 allowed_registries: [myregistry.com, other.io]\n\
                 test_registry: myregistry.com.attacker.com\n\
                 prefix_bad: true\n",
            ),
            CaseTag::Registry,
        )
        .unwrap();
        assert_eq!(
            script.to_smtlib(),
            "; registry case: suffix-attack\n\
             (set-logic QF_S)\n\
             (declare-fun registry () String)\n\
             (define-fun allowed () Bool (or (= registry \"myregistry.com\") (= registry \"other.io\")))\n\
             ; pin to test_registry\n\
             (assert (= registry \"myregistry.com.attacker.com\"))\n\
             ; prefix match against the first allowed registry\n\
             (assert (str.prefixof \"myregistry.com\" registry))\n\
             ; only exact matches are allowed\n\
             (assert (not allowed))\n\
             (check-sat)\n\
             (get-model)\n"
        );
    }

    #[test]
    fn registry_prefix_defaults_off() {
        let invariant = Invariant::from_document(
            &doc("case: registry\nallowed_registries: [a]\ntest_registry: a\n"),
            CaseTag::Registry,
        )
        .unwrap();
        match &invariant {
            Invariant::Registry(c) => assert!(!c.prefix_bad),
            other => panic!("unexpected invariant: {other:?}"),
        }
        assert!(!invariant.to_script("x").to_smtlib().contains("str.prefixof"));
    }

    #[test]
    fn registry_requires_nonempty_allow_list() {
        let err = encode(
            &doc("case: registry\nallowed_registries: []\ntest_registry: a\n"),
            CaseTag::Registry,
        )
        .unwrap_err();
        assert!(matches!(err, EncodeError::Invalid(_)));
    }

    #[test]
    fn literals_past_the_solver_alphabet_are_invalid() {
        let err = encode(
            &doc("case: tenant\nsubject_tenant: \"a\\U000E0001\"\nresource_tenant: a\n"),
            CaseTag::Tenant,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EncodeError::Invalid(
                "'subject_tenant' contains U+E0001, which solver strings cannot hold".into()
            )
        );

        let err = encode(
            &doc("case: registry\nallowed_registries: [a, \"\\U0010FFFF\"]\ntest_registry: a\n"),
            CaseTag::Registry,
        )
        .unwrap_err();
        assert!(matches!(err, EncodeError::Invalid(ref m) if m.contains("allowed_registries")));

        assert!(encode(
            &doc("case: tenant\nsubject_tenant: \"\\u00e9\"\nresource_tenant: a\n"),
            CaseTag::Tenant,
        )
        .is_ok());
    }

    #[test]
    fn wildcard_script_grounds_all_symbols() {
        let text = encode(
            &doc(
                "case: wildcard\nresource_kind: pods\naction: delete\n\
                 subject_is_admin: false\nwildcard_present: true\n",
            ),
            CaseTag::Wildcard,
        )
        .unwrap()
        .to_smtlib();
        assert!(text.contains("(declare-fun isAdmin () Bool)"));
        assert!(text.contains("(assert (= kind \"pods\"))"));
        assert!(text.contains("(assert (= action \"delete\"))"));
        assert!(text.contains("(assert (= isAdmin false))"));
        assert!(text.contains("(assert (= hasWildcard true))"));
        assert!(text.contains("(assert (and (not isAdmin) hasWildcard))"));
    }

    #[test]
    fn tenant_script_asserts_disequality() {
        let text = encode(
            &doc("case: tenant\nsubject_tenant: a\nresource_tenant: b\n"),
            CaseTag::Tenant,
        )
        .unwrap()
        .to_smtlib();
        assert!(text.contains("(assert (= subTenant \"a\"))"));
        assert!(text.contains("(assert (= resTenant \"b\"))"));
        assert!(text.contains("(assert (not (= subTenant resTenant)))"));
    }

    #[test]
    fn missing_field_is_named() {
        let err = encode(&doc("case: tenant\nsubject_tenant: a\n"), CaseTag::Tenant).unwrap_err();
        assert_eq!(
            err,
            EncodeError::MissingField {
                field: "resource_tenant"
            }
        );
        assert_eq!(err.to_string(), "missing key 'resource_tenant'");
    }

    #[test]
    fn null_field_counts_as_missing() {
        let err = encode(
            &doc("case: registry\nallowed_registries: [a]\ntest_registry:\n"),
            CaseTag::Registry,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EncodeError::MissingField {
                field: "test_registry"
            }
        );
    }

    #[test]
    fn wrong_type_is_invalid() {
        let err = encode(
            &doc(
                "case: wildcard\nresource_kind: pods\naction: get\n\
                 subject_is_admin: [yes]\nwildcard_present: true\n",
            ),
            CaseTag::Wildcard,
        )
        .unwrap_err();
        match err {
            EncodeError::Invalid(msg) => assert!(msg.starts_with("invalid wildcard scenario")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn hostile_values_are_escaped() {
        let text = encode(
            &doc(
                "name: \"x\\n(assert false)\"\ncase: tenant\n\
                 subject_tenant: 'a\") (assert false) (\"'\nresource_tenant: b\n",
            ),
            CaseTag::Tenant,
        )
        .unwrap()
        .to_smtlib();
        assert!(text.starts_with("; tenant isolation case: x (assert false)\n"));
        assert!(text.contains("(assert (= subTenant \"a\"\") (assert false) (\"\"\"))"));
        assert!(!text.contains("\n(assert false)"));
    }
}
