#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use polcheck_smt::backends::smtlib_printer::quote_string;
use polcheck_smt::script::SmtScript;
use polcheck_smt::solver::{SolverBackend, SolverError, Verdict};
use polcheck_smt::terms::SmtTerm;

pub fn scenarios_dir() -> PathBuf {
    PathBuf::from(format!("{}/../../scenarios", env!("CARGO_MANIFEST_DIR")))
}

#[derive(Debug, Clone, PartialEq)]
enum Val {
    Str(String),
    Bool(bool),
}

/// Decides fully grounded scripts without an external solver.
///
/// Every declared symbol is pinned by an `(assert (= sym literal))`, so the
/// script is satisfiable exactly when all assertions evaluate to true under
/// those bindings.
#[derive(Default)]
pub struct GroundEvaluator {
    pub scripts: RefCell<Vec<String>>,
}

impl GroundEvaluator {
    fn bindings(script: &SmtScript) -> HashMap<String, Val> {
        let mut env = HashMap::new();
        for assertion in script.assertions() {
            if let SmtTerm::Eq(lhs, rhs) = &assertion.term {
                match (lhs.as_ref(), rhs.as_ref()) {
                    (SmtTerm::Var(v), SmtTerm::StrLit(s)) => {
                        env.insert(v.clone(), Val::Str(s.clone()));
                    }
                    (SmtTerm::Var(v), SmtTerm::BoolLit(b)) => {
                        env.insert(v.clone(), Val::Bool(*b));
                    }
                    _ => {}
                }
            }
        }
        env
    }

    fn eval(script: &SmtScript, env: &HashMap<String, Val>, term: &SmtTerm) -> Val {
        match term {
            SmtTerm::Var(name) => {
                if let Some(v) = env.get(name) {
                    return v.clone();
                }
                let def = script
                    .definitions()
                    .iter()
                    .find(|d| &d.name == name)
                    .unwrap_or_else(|| panic!("ungrounded symbol {name}"));
                Self::eval(script, env, &def.body)
            }
            SmtTerm::StrLit(s) => Val::Str(s.clone()),
            SmtTerm::BoolLit(b) => Val::Bool(*b),
            SmtTerm::Eq(l, r) => Val::Bool(Self::eval(script, env, l) == Self::eval(script, env, r)),
            SmtTerm::And(ts) => Val::Bool(ts.iter().all(|t| Self::truth(script, env, t))),
            SmtTerm::Or(ts) => Val::Bool(ts.iter().any(|t| Self::truth(script, env, t))),
            SmtTerm::Not(t) => Val::Bool(!Self::truth(script, env, t)),
            SmtTerm::PrefixOf(p, s) => match (Self::eval(script, env, p), Self::eval(script, env, s)) {
                (Val::Str(p), Val::Str(s)) => Val::Bool(s.starts_with(&p)),
                other => panic!("str.prefixof on non-strings: {other:?}"),
            },
        }
    }

    fn truth(script: &SmtScript, env: &HashMap<String, Val>, term: &SmtTerm) -> bool {
        match Self::eval(script, env, term) {
            Val::Bool(b) => b,
            other => panic!("expected Bool, got {other:?}"),
        }
    }
}

impl SolverBackend for GroundEvaluator {
    fn name(&self) -> &str {
        "ground-evaluator"
    }

    fn solve(&self, script: &SmtScript) -> Result<Verdict, SolverError> {
        self.scripts.borrow_mut().push(script.to_smtlib());
        let env = Self::bindings(script);
        let sat = script
            .assertions()
            .iter()
            .all(|a| Self::truth(script, &env, &a.term));
        if !sat {
            return Ok(Verdict::unsat());
        }
        let mut model = vec!["(".to_string()];
        for decl in script.declarations() {
            let value = match &env[&decl.name] {
                Val::Str(s) => quote_string(s),
                Val::Bool(b) => b.to_string(),
            };
            model.push(format!("  (define-fun {} () {} {})", decl.name, decl.sort, value));
        }
        model.push(")".to_string());
        Ok(Verdict::sat(model.join("\n")))
    }
}

/// Backend that always fails with the error built by `make`.
pub struct FailingBackend<F: Fn() -> SolverError> {
    pub make: F,
}

impl<F: Fn() -> SolverError> SolverBackend for FailingBackend<F> {
    fn name(&self) -> &str {
        "failing"
    }

    fn solve(&self, _script: &SmtScript) -> Result<Verdict, SolverError> {
        Err((self.make)())
    }
}
