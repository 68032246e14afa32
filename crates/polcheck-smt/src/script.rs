//! Structured SMT-LIB2 programs.
//!
//! A script is assembled from declarations, definitions and assertions and
//! only turned into text by [`SmtScript::to_smtlib`], which always emits the
//! sections in the same order: logic, header comments, declarations,
//! definitions, assertions, `(check-sat)`, `(get-model)`.

use crate::backends::smtlib_printer::{sanitize_comment, sort_to_smtlib, to_smtlib};
use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

/// Logic declared by every script.
pub const LOGIC: &str = "QF_S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub sort: SmtSort,
}

/// A nullary `define-fun`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    pub sort: SmtSort,
    pub body: SmtTerm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    pub comment: Option<String>,
    pub term: SmtTerm,
}

/// One solver program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SmtScript {
    header: Vec<String>,
    declarations: Vec<Declaration>,
    definitions: Vec<Definition>,
    assertions: Vec<Assertion>,
}

impl SmtScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leading comment line.
    pub fn comment(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.header.push(sanitize_comment(text.as_ref()));
        self
    }

    /// `(declare-fun name () sort)`; returns a reference to the symbol.
    pub fn declare(&mut self, name: &str, sort: SmtSort) -> SmtTerm {
        self.declarations.push(Declaration {
            name: name.to_string(),
            sort,
        });
        SmtTerm::var(name)
    }

    /// `(define-fun name () sort body)`; returns a reference to the symbol.
    pub fn define(&mut self, name: &str, sort: SmtSort, body: SmtTerm) -> SmtTerm {
        self.definitions.push(Definition {
            name: name.to_string(),
            sort,
            body,
        });
        SmtTerm::var(name)
    }

    pub fn assert(&mut self, term: SmtTerm) -> &mut Self {
        self.assertions.push(Assertion {
            comment: None,
            term,
        });
        self
    }

    pub fn assert_with_comment(&mut self, comment: &str, term: SmtTerm) -> &mut Self {
        self.assertions.push(Assertion {
            comment: Some(sanitize_comment(comment)),
            term,
        });
        self
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    /// Serialize the whole program as SMT-LIB2 text.
    pub fn to_smtlib(&self) -> String {
        let mut out = String::new();
        for line in &self.header {
            out.push_str("; ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&format!("(set-logic {LOGIC})\n"));
        for decl in &self.declarations {
            out.push_str(&format!(
                "(declare-fun {} () {})\n",
                decl.name,
                sort_to_smtlib(&decl.sort)
            ));
        }
        for def in &self.definitions {
            out.push_str(&format!(
                "(define-fun {} () {} {})\n",
                def.name,
                sort_to_smtlib(&def.sort),
                to_smtlib(&def.body)
            ));
        }
        for assertion in &self.assertions {
            if let Some(comment) = &assertion.comment {
                out.push_str("; ");
                out.push_str(comment);
                out.push('\n');
            }
            out.push_str(&format!("(assert {})\n", to_smtlib(&assertion.term)));
        }
        out.push_str("(check-sat)\n");
        out.push_str("(get-model)\n");
        out
    }
}
