/// Abstract SMT term representation, solver-agnostic.
///
/// String literals are kept raw here; quoting happens only when the term
/// is printed, so scenario data never reaches the solver unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtTerm {
    /// Symbol reference by name.
    Var(String),
    /// String literal (unescaped).
    StrLit(String),
    /// Boolean literal.
    BoolLit(bool),

    Eq(Box<SmtTerm>, Box<SmtTerm>),

    // Boolean logic
    And(Vec<SmtTerm>),
    Or(Vec<SmtTerm>),
    Not(Box<SmtTerm>),

    /// `(str.prefixof prefix s)`: `prefix` is a prefix of `s`.
    PrefixOf(Box<SmtTerm>, Box<SmtTerm>),
}

#[allow(clippy::should_implement_trait)]
impl SmtTerm {
    pub fn var(name: impl Into<String>) -> Self {
        SmtTerm::Var(name.into())
    }

    pub fn string(s: impl Into<String>) -> Self {
        SmtTerm::StrLit(s.into())
    }

    pub fn bool(b: bool) -> Self {
        SmtTerm::BoolLit(b)
    }

    pub fn eq(self, other: SmtTerm) -> Self {
        SmtTerm::Eq(Box::new(self), Box::new(other))
    }

    pub fn and(terms: Vec<SmtTerm>) -> Self {
        SmtTerm::And(terms)
    }

    pub fn or(terms: Vec<SmtTerm>) -> Self {
        SmtTerm::Or(terms)
    }

    pub fn not(self) -> Self {
        SmtTerm::Not(Box::new(self))
    }

    /// `self` is a textual prefix of `other`.
    pub fn prefix_of(self, other: SmtTerm) -> Self {
        SmtTerm::PrefixOf(Box::new(self), Box::new(other))
    }
}
