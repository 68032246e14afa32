use std::fmt::Write as _;

use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

/// Print an SmtTerm as SMT-LIB2 format.
pub fn to_smtlib(term: &SmtTerm) -> String {
    match term {
        SmtTerm::Var(name) => name.clone(),
        SmtTerm::StrLit(s) => quote_string(s),
        SmtTerm::BoolLit(b) => {
            if *b {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        SmtTerm::Eq(lhs, rhs) => format!("(= {} {})", to_smtlib(lhs), to_smtlib(rhs)),
        SmtTerm::And(terms) => {
            if terms.is_empty() {
                "true".to_string()
            } else if terms.len() == 1 {
                to_smtlib(&terms[0])
            } else {
                let inner: Vec<String> = terms.iter().map(to_smtlib).collect();
                format!("(and {})", inner.join(" "))
            }
        }
        SmtTerm::Or(terms) => {
            if terms.is_empty() {
                "false".to_string()
            } else if terms.len() == 1 {
                to_smtlib(&terms[0])
            } else {
                let inner: Vec<String> = terms.iter().map(to_smtlib).collect();
                format!("(or {})", inner.join(" "))
            }
        }
        SmtTerm::Not(inner) => format!("(not {})", to_smtlib(inner)),
        SmtTerm::PrefixOf(prefix, s) => {
            format!("(str.prefixof {} {})", to_smtlib(prefix), to_smtlib(s))
        }
    }
}

/// Print a sort as SMT-LIB2 format.
pub fn sort_to_smtlib(sort: &SmtSort) -> &'static str {
    match sort {
        SmtSort::Bool => "Bool",
        SmtSort::String => "String",
    }
}

/// Largest code point an SMT-LIB 2.6 string literal can carry.
pub const MAX_STRING_CODE_POINT: u32 = 0x2FFFF;

/// First character of `raw` above [`MAX_STRING_CODE_POINT`], if any.
pub fn unrepresentable_char(raw: &str) -> Option<char> {
    raw.chars().find(|&c| u32::from(c) > MAX_STRING_CODE_POINT)
}

/// Render `raw` as an SMT-LIB 2.6 string literal.
///
/// Double quotes are doubled. Backslash and anything outside printable
/// ASCII become `\u{..}` escapes, so `\u` sequences in the input can
/// never be reinterpreted by the solver. Solvers reject escapes above
/// [`MAX_STRING_CODE_POINT`]; check with [`unrepresentable_char`] first.
pub fn quote_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for ch in raw.chars() {
        match ch {
            '"' => out.push_str("\"\""),
            '\\' => out.push_str("\\u{5c}"),
            ' '..='~' => out.push(ch),
            other => {
                let _ = write!(out, "\\u{{{:x}}}", u32::from(other));
            }
        }
    }
    out.push('"');
    out
}

/// Flatten text onto one line, for use after a `;` comment marker or in
/// any other line-oriented output.
pub fn sanitize_comment(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_control() || c == '\u{2028}' || c == '\u{2029}' {
                ' '
            } else {
                c
            }
        })
        .collect()
}
