#![doc = include_str!("../README.md")]

//! SMT-LIB2 script construction and solver integration for policy
//! invariant checks.
//!
//! Scripts are built as structured values ([`script::SmtScript`]) and only
//! printed at the solver boundary, where string literals are escaped.
//! Solving goes through the [`solver::SolverBackend`] trait; the shipped
//! backend runs an external solver process per script.

pub mod backends;
pub mod script;
pub mod solver;
pub mod sorts;
pub mod terms;
