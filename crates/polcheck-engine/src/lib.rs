#![doc = include_str!("../README.md")]

//! Policy invariant checking engine.
//!
//! This crate loads scenario documents, encodes each one for its invariant
//! class, hands the script to a [`polcheck_smt::solver::SolverBackend`] and
//! classifies the verdict. One malformed scenario never stops a batch.

pub mod encoder;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod result;
pub mod scenario;
