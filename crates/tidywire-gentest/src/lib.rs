//! # tidywire-gentest
//!
//! Generative testing for the layout engine: finite index-addressed
//! generators ([`gen::Gen`]), an exception-isolating runner that records
//! every failing sample instead of stopping at the first
//! ([`runner::run_tests`]), and a sample circuit library with reusable
//! layout invariants ([`samples`]).
//!
//! Failure replay is index-based. Each randomized generator seeds a fresh
//! rng from `(seed, index)`, so the sample that failed yesterday is the
//! sample you regenerate today.

pub mod gen;
pub mod runner;
pub mod samples;

pub use gen::Gen;
pub use runner::{
    report_first_failure, resume_after_failure, run_tests, FailureSink, JsonLogSink, Session,
    Test, TestOutcome, TestResult,
};
