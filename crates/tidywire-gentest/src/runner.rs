//! Exception-isolating test runner and failure reporting.
//!
//! A test pairs a generator with an assertion. The runner walks the whole
//! index range without short-circuiting and records one outcome per
//! failing index: a semantic `Fail` when the assertion returns a reason,
//! or an `Exception` when the generator or assertion itself panics. One
//! crashing sample can therefore never abort the run.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use log::{error, info};
use tidywire_schematic::Sheet;

use crate::gen::Gen;

/// Why a sample index was recorded in a [`TestResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    /// The assertion returned a failure reason: the geometry is wrong.
    Fail(String),
    /// The generator or assertion code itself crashed.
    Exception(String),
}

/// A named property: generator, starting index, and an assertion mapping
/// (index, sample) to an optional failure reason.
pub struct Test<T> {
    pub name: String,
    pub gen: Gen<T>,
    pub start: usize,
    pub assertion: Rc<dyn Fn(usize, &T) -> Option<String>>,
}

impl<T> Clone for Test<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            gen: self.gen.clone(),
            start: self.start,
            assertion: Rc::clone(&self.assertion),
        }
    }
}

impl<T: 'static> Test<T> {
    pub fn new(
        name: impl Into<String>,
        gen: Gen<T>,
        assertion: impl Fn(usize, &T) -> Option<String> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            gen,
            start: 0,
            assertion: Rc::new(assertion),
        }
    }

    pub fn starting_at(mut self, start: usize) -> Self {
        self.start = start;
        self
    }
}

/// Ordered (index, outcome) list for one run. Empty `errors` means a full
/// pass. `start` records where the run began so failures can be resumed.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub name: String,
    pub start: usize,
    pub errors: Vec<(usize, TestOutcome)>,
}

impl TestResult {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    /// Lowest-indexed recorded failure.
    pub fn first_failure(&self) -> Option<&(usize, TestOutcome)> {
        self.errors.first()
    }
}

/// Run every index from `test.start` to the end of the generator.
pub fn run_tests<T: 'static>(test: &Test<T>) -> TestResult {
    let mut errors = Vec::new();
    for index in test.start..test.gen.size() {
        let sample = match catch_unwind(AssertUnwindSafe(|| test.gen.value(index))) {
            Ok(sample) => sample,
            Err(payload) => {
                errors.push((index, TestOutcome::Exception(panic_message(payload))));
                continue;
            }
        };
        match catch_unwind(AssertUnwindSafe(|| (test.assertion)(index, &sample))) {
            Ok(None) => {}
            Ok(Some(reason)) => errors.push((index, TestOutcome::Fail(reason))),
            Err(payload) => errors.push((index, TestOutcome::Exception(panic_message(payload)))),
        }
    }
    info!(
        "test '{}': {} sample(s), {} error(s)",
        test.name,
        test.gen.size().saturating_sub(test.start),
        errors.len()
    );
    TestResult {
        name: test.name.clone(),
        start: test.start,
        errors,
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_owned()
    }
}

// --- Reporting -------------------------------------------------------------

/// Host display contract: receives the first failing sample's model for
/// human inspection. No return value, no other obligations.
pub trait FailureSink {
    fn show_failing_sample(&mut self, sheet: &Sheet);
}

/// Default sink: logs the sheet's JSON dump.
#[derive(Debug, Default)]
pub struct JsonLogSink;

impl FailureSink for JsonLogSink {
    fn show_failing_sample(&mut self, sheet: &Sheet) {
        let dump = sheet
            .to_json()
            .unwrap_or_else(|e| format!("<sheet not serialisable: {e}>"));
        error!("failing sample:\n{dump}");
    }
}

/// Externally-owned replay state: which (test, sample) failed last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub last_failure: Option<(String, usize)>,
}

/// Surface the first (lowest-indexed) failure of a run: regenerate that
/// sample for display, hand it to the sink, and record (test, index) in
/// the session so the run can later resume one index further on.
pub fn report_first_failure(
    test: &Test<Sheet>,
    result: &TestResult,
    sink: &mut dyn FailureSink,
    session: &mut Session,
) -> Option<(usize, TestOutcome)> {
    let (index, outcome) = result.first_failure()?.clone();
    // Regeneration can crash again if the outcome was an Exception from
    // the generator; guard it the same way the runner does.
    if let Ok(sheet) = catch_unwind(AssertUnwindSafe(|| test.gen.value(index))) {
        sink.show_failing_sample(&sheet);
    }
    error!("test '{}' failed at sample {index}: {outcome:?}", test.name);
    session.last_failure = Some((test.name.clone(), index));
    Some((index, outcome))
}

/// Re-run the named test starting one sample past the recorded failure.
/// Returns `None` when the session holds no failure for this test.
pub fn resume_after_failure(test: &Test<Sheet>, session: &Session) -> Option<TestResult> {
    let (name, index) = session.last_failure.as_ref()?;
    if *name != test.name {
        return None;
    }
    let resumed = test.clone().starting_at(index + 1);
    Some(run_tests(&resumed))
}
