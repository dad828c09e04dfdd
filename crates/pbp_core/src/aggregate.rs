use crate::records::FailureRecord;
use crate::table::{Table, TableRow};

/// What one worker produced for its chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialResult<R> {
    pub worker_id: usize,
    pub successes: Vec<R>,
    pub failures: Vec<FailureRecord>,
}

impl<R> PartialResult<R> {
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// Final success and failure records of one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateResult<R> {
    pub successes: Vec<R>,
    pub failures: Vec<FailureRecord>,
}

impl<R> Default for AggregateResult<R> {
    fn default() -> Self {
        Self {
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<R: TableRow> AggregateResult<R> {
    pub fn success_table(&self) -> Table {
        Table::from_records(&self.successes)
    }

    pub fn failure_table(&self) -> Table {
        Table::from_records(&self.failures)
    }
}

/// Concatenate partial results in the order given.
pub fn aggregate<R>(partials: impl IntoIterator<Item = PartialResult<R>>) -> AggregateResult<R> {
    partials
        .into_iter()
        .fold(AggregateResult::default(), |mut acc, partial| {
            acc.successes.extend(partial.successes);
            acc.failures.extend(partial.failures);
            acc
        })
}
