use std::sync::Arc;

/// How many parallel slots to keep free for the host, per concurrent view a
/// unit holds open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelismPolicy {
    pub reserve: usize,
    pub views_per_unit: usize,
}

impl ParallelismPolicy {
    /// Stages that keep a single view open per unit.
    pub const SINGLE_VIEW: Self = Self {
        reserve: 2,
        views_per_unit: 1,
    };

    /// Stages that open a secondary view per unit, such as match discovery.
    pub const DUAL_VIEW: Self = Self {
        reserve: 2,
        views_per_unit: 2,
    };

    pub fn reserved(&self) -> usize {
        self.reserve * self.views_per_unit.max(1)
    }

    /// One worker when the unit count is below the spare capacity,
    /// otherwise every slot that is not reserved.
    pub fn worker_count(&self, units: usize, available: usize) -> usize {
        let spare = available.saturating_sub(self.reserved()).max(1);
        if units < spare {
            1
        } else {
            spare
        }
    }
}

/// A chunk of units handed to exactly one worker.
#[derive(Debug)]
pub struct Assignment<U, C> {
    pub worker_id: usize,
    pub units: Vec<U>,
    pub config: Arc<C>,
}

/// Split `units` into contiguous `ceil(N / workers)`-sized chunks, keeping
/// input order. No chunk is empty; fewer than `workers` chunks come back when
/// the sizes do not divide evenly.
pub fn split_into_chunks<U>(units: Vec<U>, workers: usize) -> Vec<Vec<U>> {
    if units.is_empty() {
        return Vec::new();
    }
    let workers = workers.max(1);
    let chunk_size = units.len().div_ceil(workers);

    let mut chunks = Vec::with_capacity(workers);
    let mut rest = units;
    while !rest.is_empty() {
        let tail = rest.split_off(chunk_size.min(rest.len()));
        chunks.push(rest);
        rest = tail;
    }
    chunks
}

/// Partition units for a stage. Worker ids start at 1.
pub fn partition<U, C>(
    units: Vec<U>,
    policy: ParallelismPolicy,
    available: usize,
    config: Arc<C>,
) -> Vec<Assignment<U, C>> {
    let workers = policy.worker_count(units.len(), available);
    split_into_chunks(units, workers)
        .into_iter()
        .enumerate()
        .map(|(index, units)| Assignment {
            worker_id: index + 1,
            units,
            config: Arc::clone(&config),
        })
        .collect()
}
