use crate::grid::Position;
use crate::statistics::SearchStats;
use std::ops::ControlFlow;

/// Snapshot handed to a [`SearchObserver`] after each expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<'a> {
    /// 1-based expansion number within this search.
    pub index: usize,
    /// The cell just expanded. It is not re-enqueued unless later reached
    /// with a strictly smaller cost, which is what a renderer calls "closed".
    pub current: Position,
    pub g: u32,
    pub f: u32,
    /// Cells pushed onto the frontier while expanding `current`.
    pub opened: &'a [Position],
    pub frontier_len: usize,
}

/// Hook invoked synchronously by the search engine.
///
/// Returning `ControlFlow::Break(())` from [`SearchObserver::on_expand`]
/// cancels the search before the next expansion.
pub trait SearchObserver {
    fn on_expand(&mut self, step: &Step<'_>) -> ControlFlow<()>;

    /// Called once with the reconstructed path when the goal is reached.
    fn on_path(&mut self, _path: &[Position]) {}
}

impl<F> SearchObserver for F
where
    F: FnMut(&Step<'_>) -> ControlFlow<()>,
{
    fn on_expand(&mut self, step: &Step<'_>) -> ControlFlow<()> {
        self(step)
    }
}

/// Turns a closure into an observer, fixing its signature to the
/// higher-ranked `FnMut(&Step<'_>)` the blanket impl expects.
pub fn observer_fn<F>(f: F) -> F
where
    F: FnMut(&Step<'_>) -> ControlFlow<()>,
{
    f
}

/// Observer that never stops the search.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoObserver;

impl SearchObserver for NoObserver {
    fn on_expand(&mut self, _step: &Step<'_>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The goal was popped from the frontier.
    Reached,
    /// The frontier emptied without reaching the goal.
    Exhausted,
    /// The observer asked the search to stop.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub termination: Termination,
    /// Start to goal, excluding the start and including the goal. Empty
    /// unless the goal was reached.
    pub path: Vec<Position>,
    pub stats: SearchStats,
}

impl SearchOutcome {
    pub fn found(&self) -> bool {
        self.termination == Termination::Reached
    }

    /// Number of unit steps along the path.
    pub fn cost(&self) -> usize {
        self.path.len()
    }
}
