// Side effect fired when a cycle finishes on its own
use crate::domain::cycle::CycleProgress;

pub trait CompletionNotifier: Send + Sync {
    fn cycle_finished(&self, progress: &CycleProgress);
}
