//! Deferred and repeating callbacks

struct DelayedTask {
    remaining: f32,
    task: Box<dyn FnOnce()>,
}

/// Runs one-shot tasks after a delay and repeating tasks until they finish
///
/// Tasks have no cancellation handle; [`Scheduler::dispose`] drops them all.
#[derive(Default)]
pub struct Scheduler {
    delayed: Vec<DelayedTask>,
    repeating: Vec<Box<dyn FnMut() -> bool>>,
}

impl Scheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once, after `delay` seconds of accumulated update time
    pub fn add_delayed_task(&mut self, task: impl FnOnce() + 'static, delay: f32) {
        self.delayed.push(DelayedTask {
            remaining: delay,
            task: Box::new(task),
        });
    }

    /// Run `task` every update until it returns `true`
    pub fn add_repeating_task(&mut self, task: impl FnMut() -> bool + 'static) {
        self.repeating.push(Box::new(task));
    }

    /// Advance delayed tasks by `delta_time`, fire the due ones, then run repeating tasks
    pub fn update(&mut self, delta_time: f32) {
        let mut due = Vec::new();
        let mut index = 0;
        while index < self.delayed.len() {
            self.delayed[index].remaining -= delta_time;
            if self.delayed[index].remaining <= 0.0 {
                due.push(self.delayed.remove(index));
            } else {
                index += 1;
            }
        }
        for DelayedTask { task, .. } in due {
            task();
        }

        self.repeating.retain_mut(|task| !task());
    }

    /// Number of delayed tasks still waiting
    pub fn delayed_count(&self) -> usize {
        self.delayed.len()
    }

    /// Number of repeating tasks still running
    pub fn repeating_count(&self) -> usize {
        self.repeating.len()
    }

    /// Drop every task without running it
    pub fn dispose(&mut self) {
        log::debug!(
            "Disposing scheduler ({} delayed, {} repeating)",
            self.delayed.len(),
            self.repeating.len()
        );
        self.delayed.clear();
        self.repeating.clear();
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("delayed", &self.delayed.len())
            .field("repeating", &self.repeating.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_delayed_task_fires_once_after_delay() {
        let fired = Rc::new(Cell::new(0));
        let mut scheduler = Scheduler::new();
        let counter = Rc::clone(&fired);
        scheduler.add_delayed_task(move || counter.set(counter.get() + 1), 2.0);

        scheduler.update(1.0);
        assert_eq!(fired.get(), 0);
        scheduler.update(1.0);
        assert_eq!(fired.get(), 1);
        scheduler.update(1.0);
        assert_eq!(fired.get(), 1);
        assert_eq!(scheduler.delayed_count(), 0);
    }

    #[test]
    fn test_zero_delay_fires_on_next_update() {
        let fired = Rc::new(Cell::new(false));
        let mut scheduler = Scheduler::new();
        let flag = Rc::clone(&fired);
        scheduler.add_delayed_task(move || flag.set(true), 0.0);

        assert!(!fired.get());
        scheduler.update(0.0);
        assert!(fired.get());
    }

    #[test]
    fn test_repeating_task_runs_until_done() {
        let runs = Rc::new(Cell::new(0));
        let mut scheduler = Scheduler::new();
        let counter = Rc::clone(&runs);
        scheduler.add_repeating_task(move || {
            counter.set(counter.get() + 1);
            counter.get() == 3
        });

        for _ in 0..5 {
            scheduler.update(0.1);
        }
        assert_eq!(runs.get(), 3);
        assert_eq!(scheduler.repeating_count(), 0);
    }

    #[test]
    fn test_dispose_drops_tasks_unrun() {
        let fired = Rc::new(Cell::new(false));
        let mut scheduler = Scheduler::new();
        let flag = Rc::clone(&fired);
        scheduler.add_delayed_task(move || flag.set(true), 1.0);
        scheduler.add_repeating_task(|| false);

        scheduler.dispose();
        scheduler.update(5.0);
        assert!(!fired.get());
        assert_eq!(scheduler.delayed_count(), 0);
        assert_eq!(scheduler.repeating_count(), 0);
    }
}
