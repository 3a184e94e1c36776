//! Measure scheduling
//!
//! Decides when overflow work is due without owning a timer. Callers report
//! mutations and resolution-check requests, then ask [`MeasureScheduler::due`]
//! with the current time. A driver sleeps until
//! [`MeasureScheduler::next_deadline`] and asks again.
//!
//! Requests are armed on the next `due` call, so the delay is measured from
//! when the driver first sees them. A new mutation restarts the debounce. The
//! interval tick runs independently until [`MeasureScheduler::stop`].

use crate::types::CategoryId;
use std::time::{Duration, Instant};

/// Default debounce after a structural mutation
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

/// Default delay between a category landing and its resolution check
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(400);

/// Default period of the background full pass
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// Delays used by [`MeasureScheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub debounce: Duration,
    pub settle: Duration,
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            settle: DEFAULT_SETTLE,
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// A unit of overflow work that is due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledPass {
    /// Re-measure every page and replace the overflow map
    Full,
    /// Re-measure the page holding this category and prompt if needed
    Check(CategoryId),
}

#[derive(Debug, Clone, Default)]
pub struct MeasureScheduler {
    config: SchedulerConfig,
    full_requested: bool,
    check_requests: Vec<CategoryId>,
    full_deadline: Option<Instant>,
    check_deadlines: Vec<(Instant, CategoryId)>,
    next_tick: Option<Instant>,
}

impl MeasureScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// A structural mutation happened; (re)start the debounce
    pub fn note_mutation(&mut self) {
        self.full_requested = true;
    }

    /// `category` just landed somewhere; check its page after the settle delay
    pub fn note_check(&mut self, category: CategoryId) {
        if !self.check_requests.contains(&category) {
            self.check_requests.push(category);
        }
    }

    /// Start the interval tick; the first tick is one interval from `now`
    pub fn start(&mut self, now: Instant) {
        self.next_tick = Some(now + self.config.interval);
    }

    /// Stop everything, including the interval
    pub fn stop(&mut self) {
        self.next_tick = None;
        self.full_requested = false;
        self.check_requests.clear();
        self.full_deadline = None;
        self.check_deadlines.clear();
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Whether any debounced pass or check is armed or waiting to be armed
    pub fn has_pending(&self) -> bool {
        self.full_requested
            || !self.check_requests.is_empty()
            || self.full_deadline.is_some()
            || !self.check_deadlines.is_empty()
    }

    fn arm(&mut self, now: Instant) {
        if std::mem::take(&mut self.full_requested) {
            self.full_deadline = Some(now + self.config.debounce);
        }
        for category in std::mem::take(&mut self.check_requests) {
            self.check_deadlines.retain(|(_, pending)| *pending != category);
            self.check_deadlines
                .push((now + self.config.settle, category));
        }
    }

    /// Work due at `now`. A full pass appears at most once even when the
    /// debounce and the interval fire together; it comes before any checks.
    pub fn due(&mut self, now: Instant) -> Vec<ScheduledPass> {
        self.arm(now);
        let mut passes = Vec::new();

        let debounced = self.full_deadline.is_some_and(|deadline| deadline <= now);
        if debounced {
            self.full_deadline = None;
        }
        let ticked = self.next_tick.is_some_and(|tick| tick <= now);
        if ticked {
            self.next_tick = Some(now + self.config.interval);
        }
        if debounced || ticked {
            log::debug!("Full pass due (debounce: {debounced}, interval: {ticked})");
            passes.push(ScheduledPass::Full);
        }

        let mut fired: Vec<(Instant, CategoryId)> = Vec::new();
        self.check_deadlines.retain(|&(deadline, category)| {
            if deadline <= now {
                fired.push((deadline, category));
                false
            } else {
                true
            }
        });
        fired.sort_by_key(|(deadline, _)| *deadline);
        passes.extend(fired.into_iter().map(|(_, category)| ScheduledPass::Check(category)));

        passes
    }

    /// Earliest armed deadline. Unarmed requests have none until the next
    /// [`due`](Self::due) call.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.full_deadline
            .into_iter()
            .chain(self.next_tick)
            .chain(self.check_deadlines.iter().map(|(deadline, _)| *deadline))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_debounce_restarts_on_new_mutation() {
        let t0 = Instant::now();
        let mut scheduler = MeasureScheduler::new(SchedulerConfig::default());

        scheduler.note_mutation();
        assert!(scheduler.due(t0).is_empty());
        assert_eq!(scheduler.next_deadline(), Some(t0 + ms(400)));

        scheduler.note_mutation();
        assert!(scheduler.due(t0 + ms(300)).is_empty());
        assert!(scheduler.due(t0 + ms(450)).is_empty());
        assert_eq!(scheduler.due(t0 + ms(700)), vec![ScheduledPass::Full]);
        assert!(!scheduler.has_pending());
    }

    #[test]
    fn test_interval_and_debounce_collapse_into_one_pass() {
        let t0 = Instant::now();
        let mut scheduler = MeasureScheduler::new(SchedulerConfig::default());
        scheduler.start(t0);

        scheduler.note_mutation();
        scheduler.due(t0 + ms(1_600));
        assert_eq!(scheduler.due(t0 + ms(2_010)), vec![ScheduledPass::Full]);
        assert_eq!(scheduler.next_deadline(), Some(t0 + ms(4_010)));
    }

    #[test]
    fn test_check_after_settle_delay() {
        let t0 = Instant::now();
        let mut scheduler = MeasureScheduler::new(SchedulerConfig::default());
        let category = CategoryId(3);

        scheduler.note_mutation();
        scheduler.note_check(category);
        assert!(scheduler.due(t0).is_empty());
        assert_eq!(
            scheduler.due(t0 + ms(400)),
            vec![ScheduledPass::Full, ScheduledPass::Check(category)]
        );
    }

    #[test]
    fn test_stop_clears_interval() {
        let t0 = Instant::now();
        let mut scheduler = MeasureScheduler::new(SchedulerConfig::default());
        scheduler.start(t0);
        assert!(scheduler.is_running());
        scheduler.stop();
        assert_eq!(scheduler.next_deadline(), None);
        assert!(scheduler.due(t0 + ms(10_000)).is_empty());
    }
}
