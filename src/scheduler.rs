use crate::record::Millis;
use crate::throttle::Throttle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    Waiting,
    Running,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct PollScheduler<A> {
    interval_ms: u64,
    throttle: Throttle<A>,
    latest: Option<A>,
    next_tick_at: Option<Millis>,
    phase: SchedulerPhase,
}

impl<A: Clone> PollScheduler<A> {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            throttle: Throttle::new(interval_ms),
            latest: None,
            next_tick_at: None,
            phase: SchedulerPhase::Waiting,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    /// New data from the host. The first push starts the cadence timer.
    pub fn push(&mut self, args: A, now: Millis) -> Option<A> {
        match self.phase {
            SchedulerPhase::Cancelled => return None,
            SchedulerPhase::Waiting => {
                self.phase = SchedulerPhase::Running;
                self.next_tick_at = Some(now.saturating_add(self.interval_ms));
            }
            SchedulerPhase::Running => {}
        }
        self.latest = Some(args.clone());
        self.throttle.trigger(args, now)
    }

    /// Releases at most one due pass: a held-back push first, then a timer
    /// tick over the latest pushed arguments.
    pub fn poll(&mut self, now: Millis) -> Option<A> {
        if self.phase != SchedulerPhase::Running {
            return None;
        }
        if let Some(args) = self.throttle.expire(now) {
            return Some(args);
        }

        let tick_due = self.next_tick_at.is_some_and(|at| now >= at);
        if !tick_due {
            return None;
        }
        self.next_tick_at = Some(now.saturating_add(self.interval_ms));
        let latest = self.latest.clone()?;
        self.throttle.trigger(latest, now)
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        if self.phase != SchedulerPhase::Running {
            return None;
        }
        match (self.throttle.deadline(), self.next_tick_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Stops for good. Safe to call repeatedly and before the first push.
    pub fn cancel(&mut self) {
        self.phase = SchedulerPhase::Cancelled;
        self.throttle.reset();
        self.latest = None;
        self.next_tick_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{PollScheduler, SchedulerPhase};

    #[test]
    fn waits_for_first_push() {
        let mut scheduler: PollScheduler<&str> = PollScheduler::new(10_000);
        assert_eq!(scheduler.poll(50_000), None);
        assert_eq!(scheduler.next_deadline(), None);
        assert_eq!(scheduler.phase(), SchedulerPhase::Waiting);

        assert_eq!(scheduler.push("s1", 60_000), Some("s1"));
        assert_eq!(scheduler.phase(), SchedulerPhase::Running);
        assert_eq!(scheduler.next_deadline(), Some(70_000));
    }

    #[test]
    fn three_pushes_in_one_interval_run_twice() {
        let mut scheduler = PollScheduler::new(10_000);
        let mut passes = Vec::new();
        passes.extend(scheduler.push(1, 0));
        passes.extend(scheduler.push(2, 2_000));
        passes.extend(scheduler.push(3, 4_000));
        passes.extend(scheduler.poll(9_999));
        assert_eq!(passes, vec![1]);

        passes.extend(scheduler.poll(10_000));
        assert_eq!(passes, vec![1, 3]);

        // The cadence tick due at the same moment is throttled into the
        // window the trailing pass just opened.
        passes.extend(scheduler.poll(10_000));
        passes.extend(scheduler.poll(19_999));
        assert_eq!(passes, vec![1, 3]);
    }

    #[test]
    fn cadence_reruns_latest_arguments() {
        let mut scheduler = PollScheduler::new(1_000);
        assert_eq!(scheduler.push("state", 0), Some("state"));
        assert_eq!(scheduler.poll(1_000), Some("state"));
        assert_eq!(scheduler.poll(1_500), None);
        assert_eq!(scheduler.poll(2_000), Some("state"));
    }

    #[test]
    fn cancel_is_idempotent_and_final() {
        let mut never_started: PollScheduler<u8> = PollScheduler::new(1_000);
        never_started.cancel();
        never_started.cancel();
        assert_eq!(never_started.push(1, 0), None);

        let mut scheduler = PollScheduler::new(1_000);
        scheduler.push(1, 0);
        scheduler.push(2, 10);
        scheduler.cancel();
        assert_eq!(scheduler.poll(5_000), None);
        assert_eq!(scheduler.push(3, 6_000), None);
        assert_eq!(scheduler.next_deadline(), None);
        assert_eq!(scheduler.phase(), SchedulerPhase::Cancelled);
    }
}
