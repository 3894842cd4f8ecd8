use crate::record::Millis;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrottleState<A> {
    Idle,
    Cooldown { until: Millis, pending: Option<A> },
}

/// Lets at most one call through per window. A trigger arriving during the
/// window is remembered (latest wins) and released once when it closes.
#[derive(Debug, Clone)]
pub struct Throttle<A> {
    window_ms: u64,
    state: ThrottleState<A>,
}

impl<A> Throttle<A> {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            state: ThrottleState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &ThrottleState<A> {
        &self.state
    }

    pub fn trigger(&mut self, args: A, now: Millis) -> Option<A> {
        // A window that already closed is settled before the new trigger.
        let trailing = self.expire(now);
        match &mut self.state {
            ThrottleState::Idle => {
                self.state = ThrottleState::Cooldown {
                    until: now.saturating_add(self.window_ms),
                    pending: None,
                };
                Some(args)
            }
            ThrottleState::Cooldown { pending, .. } => {
                *pending = Some(args);
                trailing
            }
        }
    }

    /// Closes the window if it has elapsed, releasing any pending arguments
    /// and opening a fresh window for them.
    pub fn expire(&mut self, now: Millis) -> Option<A> {
        let ThrottleState::Cooldown { until, pending } = &mut self.state else {
            return None;
        };
        if now < *until {
            return None;
        }
        match pending.take() {
            Some(args) => {
                *until = now.saturating_add(self.window_ms);
                Some(args)
            }
            None => {
                self.state = ThrottleState::Idle;
                None
            }
        }
    }

    pub fn deadline(&self) -> Option<Millis> {
        match &self.state {
            ThrottleState::Idle => None,
            ThrottleState::Cooldown { until, .. } => Some(*until),
        }
    }

    #[cfg(test)]
    pub fn has_pending(&self) -> bool {
        matches!(
            self.state,
            ThrottleState::Cooldown {
                pending: Some(_),
                ..
            }
        )
    }

    pub fn reset(&mut self) {
        self.state = ThrottleState::Idle;
    }
}
