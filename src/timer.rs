use std::time::Duration;

const ONE_SECOND: Duration = Duration::from_secs(1);

/// Result of feeding elapsed time into a [`Countdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// No countdown is running.
    Idle,
    /// Running, but no whole second has passed since the last decrement.
    Pending,
    /// One or more seconds passed; this many remain.
    Second(u32),
    /// Reached zero. The countdown has stopped itself.
    Expired,
}

#[derive(Debug, Clone, Copy)]
struct Running {
    remaining: u32,
    carry: Duration,
}

/// Per-item countdown decremented once per second of elapsed time.
///
/// There is never more than one running countdown: `start` replaces any
/// previous one and `cancel` is idempotent.
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    running: Option<Running>,
}

impl Countdown {
    pub fn start(&mut self, secs: u32) {
        self.running = (secs > 0).then_some(Running {
            remaining: secs,
            carry: Duration::ZERO,
        });
    }

    pub fn cancel(&mut self) {
        self.running = None;
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn remaining(&self) -> Option<u32> {
        self.running.map(|r| r.remaining)
    }

    pub fn advance(&mut self, elapsed: Duration) -> CountdownTick {
        let Some(running) = self.running.as_mut() else {
            return CountdownTick::Idle;
        };

        running.carry += elapsed;
        let mut ticked = false;
        while running.carry >= ONE_SECOND {
            running.carry -= ONE_SECOND;
            running.remaining = running.remaining.saturating_sub(1);
            ticked = true;
            if running.remaining == 0 {
                self.running = None;
                return CountdownTick::Expired;
            }
        }

        if ticked {
            CountdownTick::Second(running.remaining)
        } else {
            CountdownTick::Pending
        }
    }
}
