use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::tools::date::until_next_boundary;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub interval: Duration,
    /// Start the steady cadence on the next wall-clock multiple of `interval`.
    pub align_to_wall_clock: bool,
    /// Tick once right away, before the steady cadence starts.
    pub fire_immediately: bool,
}

impl Schedule {
    pub fn every(interval: Duration) -> Self {
        Schedule {
            interval,
            align_to_wall_clock: true,
            fire_immediately: true,
        }
    }

    /// Delay from `now` to the first steady tick.
    pub fn first_steady_delay(&self, now: &DateTime<Utc>) -> Duration {
        if !self.align_to_wall_clock {
            return self.interval;
        }

        chrono::Duration::from_std(self.interval)
            .ok()
            .and_then(|interval| until_next_boundary(now, interval).to_std().ok())
            .unwrap_or(self.interval)
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::every(DEFAULT_INTERVAL)
    }
}

/// Fixed-rate timer. Tick `n` of the steady cadence fires at `anchor + n * interval`
/// no matter how long earlier ticks ran, and every tick runs as its own task, so a
/// slow tick never delays or blocks the next one.
///
/// Stopping or dropping the poller cancels the timer and every tick still running.
#[derive(Debug)]
pub struct Poller {
    schedule: Schedule,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn new(schedule: Schedule) -> Self {
        Poller {
            schedule,
            handle: None,
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Starts ticking, replacing any previous run. `on_tick` gets the tick number,
    /// counting from zero. Must be called from within a tokio runtime.
    pub fn start<F, Fut>(&mut self, mut on_tick: F)
    where
        F: FnMut(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop();

        let schedule = self.schedule.clone();
        let first_delay = schedule.first_steady_delay(&Utc::now());
        let anchor = Instant::now() + first_delay;

        info!(
            event = "poller.started",
            interval_secs = schedule.interval.as_secs(),
            first_delay_secs = first_delay.as_secs(),
            aligned = schedule.align_to_wall_clock
        );

        self.handle = Some(tokio::spawn(async move {
            let mut in_flight = JoinSet::new();
            let mut tick: u64 = 0;

            if schedule.fire_immediately {
                debug!(event = "poller.tick", tick = tick);
                in_flight.spawn(on_tick(tick));
                tick += 1;
            }

            let mut steady = time::interval_at(anchor, schedule.interval);
            steady.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = steady.tick() => {
                        debug!(event = "poller.tick", tick = tick, in_flight = in_flight.len());
                        in_flight.spawn(on_tick(tick));
                        tick += 1;
                    }
                    Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!(event = "poller.stopped");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
