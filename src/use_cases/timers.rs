use crate::domain::layers::EffectId;
use std::time::Duration;
use tokio::time::Instant;

/// Handle to one scheduled timer; cancelling an already fired or cancelled
/// handle is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// What a timer drives when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTag {
    /// Periodic liveness poll on the active connection.
    Heartbeat,
    /// One-shot delay before the next connection attempt.
    Reconnect,
    /// Per-effect animation tick.
    EffectTick(EffectId),
    /// Hard stop for a damage flash that never resolved.
    DamageTimeout(EffectId),
    /// Periodic staleness check on the charging overlay.
    ChargeWatchdog,
}

#[derive(Debug)]
struct TimerEntry {
    id: TimerId,
    tag: TimerTag,
    deadline: Instant,
    /// `Some` for repeating timers, rescheduled on every fire.
    period: Option<Duration>,
}

/// All pending timers, polled by the connection loop between socket events.
///
/// The loop sleeps until [`TimerWheel::next_deadline`] and then drains
/// [`TimerWheel::fire_due`]; everything runs on one task, so no timer ever
/// fires concurrently with frame handling.
#[derive(Debug, Default)]
pub struct TimerWheel {
    next_id: u64,
    entries: Vec<TimerEntry>,
}

impl TimerWheel {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, tag: TimerTag, deadline: Instant, period: Option<Duration>) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.entries.push(TimerEntry {
            id,
            tag,
            deadline,
            period,
        });
        id
    }

    /// Schedules a repeating timer; the first fire lands one full period
    /// after `now`.
    pub fn start_interval(&mut self, tag: TimerTag, period: Duration, now: Instant) -> TimerId {
        self.allocate(tag, now + period, Some(period))
    }

    /// Schedules a one-shot timer.
    pub fn start_timeout(&mut self, tag: TimerTag, delay: Duration, now: Instant) -> TimerId {
        self.allocate(tag, now + delay, None)
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.entries.retain(|entry| entry.id != id);
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Earliest pending deadline, if any timer is scheduled.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|entry| entry.deadline).min()
    }

    /// Pops every timer due at `now`, in deadline order. Repeating timers are
    /// rescheduled one period ahead; one-shots are dropped.
    pub fn fire_due(&mut self, now: Instant) -> Vec<(TimerId, TimerTag)> {
        let mut due: Vec<(Instant, TimerId, TimerTag)> = Vec::new();
        for entry in &mut self.entries {
            if entry.deadline <= now {
                due.push((entry.deadline, entry.id, entry.tag));
                if let Some(period) = entry.period {
                    entry.deadline = now + period;
                }
            }
        }
        self.entries
            .retain(|entry| entry.period.is_some() || entry.deadline > now);
        due.sort_by_key(|(deadline, id, _)| (*deadline, id.0));
        due.into_iter().map(|(_, id, tag)| (id, tag)).collect()
    }
}
