// Recharge overlay: while the robot sits on a charging cell the server
// streams charging frames; exactly one of three panels is shown at a time
// and a watchdog hides everything once the stream goes stale.

use crate::domain::ports::{ChargeIndicator, Shell};
use crate::frameworks::config;
use crate::use_cases::timers::{TimerId, TimerTag, TimerWheel};
use tokio::time::Instant;

#[derive(Debug, Default)]
pub struct ChargeOverlay {
    shown: Option<ChargeIndicator>,
    last_event: Option<Instant>,
    watchdog: Option<TimerId>,
}

impl ChargeOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Option<ChargeIndicator> {
        self.shown
    }

    /// Applies one charging frame. `depleted` outranks `full`, which
    /// outranks the plain charging panel with its countdown.
    pub fn on_charging(
        &mut self,
        remaining: u32,
        full: bool,
        depleted: bool,
        shell: &mut dyn Shell,
        timers: &mut TimerWheel,
        now: Instant,
    ) {
        self.last_event = Some(now);

        let panel = if depleted {
            ChargeIndicator::Depleted
        } else if full {
            ChargeIndicator::Full
        } else {
            ChargeIndicator::Charging
        };

        if self.shown != Some(panel) {
            if let Some(previous) = self.shown {
                shell.hide_charge_panel(previous);
            }
            shell.show_charge_panel(panel);
            self.shown = Some(panel);
        }
        if panel == ChargeIndicator::Charging {
            shell.set_charge_remaining(remaining);
        }

        if self.watchdog.is_none() {
            self.watchdog = Some(timers.start_interval(
                TimerTag::ChargeWatchdog,
                config::CHARGE_WATCHDOG_PERIOD,
                now,
            ));
        }
    }

    /// Periodic staleness check: once no charging frame has arrived for the
    /// stale window, the overlay comes down and the watchdog stops.
    pub fn on_watchdog(&mut self, shell: &mut dyn Shell, timers: &mut TimerWheel, now: Instant) {
        let stale = match self.last_event {
            Some(last) => now.duration_since(last) >= config::CHARGE_STALE_AFTER,
            None => true,
        };
        if !stale {
            return;
        }
        if let Some(panel) = self.shown.take() {
            shell.hide_charge_panel(panel);
        }
        if let Some(watchdog) = self.watchdog.take() {
            timers.cancel(watchdog);
        }
        self.last_event = None;
    }
}
