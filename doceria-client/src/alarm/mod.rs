//! New-order alarm
//!
//! Two states, `Idle` and `Sounding`. Only a new-order signal starts it and
//! only an explicit [`AlarmController::stop`] ends it; there is no timeout.

mod tone;

pub use tone::{TerminalBell, ToneFactory, ToneSink};

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::MIN_PERIOD;
use crate::sync::SyncEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Idle,
    Sounding,
}

type SharedSink = Arc<Mutex<Option<Box<dyn ToneSink>>>>;

/// Resources held while sounding
struct ActiveTone {
    sink: SharedSink,
    pulses: JoinHandle<()>,
}

pub struct AlarmController {
    period: Duration,
    factory: ToneFactory,
    active: Mutex<Option<ActiveTone>>,
}

impl AlarmController {
    /// Periods shorter than [`MIN_PERIOD`] are raised to it.
    pub fn new(period: Duration, factory: ToneFactory) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            factory,
            active: Mutex::new(None),
        }
    }

    pub fn state(&self) -> AlarmState {
        if self.active.lock().is_some() {
            AlarmState::Sounding
        } else {
            AlarmState::Idle
        }
    }

    pub fn is_sounding(&self) -> bool {
        self.state() == AlarmState::Sounding
    }

    /// Idle -> Sounding. Returns `false` if it was already sounding.
    ///
    /// Must be called inside a Tokio runtime; the pulse loop is a task.
    pub fn start(&self) -> bool {
        let mut active = self.active.lock();
        if active.is_some() {
            return false;
        }

        let sink: SharedSink = Arc::new(Mutex::new(Some((self.factory)())));
        let pulses = tokio::spawn(pulse_loop(sink.clone(), self.period));
        *active = Some(ActiveTone { sink, pulses });
        tracing::info!(period_ms = self.period.as_millis() as u64, "Alarm started");
        true
    }

    /// Sounding -> Idle. Returns `false` if it was already idle.
    ///
    /// The sink is released before this returns.
    pub fn stop(&self) -> bool {
        let Some(tone) = self.active.lock().take() else {
            return false;
        };
        tone.pulses.abort();
        // Taking the sink under its lock fences out any in-progress pulse
        if let Some(mut sink) = tone.sink.lock().take() {
            sink.release();
        }
        tracing::info!("Alarm stopped");
        true
    }
}

impl Drop for AlarmController {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn pulse_loop(sink: SharedSink, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        match sink.lock().as_mut() {
            Some(sink) => sink.pulse(),
            None => break,
        }
    }
}

/// Start the alarm whenever the synchronizer reports new orders.
///
/// Runs until `shutdown` is cancelled or the event channel closes.
pub fn spawn_alarm_listener(
    alarm: Arc<AlarmController>,
    mut events: broadcast::Receiver<SyncEvent>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Ok(SyncEvent::NewOrderDetected { previous, current }) => {
                        if !alarm.start() {
                            tracing::debug!(previous, current, "Alarm already sounding");
                        }
                    }
                    Ok(SyncEvent::Refreshed { .. }) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("Alarm listener lagged {n} events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
        tracing::debug!("Alarm listener stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ALARM_PULSE;

    struct NullSink;

    impl ToneSink for NullSink {
        fn pulse(&mut self) {}
        fn release(&mut self) {}
    }

    fn controller() -> AlarmController {
        AlarmController::new(DEFAULT_ALARM_PULSE, Box::new(|| Box::new(NullSink)))
    }

    #[tokio::test]
    async fn test_start_and_stop_are_idempotent() {
        let alarm = controller();
        assert_eq!(alarm.state(), AlarmState::Idle);
        assert!(!alarm.stop());

        assert!(alarm.start());
        assert!(!alarm.start());
        assert!(alarm.is_sounding());

        assert!(alarm.stop());
        assert!(!alarm.stop());
        assert_eq!(alarm.state(), AlarmState::Idle);
    }

    #[test]
    fn test_zero_period_is_raised_to_floor() {
        let alarm = AlarmController::new(Duration::ZERO, Box::new(|| Box::new(NullSink)));
        assert_eq!(alarm.period, MIN_PERIOD);
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let alarm = controller();
        assert!(alarm.start());
        assert!(alarm.stop());
        assert!(alarm.start());
        assert!(alarm.is_sounding());
    }
}
