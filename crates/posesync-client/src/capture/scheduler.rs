use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};

/// Stops every loop holding the matching [`StopSignal`]. Dropping it
/// stops them too.
#[derive(Debug)]
pub struct StopHandle(watch::Sender<bool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.send_replace(true);
    }
}

#[derive(Debug, Clone)]
pub struct StopSignal(watch::Receiver<bool>);

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        *self.0.borrow() || self.0.has_changed().is_err()
    }

    /// Resolves once stop is requested
    pub async fn stopped(&mut self) {
        let _ = self.0.wait_for(|stopped| *stopped).await;
    }
}

pub fn stop_signal() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle(tx), StopSignal(rx))
}

/// Paces capture cycles.
///
/// A cycle starts at most once per display refresh, and never before the
/// previous one finished: a slow cycle delays the next tick instead of
/// queueing missed ones.
pub struct FrameScheduler {
    interval: Interval,
    stop: StopSignal,
}

impl FrameScheduler {
    pub fn new(refresh_hz: u32, stop: StopSignal) -> Self {
        let period = Duration::from_secs_f64(1.0 / f64::from(refresh_hz.max(1)));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, stop }
    }

    /// Wait for the next cycle; `false` means stop
    pub async fn next_cycle(&mut self) -> bool {
        if self.stop.is_stopped() {
            return false;
        }

        tokio::select! {
            biased;
            _ = self.stop.stopped() => false,
            _ = self.interval.tick() => true,
        }
    }
}
