use std::io::Write;

/// Audio backend owned by a sounding alarm.
///
/// A sink is created when the alarm starts and released exactly once when
/// it stops; no method is called on it after `release`.
pub trait ToneSink: Send + 'static {
    /// Emit one short pulse
    fn pulse(&mut self);

    /// Release the underlying device
    fn release(&mut self);
}

/// Factory for a fresh sink per alarm activation
pub type ToneFactory = Box<dyn Fn() -> Box<dyn ToneSink> + Send + Sync>;

/// Terminal bell: writes BEL to stderr on each pulse
#[derive(Debug, Default)]
pub struct TerminalBell {
    pulses: u64,
}

impl TerminalBell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory() -> ToneFactory {
        Box::new(|| Box::new(TerminalBell::new()))
    }
}

impl ToneSink for TerminalBell {
    fn pulse(&mut self) {
        self.pulses += 1;
        let mut stderr = std::io::stderr().lock();
        if let Err(e) = stderr.write_all(b"\x07").and_then(|_| stderr.flush()) {
            tracing::debug!(error = %e, "Terminal bell write failed");
        }
        tracing::warn!(pulse = self.pulses, "NOVO PEDIDO: alarm sounding, type 'ok' to acknowledge");
    }

    fn release(&mut self) {
        tracing::debug!(pulses = self.pulses, "Terminal bell released");
    }
}
