//! Mode Controller (§4.8): maps external events to one of four layer
//! sets and throttles Balanced/Deep based on idleness.

use codeatlas_ir::config::ModesConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Mode {
    Fast,
    Balanced,
    Deep,
    Repair,
}

/// The external trigger that asks the controller for a mode. Distinct
/// from `Mode` itself — several events can resolve to the same mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    FileSaved,
    VcsPull,
    Idle,
    Startup { schema_mismatch: bool, integrity_ok: bool },
}

/// Tracks idleness and dispatches events to modes. Idle-minute tracking
/// is caller-driven: `note_activity`/`minutes_since_activity` let the
/// embedding process decide its own clock rather than this type owning
/// a timer (§5 keeps suspension points explicit, not hidden in a type).
pub struct ModeController {
    config: ModesConfig,
    idle_minutes: u64,
}

impl ModeController {
    pub fn new(config: ModesConfig) -> Self {
        Self { config, idle_minutes: 0 }
    }

    pub fn note_activity(&mut self) {
        self.idle_minutes = 0;
    }

    pub fn advance_idle(&mut self, minutes: u64) {
        self.idle_minutes = self.idle_minutes.saturating_add(minutes);
    }

    pub fn is_idle(&self) -> bool {
        self.idle_minutes >= self.config.balanced_idle_minutes
    }

    /// Resolves an event to a mode. `Startup` takes priority over
    /// idleness: a schema mismatch or failed integrity check always
    /// forces Repair, regardless of configuration.
    pub fn resolve(&self, event: Event) -> Mode {
        match event {
            Event::Startup { schema_mismatch, integrity_ok } => {
                if self.config.startup_integrity_check && (schema_mismatch || !integrity_ok) {
                    Mode::Repair
                } else {
                    Mode::Fast
                }
            }
            Event::FileSaved => Mode::Fast,
            Event::VcsPull => {
                if self.is_idle() {
                    Mode::Deep
                } else {
                    Mode::Balanced
                }
            }
            Event::Idle => Mode::Deep,
        }
    }
}
