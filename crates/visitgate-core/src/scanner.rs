// ── Scan disambiguation ──
//
// A hardware QR/barcode scanner types its payload as a burst of
// keystrokes followed by Enter. This state machine separates such bursts
// from human typing and stray key noise. It owns no timers: callers pass
// the keystroke time and poll `deadline()` / `expire()` from their event
// loop, which keeps the machine testable without a runtime.

use std::time::Instant;

use tracing::{debug, trace};

use crate::config::ScannerConfig;

/// A keystroke, as reported by whatever UI layer drives the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A single printable character.
    Char(char),
    Enter,
    Shift,
    Control,
    Alt,
    /// Any other named key (Tab, Escape, arrows, function keys, ...).
    Other(String),
}

impl Key {
    /// Map a DOM-style key name (`"a"`, `"Enter"`, `"Shift"`, ...).
    pub fn from_name(name: &str) -> Self {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::Char(c),
            _ => match name {
                "Enter" => Self::Enter,
                "Shift" => Self::Shift,
                "Control" => Self::Control,
                "Alt" => Self::Alt,
                other => Self::Other(other.to_owned()),
            },
        }
    }

    fn is_modifier(&self) -> bool {
        matches!(self, Self::Shift | Self::Control | Self::Alt)
    }
}

/// Where keyboard focus sits when the key arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// A text input, select, textarea or content-editable region.
    Editable,
    /// Anywhere else.
    Document,
}

/// What the caller should do with the keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanAction {
    /// Focus is in a form field; the keystroke belongs to it.
    Ignored,
    /// Modifier key, left untouched.
    PassThrough,
    /// Character appended to the burst; suppress its default effect.
    Buffered,
    /// Completed scan; suppress the Enter and check the code in.
    Submit(String),
    /// Enter after too few characters; nothing is submitted.
    Noise,
    /// Unexpected key; the burst was discarded.
    Interrupted,
}

impl ScanAction {
    /// Whether the keystroke's default effect must be prevented.
    pub fn suppresses_default(&self) -> bool {
        matches!(self, Self::Buffered | Self::Submit(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Accumulating,
}

/// Process-wide keystroke accumulator.
#[derive(Debug)]
pub struct ScanDisambiguator {
    config: ScannerConfig,
    buffer: String,
    /// When the pending burst is discarded if no further key arrives.
    deadline: Option<Instant>,
}

impl ScanDisambiguator {
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            config,
            buffer: String::new(),
            deadline: None,
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Feed one keystroke that arrived at `now`.
    pub fn feed(&mut self, key: &Key, focus: Focus, now: Instant) -> ScanAction {
        self.expire(now);

        if focus == Focus::Editable {
            return ScanAction::Ignored;
        }

        match key {
            Key::Enter if self.buffer.len() > self.config.min_length => {
                let code = std::mem::take(&mut self.buffer);
                self.deadline = None;
                debug!(len = code.len(), "scan burst completed");
                ScanAction::Submit(code)
            }
            Key::Enter => {
                trace!(len = self.buffer.len(), "enter below scan threshold");
                if !self.buffer.is_empty() {
                    self.arm(now);
                }
                ScanAction::Noise
            }
            Key::Char(c) if c.is_ascii_alphanumeric() => {
                self.buffer.push(*c);
                self.arm(now);
                ScanAction::Buffered
            }
            key if key.is_modifier() => ScanAction::PassThrough,
            _ => {
                self.reset();
                ScanAction::Interrupted
            }
        }
    }

    /// Clear the burst if its idle deadline has passed. Returns `true`
    /// when something was discarded.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                if !self.buffer.is_empty() {
                    trace!(len = self.buffer.len(), "idle timeout, discarding burst");
                }
                let had_data = !self.buffer.is_empty();
                self.reset();
                had_data
            }
            _ => false,
        }
    }

    /// Pending idle deadline, for event loops that sleep until it.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.deadline = None;
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn state(&self) -> ScanState {
        if self.buffer.is_empty() {
            ScanState::Idle
        } else {
            ScanState::Accumulating
        }
    }

    /// Restart the idle timer; any earlier deadline is replaced.
    fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.config.idle_timeout);
    }
}
