//! Start/stop triggers and a scripted sequence of presses.

use std::cell::Cell;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use pulse_core::store::Store;
use thiserror::Error;
use tracing::info;

use crate::{VNode, h, text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Start,
    Stop,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::Start => "start",
            Trigger::Stop => "stop",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trigger {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Trigger::Start),
            "stop" => Ok(Trigger::Stop),
            other => Err(ScriptError::UnknownTrigger(other.to_string())),
        }
    }
}

/// The control node: two buttons wired to the store.
#[derive(Debug)]
pub struct Controls {
    store: Store,
    presses: Cell<u64>,
}

impl Controls {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            presses: Cell::new(0),
        }
    }

    pub fn press(&self, trigger: Trigger) {
        self.presses.set(self.presses.get() + 1);
        info!(%trigger, "control pressed");
        match trigger {
            Trigger::Start => self.store.start(),
            Trigger::Stop => self.store.stop(),
        }
    }

    pub fn press_count(&self) -> u64 {
        self.presses.get()
    }

    pub fn render(&self) -> VNode {
        let running = if self.store.is_running() { "true" } else { "false" };
        h(
            "div",
            vec![("id", "controls"), ("data-running", running)],
            vec![
                h("button", vec![("id", "start")], vec![text("Start")]),
                h("button", vec![("id", "stop")], vec![text("Stop")]),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("entry {0} is empty")]
    EmptyEntry(usize),
    #[error("entry `{0}` has no `@<unit>` offset")]
    MissingOffset(String),
    #[error("unknown trigger `{0}` (expected start or stop)")]
    UnknownTrigger(String),
    #[error("bad offset in `{entry}`: {source}")]
    BadOffset {
        entry: String,
        #[source]
        source: ParseIntError,
    },
    #[error("entry `{entry}` at unit {at} comes before unit {previous}")]
    Unsorted { entry: String, at: u64, previous: u64 },
}

/// One scheduled press, `at` units after the run begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlEvent {
    pub at: u64,
    pub trigger: Trigger,
}

/// A sequence of presses such as `start@0,stop@10,start@15`.
///
/// Offsets are whole units and must not decrease.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlScript {
    events: Vec<ControlEvent>,
}

impl ControlScript {
    pub fn events(&self) -> &[ControlEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl FromStr for ControlScript {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut events: Vec<ControlEvent> = Vec::new();
        for (index, raw) in s.split(',').enumerate() {
            let entry = raw.trim();
            if entry.is_empty() {
                return Err(ScriptError::EmptyEntry(index));
            }
            let (name, offset) = entry
                .split_once('@')
                .ok_or_else(|| ScriptError::MissingOffset(entry.to_string()))?;
            let trigger: Trigger = name.parse()?;
            let at: u64 = offset
                .trim()
                .parse()
                .map_err(|source| ScriptError::BadOffset {
                    entry: entry.to_string(),
                    source,
                })?;
            if let Some(previous) = events.last().map(|e| e.at) {
                if at < previous {
                    return Err(ScriptError::Unsorted {
                        entry: entry.to_string(),
                        at,
                        previous,
                    });
                }
            }
            events.push(ControlEvent { at, trigger });
        }
        Ok(Self { events })
    }
}

impl fmt::Display for ControlScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .events
            .iter()
            .map(|e| format!("{}@{}", e.trigger, e.at))
            .collect();
        f.write_str(&parts.join(","))
    }
}
