use anyhow::{Context, Result};
use clap::ValueEnum;
use pulse_core::config::StoreConfig;
use pulse_core::id::{SequentialIds, UuidIds};
use pulse_core::scheduler::Scheduler;
use pulse_core::store::Store;
use pulse_dom::controls::ControlScript;
use pulse_dom::display::DisplaySource;
use pulse_dom::App;
use std::io::Write;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Pacing {
    /// Jump straight from one deadline to the next.
    #[default]
    Instant,
    /// Sleep until each deadline.
    Realtime,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: StoreConfig,
    /// How long to run, in units.
    pub duration: u64,
    pub script: ControlScript,
    pub pacing: Pacing,
    /// Use `pulse-<n>` ids instead of random UUIDs.
    pub sequential_ids: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            config: StoreConfig::default(),
            duration: 20,
            script: "start@0".parse().unwrap_or_default(),
            pacing: Pacing::default(),
            sequential_ids: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub elapsed: Duration,
    pub notifications: u64,
    /// Frames whose diff was non-empty.
    pub frames: u64,
    pub renders: Vec<(DisplaySource, u64)>,
    pub cheap_id: String,
    pub expensive_id: String,
    pub revision_id: String,
}

impl RunReport {
    pub fn renders_of(&self, source: DisplaySource) -> u64 {
        self.renders
            .iter()
            .find(|(s, _)| *s == source)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

/// Mount the app, play the control script against the scheduler, and write
/// one block per changed frame to `out`.
pub fn run_demo(opts: &RunOptions, out: &mut impl Write) -> Result<RunReport> {
    let scheduler = Scheduler::starting_now();
    let store = if opts.sequential_ids {
        Store::new(opts.config.clone(), scheduler.clone(), SequentialIds::new("pulse"))
    } else {
        Store::new(opts.config.clone(), scheduler.clone(), UuidIds)
    }
    .context("invalid store configuration")?;

    let app = App::mount(&store);
    writeln!(out, "{}", app.committed()).context("write initial frame")?;

    let config = store.config();
    let end = config.units(opts.duration);
    let mut events = opts.script.events().iter().peekable();
    let mut frames = 0u64;
    info!(script = %opts.script, ?end, pacing = ?opts.pacing, "run started");

    loop {
        let next_event = events.peek().map(|e| config.units(e.at));
        let target = [next_event, scheduler.next_deadline(), Some(end)]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(end);

        if opts.pacing == Pacing::Realtime {
            thread::sleep(target.saturating_sub(scheduler.elapsed()));
        }
        scheduler.advance_to(target);

        while let Some(event) = events.next_if(|e| config.units(e.at) <= target) {
            app.controls().press(event.trigger);
        }

        let patches = app.frame();
        if !patches.is_empty() {
            frames += 1;
            debug!(patches = patches.len(), "frame committed");
            writeln!(out, "[{:>9.3}s]", target.as_secs_f64()).context("write frame")?;
            for patch in &patches {
                writeln!(out, "  {patch}").context("write patch")?;
            }
        }

        if target >= end {
            break;
        }
    }

    let state = store.state();
    let report = RunReport {
        elapsed: scheduler.elapsed(),
        notifications: store.notification_count(),
        frames,
        renders: app
            .displays()
            .iter()
            .map(|d| (d.source(), d.render_count()))
            .collect(),
        cheap_id: state.cheap.id().to_string(),
        expensive_id: state.expensive.id().to_string(),
        revision_id: state.revision_id,
    };
    app.unmount();

    writeln!(
        out,
        "done: {} notifications, {} frames, renders cheap={} expensive={} revision={}",
        report.notifications,
        report.frames,
        report.renders_of(DisplaySource::Cheap),
        report.renders_of(DisplaySource::Expensive),
        report.renders_of(DisplaySource::Revision),
    )
    .context("write summary")?;
    info!(notifications = report.notifications, frames, "run finished");
    Ok(report)
}
