use pulse_cli::{run_demo, Pacing, RunOptions};
use pulse_core::config::{StartPolicy, StoreConfig};
use pulse_dom::display::DisplaySource;
use std::time::Duration;

fn options(script: &str, duration: u64) -> RunOptions {
    RunOptions {
        config: StoreConfig::default(),
        duration,
        script: script.parse().expect("valid script"),
        pacing: Pacing::Instant,
        sequential_ids: true,
    }
}

#[test]
fn start_then_stop_at_ten() {
    let mut out = Vec::new();
    let report = run_demo(&options("start@0,stop@10", 20), &mut out).expect("run");

    assert_eq!(report.elapsed, Duration::from_secs(20));
    assert_eq!(report.renders_of(DisplaySource::Cheap), 10);
    assert_eq!(report.renders_of(DisplaySource::Expensive), 1);
    assert_eq!(report.renders_of(DisplaySource::Revision), 12);
    assert_eq!(report.notifications, 12);

    let text = String::from_utf8(out).expect("utf8");
    assert!(text.starts_with("<main id=\"app\">"));
    assert!(text.contains("[    1.000s]"));
    assert!(!text.contains("[   11.000s]"));
    assert!(text.trim_end().ends_with("renders cheap=10 expensive=1 revision=12"));
}

#[test]
fn restart_resumes_ticking() {
    let mut out = Vec::new();
    let report =
        run_demo(&options("start@0,stop@3,start@5", 8), &mut out).expect("run");
    // ticks at 1,2,3 then 6,7,8
    assert_eq!(report.renders_of(DisplaySource::Cheap), 6);
    assert_eq!(report.renders_of(DisplaySource::Expensive), 0);
}

#[test]
fn stacked_timers_double_the_cheap_rate() {
    let mut opts = options("start@0,start@0", 5);
    opts.config = StoreConfig::default().with_start_policy(StartPolicy::StackTimers);
    let mut out = Vec::new();
    let report = run_demo(&opts, &mut out).expect("run");
    assert_eq!(report.renders_of(DisplaySource::Cheap), 10);

    let mut out = Vec::new();
    let report = run_demo(&options("start@0,start@0", 5), &mut out).expect("run");
    assert_eq!(report.renders_of(DisplaySource::Cheap), 5);
}

#[test]
fn short_units_and_custom_cadence() {
    let mut opts = options("start@0", 12);
    opts.config = StoreConfig::default()
        .with_unit(Duration::from_millis(10))
        .with_expensive_every(4);
    let mut out = Vec::new();
    let report = run_demo(&opts, &mut out).expect("run");
    assert_eq!(report.elapsed, Duration::from_millis(120));
    assert_eq!(report.renders_of(DisplaySource::Expensive), 3);
}

#[test]
fn no_script_means_no_changes() {
    let mut out = Vec::new();
    let report = run_demo(&options("", 5), &mut out).expect("run");
    assert_eq!(report.notifications, 0);
    assert_eq!(report.frames, 0);
}

#[test]
fn invalid_config_is_reported() {
    let mut opts = options("start@0", 5);
    opts.config = StoreConfig::default().with_cheap_every(0);
    let err = run_demo(&opts, &mut Vec::new()).unwrap_err();
    assert_eq!(err.to_string(), "invalid store configuration");
    assert!(format!("{err:#}").contains("cheap cadence must be at least one unit"));
}
