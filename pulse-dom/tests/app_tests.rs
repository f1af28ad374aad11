use std::time::Duration;

use chrono::{TimeZone, Utc};
use pulse_core::config::StoreConfig;
use pulse_core::id::SequentialIds;
use pulse_core::scheduler::Scheduler;
use pulse_core::store::Store;
use pulse_dom::App;
use pulse_dom::controls::Trigger;
use pulse_dom::diff::{Patch, PatchOp};
use pulse_dom::display::{DisplayNode, DisplaySource};

fn store() -> Store {
    let scheduler = Scheduler::new(Utc.timestamp_opt(0, 0).single().unwrap());
    Store::new(StoreConfig::default(), scheduler, SequentialIds::new("a")).unwrap()
}

fn tick(store: &Store, secs: u64) {
    store.scheduler().advance_by(Duration::from_secs(secs));
}

#[test]
fn mount_registers_one_subscription_per_display() {
    let store = store();
    let app = App::mount(&store);
    assert_eq!(store.subscriber_count(), 3);
    assert!(app.displays().iter().all(|d| d.is_mounted()));

    let tree = app.render();
    assert_eq!(
        tree.find_by_id("cheap").map(|n| n.text_content()),
        Some("Cheap updated1970-01-01T00:00:00.000Z".to_string())
    );
    assert_eq!(
        tree.find_by_id("revision").map(|n| n.text_content()),
        Some(format!("Store revision{}", store.revision_id()))
    );
}

#[test]
fn cheap_tick_rerenders_cheap_and_revision_only() {
    let store = store();
    let app = App::mount(&store);
    app.controls().press(Trigger::Start);

    tick(&store, 1);
    assert_eq!(app.display(DisplaySource::Cheap).render_count(), 1);
    assert_eq!(app.display(DisplaySource::Expensive).render_count(), 0);
    assert_eq!(app.display(DisplaySource::Revision).render_count(), 1);
    assert_eq!(
        app.display(DisplaySource::Cheap).value(),
        "1970-01-01T00:00:01.000Z"
    );
}

#[test]
fn render_counts_over_a_start_stop_cycle() {
    let store = store();
    let app = App::mount(&store);

    app.controls().press(Trigger::Start);
    tick(&store, 10);
    app.controls().press(Trigger::Stop);
    tick(&store, 10);

    assert_eq!(app.display(DisplaySource::Cheap).render_count(), 10);
    assert_eq!(app.display(DisplaySource::Expensive).render_count(), 1);
    // 11 ticks plus the stop notification
    assert_eq!(app.display(DisplaySource::Revision).render_count(), 12);
}

#[test]
fn frame_patches_only_changed_values() {
    let store = store();
    let app = App::mount(&store);
    assert!(app.frame().is_empty());

    app.controls().press(Trigger::Start);
    // Starting only registers timers; the controls' flag is the sole change.
    assert_eq!(
        app.frame(),
        vec![Patch {
            path: vec![3],
            op: PatchOp::SetAttr("data-running".into(), "true".into()),
        }]
    );

    tick(&store, 1);
    let patches = app.frame();
    let paths: Vec<Vec<usize>> = patches.iter().map(|p| p.path.clone()).collect();
    assert_eq!(paths, vec![vec![0, 1, 0], vec![2, 1, 0]]);
    assert!(
        patches
            .iter()
            .all(|p| matches!(p.op, PatchOp::Replace(_)))
    );
}

#[test]
fn unmount_releases_subscriptions() {
    let store = store();
    let app = App::mount(&store);
    assert_eq!(app.unmount(), 3);
    assert_eq!(store.subscriber_count(), 0);
    assert_eq!(app.unmount(), 0);

    app.controls().press(Trigger::Start);
    tick(&store, 5);
    assert!(app.displays().iter().all(|d| d.render_count() == 0));
}

#[test]
fn dropping_the_app_unsubscribes() {
    let store = store();
    {
        let _app = App::mount(&store);
        assert_eq!(store.subscriber_count(), 3);
    }
    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn standalone_display_mounts_once() {
    let store = store();
    let node = DisplayNode::new(DisplaySource::Expensive);
    node.mount(&store);
    node.mount(&store);
    assert_eq!(store.subscriber_count(), 1);
    assert!(node.unmount());
    assert!(!node.unmount());
}

#[test]
fn display_sources_map_to_entity_slots() {
    use pulse_core::entity::EntityKind;

    assert_eq!(DisplaySource::Cheap.entity_kind(), Some(EntityKind::Cheap));
    assert_eq!(DisplaySource::Expensive.entity_kind(), Some(EntityKind::Expensive));
    assert_eq!(DisplaySource::Revision.entity_kind(), None);
}
