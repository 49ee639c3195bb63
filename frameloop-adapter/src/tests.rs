use crate::*;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use frameloop::options::{DEFAULT_EFFECT_CAPACITY, DEFAULT_SEGMENTS, HEAD_SIZE};
use frameloop::{
    BatchReport, EffectOptions, ElementId, EntranceState, FrameClock, Intersection,
    MonitorOptions, PlatformError, Point, SegmentVisual, TriggerOptions, TriggerState, Viewport,
};

fn options() -> StageOptions {
    StageOptions::new(Viewport::new(800.0, 600.0), 2400.0)
}

fn mount(clock: &FrameClock, options: StageOptions) -> Stage<HeadlessSink, HeadlessObserver> {
    Stage::mount(clock, HeadlessSink::new(), HeadlessObserver::new(), options)
}

/// Runs `frames` refreshes 16ms apart, starting at `start_ms`. Returns the next timestamp.
fn run(clock: &FrameClock, start_ms: f64, frames: usize) -> f64 {
    let mut now = start_ms;
    for _ in 0..frames {
        clock.frame(now);
        now += 16.0;
    }
    now
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn mount_subscribes_once_and_dispose_releases_the_clock() {
    let clock = FrameClock::new();
    let stage = mount(&clock, options());

    assert_eq!(clock.subscriber_count(), 1);
    assert!(clock.has_pending_frame());
    let handle = stage.handle().unwrap();
    assert!(clock.is_active(handle));

    stage.dispose();
    assert!(stage.is_disposed());
    assert_eq!(stage.handle(), None);
    assert_eq!(clock.subscriber_count(), 0);
    assert!(!clock.has_pending_frame());
    assert!(!clock.is_active(handle));
    assert_eq!(clock.frame(16.0), 0);

    // Idempotent.
    stage.dispose();
    assert_eq!(clock.subscriber_count(), 0);
}

#[test]
fn dispose_before_first_frame_is_safe() {
    let clock = FrameClock::new();
    let stage = mount(&clock, options());
    stage.dispose();
    assert_eq!(run(&clock, 0.0, 3), 48.0);
    assert_eq!(stage.with_sink(|s| s.writes), Some(0));
}

#[test]
fn dropping_the_stage_disposes_it() {
    let clock = FrameClock::new();
    let stage = mount(&clock, options());
    run(&clock, 0.0, 2);
    drop(stage);
    assert_eq!(clock.subscriber_count(), 0);
    assert!(!clock.has_pending_frame());
}

#[test]
fn frames_drive_the_chain_toward_the_pointer() {
    let clock = FrameClock::new();
    let stage = mount(&clock, options());
    let target = Point::new(100.0, 120.0);
    stage.on_pointer_move(target.x, target.y);

    run(&clock, 0.0, 400);

    let segments = stage.segments();
    assert_eq!(segments.len(), DEFAULT_SEGMENTS);
    for s in &segments {
        assert!(s.position.distance(target) < 1.0, "{s:?}");
    }

    let pushed = stage.with_sink(|s| s.segments.clone()).unwrap();
    assert_eq!(pushed.len(), DEFAULT_SEGMENTS);
    assert_eq!(pushed[0].size, HEAD_SIZE);
    assert!(pushed[DEFAULT_SEGMENTS - 1].size < pushed[0].size);
    assert!(stage.now_ms() > 6000.0);
}

#[test]
fn every_render_surface_is_written_and_the_thumb_is_coalesced() {
    let clock = FrameClock::new();
    let stage = mount(&clock, options());
    run(&clock, 0.0, 3);

    stage
        .with_sink(|sink| {
            assert_eq!(sink.segments.len(), DEFAULT_SEGMENTS);
            assert_eq!(sink.effects.len(), DEFAULT_EFFECT_CAPACITY);
            assert_eq!(sink.visible_effects(), 0);
            assert_eq!(sink.content_offset, Some(0.0));
            // Only the first frame had a pending indicator change (the mount-time resize).
            assert_eq!(sink.thumb_writes, 1);
            let thumb = sink.thumb.unwrap();
            assert!(approx(thumb.height_pct, 25.0));
            assert!(approx(thumb.translate_pct, 0.0));
        })
        .unwrap();
}

#[test]
fn scroll_eases_toward_native_offset_and_settles() {
    let clock = FrameClock::new();
    let stage = mount(&clock, options());
    stage.on_scroll(500.0);
    assert_eq!(stage.target_offset(), 500.0);
    assert_eq!(stage.virtual_offset(), 0.0);

    let mut now = 0.0;
    let mut last = 0.0;
    for _ in 0..200 {
        now = run(&clock, now, 1);
        let v = stage.virtual_offset();
        assert!(v >= last && v <= 500.0);
        last = v;
    }
    assert_eq!(stage.virtual_offset(), 500.0);
    assert_eq!(stage.with_sink(|s| s.content_offset), Some(Some(-500.0)));

    let thumb = stage.thumb().unwrap();
    assert!(approx(thumb.progress, 500.0 / 1800.0));
    assert!(thumb.height_pct + thumb.translate_pct <= 100.0 + 1e-3);
}

#[test]
fn resize_reclamps_the_scroll_offsets() {
    let clock = FrameClock::new();
    let stage = mount(&clock, options());
    stage.jump_to(1800.0);
    assert_eq!(stage.virtual_offset(), 1800.0);

    stage.on_resize(800.0, 600.0, 1000.0);
    assert_eq!(stage.target_offset(), 400.0);
    assert_eq!(stage.virtual_offset(), 400.0);

    stage.scroll_to(-50.0);
    assert_eq!(stage.target_offset(), 0.0);
}

#[test]
fn reduced_motion_lands_on_end_states_immediately() {
    let clock = FrameClock::new();
    let stage = mount(&clock, options().with_reduced_motion(true));
    assert!(stage.reduced_motion());

    stage.on_pointer_move(40.0, 50.0);
    for s in stage.segments() {
        assert_eq!(s.position, Point::new(40.0, 50.0));
    }

    stage.on_scroll(300.0);
    assert_eq!(stage.virtual_offset(), 300.0);

    let id = stage
        .register(ElementId(1), TriggerOptions::new())
        .unwrap();
    assert_eq!(stage.entrance(id), Some(EntranceState::VISIBLE));
    let report = stage
        .notify_visibility(&[Intersection::visible(ElementId(1), 1.0)])
        .unwrap();
    assert_eq!(report.entered, 1);
    assert_eq!(stage.entrance(id), Some(EntranceState::VISIBLE));

    // Fast pointer motion never spawns effects.
    let mut now = 0.0;
    for k in 0..100 {
        let p = if k % 2 == 0 { 0.0 } else { 500.0 };
        stage.on_pointer_move(p, p);
        now = run(&clock, now, 1);
    }
    assert_eq!(stage.active_effects(), 0);
    assert_eq!(stage.with_sink(|s| s.visible_effects()), Some(0));
}

#[test]
fn fast_pointer_motion_spawns_effects_within_capacity() {
    let clock = FrameClock::new();
    let stage = mount(
        &clock,
        options().with_effects(EffectOptions::default().with_capacity(4)),
    );

    let mut now = 0.0;
    for k in 0..200 {
        let p = if k % 2 == 0 { 0.0 } else { 600.0 };
        stage.on_pointer_move(p, p);
        now = run(&clock, now, 1);
        assert!(stage.active_effects() <= 4);
    }
    assert_eq!(stage.with_sink(|s| s.effects.len()), Some(4));

    // Once the pointer rests every effect fades out.
    run(&clock, now, 120);
    assert_eq!(stage.active_effects(), 0);
    assert_eq!(stage.with_sink(|s| s.visible_effects()), Some(0));
}

#[test]
fn visibility_batch_is_staggered_in_document_order() {
    let clock = FrameClock::new();
    let stage = mount(&clock, options());
    let events = Rc::new(RefCell::new(Vec::new()));

    let mut ids = Vec::new();
    for (element, order) in [(10u64, 3u64), (11, 1), (12, 2)] {
        let log = Rc::clone(&events);
        let options = TriggerOptions::new()
            .with_document_order(order)
            .with_on_enter(move |e| log.borrow_mut().push((e.element, e.batch_index, e.delay_ms)));
        ids.push(stage.register(ElementId(element), options).unwrap());
    }

    let report = stage
        .notify_visibility(&[
            Intersection::visible(ElementId(10), 0.5),
            Intersection::visible(ElementId(11), 0.5),
            Intersection::visible(ElementId(12), 0.5),
        ])
        .unwrap();
    assert_eq!(report.entered, 3);
    assert_eq!(report.retired, 3);
    assert_eq!(
        *events.borrow(),
        vec![
            (ElementId(11), 0, 0.0),
            (ElementId(12), 1, 100.0),
            (ElementId(10), 2, 200.0),
        ]
    );
    for &id in &ids {
        assert_eq!(stage.trigger_state(id), Some(TriggerState::Retired));
    }
    assert_eq!(stage.with_observer(|o| o.observed.len()), Some(0));

    run(&clock, 0.0, 75);
    for &id in &ids {
        let e = stage.entrance(id).unwrap();
        assert!(approx(e.opacity, 1.0) && approx(e.translate_y, 0.0), "{e:?}");
    }
    let pushed = stage.with_sink(|s| s.entrances.len()).unwrap();
    assert_eq!(pushed, 3);
}

#[test]
fn monitor_follows_registrations_made_through_the_stage() {
    let clock = FrameClock::new();
    let monitor = MonitorOptions::default().with_registration_high_watermark(2);
    let stage = mount(&clock, options().with_monitor(Some(monitor)));

    let a = stage.register(ElementId(1), TriggerOptions::new()).unwrap();
    let _b = stage.register(ElementId(2), TriggerOptions::new()).unwrap();
    let _c = stage.register(ElementId(3), TriggerOptions::new()).unwrap();

    let snap = stage.monitor().unwrap();
    assert_eq!(snap.live_registrations, 3);
    assert_eq!(snap.registration_warnings, 1);

    stage.notify_visibility(&[Intersection::visible(ElementId(2), 1.0)]);
    assert_eq!(stage.monitor().unwrap().live_registrations, 2);

    assert!(stage.unregister(a));
    assert!(!stage.unregister(a));
    assert_eq!(stage.monitor().unwrap().live_registrations, 1);

    stage.dispose();
    assert_eq!(stage.monitor().unwrap().live_registrations, 0);
}

#[test]
fn monitor_is_optional() {
    let clock = FrameClock::new();
    let stage = mount(&clock, options());
    assert_eq!(stage.monitor(), None);
}

#[test]
fn missing_segment_target_is_skipped_without_halting() {
    let clock = FrameClock::new();
    let sink = HeadlessSink::new().with_missing_segments([3]);
    let stage = Stage::mount(&clock, sink, HeadlessObserver::new(), options());

    run(&clock, 0.0, 5);

    assert_eq!(clock.subscriber_count(), 1);
    stage
        .with_sink(|sink| {
            assert_eq!(sink.segments.len(), DEFAULT_SEGMENTS);
            assert_ne!(sink.segments[3].index, 3);
            assert_eq!(sink.segments[4].index, 4);
            assert_eq!(sink.effects.len(), DEFAULT_EFFECT_CAPACITY);
            assert!(sink.content_offset.is_some());
        })
        .unwrap();
}

#[test]
fn detached_elements_are_dropped() {
    let clock = FrameClock::new();
    let observer = HeadlessObserver::new().with_detached([ElementId(9)]);
    let stage = Stage::mount(&clock, HeadlessSink::new(), observer, options());

    assert_eq!(stage.register(ElementId(9), TriggerOptions::new()), None);
    assert_eq!(stage.live_registrations(), 0);

    let id = stage.register(ElementId(1), TriggerOptions::new()).unwrap();
    let report = stage
        .notify_visibility(&[Intersection::detached(ElementId(1))])
        .unwrap();
    assert_eq!(report.dropped, 1);
    assert_eq!(stage.live_registrations(), 0);
    assert_eq!(stage.trigger_state(id), None);
}

#[test]
fn calls_after_dispose_do_not_mutate_anything() {
    let clock = FrameClock::new();
    let stage = mount(&clock, options());
    stage.jump_to(200.0);
    stage.on_pointer_move(10.0, 10.0);
    run(&clock, 0.0, 2);
    let segments = stage.segments();
    let writes = stage.with_sink(|s| s.writes).unwrap();

    stage.dispose();
    stage.on_scroll(900.0);
    stage.jump_to(900.0);
    stage.on_pointer_move(700.0, 500.0);
    stage.on_resize(100.0, 100.0, 100.0);
    assert_eq!(stage.register(ElementId(1), TriggerOptions::new()), None);
    assert_eq!(
        stage.notify_visibility(&[Intersection::visible(ElementId(1), 1.0)]),
        None
    );
    assert_eq!(run(&clock, 32.0, 5), 112.0);

    assert_eq!(stage.virtual_offset(), 200.0);
    assert_eq!(stage.segments(), segments);
    assert_eq!(stage.with_sink(|s| s.writes), Some(writes));
}

type Looped = Stage<ReentrantSink, HeadlessObserver>;

/// A sink that delivers a visibility notification while the stage is mid-frame.
struct ReentrantSink {
    stage: Rc<RefCell<Weak<Looped>>>,
    pending: Vec<Intersection>,
    reports: Vec<Option<BatchReport>>,
}

impl RenderSink for ReentrantSink {
    fn segment(&mut self, visual: &SegmentVisual) -> Result<(), PlatformError> {
        if visual.index == 0 && !self.pending.is_empty() {
            if let Some(stage) = self.stage.borrow().upgrade() {
                let entries = std::mem::take(&mut self.pending);
                self.reports.push(stage.notify_visibility(&entries));
            }
        }
        Ok(())
    }
}

#[test]
fn notification_during_a_frame_is_queued_for_the_next_one() {
    let clock = FrameClock::new();
    let slot = Rc::new(RefCell::new(Weak::new()));
    let sink = ReentrantSink {
        stage: Rc::clone(&slot),
        pending: vec![Intersection::visible(ElementId(5), 1.0)],
        reports: Vec::new(),
    };
    let stage = Rc::new(Stage::mount(&clock, sink, HeadlessObserver::new(), options()));
    *slot.borrow_mut() = Rc::downgrade(&stage);

    let id = stage.register(ElementId(5), TriggerOptions::new()).unwrap();

    clock.frame(0.0);
    assert_eq!(stage.with_sink(|s| s.reports.clone()), Some(vec![None]));
    assert_eq!(stage.trigger_state(id), Some(TriggerState::Armed));

    clock.frame(16.0);
    assert_eq!(stage.trigger_state(id), Some(TriggerState::Retired));
}

#[test]
fn dispose_from_an_enter_callback_completes_after_the_batch() {
    let clock = FrameClock::new();
    let stage = Rc::new(mount(&clock, options()));
    let weak = Rc::downgrade(&stage);

    let options = TriggerOptions::new().with_on_enter(move |_| {
        if let Some(stage) = weak.upgrade() {
            stage.dispose();
        }
    });
    stage.register(ElementId(1), options).unwrap();
    stage.register(ElementId(2), TriggerOptions::new()).unwrap();

    let report = stage
        .notify_visibility(&[
            Intersection::visible(ElementId(1), 1.0),
            Intersection::visible(ElementId(2), 1.0),
        ])
        .unwrap();
    assert_eq!(report.entered, 2);

    assert!(stage.is_disposed());
    assert_eq!(clock.subscriber_count(), 0);
    assert_eq!(stage.live_registrations(), 0);
    assert_eq!(stage.with_observer(|o| o.observed.len()), Some(0));
}

#[test]
fn thumb_matches_what_the_sink_last_received() {
    let clock = FrameClock::new();
    let stage = mount(&clock, options());
    run(&clock, 0.0, 1);

    stage.jump_to(900.0);
    let pushed = stage.with_sink(|s| s.thumb).unwrap();
    assert_eq!(stage.thumb(), pushed);
    assert!(approx(stage.thumb().unwrap().progress, 0.0));

    run(&clock, 16.0, 1);
    let pushed = stage.with_sink(|s| s.thumb).unwrap();
    assert_eq!(stage.thumb(), pushed);
    assert!(approx(stage.thumb().unwrap().progress, 0.5));
}

#[test]
fn non_finite_resize_keeps_the_chain_finite() {
    let clock = FrameClock::new();
    let stage = mount(&clock, options());
    stage.on_resize(f32::NAN, 800.0, 2400.0);
    run(&clock, 0.0, 1);

    stage.on_pointer_move(10.0, 10.0);
    run(&clock, 16.0, 200);
    let head = stage.head().unwrap().position;
    assert!(head.is_finite(), "{head:?}");
    for s in stage.segments() {
        assert!(s.position.is_finite());
    }
}
