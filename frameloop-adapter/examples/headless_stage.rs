use frameloop::{ElementId, FrameClock, Intersection, TriggerOptions, Viewport};
use frameloop_adapter::{HeadlessObserver, HeadlessSink, Stage, StageOptions};

fn main() {
    // Example: a whole page's motion layer on one clock, with no UI attached.
    //
    // An adapter would:
    // - call `clock.frame(now_ms)` from requestAnimationFrame (or a timer)
    // - forward pointer, scroll and resize events to the stage
    // - forward its intersection observer's notifications via `notify_visibility`
    // - implement `RenderSink` to write the pushed visuals into real nodes
    let clock = FrameClock::new();
    let stage = Stage::mount(
        &clock,
        HeadlessSink::new(),
        HeadlessObserver::new(),
        StageOptions::new(Viewport::new(1280.0, 720.0), 3600.0),
    );

    for (i, element) in [ElementId(1), ElementId(2), ElementId(3)].into_iter().enumerate() {
        let options = TriggerOptions::new()
            .with_document_order(i as u64)
            .with_on_enter(|e| println!("enter {:?} delay={}ms", e.element, e.delay_ms));
        stage.register(element, options);
    }

    stage.on_scroll(900.0);
    stage.notify_visibility(&[
        Intersection::visible(ElementId(1), 0.6),
        Intersection::visible(ElementId(2), 0.4),
        Intersection::visible(ElementId(3), 0.2),
    ]);

    let mut now_ms = 0.0;
    for frame in 0..90 {
        let x = 200.0 + 400.0 * (frame as f32 * 0.2).sin();
        stage.on_pointer_move(x, 360.0);
        clock.frame(now_ms);
        now_ms += 16.0;
    }

    println!(
        "virtual_offset={:.1} effects={} head={:?}",
        stage.virtual_offset(),
        stage.active_effects(),
        stage.head().map(|s| s.position)
    );
    stage.with_sink(|sink| println!("entrances={:?}", sink.entrances));

    stage.dispose();
    println!("subscribers after dispose={}", clock.subscriber_count());
}
