use frameloop::{ChainEngine, ChainOptions, Viewport};

fn main() {
    // Example: drive the pointer trail by hand, one tick per simulated refresh.
    //
    // A host would call `on_pointer_move` from its input handler and `tick` from its frame loop,
    // then draw each `SegmentVisual`.
    let mut chain = ChainEngine::new(
        ChainOptions::default().with_segments(8),
        Viewport::new(800.0, 600.0),
    );

    for frame in 0..60 {
        // Sweep the pointer left to right across the top of the viewport.
        let x = frame as f32 * 12.0;
        chain.on_pointer_move(x, 80.0);
        chain.tick();

        if frame % 15 == 0 {
            println!("frame={frame} speed={:.1}", chain.speed());
            chain.for_each_visual(|v| {
                println!(
                    "  #{} pos=({:.1}, {:.1}) rot={:.0} size={:.1} opacity={:.2}",
                    v.index, v.position.x, v.position.y, v.rotation, v.size, v.opacity
                );
            });
        }
    }
}
