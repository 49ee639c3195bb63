use frameloop::{ScrollCoordinator, ScrollOptions};

fn main() {
    // Example: damped scrolling with a custom scrollbar.
    //
    // Native scroll events only move the target; each tick eases the rendered offset toward it
    // and reports a thumb only when it needs repainting.
    let mut scroll = ScrollCoordinator::new(ScrollOptions::default());
    scroll.on_resize(600.0, 4800.0);
    scroll.on_scroll(1200.0);

    let mut frame = 0;
    while !scroll.is_settled() {
        let Some(out) = scroll.tick() else { break };
        if let Some(thumb) = out.thumb {
            if frame % 10 == 0 {
                println!(
                    "frame={frame} content_offset={:.1} thumb={:.1}%@{:.1}%",
                    out.content_offset, thumb.height_pct, thumb.translate_pct
                );
            }
        }
        frame += 1;
    }
    println!("settled after {frame} frames at {}", scroll.virtual_offset());
}
