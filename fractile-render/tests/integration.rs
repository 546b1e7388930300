use fractile_core::{KernelParams, Viewport};
use fractile_render::{CountBuffer, Palette, SchedulerConfig, TileScheduler};

fn config(workers: usize) -> SchedulerConfig {
    SchedulerConfig {
        worker_count: workers,
        block_size: 64,
        ..Default::default()
    }
}

fn render_counts(workers: usize, width: u32, height: u32) -> CountBuffer {
    let params = KernelParams::new(256, 10.0).unwrap();
    let mut sched = TileScheduler::new(
        config(workers),
        params,
        Viewport::home(width, height),
        CountBuffer::new(width, height, params.max_iterations),
    )
    .unwrap();
    sched.render_frame().unwrap();
    sched.sink().clone()
}

#[test]
fn end_to_end_frame() {
    let frame = render_counts(4, 200, 150);
    assert_eq!(frame.data.len(), 200 * 150);

    // The home view straddles the set boundary, so both interior and
    // escaped counts must be present.
    assert!(frame.data.iter().any(|&c| c == frame.max_iterations));
    assert!(frame.data.iter().any(|&c| c < frame.max_iterations));

    // The centre of the home view sits inside the set.
    let centre = frame.data[(75 * 200 + 100) as usize];
    assert_eq!(centre, frame.max_iterations);
}

#[test]
fn worker_count_does_not_change_pixels() {
    // Scheduling order varies wildly between these runs; the frame must
    // not.
    let solo = render_counts(1, 160, 120);
    let pooled = render_counts(4, 160, 120);
    assert_eq!(solo.data, pooled.data);
}

#[test]
fn repeated_frames_are_deterministic() {
    let a = render_counts(3, 128, 96);
    let b = render_counts(3, 128, 96);
    assert_eq!(a.data, b.data);
}

#[test]
fn colorized_frame_is_not_all_black() {
    let params = KernelParams::new(256, 10.0).unwrap();
    let frame = render_counts(2, 160, 120);
    let image = Palette::new(&params).colorize(&frame);
    assert_eq!(image.pixels.len(), 160 * 120 * 4);
    assert!(image
        .pixels
        .chunks_exact(4)
        .any(|px| px[0] > 0 || px[1] > 0 || px[2] > 0));
}

#[test]
fn palette_switch_without_recompute() {
    let params = KernelParams::new(256, 10.0).unwrap();
    let frame = render_counts(2, 160, 120);

    let banded = Palette::new(&params);
    let alt = Palette::with_periods(&params, [3, 13, 17]);
    let image_a = banded.colorize(&frame);
    let image_b = alt.colorize(&frame);

    assert_eq!(image_a.pixels.len(), image_b.pixels.len());
    assert_ne!(
        image_a.pixels, image_b.pixels,
        "different palettes should produce different images"
    );
}

#[test]
fn resize_then_rerender_covers_new_canvas() {
    let params = KernelParams::new(128, 10.0).unwrap();
    let mut sched = TileScheduler::new(
        config(2),
        params,
        Viewport::home(96, 96),
        CountBuffer::new(96, 96, params.max_iterations),
    )
    .unwrap();
    sched.render_frame().unwrap();

    // The sink is the caller's to resize; the scheduler only adopts the
    // new viewport.
    *sched.sink_mut() = CountBuffer::new(160, 64, params.max_iterations);
    sched.resize(160, 64).unwrap();
    sched.run_until_idle().unwrap();

    let frame = sched.sink();
    assert_eq!(frame.data.len(), 160 * 64);
    assert!(frame.data.iter().any(|&c| c < params.max_iterations));
}

#[test]
fn zoomed_frame_differs_from_home() {
    let params = KernelParams::new(128, 10.0).unwrap();
    let mut sched = TileScheduler::new(
        config(2),
        params,
        Viewport::home(128, 128),
        CountBuffer::new(128, 128, params.max_iterations),
    )
    .unwrap();
    sched.render_frame().unwrap();
    let home = sched.sink().clone();

    sched.zoom_in_at(32.0, 32.0).unwrap();
    sched.run_until_idle().unwrap();
    assert_ne!(home.data, sched.sink().data);
}
