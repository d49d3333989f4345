use sheetvox::config::PipelineConfig;
use sheetvox::pipeline::Pipeline;
use std::time::Instant;

#[test]
fn tick_timing_stability() {
    let config = PipelineConfig {
        base_duration_ms: 5,
        ..Default::default()
    };
    let mut pipeline = Pipeline::new(config).unwrap();

    let start = Instant::now();
    for _ in 0..1000 {
        // keep both queues busy
        pipeline.feed_text("twinkle TWINKLE little [star] ");
        pipeline.tick_default();
    }
    let duration = start.elapsed();
    // Assert bounded: less than 1 second for 1000 ticks
    assert!(duration.as_millis() < 1000, "Execution took too long: {:?}", duration);
}
