//! Run the scripted crowd scenarios through the full pipeline and print
//! the per-frame analytics.

use crowdwatch::{CorePipeline, Detector, PipelineConfig, Scenario, ScriptedDetector};

fn run_scenario(scenario: Scenario, frames: u32) -> anyhow::Result<()> {
    println!("\n=== {scenario:?} scenario ({frames} frames) ===");

    let config = PipelineConfig::default();
    let mut detector = ScriptedDetector::new(
        scenario,
        config.analytics.frame_width,
        config.analytics.frame_height,
    );
    let mut pipeline = CorePipeline::new(config)?;

    let mut last = None;
    for _ in 0..frames {
        let detections = detector.next_frame()?;
        let output = pipeline.process_frame(&detections)?;
        let s = &output.snapshot;
        println!(
            "frame {:3}: {:8} | persons {:2} | density {:.1} | coherence {:5.1} | ke {:8.2} (avg {:8.2}{})",
            s.frame_count,
            format!("{:?}", s.status),
            s.person_count,
            s.density.max_density,
            s.motion_coherence.std_deviation,
            s.kinetic_energy.current,
            s.kinetic_energy.moving_average,
            if s.kinetic_energy.spike_detected { ", SPIKE" } else { "" },
        );
        last = Some(output.snapshot);
    }

    if let Some(snapshot) = last {
        println!("\nfinal snapshot JSON:\n{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    run_scenario(Scenario::Calm, 30)?;
    run_scenario(Scenario::Congested, 30)?;
    run_scenario(Scenario::Panic, 30)?;

    Ok(())
}
