//! Headless formation driver.
//!
//! Steps a formation through enter, a pointer sweep and exit with a fixed
//! frame clock, logging progress along the way. Pass a JSON config path to
//! override the preset:
//!
//! ```text
//! RUST_LOG=debug cargo run --example headless -- [boxes | path/to/config.json]
//! ```

use std::time::Duration;

use glam::{Mat4, Vec2, Vec3};

use formation::{
    FormationBuilder, FormationConfig, FrameClock, InstanceBuffer, PlaneProjector,
    PoissonDiskSampler,
};

const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);
const FRAME: Duration = Duration::from_micros(16_667);

fn load_config(arg: Option<&str>) -> anyhow::Result<FormationConfig> {
    Ok(match arg {
        None | Some("sphere") => FormationConfig::sphere(),
        Some("boxes") => FormationConfig::boxes(),
        Some(path) => FormationConfig::from_json_file(path)?,
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let arg = std::env::args().nth(1);
    let config = load_config(arg.as_deref())?;

    let area = config.area_size();
    let projection = Mat4::perspective_rh(45_f32.to_radians(), VIEWPORT.x / VIEWPORT.y, 0.1, 100.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, area.y * 1.4), Vec3::ZERO, Vec3::Y);

    let mut formation = FormationBuilder::new(config)
        .sampler(PoissonDiskSampler::new(config.seed))
        .pointer_projector(PlaneProjector::new(projection * view, VIEWPORT, 0.0))
        .build(InstanceBuffer::new())?;
    log::info!(
        "Built {} instances over {:.2}x{:.2}, max delay {:.2}s",
        formation.len(),
        area.x,
        area.y,
        formation.max_delay()
    );

    let mut clock = FrameClock::new();
    let mut step = |formation: &mut formation::Formation, frames: u32| {
        for _ in 0..frames {
            clock.advance(FRAME);
            formation.update(clock.dt_seconds(), clock.elapsed_seconds());
        }
    };

    let settle = ((config.duration + formation.max_delay()) / FRAME.as_secs_f32()).ceil() as u32 + 1;

    formation.enter();
    step(&mut formation, settle);
    log::info!("Entered: phase {:?}", formation.phase());

    // Drag the pointer across the middle row of the screen.
    for i in 0..=120 {
        let x = VIEWPORT.x * i as f32 / 120.0;
        formation.on_pointer_move(x, VIEWPORT.y * 0.5);
        step(&mut formation, 1);
    }
    formation.clear_pointer();
    step(&mut formation, 120);

    formation.exit();
    step(&mut formation, settle);
    log::info!(
        "Exited: phase {:?}, {} frames, {} bytes per upload",
        formation.phase(),
        formation.sink().frames(),
        formation.sink().as_bytes().len()
    );

    Ok(())
}
