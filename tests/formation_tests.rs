//! Formation engine tests
//!
//! Tests for:
//! - Construction: validation, missing collaborators, degenerate layouts
//! - animate_to / move_to timing and re-basing
//! - enter / exit sweeps under both transition policies
//! - Pointer wiring and delay reconfiguration
//! - Transforms written to the sink

use std::cell::Cell;
use std::rc::Rc;

use glam::{Affine3A, Mat4, Vec2, Vec3};

use formation::animation::Phase;
use formation::deform::WaveParams;
use formation::{
    DelayMetric, DelayShaping, FixedSampler, Formation, FormationBuilder, FormationConfig,
    FormationError, InstanceBuffer, MaterialProjector, PlaneProjector, PointerProjector,
    PoissonDiskSampler, TransitionPolicy,
};

const EPSILON: f32 = 1e-5;
const DT: f32 = 1.0 / 60.0;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Treats screen coordinates as world XY on the z = 0 plane.
struct FlatProjector;

impl PointerProjector for FlatProjector {
    fn project(&self, screen: Vec2) -> Option<Vec3> {
        Some(screen.extend(0.0))
    }
}

/// 2×2 area, so sampler points are shifted by (-1, -1).
fn base_config() -> FormationConfig {
    let mut config = FormationConfig::sphere();
    config.area_height = 2.0;
    config.aspect_ratio = 1.0;
    config.duration = 1.3;
    config.rest_depth.amplitude = 0.0;
    config.delay.factor = 1.0;
    config.delay.metric = DelayMetric::Distance;
    config.delay.shaping = DelayShaping::Logarithm;
    config.deformation.wave = WaveParams::NONE;
    config
}

/// Three instances resting at (0,0), (1,0), (2,0).
fn row_sampler() -> FixedSampler {
    FixedSampler::new(vec![Vec2::new(1.0, 1.0), Vec2::new(2.0, 1.0), Vec2::new(3.0, 1.0)])
}

fn build(config: FormationConfig) -> Formation<InstanceBuffer> {
    FormationBuilder::new(config)
        .sampler(row_sampler())
        .pointer_projector(FlatProjector)
        .build(InstanceBuffer::new())
        .expect("valid formation")
}

fn progresses(formation: &Formation<InstanceBuffer>) -> Vec<f32> {
    formation.instances().iter().map(|i| i.progress()).collect()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn even_vertex_count_is_rejected_not_adjusted() {
    let mut config = base_config();
    config.curve.vertex_count = 50;
    let result = FormationBuilder::new(config)
        .sampler(row_sampler())
        .pointer_projector(FlatProjector)
        .build(InstanceBuffer::new());
    assert!(matches!(result, Err(FormationError::InvalidVertexCount(50))));
}

#[test]
fn invalid_duration_and_radius_are_rejected() {
    let mut config = base_config();
    config.duration = 0.0;
    let result = FormationBuilder::new(config)
        .sampler(row_sampler())
        .pointer_projector(FlatProjector)
        .build(InstanceBuffer::new());
    assert!(matches!(result, Err(FormationError::NonPositiveDuration(_))));

    let mut config = base_config();
    config.deformation.displacement_radius = -0.5;
    let result = FormationBuilder::new(config)
        .sampler(row_sampler())
        .pointer_projector(FlatProjector)
        .build(InstanceBuffer::new());
    assert!(matches!(result, Err(FormationError::NegativeRadius(_))));
}

#[test]
fn inverted_separation_is_rejected() {
    let mut config = base_config();
    config.max_separation = config.min_separation * 0.5;
    let result = FormationBuilder::new(config)
        .sampler(row_sampler())
        .pointer_projector(FlatProjector)
        .build(InstanceBuffer::new());
    assert!(matches!(
        result,
        Err(FormationError::InvalidConfig { field: "max_separation", .. })
    ));
}

#[test]
fn missing_collaborators_fail_fast() {
    let result = FormationBuilder::new(base_config())
        .pointer_projector(FlatProjector)
        .build(InstanceBuffer::new());
    assert!(matches!(result, Err(FormationError::MissingCollaborator("point sampler"))));

    let result = FormationBuilder::new(base_config())
        .sampler(row_sampler())
        .build(InstanceBuffer::new());
    assert!(matches!(result, Err(FormationError::MissingCollaborator("pointer projector"))));
}

#[test]
fn zero_points_make_update_a_noop() {
    let mut formation = FormationBuilder::new(base_config())
        .sampler(FixedSampler::default())
        .pointer_projector(FlatProjector)
        .build(InstanceBuffer::new())
        .unwrap();
    assert!(formation.is_empty());

    formation.animate_to(1.0);
    formation.update(DT, 0.5);
    assert_eq!(formation.sink().frames(), 0);
    assert!(formation.sink().transforms().is_empty());
    assert_eq!(formation.phase(), Phase::AtRest);
}

#[test]
fn points_are_centered_and_curves_rest_on_them() {
    let formation = build(base_config());
    let expected = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)];
    for (instance, point) in formation.instances().iter().zip(expected) {
        assert_eq!(instance.point(), point);
        assert_eq!(instance.curve().rest_vertex(), Some(point.extend(0.0)));
    }
}

#[test]
fn poisson_layout_builds() {
    let mut config = FormationConfig::boxes();
    config.area_height = 2.0;
    config.max_instances = Some(25);
    let formation = FormationBuilder::new(config)
        .sampler(PoissonDiskSampler::new(3))
        .pointer_projector(FlatProjector)
        .build(InstanceBuffer::new())
        .unwrap();
    assert_eq!(formation.len(), 25);
    assert_eq!(
        formation.instances().iter().map(|i| i.delay()).fold(f32::INFINITY, f32::min),
        0.0
    );
}

#[test]
fn instance_cap_keeps_a_spread_out_subset() {
    let mut config = FormationConfig::boxes();
    config.area_height = 4.0;
    config.aspect_ratio = 1.0;
    config.max_instances = Some(40);
    let formation = FormationBuilder::new(config)
        .sampler(PoissonDiskSampler::new(9))
        .pointer_projector(FlatProjector)
        .build(InstanceBuffer::new())
        .unwrap();
    assert_eq!(formation.len(), 40);

    // Every quadrant of the 4x4 area keeps some instances.
    let mut quadrants = [0; 4];
    for instance in formation.instances() {
        let p = instance.point();
        quadrants[usize::from(p.x >= 0.0) + 2 * usize::from(p.y >= 0.0)] += 1;
    }
    assert!(quadrants.iter().all(|n| *n > 0), "{quadrants:?}");
}

#[test]
fn material_projector_runs_once_at_construction() {
    struct Counting(Rc<Cell<u32>>, Rc<Cell<Vec3>>);
    impl MaterialProjector for Counting {
        fn project(&mut self, world: &Affine3A) {
            self.0.set(self.0.get() + 1);
            self.1.set(world.transform_vector3(Vec3::ONE));
        }
    }

    let calls = Rc::new(Cell::new(0));
    let extent = Rc::new(Cell::new(Vec3::ZERO));
    let mut formation = FormationBuilder::new(base_config())
        .sampler(row_sampler())
        .pointer_projector(FlatProjector)
        .material_projector(Counting(calls.clone(), extent.clone()))
        .build(InstanceBuffer::new())
        .unwrap();
    formation.update(DT, DT);
    formation.update(DT, 2.0 * DT);

    assert_eq!(calls.get(), 1);
    assert_eq!(extent.get(), Vec3::new(2.0, 2.0, 1.0));
}

// ============================================================================
// animate_to / move_to
// ============================================================================

#[test]
fn animate_to_without_delays_hits_target_after_duration() {
    let mut config = base_config();
    config.delay.factor = 0.0;
    config.duration = 2.0;
    let mut formation = build(config);

    let t0 = 3.0;
    formation.update(DT, t0);
    let before = progresses(&formation);

    formation.animate_to(1.0);
    formation.update(DT, t0);
    assert_eq!(progresses(&formation), before, "no jump at the start time");

    formation.update(DT, t0 + 2.0);
    assert!(progresses(&formation).iter().all(|p| *p == 1.0));
    assert_eq!(formation.phase(), Phase::AtRest);
}

#[test]
fn staggered_start_holds_late_instances() {
    let mut formation = build(base_config());
    let delays: Vec<f32> = formation.instances().iter().map(|i| i.delay()).collect();
    assert_eq!(delays[0], 0.0);
    assert!(approx(delays[1], 2.0_f32.ln()));
    assert!(approx(delays[2], 3.0_f32.ln()));

    formation.animate_to(1.0);
    formation.update(DT, 0.0);
    formation.update(DT, 0.1);

    let p = progresses(&formation);
    assert!(p[0] > 0.0);
    assert_eq!(p[1], 0.0);
    assert_eq!(p[2], 0.0);
    assert!(formation.is_transitioning());

    // Everybody is done by start + max(delay) + duration.
    formation.update(DT, 3.0_f32.ln() + 1.3 + 1e-3);
    assert!(progresses(&formation).iter().all(|p| *p == 1.0));
    assert!(!formation.is_transitioning());
}

#[test]
fn new_request_rebases_from_current_progress() {
    let mut config = base_config();
    config.delay.factor = 0.0;
    config.duration = 1.0;
    let mut formation = build(config);

    formation.animate_to(1.0);
    formation.update(DT, 0.0);
    formation.update(DT, 0.5);
    let mid = progresses(&formation)[0];
    assert!(approx(mid, 0.5));

    formation.animate_to(0.0);
    formation.update(DT, 0.5);
    assert!(approx(progresses(&formation)[0], mid), "re-based from mid-flight");

    formation.update(DT, 1.0);
    assert!(approx(progresses(&formation)[0], 0.25));
}

#[test]
fn move_to_is_instant_and_cancels_transition() {
    let mut formation = build(base_config());
    formation.animate_to(1.0);
    formation.update(DT, 0.2);

    formation.move_to(0.5);
    assert_eq!(formation.phase(), Phase::AtRest);
    formation.update(DT, 0.3);
    assert!(progresses(&formation).iter().all(|p| *p == 0.5));
}

#[test]
fn out_of_range_requests_are_clamped() {
    let mut formation = build(base_config());
    formation.move_to(4.0);
    assert!(progresses(&formation).iter().all(|p| *p == 1.0));
    formation.animate_to(-2.0);
    formation.update(DT, 0.0);
    formation.update(DT, 100.0);
    assert!(progresses(&formation).iter().all(|p| *p == 0.0));
}

#[test]
fn request_before_first_update_starts_on_that_update() {
    let mut formation = build(base_config());
    formation.animate_to(1.0);
    assert!(formation.is_transitioning());
    assert!(formation.transition().is_none());

    formation.update(DT, 50.0);
    assert_eq!(progresses(&formation), vec![0.0, 0.0, 0.0]);
    assert_eq!(formation.transition().map(|t| t.start_time), Some(50.0));

    formation.update(DT, 50.0 + 0.65);
    let p = progresses(&formation);
    assert!((p[0] - 0.5).abs() < 1e-4, "{p:?}");
    assert_eq!(p[2], 0.0);

    formation.update(DT, 50.0 + 3.0_f32.ln() + 1.3 + 1e-3);
    assert!(progresses(&formation).iter().all(|p| *p == 1.0));
}

#[test]
fn request_between_frames_starts_at_next_elapsed() {
    let mut config = base_config();
    config.delay.factor = 0.0;
    config.duration = 1.0;
    let mut formation = build(config);

    formation.update(DT, 1.0);
    formation.animate_to(1.0);
    // The driver's clock moved on before the next frame.
    formation.update(DT, 4.0);
    assert!(progresses(&formation).iter().all(|p| *p == 0.0));
    formation.update(DT, 4.5);
    assert!(progresses(&formation).iter().all(|p| approx(*p, 0.5)));
}

// ============================================================================
// Sweeps
// ============================================================================

#[test]
fn half_range_enter_and_exit() {
    let mut config = base_config();
    config.transition_policy = TransitionPolicy::HalfRange;
    let mut formation = build(config);
    let done = 3.0_f32.ln() + 1.3 + 1e-3;

    formation.enter();
    formation.update(DT, 0.0);
    formation.update(DT, 0.65);
    assert!(approx(progresses(&formation)[0], 0.25));
    formation.update(DT, done);
    assert!(progresses(&formation).iter().all(|p| *p == 0.5));

    formation.exit();
    formation.update(DT, done);
    assert!(progresses(&formation).iter().all(|p| *p == 0.5));
    formation.update(DT, 2.0 * done);
    assert!(progresses(&formation).iter().all(|p| *p == 1.0));
}

#[test]
fn half_range_reversed_sweeps() {
    let mut config = base_config();
    config.transition_policy = TransitionPolicy::HalfRange;
    config.delay.factor = 0.0;
    config.duration = 1.0;
    let mut formation = build(config);
    formation.move_to(1.0);

    formation.enter_reversed();
    formation.update(DT, 0.0);
    assert!(progresses(&formation).iter().all(|p| *p == 1.0));
    formation.update(DT, 0.5);
    assert!(progresses(&formation).iter().all(|p| approx(*p, 0.75)));

    // Outside the exit half, so it ramps from where it is.
    formation.exit_reversed();
    formation.update(DT, 0.5);
    assert!(progresses(&formation).iter().all(|p| approx(*p, 0.75)));
    formation.update(DT, 1.0);
    assert!(progresses(&formation).iter().all(|p| approx(*p, 0.375)));
    formation.update(DT, 1.5);
    assert!(progresses(&formation).iter().all(|p| *p == 0.0));
}

#[test]
fn enter_then_exit_mid_flight_stays_in_range() {
    for policy in [TransitionPolicy::Snapshot, TransitionPolicy::HalfRange] {
        let mut config = base_config();
        config.transition_policy = policy;
        let mut formation = build(config);

        formation.enter();
        let mut t = 0.0;
        for _ in 0..20 {
            t += DT;
            formation.update(DT, t);
        }
        formation.exit();
        for _ in 0..400 {
            t += DT;
            formation.update(DT, t);
            assert!(
                progresses(&formation).iter().all(|p| (0.0..=1.0).contains(p)),
                "{policy:?} left [0, 1]"
            );
        }
        assert!(progresses(&formation).iter().all(|p| *p == 1.0), "{policy:?}");
    }
}

#[test]
fn mid_flight_sweep_is_continuous_and_respects_delays() {
    let mut config = base_config();
    config.transition_policy = TransitionPolicy::HalfRange;
    let mut formation = build(config);
    let max_step = DT / config.duration + EPSILON;

    formation.enter();
    let mut t = 0.0;
    while t < 0.3 {
        formation.update(DT, t);
        t += DT;
    }
    let before = progresses(&formation);
    assert!(before[0] > 0.0);
    assert_eq!(&before[1..], &[0.0, 0.0]);

    formation.exit();
    let mut last = before.clone();
    for _ in 0..40 {
        formation.update(DT, t);
        t += DT;
        let now = progresses(&formation);
        for (a, b) in last.iter().zip(&now) {
            assert!((b - a).abs() <= max_step, "jumped from {a} to {b}");
        }
        last = now;
    }

    // Delays of ln 2 and ln 3 have not elapsed yet.
    assert_eq!(&last[1..], &[0.0, 0.0]);
    assert!(last[0] > before[0]);
}

#[test]
fn snapshot_policy_maps_sweeps_onto_targets() {
    let mut config = base_config();
    config.delay.factor = 0.0;
    config.duration = 1.0;
    let mut formation = build(config);

    formation.move_to(0.9);
    formation.enter();
    formation.update(DT, 0.0);
    formation.update(DT, 0.5);
    assert!(progresses(&formation).iter().all(|p| approx(*p, 0.7)));

    formation.exit_reversed();
    formation.update(DT, 0.5);
    formation.update(DT, 10.0);
    assert!(progresses(&formation).iter().all(|p| *p == 0.0));
}

// ============================================================================
// Pointer & Tunables
// ============================================================================

#[test]
fn pointer_move_pushes_nearby_curves() {
    let mut formation = build(base_config());
    formation.move_to(0.5);
    formation.on_pointer_move(0.2, 0.0);
    formation.update(DT, DT);

    let near = formation.instances()[0].curve();
    let pushed = near.working()[near.center_index()];
    assert!(pushed.x < 0.0, "rest vertex should move away from the pointer: {pushed}");

    // The pointer is 1.8 away from the third rest vertex, outside the radius.
    let far = formation.instances()[2].curve();
    assert_eq!(far.working()[far.center_index()], far.target()[far.center_index()]);

    formation.clear_pointer();
    assert_eq!(formation.pointer_handle().get(), None);
}

#[test]
fn pointer_handle_feeds_the_next_frame() {
    let mut formation = build(base_config());
    formation.move_to(0.5);
    let handle = formation.pointer_handle();
    handle.set(Some(Vec3::new(1.1, 0.0, 0.0)));
    formation.update(DT, DT);

    let curve = formation.instances()[1].curve();
    assert!(curve.working()[curve.center_index()].x < 1.0);
}

#[test]
fn plane_projector_drives_pointer() {
    let projection = Mat4::orthographic_rh(-2.0, 2.0, -2.0, 2.0, 0.1, 50.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    let mut formation = FormationBuilder::new(base_config())
        .sampler(row_sampler())
        .pointer_projector(PlaneProjector::new(projection * view, Vec2::new(400.0, 400.0), 0.0))
        .build(InstanceBuffer::new())
        .unwrap();

    formation.on_pointer_move(200.0, 200.0);
    let pointer = formation.pointer_handle().get().unwrap();
    assert!(pointer.length() < 1e-4, "{pointer}");
}

#[test]
fn changing_delay_factor_renormalizes() {
    let mut formation = build(base_config());
    let before: Vec<f32> = formation.instances().iter().map(|i| i.delay()).collect();

    formation.set_delay_factor(2.0).unwrap();
    let after: Vec<f32> = formation.instances().iter().map(|i| i.delay()).collect();
    for (a, b) in before.iter().zip(&after) {
        assert!(approx(*b, 2.0 * a));
    }
    assert_eq!(after[0], 0.0);

    formation.set_delay_shaping(DelayShaping::Identity).unwrap();
    let linear: Vec<f32> = formation.instances().iter().map(|i| i.delay()).collect();
    assert!(approx(linear[2], 4.0));

    assert!(formation.set_delay_factor(-1.0).is_err());
    assert!(formation.set_delay_shaping(DelayShaping::Power { exponent: -1.0 }).is_err());
    assert_eq!(formation.config().delay.shaping, DelayShaping::Identity);
}

#[test]
fn tunable_setters_validate() {
    let mut formation = build(base_config());
    assert!(matches!(
        formation.set_displacement_radius(-1.0),
        Err(FormationError::NegativeRadius(_))
    ));
    formation.set_displacement_radius(0.5).unwrap();
    assert_eq!(formation.config().deformation.displacement_radius, 0.5);

    let mut wave = WaveParams::default();
    wave.attenuation = -1.0;
    assert!(formation.set_wave(wave).is_err());
}

// ============================================================================
// Sink Output
// ============================================================================

#[test]
fn resting_instances_write_rest_positions() {
    let mut formation = build(base_config());
    formation.move_to(0.5);
    formation.update(DT, DT);

    let sink = formation.sink();
    assert_eq!(sink.frames(), 1);
    assert_eq!(sink.transforms().len(), 3);
    for (transform, instance) in sink.transforms().iter().zip(formation.instances()) {
        assert_eq!(Some(transform.position), instance.curve().rest_vertex());
        assert!(approx(transform.scale.x, formation.config().instance_scale));
    }
    assert_eq!(sink.as_bytes().len(), 3 * 64);
}

#[test]
fn wave_moves_resting_instances_in_depth() {
    let mut config = base_config();
    config.deformation.wave = WaveParams {
        frequency: 0.3,
        speed: 2.0,
        amplitude: 0.2,
        attenuation: 0.1,
    };
    let mut formation = build(config);
    formation.move_to(0.5);
    formation.update(DT, 0.0);

    let z = formation.sink().transforms()[0].position.z;
    assert!(approx(z, 0.2), "origin instance rides the crest: {z}");
}
