//! The formation engine.
//!
//! A [`Formation`] owns one [`Instance`] per sampled point and drives all of
//! them from a single `update(dt, elapsed)` call per frame:
//!
//! 1. read the pointer once
//! 2. advance every instance's progress under the active transition
//! 3. deform every curve (push, relax, wave)
//! 4. sample every curve and write the transform to the sink
//!
//! Transition requests (`animate_to`, `enter`, ...) may be issued at any time
//! and take effect on the next update: the transition starts at that update's
//! `elapsed`, whatever the driver's clock origin. A new request replaces the
//! previous one and re-bases from the current progress.

use glam::{Affine3A, Vec2, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::animation::{
    AnimationState, DelayConfig, DelayMetric, DelayScheduler, DelayShaping, Phase, Sweep,
    Transition, TransitionKind, TransitionPolicy,
};
use crate::config::FormationConfig;
use crate::curve::{Curve, CurveBuilder};
use crate::deform::{DeformationUpdater, WaveParams};
use crate::errors::{FormationError, Result};
use crate::pointer::{PointerHandle, PointerProjector};
use crate::sampling::{PointField, PointSampler};
use crate::sink::{InstanceBuffer, InstanceSink, InstanceTransform, MaterialProjector};
use crate::utils::{GradientNoise, NoiseField};

/// One animated object: its sample point, curve, delay and progress.
#[derive(Debug, Clone)]
pub struct Instance {
    point: Vec2,
    curve: Curve,
    delay: f32,
    state: AnimationState,
}

impl Instance {
    #[must_use]
    pub fn point(&self) -> Vec2 {
        self.point
    }

    #[must_use]
    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    #[must_use]
    pub fn delay(&self) -> f32 {
        self.delay
    }

    #[must_use]
    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    #[must_use]
    pub fn progress(&self) -> f32 {
        self.state.progress()
    }
}

/// Wires collaborators and validates the configuration.
pub struct FormationBuilder {
    config: FormationConfig,
    sampler: Option<Box<dyn PointSampler>>,
    noise: Option<Box<dyn NoiseField>>,
    projector: Option<Box<dyn PointerProjector>>,
    material: Option<Box<dyn MaterialProjector>>,
}

impl FormationBuilder {
    #[must_use]
    pub fn new(config: FormationConfig) -> Self {
        Self {
            config,
            sampler: None,
            noise: None,
            projector: None,
            material: None,
        }
    }

    #[must_use]
    pub fn sampler(mut self, sampler: impl PointSampler + 'static) -> Self {
        self.sampler = Some(Box::new(sampler));
        self
    }

    /// Overrides the default [`GradientNoise`] built from the config seed.
    #[must_use]
    pub fn noise(mut self, noise: impl NoiseField + 'static) -> Self {
        self.noise = Some(Box::new(noise));
        self
    }

    #[must_use]
    pub fn pointer_projector(mut self, projector: impl PointerProjector + 'static) -> Self {
        self.projector = Some(Box::new(projector));
        self
    }

    #[must_use]
    pub fn material_projector(mut self, projector: impl MaterialProjector + 'static) -> Self {
        self.material = Some(Box::new(projector));
        self
    }

    /// Samples the layout, builds curves and delays, and returns the engine.
    pub fn build<S: InstanceSink>(self, sink: S) -> Result<Formation<S>> {
        let config = self.config;
        config.validate()?;

        let mut sampler = self
            .sampler
            .ok_or(FormationError::MissingCollaborator("point sampler"))?;
        let projector = self
            .projector
            .ok_or(FormationError::MissingCollaborator("pointer projector"))?;
        let noise = self.noise.unwrap_or_else(|| -> Box<dyn NoiseField> {
            Box::new(GradientNoise::new(config.noise, config.noise_seed()))
        });

        let area = config.area_size();
        let mut points = PointField::generate(
            sampler.as_mut(),
            area,
            config.min_separation,
            config.max_separation,
        );
        // Bridson grows outward from its first point, so a plain prefix would
        // cover only part of the picture.
        if let Some(max) = config.max_instances
            && max < points.len()
        {
            points.shuffle(&mut StdRng::seed_from_u64(config.seed));
            points.truncate(max);
        }
        if points.is_empty() {
            log::warn!("Formation sampled zero points in a {area} area; updates will be no-ops");
        }

        let builder = CurveBuilder::new(config.curve, noise.as_ref())?;
        let delays = DelayScheduler::new(config.delay).compute_all(&points, noise.as_ref());

        let instances: Vec<Instance> = points
            .into_iter()
            .zip(delays)
            .map(|(point, delay)| {
                let rest = Vec3::new(point.x, point.y, config.rest_depth.sample(point, noise.as_ref()));
                Instance {
                    point,
                    curve: Curve::new(builder.build(rest, config.curve.origin_extent)),
                    delay,
                    state: AnimationState::new(config.initial_progress),
                }
            })
            .collect();

        let world = Affine3A::from_scale(area.extend(1.0));
        if let Some(mut material) = self.material {
            material.project(&world);
        }

        let formation = Formation {
            config,
            instances,
            noise,
            deformer: DeformationUpdater::new(config.deformation),
            projector,
            pointer: PointerHandle::new(),
            pending: None,
            transition: None,
            now: 0.0,
            world,
            sink,
        };

        log::debug!(
            "Formation built: {} instances, {} vertices per curve, max delay {:.3}s, policy {:?}",
            formation.instances.len(),
            config.curve.vertex_count,
            formation.max_delay(),
            config.transition_policy,
        );

        Ok(formation)
    }
}

pub struct Formation<S: InstanceSink = InstanceBuffer> {
    config: FormationConfig,
    instances: Vec<Instance>,
    noise: Box<dyn NoiseField>,
    deformer: DeformationUpdater,
    projector: Box<dyn PointerProjector>,
    pointer: PointerHandle,
    /// Requested but not yet started; latched by the next update.
    pending: Option<TransitionKind>,
    transition: Option<Transition>,
    /// Elapsed time of the most recent update.
    now: f32,
    world: Affine3A,
    sink: S,
}

impl<S: InstanceSink> Formation<S> {
    // ========================================================================
    // Frame Update
    // ========================================================================

    /// Advances one frame and writes one transform per instance to the sink.
    pub fn update(&mut self, dt: f32, elapsed: f32) {
        self.now = elapsed;

        if self.instances.is_empty() {
            self.pending = None;
            self.transition = None;
            return;
        }

        if let Some(kind) = self.pending.take() {
            self.latch(kind, elapsed);
        }

        let pointer = self.pointer.get();
        let duration = self.config.duration;
        let scale = self.config.instance_scale;
        let mut finished = true;

        self.sink.begin_frame(self.instances.len());
        for (index, instance) in self.instances.iter_mut().enumerate() {
            if let Some(transition) = &self.transition {
                let fraction = instance.state.advance(transition, elapsed, instance.delay, duration);
                finished &= fraction >= 1.0;
            }

            self.deformer.apply(&mut instance.curve, pointer, dt, elapsed);

            let sample = instance.curve.sample(instance.state.progress());
            self.sink.write(index, &InstanceTransform::from_sample(&sample, scale));
        }
        self.sink.end_frame();

        if finished && let Some(transition) = self.transition.take() {
            log::info!(
                "Transition {:?} finished after {:.3}s",
                transition.kind,
                elapsed - transition.start_time
            );
        }
    }

    // ========================================================================
    // Transition Requests
    // ========================================================================

    /// Interpolates every instance from its current progress toward `progress`.
    pub fn animate_to(&mut self, progress: f32) {
        let target = clamp_request(progress);
        self.request(TransitionKind::Toward(target));
    }

    /// Places every instance at `progress` immediately.
    pub fn move_to(&mut self, progress: f32) {
        let progress = clamp_request(progress);
        for instance in &mut self.instances {
            instance.state.jump(progress);
        }
        self.pending = None;
        self.transition = None;
        log::debug!("Formation moved to {progress}");
    }

    /// Fly in from the near extreme to the rest pose.
    pub fn enter(&mut self) {
        self.sweep(Sweep::Enter);
    }

    /// Fly out from the rest pose to the far extreme.
    pub fn exit(&mut self) {
        self.sweep(Sweep::Exit);
    }

    /// Fly in from the far extreme to the rest pose.
    pub fn enter_reversed(&mut self) {
        self.sweep(Sweep::EnterReversed);
    }

    /// Fly out from the rest pose back to the near extreme.
    pub fn exit_reversed(&mut self) {
        self.sweep(Sweep::ExitReversed);
    }

    fn sweep(&mut self, sweep: Sweep) {
        match self.config.transition_policy {
            TransitionPolicy::Snapshot => self.animate_to(sweep.endpoints().1),
            TransitionPolicy::HalfRange => self.request(TransitionKind::Sweep(sweep)),
        }
    }

    fn request(&mut self, kind: TransitionKind) {
        let previous = self.pending.or(self.transition.map(|t| t.kind));
        if let Some(previous) = previous {
            log::debug!("Transition {previous:?} replaced by {kind:?}");
        }
        self.pending = Some(kind);
    }

    /// Snapshots every instance and starts `kind` at `now`.
    fn latch(&mut self, kind: TransitionKind, now: f32) {
        let target = kind.target();
        for instance in &mut self.instances {
            instance.state.begin(target, now);
        }
        self.transition = Some(Transition {
            kind,
            start_time: now,
        });
        log::debug!("Transition {kind:?} started at t={now:.3}");
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.pending.is_some() || self.transition.is_some() {
            Phase::Transitioning
        } else {
            Phase::AtRest
        }
    }

    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.phase() == Phase::Transitioning
    }

    /// The running transition. `None` while a request waits for its first update.
    #[must_use]
    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    // ========================================================================
    // Pointer
    // ========================================================================

    /// Projects a screen-space pointer position and stores it for the next frame.
    pub fn on_pointer_move(&mut self, screen_x: f32, screen_y: f32) {
        let world = self.projector.project(Vec2::new(screen_x, screen_y));
        self.pointer.set(world);
    }

    pub fn clear_pointer(&mut self) {
        self.pointer.clear();
    }

    /// Handle for writing the pointer from outside the frame loop.
    #[must_use]
    pub fn pointer_handle(&self) -> PointerHandle {
        self.pointer.clone()
    }

    // ========================================================================
    // Tunables
    // ========================================================================

    pub fn set_delay_factor(&mut self, factor: f32) -> Result<()> {
        let mut delay = self.config.delay;
        delay.factor = factor;
        self.apply_delay_config(delay)
    }

    pub fn set_delay_metric(&mut self, metric: DelayMetric) -> Result<()> {
        let mut delay = self.config.delay;
        delay.metric = metric;
        self.apply_delay_config(delay)
    }

    pub fn set_delay_shaping(&mut self, shaping: DelayShaping) -> Result<()> {
        let mut delay = self.config.delay;
        delay.shaping = shaping;
        self.apply_delay_config(delay)
    }

    fn apply_delay_config(&mut self, delay: DelayConfig) -> Result<()> {
        delay.validate()?;
        self.config.delay = delay;

        let points: Vec<Vec2> = self.instances.iter().map(|i| i.point).collect();
        let delays = DelayScheduler::new(delay).compute_all(&points, self.noise.as_ref());
        for (instance, delay) in self.instances.iter_mut().zip(delays) {
            instance.delay = delay;
        }
        log::debug!("Delays recomputed, max delay {:.3}s", self.max_delay());
        Ok(())
    }

    pub fn set_displacement_radius(&mut self, radius: f32) -> Result<()> {
        if radius.is_nan() || radius < 0.0 {
            return Err(FormationError::NegativeRadius(radius));
        }
        self.config.deformation.displacement_radius = radius;
        self.deformer.config_mut().displacement_radius = radius;
        Ok(())
    }

    pub fn set_wave(&mut self, wave: WaveParams) -> Result<()> {
        wave.validate()?;
        self.config.deformation.wave = wave;
        self.deformer.config_mut().wave = wave;
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn config(&self) -> &FormationConfig {
        &self.config
    }

    /// Read-only instance data, e.g. for a debug curve renderer.
    #[must_use]
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    #[must_use]
    pub fn max_delay(&self) -> f32 {
        self.instances.iter().map(|i| i.delay).fold(0.0, f32::max)
    }

    /// Elapsed time of the most recent update.
    #[must_use]
    pub fn now(&self) -> f32 {
        self.now
    }

    /// Maps the unit square centered on the origin onto the formation area.
    #[must_use]
    pub fn world_transform(&self) -> &Affine3A {
        &self.world
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Snaps every curve back to its pristine shape.
    pub fn reset_curves(&mut self) {
        for instance in &mut self.instances {
            instance.curve.reset();
        }
    }
}

fn clamp_request(progress: f32) -> f32 {
    if progress.is_nan() {
        log::warn!("Ignoring NaN progress request, using 0");
        return 0.0;
    }
    let clamped = progress.clamp(0.0, 1.0);
    if clamped != progress {
        log::warn!("Progress request {progress} clamped to {clamped}");
    }
    clamped
}
