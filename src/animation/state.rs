use serde::{Deserialize, Serialize};

/// How the directional requests (`enter`, `exit`, ...) are realized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Every request interpolates from a progress snapshot toward a shared target.
    #[default]
    Snapshot,
    /// Directional requests remap elapsed time onto a fixed half of the curve.
    HalfRange,
}

/// A directional request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    Enter,
    Exit,
    EnterReversed,
    ExitReversed,
}

impl Sweep {
    /// `(from, to)` progress of the half-range this sweep covers.
    #[must_use]
    pub fn endpoints(self) -> (f32, f32) {
        match self {
            Sweep::Enter => (0.0, 0.5),
            Sweep::Exit => (0.5, 1.0),
            Sweep::EnterReversed => (1.0, 0.5),
            Sweep::ExitReversed => (0.5, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionKind {
    /// Interpolate from each instance's snapshot toward a shared target.
    Toward(f32),
    /// Follow a fixed half-range timeline.
    Sweep(Sweep),
}

impl TransitionKind {
    /// Progress every instance ends at.
    #[must_use]
    pub fn target(self) -> f32 {
        match self {
            TransitionKind::Toward(target) => target,
            TransitionKind::Sweep(sweep) => sweep.endpoints().1,
        }
    }
}

/// The active transition request shared by all instances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub start_time: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AtRest,
    Transitioning,
}

/// Per-instance progress along its curve.
///
/// `current_progress` stays within `[0, 1]` at all times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    pub previous_progress: f32,
    pub current_progress: f32,
    pub target_progress: f32,
    pub transition_start: f32,
}

impl AnimationState {
    #[must_use]
    pub fn new(progress: f32) -> Self {
        let progress = progress.clamp(0.0, 1.0);
        Self {
            previous_progress: progress,
            current_progress: progress,
            target_progress: progress,
            transition_start: 0.0,
        }
    }

    #[inline]
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.current_progress
    }

    /// Snapshots the current progress and aims at `target`.
    pub fn begin(&mut self, target: f32, now: f32) {
        self.previous_progress = self.current_progress;
        self.target_progress = target.clamp(0.0, 1.0);
        self.transition_start = now;
    }

    /// Places the instance at `progress` immediately.
    pub fn jump(&mut self, progress: f32) {
        let progress = progress.clamp(0.0, 1.0);
        self.previous_progress = progress;
        self.current_progress = progress;
        self.target_progress = progress;
    }

    /// Advances under `transition` and returns the instance's time fraction.
    ///
    /// The fraction is `0` until `delay` has elapsed since the transition
    /// start, then ramps linearly to `1` over `duration`. Progress stays at the
    /// snapshot while the fraction is `0`.
    pub fn advance(&mut self, transition: &Transition, now: f32, delay: f32, duration: f32) -> f32 {
        let fraction = window_fraction(now, transition.start_time, delay, duration);
        let snapshot = self.previous_progress;

        self.current_progress = if fraction >= 1.0 {
            transition.kind.target()
        } else {
            match transition.kind {
                TransitionKind::Toward(_) => lerp(snapshot, self.target_progress, fraction),
                TransitionKind::Sweep(sweep) => sweep_progress(sweep, snapshot, fraction),
            }
        }
        .clamp(0.0, 1.0);
        fraction
    }
}

#[inline]
fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Progress of a sweep from `snapshot` at `fraction` of its window.
///
/// A snapshot inside the sweep's half follows the fixed half-range timeline
/// but never steps back behind the snapshot. A snapshot outside the half
/// ramps straight to the sweep's end.
fn sweep_progress(sweep: Sweep, snapshot: f32, fraction: f32) -> f32 {
    let (from, to) = sweep.endpoints();
    let inside = snapshot >= from.min(to) && snapshot <= from.max(to);
    if !inside {
        return lerp(snapshot, to, fraction);
    }
    let timeline = lerp(from, to, fraction);
    if to >= from {
        timeline.max(snapshot)
    } else {
        timeline.min(snapshot)
    }
}

/// `clamp01((now - (start + delay)) / duration)`.
#[must_use]
pub fn window_fraction(now: f32, start: f32, delay: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return if now >= start + delay { 1.0 } else { 0.0 };
    }
    ((now - (start + delay)) / duration).clamp(0.0, 1.0)
}
