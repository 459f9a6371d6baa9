//! Follow-through for hair and cloth.
//!
//! Follower bones trail their anchor: the anchor's rotation curve is delayed,
//! scaled, and fed through a critically damped spring. Looping motions run
//! one extra cycle before recording so the result starts in steady state.

use rigcade_model::Keyframe;

/// Integration step in seconds.
const STEP: f64 = 1.0 / 240.0;

/// Spring response parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    /// Natural frequency in rad/s.
    pub stiffness: f64,
    /// Response relative to the anchor.
    pub gain: f64,
    /// Delay in seconds.
    pub lag_seconds: f64,
}

/// Samples a follower's rotation at `times` given its anchor's keys.
pub fn follow(
    anchor: &[Keyframe],
    times: &[f64],
    duration: f64,
    looping: bool,
    params: &SpringParams,
) -> Vec<f64> {
    let target = |t: f64| {
        let s = t - params.lag_seconds;
        let s = if looping {
            s.rem_euclid(duration)
        } else {
            s.clamp(0.0, duration)
        };
        params.gain * sample(anchor, s)
    };

    let mut now = if looping { -duration } else { 0.0 };
    let mut x = target(now);
    let mut v = 0.0;
    let omega = params.stiffness.max(0.0);

    let mut out = Vec::with_capacity(times.len());
    for &time in times {
        while now < time {
            let dt = STEP.min(time - now);
            let goal = target(now + dt);
            let e = x - goal;
            let decay = (-omega * dt).exp();
            let k = (v + omega * e) * dt;
            x = goal + (e + k) * decay;
            v = (v - omega * k) * decay;
            now += dt;
        }
        out.push(x);
    }
    out
}

/// Linearly interpolated rotation of `keys` at `time`.
pub fn sample(keys: &[Keyframe], time: f64) -> f64 {
    let Some(first) = keys.first() else {
        return 0.0;
    };
    if time <= first.time {
        return first.rotation;
    }
    for pair in keys.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if time <= b.time {
            let span = b.time - a.time;
            if span <= 0.0 {
                return b.rotation;
            }
            let f = (time - a.time) / span;
            return a.rotation + (b.rotation - a.rotation) * f;
        }
    }
    keys.last().map_or(0.0, |k| k.rotation)
}
