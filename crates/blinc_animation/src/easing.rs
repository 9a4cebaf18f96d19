//! Easing curves for programmatic scrolls
//!
//! A curve maps linear progress `t ∈ [0, 1]` onto eased progress. The named
//! CSS-style curves are cubic béziers; `Decelerate` is the quadratic
//! ease-out used for fling-like motion.

/// Easing curve
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    /// `cubic-bezier(0.25, 0.1, 0.25, 1.0)`
    Ease,
    /// `cubic-bezier(0.42, 0.0, 1.0, 1.0)`
    EaseIn,
    /// `cubic-bezier(0.0, 0.0, 0.58, 1.0)`
    EaseOut,
    /// `cubic-bezier(0.42, 0.0, 0.58, 1.0)`
    EaseInOut,
    /// `cubic-bezier(0.4, 0.0, 0.2, 1.0)`
    FastOutSlowIn,
    /// `1 - (1 - t)²`
    Decelerate,
    CubicBezier(f64, f64, f64, f64),
}

impl Easing {
    /// Map linear progress to eased progress.
    ///
    /// Input is clamped to `[0, 1]`; both endpoints map exactly to themselves.
    pub fn transform(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }
        match *self {
            Easing::Linear => t,
            Easing::Decelerate => {
                let inverse = 1.0 - t;
                1.0 - inverse * inverse
            }
            Easing::CubicBezier(x1, y1, x2, y2) => solve_cubic_bezier(t, x1, y1, x2, y2),
            named => {
                let (x1, y1, x2, y2) = named.control_points();
                solve_cubic_bezier(t, x1, y1, x2, y2)
            }
        }
    }

    fn control_points(&self) -> (f64, f64, f64, f64) {
        match *self {
            Easing::Ease => (0.25, 0.1, 0.25, 1.0),
            Easing::EaseIn => (0.42, 0.0, 1.0, 1.0),
            Easing::EaseOut => (0.0, 0.0, 0.58, 1.0),
            Easing::EaseInOut => (0.42, 0.0, 0.58, 1.0),
            Easing::FastOutSlowIn => (0.4, 0.0, 0.2, 1.0),
            Easing::CubicBezier(x1, y1, x2, y2) => (x1, y1, x2, y2),
            Easing::Linear | Easing::Decelerate => (0.0, 0.0, 1.0, 1.0),
        }
    }
}

/// Find the bézier parameter whose x equals `x`, then return its y.
///
/// Newton-Raphson first, bisection when the slope is too flat to trust.
fn solve_cubic_bezier(x: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    const EPSILON: f64 = 1e-7;

    let mut p = x;
    for _ in 0..8 {
        let error = bezier_at(p, x1, x2) - x;
        if error.abs() < EPSILON {
            return bezier_at(p, y1, y2);
        }
        let slope = bezier_slope_at(p, x1, x2);
        if slope.abs() < EPSILON {
            break;
        }
        p -= error / slope;
    }

    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    p = x;
    for _ in 0..32 {
        let sample = bezier_at(p, x1, x2);
        if (sample - x).abs() < EPSILON {
            break;
        }
        if sample < x {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }

    bezier_at(p, y1, y2)
}

/// One coordinate of a bézier from (0,0) to (1,1) with control values `p1`, `p2`
#[inline]
fn bezier_at(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn bezier_slope_at(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}
