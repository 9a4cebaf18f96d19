//! Settling tolerances for simulations

/// How close to "done" a simulation has to be before it counts as settled
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerance {
    /// Maximum distance from the target position
    pub distance: f64,
    /// Maximum time difference
    pub time: f64,
    /// Maximum velocity magnitude (units per second)
    pub velocity: f64,
}

impl Tolerance {
    pub const DEFAULT: Tolerance = Tolerance {
        distance: 1e-3,
        time: 1e-3,
        velocity: 1e-3,
    };

    pub const fn new(distance: f64, time: f64, velocity: f64) -> Self {
        Self {
            distance,
            time,
            velocity,
        }
    }

    pub const fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity;
        self
    }

    pub const fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// `a` and `b` are within `epsilon` of each other
pub fn near_equal(a: f64, b: f64, epsilon: f64) -> bool {
    debug_assert!(epsilon >= 0.0);
    ((a > b - epsilon) && (a < b + epsilon)) || a == b
}

/// Like [`near_equal`], treating two missing values as equal
pub fn near_equal_opt(a: Option<f64>, b: Option<f64>, epsilon: f64) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => near_equal(a, b, epsilon),
        (None, None) => true,
        _ => false,
    }
}

pub fn near_zero(a: f64, epsilon: f64) -> bool {
    near_equal(a, 0.0, epsilon)
}
