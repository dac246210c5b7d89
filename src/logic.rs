// src/logic.rs
// Three torsionally coupled pendulums hanging in a row, linearised about the vertical:
//   A·φ̈ + B·φ̇ + C·φ = 0   =>   φ̈ = -(A⁻¹B·φ̇ + A⁻¹C·φ)
// A is the diagonal inertia matrix diag(m_i·L²), B carries damping on the third body only and C couples
// neighbours through the springs k1 (bodies 1-2) and k2 (bodies 2-3) attached at mid-rod (hence the L²/4).
// Integration is semi-implicit Euler with a fixed step: velocity first, then angle from the new velocity.
// Body order is 1, 2, 3 everywhere; vector index 0 is body 1.
// Inputs are validated up front so A is always invertible and advance() never fails.

use crate::error::{require_finite, require_positive, PendulumError}; // Construction-time parameter checks
use crate::math::{Matrix3, Vector3}; // Fixed-size 3x3 primitives
use log::debug; // Matrices are logged once per construction

/// Standard gravity, m/s².
pub const G: f64 = 9.8;

/// Largest |angle| (rad) or |angular velocity| (rad/s) a recorded trajectory may reach
/// before it is treated as numerically diverged.
pub const DIVERGENCE_LIMIT: f64 = 1e6;

/// Initial condition and mass of one pendulum body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendulumState {
    pub angle: f64,     // rad, from the downward vertical
    pub ang_vel: f64,   // rad/s
    pub mass: f64,      // kg
}

impl PendulumState {
    pub const fn new(angle: f64, ang_vel: f64, mass: f64) -> Self {
        Self { angle, ang_vel, mass }
    }
}

/// Coupling springs, rod length and damping shared by the chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coupling {
    pub k1: f64,      // spring between bodies 1 and 2
    pub k2: f64,      // spring between bodies 2 and 3
    pub length: f64,  // m, same for all three rods
    pub damping: f64, // applied to body 3 only
}

impl Default for Coupling {
    fn default() -> Self {
        Self {
            k1: 1.0,      // k1 = k2 = length = 1 unless told otherwise
            k2: 1.0,
            length: 1.0,
            damping: 0.1, // light damping on the last body
        }
    }
}

/// Live simulation state plus the fixed matrices of the linear model.
#[derive(Debug, Clone)]
pub struct PendulumSystem {
    time_step: f64,                 // s, fixed for the lifetime of the system
    angle: Vector3,                 // φ, rad
    ang_vel: Vector3,               // φ̇, rad/s
    inertia: Matrix3,               // A
    damping: Matrix3,               // B
    stiffness: Matrix3,             // C
    inv_inertia_damping: Matrix3,   // A⁻¹B, formed once since A never changes
    inv_inertia_stiffness: Matrix3, // A⁻¹C
}

impl PendulumSystem {
    /// Builds the system from three bodies (ordered 1, 2, 3) and the shared coupling.
    ///
    /// Rejects non-positive `time_step`, masses or length, and any non-finite input,
    /// since those would leave the inertia matrix singular or meaningless.
    pub fn new(
        time_step: f64,
        bodies: [PendulumState; 3],
        coupling: Coupling,
    ) -> Result<Self, PendulumError> {
        require_positive("time_step", time_step)?;
        require_positive("length", coupling.length)?;
        require_finite("k1", coupling.k1)?;
        require_finite("k2", coupling.k2)?;
        require_finite("damping", coupling.damping)?;
        for (i, body) in bodies.iter().enumerate() {
            require_positive(&format!("mass{}", i + 1), body.mass)?; // names are 1-based like the bodies
            require_finite(&format!("angle{}", i + 1), body.angle)?;
            require_finite(&format!("ang_vel{}", i + 1), body.ang_vel)?;
        }

        let Coupling { k1, k2, length: l, damping: betta } = coupling;
        let [m1, m2, m3] = bodies.map(|b| b.mass);
        let l2 = l * l; // L², shared by inertia and spring terms

        let inertia = Matrix3::from_diagonal([m1 * l2, m2 * l2, m3 * l2]); // m_i·L²

        let mut damping = Matrix3::zeros();
        damping[(2, 2)] = betta; // third body only

        let c12 = -k1 * l2 / 4.0; // body 1 <-> body 2
        let c23 = -k2 * l2 / 4.0; // body 2 <-> body 3; bodies 1 and 3 are not coupled
        let stiffness = Matrix3::from_rows([
            [m1 * G * l + k1 * l2 / 4.0, c12, 0.0],
            [c12, m2 * G * l + (k1 + k2) * l2 / 4.0, c23],
            [0.0, c23, m3 * G * l + k2 * l2 / 4.0],
        ]);
        debug_assert!(inertia.is_diagonal());
        debug_assert!(stiffness.is_symmetric());

        let inv_inertia = inertia.try_inverse()?; // cannot fail after the checks above
        let system = Self {
            time_step,
            angle: Vector3(bodies.map(|b| b.angle)),
            ang_vel: Vector3(bodies.map(|b| b.ang_vel)),
            inertia,
            damping,
            stiffness,
            inv_inertia_damping: inv_inertia * damping,
            inv_inertia_stiffness: inv_inertia * stiffness,
        };
        debug!(
            "pendulum system built: dt={} A={:?} B={:?} C={:?}",
            time_step, system.inertia, system.damping, system.stiffness
        );
        Ok(system)
    }

    /// φ̈ = -(A⁻¹B·φ̇ + A⁻¹C·φ) at the current state.
    pub fn acceleration(&self) -> Vector3 {
        -(self.inv_inertia_damping * self.ang_vel + self.inv_inertia_stiffness * self.angle)
    }

    /// Advances exactly one `time_step` and returns the new `(angle, ang_vel)`.
    pub fn advance(&mut self) -> (Vector3, Vector3) {
        let acc = self.acceleration(); // from the state at the start of the step
        self.ang_vel = self.ang_vel + acc * self.time_step; // velocity first
        self.angle = self.angle + self.ang_vel * self.time_step; // then angle, with the new velocity
        (self.angle, self.ang_vel)
    }

    /// Current `(angle, ang_vel)`, without stepping.
    pub fn current_state(&self) -> (Vector3, Vector3) {
        (self.angle, self.ang_vel)
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn inertia_matrix(&self) -> &Matrix3 {
        &self.inertia
    }

    pub fn damping_matrix(&self) -> &Matrix3 {
        &self.damping
    }

    pub fn stiffness_matrix(&self) -> &Matrix3 {
        &self.stiffness
    }

    /// Records `duration` seconds of motion, starting with the current state at t = 0.
    /// The step count is `duration / time_step` rounded.
    pub fn record(&mut self, duration: f64) -> Trajectory {
        self.record_steps(steps_for(duration, self.time_step))
    }

    /// Records the current state followed by exactly `steps` calls to `advance`.
    pub fn record_steps(&mut self, steps: usize) -> Trajectory {
        let mut traj = Trajectory::with_capacity(steps + 1); // initial sample + one per step
        let (angle, ang_vel) = self.current_state();
        traj.push(0.0, angle, ang_vel);
        for i in 1..=steps {
            let (angle, ang_vel) = self.advance(); // one advance per sample, never two
            traj.push(i as f64 * self.time_step, angle, ang_vel); // i·dt avoids summing rounding error
        }
        traj
    }
}

/// Number of whole steps covering `duration`; zero for non-positive durations.
pub fn steps_for(duration: f64, time_step: f64) -> usize {
    if duration <= 0.0 || !duration.is_finite() {
        return 0;
    }
    (duration / time_step).round() as usize // round, not ceil: 1.0 / (1.0 / 60.0) is not exactly 60
}

/// Sampled states over time, one entry per step including the initial condition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    pub times: Vec<f64>,        // s
    pub angles: Vec<Vector3>,   // rad, per sample
    pub ang_vels: Vec<Vector3>, // rad/s, per sample
}

impl Trajectory {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            times: Vec::with_capacity(n),
            angles: Vec::with_capacity(n),
            ang_vels: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, t: f64, angle: Vector3, ang_vel: Vector3) {
        self.times.push(t);
        self.angles.push(angle);
        self.ang_vels.push(ang_vel);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Angle series of one body (0-based index).
    pub fn angle_series(&self, body: usize) -> Vec<f64> {
        self.angles.iter().map(|a| a[body]).collect()
    }

    /// Angular velocity series of one body (0-based index).
    pub fn ang_vel_series(&self, body: usize) -> Vec<f64> {
        self.ang_vels.iter().map(|w| w[body]).collect()
    }

    /// Largest absolute angle or angular velocity; infinite once any sample is NaN or infinite.
    pub fn max_abs(&self) -> f64 {
        self.angles
            .iter()
            .chain(self.ang_vels.iter())
            .map(Vector3::max_abs)
            .fold(0.0, f64::max)
    }

    /// True when the step was too coarse for the system's stiffness and the samples blew up.
    pub fn diverged(&self) -> bool {
        self.max_abs() > DIVERGENCE_LIMIT
    }
}
