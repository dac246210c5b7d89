// src/config.rs
// Simulation parameters as submitted by the front-end.
// Per-body values arrive as comma-separated strings ("10, 0, -5"), angles in degrees and
// angular velocities in degrees per second; they are converted to radians before the system is built.
// Coupling fields and the frame rate are optional and fall back to the usual defaults.

use crate::error::{require_positive, PendulumError};
use crate::logic::{steps_for, Coupling, PendulumState, PendulumSystem};
use serde::Deserialize;

/// Frame rate used when the request does not give one; the time step is `1 / fps`.
pub const DEFAULT_FPS: f64 = 60.0;

/// Longest simulated span accepted in one request, seconds.
pub const MAX_DURATION: f64 = 600.0;

/// Most integration steps one request may ask for; bounds `duration * fps`.
pub const MAX_STEPS: usize = 200_000;

fn default_k() -> f64 {
    Coupling::default().k1
}

fn default_length() -> f64 {
    Coupling::default().length
}

fn default_damping() -> f64 {
    Coupling::default().damping
}

fn default_fps() -> f64 {
    DEFAULT_FPS
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimParams {
    pub angles: String,   // Comma-separated initial angles (degrees), bodies 1..3
    pub ang_vels: String, // Comma-separated initial angular velocities (degrees/s)
    pub masses: String,   // Comma-separated masses (kg)
    #[serde(default = "default_k")]
    pub k1: f64,
    #[serde(default = "default_k")]
    pub k2: f64,
    #[serde(default = "default_length")]
    pub length: f64,
    #[serde(default = "default_damping")]
    pub damping: f64,
    #[serde(default = "default_fps")]
    pub fps: f64,
    pub duration: f64, // Seconds to simulate
}

/// Parses exactly three comma-separated numbers.
pub fn parse_triple(name: &str, raw: &str) -> Result<[f64; 3], PendulumError> {
    let values = raw
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .map_err(|e| PendulumError::invalid(name, format!("`{}`: {e}", s.trim())))
        })
        .collect::<Result<Vec<f64>, _>>()?;

    <[f64; 3]>::try_from(values.as_slice())
        .map_err(|_| PendulumError::invalid(name, format!("expected 3 values, got {}", values.len())))
}

impl SimParams {
    /// Integration step derived from the frame rate.
    pub fn time_step(&self) -> Result<f64, PendulumError> {
        require_positive("fps", self.fps)?;
        Ok(1.0 / self.fps)
    }

    pub fn coupling(&self) -> Coupling {
        Coupling {
            k1: self.k1,
            k2: self.k2,
            length: self.length,
            damping: self.damping,
        }
    }

    /// Validated simulation span in seconds.
    pub fn checked_duration(&self) -> Result<f64, PendulumError> {
        let duration = require_positive("duration", self.duration)?;
        if duration > MAX_DURATION {
            return Err(PendulumError::invalid(
                "duration",
                format!("must be at most {MAX_DURATION} s, got {duration}"),
            ));
        }
        Ok(duration)
    }

    /// Validated `(duration, steps)` pair; the step count must stay within `MAX_STEPS`.
    pub fn checked_steps(&self) -> Result<(f64, usize), PendulumError> {
        let duration = self.checked_duration()?;
        let steps = steps_for(duration, self.time_step()?);
        if steps > MAX_STEPS {
            return Err(PendulumError::invalid(
                "fps",
                format!("{steps} steps requested, at most {MAX_STEPS} allowed; lower fps or duration"),
            ));
        }
        Ok((duration, steps))
    }

    /// Per-body initial states with angles converted to radians.
    pub fn bodies(&self) -> Result<[PendulumState; 3], PendulumError> {
        let angles = parse_triple("angles", &self.angles)?;
        let ang_vels = parse_triple("ang_vels", &self.ang_vels)?;
        let masses = parse_triple("masses", &self.masses)?;
        Ok([0, 1, 2].map(|i| {
            PendulumState::new(angles[i].to_radians(), ang_vels[i].to_radians(), masses[i])
        }))
    }

    /// Builds the pendulum system described by these parameters.
    pub fn build_system(&self) -> Result<PendulumSystem, PendulumError> {
        PendulumSystem::new(self.time_step()?, self.bodies()?, self.coupling())
    }
}
