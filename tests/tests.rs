use approx::assert_relative_eq;
use coupled_pendulums::{Coupling, Matrix3, PendulumState, PendulumSystem, Vector3, G};

/// Three bodies of equal mass released from the given angles at rest
pub fn at_rest(angles: [f64; 3], mass: f64) -> [PendulumState; 3] {
    angles.map(|a| PendulumState::new(a, 0.0, mass))
}

/// Coupling with explicit springs and damping, unit length
pub fn coupling(k1: f64, k2: f64, damping: f64) -> Coupling {
    Coupling { k1, k2, length: 1.0, damping }
}

/// Mixed masses, stiff springs, long rods and a damped third body
pub fn demo_system() -> PendulumSystem {
    let bodies = [
        PendulumState::new(0.2, 0.1, 1.0),
        PendulumState::new(0.25, 0.01, 4.0),
        PendulumState::new(0.14, 0.15, 2.0),
    ];
    let coupling = Coupling { k1: 2.0, k2: 3.0, length: 2.0, damping: 0.4 };
    PendulumSystem::new(0.1, bodies, coupling).unwrap()
}

// ==================================================================================
// Golden values
// ==================================================================================

#[test]
fn one_step_golden_values() {
    // Unit masses and length: A = I, C·φ = 0.98 for every body when φ = 0.1 everywhere.
    let mut sys = PendulumSystem::new(0.1, at_rest([0.1; 3], 1.0), coupling(1.0, 1.0, 0.0)).unwrap();

    let c = *sys.stiffness_matrix();
    let expected_c = Matrix3::from_rows([[10.05, -0.25, 0.0], [-0.25, 10.3, -0.25], [0.0, -0.25, 10.05]]);
    for row in 0..3 {
        for col in 0..3 {
            assert_relative_eq!(c[(row, col)], expected_c[(row, col)], epsilon = 1e-12);
        }
    }

    let (angle, ang_vel) = sys.advance();
    for i in 0..3 {
        assert_relative_eq!(ang_vel[i], -0.098, epsilon = 1e-12);
        assert_relative_eq!(angle[i], 0.0902, epsilon = 1e-12);
    }
}

#[test]
fn one_step_matches_matrix_formula() {
    let mut sys = demo_system();
    let (angle0, ang_vel0) = sys.current_state();
    let inv_a = sys.inertia_matrix().try_inverse().unwrap();
    let acc = -(inv_a * *sys.damping_matrix() * ang_vel0 + inv_a * *sys.stiffness_matrix() * angle0);

    let (angle1, ang_vel1) = sys.advance();
    let expected_vel = ang_vel0 + acc * 0.1;
    let expected_angle = angle0 + expected_vel * 0.1;
    for i in 0..3 {
        assert_relative_eq!(ang_vel1[i], expected_vel[i], epsilon = 1e-12);
        assert_relative_eq!(angle1[i], expected_angle[i], epsilon = 1e-12);
    }
}

// ==================================================================================
// Structural properties
// ==================================================================================

#[test]
fn deterministic_replay() {
    let mut a = demo_system();
    let mut b = demo_system();
    for _ in 0..500 {
        assert_eq!(a.advance(), b.advance());
    }
}

#[test]
fn equilibrium_is_a_fixed_point() {
    let bodies = [
        PendulumState::new(0.0, 0.0, 1.5),
        PendulumState::new(0.0, 0.0, 3.0),
        PendulumState::new(0.0, 0.0, 0.7),
    ];
    let mut sys = PendulumSystem::new(0.01, bodies, coupling(4.0, 2.5, 0.3)).unwrap();
    for _ in 0..1000 {
        let (angle, ang_vel) = sys.advance();
        assert_eq!(angle, Vector3::zeros());
        assert_eq!(ang_vel, Vector3::zeros());
    }
}

#[test]
fn decoupled_bodies_follow_single_pendulum_recurrence() {
    let dt = 0.01;
    let length = 1.5;
    let betta = 0.2;
    let masses = [1.0, 2.0, 3.0];
    let bodies = [
        PendulumState::new(0.1, 0.0, masses[0]),
        PendulumState::new(-0.05, 0.2, masses[1]),
        PendulumState::new(0.3, -0.1, masses[2]),
    ];
    let coupling = Coupling { k1: 0.0, k2: 0.0, length, damping: betta };
    let mut sys = PendulumSystem::new(dt, bodies, coupling).unwrap();

    let mut phi = bodies.map(|b| b.angle);
    let mut omega = bodies.map(|b| b.ang_vel);
    for _ in 0..2000 {
        for i in 0..3 {
            let damping = if i == 2 { betta / (masses[i] * length * length) * omega[i] } else { 0.0 };
            omega[i] -= (G / length * phi[i] + damping) * dt;
            phi[i] += omega[i] * dt;
        }
        let (angle, ang_vel) = sys.advance();
        for i in 0..3 {
            assert_relative_eq!(angle[i], phi[i], epsilon = 1e-10, max_relative = 1e-9);
            assert_relative_eq!(ang_vel[i], omega[i], epsilon = 1e-10, max_relative = 1e-9);
        }
    }
}

#[test]
fn reversed_chain_mirrors_trajectory() {
    let dt = 0.02;
    let masses = [1.0, 2.5, 4.0];
    let init = [(0.3, 0.0), (-0.1, 0.05), (0.2, -0.2)];
    let forward = [0, 1, 2].map(|i| PendulumState::new(init[i].0, init[i].1, masses[i]));
    let reversed = [2, 1, 0].map(|i| PendulumState::new(init[i].0, init[i].1, masses[i]));

    let mut a = PendulumSystem::new(dt, forward, coupling(1.5, 3.0, 0.0)).unwrap();
    let mut b = PendulumSystem::new(dt, reversed, coupling(3.0, 1.5, 0.0)).unwrap();
    for _ in 0..1000 {
        let (angle_a, vel_a) = a.advance();
        let (angle_b, vel_b) = b.advance();
        for i in 0..3 {
            assert_relative_eq!(angle_a[i], angle_b[2 - i], epsilon = 1e-9);
            assert_relative_eq!(vel_a[i], vel_b[2 - i], epsilon = 1e-9);
        }
    }
}

#[test]
fn two_small_steps_differ_from_one_large_step() {
    let bodies = at_rest([0.1, 0.0, -0.1], 1.0);
    let mut small = PendulumSystem::new(0.05, bodies, coupling(1.0, 1.0, 0.1)).unwrap();
    let mut large = PendulumSystem::new(0.1, bodies, coupling(1.0, 1.0, 0.1)).unwrap();

    small.advance();
    let (angle_small, vel_small) = small.advance();
    let (angle_large, vel_large) = large.advance();

    assert_ne!(angle_small, angle_large);
    assert_ne!(vel_small, vel_large);
}

#[test]
fn springs_transfer_motion_along_chain() {
    // Only body 1 is displaced; the coupling must set body 3 moving within a few periods.
    let mut sys = PendulumSystem::new(0.01, at_rest([0.2, 0.0, 0.0], 1.0), coupling(5.0, 5.0, 0.0)).unwrap();
    let (_, first) = sys.advance();
    assert_eq!(first[2], 0.0);

    let traj = sys.record(20.0);
    let peak = traj.angle_series(2).iter().fold(0.0f64, |m, a| m.max(a.abs()));
    assert!(peak > 1e-3, "body 3 never moved: peak {peak}");
}

#[test]
fn damping_on_third_body_drains_energy() {
    let mut sys = PendulumSystem::new(0.01, at_rest([0.1, 0.1, 0.1], 1.0), coupling(1.0, 1.0, 2.0)).unwrap();
    let traj = sys.record(60.0);
    let start = traj.angle_series(0)[..200].iter().fold(0.0f64, |m, a| m.max(a.abs()));
    let n = traj.len();
    let end = traj.angle_series(0)[n - 200..].iter().fold(0.0f64, |m, a| m.max(a.abs()));
    assert!(end < start, "amplitude did not decay: {start} -> {end}");
}

#[test]
fn time_step_is_exposed_unchanged() {
    let mut sys = demo_system();
    assert_eq!(sys.time_step(), 0.1);
    sys.advance();
    assert_eq!(sys.time_step(), 0.1);
}
