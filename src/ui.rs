// src/ui.rs
use crate::config::SimParams; // Request parameters and their validation
use crate::error::PendulumError;
use crate::logic::Trajectory; // Recorded angles and velocities over time
use crate::math::Vector3;
use actix_web::{error, web, HttpResponse, Result}; // Actix-web types for request handling and HTTP responses
use base64::{engine::general_purpose, Engine as _}; // Base64 encoder for embedding image data
use image::ImageFormat; // Image encoding utilities for PNG output
use log::{info, warn};
use plotters::prelude::*; // Plotters plotting library prelude
use serde::Serialize; // JSON serialization of the response
use std::io::Cursor; // In-memory byte writing for the PNG
use std::ops::Range;

/// Plot image width in pixels.
pub const PLOT_WIDTH: u32 = 800;

/// Plot image height in pixels; six stacked panels.
pub const PLOT_HEIGHT: u32 = 900;

/// Widest y span a panel will draw.
pub const PLOT_SPAN_LIMIT: f64 = 1e12;

#[derive(Debug, Serialize)]
pub struct SimResponse {
    pub success: bool,                    // Whether the simulation succeeded
    pub error: Option<String>,            // Reason for failure, if any
    pub trajectory_image: String,         // Base64-encoded PNG of the six phi / phi_dot panels
    pub animation_data: AnimationData,    // Bob positions for the front-end animation
}

#[derive(Debug, Default, Serialize)]
pub struct AnimationData {
    pub positions: Vec<[f64; 6]>, // Per frame: [x1, y1, x2, y2, x3, y3]
    pub times: Vec<f64>,          // Simulation time of each frame, seconds
    pub time_step: f64,           // Frame pacing, seconds
    pub length: f64,              // Rod length, for drawing pivots and springs
    pub limit: f64,               // Half-width of the view box
}

impl SimResponse {
    fn failure(err: &PendulumError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            trajectory_image: String::new(),
            animation_data: AnimationData::default(),
        }
    }
}

/// Pivot x-coordinates: the three pendulums hang one rod length apart.
pub fn pivots(length: f64) -> [f64; 3] {
    [-length, 0.0, length]
}

/// Cartesian bob positions for one state; y points up, pivots sit at y = 0.
pub fn bob_positions(angle: &Vector3, length: f64) -> [f64; 6] {
    let mut out = [0.0; 6];
    for (k, x0) in pivots(length).iter().enumerate() {
        out[2 * k] = x0 + length * angle[k].sin();
        out[2 * k + 1] = -length * angle[k].cos();
    }
    out
}

/// Y range spanning `values`, padded so flat series still get a visible axis.
/// Fails when the span cannot be represented, which plotters would otherwise overflow on.
fn padded_range(values: &[f64]) -> Result<Range<f64>, PendulumError> {
    if values.is_empty() {
        return Ok(-1.0..1.0); // nothing to show yet
    }
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min); // min ignores NaN, checked below
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = ((hi - lo) * 0.05).max(1e-3); // 5% margin, never zero
    let (start, end) = (lo - pad, hi + pad);
    let unbounded = values.iter().any(|v| !v.is_finite()) || !start.is_finite() || !end.is_finite();
    if unbounded || hi - lo > PLOT_SPAN_LIMIT {
        return Err(PendulumError::Plot(format!("series spans [{lo}, {hi}], too wide to plot")));
    }
    Ok(start..end)
}

fn plot_err<E: std::fmt::Display>(e: E) -> PendulumError {
    PendulumError::Plot(e.to_string())
}

/// Renders phi_1, phi_1_dot, ..., phi_3_dot against time as a PNG data URL.
pub fn render_plot(traj: &Trajectory) -> Result<String, PendulumError> {
    let t_max = traj.times.last().copied().unwrap_or(0.0).max(1e-3);
    let mut pixel_buffer = vec![0u8; (PLOT_WIDTH * PLOT_HEIGHT * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut pixel_buffer, (PLOT_WIDTH, PLOT_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;
        let root = root
            .titled("phi and phi_dot", ("sans-serif", 20))
            .map_err(plot_err)?;

        let panels = root.split_evenly((6, 1));
        for (idx, area) in panels.iter().enumerate() {
            let body = idx / 2;
            let (label, series, color) = if idx % 2 == 0 {
                (format!("phi{}", body + 1), traj.angle_series(body), BLUE)
            } else {
                (format!("phi{}_dot", body + 1), traj.ang_vel_series(body), RED)
            };

            let mut chart = ChartBuilder::on(area)
                .margin(5)
                .x_label_area_size(if idx == 5 { 30 } else { 15 })
                .y_label_area_size(50)
                .build_cartesian_2d(0.0..t_max, padded_range(&series)?)
                .map_err(plot_err)?;

            let mut mesh = chart.configure_mesh();
            mesh.y_desc(label.as_str()).y_labels(4);
            if idx == 5 {
                mesh.x_desc("time (s)");
            }
            mesh.draw().map_err(plot_err)?;

            chart
                .draw_series(LineSeries::new(
                    traj.times.iter().copied().zip(series.iter().copied()),
                    color.stroke_width(1),
                ))
                .map_err(plot_err)?;
        }

        root.present().map_err(plot_err)?;
    }

    let img_buffer = image::RgbImage::from_raw(PLOT_WIDTH, PLOT_HEIGHT, pixel_buffer)
        .ok_or_else(|| PendulumError::Plot("pixel buffer has the wrong size".to_string()))?;

    let mut png_buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img_buffer)
        .write_to(&mut png_buffer, ImageFormat::Png)
        .map_err(plot_err)?;

    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png_buffer.into_inner())
    ))
}

/// Runs the integrator for the requested span and lays out the animation frames.
pub fn simulate(params: &SimParams) -> Result<(Trajectory, AnimationData), PendulumError> {
    let (duration, steps) = params.checked_steps()?; // bounded before anything is allocated
    let mut system = params.build_system()?;
    let time_step = system.time_step();
    let length = params.length;

    let traj = system.record_steps(steps);
    if traj.diverged() {
        // Step too coarse for the springs and gravity: the state grew without bound.
        return Err(PendulumError::invalid(
            "fps",
            format!("trajectory diverged with time step {time_step} s; raise fps"),
        ));
    }
    info!("simulated {duration:.3} s in {steps} steps of {time_step:.5} s");

    let animation = AnimationData {
        positions: traj.angles.iter().map(|a| bob_positions(a, length)).collect(), // one frame per sample
        times: traj.times.clone(),
        time_step,
        length,
        limit: 2.0 * length + 0.5, // pivots at ±L plus a full swing
    };
    Ok((traj, animation))
}

/// Builds, runs and renders one simulation request.
pub fn run_simulation(params: &SimParams) -> Result<SimResponse, PendulumError> {
    let (traj, animation_data) = simulate(params)?;
    Ok(SimResponse {
        success: true,
        error: None,
        trajectory_image: render_plot(&traj)?,
        animation_data,
    })
}

pub async fn simulate_handler(params: web::Json<SimParams>) -> Result<HttpResponse> {
    let params = params.into_inner();
    // Integration and PNG encoding are CPU-bound; keep them off the async workers.
    let outcome = tokio::task::spawn_blocking(move || run_simulation(&params))
        .await
        .map_err(error::ErrorInternalServerError)?;

    match outcome {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(err @ PendulumError::Plot(_)) => Err(error::ErrorInternalServerError(err)),
        Err(err) => {
            warn!("rejected simulation request: {err}");
            Ok(HttpResponse::Ok().json(SimResponse::failure(&err)))
        }
    }
}

/// Registers the simulation API on an actix `App`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/simulate", web::post().to(simulate_handler));
}
