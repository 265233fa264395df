//! Dependence simulations.
//!
//! Each simulation draws `x` of shape `(n, p)` and a response `y` of shape
//! `(n, 1)` built from `x w` with weights `w_i = 1 / (i + 1)`. `noise` scales a
//! standard normal error term.

use crate::error::{HyppoError, Result};
use crate::matrix::Matrix;
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Simulation {
    Linear,
    Exponential,
    Cubic,
    Quadratic,
    Step,
    Independence,
}

impl Simulation {
    pub const ALL: [Simulation; 6] = [
        Simulation::Linear,
        Simulation::Exponential,
        Simulation::Cubic,
        Simulation::Quadratic,
        Simulation::Step,
        Simulation::Independence,
    ];

    /// How `y` depends on `x`; `None` when they are drawn independently.
    fn response(self) -> Option<Response> {
        Some(match self {
            Simulation::Linear => Response::Linear,
            Simulation::Exponential => Response::Exponential,
            Simulation::Cubic => Response::Cubic,
            Simulation::Quadratic => Response::Quadratic,
            Simulation::Step => Response::Step,
            Simulation::Independence => return None,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Response {
    Linear,
    Exponential,
    Cubic,
    Quadratic,
    Step,
}

impl Response {
    /// Uniform range of every `x` entry.
    fn support(self) -> (f64, f64) {
        match self {
            Response::Exponential => (0.0, 3.0),
            _ => (-1.0, 1.0),
        }
    }

    /// `y` for the weighted sum `xw` and a standard normal draw `eps`.
    fn eval(self, xw: f64, eps: f64) -> f64 {
        match self {
            Response::Linear => xw + eps,
            Response::Exponential => xw.exp() + 10.0 * eps,
            Response::Cubic => {
                let c = xw - 1.0 / 3.0;
                128.0 * c.powi(3) + 48.0 * c.powi(2) - 12.0 * c + 80.0 * eps
            }
            Response::Quadratic => xw.powi(2) + 0.5 * eps,
            Response::Step => f64::from(u8::from(xw > 0.0)) + eps,
        }
    }
}

impl FromStr for Simulation {
    type Err = HyppoError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Simulation::Linear,
            "exponential" => Simulation::Exponential,
            "cubic" => Simulation::Cubic,
            "quadratic" => Simulation::Quadratic,
            "step" => Simulation::Step,
            "independence" => Simulation::Independence,
            other => return Err(HyppoError::UnknownSimulation(other.to_string())),
        })
    }
}

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| HyppoError::Distribution(e.to_string()))
}

/// Draw `(x, y)` from `sim`.
pub fn simulate<R: Rng + ?Sized>(
    sim: Simulation,
    n: usize,
    p: usize,
    noise: f64,
    rng: &mut R,
) -> Result<(Matrix, Matrix)> {
    if n == 0 || p == 0 {
        return Err(HyppoError::InvalidArgument(format!(
            "simulation needs n > 0 and p > 0, got n={n}, p={p}"
        )));
    }
    let normal = standard_normal()?;

    let Some(response) = sim.response() else {
        let x = Matrix::from_fn(n, p, |_, _| rng.sample(normal));
        let y = Matrix::from_fn(n, 1, |_, _| rng.sample(normal));
        return Ok((x, y));
    };

    let (low, high) = response.support();
    let x = Matrix::from_fn(n, p, |_, _| rng.gen_range(low..high));
    let weights: Vec<f64> = (0..p).map(|i| 1.0 / (i + 1) as f64).collect();

    let mut y = Vec::with_capacity(n);
    for r in x.rows_iter() {
        let xw: f64 = r.iter().zip(&weights).map(|(a, w)| a * w).sum();
        let eps = noise * rng.sample(normal);
        y.push(response.eval(xw, eps));
    }
    Ok((x, Matrix::column(&y)))
}

/// `k` samples of `[x | y]` from `sim`. The first is left as drawn; sample `i`
/// is rotated by `degrees[i - 1]` in the plane of its first and last columns.
pub fn rot_ksamp<R: Rng + ?Sized>(
    sim: Simulation,
    n: usize,
    p: usize,
    k: usize,
    degrees: &[f64],
    noise: f64,
    rng: &mut R,
) -> Result<Vec<Matrix>> {
    if k < 2 {
        return Err(HyppoError::TooFewGroups(k));
    }
    if degrees.len() != k - 1 {
        return Err(HyppoError::InvalidArgument(format!(
            "expected {} rotation angles for {k} samples, got {}",
            k - 1,
            degrees.len()
        )));
    }
    let mut samples = Vec::with_capacity(k);
    for i in 0..k {
        let (x, y) = simulate(sim, n, p, noise, rng)?;
        let mut data = x.hstack(&y)?;
        if i > 0 {
            rotate(&mut data, degrees[i - 1]);
        }
        samples.push(data);
    }
    Ok(samples)
}

fn rotate(data: &mut Matrix, degrees: f64) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let last = data.ncols() - 1;
    for i in 0..data.nrows() {
        let row = data.row_mut(i);
        let (a, b) = (row[0], row[last]);
        row[0] = a * cos - b * sin;
        row[last] = a * sin + b * cos;
    }
}
