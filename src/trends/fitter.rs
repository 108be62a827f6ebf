//! Least-squares curve fitting.
//!
//! Four model families are fitted independently on the indexed series. Each
//! one is reduced to a straight-line regression on transformed coordinates:
//!
//! | Family      | Regression            | Predictor        | Needs      |
//! |-------------|-----------------------|------------------|------------|
//! | Linear      | y on x                | a + b·x          | -          |
//! | Exponential | ln y on x             | a·e^(b·x)        | y > 0      |
//! | Logarithmic | y on ln x             | a + b·ln x       | x > 0      |
//! | Power       | ln y on ln x          | a·x^b            | x, y > 0   |
//!
//! R² is reported in the space the regression was solved in, so the
//! exponential and power scores are computed on ln y.

use serde::{Deserialize, Serialize};

use super::series::IndexedPoint;

/// Candidate model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    Linear,
    Exponential,
    Logarithmic,
    Power,
}

impl ModelFamily {
    /// All families, in selection tie-break order.
    pub const ALL: [ModelFamily; 4] = [
        ModelFamily::Linear,
        ModelFamily::Exponential,
        ModelFamily::Logarithmic,
        ModelFamily::Power,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ModelFamily::Linear => "Linear",
            ModelFamily::Exponential => "Exponential",
            ModelFamily::Logarithmic => "Logarithmic",
            ModelFamily::Power => "Power",
        }
    }
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Direction a fitted model moves as time advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Rising,
    Flat,
    Falling,
}

/// A fitted model: family, parameters `[a, b]` and goodness of fit.
///
/// For the linear family `a` is the intercept and `b` the slope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    /// Model family
    pub family: ModelFamily,
    /// Parameters `[a, b]`
    pub params: [f64; 2],
    /// Coefficient of determination in regression space
    pub r2: f64,
}

impl FittedModel {
    /// First parameter (`a`).
    pub fn a(&self) -> f64 {
        self.params[0]
    }

    /// Second parameter (`b`).
    pub fn b(&self) -> f64 {
        self.params[1]
    }

    /// Evaluate the model at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        let [a, b] = self.params;
        match self.family {
            ModelFamily::Linear => a + b * x,
            ModelFamily::Exponential => a * (b * x).exp(),
            ModelFamily::Logarithmic => a + b * x.ln(),
            ModelFamily::Power => a * x.powf(b),
        }
    }

    /// Direction of the model over x > 0.
    ///
    /// Every family is monotonic on the positive axis, so the sign of the
    /// growth term is enough.
    pub fn direction(&self) -> TrendDirection {
        let [a, b] = self.params;
        let growth = match self.family {
            ModelFamily::Linear | ModelFamily::Logarithmic => b,
            ModelFamily::Exponential | ModelFamily::Power => a * b,
        };

        if growth > 0.0 {
            TrendDirection::Rising
        } else if growth < 0.0 {
            TrendDirection::Falling
        } else {
            TrendDirection::Flat
        }
    }

    /// Human readable label, e.g. `Logarithmic (R² 0.97)`.
    pub fn label(&self) -> String {
        format!("{} (R² {:.2})", self.family, self.r2)
    }
}

/// Straight-line least-squares result.
#[derive(Debug, Clone, Copy)]
struct LineFit {
    intercept: f64,
    slope: f64,
    r2: f64,
}

/// Fits the candidate model families.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurveFitter;

impl CurveFitter {
    pub fn new() -> Self {
        Self
    }

    /// Fit every family that the data supports, in [`ModelFamily::ALL`] order.
    pub fn fit_all(&self, points: &[IndexedPoint]) -> Vec<FittedModel> {
        ModelFamily::ALL
            .iter()
            .filter_map(|family| {
                let model = self.fit(*family, points);
                if model.is_none() {
                    tracing::debug!("{} model unavailable for {} points", family, points.len());
                }
                model
            })
            .collect()
    }

    /// Fit a single family. Returns `None` when the family is unavailable.
    pub fn fit(&self, family: ModelFamily, points: &[IndexedPoint]) -> Option<FittedModel> {
        match family {
            ModelFamily::Linear => fit_linear(points),
            ModelFamily::Exponential => fit_exponential(points),
            ModelFamily::Logarithmic => fit_logarithmic(points),
            ModelFamily::Power => fit_power(points),
        }
    }
}

fn fit_linear(points: &[IndexedPoint]) -> Option<FittedModel> {
    let pairs: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();

    // A vertical stack of points still gets a flat line through the mean.
    let line = least_squares(&pairs).or_else(|| flat_line(&pairs))?;
    build_model(ModelFamily::Linear, line.intercept, line.slope, line.r2)
}

fn fit_exponential(points: &[IndexedPoint]) -> Option<FittedModel> {
    let pairs = transform(points, Some, positive_ln)?;
    let line = least_squares(&pairs)?;
    build_model(ModelFamily::Exponential, line.intercept.exp(), line.slope, line.r2)
}

fn fit_logarithmic(points: &[IndexedPoint]) -> Option<FittedModel> {
    let pairs = transform(points, positive_ln, Some)?;
    let line = least_squares(&pairs)?;
    build_model(ModelFamily::Logarithmic, line.intercept, line.slope, line.r2)
}

fn fit_power(points: &[IndexedPoint]) -> Option<FittedModel> {
    let pairs = transform(points, positive_ln, positive_ln)?;
    let line = least_squares(&pairs)?;
    build_model(ModelFamily::Power, line.intercept.exp(), line.slope, line.r2)
}

fn build_model(family: ModelFamily, a: f64, b: f64, r2: f64) -> Option<FittedModel> {
    if !(a.is_finite() && b.is_finite() && r2.is_finite()) {
        return None;
    }
    // a = e^intercept; zero means the intercept underflowed.
    if matches!(family, ModelFamily::Exponential | ModelFamily::Power) && a == 0.0 {
        return None;
    }
    Some(FittedModel {
        family,
        params: [a, b],
        r2,
    })
}

/// Apply per-axis transforms; any rejected coordinate rejects the family.
fn transform(
    points: &[IndexedPoint],
    fx: impl Fn(f64) -> Option<f64>,
    fy: impl Fn(f64) -> Option<f64>,
) -> Option<Vec<(f64, f64)>> {
    points.iter().map(|p| Some((fx(p.x)?, fy(p.y)?))).collect()
}

fn positive_ln(value: f64) -> Option<f64> {
    if value > 0.0 {
        let ln = value.ln();
        ln.is_finite().then_some(ln)
    } else {
        None
    }
}

/// Ordinary least squares of y on x.
///
/// Returns `None` for an empty input or when every x is identical.
fn least_squares(pairs: &[(f64, f64)]) -> Option<LineFit> {
    if pairs.is_empty() {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let sxx: f64 = pairs.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    let sxy: f64 = pairs.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();

    // Relative to the magnitude of x, so the axis unit does not matter.
    let sum_x2: f64 = pairs.iter().map(|(x, _)| x * x).sum();
    if sxx <= f64::EPSILON * sum_x2 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r2 = r_squared(pairs, mean_y, |x| intercept + slope * x);

    Some(LineFit {
        intercept,
        slope,
        r2,
    })
}

/// Zero-slope line through the mean of y.
fn flat_line(pairs: &[(f64, f64)]) -> Option<LineFit> {
    if pairs.is_empty() {
        return None;
    }

    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / pairs.len() as f64;
    Some(LineFit {
        intercept: mean_y,
        slope: 0.0,
        r2: r_squared(pairs, mean_y, |_| mean_y),
    })
}

/// `1 − SSres / SStot`, or 0 when y has no variance.
fn r_squared(pairs: &[(f64, f64)], mean_y: f64, predict: impl Fn(f64) -> f64) -> f64 {
    let ss_tot: f64 = pairs.iter().map(|(_, y)| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = pairs.iter().map(|(x, y)| (y - predict(*x)).powi(2)).sum();

    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    }
}
