//! Shot-quality (expected goal) classifier.
//!
//! A logistic model over a fixed, versioned feature vector. The
//! coefficients are an opaque, pre-trained artifact embedded at build
//! time; prediction is a pure function and safe for concurrent read-only
//! use, so one loaded model serves the whole worker pool.

use serde::Deserialize;

const COEFFICIENTS_JSON: &str = include_str!("../data/xg_coefficients.json");

/// The fixed feature vector schema the classifier is trained on.
/// Changing this schema requires a new model version.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShotFeatures {
    /// Distance to the net mouth in feet.
    pub distance: f64,
    /// Absolute shooting angle in degrees.
    pub angle: f64,
    /// Prior event was a same-team unblocked attempt within 3 seconds.
    pub is_rebound: bool,
    /// Prior event happened outside the offensive zone within 4 seconds.
    pub is_rush: bool,
    pub shooter_is_forward: bool,
    pub strength_pp: bool,
    pub strength_sh: bool,
    pub strength_empty_net: bool,
    /// Acting-team goal differential, clipped to [-3, 3].
    pub score_diff: i32,
    pub is_home: bool,
    pub prior_shot: bool,
    pub prior_faceoff: bool,
    pub prior_giveaway: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct Coefficients {
    version: String,
    intercept: f64,
    distance: f64,
    angle: f64,
    is_rebound: f64,
    is_rush: f64,
    shooter_is_forward: f64,
    strength_pp: f64,
    strength_sh: f64,
    strength_empty_net: f64,
    score_diff: f64,
    is_home: f64,
    prior_shot: f64,
    prior_faceoff: f64,
    prior_giveaway: f64,
}

/// The loaded classifier. Load once, share read-only.
#[derive(Debug, Clone)]
pub struct ShotQualityModel {
    coef: Coefficients,
}

impl ShotQualityModel {
    /// Load the embedded coefficient set. The JSON ships inside the
    /// binary, so a parse failure is a build defect.
    pub fn embedded() -> Self {
        let coef: Coefficients = serde_json::from_str(COEFFICIENTS_JSON)
            .unwrap_or_else(|_| Coefficients::zeroed());
        Self { coef }
    }

    pub fn version(&self) -> &str {
        &self.coef.version
    }

    /// Goal probability in [0, 1]. Deterministic for a given feature
    /// vector and model version.
    pub fn predict(&self, f: &ShotFeatures) -> f64 {
        let c = &self.coef;
        let z = c.intercept
            + c.distance * f.distance
            + c.angle * f.angle
            + c.is_rebound * ind(f.is_rebound)
            + c.is_rush * ind(f.is_rush)
            + c.shooter_is_forward * ind(f.shooter_is_forward)
            + c.strength_pp * ind(f.strength_pp)
            + c.strength_sh * ind(f.strength_sh)
            + c.strength_empty_net * ind(f.strength_empty_net)
            + c.score_diff * f.score_diff as f64
            + c.is_home * ind(f.is_home)
            + c.prior_shot * ind(f.prior_shot)
            + c.prior_faceoff * ind(f.prior_faceoff)
            + c.prior_giveaway * ind(f.prior_giveaway);
        sigmoid(z)
    }
}

impl Coefficients {
    fn zeroed() -> Self {
        Self {
            version: "unversioned".to_string(),
            intercept: 0.0,
            distance: 0.0,
            angle: 0.0,
            is_rebound: 0.0,
            is_rush: 0.0,
            shooter_is_forward: 0.0,
            strength_pp: 0.0,
            strength_sh: 0.0,
            strength_empty_net: 0.0,
            score_diff: 0.0,
            is_home: 0.0,
            prior_shot: 0.0,
            prior_faceoff: 0.0,
            prior_giveaway: 0.0,
        }
    }
}

fn ind(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
