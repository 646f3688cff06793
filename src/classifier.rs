//! Land health classification.
//!
//! A reading is checked against two ordered threshold tiers. The Degraded
//! tier is tested first, then the AtRisk tier, and anything that passes both
//! is Healthy. Within a tier the axes are OR-ed: one bad sensor value is
//! enough to match.
//!
//! Classification is total over finite inputs. Out-of-range values still get
//! a status; flagging them is the job of [`crate::quality`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ThresholdError;

// ---

/// Overall health of a piece of land, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Healthy,
    AtRisk,
    Degraded,
}

impl Status {
    /// Recommendation shown next to a row with this status.
    pub fn suggestion(self) -> &'static str {
        // ---
        match self {
            Status::Degraded => {
                "Land is degraded: recommend irrigation or reforestation intervention."
            }
            Status::AtRisk => {
                "Land is at risk: recommend mulching, cover crops, or moderate irrigation."
            }
            Status::Healthy => "Land is healthy: maintain current practices.",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Healthy => write!(f, "Healthy"),
            Status::AtRisk => write!(f, "AtRisk"),
            Status::Degraded => write!(f, "Degraded"),
        }
    }
}

/// One sensor axis of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    SoilMoisture,
    Temperature,
    VegetationIndex,
}

impl Axis {
    /// Banner text used when the fleet mean on this axis crosses the
    /// Degraded threshold.
    pub fn alert_message(self) -> &'static str {
        // ---
        match self {
            Axis::SoilMoisture => "Soil moisture levels are critically low.",
            Axis::Temperature => "Temperature levels are too high.",
            Axis::VegetationIndex => "Vegetation index is below healthy levels.",
        }
    }

    /// Storage column / JSON field name of this axis.
    pub fn field_name(self) -> &'static str {
        match self {
            Axis::SoilMoisture => "soil_moisture",
            Axis::Temperature => "temperature",
            Axis::VegetationIndex => "vegetation_index",
        }
    }
}

/// The three values the classifier looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    // ---
    /// Percent, expected in [0, 100].
    pub soil_moisture: f64,
    /// Expected in [0, 1].
    pub vegetation_index: f64,
    /// Degrees Celsius.
    pub temperature: f64,
}

impl Reading {
    pub fn new(soil_moisture: f64, vegetation_index: f64, temperature: f64) -> Self {
        Self {
            soil_moisture,
            vegetation_index,
            temperature,
        }
    }

    /// First axis holding a NaN or infinite value, if any.
    pub fn non_finite_axis(&self) -> Option<Axis> {
        // ---
        [
            (Axis::SoilMoisture, self.soil_moisture),
            (Axis::VegetationIndex, self.vegetation_index),
            (Axis::Temperature, self.temperature),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(axis, _)| axis)
    }
}

/// Cut-offs for a single tier. A reading matches the tier when any axis
/// crosses its cut-off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    // ---
    pub soil_moisture_below: f64,
    pub temperature_above: f64,
    pub vegetation_index_below: f64,
}

impl Tier {
    /// Axes of `reading` that cross this tier, in a fixed axis order.
    pub fn breaches(&self, reading: &Reading) -> Vec<Axis> {
        // ---
        let mut axes = Vec::new();
        if reading.soil_moisture < self.soil_moisture_below {
            axes.push(Axis::SoilMoisture);
        }
        if reading.temperature > self.temperature_above {
            axes.push(Axis::Temperature);
        }
        if reading.vegetation_index < self.vegetation_index_below {
            axes.push(Axis::VegetationIndex);
        }
        axes
    }
}

/// Validated pair of tiers.
///
/// The Degraded tier is never milder than the AtRisk tier on any axis, so a
/// reading that is Degraded would also have matched AtRisk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    degraded: Tier,
    at_risk: Tier,
}

impl Thresholds {
    /// Degraded tier used when nothing is configured.
    pub const DEFAULT_DEGRADED: Tier = Tier {
        soil_moisture_below: 30.0,
        temperature_above: 35.0,
        vegetation_index_below: 0.3,
    };

    /// AtRisk tier used when nothing is configured.
    pub const DEFAULT_AT_RISK: Tier = Tier {
        soil_moisture_below: 40.0,
        temperature_above: 33.0,
        vegetation_index_below: 0.4,
    };

    /// Build a threshold set, rejecting tiers that are out of order. NaN
    /// cut-offs fail the ordering checks as well.
    pub fn new(degraded: Tier, at_risk: Tier) -> Result<Self, ThresholdError> {
        // ---
        if !(degraded.soil_moisture_below <= at_risk.soil_moisture_below) {
            return Err(ThresholdError::SoilMoisture {
                degraded: degraded.soil_moisture_below,
                at_risk: at_risk.soil_moisture_below,
            });
        }
        if !(degraded.temperature_above >= at_risk.temperature_above) {
            return Err(ThresholdError::Temperature {
                degraded: degraded.temperature_above,
                at_risk: at_risk.temperature_above,
            });
        }
        if !(degraded.vegetation_index_below <= at_risk.vegetation_index_below) {
            return Err(ThresholdError::VegetationIndex {
                degraded: degraded.vegetation_index_below,
                at_risk: at_risk.vegetation_index_below,
            });
        }

        Ok(Self { degraded, at_risk })
    }

    pub fn degraded(&self) -> &Tier {
        &self.degraded
    }

    pub fn at_risk(&self) -> &Tier {
        &self.at_risk
    }

    /// Tiers in evaluation order, worst first.
    fn decision_table(&self) -> [(Status, &Tier); 2] {
        [(Status::Degraded, &self.degraded), (Status::AtRisk, &self.at_risk)]
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            degraded: Self::DEFAULT_DEGRADED,
            at_risk: Self::DEFAULT_AT_RISK,
        }
    }
}

/// Result of classifying one reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    // ---
    pub status: Status,
    pub suggestion: &'static str,
    /// Axes that crossed the matched tier; empty when Healthy.
    pub breaches: Vec<Axis>,
}

/// Classify a single reading.
pub fn classify(reading: &Reading, thresholds: &Thresholds) -> Classification {
    // ---
    for (status, tier) in thresholds.decision_table() {
        let breaches = tier.breaches(reading);
        if !breaches.is_empty() {
            return Classification {
                status,
                suggestion: status.suggestion(),
                breaches,
            };
        }
    }

    Classification {
        status: Status::Healthy,
        suggestion: Status::Healthy.suggestion(),
        breaches: Vec::new(),
    }
}
