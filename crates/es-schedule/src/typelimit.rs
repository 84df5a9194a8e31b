//! Schedule type limits: value bounds and units attached to a ruleset.
//!
//! Limits are metadata.  Evaluation never clamps values; the limit is carried
//! through to EnergyPlus, which performs the validation at run time.

use std::fmt;
use std::str::FromStr;

use es_core::Identifier;

use crate::{ScheduleError, ScheduleResult};

// ── NumericType ───────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumericType {
    #[default]
    Continuous,
    /// Only integer values are accepted.
    Discrete,
}

impl NumericType {
    pub fn as_str(self) -> &'static str {
        match self {
            NumericType::Continuous => "Continuous",
            NumericType::Discrete => "Discrete",
        }
    }
}

impl FromStr for NumericType {
    type Err = ScheduleError;

    /// Case-insensitive; an empty string is `Continuous`.
    fn from_str(s: &str) -> ScheduleResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "continuous" => Ok(NumericType::Continuous),
            "discrete" => Ok(NumericType::Discrete),
            _ => Err(ScheduleError::TypeLimit(format!("{s:?} is not a numeric type"))),
        }
    }
}

// ── UnitType ──────────────────────────────────────────────────────────────────

/// EnergyPlus unit types for schedule values.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitType {
    #[default]
    Dimensionless,
    Temperature,
    DeltaTemperature,
    PrecipitationRate,
    Angle,
    ConvectionCoefficient,
    ActivityLevel,
    Velocity,
    Capacity,
    Power,
    Availability,
    Percent,
    Control,
    Mode,
}

impl UnitType {
    pub const ALL: [UnitType; 14] = [
        UnitType::Dimensionless,
        UnitType::Temperature,
        UnitType::DeltaTemperature,
        UnitType::PrecipitationRate,
        UnitType::Angle,
        UnitType::ConvectionCoefficient,
        UnitType::ActivityLevel,
        UnitType::Velocity,
        UnitType::Capacity,
        UnitType::Power,
        UnitType::Availability,
        UnitType::Percent,
        UnitType::Control,
        UnitType::Mode,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UnitType::Dimensionless => "Dimensionless",
            UnitType::Temperature => "Temperature",
            UnitType::DeltaTemperature => "DeltaTemperature",
            UnitType::PrecipitationRate => "PrecipitationRate",
            UnitType::Angle => "Angle",
            UnitType::ConvectionCoefficient => "ConvectionCoefficient",
            UnitType::ActivityLevel => "ActivityLevel",
            UnitType::Velocity => "Velocity",
            UnitType::Capacity => "Capacity",
            UnitType::Power => "Power",
            UnitType::Availability => "Availability",
            UnitType::Percent => "Percent",
            UnitType::Control => "Control",
            UnitType::Mode => "Mode",
        }
    }

    /// Unit string of values carrying this type.
    pub fn unit(self) -> &'static str {
        match self {
            UnitType::Dimensionless
            | UnitType::Availability
            | UnitType::Control
            | UnitType::Mode => "fraction",
            UnitType::Temperature => "C",
            UnitType::DeltaTemperature => "dC",
            UnitType::PrecipitationRate => "m",
            UnitType::Angle => "degrees",
            UnitType::ConvectionCoefficient => "W/m2-K",
            UnitType::ActivityLevel | UnitType::Capacity | UnitType::Power => "W",
            UnitType::Velocity => "m/s",
            UnitType::Percent => "%",
        }
    }
}

impl FromStr for UnitType {
    type Err = ScheduleError;

    /// Case-insensitive; an empty string is `Dimensionless`.
    fn from_str(s: &str) -> ScheduleResult<Self> {
        let clean = s.trim();
        if clean.is_empty() {
            return Ok(UnitType::Dimensionless);
        }
        Self::ALL
            .into_iter()
            .find(|u| u.as_str().eq_ignore_ascii_case(clean))
            .ok_or_else(|| ScheduleError::TypeLimit(format!("unit type {s:?} is not recognized")))
    }
}

// ── ScheduleTypeLimit ─────────────────────────────────────────────────────────

/// Bounds, numeric type and units for the values of a schedule.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleTypeLimit {
    identifier:   Identifier,
    display_name: Option<String>,
    lower_limit:  Option<f64>,
    upper_limit:  Option<f64>,
    numeric_type: NumericType,
    unit_type:    UnitType,
}

impl ScheduleTypeLimit {
    /// `None` for a limit means "no limit".  The lower limit may not exceed
    /// the upper limit.
    pub fn new(
        identifier:   Identifier,
        lower_limit:  Option<f64>,
        upper_limit:  Option<f64>,
        numeric_type: NumericType,
        unit_type:    UnitType,
    ) -> ScheduleResult<Self> {
        for limit in [lower_limit, upper_limit].into_iter().flatten() {
            if !limit.is_finite() {
                return Err(ScheduleError::TypeLimit(format!("limit {limit} is not finite")));
            }
        }
        if let (Some(lo), Some(hi)) = (lower_limit, upper_limit) {
            if lo > hi {
                return Err(ScheduleError::TypeLimit(format!(
                    "lower limit {lo} is greater than upper limit {hi}"
                )));
            }
        }
        Ok(Self { identifier, display_name: None, lower_limit, upper_limit, numeric_type, unit_type })
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(self.identifier.as_str())
    }

    pub fn raw_display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn lower_limit(&self) -> Option<f64> {
        self.lower_limit
    }

    pub fn upper_limit(&self) -> Option<f64> {
        self.upper_limit
    }

    pub fn numeric_type(&self) -> NumericType {
        self.numeric_type
    }

    pub fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    pub fn unit(&self) -> &'static str {
        self.unit_type.unit()
    }

    /// `true` if `value` is within the limits (and integral for `Discrete`).
    pub fn accepts(&self, value: f64) -> bool {
        self.lower_limit.is_none_or(|lo| value >= lo)
            && self.upper_limit.is_none_or(|hi| value <= hi)
            && (self.numeric_type == NumericType::Continuous || value.fract() == 0.0)
    }

    // ── Standard limits ───────────────────────────────────────────────────

    fn preset(id: &str, lo: Option<f64>, hi: Option<f64>, nt: NumericType, ut: UnitType) -> Self {
        Self {
            identifier:   Identifier::clean(id),
            display_name: None,
            lower_limit:  lo,
            upper_limit:  hi,
            numeric_type: nt,
            unit_type:    ut,
        }
    }

    pub fn fractional() -> Self {
        Self::preset("Fractional", Some(0.0), Some(1.0), NumericType::Continuous, UnitType::Dimensionless)
    }

    pub fn on_off() -> Self {
        Self::preset("On-Off", Some(0.0), Some(1.0), NumericType::Discrete, UnitType::Dimensionless)
    }

    pub fn temperature() -> Self {
        Self::preset("Temperature", Some(-273.15), None, NumericType::Continuous, UnitType::Temperature)
    }

    pub fn activity_level() -> Self {
        Self::preset("Activity Level", Some(0.0), None, NumericType::Continuous, UnitType::ActivityLevel)
    }

    pub fn power() -> Self {
        Self::preset("Power", None, None, NumericType::Continuous, UnitType::Power)
    }

    pub fn humidity() -> Self {
        Self::preset("Humidity", Some(0.0), Some(100.0), NumericType::Continuous, UnitType::Percent)
    }

    pub fn angle() -> Self {
        Self::preset("Angle", Some(0.0), Some(180.0), NumericType::Continuous, UnitType::Angle)
    }

    pub fn delta_temperature() -> Self {
        Self::preset("Delta Temperature", None, None, NumericType::Continuous, UnitType::DeltaTemperature)
    }

    /// All standard limits, in library order.
    pub fn standard() -> Vec<Self> {
        vec![
            Self::fractional(),
            Self::on_off(),
            Self::temperature(),
            Self::activity_level(),
            Self::power(),
            Self::humidity(),
            Self::angle(),
            Self::delta_temperature(),
        ]
    }
}

impl fmt::Display for ScheduleTypeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_limit = |l: Option<f64>| l.map_or_else(|| "no limit".to_string(), |v| v.to_string());
        write!(
            f,
            "ScheduleTypeLimit: {} [{} .. {}] {} ({})",
            self.display_name(),
            fmt_limit(self.lower_limit),
            fmt_limit(self.upper_limit),
            self.numeric_type.as_str(),
            self.unit(),
        )
    }
}
