//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the aggregator and statistics engine
//! - exported to JSON/CSV
//! - handed to the chart renderers without any further conversion

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Short month labels used on chart axes and tables.
pub const MONTH_LABELS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

/// Quarter labels used on chart axes and tables.
pub const QUARTER_LABELS: [&str; 4] = ["Ene-Mar", "Abr-Jun", "Jul-Sep", "Oct-Dic"];

/// One dated measurement, as produced by a `DataSource`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Calendar month, `1..=12`.
    pub fn month(&self) -> u32 {
        self.date.month()
    }

    /// Calendar quarter, `1..=4`.
    pub fn quarter(&self) -> u32 {
        quarter_of(self.month())
    }
}

/// Quarter containing `month` (`1..=12` → `1..=4`).
pub fn quarter_of(month: u32) -> u32 {
    (month - 1) / 3 + 1
}

/// Aggregation granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Monthly,
    Quarterly,
    Annual,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Monthly, Granularity::Quarterly, Granularity::Annual];

    /// Suffix used in output file names (`caudal_mensual.png`, ...).
    pub fn file_suffix(self) -> &'static str {
        match self {
            Granularity::Monthly => "mensual",
            Granularity::Quarterly => "trimestral",
            Granularity::Annual => "anual",
        }
    }

    /// Human-readable label for chart titles.
    pub fn display_name(self) -> &'static str {
        match self {
            Granularity::Monthly => "Mensual",
            Granularity::Quarterly => "Trimestral",
            Granularity::Annual => "Anual",
        }
    }

    /// Axis label for the period dimension.
    pub fn axis_label(self) -> &'static str {
        match self {
            Granularity::Monthly => "Mes",
            Granularity::Quarterly => "Trimestre",
            Granularity::Annual => "Año",
        }
    }
}

/// Key identifying one aggregated period.
///
/// The first three variants are first-stage keys (one row per year and
/// calendar unit); `Month` and `Quarter` are regime keys, where the year
/// dimension has been averaged out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKey {
    Year(i32),
    YearMonth(i32, u32),
    YearQuarter(i32, u32),
    Month(u32),
    Quarter(u32),
}

impl PeriodKey {
    /// Label shown on chart axes and in tables.
    pub fn label(&self) -> String {
        match *self {
            PeriodKey::Year(y) => y.to_string(),
            PeriodKey::YearMonth(y, m) => format!("{y}-{m:02}"),
            PeriodKey::YearQuarter(y, q) => format!("{y}-T{q}"),
            PeriodKey::Month(m) => month_label(m).to_string(),
            PeriodKey::Quarter(q) => quarter_label(q).to_string(),
        }
    }

    /// Position of the key on a numeric axis: the year, or the month/quarter ordinal.
    pub fn ordinal(&self) -> f64 {
        match *self {
            PeriodKey::Year(y) => f64::from(y),
            PeriodKey::YearMonth(y, m) => f64::from(y) + (f64::from(m) - 1.0) / 12.0,
            PeriodKey::YearQuarter(y, q) => f64::from(y) + (f64::from(q) - 1.0) / 4.0,
            PeriodKey::Month(m) => f64::from(m),
            PeriodKey::Quarter(q) => f64::from(q),
        }
    }
}

pub fn month_label(month: u32) -> &'static str {
    MONTH_LABELS
        .get((month as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("?")
}

pub fn quarter_label(quarter: u32) -> &'static str {
    QUARTER_LABELS
        .get((quarter as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("?")
}

/// Mean value over one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodAggregate {
    pub period: PeriodKey,
    pub mean_value: f64,
}

/// The five analysed variables.
///
/// Besides identity, each variable carries the fixed presentation metadata of
/// the report (file stem, titles, axis label, series color).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Flow,
    MinTemperature,
    RelativeHumidity,
    Evaporation,
    Precipitation,
}

impl Variable {
    pub const ALL: [Variable; 5] = [
        Variable::Flow,
        Variable::MinTemperature,
        Variable::RelativeHumidity,
        Variable::Evaporation,
        Variable::Precipitation,
    ];

    /// Key of this variable in configuration files.
    pub fn key(self) -> &'static str {
        match self {
            Variable::Flow => "flow",
            Variable::MinTemperature => "min_temperature",
            Variable::RelativeHumidity => "relative_humidity",
            Variable::Evaporation => "evaporation",
            Variable::Precipitation => "precipitation",
        }
    }

    /// Stem used for every output file of this variable.
    pub fn slug(self) -> &'static str {
        match self {
            Variable::Flow => "caudal",
            Variable::MinTemperature => "temperatura",
            Variable::RelativeHumidity => "humedad",
            Variable::Evaporation => "evaporacion",
            Variable::Precipitation => "precipitacion",
        }
    }

    /// Short name used in regime chart titles.
    pub fn short_title(self) -> &'static str {
        match self {
            Variable::Flow => "Caudal",
            Variable::MinTemperature => "Temperatura Mínima",
            Variable::RelativeHumidity => "Humedad Relativa Máxima",
            Variable::Evaporation => "Evaporación",
            Variable::Precipitation => "Precipitación",
        }
    }

    /// Full dataset name used in statistics titles.
    pub fn dataset_title(self) -> &'static str {
        match self {
            Variable::Flow => "Caudal Medio Mensual",
            Variable::MinTemperature => "Temperatura Mínima Mensual",
            Variable::RelativeHumidity => "Humedad Relativa Máxima Diaria",
            Variable::Evaporation => "Evaporación Total Diaria",
            Variable::Precipitation => "Precipitación Mensual",
        }
    }

    /// Value axis label, including the unit.
    pub fn axis_label(self) -> &'static str {
        match self {
            Variable::Flow => "Caudal (m³/s)",
            Variable::MinTemperature => "Temperatura (°C)",
            Variable::RelativeHumidity => "Humedad Relativa (%)",
            Variable::Evaporation => "Evaporación (mm)",
            Variable::Precipitation => "Precipitación (mm)",
        }
    }

    /// Series color as RGB.
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Variable::Flow => (0x44, 0x72, 0xC4),
            Variable::MinTemperature => (0xED, 0x7D, 0x31),
            Variable::RelativeHumidity => (0x70, 0xAD, 0x47),
            Variable::Evaporation => (0x5B, 0x9B, 0xD5),
            Variable::Precipitation => (0x9B, 0x59, 0xB6),
        }
    }

    /// Light tint of `color()` used for table header-column and banding.
    pub fn tint(self) -> (u8, u8, u8) {
        match self {
            Variable::Flow => (0xD9, 0xE1, 0xF2),
            Variable::MinTemperature => (0xFB, 0xE5, 0xD6),
            Variable::RelativeHumidity => (0xE2, 0xF0, 0xD9),
            Variable::Evaporation => (0xDE, 0xEB, 0xF7),
            Variable::Precipitation => (0xE8, 0xDA, 0xEF),
        }
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}
