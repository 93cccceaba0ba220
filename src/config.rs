//! Dataset configuration.
//!
//! The report is built for one fixed dataset layout, so every field has a
//! default that reproduces it. A TOML file only needs to list what differs:
//!
//! ```toml
//! data_dir = "/data/cuenca"
//! output_dir = "figuras"
//!
//! [sources.min_temperature]
//! layout = "metadata"
//! path = "Temperatura Minima Mensual.csv"
//! header_prefix = "Fecha"
//! date_index = 0
//! value_index = 2
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::Variable;
use crate::error::AppError;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory that relative source paths are resolved against.
    pub data_dir: PathBuf,
    /// Where charts and exports are written (created on demand).
    pub output_dir: PathBuf,
    /// TrueType font used for chart text. Well-known system fonts are tried
    /// when unset.
    pub font_path: Option<PathBuf>,
    pub sources: Sources,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            output_dir: PathBuf::from("figuras"),
            font_path: None,
            sources: Sources::default(),
        }
    }
}

/// Where and how each variable's file is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Sources {
    pub flow: SourceSpec,
    pub min_temperature: SourceSpec,
    pub relative_humidity: SourceSpec,
    pub evaporation: SourceSpec,
    pub precipitation: SourceSpec,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            flow: SourceSpec::columns("Caudal medio mensual/Caudal medio mensual.csv", "Fecha", "Valor"),
            min_temperature: SourceSpec::Metadata {
                path: PathBuf::from(
                    "Temperatura Mensual/Temperatura Minima Mensual/Temperatura Minima Mensual.csv",
                ),
                header_prefix: "Fecha".to_string(),
                date_index: 0,
                value_index: 2,
            },
            relative_humidity: SourceSpec::columns(
                "Húmeda relativa calculada máxima diaria/Húmeda relativa calculada máxima diaria.csv",
                "Fecha",
                "Valor",
            ),
            evaporation: SourceSpec::columns(
                "Evaporación total diaria SUM [EVTE_CON]/Evaporación total diaria SUM.csv",
                "Fecha",
                "Valor",
            ),
            precipitation: SourceSpec::columns(
                "Datos/Precipitacion Mensual.csv",
                "system:time_start",
                "precipitation",
            ),
        }
    }
}

impl Sources {
    pub fn get(&self, variable: Variable) -> &SourceSpec {
        match variable {
            Variable::Flow => &self.flow,
            Variable::MinTemperature => &self.min_temperature,
            Variable::RelativeHumidity => &self.relative_humidity,
            Variable::Evaporation => &self.evaporation,
            Variable::Precipitation => &self.precipitation,
        }
    }
}

/// File layout of one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum SourceSpec {
    /// Plain CSV with a header row; columns looked up by name.
    Columns {
        path: PathBuf,
        date_column: String,
        value_column: String,
    },
    /// Text export with leading metadata lines. Data starts two lines after
    /// the first line beginning with `header_prefix`; fields are positional.
    Metadata {
        path: PathBuf,
        header_prefix: String,
        date_index: usize,
        value_index: usize,
    },
}

impl SourceSpec {
    fn columns(path: &str, date_column: &str, value_column: &str) -> Self {
        SourceSpec::Columns {
            path: PathBuf::from(path),
            date_column: date_column.to_string(),
            value_column: value_column.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            SourceSpec::Columns { path, .. } | SourceSpec::Metadata { path, .. } => path,
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.path().as_os_str().is_empty() {
            return Err("`path` must not be empty".to_string());
        }
        match self {
            SourceSpec::Columns {
                date_column,
                value_column,
                ..
            } => {
                if date_column.trim().is_empty() || value_column.trim().is_empty() {
                    return Err("`date_column` and `value_column` must not be empty".to_string());
                }
                if date_column.trim().eq_ignore_ascii_case(value_column.trim()) {
                    return Err("`date_column` and `value_column` must differ".to_string());
                }
            }
            SourceSpec::Metadata {
                header_prefix,
                date_index,
                value_index,
                ..
            } => {
                if header_prefix.is_empty() {
                    return Err("`header_prefix` must not be empty".to_string());
                }
                if date_index == value_index {
                    return Err("`date_index` and `value_index` must differ".to_string());
                }
            }
        }
        Ok(())
    }
}

impl Config {
    /// Load from `path`, or use the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse and validate a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path)
            .map_err(|e| AppError::new(2, format!("Failed to read config '{}': {e}", path.display())))?;
        Self::from_toml(&text).map_err(|e| e.context(format!("config '{}'", path.display())))
    }

    pub fn from_toml(text: &str) -> Result<Self, AppError> {
        let config: Config =
            toml::from_str(text).map_err(|e| AppError::new(2, format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(AppError::new(2, "Invalid config: `output_dir` must not be empty"));
        }
        for variable in Variable::ALL {
            self.sources
                .get(variable)
                .validate()
                .map_err(|e| AppError::new(2, format!("Invalid config for `sources.{}`: {e}", variable.key())))?;
        }
        Ok(())
    }

    /// Absolute-or-relative path of a variable's input file.
    pub fn source_path(&self, variable: Variable) -> PathBuf {
        self.data_dir.join(self.sources.get(variable).path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.output_dir, PathBuf::from("figuras"));
        assert!(matches!(config.sources.min_temperature, SourceSpec::Metadata { value_index: 2, .. }));
    }

    #[test]
    fn partial_sources_override_one_variable() {
        let text = r#"
            data_dir = "/data"

            [sources.precipitation]
            layout = "columns"
            path = "lluvia.csv"
            date_column = "date"
            value_column = "mm"
        "#;
        let config = Config::from_toml(text).unwrap();
        assert_eq!(config.source_path(Variable::Precipitation), PathBuf::from("/data/lluvia.csv"));
        assert_eq!(config.sources.flow, Sources::default().flow);
    }

    #[test]
    fn rejects_same_column_twice() {
        let text = r#"
            [sources.flow]
            layout = "columns"
            path = "q.csv"
            date_column = "Valor"
            value_column = "valor"
        "#;
        let err = Config::from_toml(text).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn rejects_unknown_layout() {
        let text = r#"
            [sources.flow]
            layout = "excel"
            path = "q.xlsx"
        "#;
        assert!(Config::from_toml(text).is_err());
    }
}
