//! Well records and field selection

use serde::{Deserialize, Serialize};

/// A single producing well as seen by the closure optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Well {
    /// Well name, unique within a request
    #[serde(alias = "name")]
    pub id: String,
    /// Field / group label (e.g. "Pilar")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Water flow rate (m³/d)
    #[serde(alias = "flow")]
    pub flow_m3_d: f64,
    /// Daily profit impact when the well is closed (USD/d).
    /// Negative values mean closing the well saves money.
    #[serde(alias = "profit")]
    pub profit_usd_d: f64,
}

impl Well {
    pub fn new(id: impl Into<String>, flow_m3_d: f64, profit_usd_d: f64) -> Self {
        Self {
            id: id.into(),
            field: None,
            flow_m3_d,
            profit_usd_d,
        }
    }

    /// Attach a field label.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Wells with zero or negative flow cannot contribute to a water target.
    pub fn is_producing(&self) -> bool {
        self.flow_m3_d > 0.0
    }
}

/// Which field's wells to consider.
///
/// The operator tool historically offered "Pilar" versus "everything that is
/// not Pilar"; `Only` and `Except` generalize both choices to any field name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "field", rename_all = "snake_case")]
pub enum FieldFilter {
    /// Every well regardless of field
    #[default]
    Any,
    /// Only wells in the named field
    Only(String),
    /// Every well outside the named field (wells without a field included)
    Except(String),
}

impl FieldFilter {
    /// Build a filter from the optional `field` / `except_field` pair used by
    /// the CLI and HTTP surfaces. `field` wins when both are given.
    pub fn from_options(field: Option<&str>, except_field: Option<&str>) -> Self {
        match (field, except_field) {
            (Some(f), _) if !f.trim().is_empty() => Self::Only(f.trim().to_string()),
            (_, Some(e)) if !e.trim().is_empty() => Self::Except(e.trim().to_string()),
            _ => Self::Any,
        }
    }

    /// Case-insensitive field match.
    pub fn matches(&self, well: &Well) -> bool {
        let same_field = |name: &str| {
            well.field
                .as_deref()
                .is_some_and(|f| f.trim().eq_ignore_ascii_case(name.trim()))
        };
        match self {
            Self::Any => true,
            Self::Only(name) => same_field(name),
            Self::Except(name) => !same_field(name),
        }
    }
}

impl std::fmt::Display for FieldFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "all fields"),
            Self::Only(name) => write!(f, "{name}"),
            Self::Except(name) => write!(f, "all except {name}"),
        }
    }
}
