//! Core data models for the Indexa+ converter
//!
//! This module contains the quotation types returned by the rate service and
//! the unit kinds the converter knows about.

pub mod client;

pub use client::{HttpResponse, HttpTransport, RateClient, RateError, ReqwestTransport};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two Uruguayan units of account the converter handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Unidad Indexada, adjusted daily by the consumer price index
    Indexed,
    /// Unidad Reajustable, adjusted periodically by the wage index
    Adjustable,
}

impl UnitKind {
    /// All unit kinds in tab order
    pub const ALL: [UnitKind; 2] = [UnitKind::Indexed, UnitKind::Adjustable];

    /// Path segment used by the rate service ("ui" or "ur")
    pub fn code(&self) -> &'static str {
        match self {
            UnitKind::Indexed => "ui",
            UnitKind::Adjustable => "ur",
        }
    }

    /// Key under which the latest quotation is cached
    pub fn cache_key(&self) -> &'static str {
        match self {
            UnitKind::Indexed => "cached_ui",
            UnitKind::Adjustable => "cached_ur",
        }
    }

    /// Tab label
    pub fn label(&self) -> &'static str {
        match self {
            UnitKind::Indexed => "Indexada",
            UnitKind::Adjustable => "Reajustable",
        }
    }

    /// Label for the amount input field
    pub fn units_label(&self) -> &'static str {
        match self {
            UnitKind::Indexed => "Unidades indexadas",
            UnitKind::Adjustable => "Unidades reajustables",
        }
    }

    /// Returns the other unit kind
    pub fn toggle(&self) -> Self {
        match self {
            UnitKind::Indexed => UnitKind::Adjustable,
            UnitKind::Adjustable => UnitKind::Indexed,
        }
    }

    /// Parses a unit name, accepting the service codes plus Spanish and English names
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ui" | "indexada" | "indexed" => Some(UnitKind::Indexed),
            "ur" | "reajustable" | "adjustable" => Some(UnitKind::Adjustable),
            _ => None,
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code().to_uppercase())
    }
}

/// When and where a quotation was retrieved by the rate service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMetadata {
    /// Timestamp of the upstream query
    #[serde(rename = "fecha_consulta", default)]
    pub queried_at: String,
    /// Upstream source identifier
    #[serde(rename = "fuente", default)]
    pub source: String,
}

/// A point-in-time value of a unit expressed in pesos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    /// Pesos per one unit; a missing value makes the quotation unusable
    #[serde(rename = "valor", default)]
    pub value: Option<f64>,
    /// Date the quotation applies to
    #[serde(rename = "fecha", default)]
    pub effective_date: String,
    /// Query metadata reported by the service
    #[serde(default)]
    pub metadata: Option<QueryMetadata>,
    /// Currency tag (normally "UYU")
    #[serde(rename = "moneda", default)]
    pub currency: String,
    /// Unit tag (normally "UI" or "UR")
    #[serde(rename = "tipo", default)]
    pub unit: String,
}

impl Quotation {
    /// Returns the rate if it can be used for conversion.
    ///
    /// Only finite, strictly positive values qualify.
    pub fn rate(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite() && *v > 0.0)
    }
}
