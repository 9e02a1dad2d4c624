//! Error taxonomy.
//!
//! Structural problems (a join column that does not exist, an unreadable file) are
//! [`VizError`]s and abort the call. Cosmetic refinements that fail (palette lookup,
//! reprojection) are [`Degradation`]s: they are logged and replaced by a safe default.

use std::fmt;

/// Fatal errors surfaced by chart and map operations.
#[derive(Debug, thiserror::Error)]
pub enum VizError {
    /// A required join/value column is absent from its source.
    #[error("'{column}' not found in {source_name} columns: {}", format_columns(.available))]
    Configuration {
        column: String,
        source_name: &'static str,
        available: Vec<String>,
    },

    /// Two sequences that must pair up element-wise have different lengths.
    #[error("{what}: length mismatch ({left} vs {right})")]
    LengthMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },

    /// Input a draw primitive cannot represent (negative wedge, zero bins, NaN...).
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A color string that is neither hex nor a known color name.
    #[error("invalid color '{0}'")]
    Color(String),

    /// Plotting backend failure, carried as text.
    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    GeoJson(#[from] geojson::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = VizError> = std::result::Result<T, E>;

/// Map any plotters error (`DrawingAreaErrorKind<_>` and friends) into [`VizError::Render`].
pub(crate) fn render_err<E: fmt::Debug>(e: E) -> VizError {
    VizError::Render(format!("{:?}", e))
}

fn format_columns(cols: &[String]) -> String {
    let quoted: Vec<String> = cols.iter().map(|c| format!("'{c}'")).collect();
    format!("[{}]", quoted.join(", "))
}

/// Non-fatal failure of a best-effort refinement.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Degradation {
    #[error("unknown palette '{0}'")]
    UnknownPalette(String),

    #[error("palette '{name}' has no {steps}-color variant")]
    UnsupportedSteps { name: String, steps: usize },

    #[error("unsupported coordinate reference system '{0}'")]
    UnsupportedCrs(String),

    #[error("no coordinate reference system declared")]
    NoCrs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_message_lists_columns() {
        let e = VizError::Configuration {
            column: "ADM2_EN".into(),
            source_name: "geometry layer",
            available: vec!["name".into(), "geometry".into()],
        };
        let msg = e.to_string();
        assert_eq!(
            msg,
            "'ADM2_EN' not found in geometry layer columns: ['name', 'geometry']"
        );
    }

    #[test]
    fn render_err_keeps_debug_text() {
        let e = render_err("backend exploded");
        assert!(e.to_string().contains("backend exploded"));
    }
}
