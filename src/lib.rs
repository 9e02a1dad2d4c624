//! vizcraft
//!
//! Consistently themed charts and interactive choropleth maps on top of plotters.
//!
//! ### Features
//! - One theme (colors, fonts, sizes) shared by every chart, applied through a scoped guard
//! - One-call line, scatter, bar, histogram and pie charts that can be overlaid and saved
//!   as SVG or PNG
//! - Choropleth maps: join a value table onto GeoJSON regions by name, color them on a
//!   Brewer or perceptual scale and write a self-contained HTML page with hover tooltips
//!
//! ### Example
//! ```no_run
//! use vizcraft::charts::{ChartOptions, styled_bar};
//! use vizcraft::choropleth::{ChoroplethOptions, DataTable, build_choropleth};
//!
//! let (fig, _) = styled_bar(
//!     &["Backend", "Frontend", "Data"],
//!     &[28.0, 34.0, 22.0],
//!     ChartOptions::default().title("Tickets closed per team"),
//! )?;
//! fig.save("tickets.svg")?;
//!
//! let votes = DataTable::from_csv_path("votes.csv")?;
//! let map = build_choropleth(
//!     "regions.geojson",
//!     &votes,
//!     "ADM2_EN",
//!     "moughataa",
//!     "nb_votes",
//!     "votes.html",
//!     &ChoroplethOptions::default(),
//! )?;
//! println!("{} regions, scale {:?}", map.regions.len(), map.scale);
//! # Ok::<(), vizcraft::VizError>(())
//! ```

pub mod charts;
pub mod choropleth;
pub mod color;
pub mod error;
pub mod fallback;
pub mod figure;
pub mod theme;

pub use charts::{ChartOptions, Surface};
pub use color::Rgb;
pub use error::{Degradation, Result, VizError};
pub use figure::{AxesId, Figure, FigureConfig};
pub use theme::{DEFAULT_THEME, StyleScope, Theme, apply_style};
