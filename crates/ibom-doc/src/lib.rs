//! The canonical board document and the context that finishes it.
//!
//! Adapters hand over a [`PcbData`] with geometry plus a flat component
//! list. [`DocumentBuilder`] normalizes the drawings, fills in the outline
//! and footprint boxes, builds the BOM and the font table, and the result
//! is serialized with [`payload::serialize`].

mod builder;
mod config;
mod error;
pub mod font;
pub mod generic_json;
mod model;
pub mod naming;
pub mod payload;

pub use builder::DocumentBuilder;
pub use config::Config;
pub use error::{DocumentError, GenericJsonError};
pub use font::{FontCache, Glyph, StrokeFont};
pub use model::{Drawings, FontData, Footprint, FootprintDrawing, LayerDrawings, Metadata, PcbData};
