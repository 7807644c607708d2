//! Renders an item's market board state into a single PNG card.
//!
//! [`pipeline::RenderPipeline`] is the entry point. Everything below it is
//! synchronous drawing onto a [`surface::Surface`] that lives for exactly one
//! render.

pub mod bars;
pub mod color;
pub mod config;
pub mod fonts;
pub mod format;
pub mod icon;
pub mod layout;
pub mod legend;
pub mod listing;
pub mod model;
pub mod pipeline;
pub mod surface;
pub mod text;

use thiserror::Error;

pub use color::{Color, Fill};
pub use config::RenderConfig;
pub use fonts::FontLibrary;
pub use icon::{IconError, IconSource};
pub use model::{ItemInfo, Listing, SaleInfo};
pub use pipeline::{RenderPipeline, RenderedCard};
pub use text::{HeuristicShaper, TextShaper};

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to allocate a {0}x{1} drawing surface")]
    Surface(u32, u32),
    #[error("failed to encode image: {0}")]
    Encode(String),
    #[error("invalid font data")]
    Font(#[from] ab_glyph::InvalidFont),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Image(#[from] image::ImageError),
}

/// Size of whatever a section just drew. Callers advance their cursor by it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutBox {
    pub width: f32,
    pub height: f32,
}

impl LayoutBox {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}
