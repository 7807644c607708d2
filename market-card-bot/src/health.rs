use anyhow::Result;
use market_card::{surface::Surface, Color, HeuristicShaper};
use tracing::{error, info};

use crate::output::ImageStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HealthReport {
    pub(crate) canvas: Result<usize, String>,
    pub(crate) storage: Result<(), String>,
}

impl HealthReport {
    pub(crate) fn is_ok(&self) -> bool {
        self.canvas.is_ok() && self.storage.is_ok()
    }
}

/// Draws and encodes a small image.
pub(crate) fn check_canvas() -> Result<usize> {
    let shaper = HeuristicShaper::default();
    let mut surface = Surface::new(100, 50, &shaper)?;
    surface.set_fill(Color::rgb(255, 0, 0));
    surface.fill_rect(0.0, 0.0, 100.0, 50.0);
    let png = surface.encode_png()?;
    Ok(png.len())
}

pub(crate) async fn check(store: &ImageStore) -> HealthReport {
    let canvas = check_canvas().map_err(|e| e.to_string());
    match &canvas {
        Ok(bytes) => info!("canvas ok, encoded {bytes} bytes"),
        Err(e) => error!("canvas check failed: {e}"),
    }
    let storage = store.check_writable().await.map_err(|e| e.to_string());
    match &storage {
        Ok(()) => info!("{} is writable", store.dir().display()),
        Err(e) => error!("{} is not writable: {e}", store.dir().display()),
    }
    HealthReport { canvas, storage }
}
