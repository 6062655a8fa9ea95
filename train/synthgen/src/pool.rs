use std::{fs, path::Path};

use board::PositionRecord;
use image::{ImageFormat, RgbaImage};
use log::{debug, info, warn};
use rand::Rng;

use crate::error::{SynthError, SynthResult};

/// A decoded background photo and the file it came from.
#[derive(Debug)]
pub struct Background {
    pub name: String,
    pub image: RgbaImage,
}

/// Backgrounds and positions to draw samples from. Read-only once built.
pub struct SamplePool {
    backgrounds: Vec<Background>,
    positions: Vec<PositionRecord>,
}

impl SamplePool {
    pub fn new(backgrounds: Vec<Background>, positions: Vec<PositionRecord>) -> SynthResult<Self> {
        if backgrounds.is_empty() {
            return Err(SynthError::EmptyPool { pool: "background" });
        }
        if positions.is_empty() {
            return Err(SynthError::EmptyPool { pool: "position" });
        }
        Ok(Self {
            backgrounds,
            positions,
        })
    }

    pub fn load(backgrounds_dir: &Path, fens_path: &Path) -> SynthResult<Self> {
        let positions = load_positions(fens_path)?;
        let backgrounds = load_backgrounds(backgrounds_dir)?;
        let pool = Self::new(backgrounds, positions)?;
        info!(
            "loaded {} backgrounds and {} positions",
            pool.background_count(),
            pool.position_count()
        );
        Ok(pool)
    }

    pub fn sample_background<R: Rng>(&self, rng: &mut R) -> &Background {
        &self.backgrounds[rng.random_range(0..self.backgrounds.len())]
    }

    pub fn sample_position<R: Rng>(&self, rng: &mut R) -> &PositionRecord {
        &self.positions[rng.random_range(0..self.positions.len())]
    }

    pub fn background_count(&self) -> usize {
        self.backgrounds.len()
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }
}

/// Reads the JSON array of position records and checks every FEN.
pub fn load_positions(path: &Path) -> SynthResult<Vec<PositionRecord>> {
    let bytes = fs::read(path).map_err(|e| SynthError::pool_load(path, e))?;
    let records: Vec<PositionRecord> =
        serde_json::from_slice(&bytes).map_err(|e| SynthError::pool_load(path, e))?;
    for (i, rec) in records.iter().enumerate() {
        rec.validate()
            .map_err(|e| SynthError::pool_load(path, format!("record {i}: {e}")))?;
    }
    Ok(records)
}

/// Decodes every image file in `dir`, in file-name order.
pub fn load_backgrounds(dir: &Path) -> SynthResult<Vec<Background>> {
    let mut paths: Vec<_> = fs::read_dir(dir)
        .map_err(|e| SynthError::pool_load(dir, e))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && ImageFormat::from_path(p).is_ok())
        .collect();
    paths.sort();

    let mut backgrounds = Vec::with_capacity(paths.len());
    for path in paths {
        match image::open(&path) {
            Ok(img) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                debug!("background {name}: {}x{}", img.width(), img.height());
                backgrounds.push(Background {
                    name,
                    image: img.to_rgba8(),
                });
            }
            Err(e) => warn!("skipping {}: {e}", path.display()),
        }
    }
    Ok(backgrounds)
}
