//! Shrinking raw background photos before generation.

use std::{fs, path::Path};

use image::{DynamicImage, ImageFormat, imageops::FilterType};
use log::{info, warn};

use crate::error::{SynthError, SynthResult};

/// Target size with the longer side at `max_dim` and the aspect ratio kept
/// (shorter side rounded down, at least one pixel).
pub fn fit_within(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    let scale = |short: u32, long: u32| {
        ((u64::from(max_dim) * u64::from(short) / u64::from(long)) as u32).max(1)
    };
    if width > height {
        (max_dim, scale(height, width))
    } else {
        (scale(width, height), max_dim)
    }
}

pub fn resize_one(img: &DynamicImage, max_dim: u32) -> DynamicImage {
    let (w, h) = fit_within(img.width(), img.height(), max_dim);
    img.resize_exact(w, h, FilterType::Lanczos3)
}

/// Resizes every image in `input` into `output` under the same file name.
/// Returns how many files were written.
pub fn resize_backgrounds(input: &Path, output: &Path, max_dim: u32) -> SynthResult<usize> {
    if max_dim == 0 {
        return Err(SynthError::Config("max dimension must be positive".into()));
    }
    fs::create_dir_all(output).map_err(|e| SynthError::persistence(output, e))?;

    let mut entries: Vec<_> = fs::read_dir(input)
        .map_err(|e| SynthError::pool_load(input, e))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && ImageFormat::from_path(p).is_ok())
        .collect();
    entries.sort();

    let mut written = 0;
    for path in entries {
        let Some(name) = path.file_name() else {
            continue;
        };
        let img = match image::open(&path) {
            Ok(img) => img,
            Err(e) => {
                warn!("skipping {}: {e}", path.display());
                continue;
            }
        };
        let dest = output.join(name);
        resize_one(&img, max_dim)
            .save(&dest)
            .map_err(|e| SynthError::persistence(&dest, std::io::Error::other(e)))?;
        written += 1;
    }
    info!("resized {written} backgrounds into {}", output.display());
    Ok(written)
}
