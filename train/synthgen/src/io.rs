use std::{
    env, fs,
    io::{self, Error, ErrorKind},
    path::{Component, Path, PathBuf},
};

use board::{BoardBox, SquareBoxMap};
use image::{ImageFormat, RgbaImage};
use log::warn;

use crate::{
    config::OutputCfg,
    error::{SynthError, SynthResult},
    record::{SampleMetadata, SquareLabels},
};

/// Writes sample artifacts into parallel directories under a shared base name.
pub struct SamplePersister {
    out: OutputCfg,
}

impl SamplePersister {
    /// Checks the layout before anything is deleted. No output directory may
    /// hold the working directory, another output directory, or any of
    /// `inputs` (paths the run reads from).
    pub fn new(out: OutputCfg, inputs: &[&Path]) -> SynthResult<Self> {
        check_layout(&out, inputs)?;
        Ok(Self { out })
    }

    pub fn dirs(&self) -> impl Iterator<Item = &Path> {
        out_dirs(&self.out)
    }

    /// Destination directories that already hold something a reset would delete.
    pub fn populated_dirs(&self) -> Vec<PathBuf> {
        self.dirs()
            .filter(|d| {
                fs::read_dir(d)
                    .map(|mut entries| entries.next().is_some())
                    .unwrap_or(false)
            })
            .map(Path::to_path_buf)
            .collect()
    }

    /// Fails with `OutputNotEmpty` when a reset would delete files and
    /// `allow_wipe` is not set. Every populated directory is logged.
    pub fn confirm_reset(&self, allow_wipe: bool) -> SynthResult<()> {
        let populated = self.populated_dirs();
        for dir in &populated {
            warn!("{} is not empty and will be wiped", dir.display());
        }
        match populated.into_iter().next() {
            Some(path) if !allow_wipe => Err(SynthError::OutputNotEmpty { path }),
            _ => Ok(()),
        }
    }

    /// Empties and recreates every destination directory.
    pub fn reset(&self) -> SynthResult<()> {
        for dir in self.dirs() {
            warn!("resetting output directory {}", dir.display());
            reset_dir(dir)?;
        }
        Ok(())
    }

    pub fn image_path(&self, index: u32) -> PathBuf {
        self.out.image_dir.join(format!("{}.png", base_name(index)))
    }

    pub fn bbox_path(&self, index: u32) -> PathBuf {
        self.out.bbox_dir.join(format!("{}.txt", base_name(index)))
    }

    pub fn metadata_path(&self, index: u32) -> PathBuf {
        self.out.metadata_dir.join(format!("{}.json", base_name(index)))
    }

    pub fn squares_path(&self, index: u32) -> Option<PathBuf> {
        self.out
            .squares_dir
            .as_ref()
            .map(|d| d.join(format!("{}.json", base_name(index))))
    }

    /// Writes image, bbox and metadata (and square boxes when configured).
    /// The files are written one after another, not atomically.
    pub fn save(
        &self,
        index: u32,
        image: &RgbaImage,
        bbox: BoardBox,
        metadata: &SampleMetadata<'_>,
        squares: &SquareBoxMap,
    ) -> SynthResult<()> {
        let path = self.image_path(index);
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| SynthError::persistence(&path, Error::other(e)))?;

        let path = self.bbox_path(index);
        fs::write(&path, bbox.to_string()).map_err(|e| SynthError::persistence(&path, e))?;

        write_json(&self.metadata_path(index), metadata)?;

        if let Some(path) = self.squares_path(index) {
            write_json(&path, &SquareLabels(squares))?;
        }
        Ok(())
    }
}

pub fn base_name(index: u32) -> String {
    format!("{index:06}")
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> SynthResult<()> {
    let bytes =
        serde_json::to_vec(value).map_err(|e| SynthError::persistence(path, Error::other(e)))?;
    fs::write(path, bytes).map_err(|e| SynthError::persistence(path, e))
}

fn out_dirs(out: &OutputCfg) -> impl Iterator<Item = &Path> {
    [&out.image_dir, &out.bbox_dir, &out.metadata_dir]
        .into_iter()
        .chain(out.squares_dir.as_ref())
        .map(PathBuf::as_path)
}

fn invalid_path(path: &Path, msg: String) -> SynthError {
    SynthError::persistence(path, Error::new(ErrorKind::InvalidInput, msg))
}

fn check_layout(out: &OutputCfg, inputs: &[&Path]) -> SynthResult<()> {
    let cwd = env::current_dir()
        .and_then(fs::canonicalize)
        .map_err(|e| SynthError::persistence(".", e))?;

    let mut resolved: Vec<(&Path, PathBuf)> = Vec::new();
    for dir in out_dirs(out) {
        check_dir_path(dir)?;
        let abs = resolve(dir).map_err(|e| SynthError::persistence(dir, e))?;
        if abs.parent().is_none() {
            return Err(invalid_path(dir, "refusing to reset a filesystem root".into()));
        }
        if cwd.starts_with(&abs) {
            return Err(invalid_path(
                dir,
                "output directory contains the working directory".into(),
            ));
        }
        for (other, other_abs) in &resolved {
            if abs.starts_with(other_abs) || other_abs.starts_with(&abs) {
                return Err(invalid_path(
                    dir,
                    format!("overlaps output directory {}", other.display()),
                ));
            }
        }
        resolved.push((dir, abs));
    }

    for input in inputs {
        let abs = resolve(input).map_err(|e| SynthError::persistence(*input, e))?;
        for (dir, dir_abs) in &resolved {
            if abs.starts_with(dir_abs) {
                return Err(invalid_path(
                    dir,
                    format!("output directory contains input {}", input.display()),
                ));
            }
        }
    }
    Ok(())
}

fn check_dir_path(path: &Path) -> SynthResult<()> {
    if path.as_os_str().is_empty() {
        return Err(invalid_path(path, "empty output path".into()));
    }
    if path.exists() && !path.is_dir() {
        return Err(invalid_path(
            path,
            "output path exists and is not a directory".into(),
        ));
    }
    Ok(())
}

/// Absolute form of `path` with `.` and `..` folded away. The longest
/// existing prefix is canonicalized so symlinked spellings compare equal.
fn resolve(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    };
    let mut normal = PathBuf::new();
    for c in joined.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => {
                normal.pop();
            }
            other => normal.push(other),
        }
    }

    let mut existing = normal.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }
    let mut out = fs::canonicalize(existing)?;
    out.extend(missing.iter().rev());
    Ok(out)
}

/// Recreates the directory when dropped, whatever happened to it before.
struct Recreate<'a>(&'a Path);

impl Drop for Recreate<'_> {
    fn drop(&mut self) {
        let _ = fs::create_dir_all(self.0);
    }
}

fn reset_dir(path: &Path) -> SynthResult<()> {
    let _guard = Recreate(path);
    match fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(SynthError::persistence(path, e)),
    }
    fs::create_dir_all(path).map_err(|e| SynthError::persistence(path, e))?;

    let probe = path.join(".write-probe");
    fs::write(&probe, b"").map_err(|e| SynthError::persistence(path, e))?;
    fs::remove_file(&probe).map_err(|e| SynthError::persistence(path, e))
}
