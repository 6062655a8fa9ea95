use std::{path::PathBuf, time::Duration};

use clap::ValueEnum;

/// Raster format requested from the board renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    Png,
    Svg,
}

impl RenderFormat {
    pub fn endpoint(self) -> &'static str {
        match self {
            RenderFormat::Png => "board.png",
            RenderFormat::Svg => "board.svg",
        }
    }
}

#[derive(Clone, Debug)]
pub struct RendererCfg {
    pub host: String,
    pub port: u16,
    pub format: RenderFormat,
    pub timeout: Duration,
}

impl Default for RendererCfg {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            format: RenderFormat::Png,
            timeout: Duration::from_secs(30),
        }
    }
}

impl RendererCfg {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Destination directories of one run.
#[derive(Clone, Debug)]
pub struct OutputCfg {
    pub image_dir: PathBuf,
    pub bbox_dir: PathBuf,
    pub metadata_dir: PathBuf,
    pub squares_dir: Option<PathBuf>, // per-square boxes, off unless requested
}

impl Default for OutputCfg {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("output/images"),
            bbox_dir: PathBuf::from("output/bounding_boxes"),
            metadata_dir: PathBuf::from("output/metadata"),
            squares_dir: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GenConfig {
    pub num: u32,
    pub output: OutputCfg,
    pub backgrounds_dir: PathBuf,
    pub fens_path: PathBuf,
    pub renderer: RendererCfg,
    pub board_size: u32,
    pub seed: Option<u64>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            num: 1000,
            output: OutputCfg::default(),
            backgrounds_dir: PathBuf::from("resized_images"),
            fens_path: PathBuf::from("fen_data_list.json"),
            renderer: RendererCfg::default(),
            board_size: 1000,
            seed: None,
        }
    }
}
