use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rand::RngCore;

use synthgen::{
    config::{GenConfig, OutputCfg, RenderFormat, RendererCfg},
    generator::DatasetItemGenerator,
    io::SamplePersister,
    pool::SamplePool,
    prep,
    renderer::HttpBoardRenderer,
    request::{BoardSize, BuilderConfig, RenderRequestBuilder},
};

#[derive(Parser, Debug)]
#[command(name = "synthgen")]
#[command(about = "Generate synthetic chessboard-detection training samples")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite rendered boards onto backgrounds and write labelled samples
    Generate(GenerateArgs),
    /// Shrink raw background photos so their longer side fits a maximum
    ResizeBackgrounds(ResizeArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Number of images to generate
    #[arg(short, long, default_value_t = 1000)]
    num: u32,

    #[arg(long, default_value = "output/images")]
    image_output_dir: PathBuf,

    #[arg(long, default_value = "output/bounding_boxes")]
    bbox_output_dir: PathBuf,

    /// FEN, orientation, theme and piece set of every sample
    #[arg(long, default_value = "output/metadata")]
    metadata_output_dir: PathBuf,

    /// Also write the 64 per-square boxes of every sample here
    #[arg(long)]
    squares_output_dir: Option<PathBuf>,

    #[arg(long, default_value = "resized_images")]
    backgrounds_dir: PathBuf,

    /// JSON list of {fen, lastMove?, check?} records
    #[arg(long, default_value = "fen_data_list.json")]
    fens: PathBuf,

    #[arg(long, default_value = "127.0.0.1")]
    renderer_host: String,

    #[arg(long, default_value_t = 8080)]
    renderer_port: u16,

    #[arg(long, value_enum, default_value_t = RenderFormat::Png)]
    format: RenderFormat,

    /// Side of the rendered board before it is scaled onto the background
    #[arg(long, default_value_t = 1000)]
    board_size: u32,

    /// Run seed; drawn from the OS when omitted
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Delete existing contents of the output directories without asking
    #[arg(long, default_value_t = false)]
    yes: bool,
}

#[derive(Args, Debug)]
struct ResizeArgs {
    #[arg(long, default_value = "background_images")]
    input: PathBuf,

    #[arg(long, default_value = "resized_images")]
    output: PathBuf,

    #[arg(long, default_value_t = 800)]
    max_dimension: u32,
}

impl From<GenerateArgs> for GenConfig {
    fn from(a: GenerateArgs) -> Self {
        Self {
            num: a.num,
            output: OutputCfg {
                image_dir: a.image_output_dir,
                bbox_dir: a.bbox_output_dir,
                metadata_dir: a.metadata_output_dir,
                squares_dir: a.squares_output_dir,
            },
            backgrounds_dir: a.backgrounds_dir,
            fens_path: a.fens,
            renderer: RendererCfg {
                host: a.renderer_host,
                port: a.renderer_port,
                format: a.format,
                timeout: Duration::from_secs(a.timeout_secs),
            },
            board_size: a.board_size,
            seed: a.seed,
        }
    }
}

fn generate(cfg: GenConfig, yes: bool) -> anyhow::Result<()> {
    let size = BoardSize::new(cfg.board_size)?;
    let inputs = [cfg.backgrounds_dir.as_path(), cfg.fens_path.as_path()];
    let persister = SamplePersister::new(cfg.output.clone(), &inputs)?;
    persister
        .confirm_reset(yes)
        .context("rerun with --yes to delete the existing contents")?;

    let pool = SamplePool::load(&cfg.backgrounds_dir, &cfg.fens_path)
        .context("loading sample pools")?;
    let renderer = HttpBoardRenderer::new(&cfg.renderer)?;
    info!("rendering boards via {}", renderer.url());

    persister.reset().context("resetting output directories")?;

    let seed = cfg.seed.unwrap_or_else(|| rand::rng().next_u64());
    info!("run seed {seed}");

    let builder = RenderRequestBuilder::new(BuilderConfig { size });
    let generator = DatasetItemGenerator::new(&pool, builder, renderer);

    let progress = ProgressBar::new(u64::from(cfg.num));
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} eta {eta}")
            .expect("valid template"),
    );
    let result = generator.run(&persister, cfg.num, seed, &progress);
    progress.finish();
    result.context("generating samples")?;

    info!("synthetic dataset generation complete");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => {
            let yes = args.yes;
            generate(args.into(), yes)
        }
        Command::ResizeBackgrounds(args) => {
            prep::resize_backgrounds(&args.input, &args.output, args.max_dimension)?;
            Ok(())
        }
    }
}
