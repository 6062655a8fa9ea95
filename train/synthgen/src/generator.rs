use board::{BoardBox, SquareBoxMap, square_boxes};
use image::RgbaImage;
use indicatif::ProgressBar;
use log::{debug, error, info};
use rand::{RngCore, SeedableRng};
use rand_xoshiro::{SplitMix64, Xoshiro256PlusPlus};

use crate::{
    composite::composite,
    error::SynthResult,
    io::SamplePersister,
    pool::SamplePool,
    record::SampleMetadata,
    renderer::BoardRenderer,
    request::{RenderRequest, RenderRequestBuilder},
};

/// One finished, not yet persisted, training example.
pub struct Sample {
    pub seed: u64,
    pub image: RgbaImage,
    pub bbox: BoardBox,
    pub squares: SquareBoxMap,
    pub request: RenderRequest,
    pub background: String,
}

/// Seed of sample `index` in a run seeded with `run_seed`.
///
/// Depends only on the pair, so any sample can be regenerated on its own.
pub fn sample_seed(run_seed: u64, index: u32) -> u64 {
    let mut sm = SplitMix64::seed_from_u64(run_seed.wrapping_add(u64::from(index)));
    sm.next_u64()
}

pub struct DatasetItemGenerator<'a, B: BoardRenderer> {
    pool: &'a SamplePool,
    builder: RenderRequestBuilder,
    renderer: B,
}

impl<'a, B: BoardRenderer> DatasetItemGenerator<'a, B> {
    pub fn new(pool: &'a SamplePool, builder: RenderRequestBuilder, renderer: B) -> Self {
        Self {
            pool,
            builder,
            renderer,
        }
    }

    pub fn generate_with_seed(&self, seed: u64) -> SynthResult<Sample> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

        let background = self.pool.sample_background(&mut rng);
        let position = self.pool.sample_position(&mut rng);
        let request = self.builder.build(position, &mut rng);

        let board = self.renderer.render(&request)?;
        let (image, bbox) = composite(&background.image, &board, &mut rng)?;
        let squares = square_boxes(bbox, request.orientation);

        Ok(Sample {
            seed,
            image,
            bbox,
            squares,
            request,
            background: background.name.clone(),
        })
    }

    /// Generates and persists samples `0..num`, stopping at the first failure.
    ///
    /// Samples written before the failure stay on disk.
    pub fn run(
        &self,
        persister: &SamplePersister,
        num: u32,
        run_seed: u64,
        progress: &ProgressBar,
    ) -> SynthResult<()> {
        for index in 0..num {
            let seed = sample_seed(run_seed, index);
            let sample = match self.generate_with_seed(seed) {
                Ok(s) => s,
                Err(e) => {
                    error!("sample {index} failed, aborting run: {e}");
                    return Err(e);
                }
            };
            debug!(
                "sample {index}: {} on {} at {}",
                sample.request.fen, sample.background, sample.bbox
            );

            let metadata = SampleMetadata {
                request: &sample.request,
                background: &sample.background,
                seed: sample.seed,
            };
            persister.save(index, &sample.image, sample.bbox, &metadata, &sample.squares)?;
            progress.inc(1);
        }
        info!("generated {num} samples");
        Ok(())
    }
}
