use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::hint::black_box;
use synthgen::composite::{composite, resize_area};

fn bench_composite(c: &mut Criterion) {
    let background = RgbaImage::from_fn(800, 600, |x, y| Rgba([x as u8, y as u8, 90, 255]));
    let board = RgbaImage::from_fn(1000, 1000, |x, y| {
        if (x / 125 + y / 125) % 2 == 0 {
            Rgba([240, 217, 181, 255])
        } else {
            Rgba([181, 136, 99, 255])
        }
    });

    c.bench_function("resize_area_1000_to_450", |b| {
        b.iter(|| black_box(resize_area(&board, 450, 450)))
    });

    c.bench_function("composite", |b| {
        b.iter_batched(
            || Xoshiro256PlusPlus::seed_from_u64(7),
            |mut rng| black_box(composite(&background, &board, &mut rng)).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_composite);
criterion_main!(benches);
