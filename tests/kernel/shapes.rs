//! Every supported shape against the per-byte reference

use super::common::{init_logging, levels, random_matrix, random_shards, reference, rng};
use galmul::{MulKernel, Shape, SimdLevel};

const LENGTHS: [usize; 6] = [0, 32, 64, 992, 1024, 1000];

fn check_all_shapes(accumulate: bool, seed: u64) {
    init_logging();
    let levels = levels();
    let mut rng = rng(seed);

    for shape in Shape::all() {
        let (inputs, outputs) = (shape.inputs(), shape.outputs());
        let matrix = random_matrix(&mut rng, inputs, outputs);

        for len in LENGTHS {
            let ins = random_shards(&mut rng, inputs, len);
            let prior = random_shards(&mut rng, outputs, len);
            let expected = reference(&matrix, &ins, &prior, 0, len, accumulate);

            for &level in &levels {
                let kernel = MulKernel::with_level(&matrix, level).unwrap();
                let mut outs = prior.clone();
                let processed = kernel
                    .mul_slices(&ins, &mut outs, 0, len, accumulate)
                    .unwrap();

                assert_eq!(processed, len / 32 * 32);
                assert_eq!(
                    outs, expected,
                    "shape {shape} len {len} level {level:?} accumulate {accumulate}"
                );
            }
        }
    }
}

#[test]
fn every_shape_overwrite_matches_reference() {
    check_all_shapes(false, 0x5eed_0001);
}

#[test]
fn every_shape_accumulate_matches_reference() {
    check_all_shapes(true, 0x5eed_0002);
}

#[test]
fn every_shape_with_offset_window() {
    let levels = levels();
    let mut rng = rng(0x5eed_0003);

    for shape in Shape::all() {
        let matrix = random_matrix(&mut rng, shape.inputs(), shape.outputs());
        let ins = random_shards(&mut rng, shape.inputs(), 300);
        let prior = random_shards(&mut rng, shape.outputs(), 300);
        let (start, stop) = (7, 263);
        let expected = reference(&matrix, &ins, &prior, start, stop, true);

        for &level in &levels {
            let kernel = MulKernel::with_level(&matrix, level).unwrap();
            let mut outs = prior.clone();
            let processed = kernel
                .mul_slices(&ins, &mut outs, start, stop, true)
                .unwrap();
            assert_eq!(processed, 256);
            assert_eq!(outs, expected, "shape {shape} level {level:?}");
        }
    }
}

#[test]
fn backends_are_bit_identical() {
    if !SimdLevel::Avx2.is_supported() {
        eprintln!("Skipping backend comparison - AVX2 not supported");
        return;
    }
    let mut rng = rng(0x5eed_0004);

    for shape in Shape::all() {
        let matrix = random_matrix(&mut rng, shape.inputs(), shape.outputs());
        let ins = random_shards(&mut rng, shape.inputs(), 4096);
        let prior = random_shards(&mut rng, shape.outputs(), 4096);

        let mut portable = prior.clone();
        let mut avx2 = prior.clone();
        MulKernel::with_level(&matrix, SimdLevel::Portable)
            .unwrap()
            .mul_slices(&ins, &mut portable, 0, 4096, true)
            .unwrap();
        MulKernel::with_level(&matrix, SimdLevel::Avx2)
            .unwrap()
            .mul_slices(&ins, &mut avx2, 0, 4096, true)
            .unwrap();

        assert_eq!(portable, avx2, "shape {shape}");
    }
}
