//! Algebraic properties of the kernel

use super::common::{levels, random_matrix, random_shards, reference, rng};
use galmul::{
    build_split_table, mul_slices, CoefficientMatrix, Galois8, KernelConfig, MulKernel, Shape,
};

#[test]
fn overwrite_equals_accumulate_on_zeroed_outputs() {
    let mut rng = rng(0xacc0);

    for shape in Shape::all() {
        let matrix = random_matrix(&mut rng, shape.inputs(), shape.outputs());
        let ins = random_shards(&mut rng, shape.inputs(), 256);

        for level in levels() {
            let kernel = MulKernel::with_level(&matrix, level).unwrap();
            let mut overwrite = vec![vec![0u8; 256]; shape.outputs()];
            let mut accumulate = vec![vec![0u8; 256]; shape.outputs()];

            kernel.mul_slices(&ins, &mut overwrite, 0, 256, false).unwrap();
            kernel.mul_slices(&ins, &mut accumulate, 0, 256, true).unwrap();
            assert_eq!(overwrite, accumulate, "shape {shape} level {level:?}");
        }
    }
}

#[test]
fn overwrite_ignores_prior_output() {
    let mut rng = rng(0x0e1);
    let matrix = random_matrix(&mut rng, 4, 3);
    let ins = random_shards(&mut rng, 4, 128);
    let kernel = MulKernel::new(&matrix).unwrap();

    let mut zeroed = vec![vec![0u8; 128]; 3];
    let mut dirty = random_shards(&mut rng, 3, 128);
    kernel.mul_slices(&ins, &mut zeroed, 0, 128, false).unwrap();
    kernel.mul_slices(&ins, &mut dirty, 0, 128, false).unwrap();
    assert_eq!(zeroed, dirty);
}

#[test]
fn kernel_is_linear_in_the_matrix() {
    let mut rng = rng(0x11ea);

    for (inputs, outputs) in [(1, 1), (3, 2), (5, 5), (12, 10)] {
        let a = random_matrix(&mut rng, inputs, outputs);
        let b = random_matrix(&mut rng, inputs, outputs);
        let sum = a.add(&b).unwrap();
        let ins = random_shards(&mut rng, inputs, 512);

        let mut combined = vec![vec![0u8; 512]; outputs];
        mul_slices(&sum, &ins, &mut combined, 0, 512, false).unwrap();

        let mut separate = vec![vec![0u8; 512]; outputs];
        mul_slices(&a, &ins, &mut separate, 0, 512, true).unwrap();
        mul_slices(&b, &ins, &mut separate, 0, 512, true).unwrap();

        assert_eq!(combined, separate, "shape {inputs}x{outputs}");
    }
}

#[test]
fn kernel_is_linear_in_the_inputs() {
    let mut rng = rng(0x11eb);
    let matrix = random_matrix(&mut rng, 6, 4);
    let x = random_shards(&mut rng, 6, 320);
    let y = random_shards(&mut rng, 6, 320);
    let xy: Vec<Vec<u8>> = x
        .iter()
        .zip(&y)
        .map(|(a, b)| a.iter().zip(b).map(|(p, q)| p ^ q).collect())
        .collect();
    let kernel = MulKernel::new(&matrix).unwrap();

    let mut combined = vec![vec![0u8; 320]; 4];
    kernel.mul_slices(&xy, &mut combined, 0, 320, false).unwrap();

    let mut separate = vec![vec![0u8; 320]; 4];
    kernel.mul_slices(&x, &mut separate, 0, 320, true).unwrap();
    kernel.mul_slices(&y, &mut separate, 0, 320, true).unwrap();

    assert_eq!(combined, separate);
}

#[test]
fn accumulating_twice_cancels() {
    let mut rng = rng(0xcafe);
    let matrix = random_matrix(&mut rng, 2, 3);
    let ins = random_shards(&mut rng, 2, 96);
    let original = random_shards(&mut rng, 3, 96);
    let kernel = MulKernel::new(&matrix).unwrap();

    let mut outs = original.clone();
    kernel.mul_slices(&ins, &mut outs, 0, 96, true).unwrap();
    assert_ne!(outs, original);
    kernel.mul_slices(&ins, &mut outs, 0, 96, true).unwrap();
    assert_eq!(outs, original);
}

#[test]
fn split_tables_are_deterministic() {
    for c in 0..=255u8 {
        assert_eq!(
            build_split_table(Galois8::new(c)),
            build_split_table(Galois8::new(c))
        );
    }
}

#[test]
fn identity_matrix_copies_inputs() {
    let mut rng = rng(0x1d);
    let ins = random_shards(&mut rng, 5, 160);
    let mut outs = vec![vec![0u8; 160]; 5];

    mul_slices(&CoefficientMatrix::identity(5), &ins, &mut outs, 0, 160, false).unwrap();
    assert_eq!(outs, ins);
}

#[test]
fn concrete_identity_scenario() {
    let matrix = CoefficientMatrix::from_rows(&[[1u8]]).unwrap();
    let input: Vec<u8> = (0x01..=0x20).collect();
    let mut outs = vec![vec![0u8; 32]];

    mul_slices(&matrix, &[&input], &mut outs, 0, 32, false).unwrap();
    assert_eq!(outs[0], input);
}

#[test]
fn concrete_xor_scenario() {
    let mut rng = rng(0xa5);
    let matrix = CoefficientMatrix::from_rows(&[[1u8, 1]]).unwrap();
    let ab = random_shards(&mut rng, 2, 32);
    let mut outs = vec![vec![0u8; 32]];

    mul_slices(&matrix, &ab, &mut outs, 0, 32, false).unwrap();
    let expected: Vec<u8> = ab[0].iter().zip(&ab[1]).map(|(a, b)| a ^ b).collect();
    assert_eq!(outs[0], expected);
}

#[test]
fn parallel_split_matches_reference() {
    let mut rng = rng(0x9a9a);
    let matrix = random_matrix(&mut rng, 8, 4);
    let ins = random_shards(&mut rng, 8, 10_000);
    let prior = random_shards(&mut rng, 4, 10_000);
    let expected = reference(&matrix, &ins, &prior, 5, 9_999, true);

    let kernel = MulKernel::new(&matrix).unwrap();
    let config = KernelConfig::new(4, true).with_min_split_bytes(512);
    let mut outs = prior.clone();
    let processed = kernel
        .par_mul_slices(&ins, &mut outs, 5, 9_999, true, &config)
        .unwrap();

    assert_eq!(processed, 9_984);
    assert_eq!(outs, expected);
}
