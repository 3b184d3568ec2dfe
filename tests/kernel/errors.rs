//! Validation happens before any byte is written

use galmul::{mul_slices, CoefficientMatrix, KernelError, MulKernel, ShardKind};

#[test]
fn thirteen_inputs_rejected() {
    let matrix = CoefficientMatrix::new(1, 13, vec![1; 13]).unwrap();
    let inputs = vec![vec![0u8; 64]; 13];
    let mut outputs = vec![vec![0x77u8; 64]];

    assert_eq!(
        mul_slices(&matrix, &inputs, &mut outputs, 0, 64, false),
        Err(KernelError::UnsupportedShape {
            inputs: 13,
            outputs: 1
        })
    );
    assert!(outputs[0].iter().all(|&x| x == 0x77));
}

#[test]
fn eleven_outputs_rejected() {
    let matrix = CoefficientMatrix::new(11, 1, vec![1; 11]).unwrap();
    let inputs = vec![vec![0u8; 64]];
    let mut outputs = vec![vec![0u8; 64]; 11];

    assert_eq!(
        mul_slices(&matrix, &inputs, &mut outputs, 0, 64, false),
        Err(KernelError::UnsupportedShape {
            inputs: 1,
            outputs: 11
        })
    );
    assert!(MulKernel::new(&matrix).is_err());
}

#[test]
fn empty_shard_sets_rejected() {
    let matrix = CoefficientMatrix::identity(1);
    let inputs: Vec<Vec<u8>> = vec![];
    let mut outputs = vec![vec![0u8; 32]];

    assert_eq!(
        mul_slices(&matrix, &inputs, &mut outputs, 0, 32, false),
        Err(KernelError::UnsupportedShape {
            inputs: 0,
            outputs: 1
        })
    );
}

#[test]
fn short_input_reported_with_index() {
    let kernel = MulKernel::new(&CoefficientMatrix::from_rows(&[[1u8, 2, 3]]).unwrap()).unwrap();
    let inputs = vec![vec![0u8; 64], vec![0u8; 64], vec![0u8; 40]];
    let mut outputs = vec![vec![0u8; 64]];

    assert_eq!(
        kernel.mul_slices(&inputs, &mut outputs, 0, 64, false),
        Err(KernelError::ShardTooShort {
            kind: ShardKind::Input,
            index: 2,
            len: 40,
            stop: 64
        })
    );
}

#[test]
fn inverted_range_rejected() {
    let kernel = MulKernel::new(&CoefficientMatrix::identity(1)).unwrap();
    let inputs = vec![vec![0u8; 64]];
    let mut outputs = vec![vec![0u8; 64]];

    assert_eq!(
        kernel.mul_slices(&inputs, &mut outputs, 33, 32, false),
        Err(KernelError::InvalidRange {
            start: 33,
            stop: 32
        })
    );
}

#[test]
fn empty_range_is_a_no_op() {
    let kernel = MulKernel::new(&CoefficientMatrix::identity(2)).unwrap();
    let inputs = vec![vec![0xFFu8; 64]; 2];
    let mut outputs = vec![vec![0x12u8; 64]; 2];

    assert_eq!(kernel.mul_slices(&inputs, &mut outputs, 32, 32, false), Ok(0));
    assert_eq!(kernel.mul_slices(&inputs, &mut outputs, 0, 31, false), Ok(0));
    assert!(outputs.iter().flatten().all(|&x| x == 0x12));
}

#[test]
fn ragged_matrix_rejected() {
    let rows: Vec<Vec<u8>> = vec![vec![1, 2, 3], vec![4, 5]];
    assert!(matches!(
        CoefficientMatrix::from_rows(&rows),
        Err(KernelError::RaggedMatrix { row: 1, .. })
    ));
}
