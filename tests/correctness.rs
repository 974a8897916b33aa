use quadmul::logging::init_test_subscriber;
use quadmul::matrix::dense::{identity, matmul_reference};
use quadmul::{
    BaseKernel, Layout, MatmulError, QuadMatrix, RecursiveEngine, Scheduler, multiply,
    multiply_parallel,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn assert_matrices_equal(expected: &[f64], actual: &[f64], name: &str) {
    assert_eq!(expected.len(), actual.len(), "{}: length mismatch", name);
    for i in 0..expected.len() {
        let tolerance = 1e-9 * expected[i].abs().max(1.0);
        assert!(
            (expected[i] - actual[i]).abs() < tolerance,
            "{}: mismatch at index {}: expected {}, got {}",
            name,
            i,
            expected[i],
            actual[i]
        );
    }
}

fn random_pair(n: usize, block: usize, seed: u64) -> (QuadMatrix, QuadMatrix) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut a = QuadMatrix::new(n, block).unwrap();
    let mut b = QuadMatrix::new(n, block).unwrap();
    a.fill_random(&mut rng);
    b.fill_random(&mut rng);
    (a, b)
}

fn reference(a: &QuadMatrix, b: &QuadMatrix) -> Vec<f64> {
    let n = a.size();
    let mut c = vec![0.0; n * n];
    matmul_reference(&a.to_dense(), &b.to_dense(), &mut c, n);
    c
}

fn recursive(a: &QuadMatrix, b: &QuadMatrix, block: usize, kernel: BaseKernel, threads: usize) -> Vec<f64> {
    let engine = RecursiveEngine::new(block, kernel).unwrap();
    let scheduler = Scheduler::new(Some(threads)).unwrap();
    let mut c = engine.allocate(a.size()).unwrap();
    scheduler
        .install(|| engine.multiply(a, b, &mut c))
        .unwrap();
    c.to_dense()
}

// ============================================================
// Fixed scenarios
// ============================================================

#[test]
fn test_identity_without_recursion() {
    let values: Vec<f64> = (1..=16).map(f64::from).collect();
    let a = QuadMatrix::from_dense(4, 4, &values).unwrap();
    let b = QuadMatrix::from_dense(4, 4, &identity(4)).unwrap();
    assert!(a.is_leaf());

    let c = recursive(&a, &b, 4, BaseKernel::Scalar, 2);
    assert_eq!(c, values);
}

#[test]
fn test_identity_one_level() {
    let values: Vec<f64> = (1..=16).map(f64::from).collect();
    let a = QuadMatrix::from_dense(4, 2, &values).unwrap();
    let b = QuadMatrix::from_dense(4, 2, &identity(4)).unwrap();
    assert_eq!(a.layout().depth(), 1);

    let c = recursive(&a, &b, 2, BaseKernel::Scalar, 2);
    assert_eq!(c, values);
}

#[test]
fn test_identity_on_the_left() {
    let values: Vec<f64> = (1..=64).map(f64::from).collect();
    let a = QuadMatrix::from_dense(8, 2, &identity(8)).unwrap();
    let b = QuadMatrix::from_dense(8, 2, &values).unwrap();

    for kernel in [BaseKernel::Scalar, BaseKernel::Blocked, BaseKernel::Simd] {
        let c = recursive(&a, &b, 2, kernel, 4);
        assert_eq!(c, values, "{}", kernel);
    }
}

#[test]
fn test_small_integer_product() {
    // [[1,2],[3,4]] * [[5,6],[7,8]]
    let a = QuadMatrix::from_dense(2, 1, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    let b = QuadMatrix::from_dense(2, 1, &[5.0, 6.0, 7.0, 8.0]).unwrap();

    let c = recursive(&a, &b, 1, BaseKernel::Scalar, 2);
    assert_eq!(c, vec![19.0, 22.0, 43.0, 50.0]);
}

// ============================================================
// Recursion termination boundaries
// ============================================================

#[test]
fn test_size_equals_block() {
    for n in [1, 2, 8, 32] {
        let (a, b) = random_pair(n, n, n as u64);
        let c = recursive(&a, &b, n, BaseKernel::Scalar, 2);
        assert_matrices_equal(&reference(&a, &b), &c, &format!("n_eq_block_{}", n));
    }
}

#[test]
fn test_size_twice_block() {
    for block in [1, 4, 16] {
        let n = 2 * block;
        let (a, b) = random_pair(n, block, block as u64);
        assert_eq!(a.layout().depth(), 1);
        let c = recursive(&a, &b, block, BaseKernel::Scalar, 2);
        assert_matrices_equal(&reference(&a, &b), &c, &format!("n_2x_block_{}", block));
    }
}

#[test]
fn test_block_larger_than_size() {
    let (a, b) = random_pair(16, 100, 3);
    assert!(a.is_leaf());
    let c = recursive(&a, &b, 100, BaseKernel::Blocked, 2);
    assert_matrices_equal(&reference(&a, &b), &c, "block_gt_n");
}

// ============================================================
// Against the triple loop
// ============================================================

#[test]
fn test_matches_reference_across_blocks() {
    let n = 64;
    for block in [1, 2, 4, 8, 16, 32, 64] {
        let (a, b) = random_pair(n, block, 11);
        let c = recursive(&a, &b, block, BaseKernel::Scalar, 4);
        assert_matrices_equal(&reference(&a, &b), &c, &format!("block_{}", block));
    }
}

#[test]
fn test_every_kernel_matches_reference() {
    // 12 exercises the SIMD leftover rows/columns, 16 the full tiles
    for (n, block) in [(48, 12), (64, 16), (128, 32), (40, 5)] {
        let (a, b) = random_pair(n, block, 29);
        let expected = reference(&a, &b);
        for kernel in [
            BaseKernel::Scalar,
            BaseKernel::Blocked,
            BaseKernel::Simd,
            BaseKernel::Auto,
        ] {
            let c = recursive(&a, &b, block, kernel, 4);
            assert_matrices_equal(&expected, &c, &format!("{}_n{}_b{}", kernel, n, block));
        }
    }
}

#[test]
fn test_non_power_of_two_size() {
    // 24 -> 12 -> 6 -> 3
    let (a, b) = random_pair(24, 3, 5);
    assert_eq!(a.layout().leaf(), 3);
    let c = recursive(&a, &b, 3, BaseKernel::Scalar, 3);
    assert_matrices_equal(&reference(&a, &b), &c, "n24_b3");
}

#[test]
fn test_caller_supplied_scratch() {
    let (a, b) = random_pair(32, 4, 8);
    let engine = RecursiveEngine::new(4, BaseKernel::Scalar).unwrap();
    let mut c = engine.allocate(32).unwrap();
    let mut d = engine.allocate(32).unwrap();
    d.set(0, 0, 123.0);

    engine.multiply_with_scratch(&a, &b, &mut c, &mut d).unwrap();
    assert_matrices_equal(&reference(&a, &b), &c.to_dense(), "scratch");
}

#[test]
fn test_result_is_overwritten_not_accumulated() {
    let (a, b) = random_pair(16, 4, 13);
    let engine = RecursiveEngine::new(4, BaseKernel::Scalar).unwrap();
    let mut c = engine.allocate(16).unwrap();
    for i in 0..16 {
        for j in 0..16 {
            c.set(i, j, 5.0);
        }
    }

    engine.multiply(&a, &b, &mut c).unwrap();
    assert_matrices_equal(&reference(&a, &b), &c.to_dense(), "overwrite");
}

// ============================================================
// Concurrency insensitivity
// ============================================================

#[test]
fn test_thread_count_does_not_change_result() {
    let (a, b) = random_pair(128, 8, 17);
    let single = recursive(&a, &b, 8, BaseKernel::Scalar, 1);

    for threads in [2, 8] {
        let parallel = recursive(&a, &b, 8, BaseKernel::Scalar, threads);
        // scalar leaves and fixed-order adds: bit-identical
        assert_eq!(single, parallel, "threads = {}", threads);
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    let (a, b) = random_pair(64, 4, 19);
    let first = recursive(&a, &b, 4, BaseKernel::Scalar, 8);
    for _ in 0..3 {
        assert_eq!(first, recursive(&a, &b, 4, BaseKernel::Scalar, 8));
    }
}

// ============================================================
// Recursive add
// ============================================================

#[test]
fn test_add_is_commutative() {
    let (a, b) = random_pair(32, 4, 23);
    let engine = RecursiveEngine::new(4, BaseKernel::Auto).unwrap();
    let mut ab = engine.allocate(32).unwrap();
    let mut ba = engine.allocate(32).unwrap();

    engine.add(&a, &b, &mut ab).unwrap();
    engine.add(&b, &a, &mut ba).unwrap();
    assert_eq!(ab, ba);

    let (da, db) = (a.to_dense(), b.to_dense());
    let expected: Vec<f64> = da.iter().zip(&db).map(|(x, y)| x + y).collect();
    assert_eq!(ab.to_dense(), expected);
}

#[test]
fn test_add_on_a_single_leaf() {
    let engine = RecursiveEngine::new(8, BaseKernel::Scalar).unwrap();
    let a = QuadMatrix::from_dense(2, 8, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    let mut c = engine.allocate(2).unwrap();
    engine.add(&a, &a, &mut c).unwrap();
    assert_eq!(c.to_dense(), vec![2.0, 4.0, 6.0, 8.0]);
}

// ============================================================
// Invalid input
// ============================================================

#[test]
fn test_layout_mismatch_is_rejected() {
    let engine = RecursiveEngine::new(4, BaseKernel::Scalar).unwrap();
    let a = QuadMatrix::new(16, 4).unwrap();
    let b = QuadMatrix::new(16, 2).unwrap();
    let mut c = engine.allocate(16).unwrap();

    match engine.multiply(&a, &b, &mut c) {
        Err(MatmulError::LayoutMismatch {
            operand,
            expected,
            found,
        }) => {
            assert_eq!(operand, "B");
            assert_eq!(expected, Layout::new(16, 4).unwrap());
            assert_eq!(found, Layout::new(16, 2).unwrap());
        }
        other => panic!("expected LayoutMismatch, got {:?}", other),
    }
}

#[test]
fn test_size_mismatch_is_rejected() {
    let engine = RecursiveEngine::new(4, BaseKernel::Scalar).unwrap();
    let a = engine.allocate(16).unwrap();
    let b = engine.allocate(16).unwrap();
    let mut c = engine.allocate(8).unwrap();
    assert!(matches!(
        engine.add(&a, &b, &mut c),
        Err(MatmulError::LayoutMismatch { operand: "C", .. })
    ));
}

#[test]
fn test_malformed_subtree_fails_through_both_joins() {
    let engine = RecursiveEngine::new(2, BaseKernel::Scalar).unwrap();
    let (mut a, b) = random_pair(8, 2, 5);
    let mut c = engine.allocate(8).unwrap();

    // A22's bottom-right leaf replaced by a 2x2 split into 1x1 leaves. The
    // top-level check only follows the first quadrant, so this passes it and
    // surfaces inside the depth-1 product cohort.
    let a22 = &mut a.quadrants_mut().unwrap()[3];
    a22.quadrants_mut().unwrap()[3] = QuadMatrix::new(2, 1).unwrap();
    assert_eq!(a.layout(), Layout::new(8, 2).unwrap());

    match engine.multiply(&a, &b, &mut c) {
        Err(MatmulError::LayoutMismatch {
            operand,
            expected,
            found,
        }) => {
            assert_eq!(operand, "A");
            assert_eq!(expected, Layout::new(2, 2).unwrap());
            assert_eq!(found, Layout::new(2, 1).unwrap());
        }
        other => panic!("expected LayoutMismatch, got {:?}", other),
    }
}

#[test]
fn test_invalid_dimensions_are_rejected() {
    assert!(matches!(
        RecursiveEngine::new(0, BaseKernel::Scalar),
        Err(MatmulError::ZeroBlock)
    ));
    assert!(matches!(
        QuadMatrix::new(20, 4),
        Err(MatmulError::OddSplit { at: 5, .. })
    ));
    let engine = RecursiveEngine::new(4, BaseKernel::Scalar).unwrap();
    assert!(engine.allocate(0).is_err());
}

// ============================================================
// Dense slice API
// ============================================================

#[test]
fn test_dense_multiply() {
    let n = 32;
    let a: Vec<f64> = (0..n * n).map(|i| (i % 17) as f64).collect();
    let b: Vec<f64> = (0..n * n).map(|i| (i % 13) as f64).collect();

    let mut expected = vec![0.0; n * n];
    let mut c_single = vec![0.0; n * n];
    let mut c_parallel = vec![0.0; n * n];

    matmul_reference(&a, &b, &mut expected, n);
    multiply(&a, &b, &mut c_single, n, 8).unwrap();
    multiply_parallel(&a, &b, &mut c_parallel, n, 8, 4).unwrap();

    // small integers: exact in any summation order
    assert_eq!(expected, c_single);
    assert_eq!(expected, c_parallel);
}

#[test]
fn test_dense_length_is_checked() {
    let a = vec![1.0; 16];
    let b = vec![1.0; 16];
    let mut c = vec![0.0; 15];
    assert!(matches!(
        multiply(&a, &b, &mut c, 4, 2),
        Err(MatmulError::DenseLength { operand: "C", .. })
    ));
    assert!(matches!(
        multiply(&a, &b[..12], &mut vec![0.0; 16], 4, 2),
        Err(MatmulError::DenseLength { operand: "B", expected: 16, found: 12 })
    ));
    assert!(matches!(
        multiply(&[1.0; 20], &b, &mut vec![0.0; 16], 4, 2),
        Err(MatmulError::DenseLength { operand: "A", expected: 16, found: 20 })
    ));
    assert!(matches!(
        multiply_parallel(&a, &b, &mut vec![0.0; 16], 4, 2, 0),
        Err(MatmulError::ZeroThreads)
    ));
}

// ============================================================
// Logging
// ============================================================

#[test]
fn test_multiply_under_debug_subscriber() {
    let _guard = init_test_subscriber();

    let engine = RecursiveEngine::new(4, BaseKernel::Scalar).unwrap();
    let (a, b) = random_pair(16, 4, 11);
    let mut c = engine.allocate(16).unwrap();
    engine.multiply(&a, &b, &mut c).unwrap();
    assert_matrices_equal(&reference(&a, &b), &c.to_dense(), "n16_b4_logged");
}
