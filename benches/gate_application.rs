//! Benchmarks for gate application kernels
//!
//! Compares the optimized mask-table path against the index-generator
//! path for multi-qubit gates, plus the single-qubit and reduction hot
//! loops.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use num_complex::Complex64;
use qubitvec::QubitVector;

fn hadamard() -> Vec<Complex64> {
    let h = std::f64::consts::FRAC_1_SQRT_2;
    [h, h, h, -h].iter().map(|&v| Complex64::new(v, 0.0)).collect()
}

/// Column-major two-qubit unitary (CNOT composed with phases) used as a
/// representative dense 4x4 gate
fn dense_two_qubit() -> Vec<Complex64> {
    let mut m = vec![Complex64::new(0.0, 0.0); 16];
    m[0] = Complex64::new(1.0, 0.0);
    m[3 + 4] = Complex64::new(0.0, 1.0);
    m[2 + 8] = Complex64::new(1.0, 0.0);
    m[1 + 12] = Complex64::new(0.0, -1.0);
    m
}

fn bench_single_qubit(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_qubit");
    let h = hadamard();

    for num_qubits in [12, 16, 20] {
        let size = 1usize << num_qubits;
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_qubits),
            &num_qubits,
            |b, &n| {
                let mut qv = QubitVector::new(n).unwrap();
                qv.initialize_plus();
                b.iter(|| {
                    qv.apply_matrix(black_box(&[n / 2]), black_box(&h)).unwrap();
                });
            },
        );
    }
    group.finish();
}

fn bench_two_qubit_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("two_qubit_paths");
    let mat = dense_two_qubit();
    let num_qubits = 16;

    group.bench_function("index_generator", |b| {
        let mut qv = QubitVector::new(num_qubits).unwrap();
        qv.initialize_plus();
        b.iter(|| {
            qv.apply_matrix(black_box(&[3, 9]), black_box(&mat)).unwrap();
        });
    });

    group.bench_function("mask_table", |b| {
        let mut qv = QubitVector::new(num_qubits).unwrap();
        qv.initialize_plus();
        qv.enable_gate_opt();
        b.iter(|| {
            qv.apply_matrix(black_box(&[3, 9]), black_box(&mat)).unwrap();
        });
    });

    group.finish();
}

fn bench_reductions(c: &mut Criterion) {
    let mut group = c.benchmark_group("reductions");
    let num_qubits = 18;
    let mut qv = QubitVector::new(num_qubits).unwrap();
    qv.initialize_plus();

    group.bench_function("norm", |b| {
        b.iter(|| black_box(qv.norm()));
    });

    let zz = vec![
        Complex64::new(1.0, 0.0),
        Complex64::new(-1.0, 0.0),
        Complex64::new(-1.0, 0.0),
        Complex64::new(1.0, 0.0),
    ];
    group.bench_function("expectation_zz", |b| {
        b.iter(|| black_box(qv.expectation_value(&[2, 11], &zz).unwrap()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_qubit,
    bench_two_qubit_paths,
    bench_reductions
);
criterion_main!(benches);
