use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rns::modulus::montgomery::Montgomery;
use rns::modulus::{NONE, ONCE};
use rns::poly::Poly;
use rns::ring::{Ring, RingType};

fn add_inplace(c: &mut Criterion) {
    fn runner(ring: Ring<u64>) -> Box<dyn FnMut()> {
        let mut a: Poly<u64> = ring.new_poly();
        let mut b: Poly<u64> = ring.new_poly();
        for i in 0..ring.n() {
            a.0[i] = i as u64;
            b.0[i] = i as u64;
        }
        Box::new(move || {
            ring.add_inplace::<ONCE>(&a, &mut b);
        })
    }

    let mut group = c.benchmark_group("add_inplace");
    for log_n in 11..16 {
        let n: usize = 1 << log_n;
        let ring: Ring<u64> = Ring::<u64>::new(n, 0xffffffffffc0001, RingType::Standard);
        let mut f = runner(ring);
        group.bench_with_input(BenchmarkId::new("prime", n), &(), |b, _| b.iter(&mut f));
    }
    group.finish();
}

fn mul_montgomery_external_inplace(c: &mut Criterion) {
    fn runner(ring: Ring<u64>) -> Box<dyn FnMut()> {
        let mut a: Poly<Montgomery<u64>> = ring.new_poly();
        let mut b: Poly<u64> = ring.new_poly();
        for i in 0..ring.n() {
            a.0[i] = ring.modulus.montgomery.prepare::<ONCE>(i as u64);
            b.0[i] = i as u64;
        }
        Box::new(move || {
            ring.mul_montgomery_external_inplace::<ONCE>(&a, &mut b);
        })
    }

    let mut group = c.benchmark_group("mul_montgomery_external_inplace");
    for log_n in 11..16 {
        let n: usize = 1 << log_n;
        let ring: Ring<u64> = Ring::<u64>::new(n, 0xffffffffffc0001, RingType::Standard);
        let mut f = runner(ring);
        group.bench_with_input(BenchmarkId::new("prime", n), &(), |b, _| b.iter(&mut f));
    }
    group.finish();
}

fn mul_montgomery_external_add_inplace(c: &mut Criterion) {
    fn runner(ring: Ring<u64>) -> Box<dyn FnMut()> {
        let mut a: Poly<Montgomery<u64>> = ring.new_poly();
        let b: Poly<u64> = ring.new_poly();
        let mut acc: Poly<u64> = ring.new_poly();
        for i in 0..ring.n() {
            a.0[i] = ring.modulus.montgomery.prepare::<ONCE>(i as u64);
        }
        Box::new(move || {
            ring.mul_montgomery_external_add_inplace::<NONE, NONE>(&a, &b, &mut acc);
        })
    }

    let mut group = c.benchmark_group("mul_montgomery_external_add_inplace");
    for log_n in 11..16 {
        let n: usize = 1 << log_n;
        let ring: Ring<u64> = Ring::<u64>::new(n, 0xffffffffffc0001, RingType::Standard);
        let mut f = runner(ring);
        group.bench_with_input(BenchmarkId::new("lazy", n), &(), |b, _| b.iter(&mut f));
    }
    group.finish();
}

criterion_group!(
    benches,
    add_inplace,
    mul_montgomery_external_inplace,
    mul_montgomery_external_add_inplace,
);
criterion_main!(benches);
