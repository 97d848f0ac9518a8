use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rns::poly::Poly;
use rns::ring::{Ring, RingType};

fn ntt(c: &mut Criterion) {
    fn runner<const LAZY: bool>(ring: Ring<u64>) -> Box<dyn FnMut()> {
        let mut a: Poly<u64> = ring.new_poly();
        for i in 0..ring.n() {
            a.0[i] = i as u64;
        }
        Box::new(move || {
            ring.ntt_inplace::<LAZY>(&mut a);
        })
    }

    let mut group = c.benchmark_group("ntt_inplace");
    for log_n in 11..17 {
        let n: usize = 1 << log_n;
        let ring: Ring<u64> = Ring::<u64>::new(n, 0xffffffffffc0001, RingType::Standard);
        let mut f = runner::<false>(ring);
        group.bench_with_input(BenchmarkId::new("strict", n), &(), |b, _| b.iter(&mut f));

        let ring: Ring<u64> = Ring::<u64>::new(n, 0xffffffffffc0001, RingType::Standard);
        let mut f = runner::<true>(ring);
        group.bench_with_input(BenchmarkId::new("lazy", n), &(), |b, _| b.iter(&mut f));
    }
    group.finish();
}

fn intt(c: &mut Criterion) {
    fn runner(ring: Ring<u64>) -> Box<dyn FnMut()> {
        let mut a: Poly<u64> = ring.new_poly();
        for i in 0..ring.n() {
            a.0[i] = i as u64;
        }
        ring.ntt_inplace::<false>(&mut a);
        Box::new(move || {
            ring.intt_inplace::<false>(&mut a);
            ring.ntt_inplace::<false>(&mut a);
        })
    }

    let mut group = c.benchmark_group("intt_then_ntt");
    for log_n in 11..17 {
        let n: usize = 1 << log_n;
        let ring: Ring<u64> = Ring::<u64>::new(n, 0xffffffffffc0001, RingType::Standard);
        let mut f = runner(ring);
        group.bench_with_input(BenchmarkId::new("strict", n), &(), |b, _| b.iter(&mut f));
    }
    group.finish();
}

criterion_group!(benches, ntt, intt);
criterion_main!(benches);
