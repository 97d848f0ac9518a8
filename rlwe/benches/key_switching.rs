use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rns::poly::PolyRNS;
use rlwe::key_generator::KeyGenerator;
use rlwe::key_switching::KeySwitcher;
use rlwe::keys::SecretKey;
use rlwe::parameters::{test_parameters_pn15, Parameters};
use sampling::source::Source;

fn switch_key(c: &mut Criterion) {
    fn runner(params: Parameters) -> Box<dyn FnMut()> {
        let mut kgen: KeyGenerator = KeyGenerator::new(&params);
        let mut ksw: KeySwitcher = KeySwitcher::new(&params);

        let sk_in: SecretKey = kgen.gen_secret_key();
        let sk_out: SecretKey = kgen.gen_secret_key();
        let [swk0, swk1] = kgen.gen_switching_key(&sk_in, &sk_out);

        let ring_q = params.ring_q();
        let mut source: Source = Source::new([0; 32]);
        let mut a: PolyRNS<u64> = ring_q.new_polyrns();
        ring_q.fill_uniform(&mut source, &mut a);

        let mut c0: PolyRNS<u64> = ring_q.new_polyrns();
        let mut c1: PolyRNS<u64> = ring_q.new_polyrns();

        let level: usize = params.max_level();
        Box::new(move || {
            ksw.switch_key(level, &a, &swk0, &swk1, &mut c0, &mut c1);
        })
    }

    let mut group = c.benchmark_group("switch_key");
    group.sample_size(10);
    let params: Parameters = Parameters::from_literal(test_parameters_pn15());
    let n: usize = params.n();
    let id = BenchmarkId::new("pn15", n);
    let mut f = runner(params);
    group.bench_with_input(id, &(), |b, _| b.iter(&mut f));
    group.finish();
}

criterion_group!(benches, switch_key);
criterion_main!(benches);
