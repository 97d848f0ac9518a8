use itertools::izip;
use num_bigint::BigInt;
use rns::bigint::Div;
use rns::poly::{Poly, PolyRNS};
use rns::ring::{RingRNS, RingType};
use sampling::source::Source;

#[test]
fn rescaling_u64() {
    let n: usize = 1 << 10;
    let moduli: Vec<u64> = vec![0xffff00001, 0xfff9c0001, 0xfff8e0001, 0xfff840001];
    let ring_rns: RingRNS<u64> = RingRNS::new(n, moduli, RingType::Standard);

    sub_test("test_div_by_last_modulus::<ROUND=false, NTT=false>", || {
        test_div_by_last_modulus::<false, false>(&ring_rns)
    });
    sub_test("test_div_by_last_modulus::<ROUND=false, NTT=true>", || {
        test_div_by_last_modulus::<false, true>(&ring_rns)
    });
    sub_test("test_div_by_last_modulus::<ROUND=true, NTT=false>", || {
        test_div_by_last_modulus::<true, false>(&ring_rns)
    });
    sub_test("test_div_by_last_modulus::<ROUND=true, NTT=true>", || {
        test_div_by_last_modulus::<true, true>(&ring_rns)
    });
    sub_test(
        "test_div_by_last_modulus_inplace::<ROUND=false, NTT=false>",
        || test_div_by_last_modulus_inplace::<false, false>(&ring_rns),
    );
    sub_test(
        "test_div_by_last_modulus_inplace::<ROUND=true, NTT=false>",
        || test_div_by_last_modulus_inplace::<true, false>(&ring_rns),
    );
    sub_test(
        "test_div_by_last_moduli_inplace::<ROUND=true, NTT=true>",
        || test_div_by_last_moduli_inplace::<true, true>(&ring_rns),
    );
}

fn sub_test<F: FnOnce()>(name: &str, f: F) {
    println!("Running {}", name);
    f();
}

fn reference_division<const ROUND: bool>(
    ring_rns: &RingRNS<u64>,
    a: &PolyRNS<u64>,
    nb_moduli: usize,
) -> Vec<BigInt> {
    let mut coeffs: Vec<BigInt> = vec![BigInt::default(); a.n()];
    ring_rns.to_bigint_inplace(a, &mut coeffs);

    let mut scalar_big: BigInt = BigInt::from(1);
    (0..nb_moduli).for_each(|i| {
        scalar_big *= BigInt::from(ring_rns.0[ring_rns.level() - i].modulus.q)
    });

    coeffs
        .iter()
        .map(|c| {
            if ROUND {
                c.div_round(&scalar_big)
            } else {
                c.div_floor(&scalar_big)
            }
        })
        .collect()
}

fn test_div_by_last_modulus<const ROUND: bool, const NTT: bool>(ring_rns: &RingRNS<u64>) {
    let mut source: Source = Source::new([0; 32]);

    let mut a: PolyRNS<u64> = ring_rns.new_polyrns();
    let mut buf: [Poly<u64>; 2] = [ring_rns.new_poly(), ring_rns.new_poly()];
    let mut c: PolyRNS<u64> = ring_rns.at_level(ring_rns.level() - 1).new_polyrns();

    ring_rns.fill_uniform(&mut source, &mut a);
    let expect: Vec<BigInt> = reference_division::<ROUND>(ring_rns, &a, 1);

    if NTT {
        ring_rns.ntt_inplace::<false>(&mut a);
    }

    ring_rns.div_by_last_modulus::<ROUND, NTT>(&a, &mut buf, &mut c);

    let ring_low: RingRNS<u64> = ring_rns.at_level(ring_rns.level() - 1);
    if NTT {
        ring_low.intt_inplace::<false>(&mut c);
    }

    let mut coeffs_c: Vec<BigInt> = vec![BigInt::default(); c.n()];
    ring_low.to_bigint_inplace(&c, &mut coeffs_c);

    izip!(expect, coeffs_c).for_each(|(a, b)| assert_eq!(a, b));
}

fn test_div_by_last_modulus_inplace<const ROUND: bool, const NTT: bool>(ring_rns: &RingRNS<u64>) {
    let mut source: Source = Source::new([1; 32]);

    let mut a: PolyRNS<u64> = ring_rns.new_polyrns();
    let mut buf: [Poly<u64>; 2] = [ring_rns.new_poly(), ring_rns.new_poly()];

    ring_rns.fill_uniform(&mut source, &mut a);
    let expect: Vec<BigInt> = reference_division::<ROUND>(ring_rns, &a, 1);

    if NTT {
        ring_rns.ntt_inplace::<false>(&mut a);
    }

    ring_rns.div_by_last_modulus_inplace::<ROUND, NTT>(&mut buf, &mut a);
    a.truncate_level(ring_rns.level() - 1);

    let ring_low: RingRNS<u64> = ring_rns.at_level(ring_rns.level() - 1);
    if NTT {
        ring_low.intt_inplace::<false>(&mut a);
    }

    let mut coeffs_a: Vec<BigInt> = vec![BigInt::default(); a.n()];
    ring_low.to_bigint_inplace(&a, &mut coeffs_a);

    izip!(expect, coeffs_a).for_each(|(a, b)| assert_eq!(a, b));
}

fn test_div_by_last_moduli_inplace<const ROUND: bool, const NTT: bool>(ring_rns: &RingRNS<u64>) {
    let mut source: Source = Source::new([2; 32]);

    let nb_moduli: usize = 2;

    let mut a: PolyRNS<u64> = ring_rns.new_polyrns();
    let mut buf: [Poly<u64>; 2] = [ring_rns.new_poly(), ring_rns.new_poly()];

    ring_rns.fill_uniform(&mut source, &mut a);
    let expect: Vec<BigInt> = reference_division::<ROUND>(ring_rns, &a, nb_moduli);

    if NTT {
        ring_rns.ntt_inplace::<false>(&mut a);
    }

    ring_rns.div_by_last_moduli_inplace::<ROUND, NTT>(nb_moduli, &mut buf, &mut a);

    let ring_low: RingRNS<u64> = ring_rns.at_level(ring_rns.level() - nb_moduli);
    if NTT {
        ring_low.intt_inplace::<false>(&mut a);
    }

    let mut coeffs_a: Vec<BigInt> = vec![BigInt::default(); a.n()];
    ring_low.to_bigint_inplace(&a, &mut coeffs_a);

    izip!(expect, coeffs_a).for_each(|(a, b)| assert_eq!(a, b));
}
