use ckks::decryptor::Decryptor;
use ckks::elements::{Ciphertext, Message};
use ckks::encryptor::Encryptor;
use ckks::errors::Error;
use ckks::evaluator::Evaluator;
use ckks::parameters::{
    test_parameters_pn12_ci_ckks, test_parameters_pn15_ckks, test_parameters_small_ckks,
    Parameters,
};
use num_complex::Complex64;
use rlwe::key_generator::KeyGenerator;
use rlwe::keys::{PublicKey, RelinearizationKey, RotationKeySet, SecretKey};
use sampling::source::Source;

struct TestContext {
    params: Parameters,
    sk: SecretKey,
    rlk: RelinearizationKey,
    enc: Encryptor,
    dec: Decryptor,
    eval: Evaluator,
    kgen: KeyGenerator,
}

fn gen_test_context(params: Parameters) -> TestContext {
    let mut kgen: KeyGenerator = KeyGenerator::new(params.rlwe());
    let sk: SecretKey = kgen.gen_secret_key();
    let pk: PublicKey = kgen.gen_public_key(&sk);
    let rlk: RelinearizationKey = kgen.gen_relinearization_key(&sk);
    let enc: Encryptor = Encryptor::new(&params, &pk);
    let dec: Decryptor = Decryptor::new(&params, &sk);
    let eval: Evaluator = Evaluator::new(&params);
    TestContext {
        params: params,
        sk: sk,
        rlk: rlk,
        enc: enc,
        dec: dec,
        eval: eval,
        kgen: kgen,
    }
}

fn new_test_message(params: &Parameters, source: &mut Source) -> Message {
    let mut msg: Message = Message::new(params);
    for v in msg.values.iter_mut() {
        *v = Complex64::new(source.next_f64(-0.5, 0.5), source.next_f64(-0.5, 0.5));
    }
    msg
}

fn log2_slot_error_bound(params: &Parameters, slack: i32) -> f64 {
    params.log_slots() as f64 - params.default_scale().log2() + slack as f64
}

fn assert_slots_close(expect: &[Complex64], got: &[Complex64], log2_bound: f64) {
    for (i, (a, b)) in expect.iter().zip(got.iter()).enumerate() {
        let d: Complex64 = a - b;
        assert!(
            d.re.abs().log2() <= log2_bound && d.im.abs().log2() <= log2_bound,
            "slot {}: |delta| = ({:e}, {:e}) above 2^{}",
            i,
            d.re,
            d.im,
            log2_bound
        );
    }
}

fn sub_test<F: FnOnce()>(name: &str, f: F) {
    println!("Running {}", name);
    f();
}

#[test]
fn ckks_small() {
    let ctx: TestContext = gen_test_context(test_parameters_small_ckks());
    run_suite(ctx);
}

#[test]
#[ignore]
fn ckks_pn15() {
    let ctx: TestContext = gen_test_context(test_parameters_pn15_ckks());
    run_suite(ctx);
}

fn run_suite(mut ctx: TestContext) {
    sub_test("test_encrypt_decrypt", || test_encrypt_decrypt(&mut ctx));
    sub_test("test_add", || test_add(&mut ctx));
    sub_test("test_mul_relin", || test_mul_relin(&mut ctx));
    sub_test("test_mul_relin_square", || test_mul_relin_square(&mut ctx));
    sub_test("test_rescale", || test_rescale(&mut ctx));
    sub_test("test_rotate", || test_rotate(&mut ctx));
    sub_test("test_conjugate", || test_conjugate(&mut ctx));
    sub_test("test_mul_by_const", || test_mul_by_const(&mut ctx));
    sub_test("test_recoverable_errors", || test_recoverable_errors(&mut ctx));
}

fn test_encrypt_decrypt(ctx: &mut TestContext) {
    let mut source: Source = Source::new([11; 32]);
    let msg: Message = new_test_message(&ctx.params, &mut source);
    let ct: Ciphertext = ctx.enc.encrypt_msg_new(&msg);
    let out: Message = ctx.dec.decrypt_to_msg_new(&ct);
    assert_slots_close(
        &msg.values,
        &out.values,
        log2_slot_error_bound(&ctx.params, 9),
    );
}

fn test_add(ctx: &mut TestContext) {
    let mut source: Source = Source::new([12; 32]);
    let msg_1: Message = new_test_message(&ctx.params, &mut source);
    let msg_2: Message = new_test_message(&ctx.params, &mut source);

    let ct_1: Ciphertext = ctx.enc.encrypt_msg_new(&msg_1);
    let ct_2: Ciphertext = ctx.enc.encrypt_msg_new(&msg_2);

    let mut ct_out: Ciphertext = Ciphertext::new(
        &ctx.params,
        1,
        ctx.params.max_level(),
        ctx.params.default_scale(),
    );
    ctx.eval.add(&ct_1, &ct_2, &mut ct_out);

    let expect: Vec<Complex64> = msg_1
        .values
        .iter()
        .zip(msg_2.values.iter())
        .map(|(a, b)| a + b)
        .collect();

    let out: Message = ctx.dec.decrypt_to_msg_new(&ct_out);
    assert_slots_close(&expect, &out.values, log2_slot_error_bound(&ctx.params, 9));
}

fn test_mul_relin(ctx: &mut TestContext) {
    let mut source: Source = Source::new([13; 32]);
    let msg_1: Message = new_test_message(&ctx.params, &mut source);
    let msg_2: Message = new_test_message(&ctx.params, &mut source);

    let ct_1: Ciphertext = ctx.enc.encrypt_msg_new(&msg_1);
    let ct_2: Ciphertext = ctx.enc.encrypt_msg_new(&msg_2);

    let mut ct_out: Ciphertext = Ciphertext::new(
        &ctx.params,
        1,
        ctx.params.max_level(),
        ctx.params.default_scale(),
    );
    ctx.eval.mul_relin(&ct_1, &ct_2, &ctx.rlk, &mut ct_out);
    assert_eq!(ct_out.degree(), 1);

    let expect: Vec<Complex64> = msg_1
        .values
        .iter()
        .zip(msg_2.values.iter())
        .map(|(a, b)| a * b)
        .collect();

    let out: Message = ctx.dec.decrypt_to_msg_new(&ct_out);
    assert_slots_close(&expect, &out.values, log2_slot_error_bound(&ctx.params, 12));
}

fn test_mul_relin_square(ctx: &mut TestContext) {
    let mut source: Source = Source::new([14; 32]);
    let msg: Message = new_test_message(&ctx.params, &mut source);
    let ct: Ciphertext = ctx.enc.encrypt_msg_new(&msg);

    let mut ct_out: Ciphertext = Ciphertext::new(
        &ctx.params,
        1,
        ctx.params.max_level(),
        ctx.params.default_scale(),
    );
    let ct_clone: Ciphertext = ct.clone();
    ctx.eval.mul_relin(&ct_clone, &ct_clone, &ctx.rlk, &mut ct_out);

    let expect: Vec<Complex64> = msg.values.iter().map(|a| a * a).collect();
    let out: Message = ctx.dec.decrypt_to_msg_new(&ct_out);
    assert_slots_close(&expect, &out.values, log2_slot_error_bound(&ctx.params, 12));
}

fn test_rescale(ctx: &mut TestContext) {
    let mut source: Source = Source::new([15; 32]);
    let msg_1: Message = new_test_message(&ctx.params, &mut source);
    let msg_2: Message = new_test_message(&ctx.params, &mut source);

    let ct_1: Ciphertext = ctx.enc.encrypt_msg_new(&msg_1);
    let ct_2: Ciphertext = ctx.enc.encrypt_msg_new(&msg_2);

    let level: usize = ctx.params.max_level();
    let mut ct_prod: Ciphertext =
        Ciphertext::new(&ctx.params, 1, level, ctx.params.default_scale());
    ctx.eval.mul_relin(&ct_1, &ct_2, &ctx.rlk, &mut ct_prod);

    let mut ct_out: Ciphertext =
        Ciphertext::new(&ctx.params, 1, level, ctx.params.default_scale());
    ctx.eval
        .rescale(&ct_prod, ctx.params.default_scale(), &mut ct_out)
        .unwrap();

    assert!(ct_out.level() < level, "rescale did not consume a level");
    let expected_levels: usize = level - ct_out.level();
    let mut expected_scale: f64 = ct_prod.scale;
    for i in 0..expected_levels {
        expected_scale /= ctx.params.rlwe().ring_q().moduli()[level - i] as f64;
    }
    assert!(
        (ct_out.scale / expected_scale - 1.0).abs() < 1e-12,
        "scale {} != expected {}",
        ct_out.scale,
        expected_scale
    );

    let expect: Vec<Complex64> = msg_1
        .values
        .iter()
        .zip(msg_2.values.iter())
        .map(|(a, b)| a * b)
        .collect();
    let out: Message = ctx.dec.decrypt_to_msg_new(&ct_out);
    assert_slots_close(&expect, &out.values, log2_slot_error_bound(&ctx.params, 12));
}

fn test_rotate(ctx: &mut TestContext) {
    let mut source: Source = Source::new([16; 32]);
    let msg: Message = new_test_message(&ctx.params, &mut source);
    let ct: Ciphertext = ctx.enc.encrypt_msg_new(&msg);

    let rtks: RotationKeySet = ctx.kgen.gen_rotation_keys(&ctx.sk, &[1, 3]);

    let slots: usize = ctx.params.slots();
    for k in [1usize, 3] {
        let mut ct_out: Ciphertext = Ciphertext::new(
            &ctx.params,
            1,
            ctx.params.max_level(),
            ctx.params.default_scale(),
        );
        ctx.eval
            .rotate(&ct, k as isize, &rtks, &mut ct_out)
            .unwrap();

        let expect: Vec<Complex64> = (0..slots)
            .map(|i| msg.values[(i + k) % slots])
            .collect();
        let out: Message = ctx.dec.decrypt_to_msg_new(&ct_out);
        assert_slots_close(&expect, &out.values, log2_slot_error_bound(&ctx.params, 9));
    }
}

fn test_conjugate(ctx: &mut TestContext) {
    if ctx.params.ring_type() != rns::ring::RingType::Standard {
        return;
    }
    let mut source: Source = Source::new([18; 32]);
    let msg: Message = new_test_message(&ctx.params, &mut source);
    let ct: Ciphertext = ctx.enc.encrypt_msg_new(&msg);

    let ck = ctx.kgen.gen_conjugation_key(&ctx.sk);
    let mut ct_out: Ciphertext = Ciphertext::new(
        &ctx.params,
        1,
        ctx.params.max_level(),
        ctx.params.default_scale(),
    );
    ctx.eval.conjugate(&ct, &ck, &mut ct_out).unwrap();

    let expect: Vec<Complex64> = msg.values.iter().map(|v| v.conj()).collect();
    let out: Message = ctx.dec.decrypt_to_msg_new(&ct_out);
    assert_slots_close(&expect, &out.values, log2_slot_error_bound(&ctx.params, 9));
}

fn test_mul_by_const(ctx: &mut TestContext) {
    let mut source: Source = Source::new([19; 32]);
    let msg: Message = new_test_message(&ctx.params, &mut source);
    let ct: Ciphertext = ctx.enc.encrypt_msg_new(&msg);

    let mut ct_out: Ciphertext = Ciphertext::new(
        &ctx.params,
        1,
        ctx.params.max_level(),
        ctx.params.default_scale(),
    );
    ctx.eval.mul_by_const(&ct, 3.0, &mut ct_out);

    let expect: Vec<Complex64> = msg.values.iter().map(|v| v * 3.0).collect();
    let out: Message = ctx.dec.decrypt_to_msg_new(&ct_out);
    assert_slots_close(&expect, &out.values, log2_slot_error_bound(&ctx.params, 11));
}

fn test_recoverable_errors(ctx: &mut TestContext) {
    let mut source: Source = Source::new([20; 32]);
    let msg: Message = new_test_message(&ctx.params, &mut source);
    let ct: Ciphertext = ctx.enc.encrypt_msg_new(&msg);

    // rescale with a non-positive target
    let mut ct_out: Ciphertext = Ciphertext::new(
        &ctx.params,
        1,
        ctx.params.max_level(),
        ctx.params.default_scale(),
    );
    match ctx.eval.rescale(&ct, 0.0, &mut ct_out) {
        Err(Error::Precision(_)) => {}
        other => panic!("expected a precision error, got {:?}", other.err()),
    }

    // rescale at level 0
    let mut ct_bottom: Ciphertext = ct.clone();
    ctx.eval.drop_level(&mut ct_bottom, ct.level());
    match ctx
        .eval
        .rescale(&ct_bottom, ctx.params.default_scale(), &mut ct_out)
    {
        Err(Error::Precision(_)) => {}
        other => panic!("expected a precision error, got {:?}", other.err()),
    }

    // rotation without the matching key
    let rtks: RotationKeySet = RotationKeySet::new();
    match ctx.eval.rotate(&ct, 1, &rtks, &mut ct_out) {
        Err(Error::MissingKey(_)) => {}
        other => panic!("expected a missing-key error, got {:?}", other.err()),
    }
}

#[test]
fn ckks_conjugate_invariant() {
    let params: Parameters = test_parameters_pn12_ci_ckks();
    let mut ctx: TestContext = gen_test_context(params);

    let mut source: Source = Source::new([22; 32]);
    let mut msg: Message = Message::new(&ctx.params);
    for v in msg.values.iter_mut() {
        *v = Complex64::new(source.next_f64(-1.0, 1.0), 0.0);
    }

    let ct: Ciphertext = ctx.enc.encrypt_msg_new(&msg);
    let out: Message = ctx.dec.decrypt_to_msg_new(&ct);

    let log2_bound: f64 = log2_slot_error_bound(&ctx.params, 8);
    for (i, (a, b)) in msg.values.iter().zip(out.values.iter()).enumerate() {
        assert!(
            (a.re - b.re).abs().log2() <= log2_bound,
            "slot {}: real error above 2^{}",
            i,
            log2_bound
        );
        assert_eq!(b.im, 0.0, "slot {}: imaginary part leaked", i);
    }
}
