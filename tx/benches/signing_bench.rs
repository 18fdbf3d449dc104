// Signing & verification benchmarks for the Vela transaction library.
//
// Covers keypair generation, transaction signing (RFC 6979 ECDSA over the
// chain-id-protected hash), sender recovery, and the wire codec at various
// payload sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use vela_tx::crypto::keys::VelaKeypair;
use vela_tx::transaction::{sign_transaction, Transaction, TransactionBuilder};

fn unsigned_tx(data: Vec<u8>) -> Transaction {
    TransactionBuilder::new()
        .nonce(42u64)
        .gas_price(25_000_000_000u64)
        .gas_limit(500_000u64)
        .to("0x1234567890123456789012345678901234567890")
        .value(1_000_000u64)
        .data(data)
        .chain_id(101)
        .build()
        .expect("well-formed fields")
}

fn bench_keypair_generation(c: &mut Criterion) {
    c.bench_function("secp256k1/keypair_generate", |b| {
        b.iter(VelaKeypair::generate);
    });
}

fn bench_sign_transaction(c: &mut Criterion) {
    let keypair = VelaKeypair::generate();

    c.bench_function("secp256k1/sign_transaction", |b| {
        b.iter(|| {
            let mut tx = unsigned_tx(vec![0xC0, 0xDE]);
            sign_transaction(&mut tx, &keypair).unwrap()
        });
    });
}

fn bench_recover_sender(c: &mut Criterion) {
    let keypair = VelaKeypair::generate();
    let mut tx = unsigned_tx(vec![0xC0, 0xDE]);
    let payload = sign_transaction(&mut tx, &keypair).unwrap();

    c.bench_function("secp256k1/recover_sender", |b| {
        b.iter(|| {
            // Decode fresh each iteration so recovery is not served from
            // the memoization cache.
            let decoded = Transaction::decode(&payload).unwrap();
            decoded.sender_address().unwrap()
        });
    });
}

fn bench_codec_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec/roundtrip");

    for size in [0usize, 128, 1024, 16 * 1024] {
        let tx = unsigned_tx(vec![0xAB; size]);
        let encoded = tx.encode();

        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &encoded, |b, encoded| {
            b.iter(|| Transaction::decode(encoded).unwrap());
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let keypair = VelaKeypair::generate();
    let mut tx = unsigned_tx(vec![0u8; 64]);
    sign_transaction(&mut tx, &keypair).unwrap();

    c.bench_function("validate/signed_tx", |b| {
        b.iter(|| {
            // Clone to defeat the sender cache; validation cost is
            // dominated by recovery, and that's the number we want.
            tx.clone().validate()
        });
    });
}

criterion_group!(
    benches,
    bench_keypair_generation,
    bench_sign_transaction,
    bench_recover_sender,
    bench_codec_roundtrip,
    bench_validate,
);
criterion_main!(benches);
