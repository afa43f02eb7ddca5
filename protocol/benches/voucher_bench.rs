// Voucher hashing, signing and verification benchmarks.
//
// The payee verifies every voucher it receives, so verification cost is
// what bounds how fast a channel can stream payments.

use alloy_primitives::U256;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use paychan_protocol::crypto::{voucher_hash, ChannelKeypair};
use paychan_protocol::voucher::{
    channel_id_for, sign_voucher, verify_voucher, verify_voucher_from, AddressIdResolver,
    PaymentVoucher,
};

fn setup() -> (ChannelKeypair, String) {
    let keypair = ChannelKeypair::generate();
    let channel = ChannelKeypair::generate().address();
    (keypair, channel_id_for(&channel))
}

fn bench_voucher_hash(c: &mut Criterion) {
    let channel = ChannelKeypair::generate().address();
    let value = U256::from(1_500_000u64);

    c.bench_function("voucher/hash", |b| {
        b.iter(|| voucher_hash(&channel, &value));
    });
}

fn bench_sign(c: &mut Criterion) {
    let (keypair, id) = setup();

    c.bench_function("voucher/sign", |b| {
        b.iter(|| sign_voucher(&AddressIdResolver, &id, U256::from(1_000u64), &keypair).unwrap());
    });
}

fn bench_verify(c: &mut Criterion) {
    let (keypair, id) = setup();
    let voucher = sign_voucher(&AddressIdResolver, &id, U256::from(1_000u64), &keypair).unwrap();
    let payer = keypair.address();

    c.bench_function("voucher/verify", |b| {
        b.iter(|| verify_voucher(&AddressIdResolver, &voucher).unwrap());
    });
    c.bench_function("voucher/verify_from_payer", |b| {
        b.iter(|| verify_voucher_from(&AddressIdResolver, &voucher, &payer).unwrap());
    });
}

fn bench_codec(c: &mut Criterion) {
    let (keypair, id) = setup();
    let voucher = sign_voucher(&AddressIdResolver, &id, U256::MAX, &keypair).unwrap();
    let bytes = voucher.encode().unwrap();

    c.bench_function("voucher/encode", |b| {
        b.iter(|| voucher.encode().unwrap());
    });
    c.bench_function("voucher/decode", |b| {
        b.iter(|| PaymentVoucher::decode(&bytes).unwrap());
    });
}

fn bench_verify_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("voucher/verify_stream");
    let (keypair, id) = setup();

    for count in [10usize, 100, 1000] {
        let vouchers: Vec<PaymentVoucher> = (1..=count as u64)
            .map(|v| sign_voucher(&AddressIdResolver, &id, U256::from(v * 100), &keypair).unwrap())
            .collect();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &vouchers, |b, vouchers| {
            b.iter(|| {
                vouchers
                    .iter()
                    .all(|v| verify_voucher(&AddressIdResolver, v).unwrap())
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_voucher_hash,
    bench_sign,
    bench_verify,
    bench_codec,
    bench_verify_stream,
);
criterion_main!(benches);
