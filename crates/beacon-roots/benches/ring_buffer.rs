use beacon_roots::{
    BeaconRootsContract,
    CallContext,
    ContractStorage,
    Word,
    constants::SYSTEM_ADDRESS,
    primitives::{
        Address,
        Bytes,
    },
    run_json,
};
use criterion::{
    BenchmarkId,
    Criterion,
    Throughput,
    black_box,
    criterion_group,
    criterion_main,
};

const MODULUS: u64 = BeaconRootsContract::HISTORICAL_ROOTS_MODULUS;

/// Storage with the first `buckets` buckets recorded.
fn filled_storage(buckets: u64) -> ContractStorage {
    let mut storage = ContractStorage::new();
    for ts in 1..=buckets {
        let mut ctx = CallContext::new(
            SYSTEM_ADDRESS,
            Bytes::copy_from_slice(&Word::from(ts).to_be_bytes()),
            ts,
            &mut storage,
        );
        let _ = BeaconRootsContract::execute(&mut ctx);
    }
    storage
}

fn bench_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("record");
    group.throughput(Throughput::Elements(1));

    for buckets in [0, 1_024, MODULUS] {
        group.bench_with_input(BenchmarkId::from_parameter(buckets), &buckets, |b, &buckets| {
            let mut storage = filled_storage(buckets);
            let root = Bytes::from(vec![0x11u8; 32]);
            let mut ts = 0u64;
            b.iter(|| {
                ts += 1;
                let mut ctx = CallContext::new(SYSTEM_ADDRESS, root.clone(), ts, &mut storage);
                black_box(BeaconRootsContract::execute(&mut ctx))
            });
        });
    }

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    group.throughput(Throughput::Elements(1));

    let mut storage = filled_storage(MODULUS);
    let caller = Address::with_last_byte(1);
    let hit = Bytes::copy_from_slice(&Word::from(MODULUS / 2).to_be_bytes());
    let miss = Bytes::copy_from_slice(&Word::from(MODULUS * 3 + 7).to_be_bytes());
    let short = Bytes::from(vec![0u8; 31]);

    for (name, calldata) in [("hit", hit), ("miss", miss), ("bad_length", short)] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut ctx = CallContext::new(caller, calldata.clone(), 0u64, &mut storage);
                black_box(BeaconRootsContract::execute(&mut ctx))
            });
        });
    }

    group.finish();
}

fn bench_harness(c: &mut Criterion) {
    let input = format!(
        r#"{{"caller": "0x1", "calldata": "0x{}", "timestamp": 0, "storage": {{"0x5": "0x5", "0x18005": "0x11"}}}}"#,
        hex::encode(Word::from(5).to_be_bytes())
    );

    c.bench_function("harness/run_json", |b| {
        b.iter(|| black_box(run_json(black_box(&input))))
    });
}

criterion_group!(benches, bench_record, bench_query, bench_harness);
criterion_main!(benches);
