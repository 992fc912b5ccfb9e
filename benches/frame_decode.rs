//! Benchmarks for the hot decode path.
//!
//! The ingest task decodes every inbound frame on the stream; decode and
//! envelope construction both sit on the per-frame latency budget.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use dashlink::test_utils::{engine_frame, pairing_frame, speed_frame, tire_frame};
use dashlink::wire::encode_frame;
use dashlink::{TpmsDecoder, WheelId, car, tpms};
use std::hint::black_box;

fn bench_tpms_decode(c: &mut Criterion) {
    let tire = tire_frame(0, 0x25, 0x5A, 1);
    let pairing = pairing_frame(2, 1);

    let mut group = c.benchmark_group("tpms_decode");
    group.throughput(Throughput::Bytes(tire.len() as u64));

    group.bench_function("tire_reading", |b| {
        let mut decoder = TpmsDecoder::new();
        b.iter(|| {
            let events = decoder.decode(black_box(&tire)).unwrap();
            black_box(events)
        })
    });

    group.bench_function("pairing_status", |b| {
        let mut decoder = TpmsDecoder::new();
        b.iter(|| {
            let events = decoder.decode(black_box(&pairing)).unwrap();
            black_box(events)
        })
    });

    group.finish();
}

fn bench_car_state_decode(c: &mut Criterion) {
    let speed = speed_frame(122.0);
    let engine = engine_frame(4500, 90);

    c.bench_function("car_state_speed", |b| {
        b.iter(|| black_box(car::decode_car_state(black_box(&speed)).unwrap()))
    });
    c.bench_function("car_state_engine", |b| {
        b.iter(|| black_box(car::decode_car_state(black_box(&engine)).unwrap()))
    });
}

fn bench_outbound_framing(c: &mut Criterion) {
    c.bench_function("pairing_request_frame", |b| {
        b.iter(|| black_box(tpms::pairing_request(black_box(WheelId::FrontRight))))
    });

    let payload = [0x00u8, 0x30];
    c.bench_function("encode_frame", |b| {
        b.iter(|| black_box(encode_frame(black_box(0x04), black_box(&payload))))
    });
}

criterion_group!(benches, bench_tpms_decode, bench_car_state_decode, bench_outbound_framing);
criterion_main!(benches);
