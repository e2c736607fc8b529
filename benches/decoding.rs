use ax25aprs::address::{Address, Path};
use ax25aprs::aprs::{self, AprsPayload};
use ax25aprs::frame::{Frame, ModuloSelect, UnnumberedFrame, PID_NO_LAYER3};
use ax25aprs::header::FrameHeader;
use criterion::{criterion_group, criterion_main, Criterion};

fn sample_ui_frame() -> Vec<u8> {
    let header = FrameHeader::new(
        Address::new("APRS", 0).unwrap(),
        Address::new("WB2OSZ", 7).unwrap(),
        Path::new(vec![Address::new("WIDE1", 1).unwrap(), Address::new("WIDE2", 2).unwrap()]).unwrap(),
    );
    let frame = Frame::Unnumbered(UnnumberedFrame::Ui {
        header,
        pf: false,
        pid: PID_NO_LAYER3,
        payload: b"!4930.00N/07245.00W-Test run".to_vec(),
    });
    frame.encode()
}

fn b_decode_frame() {
    let wire = sample_ui_frame();
    let frame = Frame::decode(&wire, ModuloSelect::Auto).unwrap();
    match frame {
        Frame::Unnumbered(UnnumberedFrame::Ui { payload, .. }) => {
            let decoded = aprs::decode(&payload, None).unwrap();
            assert!(matches!(decoded, AprsPayload::PositionNoTimestamp(_)));
        }
        other => panic!("unexpected frame shape: {other:?}"),
    }
}

fn b_compressed_position_round_trip() {
    use ax25aprs::aprs::position::{CompressedExtra, CompressedPosition};

    let pos = CompressedPosition::from_lat_lon(35.5, -120.25, '/', '>', CompressedExtra::None);
    let bytes = pos.encode();
    let back = CompressedPosition::decode(&bytes).unwrap();
    assert!((back.lat() - pos.lat()).abs() < 0.01);
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("decode_ui_frame", |b| b.iter(b_decode_frame));
    c.bench_function("compressed_position_round_trip", |b| b.iter(b_compressed_position_round_trip));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
