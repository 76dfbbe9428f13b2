//! Stdio frame codec throughput benchmark.
//!
//! Measures line framing cost for raw payloads and for the tool catalogue
//! response, the largest message the server sends unprompted.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jira_admin_mcp::mcp::codec::{read_frame, write_frame, write_json};
use jira_admin_mcp::tools::ToolCatalog;
use serde_json::json;
use std::io::Cursor;

const MAX_FRAME: usize = 4 * 1024 * 1024;

/// JSON string payload of roughly `size` bytes with no raw newline.
fn payload(size: usize) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(size + 2);
    bytes.push(b'"');
    bytes.resize(size + 1, b'x');
    bytes.push(b'"');
    bytes
}

fn bench_write_frame(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let payload_sizes: &[usize] = &[0, 64, 1024, 4096, 65536];

    let mut group = c.benchmark_group("write_frame");
    for &size in payload_sizes {
        let p = payload(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &p, |b, p| {
            b.iter(|| {
                rt.block_on(async {
                    let mut buf = Vec::with_capacity(p.len() + 1);
                    write_frame(&mut buf, black_box(p)).await.unwrap();
                    buf
                })
            });
        });
    }
    group.finish();
}

fn bench_read_frame(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let payload_sizes: &[usize] = &[0, 64, 1024, 4096, 65536];

    let mut group = c.benchmark_group("read_frame");
    for &size in payload_sizes {
        let wire = rt.block_on(async {
            let mut buf = Vec::new();
            write_frame(&mut buf, &payload(size)).await.unwrap();
            buf
        });

        group.bench_with_input(BenchmarkId::from_parameter(size), &wire, |b, w| {
            b.iter(|| {
                rt.block_on(async {
                    let mut cursor = Cursor::new(black_box(w.as_slice()));
                    read_frame(&mut cursor, MAX_FRAME).await.unwrap()
                })
            });
        });
    }
    group.finish();
}

fn bench_tools_list_response(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let catalog = ToolCatalog::standard();
    let response = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": { "tools": catalog.definitions() },
    });

    c.bench_function("tools_list_round_trip", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut buf = Vec::new();
                write_json(&mut buf, black_box(&response)).await.unwrap();
                let mut cursor = Cursor::new(buf);
                read_frame(&mut cursor, MAX_FRAME).await.unwrap()
            })
        });
    });
}

criterion_group!(
    benches,
    bench_write_frame,
    bench_read_frame,
    bench_tools_list_response
);
criterion_main!(benches);
