use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use sheet_insights::classify::classify_columns;
use sheet_insights::grid::ValueGrid;
use sheet_insights::summary::generate_summary;

fn generate_orders(rows: usize) -> Vec<Vec<String>> {
    let mut out = vec![
        ["id", "ordered_at", "status", "amount", "quantity", "note"]
            .map(String::from)
            .to_vec(),
    ];
    for i in 0..rows {
        let status = match i % 3 {
            0 => "shipped",
            1 => "pending",
            _ => "processing",
        };
        let day = (i % 28) + 1;
        let note = if i % 7 == 0 {
            String::new()
        } else {
            format!("order {i}")
        };
        out.push(vec![
            i.to_string(),
            format!("2024-01-{day:02}"),
            status.to_string(),
            format!("{:.2}", (i % 500) as f64 * 1.25),
            ((i * 7) % 13).to_string(),
            note,
        ]);
    }
    out
}

fn bench_summary(c: &mut Criterion) {
    let raw = generate_orders(10_000);
    let grid = ValueGrid::from_text_rows(raw.clone()).expect("grid");
    let descriptors = classify_columns(&grid);

    c.bench_function("ingest_10k_rows", |b| {
        b.iter_batched(
            || raw.clone(),
            |rows| ValueGrid::from_text_rows(rows).expect("grid"),
            BatchSize::LargeInput,
        )
    });
    c.bench_function("classify_10k_rows", |b| b.iter(|| classify_columns(&grid)));
    c.bench_function("summary_10k_rows", |b| {
        b.iter(|| generate_summary(&grid, &descriptors))
    });
}

criterion_group!(benches, bench_summary);
criterion_main!(benches);
