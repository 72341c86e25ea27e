use colsql::testing::MockConnection;
use colsql::{Col, SelectBuilder, SqlType, Value};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

fn columns(n: usize) -> Vec<Col> {
    (0..n)
        .map(|i| Col::named(format!("col{i}"), SqlType::Integer))
        .collect()
}

/// SELECT col0, col1, ... FROM t WHERE col0 = ? AND col1 IS NULL ... ORDER BY col0 DESC
fn build_select(cols: &[Col]) -> colsql::RowSelect {
    let mut qb = SelectBuilder::rows().table("t");
    for (i, col) in cols.iter().enumerate() {
        let value = if i % 2 == 0 { Value::Int(i as i64) } else { Value::Null };
        qb = qb.select(col).where_(col, value);
    }
    match cols.first() {
        Some(first) => qb.order_by_desc(first),
        None => qb,
    }
}

fn bench_render_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/select");

    for n in [1, 5, 10, 50, 100] {
        let qb = build_select(&columns(n));
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| black_box(qb.render()));
        });
    }

    group.finish();
}

fn bench_build_and_render_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/build_and_render_insert");

    for n in [1, 5, 10, 50, 100] {
        let cols = columns(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &cols, |b, cols| {
            b.iter(|| {
                let qb = cols
                    .iter()
                    .enumerate()
                    .fold(colsql::insert().table("t"), |qb, (i, col)| {
                        qb.value(col, i as i64)
                    });
                black_box(qb.render());
            });
        });
    }

    group.finish();
}

fn bench_update_against_mock(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/update_execute_mock");

    for n in [5, 20, 100] {
        let cols = columns(n);
        let qb = cols
            .iter()
            .enumerate()
            .fold(colsql::update().table("t"), |qb, (i, col)| qb.value(col, i as i64))
            .where_(Col::new("id", SqlType::Integer), 1);
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| {
                let conn = MockConnection::new().with_affected_rows(1);
                black_box(qb.execute(&conn).ok());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_render_select,
    bench_build_and_render_insert,
    bench_update_against_mock
);
criterion_main!(benches);
