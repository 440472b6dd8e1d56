use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use sdt_core::{ContentElement, InjectionPair, Paragraph, SdtConfig, SdtDocument, Table, TableCell};

fn fixture(sections: usize) -> (Vec<ContentElement>, Vec<InjectionPair>) {
    let mut elements = Vec::new();
    let mut batch = Vec::new();
    let mut next_id = 10_000_000;
    let mut config = |inline: bool| {
        next_id += 1;
        SdtConfig::new(next_id)
            .map(|c| c.with_inline_level(inline))
            .unwrap_or_else(|e| panic!("{e}"))
    };

    for i in 0..sections {
        let heading = Paragraph::new(&format!("Clause {i}"));
        let table = Table::from_text([
            [format!("Party {i}"), format!("Amount {i}")],
            [format!("Date {i}"), format!("Term {i}")],
        ]);
        elements.push(heading.clone().into());
        elements.push(table.clone().into());

        batch.push(InjectionPair::new(heading, config(false)));
        batch.push(InjectionPair::new(TableCell::new(&format!("Amount {i}")), config(true)));
        batch.push(InjectionPair::new(table, config(false)));
    }
    (elements, batch)
}

fn injection_benchmark(c: &mut Criterion) {
    let (elements, batch) = fixture(200);
    let bytes = SdtDocument::from_elements(&elements)
        .and_then(|doc| doc.to_bytes())
        .unwrap_or_else(|e| panic!("{e}"));

    c.bench_function("inject_600_pairs", |b| {
        b.iter_batched(
            || SdtDocument::from_bytes(&bytes).unwrap_or_else(|e| panic!("{e}")),
            |mut doc| black_box(doc.inject_all(&batch).map(|r| r.wrapped_total())),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, injection_benchmark);
criterion_main!(benches);
