//! Structural-operation benchmarks

use criterion::{criterion_group, criterion_main, Criterion};
use fable_core::{ops, Book};

fn book_with_pages(n: usize) -> Book {
    let mut book = Book::new("bench");
    for _ in 1..n {
        ops::add_page(&mut book);
    }
    book
}

fn ops_benchmark(c: &mut Criterion) {
    c.bench_function("move_page_front_to_back_64", |b| {
        b.iter_batched(
            || book_with_pages(64),
            |mut book| {
                let first = book.pages[0].id;
                ops::move_page(&mut book, first, 63).unwrap();
                std::hint::black_box(book)
            },
            criterion::BatchSize::SmallInput,
        )
    });

    c.bench_function("duplicate_then_delete_64", |b| {
        b.iter_batched(
            || book_with_pages(64),
            |mut book| {
                let source = book.pages[32].id;
                let clone = ops::duplicate_page(&mut book, source).unwrap();
                ops::delete_page(&mut book, clone).unwrap();
                std::hint::black_box(book)
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, ops_benchmark);
criterion_main!(benches);
