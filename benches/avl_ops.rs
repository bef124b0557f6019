//! Insert / search / update / delete over random contacts.

use avl_store::workload::{distinct_contacts, RandomContact, UPDATED_EMAIL, UPDATED_PHONE};
use avl_store::ContactBook;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;

const SIZES: [usize; 3] = [100, 500, 1000];

fn contacts(n: usize) -> Vec<RandomContact> {
    distinct_contacts(&mut StdRng::seed_from_u64(n as u64), n)
}

fn filled(contacts: &[RandomContact]) -> ContactBook {
    let mut book = ContactBook::new();
    for c in contacts {
        book.insert(&c.name, &c.phone, &c.email).unwrap();
    }
    book
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for size in SIZES {
        let contacts = contacts(size);

        group.bench_with_input(BenchmarkId::new("AVL", size), &contacts, |b, contacts| {
            // One book for every iteration: clear+refill reuses the arena.
            let mut book = ContactBook::new();
            b.iter(|| {
                book.clear();
                for c in contacts {
                    book.insert(&c.name, &c.phone, &c.email).unwrap();
                }
                black_box(book.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &contacts, |b, contacts| {
            b.iter(|| {
                let mut map: BTreeMap<String, (String, String)> = BTreeMap::new();
                for c in contacts {
                    map.entry(c.name.clone())
                        .or_insert_with(|| (c.phone.clone(), c.email.clone()));
                }
                black_box(map)
            });
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in SIZES {
        let contacts = contacts(size);
        let book = filled(&contacts);

        group.bench_with_input(BenchmarkId::new("AVL", size), &contacts, |b, contacts| {
            b.iter(|| {
                for c in contacts {
                    black_box(book.get(&c.name));
                }
            });
        });
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");

    for size in SIZES {
        let contacts = contacts(size);
        let mut book = filled(&contacts);

        group.bench_with_input(BenchmarkId::new("AVL", size), &contacts, |b, contacts| {
            b.iter(|| {
                for c in contacts {
                    book.update(&c.name, Some(UPDATED_PHONE), Some(UPDATED_EMAIL))
                        .unwrap();
                }
            });
        });
    }

    group.finish();
}

fn bench_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete");

    for size in SIZES {
        let contacts = contacts(size);
        let book = filled(&contacts);

        group.bench_with_input(BenchmarkId::new("AVL", size), &contacts, |b, contacts| {
            b.iter_batched_ref(
                || book.tree().clone(),
                |tree| {
                    for c in contacts {
                        tree.remove(&c.name).unwrap();
                    }
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_search, bench_update, bench_delete);
criterion_main!(benches);
