//! Benchmarks for divisor queries: KD-tree variants against the list.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use divquery::{BasicConfig, DivFinder, DivList, DivListOptions, KDTree, KDTreeOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const VARS: usize = 10;

fn generate_monomials(n: usize, max_exponent: u32, seed: u64) -> Vec<Vec<u32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..VARS).map(|_| rng.gen_range(0..max_exponent)).collect())
        .collect()
}

type Tree<const TREE_MASK: bool> = KDTree<BasicConfig<u32, true, TREE_MASK>>;

fn kdtree<const TREE_MASK: bool>(options: KDTreeOptions) -> Tree<TREE_MASK> {
    KDTree::new(BasicConfig::new(VARS), options)
}

fn div_list() -> DivList<BasicConfig<u32>> {
    DivList::new(BasicConfig::new(VARS), DivListOptions::default())
}

fn bench_finder<F, M>(c: &mut Criterion, group_name: &str, make: M)
where
    F: DivFinder,
    F::Config: divquery::DivisorConfig<Entry = Vec<u32>, Monomial = [u32]>,
    M: Fn() -> F,
{
    let mut group = c.benchmark_group(group_name);
    let label = make().name();

    for size in [1_000, 10_000] {
        let entries = generate_monomials(size, 20, 1);
        let queries = generate_monomials(size, 20, 2);

        let id = BenchmarkId::new(format!("insert/{label}"), size);
        group.bench_with_input(id, &entries, |b, entries| {
            b.iter(|| {
                let mut finder = make();
                for m in entries {
                    finder.insert(m.clone());
                }
                black_box(finder.len())
            });
        });

        let mut finder = make();
        for m in &entries {
            finder.insert(m.clone());
        }
        let id = BenchmarkId::new(format!("find/{label}"), size);
        group.bench_with_input(id, &queries, |b, queries| {
            b.iter(|| {
                let mut hits = 0usize;
                for q in queries {
                    if finder.find_divisor(q).is_some() {
                        hits += 1;
                    }
                }
                black_box(hits)
            });
        });

        let id = BenchmarkId::new(format!("find_all/{label}"), size);
        group.bench_with_input(id, &queries, |b, queries| {
            b.iter(|| {
                let mut hits = 0usize;
                for q in queries {
                    finder.find_all_divisors(q, |_| {
                        hits += 1;
                        std::ops::ControlFlow::Continue(())
                    });
                }
                black_box(hits)
            });
        });

        let id = BenchmarkId::new(format!("minimize/{label}"), size);
        group.bench_with_input(id, &entries, |b, entries| {
            b.iter(|| {
                let mut finder = make();
                for m in entries {
                    finder.insert_reduce(m.clone());
                }
                black_box(finder.len())
            });
        });
    }

    group.finish();
}

fn bench_kdtree(c: &mut Criterion) {
    bench_finder(c, "kdtree", || kdtree::<false>(KDTreeOptions::default()));
}

fn bench_kdtree_tree_mask(c: &mut Criterion) {
    bench_finder(c, "kdtree_tree_mask", || {
        kdtree::<true>(KDTreeOptions::default().with_sort_on_insert(true))
    });
}

fn bench_div_list(c: &mut Criterion) {
    bench_finder(c, "div_list", div_list);
}

criterion_group!(benches, bench_kdtree, bench_kdtree_tree_mask, bench_div_list);
criterion_main!(benches);
