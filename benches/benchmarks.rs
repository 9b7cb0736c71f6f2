//! Performance benchmarks for grove

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use grove::test_utils::{MemTree, TestTree};
use grove::walk::{Scan, Sweep, Walker, WalkerConfig};
use grove::{PathFilter, SearchConfig, find_repositories};

/// `width` directories per level, `depth` levels deep, with a file in every
/// other leaf so the sweep has both empty and non-empty subtrees.
fn create_tree(width: usize, depth: usize) -> TestTree {
    let tree = TestTree::new();
    let mut level = vec![String::new()];
    for _ in 0..depth {
        level = level
            .iter()
            .flat_map(|parent| (0..width).map(move |i| format!("{parent}d{i}/")))
            .collect();
    }
    for (i, leaf) in level.iter().enumerate() {
        tree.add_dir(leaf);
        if i % 2 == 0 {
            tree.add_file(&format!("{leaf}file.txt"), "content");
        }
    }
    tree
}

fn create_mem_tree(width: usize, depth: usize) -> MemTree {
    let mut tree = MemTree::new();
    let mut level = vec![String::new()];
    for _ in 0..depth {
        level = level
            .iter()
            .flat_map(|parent| (0..width).map(move |i| format!("{parent}d{i}/")))
            .collect();
    }
    for leaf in &level {
        tree = tree.dir(leaf.trim_end_matches('/'));
    }
    tree
}

fn config(max_parallel: isize) -> WalkerConfig {
    WalkerConfig {
        max_parallel,
        ..Default::default()
    }
}

fn bench_scan(c: &mut Criterion) {
    let tree = create_tree(6, 3);
    let mut group = c.benchmark_group("scan");

    for (name, limit) in [("sequential", 1), ("four_units", 4), ("unlimited", 0)] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut walker = Walker::new(tree.node(), Scan::all()).with_config(config(limit));
                walker.walk().unwrap();
                black_box(walker.results().len())
            })
        });
    }

    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    let tree = create_tree(6, 3);
    let mut group = c.benchmark_group("sweep");

    for (name, limit) in [("sequential", 1), ("four_units", 4), ("unlimited", 0)] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut walker = Walker::new(tree.node(), Sweep::new()).with_config(config(limit));
                walker.walk().unwrap();
                black_box(walker.results().len())
            })
        });
    }

    group.finish();
}

fn bench_in_memory(c: &mut Criterion) {
    let mut group = c.benchmark_group("in_memory");

    // Small tree (~100 nodes)
    let small = create_mem_tree(4, 3).root();
    group.bench_function("small_tree_scan", |b| {
        b.iter(|| {
            let mut walker = Walker::new(black_box(small.clone()), Scan::all());
            walker.walk().unwrap();
        })
    });

    // Larger tree (~1500 nodes)
    let large = create_mem_tree(6, 4).root();
    group.bench_function("large_tree_sweep", |b| {
        b.iter(|| {
            let mut walker = Walker::new(black_box(large.clone()), Sweep::new());
            walker.walk().unwrap();
        })
    });

    group.finish();
}

fn bench_find_repositories(c: &mut Criterion) {
    let tree = create_tree(4, 2);
    for i in 0..8 {
        tree.add_repo(&format!("repos/r{i}"));
    }
    let search = SearchConfig::new(tree.path());

    c.bench_function("find_repositories", |b| {
        b.iter(|| find_repositories(black_box(&search), PathFilter::default()))
    });
}

criterion_group!(
    benches,
    bench_scan,
    bench_sweep,
    bench_in_memory,
    bench_find_repositories,
);
criterion_main!(benches);
