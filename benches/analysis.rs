//! Performance benchmarks for journey analysis.
//!
//! Run with: `cargo bench --bench analysis`
//!
//! ## Performance Targets
//!
//! | Operation | Target | Notes |
//! |-----------|--------|-------|
//! | Entry scoring | linear in pages | Pure arithmetic per page |
//! | Path tracing | linear in path length | Bounded greedy walk |
//! | Full persona analysis | <50ms for 10k pages | Includes percentile pass |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use journey_kernel::{
    Edge, JourneyAnalyzer, JourneyPolicy, Node, NodeType, Persona, PropertyGraph,
};

/// Create a test page at a synthetic depth.
fn make_page(i: usize) -> Node {
    let depth_path = match i % 4 {
        0 => String::new(),
        1 => "/section".to_string(),
        2 => "/section/page".to_string(),
        _ => "/section/page/detail".to_string(),
    };
    Node::new(format!("page{i}"), NodeType::Page)
        .with_attr("url", format!("https://uni.edu{depth_path}/p{i}"))
        .with_attr("importance", (i % 10) as f64 / 10.0)
}

/// Build a layered site: each page links to a handful of later pages.
fn build_site(page_count: usize) -> PropertyGraph {
    let mut graph = PropertyGraph::new();
    for i in 0..page_count {
        graph.add_node(make_page(i)).expect("unique bench ids");
    }
    for i in 0..page_count {
        for step in [1, 7, 13] {
            let j = i + step;
            if j < page_count {
                graph
                    .add_edge(Edge::links_to(format!("page{i}"), format!("page{j}")))
                    .expect("bench endpoints exist");
            }
        }
    }
    graph
}

fn bench_entry_scoring(c: &mut Criterion) {
    let policy = JourneyPolicy::default();
    let persona = Persona::new("bench", "Bench Persona", ["section"]);

    let mut group = c.benchmark_group("entry_scoring");
    for page_count in [100, 1_000, 10_000] {
        let graph = build_site(page_count);
        group.throughput(Throughput::Elements(page_count as u64));
        group.bench_with_input(
            BenchmarkId::new("pages", page_count),
            &graph,
            |b, graph| {
                b.iter(|| {
                    let analyzer = JourneyAnalyzer::new(black_box(graph), &policy);
                    analyzer.analyze(black_box(&persona))
                })
            },
        );
    }
    group.finish();
}

fn bench_full_catalog(c: &mut Criterion) {
    let policy = JourneyPolicy::default();
    let graph = build_site(5_000);
    let catalog = journey_kernel::PersonaCatalog::new(
        (0..4)
            .map(|i| Persona::new(format!("persona{i}"), format!("Persona {i}"), ["detail"]))
            .collect(),
    )
    .expect("unique persona ids");

    c.bench_function("analyze_all_4_personas_5k_pages", |b| {
        b.iter(|| {
            let analyzer = JourneyAnalyzer::new(black_box(&graph), &policy);
            analyzer.analyze_all(black_box(&catalog))
        })
    });
}

criterion_group!(benches, bench_entry_scoring, bench_full_catalog);
criterion_main!(benches);
