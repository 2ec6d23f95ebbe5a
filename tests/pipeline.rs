//! End-to-end pipeline tests: populate → analyze → materialize → export.

use journey_kernel::{
    execute_run, AttrValue, Edge, EdgeKey, EdgeType, GraphDocument, GraphFingerprint,
    JourneyPolicy, Node, NodeId, NodeType, Persona, PersonaCatalog, PropertyGraph,
};

fn init_test_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn page(id: &str, url: &str, importance: f64) -> Node {
    Node::new(id, NodeType::Page)
        .with_attr("url", url)
        .with_attr("importance", importance)
}

/// University site large enough to exercise every pipeline step.
fn site() -> PropertyGraph {
    let mut g = PropertyGraph::new();

    g.add_node(page("home", "https://uni.edu/", 0.95).with_attr("title", "University")).unwrap();
    g.add_node(
        page("prog", "https://uni.edu/programmes", 0.7).with_attr("category", "programme"),
    )
    .unwrap();
    g.add_node(
        page("prog-cs", "https://uni.edu/programmes/cs", 0.65)
            .with_attr("category", "programme")
            .with_attr("keywords", "computer science"),
    )
    .unwrap();
    g.add_node(
        page("adm", "https://uni.edu/admissions", 0.85).with_attr("category", "admissions"),
    )
    .unwrap();
    g.add_node(
        page("apply", "https://uni.edu/admissions/apply", 0.6)
            .with_attr("title", "Apply now")
            .with_attr("category", "application"),
    )
    .unwrap();
    g.add_node(page("fees", "https://uni.edu/admissions/fees", 0.5)).unwrap();
    g.add_node(page("news", "https://uni.edu/news", 0.4)).unwrap();
    g.add_node(Node::new("student", NodeType::Persona)).unwrap();

    for (from, to) in [
        ("home", "prog"),
        ("home", "adm"),
        ("home", "news"),
        ("prog", "prog-cs"),
        ("prog-cs", "adm"),
        ("adm", "apply"),
        ("adm", "fees"),
        ("fees", "apply"),
    ] {
        g.add_edge(Edge::links_to(from, to)).unwrap();
    }
    g
}

fn catalog() -> PersonaCatalog {
    PersonaCatalog::new(vec![
        Persona::new("student", "Prospective Student", ["computer science"]),
        Persona::new("parent", "Parent", ["fees"]),
    ])
    .unwrap()
}

#[test]
fn test_full_run_materializes_valid_next_steps() {
    init_test_logging();
    let mut g = site();
    let policy = JourneyPolicy::default();

    let outcome = execute_run(&mut g, &catalog(), &policy);

    assert!(outcome.report.materialize.inserted > 0);
    assert!(outcome.report.materialize.rejected.is_empty());
    assert!(outcome.report.materialize.structural_errors.is_empty());

    for edge in g.edges_of(EdgeType::NextStep) {
        // Hard invariants hold on every persisted edge.
        let prob = edge
            .attr("transition_prob")
            .and_then(AttrValue::as_f64)
            .expect("NEXT_STEP edge missing transition_prob");
        assert!((0.0..=1.0).contains(&prob));
        assert_ne!(edge.from, edge.to, "self-loop NEXT_STEP persisted");
        let persona = edge
            .attr("persona_id")
            .and_then(AttrValue::as_str)
            .expect("NEXT_STEP edge missing persona_id");
        assert!(!persona.is_empty());
    }
}

#[test]
fn test_run_report_summarizes_personas_in_catalog_order() {
    init_test_logging();
    let mut g = site();
    let outcome = execute_run(&mut g, &catalog(), &JourneyPolicy::default());

    let ids: Vec<_> = outcome
        .report
        .personas
        .iter()
        .map(|s| s.persona_id.as_str())
        .collect();
    assert_eq!(ids, ["student", "parent"]);
    for summary in &outcome.report.personas {
        assert!(!summary.empty);
        assert!(summary.entry_points <= 3);
        assert!(summary.conversion_points <= 2);
        assert!(summary.paths <= 5);
    }
}

#[test]
fn test_enriched_export_round_trips() {
    init_test_logging();
    let mut g = site();
    execute_run(&mut g, &catalog(), &JourneyPolicy::default());

    let doc = g.to_document();
    let json = doc.to_json_pretty().unwrap();
    let reloaded = GraphDocument::from_json(&json).unwrap();
    let reimported = PropertyGraph::from_document(&reloaded).unwrap();

    assert!(reimported.warnings.is_empty());
    assert_eq!(
        GraphFingerprint::compute(&g),
        GraphFingerprint::compute(&reimported.graph)
    );
    // Attribute fidelity on a derived edge survives the round trip.
    let next_step = g.edges_of(EdgeType::NextStep).next().unwrap();
    let reloaded_edge = reimported.graph.edge(&next_step.key()).unwrap();
    assert_eq!(next_step.attributes, reloaded_edge.attributes);
    // Checksum matches between export and re-export.
    assert_eq!(doc.checksum(), reimported.graph.to_document().checksum());
}

#[test]
fn test_two_full_runs_are_identical_modulo_run_identity() {
    init_test_logging();
    let policy = JourneyPolicy::default();

    let mut g1 = site();
    let out1 = execute_run(&mut g1, &catalog(), &policy);
    let mut g2 = site();
    let out2 = execute_run(&mut g2, &catalog(), &policy);

    assert_eq!(out1.journeys, out2.journeys);
    assert_eq!(out1.report.materialize, out2.report.materialize);
    assert_eq!(out1.report.fingerprint_after, out2.report.fingerprint_after);
    assert_eq!(GraphFingerprint::compute(&g1), GraphFingerprint::compute(&g2));
}

#[test]
fn test_empty_catalog_changes_nothing() {
    init_test_logging();
    let mut g = site();
    let before = GraphFingerprint::compute(&g);

    let outcome = execute_run(&mut g, &PersonaCatalog::default(), &JourneyPolicy::default());

    assert!(outcome.journeys.is_empty());
    assert_eq!(outcome.report.materialize.inserted, 0);
    assert_eq!(GraphFingerprint::compute(&g), before);
}

#[test]
fn test_unconnected_persona_reported_not_fatal() {
    init_test_logging();
    let mut g = PropertyGraph::new();
    // All pages have importance 0: nothing qualifies as an entry point.
    g.add_node(page("a", "https://uni.edu/", 0.0)).unwrap();
    g.add_node(page("b", "https://uni.edu/b", 0.0)).unwrap();
    g.add_edge(Edge::links_to("a", "b")).unwrap();

    let catalog =
        PersonaCatalog::new(vec![Persona::new("ghost", "Ghost", Vec::<String>::new())]).unwrap();
    let outcome = execute_run(&mut g, &catalog, &JourneyPolicy::default());

    assert_eq!(outcome.journeys.len(), 1);
    assert!(outcome.journeys[0].is_empty());
    assert!(outcome.report.personas[0].empty);
    assert_eq!(outcome.report.materialize.inserted, 0);
}

#[test]
fn test_population_warnings_do_not_abort_import() {
    init_test_logging();
    let mut doc = site().to_document();
    // Sabotage: repeat the first node, add a dangling edge.
    doc.nodes.push(doc.nodes[0].clone());
    doc.edges.push(journey_kernel::store::export::EdgeRecord {
        from: "home".to_string(),
        to: "nowhere".to_string(),
        edge_type: "LINKS_TO".to_string(),
        attributes: Default::default(),
    });

    let imported = PropertyGraph::from_document(&doc).unwrap();
    assert_eq!(imported.warnings.len(), 2);

    // The best-effort graph still runs end to end.
    let mut g = imported.graph;
    let outcome = execute_run(&mut g, &catalog(), &JourneyPolicy::default());
    assert!(outcome.report.materialize.inserted > 0);
}

#[test]
fn test_mermaid_export_labels_derived_edges() {
    init_test_logging();
    let mut g = site();
    execute_run(&mut g, &catalog(), &JourneyPolicy::default());

    let diagram = g.to_mermaid();
    assert!(diagram.starts_with("flowchart TD"));
    assert!(diagram.contains("p="), "NEXT_STEP edges must carry probability labels");
    assert!(diagram.contains("Page: "));

    // Export is read-only: rendering twice gives the same bytes.
    assert_eq!(diagram, g.to_mermaid());
}

#[test]
fn test_next_step_edge_attributes_complete() {
    init_test_logging();
    let mut g = site();
    execute_run(&mut g, &catalog(), &JourneyPolicy::default());

    // The student's strongest journey passes admissions -> apply.
    let edge = g
        .edge(&EdgeKey {
            from: NodeId::new("adm"),
            to: NodeId::new("apply"),
            edge_type: EdgeType::NextStep,
        })
        .expect("expected a NEXT_STEP edge admissions -> apply");
    assert_eq!(edge.attr("from_stage"), Some(&AttrValue::from("DECISION")));
    assert_eq!(edge.attr("to_stage"), Some(&AttrValue::from("ACTION")));
    assert!(edge.attr("frequency").and_then(AttrValue::as_i64).unwrap() >= 1);
}
