//! Seed scenarios from the core's testable-properties list: a taint
//! round-trip, a query-budget cutoff, and determinism across differing
//! rayon worker counts.

use codeatlas_ir::config::Config;
use codeatlas_ir::model::{Edge, EdgeKind, IRDocument, Language, Node, NodeKind, Span};
use codeatlas_ir::query::{Budget, QueryEngine, E, Q};
use codeatlas_ir::taint::{compile_atom_file, AtomKind, AtomMatch, MatchStatus, TypeNormalizer};
use codeatlas_ir::{Pipeline, SourceFile};

fn node(id: &str, kind: NodeKind, fqn: &str, name: &str) -> Node {
    let span = Span::new(1, 0, 1, 1);
    Node::new(id.into(), kind, fqn.into(), name.into(), "app.py".into(), span, Language::Python)
}

/// SQL injection round-trip: a source (`input()`) reaches a sink
/// (`cursor.execute()`) through one data-flow edge, and the existential
/// query finds the path.
#[test]
fn taint_round_trip_finds_source_to_sink_path() {
    let mut doc = IRDocument::empty("repo", "snap1", "app.py");
    doc.nodes.push(node("n_input", NodeKind::Expression, "app.main.input", "input"));
    doc.nodes.push(node("n_query", NodeKind::Variable, "app.main.query", "query"));
    doc.nodes.push(node("n_execute", NodeKind::Expression, "app.main.execute", "execute"));
    doc.edges.push(Edge::new("e1".into(), EdgeKind::Dfg, "n_input".into(), "n_query".into()));
    doc.edges.push(Edge::new("e2".into(), EdgeKind::Dfg, "n_query".into(), "n_execute".into()));

    let matches = vec![
        AtomMatch { atom_id: "source.stdin.input".into(), entity_id: "n_input".into(), kind: AtomKind::Source, confidence: 0.9, status: MatchStatus::Tainted },
        AtomMatch { atom_id: "sink.sql.cursor_execute".into(), entity_id: "n_execute".into(), kind: AtomKind::Sink, confidence: 0.95, status: MatchStatus::Tainted },
    ];

    let engine = QueryEngine::new(std::slice::from_ref(&doc), &matches);
    let query = (Q::source("stdin") >> Q::sink("sql")).via(E::dfg()).existential_path();
    let result = engine.existential(&query, Budget::default());

    assert_eq!(result.paths.len(), 1);
    assert!(!result.budget_exhausted);
    assert_eq!(result.paths[0].node_ids, vec!["n_input", "n_query", "n_execute"]);
}

/// A sanitized match still reaches the sink selector (it's a real node
/// with a real `AtomMatch`), but the match itself is recorded
/// `Sanitized` rather than `Tainted` — callers decide how to treat it,
/// the query engine doesn't filter by status.
#[test]
fn sanitized_match_still_participates_in_path_search() {
    let mut doc = IRDocument::empty("repo", "snap1", "app.py");
    doc.nodes.push(node("n_input", NodeKind::Expression, "app.main.input", "input"));
    doc.nodes.push(node("n_execute", NodeKind::Expression, "app.main.execute", "execute"));
    doc.edges.push(Edge::new("e1".into(), EdgeKind::Dfg, "n_input".into(), "n_execute".into()));

    let matches = vec![
        AtomMatch { atom_id: "source.stdin.input".into(), entity_id: "n_input".into(), kind: AtomKind::Source, confidence: 0.9, status: MatchStatus::Tainted },
        AtomMatch { atom_id: "sink.sql.cursor_execute".into(), entity_id: "n_execute".into(), kind: AtomKind::Sink, confidence: 0.95, status: MatchStatus::Sanitized },
    ];

    let engine = QueryEngine::new(std::slice::from_ref(&doc), &matches);
    let query = (Q::source("stdin") >> Q::sink("sql")).via(E::dfg()).existential_path();
    let result = engine.existential(&query, Budget::default());
    assert_eq!(result.paths.len(), 1);
}

/// A branching call graph deep and wide enough to exceed
/// `Budget::light()`'s `max_nodes` within its `max_depth` must report
/// `budget_exhausted` rather than silently returning a partial path set
/// as if it were complete. The tree has no node the target selector
/// matches, so the search can't short-circuit on an early path and must
/// run the node budget all the way down.
#[test]
fn query_budget_is_exhausted_on_an_oversized_branching_graph() {
    let light = Budget::light();
    let mut doc = IRDocument::empty("repo", "snap1", "big.py");
    doc.nodes.push(node("root", NodeKind::Variable, "big.root", "root"));

    let branching_factor = 4;
    let mut parents = vec!["root".to_string()];
    let mut counter = 0usize;
    for _level in 0..light.max_depth {
        let mut next_parents = Vec::new();
        for parent in &parents {
            for _ in 0..branching_factor {
                counter += 1;
                let id = format!("t{counter}");
                doc.nodes.push(node(&id, NodeKind::Variable, &format!("big.{id}"), &id));
                doc.edges.push(Edge::new(format!("e{counter}"), EdgeKind::Dfg, parent.clone(), id.clone()));
                next_parents.push(id);
            }
        }
        parents = next_parents;
    }
    assert!(doc.nodes.len() > light.max_nodes, "test tree must outgrow the node budget");

    let engine = QueryEngine::new(std::slice::from_ref(&doc), &[]);
    let query = (Q::var("root") >> Q::var("unreachable_target")).via(E::dfg()).existential_path();
    let result = engine.existential(&query, light);

    assert!(result.budget_exhausted);
    assert!(result.paths.is_empty());
}

/// The hand-built-`IRDocument` version of this scenario above exercises the
/// query engine's path search in isolation; this one drives the same
/// source-to-sink shape through the real `Pipeline::build` from literal
/// Python source, so it also exercises structural Expression-node emission
/// and the Matcher's real candidate/entity plumbing end to end.
#[test]
fn taint_round_trip_finds_source_to_sink_path_through_the_real_pipeline() {
    let atoms = r#"
atoms:
  - atom_id: stdin.input.source
    kind: Source
    match_clauses:
      - call: input
  - atom_id: sql.cursor_execute.sink
    kind: Sink
    match_clauses:
      - call: execute
"#;
    let rules = compile_atom_file(atoms, TypeNormalizer::default()).unwrap();

    let pipeline = Pipeline::new(Config::default());
    let files = vec![SourceFile {
        path: "app.py".into(),
        content: "def handler():\n    query = input()\n    cursor.execute(query)\n".into(),
    }];
    let result = pipeline.build("repo", "snap1", &files, &rules);

    assert!(result.matches.iter().any(|m| m.kind == AtomKind::Source && m.status == MatchStatus::Tainted));
    assert!(result.matches.iter().any(|m| m.kind == AtomKind::Sink && m.status == MatchStatus::Tainted));

    let engine = QueryEngine::new(&result.documents, &result.matches);
    let query = (Q::source("stdin") >> Q::sink("sql")).via(E::dfg()).existential_path();
    let query_result = engine.existential(&query, Budget::default());

    assert_eq!(query_result.paths.len(), 1);
    assert!(!query_result.budget_exhausted);
}

fn sample_files() -> Vec<SourceFile> {
    vec![
        SourceFile { path: "a.py".into(), content: "def helper():\n    return 1\n".into() },
        SourceFile { path: "b.py".into(), content: "def caller():\n    return helper()\n".into() },
        SourceFile { path: "c.py".into(), content: "def unrelated():\n    x = 1\n    return x\n".into() },
        SourceFile { path: "d.py".into(), content: "class Widget:\n    def render(self):\n        return None\n".into() },
    ]
}

/// Building the same snapshot through rayon pools of differing worker
/// counts must produce byte-identical canonical IR per file: worker
/// count governs scheduling only, never output content or order within
/// a document (`IRDocument::canonicalize`). The pipeline's own document
/// ordering is a scheduling artifact, not a semantic guarantee, so this
/// compares per-file content keyed by path rather than vector order.
#[test]
fn pipeline_output_is_identical_across_worker_counts() {
    let pipeline = Pipeline::new(Config::default());
    let files = sample_files();

    let build_with = |num_threads: usize| -> std::collections::BTreeMap<String, String> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(num_threads).build().unwrap();
        let result = pool.install(|| pipeline.build("repo", "snap1", &files, &[]));
        result
            .documents
            .into_iter()
            .map(|doc| (doc.file_path.clone(), serde_json::to_string(&doc).unwrap()))
            .collect()
    };

    let single_threaded = build_with(1);
    let wide = build_with(16);

    assert_eq!(single_threaded.keys().collect::<Vec<_>>(), wide.keys().collect::<Vec<_>>());
    for (path, single_doc) in &single_threaded {
        assert_eq!(single_doc, &wide[path], "document for {path} differs between worker counts");
    }
}
