//! End-to-end check scenarios: small hand-built layouts with known answers.

use std::sync::mpsc;

use watertight_check::prelude::*;

// -- Helpers ----------------------------------------------------------------

fn check(
    graph: &mut NodeGraph,
    root: NodeId,
    config: CheckConfig,
) -> (WatertightReport, DiagnosticLog) {
    let mut log = DiagnosticLog::new();
    let report = run_check(graph, root, &config, &mut log);
    (report, log)
}

/// Four rooms in a 2x2 square on one floor, open to each other on the inside
/// and walled on the outside:
///
/// ```text
///   d --- c      (z = 1)
///   |     |
///   a --- b      (z = 0)
/// ```
fn ring(graph: &mut NodeGraph) -> [NodeId; 4] {
    use Direction::*;
    let a = graph.add_node(Node::enclosed("a").with_open(East).with_open(North));
    let b = graph.add_node(Node::enclosed("b").with_open(West).with_open(North));
    let c = graph.add_node(Node::enclosed("c").with_open(South).with_open(West));
    let d = graph.add_node(Node::enclosed("d").with_open(East).with_open(South));
    graph.link(a, East, b).unwrap();
    graph.link(b, North, c).unwrap();
    graph.link(c, West, d).unwrap();
    graph.link(d, South, a).unwrap();
    [a, b, c, d]
}

// -- Single nodes -----------------------------------------------------------

#[test]
fn fully_blocked_node_is_watertight() {
    let mut graph = NodeGraph::new();
    let room = graph.add_node(Node::enclosed("vault"));

    let (report, log) = check(&mut graph, room, CheckConfig::default());
    assert!(report.watertight);
    assert!(report.unsafe_faces.is_empty());
    assert_eq!(report.placed, 1);
    assert_eq!(log.count_at_least(Severity::Warning), 0);
}

#[test]
fn any_single_open_face_leaks() {
    for dir in Direction::ALL {
        let mut graph = NodeGraph::new();
        let room = graph.add_node(Node::enclosed("room").with_open(dir));

        let (report, _) = check(&mut graph, room, CheckConfig::default());
        assert!(!report.watertight, "open {dir} face should leak");
        assert_eq!(
            report.unsafe_faces,
            vec![UnsafeFace {
                node: room,
                direction: dir,
                cause: LeakCause::Void,
            }]
        );
    }
}

#[test]
fn open_pair_closed_to_each_other_is_safe() {
    let mut graph = NodeGraph::new();
    let a = graph.add_node(Node::enclosed("a").with_open(Direction::North));
    let b = graph.add_node(Node::enclosed("b").with_open(Direction::South));
    graph.link(a, Direction::North, b).unwrap();

    for config in [CheckConfig::default(), CheckConfig::strict()] {
        let mut graph = graph.clone();
        let (report, _) = check(&mut graph, a, config);
        assert!(report.watertight);
        assert_eq!(report.is_node_safe(a), Some(true));
        assert_eq!(report.is_node_safe(b), Some(true));
    }
}

#[test]
fn wall_on_one_side_is_enough() {
    // a's east face is open but b walls it off.
    let mut graph = NodeGraph::new();
    let a = graph.add_node(Node::enclosed("a").with_open(Direction::East));
    let b = graph.add_node(Node::enclosed("b"));
    graph.link(a, Direction::East, b).unwrap();

    let (report, _) = check(&mut graph, a, CheckConfig::default());
    assert!(report.watertight);
    assert_eq!(
        report.verdicts[&a].faces[&Direction::East],
        FaceOutcome::ClosedByNeighbor { neighbor: b }
    );
}

// -- Rings ------------------------------------------------------------------

#[test]
fn walled_ring_is_watertight() {
    let mut graph = NodeGraph::new();
    let [a, b, c, d] = ring(&mut graph);

    for config in [CheckConfig::default(), CheckConfig::strict()] {
        let mut graph = graph.clone();
        let (report, _) = check(&mut graph, a, config);
        assert!(report.watertight);
        assert_eq!(report.placed, 4);
        assert_eq!(report.verdicts[&c].position, Some(GridPos::new(1, 0, 1)));
        for node in [a, b, c, d] {
            assert_eq!(report.is_node_safe(node), Some(true));
        }
    }
}

#[test]
fn hole_in_ring_marks_whole_ring_under_strict() {
    let mut graph = NodeGraph::new();
    let [a, b, c, d] = ring(&mut graph);
    graph.set_face(c, Direction::North, Face::Open).unwrap();

    let (optimistic, _) = check(&mut graph.clone(), a, CheckConfig::default());
    assert!(!optimistic.watertight);
    assert_eq!(optimistic.is_node_safe(c), Some(false));

    let (strict, _) = check(&mut graph, a, CheckConfig::strict());
    assert!(!strict.watertight);
    assert_eq!(strict.unsafe_nodes().collect::<Vec<_>>(), vec![a, b, c, d]);
    assert_eq!(strict.void_faces().count(), 1);
}

// -- Diagnostics ------------------------------------------------------------

#[test]
fn overlap_is_reported_exactly_once() {
    use Direction::*;
    let mut graph = NodeGraph::new();
    let root = graph.add_node(Node::enclosed("root"));
    let a = graph.add_node(Node::enclosed("a"));
    let b = graph.add_node(Node::enclosed("b"));
    let c = graph.add_node(Node::enclosed("c"));
    let d = graph.add_node(Node::enclosed("d"));
    graph.link(root, East, a).unwrap();
    graph.link(root, South, b).unwrap();
    graph.link(b, East, c).unwrap();
    // c's north cell is a's cell.
    graph.link(c, North, d).unwrap();

    let (report, log) = check(&mut graph, root, CheckConfig::default());
    let overlaps = log.overlaps().collect::<Vec<_>>();
    assert_eq!(overlaps.len(), 1);
    assert_eq!(overlaps[0].node, d);
    assert_eq!(overlaps[0].existing, a);
    assert_eq!(overlaps[0].position, GridPos::new(1, 0, 0));
    assert_eq!(report.overlaps.len(), 1);
    assert_eq!(report.placed, 4);
    // Everything is walled, so the overlap does not change the verdict.
    assert!(report.watertight);
}

#[test]
fn dangling_link_is_reported_and_treated_as_void() {
    let mut graph = NodeGraph::new();
    let room = graph.add_node(Node::enclosed("room").with_open(Direction::West));
    graph
        .get_mut(room)
        .unwrap()
        .set_link(Direction::West, Some(NodeId(42)));

    let (report, log) = check(&mut graph, room, CheckConfig::default());
    assert!(!report.watertight);
    assert_eq!(report.dangling.len(), 1);
    assert_eq!(report.verdicts[&room].faces[&Direction::West], FaceOutcome::Void);
    assert!(log
        .entries()
        .iter()
        .any(|d| matches!(d, Diagnostic::DanglingLink(link) if link.target == NodeId(42))));
}

#[test]
fn displaced_link_is_reported() {
    // a -E-> b -E-> c, and c -E-> b although b sits west of c.
    let mut graph = NodeGraph::new();
    let a = graph.add_node(Node::enclosed("a"));
    let b = graph.add_node(Node::enclosed("b"));
    let c = graph.add_node(Node::enclosed("c"));
    graph.link(a, Direction::East, b).unwrap();
    graph.link(b, Direction::East, c).unwrap();
    graph.link(c, Direction::East, b).unwrap();

    let (report, log) = check(&mut graph, a, CheckConfig::default());
    assert!(report.watertight);
    assert_eq!(report.displaced.len(), 1);
    assert_eq!(report.displaced[0].node, c);
    assert_eq!(report.displaced[0].placed, GridPos::new(1, 0, 0));
    assert!(log
        .entries()
        .iter()
        .any(|d| matches!(d, Diagnostic::DisplacedLink(link) if link.target == b)));
}

#[test]
fn diagnostics_can_go_over_a_channel() {
    let mut graph = NodeGraph::new();
    let a = graph.add_node(Node::enclosed("a"));
    let b = graph.add_node(Node::enclosed("b"));
    graph.link(a, Direction::Top, b).unwrap();

    let (mut tx, rx) = mpsc::channel::<Diagnostic>();
    let report = run_check(&mut graph, a, &CheckConfig::default(), &mut tx);
    drop(tx);

    assert!(report.watertight);
    let received: Vec<Diagnostic> = rx.iter().collect();
    assert_eq!(
        received,
        vec![
            Diagnostic::FrontierEvaluated { node: a, safe: true },
            Diagnostic::FrontierEvaluated { node: b, safe: true },
        ]
    );
}

#[test]
fn closure_sink_sees_missing_root() {
    let mut graph = NodeGraph::new();
    let mut seen = Vec::new();
    let report = run_check(
        &mut graph,
        NodeId(7),
        &CheckConfig::default(),
        &mut FnSink(|d: Diagnostic| seen.push(d.severity())),
    );
    assert!(!report.watertight);
    assert_eq!(seen, vec![Severity::Warning]);
}

// -- Repeat runs ------------------------------------------------------------

#[test]
fn repeated_checks_agree() {
    let mut graph = NodeGraph::new();
    let [a, _, c, _] = ring(&mut graph);
    graph.set_face(c, Direction::Top, Face::Open).unwrap();

    let checker = WatertightChecker::new(CheckConfig::strict());
    let first = checker.check(&mut graph, a, &mut NullSink);
    let snapshot = graph.clone();
    let second = checker.check(&mut graph, a, &mut NullSink);

    assert_eq!(first.watertight, second.watertight);
    assert_eq!(first.verdicts, second.verdicts);
    assert_eq!(second.links_rewritten, 0);
    assert_eq!(graph, snapshot);
}

// -- Layout documents -------------------------------------------------------

const HALL_AND_DEN: &str = r#"{
  "root": "hall",
  "nodes": [
    { "id": "hall",
      "faces": { "top": "ceiling", "bottom": "floor",
                 "east": "wall", "south": "wall", "west": "door" },
      "links": { "north": "den" } },
    { "id": "den",
      "faces": { "top": "ceiling", "bottom": "floor",
                 "north": "wall", "east": "wall", "west": "wall" } }
  ]
}"#;

#[test]
fn layout_document_round_trip_through_checker() {
    let layout = LayoutSnapshot::from_json(HALL_AND_DEN).unwrap();
    let checker = WatertightChecker::default();
    let mut log = DiagnosticLog::new();

    let (report, graph, root) = checker.check_layout(&layout, &mut log).unwrap();
    assert!(report.watertight);
    assert_eq!(report.links_rewritten, 1);
    assert_eq!(report.verdicts[&root].label, "hall");

    // The normalized document carries the back-link den -> hall.
    let normalized = graph.capture_layout(root).unwrap();
    let den = normalized.nodes.iter().find(|n| n.id == "den").unwrap();
    assert_eq!(den.links.get(&Direction::South).map(String::as_str), Some("hall"));
    assert_ne!(normalized.content_hash(), layout.content_hash());

    // Checking the normalized document changes nothing further.
    let (again, _, _) = checker.check_layout(&normalized, &mut NullSink).unwrap();
    assert_eq!(again.links_rewritten, 0);
    assert_eq!(again.verdicts, report.verdicts);
}

#[test]
fn layout_with_unknown_root_is_rejected() {
    let mut layout = LayoutSnapshot::from_json(HALL_AND_DEN).unwrap();
    layout.root = "attic".to_owned();
    let err = WatertightChecker::default()
        .check_layout(&layout, &mut NullSink)
        .unwrap_err();
    assert!(matches!(err, GraphError::UnknownLabel { ref label, .. } if label == "attic"));
}

#[test]
fn report_json_names_faces_and_policy() {
    let layout = LayoutSnapshot::from_json(HALL_AND_DEN).unwrap();
    let (report, _, _) = WatertightChecker::new(CheckConfig::strict())
        .check_layout(&layout, &mut NullSink)
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["memo_policy"], serde_json::json!("strict"));
    assert_eq!(json["watertight"], serde_json::json!(true));
    assert_eq!(
        json["verdicts"]["0"]["faces"]["north"],
        serde_json::json!({ "through_neighbor": { "neighbor": 1, "safe": true } })
    );

    let back: WatertightReport = serde_json::from_value(json).unwrap();
    assert_eq!(back, report);
}
