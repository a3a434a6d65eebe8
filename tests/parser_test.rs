use pretty_assertions::assert_eq;
use proptest::prelude::*;

use flownote::{Edge, NodeInfo, parse_diagram};

fn edge(source: &str, target: &str, action: &str) -> Edge {
    Edge {
        source: source.to_string(),
        target: target.to_string(),
        action: action.to_string(),
    }
}

// =============================================================================
// Edges
// =============================================================================

#[test]
fn edge_creates_both_nodes() {
    let d = parse_diagram("A --> B\n");
    assert_eq!(d.nodes.len(), 2);
    assert_eq!(d.nodes["A"], NodeInfo::bare("A", None));
    assert_eq!(d.nodes["B"], NodeInfo::bare("B", None));
    assert_eq!(d.edges, vec![edge("A", "B", "")]);
}

#[test]
fn edge_inline_label_becomes_action() {
    let d = parse_diagram("A --act--> B\n");
    assert_eq!(d.edges, vec![edge("A", "B", "act")]);
    assert_eq!(d.nodes["A"].action, vec!["To B: act"]);
    assert_eq!(d.nodes["B"].action, vec!["From A: act"]);
}

#[test]
fn edge_pipe_label_becomes_action() {
    let d = parse_diagram("A -->|  approve  | B\n");
    assert_eq!(d.edges, vec![edge("A", "B", "approve")]);
    assert_eq!(d.nodes["A"].action, vec!["To B: approve"]);
}

#[test]
fn edge_without_label_adds_no_action() {
    let d = parse_diagram("A --> B\nA -->|| C\n");
    assert!(d.nodes["A"].action.is_empty());
    assert_eq!(d.edges[1], edge("A", "C", ""));
}

#[test]
fn edge_site_labels_are_discarded() {
    let d = parse_diagram("A[Start] --go--> B[End]");
    assert_eq!(d.nodes["A"].label, "A");
    assert_eq!(d.nodes["B"].label, "B");
    assert_eq!(d.edges, vec![edge("A", "B", "go")]);
}

#[test]
fn actions_accumulate_in_edge_order() {
    let d = parse_diagram("A --one--> B\nC --two--> A\nA --three--> C\n");
    assert_eq!(
        d.nodes["A"].action,
        vec!["To B: one", "From C: two", "To C: three"]
    );
}

#[test]
fn self_loop_records_both_directions() {
    let d = parse_diagram("A --retry--> A");
    assert_eq!(d.nodes.len(), 1);
    assert_eq!(d.nodes["A"].action, vec!["To A: retry", "From A: retry"]);
}

#[test]
fn text_after_target_is_ignored() {
    let d = parse_diagram("A --> B --> C");
    assert_eq!(d.edges, vec![edge("A", "B", "")]);
    assert!(d.node("C").is_none());
}

#[test]
fn empty_edge_site_labels_keep_the_edge() {
    let d = parse_diagram("A[] --go--> B\nC --> D()\nE() --> F\n");
    assert_eq!(
        d.edges,
        vec![edge("A", "B", "go"), edge("C", "D", ""), edge("E", "F", "")]
    );
    assert_eq!(
        d.nodes["A"],
        NodeInfo {
            id: "A".to_string(),
            label: "A".to_string(),
            action: vec!["To B: go".to_string()],
            subgraph: None,
        }
    );
    assert_eq!(d.nodes.len(), 6);
}

// =============================================================================
// Node definitions
// =============================================================================

#[test]
fn empty_node_definition_sets_empty_label() {
    let d = parse_diagram("subgraph G\n  A[]\n  B( )\nend\n");
    assert_eq!(d.nodes["A"].label, "");
    assert_eq!(d.nodes["B"].label, "");
    assert_eq!(d.nodes["A"].subgraph.as_deref(), Some("G"));
    assert_eq!(d.subgraphs["G"], vec!["A", "B"]);
}

#[test]
fn node_definition_sets_label() {
    let d = parse_diagram("X[Label]\nY(Round label)\n");
    assert_eq!(d.nodes["X"].label, "Label");
    assert_eq!(d.nodes["X"].subgraph, None);
    assert_eq!(d.nodes["Y"].label, "Round label");
}

#[test]
fn node_definition_after_edge_keeps_actions() {
    let d = parse_diagram("A --go--> B\nA[Start]\n");
    assert_eq!(d.nodes["A"].label, "Start");
    assert_eq!(d.nodes["A"].action, vec!["To B: go"]);
}

#[test]
fn node_redefinition_overwrites_label() {
    let d = parse_diagram("A[First]\nA[Second]\n");
    assert_eq!(d.nodes["A"].label, "Second");
}

// =============================================================================
// Subgraphs
// =============================================================================

#[test]
fn node_in_subgraph() {
    let d = parse_diagram("subgraph \"G\"\n  X[Label]\nend\n");
    assert_eq!(d.nodes["X"].subgraph.as_deref(), Some("G"));
    assert_eq!(d.subgraphs["G"], vec!["X"]);
}

#[test]
fn edge_nodes_join_subgraph_but_not_registry() {
    let d = parse_diagram("subgraph Team\n  A --> B\nend\n");
    assert_eq!(d.nodes["A"].subgraph.as_deref(), Some("Team"));
    assert_eq!(d.nodes["B"].subgraph.as_deref(), Some("Team"));
    assert!(d.subgraphs["Team"].is_empty());
}

#[test]
fn edge_outside_subgraph_keeps_membership() {
    let d = parse_diagram("subgraph Team\n  A[Agent]\nend\nA --> B\n");
    assert_eq!(d.nodes["A"].subgraph.as_deref(), Some("Team"));
    assert_eq!(d.nodes["B"].subgraph, None);
}

#[test]
fn node_definition_outside_subgraph_clears_membership() {
    let d = parse_diagram("subgraph Team\n  A[Agent]\nend\nA[Agent]\n");
    assert_eq!(d.nodes["A"].subgraph, None);
    assert_eq!(d.subgraphs["Team"], vec!["A"]);
}

#[test]
fn subgraph_open_replaces_context() {
    let d = parse_diagram("subgraph One\nsubgraph Two\n  A[x]\nend\nB[y]\n");
    assert_eq!(d.nodes["A"].subgraph.as_deref(), Some("Two"));
    assert_eq!(d.nodes["B"].subgraph, None);
    assert!(d.subgraphs["One"].is_empty());
}

#[test]
fn subgraph_registry_allows_duplicates() {
    let d = parse_diagram("subgraph G\n  A[x]\n  A[y]\nend\n");
    assert_eq!(d.subgraphs["G"], vec!["A", "A"]);
}

// =============================================================================
// Skipped lines
// =============================================================================

#[test]
fn comments_and_styles_are_skipped() {
    let input = "\
graph TD
%% A[Hidden]
// B[Hidden]
style C fill:#f9f
classDef warm fill:#fc0
D[Shown]
";
    let d = parse_diagram(input);
    assert_eq!(d.nodes.keys().collect::<Vec<_>>(), vec!["D"]);
}

#[test]
fn malformed_lines_are_dropped() {
    let input = "\
A[Start --> B
C -- missing arrow D
E --> F
-->
[orphan]
";
    let d = parse_diagram(input);
    assert_eq!(d.edges, vec![edge("E", "F", "")]);
    assert_eq!(d.nodes.len(), 2);
}

#[test]
fn crlf_and_indentation() {
    let d = parse_diagram("  subgraph G\r\n    A[One]\r\n  end\r\n  A --x--> B\r\n");
    assert_eq!(d.nodes["A"].label, "One");
    assert_eq!(d.subgraphs["G"], vec!["A"]);
    assert_eq!(d.edges, vec![edge("A", "B", "x")]);
}

#[test]
fn workflow_example() {
    let input = "\
flowchart LR
subgraph \"Intake\"
  T[Ticket]
  Q(Queue)
end
subgraph Agents
  H[Human agent]
  AI[AI agent]
end
T --> Q
Q --route--> AI
AI -->|escalate| H
";
    let d = parse_diagram(input);
    assert_eq!(d.subgraphs["Intake"], vec!["T", "Q"]);
    assert_eq!(d.subgraphs["Agents"], vec!["H", "AI"]);
    assert_eq!(d.nodes["AI"].label, "AI agent");
    assert_eq!(d.nodes["AI"].subgraph.as_deref(), Some("Agents"));
    assert_eq!(d.nodes["AI"].action, vec!["From Q: route", "To H: escalate"]);
    assert_eq!(
        d.edges,
        vec![
            edge("T", "Q", ""),
            edge("Q", "AI", "route"),
            edge("AI", "H", "escalate"),
        ]
    );
}

// =============================================================================
// Properties
// =============================================================================

fn diagram_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            "subgraph [A-Z]{1,3}",
            "end",
            "[A-D] --[a-z]{0,3}--> [A-D]",
            "[A-D] -->\\|[a-z ]{0,4}\\| [A-D]",
            "[A-D]\\[[a-z ]{0,5}\\]",
            "[A-D]\\(\\)",
            "(.|\n){0,20}",
        ],
        0..30,
    )
    .prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn prop_parse_is_deterministic(input in "(.|\n){0,200}") {
        prop_assert_eq!(parse_diagram(&input), parse_diagram(&input));
    }

    #[test]
    fn prop_multiline_parse_is_deterministic(input in diagram_text()) {
        prop_assert_eq!(parse_diagram(&input), parse_diagram(&input));
    }

    #[test]
    fn prop_subgraph_members_are_nodes(input in diagram_text()) {
        let d = parse_diagram(&input);
        for ids in d.subgraphs.values() {
            for id in ids {
                prop_assert!(d.nodes.contains_key(id));
            }
        }
        for e in &d.edges {
            prop_assert!(d.nodes.contains_key(&e.source));
            prop_assert!(d.nodes.contains_key(&e.target));
        }
    }

    #[test]
    fn prop_labeled_edge_is_recorded(
        a in "[A-Za-z][A-Za-z0-9_]{0,8}",
        b in "[A-Za-z][A-Za-z0-9_]{0,8}",
        act in "[a-z][a-z ]{0,10}[a-z]",
    ) {
        prop_assume!(a != "subgraph" && !a.starts_with("style"));
        let d = parse_diagram(&format!("{a} --{act}--> {b}"));
        prop_assert!(d.nodes.contains_key(&a));
        prop_assert!(d.nodes.contains_key(&b));
        prop_assert_eq!(d.edges.clone(), vec![edge(&a, &b, &act)]);
        let to = format!("To {b}: {act}");
        let from = format!("From {a}: {act}");
        prop_assert!(d.nodes[&a].action.contains(&to));
        prop_assert!(d.nodes[&b].action.contains(&from));
    }
}
