use gaddis::flowchart::{generate_flowchart, Edge, Flowchart, Node, NodeKind};

fn node<'a>(chart: &'a Flowchart, label: &str) -> &'a Node {
    chart
        .nodes
        .iter()
        .find(|n| n.label == label)
        .unwrap_or_else(|| panic!("no node labeled '{}'", label))
}

fn edge_between<'a>(chart: &'a Flowchart, from: usize, to: usize) -> &'a Edge {
    chart
        .edges
        .iter()
        .find(|e| e.from == from && e.to == to)
        .unwrap_or_else(|| panic!("no edge {} -> {}", from, to))
}

#[test]
fn test_hello_world_subgraph() {
    let chart = generate_flowchart(r#"Module main() Display "Hello, World!" End Module"#)
        .expect("should build");

    let start = node(&chart, "Start main");
    let io = node(&chart, "Display \"Hello, World!\"");
    let end = node(&chart, "End main");

    assert_eq!(start.kind, NodeKind::Start);
    assert_eq!(io.kind, NodeKind::Io);
    assert_eq!(end.kind, NodeKind::End);

    edge_between(&chart, start.id, io.id);
    edge_between(&chart, io.id, end.id);
}

#[test]
fn test_script_without_modules_gets_anonymous_subgraph() {
    let chart = generate_flowchart("Declare Integer x = 1\nDisplay x").expect("should build");
    let start = node(&chart, "Start");
    let end = node(&chart, "End");
    assert_eq!(start.kind, NodeKind::Start);
    assert_eq!(end.kind, NodeKind::End);
    assert_eq!(node(&chart, "Declare Integer x = 1").kind, NodeKind::Process);
    assert_eq!(node(&chart, "Display x").kind, NodeKind::Io);
}

#[test]
fn test_if_produces_decision_and_dummy_merge() {
    let source = "
        Module main()
           Declare Integer x = 1
           If x > 0 Then
              Display \"pos\"
           Else
              Display \"neg\"
           End If
        End Module
    ";
    let chart = generate_flowchart(source).expect("should build");
    let decision = node(&chart, "x > 0");
    assert_eq!(decision.kind, NodeKind::Decision);

    let true_edge = chart
        .edges
        .iter()
        .find(|e| e.from == decision.id && e.label.as_deref() == Some("True"))
        .expect("decision has a True edge");
    let false_edge = chart
        .edges
        .iter()
        .find(|e| e.from == decision.id && e.label.as_deref() == Some("False"))
        .expect("decision has a False edge");
    assert_eq!(chart.nodes[true_edge.to].label, "Display \"pos\"");
    assert_eq!(chart.nodes[false_edge.to].label, "Display \"neg\"");

    // Both branches merge at a zero-sized dummy node.
    let dummy = chart
        .nodes
        .iter()
        .find(|n| n.label.is_empty() && n.kind == NodeKind::Process)
        .expect("merge dummy exists");
    assert_eq!(dummy.width_hint, 0.0);
    assert_eq!(dummy.height_hint, 0.0);
    edge_between(&chart, true_edge.to, dummy.id);
    edge_between(&chart, false_edge.to, dummy.id);
}

#[test]
fn test_if_without_else_routes_false_to_merge() {
    let source = "
        Module main()
           If 1 Then
              Display \"y\"
           End If
        End Module
    ";
    let chart = generate_flowchart(source).expect("should build");
    let decision = node(&chart, "1");
    let dummy = chart
        .nodes
        .iter()
        .find(|n| n.label.is_empty())
        .expect("merge dummy");
    let false_edge = edge_between(&chart, decision.id, dummy.id);
    assert_eq!(false_edge.label.as_deref(), Some("False"));
}

#[test]
fn test_while_loops_back_to_decision() {
    let source = "
        Module main()
           Declare Integer x = 0
           While x < 3
              Set x = x + 1
           End While
        End Module
    ";
    let chart = generate_flowchart(source).expect("should build");
    let decision = node(&chart, "x < 3");
    let body = node(&chart, "Set x = x + 1");

    let into_body = edge_between(&chart, decision.id, body.id);
    assert_eq!(into_body.label.as_deref(), Some("True"));
    // Back edge carries no label.
    let back = edge_between(&chart, body.id, decision.id);
    assert!(back.label.is_none());
    // Exit is the decision's False edge to the module end.
    let end = node(&chart, "End main");
    let exit = edge_between(&chart, decision.id, end.id);
    assert_eq!(exit.label.as_deref(), Some("False"));
}

#[test]
fn test_do_until_back_edge_is_false() {
    let source = "
        Module main()
           Declare Integer x = 0
           Do
              Set x = x + 1
           Until x > 2
        End Module
    ";
    let chart = generate_flowchart(source).expect("should build");
    let decision = node(&chart, "x > 2");
    let head = chart
        .nodes
        .iter()
        .find(|n| n.label.is_empty())
        .expect("loop head dummy");
    let back = edge_between(&chart, decision.id, head.id);
    assert_eq!(back.label.as_deref(), Some("False"));
}

#[test]
fn test_for_loop_shape() {
    let source = "
        Module main()
           For i = 1 To 3
              Display i
           End For
        End Module
    ";
    let chart = generate_flowchart(source).expect("should build");
    let init = node(&chart, "Set i = 1");
    let decision = node(&chart, "i <= 3");
    let increment = node(&chart, "Set i = i + 1");

    assert_eq!(init.kind, NodeKind::Process);
    assert_eq!(decision.kind, NodeKind::Decision);
    edge_between(&chart, init.id, decision.id);
    edge_between(&chart, increment.id, decision.id);

    let body = node(&chart, "Display i");
    edge_between(&chart, body.id, increment.id);
}

#[test]
fn test_function_return_connects_to_end() {
    let source = "
        Function Integer double(Integer n)
           Return n * 2
        End Function
        Module main()
           Display double(4)
        End Module
    ";
    let chart = generate_flowchart(source).expect("should build");
    let ret = node(&chart, "Return n * 2");
    let end = node(&chart, "End Function double");
    assert_eq!(ret.kind, NodeKind::Process);
    edge_between(&chart, ret.id, end.id);
    // Both subgraphs are present.
    node(&chart, "Start Function double");
    node(&chart, "Start main");
}

#[test]
fn test_call_and_input_node_kinds() {
    let source = "
        Module work(Integer n)
           Display n
        End Module
        Module main()
           Declare Integer x
           Input x
           Call work(x)
        End Module
    ";
    let chart = generate_flowchart(source).expect("should build");
    assert_eq!(node(&chart, "Input x").kind, NodeKind::Io);
    assert_eq!(node(&chart, "Call work(x)").kind, NodeKind::Process);
}

#[test]
fn test_expression_labels_mirror_source() {
    let source = "
        Module main()
           Declare Integer nums[3] = 1, 2, 3
           Set nums[0] = nums[1] + nums[2] * 2
        End Module
    ";
    let chart = generate_flowchart(source).expect("should build");
    node(&chart, "Declare Integer nums[3] = 1, 2, 3");
    node(&chart, "Set nums[0] = nums[1] + nums[2] * 2");
}

#[test]
fn test_json_shape() {
    let chart = generate_flowchart(r#"Module main() Display "x" End Module"#).expect("builds");
    let json = chart.to_json();

    let nodes = json["nodes"].as_array().expect("nodes array");
    assert_eq!(nodes.len(), chart.nodes.len());
    for entry in nodes {
        assert!(entry["id"].is_u64());
        assert!(entry["kind"].is_string());
        assert!(entry["label"].is_string());
        assert!(entry["widthHint"].is_number());
        assert!(entry["heightHint"].is_number());
    }

    let edges = json["edges"].as_array().expect("edges array");
    assert_eq!(edges.len(), chart.edges.len());
    for entry in edges {
        assert!(entry["from"].is_u64());
        assert!(entry["to"].is_u64());
    }
}

#[test]
fn test_syntax_errors_propagate() {
    assert!(generate_flowchart("If 1 Then").is_err());
}
