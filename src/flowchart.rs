//! AST to flowchart graph extraction. Nodes carry advisory size hints;
//! geometry and routing belong to the rendering layer.

use serde_json::{json, Value as Json};

use crate::ast::{DataType, Declarator, DisplayItem, Stmt, StmtKind};
use crate::interpreter::{parse_program, InterpreterError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Start,
    End,
    Process,
    Io,
    Decision,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::End => "end",
            NodeKind::Process => "process",
            NodeKind::Io => "io",
            NodeKind::Decision => "decision",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: usize,
    pub kind: NodeKind,
    pub label: String,
    pub width_hint: f64,
    pub height_hint: f64,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Flowchart {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Flowchart {
    pub fn to_json(&self) -> Json {
        json!({
            "nodes": self
                .nodes
                .iter()
                .map(|n| json!({
                    "id": n.id,
                    "kind": n.kind.as_str(),
                    "label": n.label,
                    "widthHint": n.width_hint,
                    "heightHint": n.height_hint,
                }))
                .collect::<Vec<_>>(),
            "edges": self
                .edges
                .iter()
                .map(|e| {
                    let mut edge = json!({ "from": e.from, "to": e.to });
                    if let Some(label) = &e.label {
                        edge["label"] = json!(label);
                    }
                    edge
                })
                .collect::<Vec<_>>(),
        })
    }
}

pub fn generate_flowchart(source: &str) -> Result<Flowchart, InterpreterError> {
    let program = parse_program(source)?;
    Ok(build(&program))
}

/// Each module or function becomes its own Start/End subgraph; a script
/// without subroutines gets a single anonymous one.
pub fn build(program: &[Stmt]) -> Flowchart {
    let mut builder = Builder::default();
    let has_subroutines = program
        .iter()
        .any(|s| matches!(s.kind, StmtKind::Module { .. } | StmtKind::Function { .. }));

    if has_subroutines {
        for stmt in program {
            match &stmt.kind {
                StmtKind::Module { name, body, .. } => {
                    builder.subgraph(format!("Start {}", name), format!("End {}", name), body);
                }
                StmtKind::Function { name, body, .. } => {
                    builder.subgraph(
                        format!("Start Function {}", name),
                        format!("End Function {}", name),
                        body,
                    );
                }
                _ => {}
            }
        }
    } else {
        builder.subgraph("Start".to_string(), "End".to_string(), program);
    }

    builder.chart
}

/// A dangling edge waiting for its target node: source id plus edge label.
type Pending = (usize, Option<String>);

#[derive(Default)]
struct Builder {
    chart: Flowchart,
    current_subroutine_end: Option<usize>,
}

impl Builder {
    fn add_node(&mut self, kind: NodeKind, label: impl Into<String>) -> usize {
        let label = label.into();
        let chars = label.chars().count() as f64;
        let (width_hint, height_hint) = match kind {
            // Zero-sized dummy nodes keep merge topology without occupying
            // layout space.
            NodeKind::Process if label.is_empty() => (0.0, 0.0),
            NodeKind::Start | NodeKind::End => ((chars * 10.0 + 20.0).max(120.0), 40.0),
            NodeKind::Process | NodeKind::Io => (chars * 8.0 + 20.0, 40.0),
            NodeKind::Decision => (chars * 8.0 + 40.0, 60.0),
        };
        let id = self.chart.nodes.len();
        self.chart.nodes.push(Node {
            id,
            kind,
            label,
            width_hint,
            height_hint,
        });
        id
    }

    fn connect(&mut self, pending: &[Pending], to: usize) {
        for (from, label) in pending {
            self.chart.edges.push(Edge {
                from: *from,
                to,
                label: label.clone(),
            });
        }
    }

    fn subgraph(&mut self, start_label: String, end_label: String, body: &[Stmt]) {
        let start = self.add_node(NodeKind::Start, start_label);
        let end = self.add_node(NodeKind::End, end_label);
        self.current_subroutine_end = Some(end);
        let exits = self.visit_block(body, vec![(start, None)]);
        self.connect(&exits, end);
        self.current_subroutine_end = None;
    }

    fn visit_block(&mut self, body: &[Stmt], mut pending: Vec<Pending>) -> Vec<Pending> {
        for stmt in body {
            pending = self.visit_stmt(stmt, pending);
        }
        pending
    }

    fn visit_stmt(&mut self, stmt: &Stmt, pending: Vec<Pending>) -> Vec<Pending> {
        match &stmt.kind {
            StmtKind::Declaration {
                data_type,
                is_constant,
                declarators,
            } => {
                let label = declaration_label(*data_type, *is_constant, declarators);
                let node = self.add_node(NodeKind::Process, label);
                self.connect(&pending, node);
                vec![(node, None)]
            }

            StmtKind::Assignment { target, value } => {
                let node = self.add_node(NodeKind::Process, format!("Set {} = {}", target, value));
                self.connect(&pending, node);
                vec![(node, None)]
            }

            StmtKind::Display { items } => {
                let rendered: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        DisplayItem::Expr(expr) => expr.to_string(),
                        DisplayItem::Tap => "Tap".to_string(),
                    })
                    .collect();
                let node =
                    self.add_node(NodeKind::Io, format!("Display {}", rendered.join(", ")));
                self.connect(&pending, node);
                vec![(node, None)]
            }

            StmtKind::Input { name } => {
                let node = self.add_node(NodeKind::Io, format!("Input {}", name));
                self.connect(&pending, node);
                vec![(node, None)]
            }

            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let decision = self.add_node(NodeKind::Decision, condition.to_string());
                self.connect(&pending, decision);

                let then_exits =
                    self.visit_block(then_branch, vec![(decision, Some("True".to_string()))]);
                let else_exits = match else_branch {
                    Some(body) => {
                        self.visit_block(body, vec![(decision, Some("False".to_string()))])
                    }
                    None => vec![(decision, Some("False".to_string()))],
                };

                let merge = self.add_node(NodeKind::Process, "");
                self.connect(&then_exits, merge);
                self.connect(&else_exits, merge);
                vec![(merge, None)]
            }

            StmtKind::While { condition, body } => {
                let decision = self.add_node(NodeKind::Decision, condition.to_string());
                self.connect(&pending, decision);
                let body_exits =
                    self.visit_block(body, vec![(decision, Some("True".to_string()))]);
                self.connect(&body_exits, decision);
                vec![(decision, Some("False".to_string()))]
            }

            StmtKind::DoWhile { body, condition } => {
                self.do_loop(pending, body, condition, true)
            }

            StmtKind::DoUntil { body, condition } => {
                self.do_loop(pending, body, condition, false)
            }

            StmtKind::For {
                counter,
                start,
                end,
                body,
            } => {
                let init =
                    self.add_node(NodeKind::Process, format!("Set {} = {}", counter, start));
                self.connect(&pending, init);
                let decision =
                    self.add_node(NodeKind::Decision, format!("{} <= {}", counter, end));
                self.connect(&[(init, None)], decision);

                let body_exits =
                    self.visit_block(body, vec![(decision, Some("True".to_string()))]);
                let increment = self.add_node(
                    NodeKind::Process,
                    format!("Set {} = {} + 1", counter, counter),
                );
                self.connect(&body_exits, increment);
                self.connect(&[(increment, None)], decision);
                vec![(decision, Some("False".to_string()))]
            }

            StmtKind::Call { name, args } => {
                let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                let node = self.add_node(
                    NodeKind::Process,
                    format!("Call {}({})", name, rendered.join(", ")),
                );
                self.connect(&pending, node);
                vec![(node, None)]
            }

            StmtKind::Return(expr) => {
                let node = self.add_node(NodeKind::Process, format!("Return {}", expr));
                self.connect(&pending, node);
                if let Some(end) = self.current_subroutine_end {
                    self.connect(&[(node, None)], end);
                }
                // The branch terminates at the subroutine's end node.
                Vec::new()
            }

            StmtKind::Module { .. } | StmtKind::Function { .. } => pending,
        }
    }

    /// Both Do loops share the shape: dummy head, body, trailing decision,
    /// back-edge on the repeating outcome.
    fn do_loop(
        &mut self,
        pending: Vec<Pending>,
        body: &[Stmt],
        condition: &crate::ast::Expr,
        repeat_on_true: bool,
    ) -> Vec<Pending> {
        let head = self.add_node(NodeKind::Process, "");
        self.connect(&pending, head);
        let body_exits = self.visit_block(body, vec![(head, None)]);
        let decision = self.add_node(NodeKind::Decision, condition.to_string());
        self.connect(&body_exits, decision);

        let (back, out) = if repeat_on_true {
            ("True", "False")
        } else {
            ("False", "True")
        };
        self.connect(&[(decision, Some(back.to_string()))], head);
        vec![(decision, Some(out.to_string()))]
    }
}

fn declaration_label(
    data_type: DataType,
    is_constant: bool,
    declarators: &[Declarator],
) -> String {
    let keyword = if is_constant { "Constant" } else { "Declare" };
    let rendered: Vec<String> = declarators
        .iter()
        .map(|d| {
            let mut text = d.name.to_string();
            if let Some(size) = &d.size {
                text = format!("{}[{}]", text, size);
            }
            if let Some(init) = &d.initializer {
                text = format!("{} = {}", text, init);
            }
            text
        })
        .collect();
    format!("{} {} {}", keyword, data_type, rendered.join(", "))
}
