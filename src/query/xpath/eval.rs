//! Evaluation of parsed XPath expressions over a [`ParsedDocument`].

use ego_tree::{NodeId, NodeRef};
use scraper::node::Node;

use super::parser::{ArithOp, Axis, CmpOp, Expr, Function, LocationPath, NodeTest, PathExpr, Step, Union};
use crate::document::ParsedDocument;

/// Intermediate value of a predicate expression
#[derive(Debug, Clone)]
enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Nodes(Vec<NodeId>),
    /// Result of `@name`: an attribute node-set with zero or one member
    Attribute(Option<String>),
}

/// Scalar taking part in a comparison
enum Atom {
    Number(f64),
    String(String),
}

#[derive(Clone, Copy)]
struct Context {
    node: NodeId,
    position: usize,
    size: usize,
}

pub(crate) struct Evaluator<'d> {
    doc: &'d ParsedDocument,
}

impl<'d> Evaluator<'d> {
    pub(crate) fn new(doc: &'d ParsedDocument) -> Self {
        Self { doc }
    }

    /// Evaluate a query from the document node; element results only, in document order
    pub(crate) fn select(&self, union: &Union) -> Vec<NodeId> {
        let root = self.doc.root().id();
        let mut nodes = self.union(union, root);
        nodes.retain(|id| self.doc.node(*id).is_some_and(|node| node.value().is_element()));
        nodes
    }

    fn union(&self, union: &Union, context: NodeId) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = union
            .0
            .iter()
            .flat_map(|path| self.path_expr(path, context))
            .collect();
        self.doc.sort_document_order(&mut nodes);
        nodes
    }

    fn path_expr(&self, path: &PathExpr, context: NodeId) -> Vec<NodeId> {
        match path {
            PathExpr::Location(location) => self.location_path(location, context),
            PathExpr::Filter {
                inner,
                predicates,
                rest,
            } => {
                let nodes = self.filter(self.union(inner, context), predicates);
                self.steps(nodes, rest)
            }
        }
    }

    fn location_path(&self, path: &LocationPath, context: NodeId) -> Vec<NodeId> {
        let start = if path.absolute {
            self.doc.root().id()
        } else {
            context
        };
        self.steps(vec![start], &path.steps)
    }

    fn steps(&self, mut current: Vec<NodeId>, steps: &[Step]) -> Vec<NodeId> {
        for step in steps {
            if current.is_empty() {
                break;
            }
            let mut next: Vec<NodeId> = current
                .iter()
                .flat_map(|&context| self.step(step, context))
                .collect();
            self.doc.sort_document_order(&mut next);
            current = next;
        }
        current
    }

    /// Apply one step to one context node; positions are counted along the axis
    fn step(&self, step: &Step, context: NodeId) -> Vec<NodeId> {
        let Some(node) = self.doc.node(context) else {
            return Vec::new();
        };

        let candidates: Vec<NodeId> = axis_nodes(step.axis, node)
            .into_iter()
            .filter(|candidate| node_test(&step.test, *candidate))
            .map(|candidate| candidate.id())
            .collect();

        self.filter(candidates, &step.predicates)
    }

    fn filter(&self, mut nodes: Vec<NodeId>, predicates: &[Expr]) -> Vec<NodeId> {
        for predicate in predicates {
            let size = nodes.len();
            nodes = nodes
                .into_iter()
                .enumerate()
                .filter(|&(index, node)| {
                    let context = Context {
                        node,
                        position: index + 1,
                        size,
                    };
                    match self.eval(predicate, context) {
                        Value::Number(n) => n == context.position as f64,
                        other => self.boolean(&other),
                    }
                })
                .map(|(_, node)| node)
                .collect();
        }
        nodes
    }

    fn eval(&self, expr: &Expr, context: Context) -> Value {
        match expr {
            Expr::Or(left, right) => Value::Boolean(
                self.boolean(&self.eval(left, context)) || self.boolean(&self.eval(right, context)),
            ),
            Expr::And(left, right) => Value::Boolean(
                self.boolean(&self.eval(left, context)) && self.boolean(&self.eval(right, context)),
            ),
            Expr::Compare(op, left, right) => {
                let left = self.eval(left, context);
                let right = self.eval(right, context);
                Value::Boolean(self.compare(*op, &left, &right))
            }
            Expr::Arith(op, left, right) => {
                let left = self.number(&self.eval(left, context));
                let right = self.number(&self.eval(right, context));
                Value::Number(match op {
                    ArithOp::Add => left + right,
                    ArithOp::Sub => left - right,
                })
            }
            Expr::Negate(inner) => Value::Number(-self.number(&self.eval(inner, context))),
            Expr::Number(n) => Value::Number(*n),
            Expr::Literal(s) => Value::String(s.clone()),
            Expr::Attribute(name) => Value::Attribute(self.attribute(context.node, name)),
            Expr::Path(path) => Value::Nodes(self.location_path(path, context.node)),
            Expr::Call(function, args) => self.call(*function, args, context),
        }
    }

    fn call(&self, function: Function, args: &[Expr], context: Context) -> Value {
        let arg_string = |index: usize| match args.get(index) {
            Some(arg) => self.string(&self.eval(arg, context)),
            None => self.node_string(context.node),
        };

        match function {
            Function::Contains => Value::Boolean(arg_string(0).contains(&arg_string(1))),
            Function::StartsWith => Value::Boolean(arg_string(0).starts_with(&arg_string(1))),
            Function::Not => Value::Boolean(!args.first().is_some_and(|arg| self.boolean(&self.eval(arg, context)))),
            Function::Position => Value::Number(context.position as f64),
            Function::Last => Value::Number(context.size as f64),
            Function::NormalizeSpace => Value::String(
                arg_string(0).split_whitespace().collect::<Vec<_>>().join(" "),
            ),
            Function::String => Value::String(arg_string(0)),
            Function::Count => match args.first().map(|arg| self.eval(arg, context)) {
                Some(Value::Nodes(nodes)) => Value::Number(nodes.len() as f64),
                _ => Value::Number(0.0),
            },
            Function::True => Value::Boolean(true),
            Function::False => Value::Boolean(false),
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let node = self.doc.node(node)?;
        let Node::Element(element) = node.value() else {
            return None;
        };
        element
            .attrs()
            .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.to_string())
    }

    /// XPath string-value of a node: its text, or the text of its descendants
    fn node_string(&self, node: NodeId) -> String {
        let Some(node) = self.doc.node(node) else {
            return String::new();
        };
        let mut out = String::new();
        for descendant in node.descendants() {
            if let Node::Text(text) = descendant.value() {
                out.push_str(text);
            }
        }
        out
    }

    fn boolean(&self, value: &Value) -> bool {
        match value {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
            Value::Nodes(nodes) => !nodes.is_empty(),
            Value::Attribute(attr) => attr.is_some(),
        }
    }

    fn string(&self, value: &Value) -> String {
        match value {
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Boolean(b) => b.to_string(),
            Value::Nodes(nodes) => nodes
                .first()
                .map(|node| self.node_string(*node))
                .unwrap_or_default(),
            Value::Attribute(attr) => attr.clone().unwrap_or_default(),
        }
    }

    fn number(&self, value: &Value) -> f64 {
        match value {
            Value::Number(n) => *n,
            Value::Boolean(b) => f64::from(u8::from(*b)),
            other => parse_number(&self.string(other)),
        }
    }

    fn atoms(&self, value: &Value) -> Vec<Atom> {
        match value {
            Value::Number(n) => vec![Atom::Number(*n)],
            Value::String(s) => vec![Atom::String(s.clone())],
            Value::Boolean(b) => vec![Atom::Number(f64::from(u8::from(*b)))],
            Value::Nodes(nodes) => nodes
                .iter()
                .map(|node| Atom::String(self.node_string(*node)))
                .collect(),
            Value::Attribute(attr) => attr.iter().cloned().map(Atom::String).collect(),
        }
    }

    /// Node-sets compare existentially: true if any member satisfies the comparison
    fn compare(&self, op: CmpOp, left: &Value, right: &Value) -> bool {
        if matches!(left, Value::Boolean(_)) || matches!(right, Value::Boolean(_)) {
            let left = f64::from(u8::from(self.boolean(left)));
            let right = f64::from(u8::from(self.boolean(right)));
            return compare_numbers(op, left, right);
        }

        let lefts = self.atoms(left);
        let rights = self.atoms(right);
        lefts
            .iter()
            .any(|l| rights.iter().any(|r| compare_atoms(op, l, r)))
    }
}

fn axis_nodes(axis: Axis, node: NodeRef<'_, Node>) -> Vec<NodeRef<'_, Node>> {
    match axis {
        Axis::Child => node.children().collect(),
        Axis::Descendant => node.descendants().skip(1).collect(),
        Axis::DescendantOrSelf => node.descendants().collect(),
        Axis::SelfAxis => vec![node],
        Axis::Parent => node.parent().into_iter().collect(),
    }
}

fn node_test(test: &NodeTest, node: NodeRef<'_, Node>) -> bool {
    match test {
        NodeTest::AnyNode => true,
        NodeTest::AnyElement => node.value().is_element(),
        NodeTest::Name(name) => match node.value() {
            Node::Element(element) => element.name().eq_ignore_ascii_case(name),
            _ => false,
        },
    }
}

fn compare_atoms(op: CmpOp, left: &Atom, right: &Atom) -> bool {
    match (op, left, right) {
        (CmpOp::Eq, Atom::String(l), Atom::String(r)) => l == r,
        (CmpOp::NotEq, Atom::String(l), Atom::String(r)) => l != r,
        _ => compare_numbers(op, atom_number(left), atom_number(right)),
    }
}

fn atom_number(atom: &Atom) -> f64 {
    match atom {
        Atom::Number(n) => *n,
        Atom::String(s) => parse_number(s),
    }
}

fn compare_numbers(op: CmpOp, left: f64, right: f64) -> bool {
    match op {
        CmpOp::Eq => left == right,
        CmpOp::NotEq => left != right,
        CmpOp::Lt => left < right,
        CmpOp::Le => left <= right,
        CmpOp::Gt => left > right,
        CmpOp::Ge => left >= right,
    }
}

fn parse_number(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.fract() == 0.0 && n.is_finite() {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}
