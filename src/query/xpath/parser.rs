//! Recursive-descent parser for the XPath subset.
//!
//! Grammar (XPath 1.0 productions, trimmed):
//!
//! ```text
//! Union      := PathExpr ('|' PathExpr)*
//! PathExpr   := LocationPath | '(' Union ')' Predicate* (('/' | '//') RelativePath)?
//! Location   := '/' RelativePath? | '//' RelativePath | RelativePath
//! Step       := (AxisName '::')? NodeTest Predicate* | '.' | '..'
//! Predicate  := '[' OrExpr ']'
//! OrExpr     := AndExpr ('or' AndExpr)*
//! AndExpr    := EqExpr ('and' EqExpr)*
//! EqExpr     := RelExpr (('=' | '!=') RelExpr)*
//! RelExpr    := AddExpr (('<' | '<=' | '>' | '>=') AddExpr)*
//! AddExpr    := Unary (('+' | '-') Unary)*
//! Unary      := '-' Unary | Primary
//! Primary    := Number | Literal | '@' Name | Function '(' args ')' | '(' OrExpr ')' | Location
//! ```

use super::lexer::Token;
use crate::utils::constants::MAX_QUERY_DEPTH;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Union(pub Vec<PathExpr>);

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PathExpr {
    Location(LocationPath),
    Filter {
        inner: Union,
        predicates: Vec<Expr>,
        rest: Vec<Step>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LocationPath {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

impl Step {
    fn descendant_or_self() -> Self {
        Step {
            axis: Axis::DescendantOrSelf,
            test: NodeTest::AnyNode,
            predicates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    SelfAxis,
    Parent,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeTest {
    /// Element with this (lowercased) name
    Name(String),
    /// `*`: any element
    AnyElement,
    /// `node()`: any node
    AnyNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CmpOp {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArithOp {
    Add,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Function {
    Contains,
    StartsWith,
    Not,
    Position,
    Last,
    NormalizeSpace,
    String,
    Count,
    True,
    False,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "contains" => Function::Contains,
            "starts-with" => Function::StartsWith,
            "not" => Function::Not,
            "position" => Function::Position,
            "last" => Function::Last,
            "normalize-space" => Function::NormalizeSpace,
            "string" => Function::String,
            "count" => Function::Count,
            "true" => Function::True,
            "false" => Function::False,
            _ => return None,
        })
    }

    /// Inclusive (min, max) argument count
    fn arity(self) -> (usize, usize) {
        match self {
            Function::Contains | Function::StartsWith => (2, 2),
            Function::Not | Function::Count => (1, 1),
            Function::NormalizeSpace | Function::String => (0, 1),
            Function::Position | Function::Last | Function::True | Function::False => (0, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Compare(CmpOp, Box<Expr>, Box<Expr>),
    Arith(ArithOp, Box<Expr>, Box<Expr>),
    Negate(Box<Expr>),
    Number(f64),
    Literal(String),
    Attribute(String),
    Call(Function, Vec<Expr>),
    Path(LocationPath),
}

pub(crate) fn parse(tokens: &[Token]) -> Result<Union, String> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let union = parser.union()?;
    match parser.peek() {
        None => Ok(union),
        Some(token) => Err(format!("unexpected {token:?} after end of expression")),
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), String> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(match self.peek() {
                Some(found) => format!("expected {expected:?}, found {found:?}"),
                None => format!("expected {expected:?}, found end of query"),
            })
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Name(name)) if name == keyword)
    }

    fn enter(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_QUERY_DEPTH {
            Err(format!("query nested deeper than {MAX_QUERY_DEPTH} levels"))
        } else {
            Ok(())
        }
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Binary operators build a left-deep tree, so each link of a chain
    /// counts as one level
    fn enter_chain(&mut self, links: &mut usize) -> Result<(), String> {
        *links += 1;
        self.enter()
    }

    fn leave_chain(&mut self, links: usize) {
        self.depth -= links;
    }

    fn union(&mut self) -> Result<Union, String> {
        let mut paths = vec![self.path_expr()?];
        while self.eat(&Token::Pipe) {
            paths.push(self.path_expr()?);
        }
        Ok(Union(paths))
    }

    fn path_expr(&mut self) -> Result<PathExpr, String> {
        if !self.eat(&Token::LParen) {
            return self.location_path().map(PathExpr::Location);
        }

        self.enter()?;
        let inner = self.union()?;
        self.expect(&Token::RParen)?;
        self.leave();

        let predicates = self.predicates()?;
        let mut rest = Vec::new();
        if self.eat(&Token::Slash) {
            self.relative_steps(&mut rest)?;
        } else if self.eat(&Token::DoubleSlash) {
            rest.push(Step::descendant_or_self());
            self.relative_steps(&mut rest)?;
        }

        Ok(PathExpr::Filter {
            inner,
            predicates,
            rest,
        })
    }

    fn at_step_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Name(_) | Token::Star | Token::Dot | Token::DotDot | Token::At)
        )
    }

    fn location_path(&mut self) -> Result<LocationPath, String> {
        let mut steps = Vec::new();

        let absolute = if self.eat(&Token::Slash) {
            if self.at_step_start() {
                self.relative_steps(&mut steps)?;
            }
            true
        } else if self.eat(&Token::DoubleSlash) {
            steps.push(Step::descendant_or_self());
            self.relative_steps(&mut steps)?;
            true
        } else {
            self.relative_steps(&mut steps)?;
            false
        };

        Ok(LocationPath { absolute, steps })
    }

    fn relative_steps(&mut self, steps: &mut Vec<Step>) -> Result<(), String> {
        loop {
            steps.push(self.step()?);
            if self.eat(&Token::Slash) {
                continue;
            }
            if self.eat(&Token::DoubleSlash) {
                steps.push(Step::descendant_or_self());
                continue;
            }
            return Ok(());
        }
    }

    fn step(&mut self) -> Result<Step, String> {
        if self.eat(&Token::Dot) {
            return Ok(Step {
                axis: Axis::SelfAxis,
                test: NodeTest::AnyNode,
                predicates: Vec::new(),
            });
        }
        if self.eat(&Token::DotDot) {
            return Ok(Step {
                axis: Axis::Parent,
                test: NodeTest::AnyNode,
                predicates: Vec::new(),
            });
        }
        if self.peek() == Some(&Token::At) {
            return Err("attribute steps select attributes, not elements".to_string());
        }

        let axis = match (self.peek(), self.peek_at(1)) {
            (Some(Token::Name(name)), Some(Token::ColonColon)) => {
                let axis = match name.as_str() {
                    "child" => Axis::Child,
                    "descendant" => Axis::Descendant,
                    "descendant-or-self" => Axis::DescendantOrSelf,
                    "self" => Axis::SelfAxis,
                    "parent" => Axis::Parent,
                    other => return Err(format!("unsupported axis '{other}'")),
                };
                self.pos += 2;
                axis
            }
            _ => Axis::Child,
        };

        let test = self.node_test()?;
        let predicates = self.predicates()?;

        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn node_test(&mut self) -> Result<NodeTest, String> {
        match self.advance().cloned() {
            Some(Token::Star) => Ok(NodeTest::AnyElement),
            Some(Token::Name(name)) => {
                if self.peek() != Some(&Token::LParen) {
                    return Ok(NodeTest::Name(name.to_ascii_lowercase()));
                }
                if name == "node" {
                    self.pos += 1;
                    self.expect(&Token::RParen)?;
                    Ok(NodeTest::AnyNode)
                } else {
                    Err(format!("unsupported node test '{name}()'"))
                }
            }
            Some(other) => Err(format!("expected a node test, found {other:?}")),
            None => Err("expected a node test, found end of query".to_string()),
        }
    }

    fn predicates(&mut self) -> Result<Vec<Expr>, String> {
        let mut predicates = Vec::new();
        while self.eat(&Token::LBracket) {
            self.enter()?;
            predicates.push(self.or_expr()?);
            self.expect(&Token::RBracket)?;
            self.leave();
        }
        Ok(predicates)
    }

    fn or_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.and_expr()?;
        let mut links = 0;
        while self.is_keyword("or") {
            self.pos += 1;
            self.enter_chain(&mut links)?;
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        self.leave_chain(links);
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.equality_expr()?;
        let mut links = 0;
        while self.is_keyword("and") {
            self.pos += 1;
            self.enter_chain(&mut links)?;
            let right = self.equality_expr()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        self.leave_chain(links);
        Ok(left)
    }

    fn equality_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.relational_expr()?;
        let mut links = 0;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => CmpOp::Eq,
                Some(Token::NotEq) => CmpOp::NotEq,
                _ => break,
            };
            self.pos += 1;
            self.enter_chain(&mut links)?;
            let right = self.relational_expr()?;
            left = Expr::Compare(op, Box::new(left), Box::new(right));
        }
        self.leave_chain(links);
        Ok(left)
    }

    fn relational_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.additive_expr()?;
        let mut links = 0;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => CmpOp::Lt,
                Some(Token::Le) => CmpOp::Le,
                Some(Token::Gt) => CmpOp::Gt,
                Some(Token::Ge) => CmpOp::Ge,
                _ => break,
            };
            self.pos += 1;
            self.enter_chain(&mut links)?;
            let right = self.additive_expr()?;
            left = Expr::Compare(op, Box::new(left), Box::new(right));
        }
        self.leave_chain(links);
        Ok(left)
    }

    fn additive_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.unary_expr()?;
        let mut links = 0;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => ArithOp::Add,
                Some(Token::Minus) => ArithOp::Sub,
                _ => break,
            };
            self.pos += 1;
            self.enter_chain(&mut links)?;
            let right = self.unary_expr()?;
            left = Expr::Arith(op, Box::new(left), Box::new(right));
        }
        self.leave_chain(links);
        Ok(left)
    }

    fn unary_expr(&mut self) -> Result<Expr, String> {
        if self.eat(&Token::Minus) {
            self.enter()?;
            let inner = self.unary_expr()?;
            self.leave();
            return Ok(Expr::Negate(Box::new(inner)));
        }
        self.primary_expr()
    }

    fn primary_expr(&mut self) -> Result<Expr, String> {
        match self.peek().cloned() {
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(Expr::Number(n))
            }
            Some(Token::Literal(s)) => {
                self.pos += 1;
                Ok(Expr::Literal(s))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                self.enter()?;
                let inner = self.or_expr()?;
                self.expect(&Token::RParen)?;
                self.leave();
                Ok(inner)
            }
            Some(Token::At) => {
                self.pos += 1;
                match self.advance().cloned() {
                    Some(Token::Name(name)) => Ok(Expr::Attribute(name.to_ascii_lowercase())),
                    Some(Token::Star) => Err("'@*' is not supported".to_string()),
                    _ => Err("expected an attribute name after '@'".to_string()),
                }
            }
            Some(Token::Name(name))
                if self.peek_at(1) == Some(&Token::LParen) && name != "node" =>
            {
                self.function_call(&name)
            }
            Some(
                Token::Slash
                | Token::DoubleSlash
                | Token::Dot
                | Token::DotDot
                | Token::Name(_)
                | Token::Star,
            ) => self.location_path().map(Expr::Path),
            Some(other) => Err(format!("unexpected {other:?} in expression")),
            None => Err("unexpected end of query in expression".to_string()),
        }
    }

    fn function_call(&mut self, name: &str) -> Result<Expr, String> {
        let function =
            Function::from_name(name).ok_or_else(|| format!("unsupported function '{name}()'"))?;
        // name and '('
        self.pos += 2;
        self.enter()?;

        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.or_expr()?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(&Token::RParen)?;
                break;
            }
        }
        self.leave();

        let (min, max) = function.arity();
        if args.len() < min || args.len() > max {
            return Err(format!(
                "{name}() takes {} argument(s), got {}",
                if min == max { min.to_string() } else { format!("{min} to {max}") },
                args.len()
            ));
        }
        if function == Function::Count && !matches!(args[0], Expr::Path(_)) {
            return Err("count() expects a location path".to_string());
        }

        Ok(Expr::Call(function, args))
    }
}
