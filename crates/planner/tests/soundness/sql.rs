//! Evaluates the where clauses the compiler emits for the integer schema of
//! these tests, with PostgreSQL semantics: integer division truncates, casts
//! convert, `LIKE` honours its `ESCAPE` character.

use model::core::value::Value;
use std::{cmp::Ordering, collections::BTreeMap, iter::Peekable, str::Chars};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    Param,
    Cast,
    Op(String),
    Word(String),
    Number(i64),
    Str(String),
}

fn tokenize(sql: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = sql.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '?' => {
                chars.next();
                tokens.push(Token::Param);
            }
            '\'' => {
                chars.next();
                let text: String = chars.by_ref().take_while(|c| *c != '\'').collect();
                tokens.push(Token::Str(text));
            }
            ':' => {
                chars.next();
                assert_eq!(chars.next(), Some(':'), "lone colon in {sql}");
                tokens.push(Token::Cast);
            }
            '<' | '>' | '=' | '+' | '-' | '*' | '/' => {
                chars.next();
                let mut op = c.to_string();
                if let Some(&next) = chars.peek()
                    && matches!((c, next), ('<', '=') | ('>', '=') | ('<', '>'))
                {
                    op.push(next);
                    chars.next();
                }
                tokens.push(Token::Op(op));
            }
            c if c.is_ascii_digit() => {
                let digits = read_while(&mut chars, |c| c.is_ascii_digit());
                tokens.push(Token::Number(digits.parse().unwrap()));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let word = read_while(&mut chars, |c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
                tokens.push(Token::Word(word));
            }
            other => panic!("unexpected character {other:?} in {sql}"),
        }
    }
    tokens
}

fn read_while(chars: &mut Peekable<Chars<'_>>, accept: impl Fn(char) -> bool) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if !accept(c) {
            break;
        }
        out.push(c);
        chars.next();
    }
    out
}

/// Parsed where clause.
#[derive(Debug, Clone)]
pub enum Sql {
    Column(String),
    Param(usize),
    Number(i64),
    Cast(Box<Sql>, String),
    Arith(String, Box<Sql>, Box<Sql>),
    Compare(String, Box<Sql>, Box<Sql>),
    Between(Box<Sql>, Box<Sql>, Box<Sql>),
    Like(Box<Sql>, Box<Sql>, char),
    And(Box<Sql>, Box<Sql>),
    Or(Box<Sql>, Box<Sql>),
    Not(Box<Sql>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    params: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        token
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.peek() == Some(&Token::Word(word.to_string())) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_op(&mut self, ops: &[&str]) -> Option<String> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(&op.as_str()) => {
                let op = op.clone();
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    fn disjunction(&mut self) -> Sql {
        let mut left = self.conjunction();
        while self.eat_word("OR") {
            left = Sql::Or(Box::new(left), Box::new(self.conjunction()));
        }
        left
    }

    fn conjunction(&mut self) -> Sql {
        let mut left = self.negation();
        while self.eat_word("AND") {
            left = Sql::And(Box::new(left), Box::new(self.negation()));
        }
        left
    }

    fn negation(&mut self) -> Sql {
        if self.eat_word("NOT") {
            Sql::Not(Box::new(self.negation()))
        } else {
            self.predicate()
        }
    }

    fn predicate(&mut self) -> Sql {
        let left = self.additive();
        if let Some(op) = self.eat_op(&["=", "<>", "<", ">", "<=", ">="]) {
            return Sql::Compare(op, Box::new(left), Box::new(self.additive()));
        }
        if self.eat_word("BETWEEN") {
            let lower = self.additive();
            assert!(self.eat_word("AND"), "BETWEEN without AND");
            let upper = self.additive();
            return Sql::Between(Box::new(left), Box::new(lower), Box::new(upper));
        }
        if self.eat_word("LIKE") {
            let pattern = self.additive();
            assert!(self.eat_word("ESCAPE"), "LIKE without ESCAPE");
            let Token::Str(escape) = self.next() else {
                panic!("ESCAPE without a character");
            };
            let escape = escape.chars().next().unwrap_or('\\');
            return Sql::Like(Box::new(left), Box::new(pattern), escape);
        }
        left
    }

    fn additive(&mut self) -> Sql {
        let mut left = self.multiplicative();
        while let Some(op) = self.eat_op(&["+", "-"]) {
            left = Sql::Arith(op, Box::new(left), Box::new(self.multiplicative()));
        }
        left
    }

    fn multiplicative(&mut self) -> Sql {
        let mut left = self.cast();
        while let Some(op) = self.eat_op(&["*", "/"]) {
            left = Sql::Arith(op, Box::new(left), Box::new(self.cast()));
        }
        left
    }

    fn cast(&mut self) -> Sql {
        let mut expr = self.primary();
        while self.peek() == Some(&Token::Cast) {
            self.pos += 1;
            let Token::Word(mut target) = self.next() else {
                panic!("cast without a type");
            };
            if target == "DOUBLE" && self.eat_word("PRECISION") {
                target.push_str(" PRECISION");
            }
            expr = Sql::Cast(Box::new(expr), target);
        }
        expr
    }

    fn primary(&mut self) -> Sql {
        match self.next() {
            Token::Open => {
                let inner = self.disjunction();
                assert_eq!(self.next(), Token::Close);
                inner
            }
            Token::Param => {
                self.params += 1;
                Sql::Param(self.params - 1)
            }
            Token::Number(n) => Sql::Number(n),
            Token::Word(column) => Sql::Column(column),
            other => panic!("unexpected token {other:?}"),
        }
    }
}

/// Parses generic (`?` placeholder) SQL text.
pub fn parse(sql: &str) -> Sql {
    let mut parser = Parser {
        tokens: tokenize(sql),
        pos: 0,
        params: 0,
    };
    let parsed = parser.disjunction();
    assert_eq!(parser.pos, parser.tokens.len(), "trailing tokens in {sql}");
    parsed
}

#[derive(Debug, Clone, PartialEq)]
enum Datum {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Datum {
    fn as_f64(&self) -> f64 {
        match self {
            Datum::Int(v) => *v as f64,
            Datum::Float(v) => *v,
            other => panic!("{other:?} is not numeric"),
        }
    }

    fn as_bool(&self) -> bool {
        match self {
            Datum::Bool(b) => *b,
            other => panic!("{other:?} is not boolean"),
        }
    }

    fn compare(&self, other: &Datum) -> Ordering {
        match (self, other) {
            (Datum::Int(a), Datum::Int(b)) => a.cmp(b),
            (Datum::Text(a), Datum::Text(b)) => a.cmp(b),
            (a, b) => a.as_f64().total_cmp(&b.as_f64()),
        }
    }
}

/// Evaluates `sql` against one row; columns are `t0.<lowercase property>`.
pub fn eval(sql: &Sql, params: &[Value], row: &BTreeMap<&'static str, i64>) -> bool {
    datum(sql, params, row).as_bool()
}

fn datum(sql: &Sql, params: &[Value], row: &BTreeMap<&'static str, i64>) -> Datum {
    let eval = |s: &Sql| datum(s, params, row);
    match sql {
        Sql::Column(name) => {
            let property = name.rsplit('.').next().unwrap_or(name).to_uppercase();
            Datum::Int(row[property.as_str()])
        }
        Sql::Param(i) => match &params[*i] {
            Value::Int(v) => Datum::Int(*v),
            Value::Float(v) => Datum::Float(*v),
            Value::String(s) => Datum::Text(s.clone()),
            other => panic!("unexpected parameter {other:?}"),
        },
        Sql::Number(n) => Datum::Int(*n),
        Sql::Cast(inner, target) => match (eval(inner), target.as_str()) {
            (Datum::Int(v), "TEXT") => Datum::Text(v.to_string()),
            (d, "DOUBLE PRECISION") => Datum::Float(d.as_f64()),
            (d, "BIGINT") => Datum::Int(d.as_f64() as i64),
            (d, t) => panic!("unsupported cast of {d:?} to {t}"),
        },
        Sql::Arith(op, l, r) => match (eval(l), eval(r)) {
            (Datum::Int(a), Datum::Int(b)) => Datum::Int(match op.as_str() {
                "+" => a + b,
                "-" => a - b,
                "*" => a * b,
                // Truncates toward zero, like PostgreSQL.
                _ => a / b,
            }),
            (a, b) => {
                let (a, b) = (a.as_f64(), b.as_f64());
                Datum::Float(match op.as_str() {
                    "+" => a + b,
                    "-" => a - b,
                    "*" => a * b,
                    _ => a / b,
                })
            }
        },
        Sql::Compare(op, l, r) => {
            let ord = eval(l).compare(&eval(r));
            Datum::Bool(match op.as_str() {
                "=" => ord.is_eq(),
                "<>" => ord.is_ne(),
                "<" => ord.is_lt(),
                ">" => ord.is_gt(),
                "<=" => ord.is_le(),
                _ => ord.is_ge(),
            })
        }
        Sql::Between(v, lo, hi) => {
            let v = eval(v);
            Datum::Bool(eval(lo).compare(&v).is_le() && v.compare(&eval(hi)).is_le())
        }
        Sql::Like(text, pattern, escape) => match (eval(text), eval(pattern)) {
            (Datum::Text(text), Datum::Text(pattern)) => {
                Datum::Bool(like_match(&text, &pattern, '%', '_', *escape))
            }
            other => panic!("LIKE over {other:?}"),
        },
        Sql::And(l, r) => Datum::Bool(eval(l).as_bool() && eval(r).as_bool()),
        Sql::Or(l, r) => Datum::Bool(eval(l).as_bool() || eval(r).as_bool()),
        Sql::Not(inner) => Datum::Bool(!eval(inner).as_bool()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Glob {
    Many,
    One,
    Char(char),
}

/// Pattern match with configurable wildcard, single character and escape.
pub fn like_match(text: &str, pattern: &str, many: char, one: char, escape: char) -> bool {
    let mut globs = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        globs.push(match c {
            c if c == escape => Glob::Char(chars.next().unwrap_or(escape)),
            c if c == many => Glob::Many,
            c if c == one => Glob::One,
            c => Glob::Char(c),
        });
    }
    let text: Vec<char> = text.chars().collect();
    matches(&text, &globs)
}

fn matches(text: &[char], globs: &[Glob]) -> bool {
    match globs.split_first() {
        None => text.is_empty(),
        Some((Glob::Many, rest)) => (0..=text.len()).any(|i| matches(&text[i..], rest)),
        Some((Glob::One, rest)) => !text.is_empty() && matches(&text[1..], rest),
        Some((Glob::Char(c), rest)) => text.first() == Some(c) && matches(&text[1..], rest),
    }
}

#[test]
fn test_interpreter_truncates_integer_division() {
    let row = BTreeMap::from([("A", 3)]);
    let params = [Value::Int(2), Value::Int(1)];

    assert!(!eval(&parse("(t0.a / ?) > ?"), &params, &row));
    assert!(eval(&parse("(t0.a::DOUBLE PRECISION / ?) > ?"), &params, &row));
}

#[test]
fn test_interpreter_between_inside_conjunction() {
    let row = BTreeMap::from([("A", 3), ("B", -1)]);
    let sql = parse("(t0.a BETWEEN ? AND ? AND NOT (t0.b::TEXT LIKE ? ESCAPE '\\'))");

    assert!(eval(&sql, &[Value::Int(1), Value::Int(5), Value::from("1%")], &row));
    assert!(!eval(&sql, &[Value::Int(1), Value::Int(5), Value::from("-_")], &row));
}
