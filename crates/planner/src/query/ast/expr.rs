//! Compiled SQL expressions.
//!
//! An [`SqlOperation`] is a sequence of raw SQL particles and nested
//! expressions. Bound literals stay as [`SqlArgument`] nodes until rendering,
//! which is where placeholders get their numbers; combining operations never
//! has to renumber anything and the parameter order always follows the text.

use crate::query::{
    dialect::SqlDialect,
    renderer::{Render, Renderer},
};
use model::core::{data_type::DataType, geometry::Geometry, value::Value};

/// How a bound value is handed to the database.
#[derive(Debug, Clone, PartialEq)]
pub enum BindType {
    /// Bound with the driver's default mapping for the value.
    Untyped,
    /// Coerced to the type of the column it is compared against.
    Primitive(DataType),
    /// Geometry, wrapped by the dialect into a geometry constructor.
    Geometry { srid: Option<i32> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlArgument {
    pub value: Value,
    pub bind: BindType,
}

impl SqlArgument {
    pub fn untyped(value: Value) -> Self {
        SqlArgument {
            value,
            bind: BindType::Untyped,
        }
    }

    pub fn typed(value: Value, data_type: DataType) -> Self {
        SqlArgument {
            value,
            bind: BindType::Primitive(data_type),
        }
    }

    pub fn geometry(geometry: Geometry, srid: Option<i32>) -> Self {
        SqlArgument {
            value: Value::Geometry(geometry),
            bind: BindType::Geometry { srid },
        }
    }

    pub fn data_type(&self) -> DataType {
        match &self.bind {
            BindType::Primitive(dt) => dt.clone(),
            BindType::Geometry { .. } => DataType::Geometry,
            BindType::Untyped => self.value.data_type(),
        }
    }
}

/// A (possibly qualified) column of a mapped table.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlColumn {
    pub qualifier: Option<String>,
    pub name: String,
    pub data_type: Option<DataType>,
    pub spatial: bool,
    pub srid: Option<i32>,
}

impl SqlColumn {
    pub fn new(qualifier: Option<&str>, name: &str) -> Self {
        SqlColumn {
            qualifier: qualifier.map(str::to_string),
            name: name.to_string(),
            data_type: None,
            spatial: false,
            srid: None,
        }
    }

    pub fn qualified_name(&self) -> String {
        match &self.qualifier {
            Some(q) if !q.is_empty() => format!("{q}.{}", self.name),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpr {
    Column(SqlColumn),
    Argument(SqlArgument),
    Operation(SqlOperation),
}

impl SqlExpr {
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            SqlExpr::Column(c) => c.data_type.clone(),
            SqlExpr::Argument(a) => Some(a.data_type()),
            SqlExpr::Operation(op) => op.data_type.clone(),
        }
    }
}

impl From<SqlColumn> for SqlExpr {
    fn from(c: SqlColumn) -> Self {
        SqlExpr::Column(c)
    }
}

impl From<SqlArgument> for SqlExpr {
    fn from(a: SqlArgument) -> Self {
        SqlExpr::Argument(a)
    }
}

impl From<SqlOperation> for SqlExpr {
    fn from(op: SqlOperation) -> Self {
        SqlExpr::Operation(op)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Particle {
    Sql(String),
    Expr(SqlExpr),
}

/// SQL text with embedded bound arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlOperation {
    particles: Vec<Particle>,
    data_type: Option<DataType>,
}

impl SqlOperation {
    pub fn builder() -> SqlOperationBuilder {
        SqlOperationBuilder::default()
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn data_type(&self) -> Option<&DataType> {
        self.data_type.as_ref()
    }

    /// Bound arguments in placeholder order.
    pub fn arguments(&self) -> Vec<&SqlArgument> {
        let mut out = Vec::new();
        collect_arguments(&self.particles, &mut out);
        out
    }

    pub fn parameters(&self) -> Vec<Value> {
        self.arguments().into_iter().map(|a| a.value.clone()).collect()
    }

    /// Dialect neutral text: every argument is rendered as `?`.
    pub fn text(&self) -> String {
        let mut renderer = Renderer::generic();
        self.render(&mut renderer);
        renderer.finish().0
    }

    /// Final SQL for `dialect` and the values to bind, positionally.
    pub fn to_sql(&self, dialect: &dyn SqlDialect) -> (String, Vec<Value>) {
        let mut renderer = Renderer::new(dialect);
        self.render(&mut renderer);
        renderer.finish()
    }

    /// `a AND b AND ...`, parenthesized when more than one operand remains
    /// after dropping empty operations.
    pub fn conjunction(ops: impl IntoIterator<Item = SqlOperation>) -> SqlOperation {
        Self::junction(ops, " AND ")
    }

    pub fn disjunction(ops: impl IntoIterator<Item = SqlOperation>) -> SqlOperation {
        Self::junction(ops, " OR ")
    }

    pub fn and(a: SqlOperation, b: SqlOperation) -> SqlOperation {
        Self::conjunction([a, b])
    }

    pub fn or(a: SqlOperation, b: SqlOperation) -> SqlOperation {
        Self::disjunction([a, b])
    }

    pub fn negate(op: SqlOperation) -> SqlOperation {
        SqlOperation::builder()
            .sql("NOT (")
            .expr(op)
            .sql(")")
            .data_type(DataType::Boolean)
            .build()
    }

    fn junction(ops: impl IntoIterator<Item = SqlOperation>, separator: &str) -> SqlOperation {
        let mut ops: Vec<SqlOperation> = ops.into_iter().filter(|op| !op.is_empty()).collect();
        match ops.len() {
            0 => SqlOperation::empty(),
            1 => ops.remove(0),
            _ => {
                let mut builder = SqlOperation::builder().sql("(");
                for (i, op) in ops.into_iter().enumerate() {
                    if i > 0 {
                        builder = builder.sql(separator);
                    }
                    builder = builder.expr(op);
                }
                builder.sql(")").data_type(DataType::Boolean).build()
            }
        }
    }
}

fn collect_arguments<'a>(particles: &'a [Particle], out: &mut Vec<&'a SqlArgument>) {
    for particle in particles {
        match particle {
            Particle::Sql(_) => {}
            Particle::Expr(SqlExpr::Argument(arg)) => out.push(arg),
            Particle::Expr(SqlExpr::Column(_)) => {}
            Particle::Expr(SqlExpr::Operation(op)) => collect_arguments(&op.particles, out),
        }
    }
}

#[derive(Debug, Default)]
pub struct SqlOperationBuilder {
    particles: Vec<Particle>,
    data_type: Option<DataType>,
}

impl SqlOperationBuilder {
    pub fn sql(mut self, sql: &str) -> Self {
        match self.particles.last_mut() {
            Some(Particle::Sql(last)) => last.push_str(sql),
            _ => self.particles.push(Particle::Sql(sql.to_string())),
        }
        self
    }

    pub fn expr(mut self, expr: impl Into<SqlExpr>) -> Self {
        self.particles.push(Particle::Expr(expr.into()));
        self
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn build(self) -> SqlOperation {
        SqlOperation {
            particles: self.particles,
            data_type: self.data_type,
        }
    }
}
