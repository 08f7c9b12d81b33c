//! Defines the `SqlDialect` trait for database-specific SQL syntax.

use crate::{
    error::{UnmappableError, UnmappableReason},
    query::{
        ast::expr::{BindType, SqlArgument, SqlColumn, SqlExpr, SqlOperation},
        mapped::Mapped,
    },
};
use filter_syntax::{Distance, SpatialRelation};
use model::core::{
    data_type::{DataType, DialectKind},
    geometry::Geometry,
    value::Value,
};
use std::fmt::Debug;

/// Units of measure understood as metres.
const METRE_UOMS: &[&str] = &[
    "m",
    "meter",
    "meters",
    "metre",
    "metres",
    "urn:ogc:def:uom:EPSG::9001",
];

pub trait SqlDialect: Send + Sync + Debug {
    fn kind(&self) -> DialectKind;

    /// Returns the name of the dialect (e.g., "PostgreSQL", "MySQL").
    fn name(&self) -> &'static str;

    /// Returns the placeholder for the zero based parameter `index`.
    ///
    /// - PostgreSQL uses `$1`, `$2`, etc.
    /// - MySQL uses `?`
    fn placeholder(&self, index: usize) -> String;

    /// Wraps a placeholder according to how the argument is bound. Geometries
    /// travel as WKT and are rebuilt by the database.
    fn bind_snippet(&self, placeholder: &str, bind: &BindType) -> String {
        match bind {
            BindType::Geometry { srid } => {
                let srid = srid.map_or_else(|| self.undefined_srid_literal().to_string(), |s| s.to_string());
                format!("ST_GeomFromText({placeholder}, {srid})")
            }
            BindType::Untyped | BindType::Primitive(_) => placeholder.to_string(),
        }
    }

    /// Whether a literal that cannot be converted to its column's type is an
    /// error rather than something the database may coerce.
    fn requires_static_typing(&self) -> bool;

    /// Infix string concatenation operator, if the dialect has one.
    fn string_concat_operator(&self) -> Option<&'static str>;

    fn concat_expression(&self, parts: Vec<SqlExpr>) -> SqlOperation {
        let separator = match self.string_concat_operator() {
            Some(op) => format!(" {op} "),
            None => ", ".to_string(),
        };
        let mut builder = match self.string_concat_operator() {
            Some(_) => SqlOperation::builder().sql("("),
            None => SqlOperation::builder().sql("CONCAT("),
        };
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                builder = builder.sql(&separator);
            }
            builder = builder.expr(part);
        }
        builder.sql(")").data_type(DataType::String).build()
    }

    /// One based position of `needle` in `haystack`, 0 when absent.
    fn substring_index_expression(&self, needle: SqlExpr, haystack: SqlExpr) -> SqlOperation;

    fn cast_expression(&self, expr: SqlExpr, target: &DataType) -> SqlOperation;

    /// Escape character the compiler uses in translated `LIKE` patterns.
    fn like_escape_char(&self) -> char {
        '\\'
    }

    fn like_expression(&self, expr: SqlExpr, pattern: SqlArgument, match_case: bool) -> SqlOperation;

    fn spatial_predicate_sql(
        &self,
        relation: &SpatialRelation,
        column: &SqlColumn,
        geometry: &Geometry,
    ) -> Mapped<SqlOperation>;

    /// Aggregate computing the bounding box of a geometry column.
    fn bbox_aggregate_sql(&self, column: &SqlColumn) -> SqlOperation;

    fn undefined_srid_literal(&self) -> &'static str {
        "0"
    }
}

pub fn dialect_from_kind(kind: DialectKind) -> Box<dyn SqlDialect> {
    match kind {
        DialectKind::Postgres => Box::new(Postgres),
        DialectKind::MySql => Box::new(MySql),
    }
}

fn unsupported(dialect: &dyn SqlDialect, relation: &SpatialRelation, detail: String) -> Mapped<SqlOperation> {
    Mapped::Unmappable(UnmappableError::new(
        relation.name(),
        UnmappableReason::UnsupportedSpatialOperator {
            dialect: dialect.name().to_string(),
            operator: relation.name().to_string(),
            detail,
        },
    ))
}

fn is_metres(distance: &Distance) -> bool {
    distance
        .uom
        .as_deref()
        .is_some_and(|uom| METRE_UOMS.iter().any(|m| m.eq_ignore_ascii_case(uom)))
}

fn distance_argument(distance: &Distance) -> SqlArgument {
    SqlArgument::typed(Value::Float(distance.value), DataType::Double)
}

/// `NAME(column, geometry)` for the relations both dialects spell the same way.
fn st_function(relation: &SpatialRelation) -> Option<&'static str> {
    match relation {
        SpatialRelation::Equals => Some("ST_Equals"),
        SpatialRelation::Disjoint => Some("ST_Disjoint"),
        SpatialRelation::Touches => Some("ST_Touches"),
        SpatialRelation::Within => Some("ST_Within"),
        SpatialRelation::Overlaps => Some("ST_Overlaps"),
        SpatialRelation::Crosses => Some("ST_Crosses"),
        SpatialRelation::Intersects => Some("ST_Intersects"),
        SpatialRelation::Contains => Some("ST_Contains"),
        SpatialRelation::BBox | SpatialRelation::DWithin(_) | SpatialRelation::Beyond(_) => None,
    }
}

fn binary_function(name: &str, column: &SqlColumn, geometry: SqlExpr) -> SqlOperation {
    SqlOperation::builder()
        .sql(name)
        .sql("(")
        .expr(column.clone())
        .sql(", ")
        .expr(geometry)
        .sql(")")
        .data_type(DataType::Boolean)
        .build()
}

#[derive(Debug, Clone)]
pub struct Postgres;

impl Postgres {
    /// The geometry literal, reprojected into the column's SRID when both are
    /// known and differ.
    fn geometry_expr(&self, column: &SqlColumn, geometry: &Geometry) -> SqlExpr {
        match (geometry.srid, column.srid) {
            (Some(from), Some(to)) if from != to => SqlOperation::builder()
                .sql("ST_Transform(")
                .expr(SqlArgument::geometry(geometry.clone(), Some(from)))
                .sql(&format!(", {to})"))
                .data_type(DataType::Geometry)
                .build()
                .into(),
            (srid, column_srid) => SqlArgument::geometry(geometry.clone(), srid.or(column_srid)).into(),
        }
    }

    fn within_distance(&self, column: &SqlColumn, geometry: SqlExpr, distance: &Distance) -> Option<SqlOperation> {
        let op = if distance.uom.is_none() {
            SqlOperation::builder()
                .sql("ST_DWithin(")
                .expr(column.clone())
                .sql(", ")
                .expr(geometry)
                .sql(", ")
        } else if is_metres(distance) {
            SqlOperation::builder()
                .sql("ST_DWithin(")
                .expr(column.clone())
                .sql("::geography, ")
                .expr(geometry)
                .sql("::geography, ")
        } else {
            return None;
        };
        Some(
            op.expr(distance_argument(distance))
                .sql(")")
                .data_type(DataType::Boolean)
                .build(),
        )
    }
}

impl SqlDialect for Postgres {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index + 1)
    }

    fn requires_static_typing(&self) -> bool {
        true
    }

    fn string_concat_operator(&self) -> Option<&'static str> {
        Some("||")
    }

    fn substring_index_expression(&self, needle: SqlExpr, haystack: SqlExpr) -> SqlOperation {
        SqlOperation::builder()
            .sql("strpos(")
            .expr(haystack)
            .sql(", ")
            .expr(needle)
            .sql(")")
            .data_type(DataType::Int)
            .build()
    }

    fn cast_expression(&self, expr: SqlExpr, target: &DataType) -> SqlOperation {
        let wrap = matches!(expr, SqlExpr::Operation(_));
        let builder = if wrap {
            SqlOperation::builder().sql("(").expr(expr).sql(")")
        } else {
            SqlOperation::builder().expr(expr)
        };
        builder
            .sql(&format!("::{}", target.postgres_name()))
            .data_type(target.clone())
            .build()
    }

    fn like_expression(&self, expr: SqlExpr, pattern: SqlArgument, match_case: bool) -> SqlOperation {
        let keyword = if match_case { " LIKE " } else { " ILIKE " };
        SqlOperation::builder()
            .expr(expr)
            .sql(keyword)
            .expr(pattern)
            .sql(&format!(" ESCAPE '{}'", self.like_escape_char()))
            .data_type(DataType::Boolean)
            .build()
    }

    fn spatial_predicate_sql(
        &self,
        relation: &SpatialRelation,
        column: &SqlColumn,
        geometry: &Geometry,
    ) -> Mapped<SqlOperation> {
        let geom = self.geometry_expr(column, geometry);
        let op = match relation {
            SpatialRelation::BBox => SqlOperation::builder()
                .expr(column.clone())
                .sql(" && ")
                .expr(geom)
                .data_type(DataType::Boolean)
                .build(),
            SpatialRelation::DWithin(distance) => match self.within_distance(column, geom, distance) {
                Some(op) => op,
                None => return unsupported(self, relation, format!("unit of measure {:?}", distance.uom)),
            },
            SpatialRelation::Beyond(distance) => match self.within_distance(column, geom, distance) {
                Some(op) => SqlOperation::builder()
                    .sql("NOT ")
                    .expr(op)
                    .data_type(DataType::Boolean)
                    .build(),
                None => return unsupported(self, relation, format!("unit of measure {:?}", distance.uom)),
            },
            other => match st_function(other) {
                Some(name) => binary_function(name, column, geom),
                None => return unsupported(self, relation, "no matching function".to_string()),
            },
        };
        Mapped::Sql(op)
    }

    fn bbox_aggregate_sql(&self, column: &SqlColumn) -> SqlOperation {
        SqlOperation::builder()
            .sql("ST_Extent(")
            .expr(column.clone())
            .sql(")")
            .data_type(DataType::Geometry)
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct MySql;

impl MySql {
    fn cast_target(target: &DataType) -> &'static str {
        match target {
            t if t.is_textual() => "CHAR",
            t if t.is_integer() => "SIGNED",
            DataType::Boolean => "SIGNED",
            DataType::Float | DataType::Double => "DOUBLE",
            DataType::Decimal => "DECIMAL",
            DataType::Date => "DATE",
            DataType::Time => "TIME",
            DataType::Timestamp => "DATETIME",
            DataType::Json => "JSON",
            DataType::Bytea => "BINARY",
            _ => "CHAR",
        }
    }
}

impl SqlDialect for MySql {
    fn kind(&self) -> DialectKind {
        DialectKind::MySql
    }

    fn name(&self) -> &'static str {
        "MySQL"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    fn requires_static_typing(&self) -> bool {
        false
    }

    // `||` is logical OR unless PIPES_AS_CONCAT is set.
    fn string_concat_operator(&self) -> Option<&'static str> {
        None
    }

    fn substring_index_expression(&self, needle: SqlExpr, haystack: SqlExpr) -> SqlOperation {
        SqlOperation::builder()
            .sql("LOCATE(")
            .expr(needle)
            .sql(", ")
            .expr(haystack)
            .sql(")")
            .data_type(DataType::Int)
            .build()
    }

    fn cast_expression(&self, expr: SqlExpr, target: &DataType) -> SqlOperation {
        SqlOperation::builder()
            .sql("CAST(")
            .expr(expr)
            .sql(&format!(" AS {})", Self::cast_target(target)))
            .data_type(target.clone())
            .build()
    }

    fn like_expression(&self, expr: SqlExpr, pattern: SqlArgument, match_case: bool) -> SqlOperation {
        let builder = if match_case {
            SqlOperation::builder()
                .expr(expr)
                .sql(" LIKE ")
                .expr(pattern)
                .sql(" COLLATE utf8mb4_bin")
        } else {
            SqlOperation::builder()
                .sql("LOWER(")
                .expr(expr)
                .sql(") LIKE LOWER(")
                .expr(pattern)
                .sql(")")
        };
        builder.data_type(DataType::Boolean).build()
    }

    fn spatial_predicate_sql(
        &self,
        relation: &SpatialRelation,
        column: &SqlColumn,
        geometry: &Geometry,
    ) -> Mapped<SqlOperation> {
        if let (Some(from), Some(to)) = (geometry.srid, column.srid)
            && from != to
        {
            return unsupported(self, relation, format!("cannot transform SRID {from} to {to}"));
        }
        let geom: SqlExpr = SqlArgument::geometry(geometry.clone(), geometry.srid.or(column.srid)).into();

        let op = match relation {
            SpatialRelation::BBox => binary_function("MBRIntersects", column, geom),
            SpatialRelation::DWithin(distance) | SpatialRelation::Beyond(distance) => {
                if distance.uom.is_some() {
                    return unsupported(self, relation, format!("unit of measure {:?}", distance.uom));
                }
                let cmp = if matches!(relation, SpatialRelation::DWithin(_)) {
                    " <= "
                } else {
                    " > "
                };
                SqlOperation::builder()
                    .expr(binary_function("ST_Distance", column, geom))
                    .sql(cmp)
                    .expr(distance_argument(distance))
                    .data_type(DataType::Boolean)
                    .build()
            }
            other => match st_function(other) {
                Some(name) => binary_function(name, column, geom),
                None => return unsupported(self, relation, "no matching function".to_string()),
            },
        };
        Mapped::Sql(op)
    }

    fn bbox_aggregate_sql(&self, column: &SqlColumn) -> SqlOperation {
        SqlOperation::builder()
            .sql("ST_Envelope(ST_Collect(")
            .expr(column.clone())
            .sql("))")
            .data_type(DataType::Geometry)
            .build()
    }
}
