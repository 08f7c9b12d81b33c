use crate::query::{
    ast::expr::{Particle, SqlArgument, SqlColumn, SqlExpr, SqlOperation},
    renderer::{Render, Renderer},
};

impl Render for SqlOperation {
    fn render(&self, r: &mut Renderer) {
        for particle in self.particles() {
            match particle {
                Particle::Sql(sql) => r.sql.push_str(sql),
                Particle::Expr(expr) => expr.render(r),
            }
        }
    }
}

impl Render for SqlExpr {
    fn render(&self, r: &mut Renderer) {
        match self {
            SqlExpr::Column(column) => column.render(r),
            SqlExpr::Argument(arg) => arg.render(r),
            SqlExpr::Operation(op) => op.render(r),
        }
    }
}

impl Render for SqlColumn {
    fn render(&self, r: &mut Renderer) {
        if let Some(qualifier) = self.qualifier.as_deref().filter(|q| !q.is_empty()) {
            r.sql.push_str(qualifier);
            r.sql.push('.');
        }
        r.sql.push_str(&self.name);
    }
}

impl Render for SqlArgument {
    fn render(&self, r: &mut Renderer) {
        r.add_param(self);
    }
}
