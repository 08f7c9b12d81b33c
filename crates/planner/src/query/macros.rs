/// Unwraps a [`Mapped::Sql`](crate::query::mapped::Mapped) or returns the
/// unmappable outcome from the enclosing function, which must return a
/// [`CompileResult`](crate::query::mapped::CompileResult).
///
/// Plays the role `?` plays for errors: `mapped!(self.column(p)?)`.
#[macro_export]
macro_rules! mapped {
    ($expr:expr) => {
        match $expr {
            $crate::query::mapped::Mapped::Sql(value) => value,
            $crate::query::mapped::Mapped::Unmappable(reason) => {
                return Ok($crate::query::mapped::Mapped::Unmappable(reason));
            }
        }
    };
}
