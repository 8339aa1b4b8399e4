/// One piece of a [`super::Sql`] statement.
#[derive(Debug, Clone)]
pub(crate) enum SqlPart {
    /// Raw SQL text, copied into the output as-is.
    Raw(String),
    /// A bound parameter; rendered as `$n` where `n` is its position.
    Param,
}
