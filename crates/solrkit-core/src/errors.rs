use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("{parser} query is missing required field `{field}`")]
    MissingRequiredField {
        parser: &'static str,
        field: &'static str,
    },
    #[error("vector literal needs at least one dimension")]
    EmptyVector,
    #[error("range facet on `{field}` must set start, end, and gap together")]
    ConflictingRangeFacet { field: String },
}

pub type Result<T> = std::result::Result<T, CompileError>;
