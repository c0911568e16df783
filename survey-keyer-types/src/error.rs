use std::path::PathBuf;

/// Error type for loading and validating questionnaire definitions.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    /// The definition file could not be read.
    #[error("Cannot read questionnaire '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The definition is not valid JSON or has the wrong shape.
    #[error("Malformed questionnaire: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Question '{question}' has unknown type '{tag}'")]
    UnknownType { question: String, tag: String },

    #[error("Duplicate id '{0}'")]
    DuplicateId(String),

    #[error("Question '{0}' needs at least one option")]
    NoOptions(String),

    #[error("Matrix question '{0}' needs rows and columns")]
    EmptyMatrix(String),

    #[error("Scale question '{question}' has invalid bounds {min}..={max}")]
    ScaleBounds { question: String, min: i64, max: i64 },

    #[error("Condition of '{target}' refers to unknown field '{parent}'")]
    UnknownParent { target: String, parent: String },

    #[error("Condition of '{target}' refers to '{parent}', which is not a choice field")]
    ParentNotChoice { target: String, parent: String },

    /// Conditions may only look back: the parent must be answered before its target.
    #[error("Condition of '{target}' refers to '{parent}', which is not declared before it")]
    ForwardReference { target: String, parent: String },

    #[error("Condition of '{0}' has no trigger values")]
    EmptyTrigger(String),
}
