use std::path::PathBuf;

use rcl_model::{ModelError, StoreError};

use crate::functions::Arity;

#[derive(Debug, thiserror::Error)]
pub enum FormulaError {
    #[error("missing closing parenthesis in {text}")]
    UnclosedCall { text: String },

    #[error("wrong function formula: {text}")]
    MalformedCall { text: String },

    #[error("wrong relation formula: {text}")]
    MalformedRelation { text: String },

    #[error("wrong number of parameters {text}. Expected {expected}, found {found}")]
    WrongArity {
        text: String,
        expected: Arity,
        found: usize,
    },

    #[error("wrong parameters for {text}: '{operand}' is not a number")]
    InvalidNumber { text: String, operand: String },

    #[error("unsupported hash algorithm: {algorithm}")]
    UnsupportedHash { algorithm: String },

    #[error("function not supported: {name}")]
    UnknownFunction { name: String },

    #[error("cyclic dependency between columns of {table}: {path}")]
    CyclicDependency { table: String, path: String },

    #[error("failed to read formula config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse formula config {origin}: {source}")]
    ConfigParse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, FormulaError>;
