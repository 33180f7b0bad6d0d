use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum AddChildError {
    #[error("Attempted to add too many nodes")]
    TooManyNodes,
    #[error("A decorator requires exactly one child")]
    NotEnoughNodes,
}

pub type AddChildResult = Result<(), AddChildError>;

/// A node parameter was missing or could not be interpreted.
#[derive(Debug, Error)]
#[error("Parameter {key:?}: {reason}")]
pub struct ParameterError {
    pub key: String,
    pub reason: String,
}

impl ParameterError {
    pub fn new(key: impl ToString, reason: impl ToString) -> Self {
        Self {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn missing(key: impl ToString) -> Self {
        Self::new(key, "is an obligatory parameter")
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("The tree does not declare a root node")]
    MissingRoot,
    #[error("Node {0:?} is referenced but not defined")]
    MissingNode(String),
    #[error("Node type {name:?} of node {node:?} is not registered")]
    UnknownNodeType { node: String, name: String },
    #[error("Node {0:?} is referenced more than once")]
    SharedNode(String),
    #[error("Node stored under {key:?} declares a different id {id:?}")]
    IdMismatch { key: String, id: String },
    #[error("Invalid parameter on node {node:?}: {source}")]
    InvalidParameter {
        node: String,
        #[source]
        source: ParameterError,
    },
    #[error("{0} to {1}")]
    AddChildError(AddChildError, String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// An integer that is none of the four status constants.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[error("{0} is not a valid status")]
pub struct StatusError(pub i32);
