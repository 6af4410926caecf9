use thiserror::Error;

use crate::scene::NodeId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("easel does not support the type \"{0}\"")]
    UnsupportedType(String),

    #[error("cannot insert node before itself")]
    InsertBeforeSelf,

    #[error("text children should already be flattened")]
    UnflattenedText,

    #[error("node {0:?} is no longer part of the scene")]
    StaleNode(NodeId),

    #[error("node {0:?} cannot hold children")]
    NotAContainer(NodeId),

    #[error("node {child:?} is not a child of {parent:?}")]
    ChildNotFound { parent: NodeId, child: NodeId },

    #[error("cannot add a node to its own subtree")]
    CyclicInsert,

    #[error("stage is not mounted")]
    NotMounted,

    #[error("stage is already mounted")]
    AlreadyMounted,

    #[error("invalid stage props: {0}")]
    InvalidProps(String),
}

pub type Result<T> = std::result::Result<T, Error>;
