//! Wire and attribute types shared by the pipeline and the snapshot.

pub mod attributes;
pub mod content;
pub mod kind;
pub mod wire;
