//! Filesystem primitives for materializing modules.

pub mod copy;
pub mod tree_hash;

pub use copy::copy_from_path;
pub use tree_hash::hash_tree;
