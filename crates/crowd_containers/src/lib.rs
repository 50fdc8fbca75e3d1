//! Container data structures.

mod key_index_mapper;

pub use key_index_mapper::KeyIndexMapper;

pub use rustc_hash::FxBuildHasher as RandomState;
pub use rustc_hash::FxHasher as DefaultHasher;

/// A `HashMap` using the fast, non-cryptographic `FxHash` hasher.
///
/// Iteration order over this map is unspecified; code that needs a
/// deterministic traversal order must sort keys explicitly or use
/// [`KeyIndexMapper`], which keeps a dense, insertion-ordered `Vec` alongside
/// the hash index.
pub type HashMap<K, V> = std::collections::HashMap<K, V, rustc_hash::FxBuildHasher>;

/// A `HashSet` using the fast, non-cryptographic `FxHash` hasher.
pub type HashSet<T> = std::collections::HashSet<T, rustc_hash::FxBuildHasher>;
