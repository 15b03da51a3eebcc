// KEEL STORE LAYER
//
// Deterministic ordered key/value abstraction consumed by the staking
// module. Every replica executing the same block must observe identical
// store contents and identical iteration order, so the contract here is
// byte-lexicographic ascending order for all scans. Durability belongs to
// the host; this layer is synchronous and in-process.

pub mod kv;
pub mod memory;
pub mod ordered;

pub use kv::KvStore;
pub use memory::MemoryStore;
