/// Command backends bundled with the provider
///
/// The production backend is `redisform_shared::redis::RedisClient`. This
/// module adds an in-process backend that emulates the subset of Redis used
/// by the resources, for tests and dry runs.

pub mod memory;

pub use memory::InMemoryBackend;
