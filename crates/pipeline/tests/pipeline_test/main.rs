/// Integration tests for full pricing passes: worked examples, idempotence,
/// change coalescing, row isolation and output atomicity.

mod helpers;
mod passes;
mod triggers;
