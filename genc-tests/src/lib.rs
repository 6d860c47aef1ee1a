//! No library surface of its own — this crate exists to hold
//! cross-crate integration tests under `tests/` that exercise the full
//! `GencConfig::build_stack()` + `genc_intrinsics::register_default_handlers`
//! path, rather than a single stdlib crate in isolation.
