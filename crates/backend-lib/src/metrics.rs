// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for Prometheus metric keys
pub const REGISTERED: &str = "auth.registered";
pub const REGISTER_DUPLICATE: &str = "auth.register_duplicate";
pub const LOGIN_OK: &str = "auth.login_ok";
pub const LOGIN_FAILED: &str = "auth.login_failed";
pub const GATE_REJECTED: &str = "gate.rejected";
pub const APPOINTMENT_CREATED: &str = "citas.created";
pub const NOTE_CREATED: &str = "notas.created";

/// Bump a counter by one. A no-op until the binary installs a recorder.
pub fn incr(key: &'static str) {
    ::metrics::counter!(key).increment(1);
}
