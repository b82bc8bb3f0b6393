// Build identity, stamped into logs and the index document.

/// Package version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name (from Cargo.toml).
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// `name/version`, e.g. `fleetperf/0.8.0`.
pub fn generator() -> String {
    format!("{NAME}/{VERSION}")
}
