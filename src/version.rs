// Build-time identity, served on GET /version and sent as the upstream User-Agent

/// Package version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name (from Cargo.toml).
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// `name/version`, used as the HTTP client's User-Agent.
pub fn user_agent() -> String {
    format!("{NAME}/{VERSION}")
}
