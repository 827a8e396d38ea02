//! Build metadata and plugin contract version accessors.
//!
//! Includes the generated version.rs from the build script, providing a single
//! source of truth for the host's plugin API revision ("major.minor").

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Fallback contract revision used when the build metadata is unusable
const DEFAULT_API_VERSION: &str = "1.0";

/// Current plugin contract revision of this host
pub fn get_api_version() -> &'static str {
    if parse_api_version(PLUGIN_API_VERSION).is_some() {
        PLUGIN_API_VERSION
    } else {
        DEFAULT_API_VERSION
    }
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}

/// Parse a "major.minor" contract revision.
///
/// Returns `None` for anything that is not exactly two dot-separated
/// unsigned integers.
pub fn parse_api_version(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.trim().split('.');
    let major = parts.next()?.parse::<u32>().ok()?;
    let minor = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor))
}

/// Check a provider's declared contract revision against the host's.
pub fn check_api_version_compatible(declared: &str) -> bool {
    is_api_compatible_with(declared, get_api_version())
}

/// Same major revision is compatible; malformed strings never are.
pub fn is_api_compatible_with(declared: &str, host: &str) -> bool {
    match (parse_api_version(declared), parse_api_version(host)) {
        (Some((declared_major, _)), Some((host_major, _))) => declared_major == host_major,
        _ => false,
    }
}
