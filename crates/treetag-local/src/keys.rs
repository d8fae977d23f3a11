//! Keys written to local state.

/// Mirrored access token of the signed-in user.
pub const AUTH_TOKEN: &str = "auth_token";

/// Number of QR tags scanned on this device.
pub const SCAN_COUNT: &str = "scan_count";
