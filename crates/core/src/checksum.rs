//! Policy checksum: a 16-byte digest over `(team_id, name)`.
//!
//! The store computes the same value through the `policy_checksum` SQL
//! function, so every INSERT derives the checksum from the row it writes.

use sha2::{Digest, Sha256};

/// Width of the `policies.checksum` column.
pub const CHECKSUM_LEN: usize = 16;

const SEPARATOR: u8 = 0;

/// Checksum for a policy owned by `team_id` (`None` for global policies).
pub fn policy_checksum(team_id: Option<u32>, name: &str) -> [u8; CHECKSUM_LEN] {
    let team = team_id.map(|id| id.to_string()).unwrap_or_default();
    checksum_parts(&team, name)
}

/// Digest of `team ‖ 0x00 ‖ name`, truncated to [`CHECKSUM_LEN`] bytes.
///
/// `team` is the textual team id, empty for global policies.
pub fn checksum_parts(team: &str, name: &str) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(team.as_bytes());
    hasher.update([SEPARATOR]);
    hasher.update(name.as_bytes());
    let digest = hasher.finalize();

    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[..CHECKSUM_LEN]);
    out
}
