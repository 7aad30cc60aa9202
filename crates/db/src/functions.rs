//! SQL functions registered on every seeder connection.

use policyseed_core::checksum::checksum_parts;
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::ValueRef;
use rusqlite::Connection;

/// `policy_checksum(team_id, name)`: 16-byte digest of
/// `coalesce(team_id, '') ‖ 0x00 ‖ name`.
pub const POLICY_CHECKSUM_FN: &str = "policy_checksum";

pub fn register(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        POLICY_CHECKSUM_FN,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        policy_checksum,
    )
}

fn policy_checksum(ctx: &Context<'_>) -> rusqlite::Result<Vec<u8>> {
    let team = match ctx.get_raw(0) {
        ValueRef::Null => String::new(),
        ValueRef::Integer(id) => id.to_string(),
        ValueRef::Text(text) => String::from_utf8_lossy(text).into_owned(),
        other => {
            return Err(rusqlite::Error::UserFunctionError(
                format!(
                    "{POLICY_CHECKSUM_FN}: unsupported team_id type {}",
                    other.data_type()
                )
                .into(),
            ))
        }
    };
    let name: String = ctx.get(1)?;
    Ok(checksum_parts(&team, &name).to_vec())
}
