//! Generated names and placeholder column values.

pub const POLICY_RESOLUTION: &str = "resolution";
pub const POLICY_QUERY: &str = "query";
pub const POLICY_DESCRIPTION: &str = "description";
pub const POLICY_AUTHOR_ID: u32 = 1;
pub const POLICY_PLATFORMS: &str = "platforms";
pub const POLICY_CRITICAL: bool = true;
pub const POLICY_CALENDAR_EVENTS_ENABLED: bool = true;

pub fn team_name(team: u32) -> String {
    format!("team-{team}")
}

pub fn team_description(team: u32) -> String {
    format!("team-{team} description")
}

/// Policy name; the numeric suffix is the policy id, not a per-team ordinal.
pub fn policy_name(team: Option<u32>, policy_id: u32) -> String {
    match team {
        Some(team) => format!("team-{team}-policy-{policy_id}"),
        None => format!("global-policy-{policy_id}"),
    }
}
