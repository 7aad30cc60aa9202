//! Seeding statement builders.

use policyseed_core::names::{
    POLICY_AUTHOR_ID, POLICY_CALENDAR_EVENTS_ENABLED, POLICY_CRITICAL, POLICY_DESCRIPTION,
    POLICY_PLATFORMS, POLICY_QUERY, POLICY_RESOLUTION,
};
use policyseed_core::Outcome;
use sea_query::{Alias, Asterisk, Cond, Expr, Func, Order, Query, SqliteQueryBuilder};

use crate::functions::POLICY_CHECKSUM_FN;
use crate::tables::{Hosts, Policies, PolicyMembership, PolicyStats, Teams};

pub type Built = (String, sea_query::Values);

// ── Purge ─────────────────────────────────────────────────────────────────

/// DELETE statements in foreign-key order: children before parents.
pub fn purge_all() -> Vec<(&'static str, Built)> {
    vec![
        (
            "policy_stats",
            Query::delete()
                .from_table(PolicyStats::Table)
                .and_where(Expr::col(PolicyStats::Id).gt(0))
                .build(SqliteQueryBuilder),
        ),
        (
            "policy_membership",
            Query::delete()
                .from_table(PolicyMembership::Table)
                .and_where(Expr::col(PolicyMembership::HostId).gt(0))
                .build(SqliteQueryBuilder),
        ),
        (
            "hosts",
            Query::delete()
                .from_table(Hosts::Table)
                .and_where(Expr::col(Hosts::Id).gt(0))
                .build(SqliteQueryBuilder),
        ),
        (
            "policies",
            Query::delete()
                .from_table(Policies::Table)
                .and_where(Expr::col(Policies::Id).gt(0))
                .build(SqliteQueryBuilder),
        ),
        (
            "teams",
            Query::delete()
                .from_table(Teams::Table)
                .and_where(Expr::col(Teams::Id).gt(0))
                .build(SqliteQueryBuilder),
        ),
    ]
}

// ── Inserts ───────────────────────────────────────────────────────────────

/// INSERT a team.
pub fn insert_team(id: u32, name: &str, description: &str) -> Built {
    Query::insert()
        .into_table(Teams::Table)
        .columns([Teams::Id, Teams::Name, Teams::Description])
        .values_panic([id.into(), name.into(), description.into()])
        .build(SqliteQueryBuilder)
}

/// INSERT a policy with placeholder text columns.
///
/// The checksum is computed by the store from the same `team_id` and `name`
/// bound into the row.
pub fn insert_policy(id: u32, team_id: Option<u32>, name: &str) -> Built {
    let checksum = Expr::cust_with_values(
        format!("{POLICY_CHECKSUM_FN}(?, ?)"),
        [sea_query::Value::from(team_id), sea_query::Value::from(name)],
    );
    Query::insert()
        .into_table(Policies::Table)
        .columns([
            Policies::Id,
            Policies::TeamId,
            Policies::Resolution,
            Policies::Name,
            Policies::Query,
            Policies::Description,
            Policies::AuthorId,
            Policies::Platforms,
            Policies::Critical,
            Policies::Checksum,
            Policies::CalendarEventsEnabled,
        ])
        .values_panic([
            id.into(),
            team_id.into(),
            POLICY_RESOLUTION.into(),
            name.into(),
            POLICY_QUERY.into(),
            POLICY_DESCRIPTION.into(),
            POLICY_AUTHOR_ID.into(),
            POLICY_PLATFORMS.into(),
            POLICY_CRITICAL.into(),
            checksum,
            POLICY_CALENDAR_EVENTS_ENABLED.into(),
        ])
        .build(SqliteQueryBuilder)
}

/// INSERT a host.
pub fn insert_host(id: u32, team_id: Option<u32>) -> Built {
    Query::insert()
        .into_table(Hosts::Table)
        .columns([Hosts::Id, Hosts::TeamId])
        .values_panic([id.into(), team_id.into()])
        .build(SqliteQueryBuilder)
}

/// Multi-row INSERT of one host's memberships. `None` when `rows` is empty.
pub fn insert_memberships(host_id: u32, rows: &[(u32, Outcome)]) -> Option<Built> {
    if rows.is_empty() {
        return None;
    }
    let mut q = Query::insert();
    q.into_table(PolicyMembership::Table).columns([
        PolicyMembership::PolicyId,
        PolicyMembership::HostId,
        PolicyMembership::Passes,
    ]);
    for (policy_id, outcome) in rows {
        q.values_panic([(*policy_id).into(), host_id.into(), outcome.passes().into()]);
    }
    Some(q.build(SqliteQueryBuilder))
}

// ── Counts ────────────────────────────────────────────────────────────────

/// COUNT(*) of teams.
pub fn count_teams() -> Built {
    Query::select()
        .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
        .from(Teams::Table)
        .build(SqliteQueryBuilder)
}

/// COUNT(*) of policies, global (`team_id IS NULL`) or team-scoped.
pub fn count_policies(global: bool) -> Built {
    let scope = if global {
        Expr::col(Policies::TeamId).is_null()
    } else {
        Expr::col(Policies::TeamId).is_not_null()
    };
    Query::select()
        .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
        .from(Policies::Table)
        .and_where(scope)
        .build(SqliteQueryBuilder)
}

/// COUNT(*) of hosts, global (`team_id IS NULL`) or team-scoped.
pub fn count_hosts(global: bool) -> Built {
    let scope = if global {
        Expr::col(Hosts::TeamId).is_null()
    } else {
        Expr::col(Hosts::TeamId).is_not_null()
    };
    Query::select()
        .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
        .from(Hosts::Table)
        .and_where(scope)
        .build(SqliteQueryBuilder)
}

/// `(team_id, count)` of team-scoped hosts.
pub fn hosts_per_team() -> Built {
    Query::select()
        .column(Hosts::TeamId)
        .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
        .from(Hosts::Table)
        .and_where(Expr::col(Hosts::TeamId).is_not_null())
        .group_by_col(Hosts::TeamId)
        .order_by(Hosts::TeamId, Order::Asc)
        .build(SqliteQueryBuilder)
}

/// `(team_id, count)` of team-scoped policies.
pub fn policies_per_team() -> Built {
    Query::select()
        .column(Policies::TeamId)
        .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
        .from(Policies::Table)
        .and_where(Expr::col(Policies::TeamId).is_not_null())
        .group_by_col(Policies::TeamId)
        .order_by(Policies::TeamId, Order::Asc)
        .build(SqliteQueryBuilder)
}

/// `(passes, count)` over all memberships.
pub fn outcome_counts() -> Built {
    Query::select()
        .column(PolicyMembership::Passes)
        .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
        .from(PolicyMembership::Table)
        .group_by_col(PolicyMembership::Passes)
        .build(SqliteQueryBuilder)
}

/// `(team_id, name, checksum)` of every policy.
pub fn policy_checksums() -> Built {
    Query::select()
        .columns([Policies::TeamId, Policies::Name, Policies::Checksum])
        .from(Policies::Table)
        .order_by(Policies::Id, Order::Asc)
        .build(SqliteQueryBuilder)
}

/// `(memberships, hosts)`: how many global or team-scoped hosts carry each
/// membership count. Hosts without memberships count as 0.
pub fn memberships_per_host(global: bool) -> Built {
    let team_id = Expr::col((Hosts::Table, Hosts::TeamId));
    let scope = if global {
        team_id.is_null()
    } else {
        team_id.is_not_null()
    };
    let per_host = Alias::new("per_host");
    let counted = Query::select()
        .column((Hosts::Table, Hosts::Id))
        .expr_as(
            Func::count(Expr::col((PolicyMembership::Table, PolicyMembership::PolicyId))),
            per_host.clone(),
        )
        .from(Hosts::Table)
        .left_join(
            PolicyMembership::Table,
            Expr::col((PolicyMembership::Table, PolicyMembership::HostId))
                .equals((Hosts::Table, Hosts::Id)),
        )
        .and_where(scope)
        .group_by_col((Hosts::Table, Hosts::Id))
        .to_owned();
    Query::select()
        .column(per_host.clone())
        .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
        .from_subquery(counted, Alias::new("counted"))
        .group_by_col(per_host.clone())
        .order_by(per_host, Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Memberships joining a team policy to a global host or to another
/// team's host.
pub fn count_cross_team_memberships() -> Built {
    let host_team = || Expr::col((Hosts::Table, Hosts::TeamId));
    let policy_team = || Expr::col((Policies::Table, Policies::TeamId));
    Query::select()
        .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
        .from(PolicyMembership::Table)
        .inner_join(
            Hosts::Table,
            Expr::col((Hosts::Table, Hosts::Id))
                .equals((PolicyMembership::Table, PolicyMembership::HostId)),
        )
        .inner_join(
            Policies::Table,
            Expr::col((Policies::Table, Policies::Id))
                .equals((PolicyMembership::Table, PolicyMembership::PolicyId)),
        )
        .cond_where(
            Cond::all()
                .add(policy_team().is_not_null())
                .add(
                    Cond::any()
                        .add(host_team().is_null())
                        .add(host_team().ne(policy_team())),
                ),
        )
        .build(SqliteQueryBuilder)
}

/// Policies sharing a checksum with an earlier row.
pub fn count_duplicate_checksums() -> Built {
    Query::select()
        .expr_as(
            Expr::expr(Func::count(Expr::col(Asterisk)))
                .sub(Func::count_distinct(Expr::col(Policies::Checksum))),
            Alias::new("count"),
        )
        .from(Policies::Table)
        .build(SqliteQueryBuilder)
}
