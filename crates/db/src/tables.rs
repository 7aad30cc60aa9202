//! Compile-time–checked column identifiers for all tables.

use sea_query::Iden;

#[derive(Iden)]
pub enum Teams {
    Table,
    Id,
    Name,
    Description,
}

#[derive(Iden)]
pub enum Policies {
    Table,
    Id,
    TeamId,
    Resolution,
    Name,
    Query,
    Description,
    AuthorId,
    Platforms,
    Critical,
    Checksum,
    CalendarEventsEnabled,
}

#[derive(Iden)]
pub enum Hosts {
    Table,
    Id,
    TeamId,
}

#[derive(Iden)]
pub enum PolicyMembership {
    Table,
    PolicyId,
    HostId,
    Passes,
}

#[derive(Iden)]
pub enum PolicyStats {
    Table,
    Id,
}
