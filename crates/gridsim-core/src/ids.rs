// Run-scoped identifiers for players, teams and seasons.
//
// Every id is handed out by an `IdAllocator` owned by a single run, so two
// leagues simulated side by side never share counters.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeasonId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{:03}", self.0)
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{:02}", self.0)
    }
}

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:04}", self.0)
    }
}

/// Monotonic id sequences, one per entity kind. Ids start at 1 and are never
/// reused within an allocator.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next_player: u32,
    next_team: u32,
    next_season: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_player(&mut self) -> PlayerId {
        self.next_player += 1;
        PlayerId(self.next_player)
    }

    pub fn next_team(&mut self) -> TeamId {
        self.next_team += 1;
        TeamId(self.next_team)
    }

    pub fn next_season(&mut self) -> SeasonId {
        self.next_season += 1;
        SeasonId(self.next_season)
    }

    /// Reserve `count` consecutive season ids and return the first one.
    ///
    /// Trials run in parallel, so their ids are reserved up front and each
    /// trial derives its own id from its index.
    pub fn reserve_seasons(&mut self, count: u32) -> SeasonId {
        let first = SeasonId(self.next_season + 1);
        self.next_season += count;
        first
    }
}
