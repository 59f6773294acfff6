// Football positions and tiered roster slots.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Positions present in the game logs. `Other` collects kickers, defenders
/// and anything the source data does not classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    Quarterback,
    RunningBack,
    WideReceiver,
    TightEnd,
    Other,
}

impl Position {
    /// Parse a position string. Accepts lowercase or uppercase abbreviations
    /// ("qb", "RB", ...). Returns `None` for anything unrecognised.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "qb" => Some(Position::Quarterback),
            "rb" => Some(Position::RunningBack),
            "wr" => Some(Position::WideReceiver),
            "te" => Some(Position::TightEnd),
            "other" => Some(Position::Other),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "qb",
            Position::RunningBack => "rb",
            Position::WideReceiver => "wr",
            Position::TightEnd => "te",
            Position::Other => "other",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

/// A roster opening: a position plus the rank tier it draws from.
///
/// `Slot { position: WideReceiver, tier: 2 }` is the "wr2" opening, filled
/// from the second `league_size`-wide band of receivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub position: Position,
    pub tier: u32,
}

impl Slot {
    pub fn new(position: Position, tier: u32) -> Self {
        Slot { position, tier }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.position.display_str(), self.tier)
    }
}

impl FromStr for Slot {
    type Err = SimError;

    /// Parse a label such as `rb2`: a position prefix followed by a tier >= 1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_lowercase();
        let split = label
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| SimError::settings("roster_slots", format!("slot `{s}` has no tier")))?;
        let (pos_str, tier_str) = label.split_at(split);
        let position = Position::from_str_pos(pos_str).ok_or_else(|| {
            SimError::settings("roster_slots", format!("slot `{s}` has unknown position"))
        })?;
        let tier: u32 = tier_str
            .parse()
            .map_err(|_| SimError::settings("roster_slots", format!("slot `{s}` has a bad tier")))?;
        if tier == 0 {
            return Err(SimError::settings(
                "roster_slots",
                format!("slot `{s}`: tiers start at 1"),
            ));
        }
        Ok(Slot { position, tier })
    }
}

/// Positions named by a roster, in first-appearance order.
pub fn roster_positions(slots: &[Slot]) -> Vec<Position> {
    let mut positions = Vec::new();
    for slot in slots {
        if !positions.contains(&slot.position) {
            positions.push(slot.position);
        }
    }
    positions
}
