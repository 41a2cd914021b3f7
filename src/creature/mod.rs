//! Creature Module
//!
//! Assembles creature records from an instance blob and its status blob.
//!
//! ## Responsibilities
//! - Pull creature ids out of the decoded instance properties
//! - Find name, tamed flag and status link through byte signatures
//! - Map stat-point arrays of the status blob onto named stats

mod builder;
pub mod signatures;

use std::fmt;

use serde::Serialize;

use crate::diagnostics::Diagnostic;
use crate::store::ObjectKey;

pub use builder::{CreatureRecordBuilder, InstanceSummary};
pub use signatures::Signatures;

/// Property names read from the blobs
pub mod properties {
    pub const DINO_ID_1: &str = "DinoID1";
    pub const DINO_ID_2: &str = "DinoID2";
    pub const BASE_LEVEL: &str = "BaseCharacterLevel";
    pub const BASE_POINTS: &str = "NumberOfLevelUpPointsApplied";
    pub const TAMED_POINTS: &str = "NumberOfLevelUpPointsAppliedTamed";
    pub const MUTATION_POINTS: &str = "NumberOfMutationsAppliedTamed";
}

/// Two-part creature identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct CreatureId {
    pub id1: u32,
    pub id2: u32,
}

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.id1, self.id2)
    }
}

/// Points spent per stat.
///
/// Array index mapping: 0 health, 1 stamina, 3 oxygen, 4 food, 7 weight,
/// 8 damage. Indices 2, 5 and 6 (torpidity, water, temperature) are not
/// tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatPoints {
    pub health: u32,
    pub stamina: u32,
    pub oxygen: u32,
    pub food: u32,
    pub weight: u32,
    pub damage: u32,
}

impl StatPoints {
    /// Store `value` under the stat at `index`. Returns false for indices
    /// outside the mapping.
    pub fn apply(&mut self, index: u32, value: u32) -> bool {
        let slot = match index {
            0 => &mut self.health,
            1 => &mut self.stamina,
            3 => &mut self.oxygen,
            4 => &mut self.food,
            7 => &mut self.weight,
            8 => &mut self.damage,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Sum over all tracked stats
    pub fn total(&self) -> u64 {
        [
            self.health,
            self.stamina,
            self.oxygen,
            self.food,
            self.weight,
            self.damage,
        ]
        .iter()
        .map(|&v| u64::from(v))
        .sum()
    }
}

/// A tamed creature extracted from the save
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatureRecord {
    pub class_name: String,
    pub instance_key: ObjectKey,
    pub status_key: ObjectKey,
    pub creature_id: CreatureId,
    /// Id shared by the instance and its status blob
    pub link_id: u32,
    pub tamed_name: Option<String>,
    pub base_level: Option<i32>,
    pub base_points: StatPoints,
    pub tamed_points: StatPoints,
    pub mutation_points: StatPoints,
    pub diagnostics: Vec<Diagnostic>,
}

impl CreatureRecord {
    /// Short species name taken from the blueprint class (`Rex` for
    /// `.../Rex_Character_BP.Rex_Character_BP_C`)
    pub fn species(&self) -> &str {
        let class = self.class_name.rsplit('.').next().unwrap_or(&self.class_name);
        class
            .strip_suffix("_Character_BP_C")
            .unwrap_or(class)
    }
}

impl fmt::Display for CreatureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with ID {}", self.species(), self.creature_id)?;
        match &self.tamed_name {
            Some(name) => write!(f, " and name {}", name)?,
            None => write!(f, " and no name")?,
        }
        if let Some(level) = self.base_level {
            write!(f, ", level {}", level)?;
        }
        Ok(())
    }
}
