//! Item definitions relevant to vault battles.

use crate::state::ItemId;

/// Effect an item has when used in the vault system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemEffect {
    /// Adds dice rolls to every skill of the attacking side.
    ExtraRolls(u8),
    /// Lets the attacker ignore the same-clan re-attack cooldown.
    Reattack,
    /// Makes the using clan immune to attacks for `duration` seconds.
    BlockAttacks { duration: u64 },
}

impl ItemEffect {
    /// Whether the effect can be spent on an attack.
    pub const fn is_attack_effect(&self) -> bool {
        matches!(self, Self::ExtraRolls(_) | Self::Reattack)
    }

    /// Bonus rolls granted to the attacking side.
    pub const fn extra_rolls(&self) -> u8 {
        match self {
            Self::ExtraRolls(rolls) => *rolls,
            _ => 0,
        }
    }
}

/// Oracle providing item definitions.
pub trait ItemOracle: Send + Sync {
    /// Returns the vault effect of `item`, or `None` if the item is unknown.
    fn effect(&self, item: ItemId) -> Option<ItemEffect>;
}
