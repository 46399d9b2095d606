use std::fmt;

/// Stake-currency amount in the smallest indivisible unit.
pub type Amount = u128;

/// Seconds since the unix epoch. The engine never reads a clock itself.
pub type Timestamp = u64;

/// Identifier of a player character owned by the Player Registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub u64);

impl PlayerId {
    /// Sentinel for an empty or orphaned combatant slot.
    ///
    /// A `NONE` slot keeps its position in a roster but contributes no rolls.
    pub const NONE: Self = Self(0);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        !self.is_none()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "player:none")
        } else {
            write!(f, "player:{}", self.0)
        }
    }
}

/// Identifier of a clan owned by the Clan Registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClanId(pub u32);

impl fmt::Display for ClanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clan:{}", self.0)
    }
}

/// Identifier of an item definition (consumables used in vault battles).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item:{}", self.0)
    }
}

/// Identifier of an account that may control players (the caller of an operation).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account:{}", self.0)
    }
}

/// Identifier issued by the Randomness Source for one in-flight request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request:{:#x}", self.0)
    }
}

/// Skills that can be contested in a battle.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    strum::EnumCount,
    strum::Display,
    strum::IntoStaticStr,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Skill {
    Melee,
    Ranged,
    Magic,
    Defence,
    Health,
    Mining,
    Woodcutting,
    Fishing,
    Smithing,
    Thieving,
    Crafting,
    Cooking,
    Firemaking,
    Alchemy,
    Fletching,
    Forging,
    Farming,
}
