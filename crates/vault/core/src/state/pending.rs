use super::{Amount, ClanId, ItemId, RequestId, Roster, Timestamp};

/// An attack waiting for its random words.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingAttack {
    pub request_id: RequestId,
    pub attacker: ClanId,
    pub defender: ClanId,
    /// Attacker roster at request time; departed players become `NONE`.
    pub attacker_players: Roster,
    pub item: Option<ItemId>,
    pub extra_rolls: u8,
    pub prepayment: Amount,
    pub requested_at: Timestamp,
}
