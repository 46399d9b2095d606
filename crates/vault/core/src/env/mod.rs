//! Traits describing the engine's external collaborators.
//!
//! Oracles expose the Player Registry, Clan Registry, item definitions,
//! territory roles and the outbound half of the Randomness Source. The [`Env`]
//! aggregate bundles them so the engine can reach everything it needs without
//! coupling to concrete registries.
mod clans;
mod error;
mod items;
mod players;
mod randomness;
mod roles;

pub use clans::ClanOracle;
pub use error::OracleError;
pub use items::{ItemEffect, ItemOracle};
pub use players::PlayerOracle;
pub use randomness::{PcgRng, RandomWord, RandomnessOracle, RandomnessRequest, mix_seed};
pub use roles::RoleOracle;

/// Aggregates the oracles required by the engine.
pub struct Env<'a, P, C, I, R, X>
where
    P: PlayerOracle + ?Sized,
    C: ClanOracle + ?Sized,
    I: ItemOracle + ?Sized,
    R: RoleOracle + ?Sized,
    X: RandomnessOracle + ?Sized,
{
    players: Option<&'a P>,
    clans: Option<&'a C>,
    items: Option<&'a I>,
    roles: Option<&'a R>,
    randomness: Option<&'a X>,
}

// Manual impls: derives would demand `P: Clone`, which trait objects never are.
impl<P, C, I, R, X> Clone for Env<'_, P, C, I, R, X>
where
    P: PlayerOracle + ?Sized,
    C: ClanOracle + ?Sized,
    I: ItemOracle + ?Sized,
    R: RoleOracle + ?Sized,
    X: RandomnessOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, C, I, R, X> Copy for Env<'_, P, C, I, R, X>
where
    P: PlayerOracle + ?Sized,
    C: ClanOracle + ?Sized,
    I: ItemOracle + ?Sized,
    R: RoleOracle + ?Sized,
    X: RandomnessOracle + ?Sized,
{
}

impl<P, C, I, R, X> std::fmt::Debug for Env<'_, P, C, I, R, X>
where
    P: PlayerOracle + ?Sized,
    C: ClanOracle + ?Sized,
    I: ItemOracle + ?Sized,
    R: RoleOracle + ?Sized,
    X: RandomnessOracle + ?Sized,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("players", &self.players.is_some())
            .field("clans", &self.clans.is_some())
            .field("items", &self.items.is_some())
            .field("roles", &self.roles.is_some())
            .field("randomness", &self.randomness.is_some())
            .finish()
    }
}

pub type VaultEnv<'a> = Env<
    'a,
    dyn PlayerOracle + 'a,
    dyn ClanOracle + 'a,
    dyn ItemOracle + 'a,
    dyn RoleOracle + 'a,
    dyn RandomnessOracle + 'a,
>;

impl<'a, P, C, I, R, X> Env<'a, P, C, I, R, X>
where
    P: PlayerOracle + ?Sized,
    C: ClanOracle + ?Sized,
    I: ItemOracle + ?Sized,
    R: RoleOracle + ?Sized,
    X: RandomnessOracle + ?Sized,
{
    pub fn new(
        players: Option<&'a P>,
        clans: Option<&'a C>,
        items: Option<&'a I>,
        roles: Option<&'a R>,
        randomness: Option<&'a X>,
    ) -> Self {
        Self {
            players,
            clans,
            items,
            roles,
            randomness,
        }
    }

    pub fn with_all(
        players: &'a P,
        clans: &'a C,
        items: &'a I,
        roles: &'a R,
        randomness: &'a X,
    ) -> Self {
        Self::new(
            Some(players),
            Some(clans),
            Some(items),
            Some(roles),
            Some(randomness),
        )
    }

    pub fn empty() -> Self {
        Self {
            players: None,
            clans: None,
            items: None,
            roles: None,
            randomness: None,
        }
    }

    /// Returns the PlayerOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::PlayersNotAvailable` if no player oracle was provided.
    pub fn players(&self) -> Result<&'a P, OracleError> {
        self.players.ok_or(OracleError::PlayersNotAvailable)
    }

    /// Returns the ClanOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ClansNotAvailable` if no clan oracle was provided.
    pub fn clans(&self) -> Result<&'a C, OracleError> {
        self.clans.ok_or(OracleError::ClansNotAvailable)
    }

    /// Returns the ItemOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ItemsNotAvailable` if no item oracle was provided.
    pub fn items(&self) -> Result<&'a I, OracleError> {
        self.items.ok_or(OracleError::ItemsNotAvailable)
    }

    /// Returns the RoleOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RolesNotAvailable` if no role oracle was provided.
    pub fn roles(&self) -> Result<&'a R, OracleError> {
        self.roles.ok_or(OracleError::RolesNotAvailable)
    }

    /// Returns the RandomnessOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RandomnessNotAvailable` if no randomness oracle was provided.
    pub fn randomness(&self) -> Result<&'a X, OracleError> {
        self.randomness.ok_or(OracleError::RandomnessNotAvailable)
    }
}

impl<'a, P, C, I, R, X> Env<'a, P, C, I, R, X>
where
    P: PlayerOracle + 'a,
    C: ClanOracle + 'a,
    I: ItemOracle + 'a,
    R: RoleOracle + 'a,
    X: RandomnessOracle + 'a,
{
    /// Converts this environment into a trait-object based `VaultEnv`.
    pub fn into_vault_env(self) -> VaultEnv<'a> {
        let players: Option<&'a dyn PlayerOracle> = self.players.map(|players| players as _);
        let clans: Option<&'a dyn ClanOracle> = self.clans.map(|clans| clans as _);
        let items: Option<&'a dyn ItemOracle> = self.items.map(|items| items as _);
        let roles: Option<&'a dyn RoleOracle> = self.roles.map(|roles| roles as _);
        let randomness: Option<&'a dyn RandomnessOracle> =
            self.randomness.map(|randomness| randomness as _);
        Env::new(players, clans, items, roles, randomness)
    }
}
