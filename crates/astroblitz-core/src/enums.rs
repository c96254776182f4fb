//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Which side an entity fights for. Shots and melee attacks name the
/// faction they can hurt instead of looking entities up by tag string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    pub fn opponent(self) -> Faction {
        match self {
            Faction::Player => Faction::Enemy,
            Faction::Enemy => Faction::Player,
        }
    }
}

/// Game phase (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    MainMenu,
    Active,
    Paused,
    /// All waves cleared (and Endless Mode exhausted or disabled).
    Victory,
    /// The player died.
    Defeat,
}

/// Which stat bar a bar-fraction event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarKind {
    Health,
    Shield,
}

/// Visual effect intents. Playback is the host engine's job; the
/// simulation only names what should appear and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Death explosion at the dying entity's position.
    Death,
    /// A shot striking an unshielded target.
    Hit,
    /// A shot deflecting off a shield, oriented from shot toward target.
    ShieldHit,
    /// Melee impact, placed between attacker and victim.
    Melee,
    /// Item removal fade-out.
    ItemFade,
}

/// Sound intents, mixed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    WaveStart,
    Shot,
    Melee,
    Pickup,
}

/// Category of a live entity, for the snapshot view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy,
    Shot,
    Item,
}

/// Recipient of an item action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionTarget {
    GameController,
    Player,
}
