use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    PlayerId, RepoDeleteError, RepoError, RepoRetrieveError, RepoUpdateError,
    progression::LevelProgress,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Race {
    Human,
    Dwarf,
    Elf,
    Giant,
    Orc,
    Troll,
    Hobbit,
}

impl Race {
    pub const ALL: [Race; 7] = [
        Race::Human,
        Race::Dwarf,
        Race::Elf,
        Race::Giant,
        Race::Orc,
        Race::Troll,
        Race::Hobbit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Race::Human => "HUMAN",
            Race::Dwarf => "DWARF",
            Race::Elf => "ELF",
            Race::Giant => "GIANT",
            Race::Orc => "ORC",
            Race::Troll => "TROLL",
            Race::Hobbit => "HOBBIT",
        }
    }
}

impl std::fmt::Display for Race {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Race {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Race::ALL
            .into_iter()
            .find(|race| race.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("race", s))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Profession {
    Warrior,
    Rogue,
    Sorcerer,
    Cleric,
    Paladin,
    Nazgul,
    Warlock,
    Druid,
}

impl Profession {
    pub const ALL: [Profession; 8] = [
        Profession::Warrior,
        Profession::Rogue,
        Profession::Sorcerer,
        Profession::Cleric,
        Profession::Paladin,
        Profession::Nazgul,
        Profession::Warlock,
        Profession::Druid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profession::Warrior => "WARRIOR",
            Profession::Rogue => "ROGUE",
            Profession::Sorcerer => "SORCERER",
            Profession::Cleric => "CLERIC",
            Profession::Paladin => "PALADIN",
            Profession::Nazgul => "NAZGUL",
            Profession::Warlock => "WARLOCK",
            Profession::Druid => "DRUID",
        }
    }
}

impl std::fmt::Display for Profession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Profession {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Profession::ALL
            .into_iter()
            .find(|profession| profession.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("profession", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub title: String,
    pub race: Race,
    pub profession: Profession,
    pub birthday: DateTime<Utc>,
    pub experience: i32,
    pub level: i32,
    pub until_next_level: i32,
    pub banned: Option<bool>,
}

impl Player {
    pub fn set_progress(&mut self, progress: LevelProgress) {
        self.level = progress.level;
        self.until_next_level = progress.until_next_level;
    }
}

/// A validated player that has not been stored yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPlayer {
    pub name: String,
    pub title: String,
    pub race: Race,
    pub profession: Profession,
    pub birthday: DateTime<Utc>,
    pub experience: i32,
    pub level: i32,
    pub until_next_level: i32,
    pub banned: Option<bool>,
}

impl NewPlayer {
    pub fn with_id(self, id: PlayerId) -> Player {
        Player {
            id,
            name: self.name,
            title: self.title,
            race: self.race,
            profession: self.profession,
            birthday: self.birthday,
            experience: self.experience,
            level: self.level,
            until_next_level: self.until_next_level,
            banned: self.banned,
        }
    }
}

/// Creation input as received from the caller. Every field may be missing.
#[derive(Clone, Debug, Default)]
pub struct PlayerPayload {
    pub name: Option<String>,
    pub title: Option<String>,
    pub race: Option<Race>,
    pub profession: Option<Profession>,
    pub birthday: Option<DateTime<Utc>>,
    pub experience: Option<i32>,
    pub banned: Option<bool>,
}

/// Partial update. `None` leaves the stored value untouched; `banned` is
/// tri-state so `Some(None)` clears it.
#[derive(Clone, Debug, Default)]
pub struct PlayerPatch {
    pub name: Option<String>,
    pub title: Option<String>,
    pub race: Option<Race>,
    pub profession: Option<Profession>,
    pub birthday: Option<DateTime<Utc>>,
    pub experience: Option<i32>,
    pub banned: Option<Option<bool>>,
}

#[async_trait::async_trait]
pub trait PlayerRepository {
    async fn find_all(&self) -> Result<Vec<Player>, RepoError>;
    async fn find_by_id(&self, id: PlayerId) -> Result<Player, RepoRetrieveError>;
    async fn insert_player(&self, player: NewPlayer) -> Result<Player, RepoError>;
    /// Loads the player, hands it to `update_fn` and stores the result, all
    /// within one storage transaction.
    async fn update_player<R: std::fmt::Display + std::fmt::Debug + Send + 'static>(
        &self,
        id: PlayerId,
        update_fn: impl FnOnce(Player) -> Result<Player, R> + Send + 'static,
    ) -> Result<Player, RepoUpdateError<R>>;
    async fn delete_player(&self, id: PlayerId) -> Result<(), RepoDeleteError>;
}
