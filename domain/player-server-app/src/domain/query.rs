use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::player::{Player, Profession, Race};

pub const DEFAULT_PAGE_SIZE: usize = 3;

/// Optional constraints on a player listing. An absent field places no
/// constraint; present fields combine with AND.
#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    pub name: Option<String>,
    pub title: Option<String>,
    pub race: Option<Race>,
    pub profession: Option<Profession>,
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
    pub banned: Option<bool>,
    pub min_experience: Option<i32>,
    pub max_experience: Option<i32>,
    pub min_level: Option<i32>,
    pub max_level: Option<i32>,
}

pub type PlayerPredicate<'a> = Box<dyn Fn(&Player) -> bool + Send + Sync + 'a>;

fn predicate<'a>(f: impl Fn(&Player) -> bool + Send + Sync + 'a) -> PlayerPredicate<'a> {
    Box::new(f)
}

impl PlayerFilter {
    /// One predicate per present parameter.
    pub fn predicates(&self) -> Vec<PlayerPredicate<'_>> {
        [
            self.name
                .as_deref()
                .map(|name| predicate(move |p| p.name.contains(name))),
            self.title
                .as_deref()
                .map(|title| predicate(move |p| p.title.contains(title))),
            self.race.map(|race| predicate(move |p| p.race == race)),
            self.profession
                .map(|profession| predicate(move |p| p.profession == profession)),
            self.after
                .map(|after| predicate(move |p| p.birthday > after)),
            self.before
                .map(|before| predicate(move |p| p.birthday < before)),
            // an unset `banned` never matches
            self.banned
                .map(|banned| predicate(move |p| p.banned == Some(banned))),
            self.min_experience
                .map(|min| predicate(move |p| p.experience >= min)),
            self.max_experience
                .map(|max| predicate(move |p| p.experience <= max)),
            self.min_level.map(|min| predicate(move |p| p.level >= min)),
            self.max_level.map(|max| predicate(move |p| p.level <= max)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Runs each predicate as its own pass over the remaining players,
    /// preserving their relative order.
    pub fn apply(&self, players: Vec<Player>) -> Vec<Player> {
        self.predicates()
            .iter()
            .fold(players, |remaining, predicate| {
                remaining.into_iter().filter(|p| predicate(p)).collect()
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerOrder {
    #[default]
    Id,
    Name,
    Experience,
    Birthday,
    Level,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order '{0}', expected one of id, name, experience, birthday, level")]
pub struct InvalidPlayerOrder(pub String);

impl PlayerOrder {
    pub const ALL: [PlayerOrder; 5] = [
        PlayerOrder::Id,
        PlayerOrder::Name,
        PlayerOrder::Experience,
        PlayerOrder::Birthday,
        PlayerOrder::Level,
    ];

    pub fn field_name(&self) -> &'static str {
        match self {
            PlayerOrder::Id => "id",
            PlayerOrder::Name => "name",
            PlayerOrder::Experience => "experience",
            PlayerOrder::Birthday => "birthday",
            PlayerOrder::Level => "level",
        }
    }

    pub fn compare(&self, a: &Player, b: &Player) -> Ordering {
        match self {
            PlayerOrder::Id => a.id.cmp(&b.id),
            PlayerOrder::Name => a.name.cmp(&b.name),
            PlayerOrder::Experience => a.experience.cmp(&b.experience),
            PlayerOrder::Birthday => a.birthday.cmp(&b.birthday),
            PlayerOrder::Level => a.level.cmp(&b.level),
        }
    }

    /// Stable, so players with equal keys keep their incoming order.
    pub fn sort(&self, players: &mut [Player]) {
        players.sort_by(|a, b| self.compare(a, b));
    }
}

impl std::str::FromStr for PlayerOrder {
    type Err = InvalidPlayerOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlayerOrder::ALL
            .into_iter()
            .find(|order| order.field_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| InvalidPlayerOrder(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub page_number: Option<usize>,
    pub page_size: Option<usize>,
}

impl Pagination {
    pub fn new(page_number: Option<usize>, page_size: Option<usize>) -> Self {
        Self {
            page_number,
            page_size,
        }
    }

    pub fn limit(&self) -> usize {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn offset(&self) -> usize {
        self.page_number.unwrap_or(0).saturating_mul(self.limit())
    }

    pub fn apply(&self, players: Vec<Player>) -> Vec<Player> {
        players
            .into_iter()
            .skip(self.offset())
            .take(self.limit())
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlayerQuery {
    pub filter: PlayerFilter,
    pub order: Option<PlayerOrder>,
    pub pagination: Pagination,
}

impl PlayerQuery {
    /// filter, then sort, then cut out the requested page
    pub fn execute(&self, players: Vec<Player>) -> Vec<Player> {
        let mut players = self.filter.apply(players);
        self.order.unwrap_or_default().sort(&mut players);
        self.pagination.apply(players)
    }
}
