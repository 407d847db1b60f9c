use chrono::{DateTime, Datelike, Utc};
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::domain::{
    player::{NewPlayer, Player, PlayerPatch, PlayerPayload},
    progression::{MAX_EXPERIENCE, level_progress},
};

pub const MIN_BIRTH_YEAR: i32 = 2000;
pub const MAX_BIRTH_YEAR: i32 = 3000;
pub const MAX_NAME_LENGTH: usize = 12;
pub const MAX_TITLE_LENGTH: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerValidationError {
    #[error("player data is missing")]
    MissingPayload,
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("name must be between 1 and 12 characters")]
    InvalidName,
    #[error("title must be between 1 and 30 characters")]
    InvalidTitle,
    #[error("birthday must not precede the epoch and must fall in the years 2000 to 3000")]
    InvalidBirthday,
    #[error("experience must be between 0 and {max}", max = MAX_EXPERIENCE)]
    InvalidExperience,
}

#[derive(Validate)]
struct NameValidator {
    #[validate(length(min = 1), custom(function = "name_fits"))]
    name: String,
}

#[derive(Validate)]
struct TitleValidator {
    #[validate(length(min = 1), custom(function = "title_fits"))]
    title: String,
}

#[derive(Validate)]
struct ExperienceValidator {
    #[validate(range(min = 0, max = MAX_EXPERIENCE))]
    experience: i32,
}

// lengths are counted in UTF-16 code units, so a character outside the
// basic plane takes two
fn utf16_fits(value: &str, max: usize, code: &'static str) -> Result<(), ValidationError> {
    if value.encode_utf16().count() > max {
        return Err(ValidationError::new(code));
    }
    Ok(())
}

fn name_fits(name: &str) -> Result<(), ValidationError> {
    utf16_fits(name, MAX_NAME_LENGTH, "name_length")
}

fn title_fits(title: &str) -> Result<(), ValidationError> {
    utf16_fits(title, MAX_TITLE_LENGTH, "title_length")
}

fn check_name(name: &str) -> Result<(), PlayerValidationError> {
    NameValidator {
        name: name.to_string(),
    }
    .validate()
    .map_err(|_| PlayerValidationError::InvalidName)
}

fn check_title(title: &str) -> Result<(), PlayerValidationError> {
    TitleValidator {
        title: title.to_string(),
    }
    .validate()
    .map_err(|_| PlayerValidationError::InvalidTitle)
}

fn check_experience(experience: i32) -> Result<(), PlayerValidationError> {
    ExperienceValidator { experience }
        .validate()
        .map_err(|_| PlayerValidationError::InvalidExperience)
}

fn check_birthday(birthday: &DateTime<Utc>) -> Result<(), PlayerValidationError> {
    if birthday.timestamp_millis() < 0
        || !(MIN_BIRTH_YEAR..=MAX_BIRTH_YEAR).contains(&birthday.year())
    {
        return Err(PlayerValidationError::InvalidBirthday);
    }
    Ok(())
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, PlayerValidationError> {
    value.ok_or(PlayerValidationError::Missing(field))
}

/// Checks a full creation payload and derives level fields for it.
pub fn validate_for_create(
    payload: Option<PlayerPayload>,
) -> Result<NewPlayer, PlayerValidationError> {
    let payload = payload.ok_or(PlayerValidationError::MissingPayload)?;

    let name = required(payload.name, "name")?;
    check_name(&name)?;
    let title = required(payload.title, "title")?;
    check_title(&title)?;
    let race = required(payload.race, "race")?;
    let profession = required(payload.profession, "profession")?;
    let birthday = required(payload.birthday, "birthday")?;
    check_birthday(&birthday)?;
    let experience = required(payload.experience, "experience")?;
    check_experience(experience)?;

    let progress = level_progress(experience);
    Ok(NewPlayer {
        name,
        title,
        race,
        profession,
        birthday,
        experience,
        level: progress.level,
        until_next_level: progress.until_next_level,
        banned: payload.banned,
    })
}

/// Applies the fields present in `patch` to `existing`. Nothing is applied
/// unless every present field passes its check. Level fields are recomputed
/// from the resulting experience whether or not it changed.
pub fn validate_for_update(
    existing: Player,
    patch: Option<PlayerPatch>,
) -> Result<Player, PlayerValidationError> {
    let patch = patch.ok_or(PlayerValidationError::MissingPayload)?;

    if let Some(name) = &patch.name {
        check_name(name)?;
    }
    if let Some(title) = &patch.title {
        check_title(title)?;
    }
    if let Some(birthday) = &patch.birthday {
        check_birthday(birthday)?;
    }
    if let Some(experience) = patch.experience {
        check_experience(experience)?;
    }

    let mut player = existing;
    if let Some(name) = patch.name {
        player.name = name;
    }
    if let Some(title) = patch.title {
        player.title = title;
    }
    if let Some(race) = patch.race {
        player.race = race;
    }
    if let Some(profession) = patch.profession {
        player.profession = profession;
    }
    if let Some(birthday) = patch.birthday {
        player.birthday = birthday;
    }
    if let Some(banned) = patch.banned {
        player.banned = banned;
    }
    if let Some(experience) = patch.experience {
        player.experience = experience;
    }
    player.set_progress(level_progress(player.experience));
    Ok(player)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::domain::{
        PlayerId,
        player::{Profession, Race},
    };

    use super::*;

    fn birthday(year: i32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, 6, 15, 12, 0, 0).unwrap()
    }

    fn payload() -> PlayerPayload {
        PlayerPayload {
            name: Some("Arwen".to_string()),
            title: Some("Evenstar".to_string()),
            race: Some(Race::Elf),
            profession: Some(Profession::Sorcerer),
            birthday: Some(birthday(2010)),
            experience: Some(1500),
            banned: None,
        }
    }

    fn existing() -> Player {
        validate_for_create(Some(payload()))
            .unwrap()
            .with_id(PlayerId(7))
    }

    #[test]
    fn test_create_derives_level() {
        let player = validate_for_create(Some(payload())).unwrap();
        let progress = level_progress(1500);
        assert_eq!(player.level, progress.level);
        assert_eq!(player.until_next_level, progress.until_next_level);
        assert_eq!(player.banned, None);
    }

    #[test]
    fn test_create_requires_payload() {
        assert_eq!(
            validate_for_create(None),
            Err(PlayerValidationError::MissingPayload)
        );
    }

    #[test]
    fn test_create_name_length() {
        let mut p = payload();
        p.name = Some("a".repeat(12));
        assert!(validate_for_create(Some(p.clone())).is_ok());

        p.name = Some("a".repeat(13));
        assert_eq!(
            validate_for_create(Some(p.clone())),
            Err(PlayerValidationError::InvalidName)
        );

        p.name = Some(String::new());
        assert_eq!(
            validate_for_create(Some(p.clone())),
            Err(PlayerValidationError::InvalidName)
        );

        p.name = None;
        assert_eq!(
            validate_for_create(Some(p)),
            Err(PlayerValidationError::Missing("name"))
        );
    }

    #[test]
    fn test_lengths_count_utf16_units() {
        let mut p = payload();
        // each of these takes two UTF-16 units
        p.name = Some("\u{1F409}".repeat(6));
        assert!(validate_for_create(Some(p.clone())).is_ok());

        p.name = Some("\u{1F409}".repeat(7));
        assert_eq!(
            validate_for_create(Some(p.clone())),
            Err(PlayerValidationError::InvalidName)
        );

        p.name = Some("Arwen".to_string());
        p.title = Some("\u{1F451}".repeat(16));
        assert_eq!(
            validate_for_create(Some(p.clone())),
            Err(PlayerValidationError::InvalidTitle)
        );

        p.title = Some("é".repeat(30));
        assert!(validate_for_create(Some(p)).is_ok());
    }

    #[test]
    fn test_experience_message_names_the_limit() {
        assert_eq!(
            PlayerValidationError::InvalidExperience.to_string(),
            format!("experience must be between 0 and {}", MAX_EXPERIENCE)
        );
    }

    #[test]
    fn test_create_title_length() {
        let mut p = payload();
        p.title = Some("t".repeat(30));
        assert!(validate_for_create(Some(p.clone())).is_ok());

        p.title = Some("t".repeat(31));
        assert_eq!(
            validate_for_create(Some(p)),
            Err(PlayerValidationError::InvalidTitle)
        );
    }

    #[test]
    fn test_create_requires_enums() {
        let mut p = payload();
        p.race = None;
        assert_eq!(
            validate_for_create(Some(p)),
            Err(PlayerValidationError::Missing("race"))
        );

        let mut p = payload();
        p.profession = None;
        assert_eq!(
            validate_for_create(Some(p)),
            Err(PlayerValidationError::Missing("profession"))
        );
    }

    #[test]
    fn test_create_birthday_year_bounds() {
        for (year, ok) in [(1999, false), (2000, true), (3000, true), (3001, false)] {
            let mut p = payload();
            p.birthday = Some(birthday(year));
            assert_eq!(validate_for_create(Some(p)).is_ok(), ok, "year {}", year);
        }

        let mut p = payload();
        p.birthday = Some(Utc.timestamp_millis_opt(-1).unwrap());
        assert_eq!(
            validate_for_create(Some(p)),
            Err(PlayerValidationError::InvalidBirthday)
        );

        let mut p = payload();
        p.birthday = None;
        assert_eq!(
            validate_for_create(Some(p)),
            Err(PlayerValidationError::Missing("birthday"))
        );
    }

    #[test]
    fn test_create_experience_bounds() {
        for (experience, ok) in [(-1, false), (0, true), (10_000_000, true), (10_000_001, false)] {
            let mut p = payload();
            p.experience = Some(experience);
            assert_eq!(
                validate_for_create(Some(p)).is_ok(),
                ok,
                "experience {}",
                experience
            );
        }
    }

    #[test]
    fn test_update_experience_only() {
        let before = existing();
        let patch = PlayerPatch {
            experience: Some(7000),
            ..Default::default()
        };
        let after = validate_for_update(before.clone(), Some(patch)).unwrap();
        let progress = level_progress(7000);

        assert_eq!(after.experience, 7000);
        assert_eq!(after.level, progress.level);
        assert_eq!(after.until_next_level, progress.until_next_level);
        assert_eq!(after.id, before.id);
        assert_eq!(after.name, before.name);
        assert_eq!(after.title, before.title);
        assert_eq!(after.race, before.race);
        assert_eq!(after.profession, before.profession);
        assert_eq!(after.birthday, before.birthday);
        assert_eq!(after.banned, before.banned);
    }

    #[test]
    fn test_update_recomputes_stale_level() {
        let mut before = existing();
        before.level = 99;
        before.until_next_level = -5;
        let after = validate_for_update(before, Some(PlayerPatch::default())).unwrap();
        assert_eq!(after.level, level_progress(1500).level);
        assert_eq!(after.until_next_level, level_progress(1500).until_next_level);
    }

    #[test]
    fn test_update_rejects_invalid_field_without_partial_apply() {
        let before = existing();
        let patch = PlayerPatch {
            name: Some("Valid".to_string()),
            title: Some("x".repeat(31)),
            ..Default::default()
        };
        assert_eq!(
            validate_for_update(before, Some(patch)),
            Err(PlayerValidationError::InvalidTitle)
        );
    }

    #[test]
    fn test_update_requires_patch() {
        assert_eq!(
            validate_for_update(existing(), None),
            Err(PlayerValidationError::MissingPayload)
        );
    }

    #[test]
    fn test_update_banned_tri_state() {
        let before = existing();

        let set = validate_for_update(
            before.clone(),
            Some(PlayerPatch {
                banned: Some(Some(true)),
                ..Default::default()
            }),
        )
        .unwrap();
        assert_eq!(set.banned, Some(true));

        let untouched = validate_for_update(set.clone(), Some(PlayerPatch::default())).unwrap();
        assert_eq!(untouched.banned, Some(true));

        let cleared = validate_for_update(
            set,
            Some(PlayerPatch {
                banned: Some(None),
                ..Default::default()
            }),
        )
        .unwrap();
        assert_eq!(cleared.banned, None);
    }

    #[test]
    fn test_update_overwrites_enums() {
        let patch = PlayerPatch {
            race: Some(Race::Troll),
            profession: Some(Profession::Nazgul),
            ..Default::default()
        };
        let after = validate_for_update(existing(), Some(patch)).unwrap();
        assert_eq!(after.race, Race::Troll);
        assert_eq!(after.profession, Profession::Nazgul);
    }
}
