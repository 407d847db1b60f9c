pub const MAX_EXPERIENCE: i32 = 10_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: i32,
    pub until_next_level: i32,
}

/// Level and remaining experience for the next level. Both values are derived
/// from the same experience so they can never disagree.
pub fn level_progress(experience: i32) -> LevelProgress {
    let level = level_for(experience);
    LevelProgress {
        level,
        until_next_level: 50 * (level + 1) * (level + 2) - experience,
    }
}

fn level_for(experience: i32) -> i32 {
    let root = (2500.0 + 200.0 * experience as f64).sqrt();
    // truncation equals floor since experience is never negative
    ((root - 50.0) / 100.0) as i32
}
