use anyhow::{Context, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use std::fs;
use std::path::Path;

/// Intro templates for the plain share sentence.
const TEMPLATES: &[&str] = &[
    "Notes and melodies, woven into a little gift for you. Today's picks: ",
    "Let the music drift and carry you for a while. Today's picks: ",
    "A song is a mood with a melody attached. Today's picks: ",
    "May these tunes warm the rest of your day. Today's picks: ",
    "Light up this moment with a melody. Today's picks: ",
];

/// Variants used when a fundraising goal amount is attached.
const GOAL_TEMPLATES: &[&str] = &[
    "Only {goal} to go, lend me a song's worth of help! Today's picks: ",
    "Just {goal} short of the goal, want to push me over? Today's picks: ",
    "{goal} away from a small dream coming true. Today's picks: ",
    "So close: {goal} left! A song would be the perfect buff. Today's picks: ",
];

/// A flat pool of song names to sample from.
#[derive(Debug, Clone)]
pub struct SongPool {
    names: Vec<String>,
}

impl SongPool {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// One name per line; surrounding whitespace dropped, blank lines skipped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read song pool {}", path.display()))?;
        let names = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Uniform sample of up to `count` distinct names.
    pub fn pick(&self, count: usize, rng: &mut impl Rng) -> Vec<String> {
        let mut shuffled = self.names.clone();
        shuffled.shuffle(rng);
        shuffled.truncate(count);
        shuffled
    }

    /// Tops `selected` up to `target` names from the not-yet-selected
    /// remainder, keeping what is already there. Returns how many were added.
    pub fn supplement(
        &self,
        selected: &mut Vec<String>,
        target: usize,
        rng: &mut impl Rng,
    ) -> usize {
        if target <= selected.len() {
            return 0;
        }

        let mut remainder: Vec<String> = self
            .names
            .iter()
            .filter(|name| !selected.contains(name))
            .cloned()
            .collect();
        remainder.shuffle(rng);
        remainder.truncate(target - selected.len());

        let added = remainder.len();
        selected.extend(remainder);
        added
    }
}

/// The shareable sentence: a random intro (goal-flavoured when an amount is
/// given, formatted to one decimal) followed by the picks quoted `《…》`.
pub fn share_sentence(songs: &[String], goal: Option<f64>, rng: &mut impl Rng) -> String {
    let intro = match goal.filter(|amount| *amount > 0.0) {
        Some(amount) => {
            let template = GOAL_TEMPLATES[rng.random_range(0..GOAL_TEMPLATES.len())];
            template.replace("{goal}", &format!("{amount:.1}"))
        }
        None => TEMPLATES[rng.random_range(0..TEMPLATES.len())].to_string(),
    };

    let quoted: Vec<String> = songs.iter().map(|name| format!("《{name}》")).collect();
    format!("{intro}{}", quoted.join("、"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn pool(names: &[&str]) -> SongPool {
        SongPool::new(names.iter().map(|name| name.to_string()).collect())
    }

    #[test]
    fn pick_returns_distinct_names_up_to_pool_size() {
        let pool = pool(&["a", "b", "c"]);
        let mut rng = SmallRng::seed_from_u64(7);

        let picks = pool.pick(2, &mut rng);
        assert_eq!(picks.len(), 2);
        assert_ne!(picks[0], picks[1]);

        let all = pool.pick(10, &mut rng);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn supplement_never_duplicates_and_reports_added_count() {
        let pool = pool(&["a", "b", "c", "d"]);
        let mut rng = SmallRng::seed_from_u64(7);
        let mut selected = vec![String::from("b")];

        let added = pool.supplement(&mut selected, 3, &mut rng);
        assert_eq!(added, 2);
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0], "b");
        let mut sorted = selected.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 3);
    }

    #[test]
    fn supplement_is_a_no_op_when_target_is_met() {
        let pool = pool(&["a", "b"]);
        let mut rng = SmallRng::seed_from_u64(7);
        let mut selected = vec![String::from("a"), String::from("b")];
        assert_eq!(pool.supplement(&mut selected, 2, &mut rng), 0);
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn supplement_stops_at_pool_exhaustion() {
        let pool = pool(&["a", "b"]);
        let mut rng = SmallRng::seed_from_u64(7);
        let mut selected = vec![String::from("a")];
        assert_eq!(pool.supplement(&mut selected, 5, &mut rng), 1);
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn sentence_quotes_every_pick_in_order() {
        let mut rng = SmallRng::seed_from_u64(7);
        let songs = vec![String::from("Sunrise"), String::from("Moonlight")];
        let sentence = share_sentence(&songs, None, &mut rng);

        assert!(sentence.contains("《Sunrise》、《Moonlight》"));
        assert!(sentence.contains("Today's picks: "));
    }

    #[test]
    fn goal_sentence_interpolates_amount_to_one_decimal() {
        let mut rng = SmallRng::seed_from_u64(7);
        let songs = vec![String::from("Sunrise")];
        let sentence = share_sentence(&songs, Some(12.25), &mut rng);
        assert!(sentence.contains("12.2") || sentence.contains("12.3"));
        assert!(!sentence.contains("{goal}"));
    }

    #[test]
    fn zero_goal_uses_plain_templates() {
        let mut rng = SmallRng::seed_from_u64(7);
        let songs = vec![String::from("Sunrise")];
        let sentence = share_sentence(&songs, Some(0.0), &mut rng);
        assert!(sentence.contains("Today's picks: "));
    }

    #[test]
    fn pool_file_drops_blank_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("default_songs.txt");
        std::fs::write(&path, "  Alpha  \n\n\nBeta\n   \n").expect("fixture");

        let pool = SongPool::from_file(&path).expect("pool");
        assert_eq!(pool.len(), 2);

        assert!(SongPool::from_file(&dir.path().join("missing.txt")).is_err());
    }
}
