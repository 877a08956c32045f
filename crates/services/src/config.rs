use serde::{Deserialize, Serialize};

/// Default per-question countdown, in seconds.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 30;
/// Advisory soft cap for the whole practice phase, in seconds.
pub const SESSION_CAP_SECS: u32 = 600;
/// Result reveal after an explicit submit, in milliseconds.
pub const SUBMIT_REVEAL_MS: u64 = 1_200;
/// Shorter "time's up" reveal after an auto-timeout, in milliseconds.
pub const TIMEOUT_REVEAL_MS: u64 = 400;

const DEFAULT_COUNTS: [u32; 4] = [10, 20, 30, 40];

/// Session configuration, read once at session start.
///
/// Invalid values never fail the session; they silently fall back to the
/// defaults (logged at debug level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    time_limit_secs: u32,
    timer_enabled: bool,
    practice_counts: Vec<u32>,
    session_cap_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            timer_enabled: true,
            practice_counts: DEFAULT_COUNTS.to_vec(),
            session_cap_secs: SESSION_CAP_SECS,
        }
    }
}

impl SessionConfig {
    /// Builds a config, normalizing invalid inputs to the defaults.
    ///
    /// A zero time limit disables the per-question timer entirely.
    #[must_use]
    pub fn new(time_limit_secs: u32, timer_enabled: bool, practice_counts: Vec<u32>) -> Self {
        let practice_counts = if practice_counts.is_empty() || practice_counts.contains(&0) {
            log::debug!("invalid practice count menu, using defaults");
            DEFAULT_COUNTS.to_vec()
        } else {
            practice_counts
        };

        Self {
            time_limit_secs,
            timer_enabled: timer_enabled && time_limit_secs > 0,
            practice_counts,
            session_cap_secs: SESSION_CAP_SECS,
        }
    }

    /// Reads the configuration from the environment:
    /// `TUTOR_QUESTION_TIME_LIMIT`, `TUTOR_ENABLE_TIMER`,
    /// `TUTOR_QUESTION_COUNTS` (comma-separated).
    #[must_use]
    pub fn from_env() -> Self {
        let time_limit = std::env::var("TUTOR_QUESTION_TIME_LIMIT")
            .ok()
            .and_then(|raw| parse_time_limit(&raw))
            .unwrap_or(DEFAULT_TIME_LIMIT_SECS);

        let timer_enabled = std::env::var("TUTOR_ENABLE_TIMER")
            .map(|raw| raw.trim() != "false")
            .unwrap_or(true);

        let counts = std::env::var("TUTOR_QUESTION_COUNTS")
            .ok()
            .map(|raw| parse_counts(&raw))
            .unwrap_or_else(|| DEFAULT_COUNTS.to_vec());

        Self::new(time_limit, timer_enabled, counts)
    }

    // Accessors
    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    /// True when the per-question countdown is active at all.
    #[must_use]
    pub fn timer_enabled(&self) -> bool {
        self.timer_enabled
    }

    /// The menu of selectable practice counts.
    #[must_use]
    pub fn practice_counts(&self) -> &[u32] {
        &self.practice_counts
    }

    #[must_use]
    pub fn session_cap_secs(&self) -> u32 {
        self.session_cap_secs
    }
}

fn parse_time_limit(raw: &str) -> Option<u32> {
    match raw.trim().parse::<i64>() {
        Ok(v) if v > 0 => u32::try_from(v).ok(),
        Ok(0) => Some(0),
        _ => {
            log::debug!("invalid question time limit {raw:?}, using default");
            None
        }
    }
}

fn parse_counts(raw: &str) -> Vec<u32> {
    let counts: Vec<u32> = raw
        .split(',')
        .filter_map(|part| part.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .collect();
    if counts.is_empty() {
        log::debug!("invalid practice count menu {raw:?}, using defaults");
        DEFAULT_COUNTS.to_vec()
    } else {
        counts
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.time_limit_secs(), 30);
        assert!(config.timer_enabled());
        assert_eq!(config.practice_counts(), &[10, 20, 30, 40]);
        assert_eq!(config.session_cap_secs(), 600);
    }

    #[test]
    fn zero_limit_disables_the_timer() {
        let config = SessionConfig::new(0, true, vec![10]);
        assert!(!config.timer_enabled());
    }

    #[test]
    fn invalid_count_menu_falls_back() {
        let config = SessionConfig::new(30, true, vec![]);
        assert_eq!(config.practice_counts(), &[10, 20, 30, 40]);

        let config = SessionConfig::new(30, true, vec![10, 0]);
        assert_eq!(config.practice_counts(), &[10, 20, 30, 40]);
    }

    #[test]
    fn parse_counts_skips_garbage() {
        assert_eq!(parse_counts("5, 15 ,x,25"), vec![5, 15, 25]);
        assert_eq!(parse_counts("x,y"), DEFAULT_COUNTS.to_vec());
    }

    #[test]
    fn parse_time_limit_rejects_non_positive_garbage() {
        assert_eq!(parse_time_limit("45"), Some(45));
        assert_eq!(parse_time_limit("0"), Some(0));
        assert_eq!(parse_time_limit("-3"), None);
        assert_eq!(parse_time_limit("soon"), None);
    }
}
