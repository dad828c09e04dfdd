use std::sync::LazyLock;

use regex::Regex;

/// Game id reserved for the tie-break game of a set.
pub const TIEBREAK_GAME_ID: u32 = 13;

static SUPERSCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<sup[^>]*>.*?</sup>").expect("superscript pattern"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));
static SCORE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}").expect("score token pattern"));

/// Normalize the markup of a score cell into `"H-A"` form.
///
/// The superscript holding the tie-break point count is dropped before the
/// numeric tokens are read, so `7<sup>6</sup>-6` becomes `7-6`.
pub fn normalize_score(raw_markup: &str) -> String {
    let without_sup = SUPERSCRIPT.replace_all(raw_markup, "");
    let text = TAG.replace_all(&without_sup, " ");
    SCORE_TOKEN
        .find_iter(&text)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn is_tiebreak_score(normalized: &str) -> bool {
    normalized == "7-6" || normalized == "6-7"
}

/// Serve marker cells carry markup only for the serving side.
pub fn is_serving(marker_markup: &str) -> bool {
    !marker_markup.trim().is_empty()
}

pub fn is_lost_serve(marker_text: &str) -> bool {
    marker_text.trim().eq_ignore_ascii_case("LOST SERVE")
}

/// Assigns game ids within one set.
///
/// Ids follow row position, except that the game right after the first
/// 7-6 / 6-7 game takes [`TIEBREAK_GAME_ID`]. Slot 13 is handed out at most
/// once per set: later tie-break scores do not force it again, and a
/// positional id that would land on a taken slot moves past it. Use a fresh
/// value for every set.
#[derive(Debug, Clone, Default)]
pub struct GameNumbering {
    position: u32,
    tiebreak_pending: bool,
    tiebreak_taken: bool,
}

impl GameNumbering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of the next game given its normalized score.
    pub fn next_id(&mut self, normalized_score: &str) -> u32 {
        self.position += 1;
        if self.position == TIEBREAK_GAME_ID && self.tiebreak_taken {
            self.position += 1;
        }
        let forced = std::mem::take(&mut self.tiebreak_pending) && !self.tiebreak_taken;
        let id = if forced {
            TIEBREAK_GAME_ID
        } else {
            self.position
        };
        if id == TIEBREAK_GAME_ID {
            self.tiebreak_taken = true;
        }
        if is_tiebreak_score(normalized_score) && !self.tiebreak_taken {
            self.tiebreak_pending = true;
        }
        id
    }
}
