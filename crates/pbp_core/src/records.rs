use crate::table::{Fields, FromTable, TableError, TableRow};

/// Failure reason recorded for matches without point-by-point data.
pub const MISSING_PBP_REASON: &str = "Missing pbp data";

/// Failure reason recorded for units whose worker died before returning.
pub const WORKER_TERMINATED_REASON: &str = "worker terminated abnormally";

/// A crawlable item that can be named in the failure table.
pub trait WorkUnit {
    fn identifier(&self) -> &str;
}

/// A tournament page found on the root listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentLink {
    pub href: String,
}

/// One dated season of a tournament, pointing at its results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentSeason {
    pub name: String,
    pub tournament_url: String,
    pub image_url: String,
    pub city_and_surface: String,
    pub year: String,
    pub href: String,
}

/// One match discovered on a season results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchListing {
    pub tournament_name: String,
    pub tournament_url: String,
    pub round: String,
    pub match_url: String,
    pub match_date: String,
}

/// One game row of one set, as read from the set page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGameRecord {
    pub match_url: String,
    pub set_id: String,
    pub game_id: u32,
    pub score: String,
    pub home_serving: bool,
    pub away_serving: bool,
    pub home_lost_serve: bool,
    pub away_lost_serve: bool,
}

impl RawGameRecord {
    pub fn key(&self) -> (&str, u32) {
        (&self.set_id, self.game_id)
    }
}

/// Point sequence of one game, as read from the set page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPointRecord {
    pub set_id: String,
    pub game_id: u32,
    pub point_sequence_text: String,
}

impl RawPointRecord {
    pub fn key(&self) -> (&str, u32) {
        (&self.set_id, self.game_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Participant {
    pub name: String,
    pub nationality: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParticipantMetadata {
    pub home: Participant,
    pub away: Participant,
}

/// A game row merged with its point sequence, match context and players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledMatchRecord {
    pub match_url: String,
    pub tournament_name: String,
    pub tournament_url: String,
    pub round: String,
    pub match_date: String,
    pub set_id: String,
    pub game_id: u32,
    pub game_score: String,
    pub pbp_score: String,
    pub home_serving: bool,
    pub away_serving: bool,
    pub home_lost_serve: bool,
    pub away_lost_serve: bool,
    pub player_home: String,
    pub player_home_nationality: String,
    pub player_home_img_url: String,
    pub player_away: String,
    pub player_away_nationality: String,
    pub player_away_img_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub unit_identifier: String,
    pub reason: String,
}

impl FailureRecord {
    pub fn new(unit_identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            unit_identifier: unit_identifier.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_pbp(unit_identifier: impl Into<String>) -> Self {
        Self::new(unit_identifier, MISSING_PBP_REASON)
    }
}

impl WorkUnit for TournamentLink {
    fn identifier(&self) -> &str {
        &self.href
    }
}

impl WorkUnit for TournamentSeason {
    fn identifier(&self) -> &str {
        &self.href
    }
}

impl WorkUnit for MatchListing {
    fn identifier(&self) -> &str {
        &self.match_url
    }
}

impl TableRow for TournamentLink {
    const COLUMNS: &'static [&'static str] = &["href"];

    fn cells(&self) -> Vec<String> {
        vec![self.href.clone()]
    }
}

impl FromTable for TournamentLink {
    fn from_fields(fields: &Fields<'_>) -> Result<Self, TableError> {
        Ok(Self {
            href: fields.get("href")?.to_string(),
        })
    }
}

impl TableRow for TournamentSeason {
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "tournament_url",
        "image_url",
        "city_and_surface",
        "year",
        "href",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.tournament_url.clone(),
            self.image_url.clone(),
            self.city_and_surface.clone(),
            self.year.clone(),
            self.href.clone(),
        ]
    }
}

impl FromTable for TournamentSeason {
    fn from_fields(fields: &Fields<'_>) -> Result<Self, TableError> {
        Ok(Self {
            name: fields.get("name")?.to_string(),
            tournament_url: fields.get("tournament_url")?.to_string(),
            image_url: fields.get("image_url")?.to_string(),
            city_and_surface: fields.get("city_and_surface")?.to_string(),
            year: fields.get("year")?.to_string(),
            href: fields.get("href")?.to_string(),
        })
    }
}

impl TableRow for MatchListing {
    const COLUMNS: &'static [&'static str] = &[
        "tournament_name",
        "tournament_url",
        "round",
        "match_url",
        "match_date",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.tournament_name.clone(),
            self.tournament_url.clone(),
            self.round.clone(),
            self.match_url.clone(),
            self.match_date.clone(),
        ]
    }
}

impl FromTable for MatchListing {
    fn from_fields(fields: &Fields<'_>) -> Result<Self, TableError> {
        Ok(Self {
            tournament_name: fields.get("tournament_name")?.to_string(),
            tournament_url: fields.get("tournament_url")?.to_string(),
            round: fields.get("round")?.to_string(),
            match_url: fields.get("match_url")?.to_string(),
            match_date: fields.get("match_date")?.to_string(),
        })
    }
}

impl TableRow for AssembledMatchRecord {
    const COLUMNS: &'static [&'static str] = &[
        "match_url",
        "tournament_name",
        "tournament_url",
        "round",
        "match_date",
        "set_id",
        "game_id",
        "game_score",
        "pbp_score",
        "home_serving",
        "away_serving",
        "home_lost_serve",
        "away_lost_serve",
        "player_home",
        "player_home_nationality",
        "player_home_img_url",
        "player_away",
        "player_away_nationality",
        "player_away_img_url",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.match_url.clone(),
            self.tournament_name.clone(),
            self.tournament_url.clone(),
            self.round.clone(),
            self.match_date.clone(),
            self.set_id.clone(),
            self.game_id.to_string(),
            self.game_score.clone(),
            self.pbp_score.clone(),
            self.home_serving.to_string(),
            self.away_serving.to_string(),
            self.home_lost_serve.to_string(),
            self.away_lost_serve.to_string(),
            self.player_home.clone(),
            self.player_home_nationality.clone(),
            self.player_home_img_url.clone(),
            self.player_away.clone(),
            self.player_away_nationality.clone(),
            self.player_away_img_url.clone(),
        ]
    }
}

impl TableRow for FailureRecord {
    const COLUMNS: &'static [&'static str] = &["unit_identifier", "reason"];

    fn cells(&self) -> Vec<String> {
        vec![self.unit_identifier.clone(), self.reason.clone()]
    }
}
