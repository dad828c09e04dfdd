use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::records::{
    AssembledMatchRecord, MatchListing, ParticipantMetadata, RawGameRecord, RawPointRecord,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("duplicate game row for set {set_id} game {game_id}")]
    DuplicateGame { set_id: String, game_id: u32 },
    #[error("duplicate point row for set {set_id} game {game_id}")]
    DuplicatePoint { set_id: String, game_id: u32 },
}

/// Left-join the games of one match with their point sequences on
/// `(set_id, game_id)` and merge in the match context and participants.
///
/// Games keep their input order. A game without a point row gets an empty
/// `pbp_score`; no games yields no rows.
pub fn assemble_match(
    listing: &MatchListing,
    participants: &ParticipantMetadata,
    games: &[RawGameRecord],
    points: &[RawPointRecord],
) -> Result<Vec<AssembledMatchRecord>, AssemblyError> {
    if games.is_empty() {
        return Ok(Vec::new());
    }

    let mut points_by_key: HashMap<(&str, u32), &str> = HashMap::with_capacity(points.len());
    for point in points {
        if points_by_key
            .insert(point.key(), &point.point_sequence_text)
            .is_some()
        {
            return Err(AssemblyError::DuplicatePoint {
                set_id: point.set_id.clone(),
                game_id: point.game_id,
            });
        }
    }

    let mut seen = HashSet::with_capacity(games.len());
    let mut rows = Vec::with_capacity(games.len());
    for game in games {
        if !seen.insert(game.key()) {
            return Err(AssemblyError::DuplicateGame {
                set_id: game.set_id.clone(),
                game_id: game.game_id,
            });
        }
        let pbp_score = points_by_key
            .get(&game.key())
            .map(|text| text.to_string())
            .unwrap_or_default();

        rows.push(AssembledMatchRecord {
            match_url: game.match_url.clone(),
            tournament_name: listing.tournament_name.clone(),
            tournament_url: listing.tournament_url.clone(),
            round: listing.round.clone(),
            match_date: listing.match_date.clone(),
            set_id: game.set_id.clone(),
            game_id: game.game_id,
            game_score: game.score.clone(),
            pbp_score,
            home_serving: game.home_serving,
            away_serving: game.away_serving,
            home_lost_serve: game.home_lost_serve,
            away_lost_serve: game.away_lost_serve,
            player_home: participants.home.name.clone(),
            player_home_nationality: participants.home.nationality.clone(),
            player_home_img_url: participants.home.image_url.clone(),
            player_away: participants.away.name.clone(),
            player_away_nationality: participants.away.nationality.clone(),
            player_away_img_url: participants.away.image_url.clone(),
        });
    }
    Ok(rows)
}
