//! PBP core: pure record model, parsing and table assembly helpers.
mod aggregate;
mod assemble;
mod partition;
mod records;
mod score;
mod table;
mod urls;

pub use aggregate::{aggregate, AggregateResult, PartialResult};
pub use assemble::{assemble_match, AssemblyError};
pub use partition::{partition, split_into_chunks, Assignment, ParallelismPolicy};
pub use records::{
    AssembledMatchRecord, FailureRecord, MatchListing, Participant, ParticipantMetadata,
    RawGameRecord, RawPointRecord, TournamentLink, TournamentSeason, WorkUnit,
    MISSING_PBP_REASON, WORKER_TERMINATED_REASON,
};
pub use score::{
    is_lost_serve, is_serving, is_tiebreak_score, normalize_score, GameNumbering,
    TIEBREAK_GAME_ID,
};
pub use table::{Fields, FromTable, Table, TableError, TableRow};
pub use urls::{
    archive_url, match_url_from_set_page, point_by_point_url, resolve_href, season_results_url,
};
