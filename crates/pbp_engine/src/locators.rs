//! CSS selectors for the results site.

// Root listing.
pub const TOURNAMENT_MENU_TOGGLE: &str = "#lmenu_5724";
pub const TOURNAMENT_MENU_OPENED: &str = ".lmc__block.lmc__blockOpened";
pub const TOURNAMENT_MENU_LINK: &str = ".lmc__templateHref";

// Tournament and archive pages.
pub const LEAGUE_HEADER_TEXT: &str = ".wclLeagueHeader__textColor";
pub const HEADING_LOGO: &str = ".heading__logo";
pub const HEADING_NAME: &str = ".heading__name";
pub const HEADING_INFO: &str = ".heading__info";
pub const ARCHIVE_SEASON: &str = ".archive__season";
pub const ARCHIVE_SEASON_LINK: &str = ".archive__text";

// Season results page.
pub const RESULT_ROWS: &str = "div.sportName.tennis > *";
/// Full class attribute of a round header row.
pub const ROUND_ROW_CLASS: &str = "event__round event__round--static";
pub const MATCH_ROW_CLASS: &str = "event__match--twoLine";
pub const MATCH_TIME: &str = ".event__time";
pub const QUALIFICATION_MARKER: &str = "qualification";

// Match pages.
pub const PBP_INDICATOR: &str = ".filterOver.filterOver--indent";
pub const SET_TABS: &str = "._tabs_1b0gr_5._tabsTertiary_1b0gr_75";
pub const SET_TAB_LINK: &str = "a";
pub const GAME_ROW: &str = ".matchHistoryRow";
pub const GAME_SCORE: &str = ".matchHistoryRow__scoreBox";
pub const HOME_SERVE: &str = ".matchHistoryRow__servis.matchHistoryRow__home";
pub const AWAY_SERVE: &str = ".matchHistoryRow__servis.matchHistoryRow__away";
pub const HOME_LOST_SERVE: &str = ".matchHistoryRow__lostServe.matchHistoryRow__home";
pub const AWAY_LOST_SERVE: &str = ".matchHistoryRow__lostServe.matchHistoryRow__away";
pub const POINT_ROW: &str = ".matchHistoryRow__fifteens";

// Participants.
pub const HOME_PARTICIPANT: &str = ".duelParticipant__home";
pub const AWAY_PARTICIPANT: &str = ".duelParticipant__away";
pub const PARTICIPANT_LINK: &str = ".participant__participantLink";
pub const PLAYER_NAME: &str = ".heading__name";
pub const PLAYER_NATIONALITY: &str = ".breadcrumb__text";
pub const PLAYER_IMAGE: &str = ".heading__logo.heading__logo--1";
