use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use pbp_core::{
    archive_url, assemble_match, is_lost_serve, is_serving, match_url_from_set_page,
    normalize_score, point_by_point_url, resolve_href, season_results_url, AssembledMatchRecord,
    GameNumbering, MatchListing, Participant, ParticipantMetadata, RawGameRecord, RawPointRecord,
    TournamentLink, TournamentSeason, MISSING_PBP_REASON,
};

use crate::locators as loc;
use crate::navigator::{Element, Navigator, ViewHandle};
use crate::{ExtractError, NavError, UnitOutcome, WaitCondition};

/// One set tab of a match page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetTab {
    pub set_id: String,
    pub href: String,
}

/// Walks the site hierarchy through a [`Navigator`].
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    wait_timeout: Duration,
}

impl Extractor {
    pub fn new(wait_timeout: Duration) -> Self {
        Self { wait_timeout }
    }

    async fn wait_one(
        &self,
        nav: &mut dyn Navigator,
        selector: &str,
    ) -> Result<Element, ExtractError> {
        nav.wait_for(&WaitCondition::present(selector), self.wait_timeout)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                NavError::NotFound {
                    selector: selector.to_string(),
                }
                .into()
            })
    }

    /// Expand the tournament menu of the root listing and collect every
    /// tournament link.
    pub async fn tournament_links(
        &self,
        nav: &mut dyn Navigator,
        root_url: &str,
    ) -> Result<Vec<TournamentLink>, ExtractError> {
        nav.open(root_url).await?;
        let toggle = self.wait_one(nav, loc::TOURNAMENT_MENU_TOGGLE).await?;
        nav.click(&toggle).await?;
        let menu = self.wait_one(nav, loc::TOURNAMENT_MENU_OPENED).await?;

        let base = nav.current_url()?;
        let links = nav
            .find_all_in(&menu, loc::TOURNAMENT_MENU_LINK)?
            .iter()
            .filter_map(|anchor| nav.read_attribute(anchor, "href"))
            .filter_map(|href| resolve_href(&base, &href))
            .map(|href| TournamentLink { href })
            .collect();
        Ok(links)
    }

    /// Every archived season of one tournament, newest first as listed.
    pub async fn seasons(
        &self,
        nav: &mut dyn Navigator,
        tournament: &TournamentLink,
    ) -> Result<Vec<TournamentSeason>, ExtractError> {
        nav.open(&tournament.href).await?;
        let header = nav.find_one(loc::LEAGUE_HEADER_TEXT)?;
        let city_and_surface = nav.read_text(&header);

        let archive = archive_url(&tournament.href)
            .map_err(|err| NavError::InvalidUrl(format!("{}: {err}", tournament.href)))?;
        nav.open(&archive).await?;
        let base = nav.current_url()?;

        let logo = self.wait_one(nav, loc::HEADING_LOGO).await?;
        let image_url = nav
            .read_attribute(&logo, "src")
            .and_then(|src| resolve_href(&base, &src))
            .unwrap_or_default();
        let heading = self.wait_one(nav, loc::HEADING_NAME).await?;
        let name = nav.read_text(&heading);

        let rows = nav
            .wait_for(&WaitCondition::present(loc::ARCHIVE_SEASON), self.wait_timeout)
            .await?;
        // The first row is the table header.
        let mut seasons = Vec::with_capacity(rows.len().saturating_sub(1));
        for row in rows.iter().skip(1) {
            let anchor = nav.find_in(row, loc::ARCHIVE_SEASON_LINK)?;
            let title = nav.read_text(&anchor);
            let href = nav
                .read_attribute(&anchor, "href")
                .and_then(|href| resolve_href(&base, &href))
                .ok_or_else(|| ExtractError::DataShape(format!("season {title} has no link")))?;
            let results = season_results_url(&href)
                .map_err(|err| NavError::InvalidUrl(format!("{href}: {err}")))?;

            seasons.push(TournamentSeason {
                name: name.clone(),
                tournament_url: tournament.href.clone(),
                image_url: image_url.clone(),
                city_and_surface: city_and_surface.clone(),
                year: last_chars(&title, 4).to_string(),
                href: results,
            });
        }
        Ok(seasons)
    }

    /// Scan a season results page top to bottom. Stops for good at the
    /// first qualification section.
    pub async fn matches(
        &self,
        nav: &mut dyn Navigator,
        season: &TournamentSeason,
    ) -> Result<Vec<MatchListing>, ExtractError> {
        nav.open(&season.href).await?;
        let title = nav.read_text(&nav.find_one(loc::HEADING_NAME)?);
        let info = nav.read_text(&nav.find_one(loc::HEADING_INFO)?);
        let tournament_name = format!("{title} - {info}");

        let primary = nav.current_view()?;
        let rows = nav.find_all(loc::RESULT_ROWS)?;

        let mut round = String::new();
        let mut listings = Vec::new();
        for row in &rows {
            if is_round_row(row) {
                round = nav.read_text(row);
            } else if row.has_class(loc::MATCH_ROW_CLASS) {
                let match_date = nav.read_text(&nav.find_in(row, loc::MATCH_TIME)?);
                let match_url = self.match_url_via_secondary_view(nav, row, primary).await?;
                listings.push(MatchListing {
                    tournament_name: tournament_name.clone(),
                    tournament_url: season.href.clone(),
                    round: round.clone(),
                    match_url,
                    match_date,
                });
            } else if nav
                .read_text(row)
                .to_lowercase()
                .contains(loc::QUALIFICATION_MARKER)
            {
                engine_debug!("qualification section reached on {}", season.href);
                break;
            }
        }
        Ok(listings)
    }

    async fn match_url_via_secondary_view(
        &self,
        nav: &mut dyn Navigator,
        row: &Element,
        primary: ViewHandle,
    ) -> Result<String, ExtractError> {
        let result = self.read_secondary_view(nav, row, primary).await;
        if result.is_err() {
            restore_primary(nav, primary);
        }
        result
    }

    async fn read_secondary_view(
        &self,
        nav: &mut dyn Navigator,
        row: &Element,
        primary: ViewHandle,
    ) -> Result<String, ExtractError> {
        nav.click(row).await?;
        nav.wait_for(&WaitCondition::ViewCount(2), self.wait_timeout)
            .await?;
        let secondary = nav
            .list_views()
            .into_iter()
            .find(|handle| *handle != primary)
            .ok_or(NavError::NoSuchView)?;
        nav.switch_view(secondary)?;
        let url = nav.current_url()?;
        nav.close_current_view()?;
        nav.switch_view(primary)?;
        Ok(point_by_point_url(&url))
    }

    pub fn has_point_by_point(&self, nav: &dyn Navigator) -> bool {
        nav.find_one(loc::PBP_INDICATOR).is_ok()
    }

    /// Scrape every set of an eligible match and join games with points.
    pub async fn match_detail(
        &self,
        nav: &mut dyn Navigator,
        listing: &MatchListing,
    ) -> Result<UnitOutcome<AssembledMatchRecord>, ExtractError> {
        nav.open(&listing.match_url).await?;
        if !self.has_point_by_point(nav) {
            return Ok(UnitOutcome::Ineligible {
                reason: MISSING_PBP_REASON,
            });
        }

        let sets = self.set_tabs(nav).await?;
        let participants = self.participants(nav).await?;

        let mut games = Vec::new();
        let mut points = Vec::new();
        for set in &sets {
            nav.open(&set.href).await?;
            games.extend(self.game_rows(nav, &set.set_id)?);
            points.extend(self.point_rows(nav, &set.set_id)?);
        }
        engine_debug!(
            "{}: {} sets, {} games, {} point rows",
            listing.match_url,
            sets.len(),
            games.len(),
            points.len()
        );

        let rows = assemble_match(listing, &participants, &games, &points)?;
        Ok(UnitOutcome::Extracted(rows))
    }

    pub async fn set_tabs(&self, nav: &mut dyn Navigator) -> Result<Vec<SetTab>, ExtractError> {
        let tabs = self.wait_one(nav, loc::SET_TABS).await?;
        let base = nav.current_url()?;
        nav.find_all_in(&tabs, loc::SET_TAB_LINK)?
            .iter()
            .map(|anchor| -> Result<SetTab, ExtractError> {
                let title = nav.read_attribute(anchor, "title").unwrap_or_default();
                let set_id = title
                    .trim()
                    .chars()
                    .last()
                    .map(String::from)
                    .ok_or_else(|| ExtractError::DataShape("set tab without title".into()))?;
                let href = nav
                    .read_attribute(anchor, "href")
                    .and_then(|href| resolve_href(&base, &href))
                    .ok_or_else(|| {
                        ExtractError::DataShape(format!("set tab {title} has no link"))
                    })?;
                Ok(SetTab { set_id, href })
            })
            .collect()
    }

    /// Game rows of the set page currently open.
    pub fn game_rows(
        &self,
        nav: &dyn Navigator,
        set_id: &str,
    ) -> Result<Vec<RawGameRecord>, ExtractError> {
        let match_url = match_url_from_set_page(&nav.current_url()?);
        let mut numbering = GameNumbering::new();
        nav.find_all(loc::GAME_ROW)?
            .iter()
            .map(|row| -> Result<RawGameRecord, ExtractError> {
                let score = normalize_score(&nav.read_markup(&nav.find_in(row, loc::GAME_SCORE)?));
                let game_id = numbering.next_id(&score);
                Ok(RawGameRecord {
                    match_url: match_url.clone(),
                    set_id: set_id.to_string(),
                    game_id,
                    score,
                    home_serving: is_serving(&nav.read_markup(&nav.find_in(row, loc::HOME_SERVE)?)),
                    away_serving: is_serving(&nav.read_markup(&nav.find_in(row, loc::AWAY_SERVE)?)),
                    home_lost_serve: is_lost_serve(
                        &nav.read_text(&nav.find_in(row, loc::HOME_LOST_SERVE)?),
                    ),
                    away_lost_serve: is_lost_serve(
                        &nav.read_text(&nav.find_in(row, loc::AWAY_LOST_SERVE)?),
                    ),
                })
            })
            .collect()
    }

    /// Point sequence rows of the set page currently open, numbered by
    /// position.
    pub fn point_rows(
        &self,
        nav: &dyn Navigator,
        set_id: &str,
    ) -> Result<Vec<RawPointRecord>, ExtractError> {
        Ok(nav
            .find_all(loc::POINT_ROW)?
            .iter()
            .zip(1u32..)
            .map(|(row, game_id)| RawPointRecord {
                set_id: set_id.to_string(),
                game_id,
                point_sequence_text: nav.read_text(row),
            })
            .collect())
    }

    /// Visit both participant profiles and come back to the match page.
    pub async fn participants(
        &self,
        nav: &mut dyn Navigator,
    ) -> Result<ParticipantMetadata, ExtractError> {
        let home = self.participant(nav, loc::HOME_PARTICIPANT).await?;
        let away = self.participant(nav, loc::AWAY_PARTICIPANT).await?;
        Ok(ParticipantMetadata { home, away })
    }

    async fn participant(
        &self,
        nav: &mut dyn Navigator,
        side: &str,
    ) -> Result<Participant, ExtractError> {
        let container = nav.find_one(side)?;
        let link = nav.find_in(&container, loc::PARTICIPANT_LINK)?;
        let match_page = nav.current_url()?;
        let profile = nav
            .read_attribute(&link, "href")
            .and_then(|href| resolve_href(&match_page, &href))
            .ok_or_else(|| ExtractError::DataShape(format!("{side} has no profile link")))?;

        nav.open(&profile).await?;
        let name = nav.read_text(&nav.find_one(loc::PLAYER_NAME)?);
        let nationality = nav.read_text(&nav.find_one(loc::PLAYER_NATIONALITY)?);
        let image = nav.find_one(loc::PLAYER_IMAGE)?;
        let image_url = nav
            .read_attribute(&image, "src")
            .and_then(|src| resolve_href(&profile, &src))
            .unwrap_or_default();
        nav.open(&match_page).await?;

        Ok(Participant {
            name,
            nationality,
            image_url,
        })
    }
}

fn is_round_row(row: &Element) -> bool {
    row.attribute("class").is_some_and(|class| {
        class.split_whitespace().eq(loc::ROUND_ROW_CLASS.split_whitespace())
    })
}

/// Close every view but `primary` and make it current again.
fn restore_primary(nav: &mut dyn Navigator, primary: ViewHandle) {
    for handle in nav.list_views() {
        if handle == primary {
            continue;
        }
        if nav.switch_view(handle).is_ok() {
            if let Err(err) = nav.close_current_view() {
                engine_warn!("could not close view {:?}: {}", handle, err);
            }
        }
    }
    if let Err(err) = nav.switch_view(primary) {
        engine_warn!("could not return to the primary view: {}", err);
    }
}

fn last_chars(text: &str, count: usize) -> &str {
    let start = text
        .char_indices()
        .rev()
        .nth(count.saturating_sub(1))
        .map_or(0, |(idx, _)| idx);
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Views 1..=3 with view 2 refusing to close.
    struct StuckViews {
        open: Vec<ViewHandle>,
        current: ViewHandle,
    }

    #[async_trait::async_trait]
    impl Navigator for StuckViews {
        async fn open(&mut self, _url: &str) -> Result<(), NavError> {
            Ok(())
        }

        fn current_url(&self) -> Result<String, NavError> {
            Ok(String::new())
        }

        fn find_all(&self, _selector: &str) -> Result<Vec<Element>, NavError> {
            Ok(Vec::new())
        }

        async fn wait_for(
            &mut self,
            _condition: &WaitCondition,
            _timeout: Duration,
        ) -> Result<Vec<Element>, NavError> {
            Ok(Vec::new())
        }

        fn list_views(&self) -> Vec<ViewHandle> {
            self.open.clone()
        }

        fn current_view(&self) -> Result<ViewHandle, NavError> {
            Ok(self.current)
        }

        fn switch_view(&mut self, handle: ViewHandle) -> Result<(), NavError> {
            if !self.open.contains(&handle) {
                return Err(NavError::NoSuchView);
            }
            self.current = handle;
            Ok(())
        }

        fn close_current_view(&mut self) -> Result<(), NavError> {
            if self.current == ViewHandle(2) {
                return Err(NavError::SessionClosed);
            }
            let current = self.current;
            self.open.retain(|handle| *handle != current);
            Ok(())
        }

        async fn click(&mut self, _element: &Element) -> Result<(), NavError> {
            Ok(())
        }

        async fn quit(&mut self) {
            self.open.clear();
        }
    }

    #[test]
    fn failed_close_does_not_stop_restoring_the_primary_view() {
        engine_logging::initialize_for_tests();
        let mut nav = StuckViews {
            open: vec![ViewHandle(1), ViewHandle(2), ViewHandle(3)],
            current: ViewHandle(3),
        };

        restore_primary(&mut nav, ViewHandle(1));

        assert_eq!(nav.open, vec![ViewHandle(1), ViewHandle(2)]);
        assert_eq!(nav.current, ViewHandle(1));
    }

    #[test]
    fn last_chars_handles_short_and_multibyte_text() {
        assert_eq!(last_chars("Wimbledon 2023", 4), "2023");
        assert_eq!(last_chars("23", 4), "23");
        assert_eq!(last_chars("Zürich 1999", 4), "1999");
    }

    #[test]
    fn round_rows_match_the_full_class_list() {
        let round = Element::from_html(
            r#"<div class="event__round  event__round--static">Final</div>"#,
        )
        .unwrap();
        let other =
            Element::from_html(r#"<div class="event__round event__round--static extra">x</div>"#)
                .unwrap();
        assert!(is_round_row(&round));
        assert!(!is_round_row(&other));
    }
}
