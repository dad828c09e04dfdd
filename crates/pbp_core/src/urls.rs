use url::Url;

const MATCH_SUMMARY_SUFFIX: &str = "/match-summary";
const POINT_BY_POINT_FIRST_SET: &str = "/point-by-point/0";

/// Rewrite a match summary url to the point-by-point page of its first set.
pub fn point_by_point_url(match_page_url: &str) -> String {
    let trimmed = match_page_url.trim_end_matches('/');
    let base = trimmed
        .strip_suffix(MATCH_SUMMARY_SUFFIX)
        .unwrap_or(trimmed);
    format!("{base}{POINT_BY_POINT_FIRST_SET}")
}

/// Drop the trailing `/<set index>` segment of a set page url.
pub fn match_url_from_set_page(set_page_url: &str) -> String {
    match set_page_url.rsplit_once('/') {
        Some((head, tail)) if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) => {
            head.to_string()
        }
        _ => set_page_url.to_string(),
    }
}

/// `<tournament>/archive/`
pub fn archive_url(tournament_href: &str) -> Result<String, url::ParseError> {
    join_directory(tournament_href, "archive/")
}

/// `<season>/results/`
pub fn season_results_url(season_href: &str) -> Result<String, url::ParseError> {
    join_directory(season_href, "results/")
}

/// Resolve a possibly relative href against the page it was found on.
/// Fragment-only and javascript references resolve to nothing.
pub fn resolve_href(base: &str, reference: &str) -> Option<String> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url.into());
    }
    Url::parse(base)
        .ok()
        .and_then(|base| base.join(trimmed).ok())
        .map(Into::into)
}

fn join_directory(base: &str, child: &str) -> Result<String, url::ParseError> {
    let mut dir = Url::parse(base)?;
    if !dir.path().ends_with('/') {
        let path = format!("{}/", dir.path());
        dir.set_path(&path);
    }
    Ok(dir.join(child)?.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_join_adds_missing_slash() {
        assert_eq!(
            archive_url("https://site.test/tennis/atp/wimbledon").unwrap(),
            "https://site.test/tennis/atp/wimbledon/archive/"
        );
        assert_eq!(
            season_results_url("https://site.test/tennis/atp/wimbledon-2023/").unwrap(),
            "https://site.test/tennis/atp/wimbledon-2023/results/"
        );
    }

    #[test]
    fn resolve_skips_fragments() {
        assert_eq!(resolve_href("https://a.test/x/", "#top"), None);
        assert_eq!(
            resolve_href("https://a.test/x/", "y").as_deref(),
            Some("https://a.test/x/y")
        );
    }
}
