use chrono::NaiveDate;
use serde::Deserialize;

#[cfg(test)]
use crate::model::Movie;
use crate::pagination::Pagination;

/// Query string of `GET /api/peliculas/filtrar`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieFilterQuery {
    pub titulo: Option<String>,
    #[serde(default)]
    pub en_cines: bool,
    #[serde(default)]
    pub proximos_estrenos: bool,
    pub genero_id: Option<i32>,
    pub pagina: Option<i64>,
    pub records_por_pagina: Option<i64>,
}

impl MovieFilterQuery {
    pub fn into_parts(self, today: NaiveDate) -> (MovieFilter, Pagination) {
        let pagination = Pagination::new(self.pagina, self.records_por_pagina);
        let filter = MovieFilter {
            title: self
                .titulo
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            in_theaters: self.en_cines,
            upcoming: self.proximos_estrenos,
            genre_id: self.genero_id.filter(|id| *id != 0),
            today,
        };
        (filter, pagination)
    }
}

/// Predicates restricting the movie collection. Every present predicate must
/// hold; an empty filter matches every movie.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieFilter {
    pub title: Option<String>,
    pub in_theaters: bool,
    pub upcoming: bool,
    pub genre_id: Option<i32>,
    pub today: NaiveDate,
}

impl MovieFilter {
    #[cfg(test)]
    pub fn unrestricted(today: NaiveDate) -> Self {
        Self {
            title: None,
            in_theaters: false,
            upcoming: false,
            genre_id: None,
            today,
        }
    }

    /// Evaluates the predicates against a single movie and its genre ids.
    #[cfg(test)]
    pub fn matches(&self, movie: &Movie, genre_ids: &[i32]) -> bool {
        if let Some(title) = &self.title {
            if !contains_ignore_case(&movie.title, title) {
                return false;
            }
        }
        if self.in_theaters && !movie.in_theaters {
            return false;
        }
        if self.upcoming && movie.release_date <= self.today {
            return false;
        }
        if let Some(genre_id) = self.genre_id {
            if !genre_ids.contains(&genre_id) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// `%fragment%` for `ILIKE`, with the pattern metacharacters escaped.
pub fn like_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn movie(title: &str, in_theaters: bool, release_date: NaiveDate) -> Movie {
        Movie {
            id: 1,
            title: title.to_string(),
            summary: None,
            trailer: None,
            in_theaters,
            release_date,
            poster: None,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = MovieFilter::unrestricted(today());
        assert!(filter.matches(&movie("Alien", false, today()), &[]));
    }

    #[test]
    fn title_match_ignores_case() {
        let filter = MovieFilter {
            title: Some("Matrix".into()),
            ..MovieFilter::unrestricted(today())
        };
        assert!(filter.matches(&movie("The Matrix Reloaded", false, today()), &[]));
        assert!(filter.matches(&movie("the matrix", false, today()), &[]));
        assert!(!filter.matches(&movie("Inception", false, today()), &[]));
    }

    #[test]
    fn in_theaters_requires_the_flag() {
        let filter = MovieFilter {
            in_theaters: true,
            ..MovieFilter::unrestricted(today())
        };
        assert!(filter.matches(&movie("A", true, today()), &[]));
        assert!(!filter.matches(&movie("B", false, today()), &[]));
    }

    #[test]
    fn upcoming_is_strictly_after_today() {
        let filter = MovieFilter {
            upcoming: true,
            ..MovieFilter::unrestricted(today())
        };
        let tomorrow = today().succ_opt().unwrap();
        assert!(filter.matches(&movie("Soon", false, tomorrow), &[]));
        assert!(!filter.matches(&movie("Today", false, today()), &[]));
    }

    #[test]
    fn genre_requires_a_join_row() {
        let filter = MovieFilter {
            genre_id: Some(3),
            ..MovieFilter::unrestricted(today())
        };
        assert!(filter.matches(&movie("A", false, today()), &[1, 3]));
        assert!(!filter.matches(&movie("A", false, today()), &[1, 2]));
    }

    #[test]
    fn genre_zero_and_blank_title_mean_no_filter() {
        let query = MovieFilterQuery {
            titulo: Some("   ".into()),
            genero_id: Some(0),
            records_por_pagina: Some(1000),
            ..Default::default()
        };
        let (filter, pagination) = query.into_parts(today());
        assert_eq!(filter, MovieFilter::unrestricted(today()));
        assert_eq!(pagination.records_per_page(), 50);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Matrix"), "%Matrix%");
        assert_eq!(like_pattern("100%_"), "%100\\%\\_%");
    }
}
