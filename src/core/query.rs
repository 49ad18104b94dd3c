//! Filter validation and APICalypse query construction.
//!
//! Queries are held as a typed condition list and serialized to text only
//! at the boundary; every user-supplied value is validated or escaped
//! before it reaches the query body.

use crate::config::DetailLookup;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Projection for listing pages.
const LIST_FIELDS: &str = "name, slug, rating, cover.url, genres.name, platforms.name";

/// Larger projection for the detail page, including nested sub-objects.
const DETAIL_FIELDS: &str = "name, slug, rating, summary, cover.url, screenshots.url, \
     genres.name, platforms.name, themes.name, \
     involved_companies.company.name, involved_companies.company.slug, \
     involved_companies.developer, involved_companies.publisher, \
     similar_games.name, similar_games.slug, similar_games.cover.url";

const COMPANY_FIELDS: &str = "name, slug, description, logo.url, \
     developed.name, developed.slug, developed.cover.url, \
     published.name, published.slug, published.cover.url";

/// IGDB rejects limits above 500.
const MAX_PAGE_SIZE: u32 = 500;

/// Raw query-string parameters as they arrive on `GET /games`. Everything
/// is an optional string until validation has run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFilters {
    pub search: Option<String>,
    pub range: Option<String>,
    pub theme: Option<String>,
    pub genre: Option<String>,
    pub platform: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Validated filter parameters. Only constructed through [`FilterSet::validate`],
/// so page and page_size are always positive and ids are well-formed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSet {
    pub search: Option<String>,
    pub min_rating: Option<u8>,
    pub theme: Option<u64>,
    pub genre: Option<u64>,
    pub platform: Option<u64>,
    pub page: u32,
    pub page_size: u32,
}

impl FilterSet {
    /// Validate raw inbound parameters. Empty strings count as absent
    /// (HTML forms submit untouched fields as `""`).
    pub fn validate(raw: RawFilters, default_page_size: u32) -> Result<Self, ValidationError> {
        let search = match raw.search.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(term) => Some(checked_search_term(term)?),
        };

        let page = match present(raw.page.as_deref()) {
            Some(value) => parse_number::<u32>("page", value, 1, u32::MAX as u64)?,
            None => 1,
        };
        let page_size = match present(raw.limit.as_deref()) {
            Some(value) => parse_number::<u32>("limit", value, 1, MAX_PAGE_SIZE as u64)?,
            None => default_page_size,
        };

        Ok(Self {
            search,
            min_rating: match present(raw.range.as_deref()) {
                Some(value) => Some(parse_number::<u8>("range", value, 0, 100)?),
                None => None,
            },
            theme: parse_id("theme", raw.theme.as_deref())?,
            genre: parse_id("genre", raw.genre.as_deref())?,
            platform: parse_id("platform", raw.platform.as_deref())?,
            page,
            page_size,
        })
    }

    /// Widened to u64: page can reach `u32::MAX`, so the product would
    /// overflow u32 arithmetic.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number<T>(parameter: &str, value: &str, min: u64, max: u64) -> Result<T, ValidationError>
where
    T: TryFrom<u64>,
{
    let parsed: u64 = value.parse().map_err(|_| ValidationError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: "not a whole number".to_string(),
    })?;

    if parsed < min || parsed > max {
        return Err(ValidationError::InvalidParameter {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: format!("must be between {} and {}", min, max),
        });
    }

    T::try_from(parsed).map_err(|_| ValidationError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: "out of range".to_string(),
    })
}

fn parse_id(parameter: &str, value: Option<&str>) -> Result<Option<u64>, ValidationError> {
    match present(value) {
        Some(value) => Ok(Some(parse_number::<u64>(parameter, value, 1, u64::MAX)?)),
        None => Ok(None),
    }
}

/// Control characters have no place in a search term; everything else is
/// allowed and escaped at serialization time.
fn checked_search_term(term: &str) -> Result<String, ValidationError> {
    if term.chars().any(char::is_control) {
        return Err(ValidationError::UnsafeValue {
            parameter: "search".to_string(),
        });
    }
    Ok(term.to_string())
}

/// Escape a validated term for embedding inside an APICalypse string
/// literal. Runs at the boundary so the echoed FilterSet keeps the raw term.
fn escape_term(term: &str) -> String {
    term.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Slugs come from path segments and are embedded in equality conditions;
/// restrict them to the slug alphabet outright.
pub fn checked_slug(slug: &str) -> Result<&str, ValidationError> {
    let well_formed = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if well_formed {
        Ok(slug)
    } else {
        Err(ValidationError::UnsafeValue {
            parameter: "slug".to_string(),
        })
    }
}

/// A single where-clause condition. Values are typed; rendering happens
/// only when the full query is serialized.
#[derive(Debug, Clone, PartialEq)]
enum Condition {
    RatingAtLeast(u8),
    Theme(u64),
    Genre(u64),
    Platform(u64),
}

impl Condition {
    fn render(&self) -> String {
        match self {
            Condition::RatingAtLeast(rating) => format!("rating >= {}", rating),
            Condition::Theme(id) => format!("themes = {}", id),
            Condition::Genre(id) => format!("genres = {}", id),
            Condition::Platform(id) => format!("platforms = {}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Search,
    Browse,
}

/// Immutable pair of APICalypse bodies: the data query and its count
/// companion for pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub mode: QueryMode,
    pub data: String,
    pub count: String,
}

/// Compiles validated filters into APICalypse text.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    default_min_rating: u8,
}

impl QueryBuilder {
    pub fn new(default_min_rating: u8) -> Self {
        Self { default_min_rating }
    }

    /// Mode selection is total: a present search term means free-text
    /// search, anything else is a filtered browse.
    pub fn build(&self, filters: &FilterSet) -> Query {
        match &filters.search {
            Some(term) => Self::search_query(term, filters),
            None => self.browse_query(filters),
        }
    }

    fn search_query(term: &str, filters: &FilterSet) -> Query {
        let term = escape_term(term);
        Query {
            mode: QueryMode::Search,
            data: format!(
                "fields {}; search \"{}\"; limit {}; offset {};",
                LIST_FIELDS,
                term,
                filters.page_size,
                filters.offset()
            ),
            count: format!("search \"{}\";", term),
        }
    }

    fn browse_query(&self, filters: &FilterSet) -> Query {
        let mut conditions = Vec::new();
        if let Some(rating) = filters.min_rating {
            conditions.push(Condition::RatingAtLeast(rating));
        }
        if let Some(id) = filters.theme {
            conditions.push(Condition::Theme(id));
        }
        if let Some(id) = filters.genre {
            conditions.push(Condition::Genre(id));
        }
        if let Some(id) = filters.platform {
            conditions.push(Condition::Platform(id));
        }

        // An unfiltered browse still needs a where-clause, or the listing
        // would surface every unrated entry in the catalog.
        if conditions.is_empty() {
            conditions.push(Condition::RatingAtLeast(self.default_min_rating));
        }

        let where_clause = conditions
            .iter()
            .map(Condition::render)
            .collect::<Vec<_>>()
            .join(" & ");

        Query {
            mode: QueryMode::Browse,
            data: format!(
                "fields {}; where {}; sort rating desc; limit {}; offset {};",
                LIST_FIELDS,
                where_clause,
                filters.page_size,
                filters.offset()
            ),
            count: format!("where {};", where_clause),
        }
    }

    /// Detail query with the larger nested projection. The lookup key is a
    /// deployment choice; both the slug and the id arrive on the route.
    pub fn game_detail(lookup: DetailLookup, slug: &str, id: u64) -> Result<String, ValidationError> {
        let condition = match lookup {
            DetailLookup::Id => format!("id = {}", id),
            DetailLookup::Slug => format!("slug = \"{}\"", checked_slug(slug)?),
        };
        Ok(format!("fields {}; where {};", DETAIL_FIELDS, condition))
    }

    pub fn company_by_slug(slug: &str) -> Result<String, ValidationError> {
        Ok(format!(
            "fields {}; where slug = \"{}\";",
            COMPANY_FIELDS,
            checked_slug(slug)?
        ))
    }
}
