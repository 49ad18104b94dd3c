//! Fetch orchestrator: combines a valid token with built queries and maps
//! upstream outcomes to a single render decision. Nothing below this layer
//! decides user-visible behavior.

use crate::api::IgdbClient;
use crate::api::models::{Company, CountResponse, Game};
use crate::config::{Config, DetailLookup};
use crate::core::query::{FilterSet, QueryBuilder};
use crate::core::token_cache::TokenCache;
use crate::error::{AppError, FetchError, UpstreamError};
use futures::try_join;
use serde::Serialize;

const GAMES_ENDPOINT: &str = "/games";
const GAMES_COUNT_ENDPOINT: &str = "/games/count";
const COMPANIES_ENDPOINT: &str = "/companies";

/// Rendering-ready listing payload. Never partially constructed: either
/// both the data and count fetch succeeded, or the whole call failed.
#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    pub games: Vec<Game>,
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u64,
    /// Echoed filters for link-building in the rendering layer.
    pub filters: FilterSet,
}

#[derive(Debug, Clone)]
pub struct CatalogService {
    client: IgdbClient,
    tokens: TokenCache,
    queries: QueryBuilder,
    detail_lookup: DetailLookup,
}

impl CatalogService {
    pub fn new(
        client: IgdbClient,
        tokens: TokenCache,
        queries: QueryBuilder,
        detail_lookup: DetailLookup,
    ) -> Self {
        Self {
            client,
            tokens,
            queries,
            detail_lookup,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = IgdbClient::new(
            config.api_url.clone(),
            config.token_url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
            config.request_timeout,
        )
        .map_err(FetchError::Upstream)?;

        Ok(Self::new(
            client,
            TokenCache::new(config.token_ttl),
            QueryBuilder::new(config.default_min_rating),
            config.detail_lookup,
        ))
    }

    /// Fetch one listing page. The data query and its count companion run
    /// concurrently; if either fails the page fails as a whole.
    pub async fn fetch_page(&self, filters: &FilterSet) -> Result<PageResult, FetchError> {
        let token = self.tokens.get_token(&self.client).await?;
        let query = self.queries.build(filters);

        let joined: Result<(Vec<Game>, CountResponse), UpstreamError> = try_join!(
            self.client.query(GAMES_ENDPOINT, &token, &query.data),
            self.client.query(GAMES_COUNT_ENDPOINT, &token, &query.count),
        );
        let (games, count) = match joined {
            Ok(pair) => pair,
            Err(err) => {
                self.note_upstream_failure(&err).await;
                return Err(err.into());
            }
        };

        tracing::debug!(
            mode = ?query.mode,
            page = filters.page,
            total = count.count,
            "listing page fetched"
        );

        Ok(PageResult {
            total_pages: total_pages(count.count, filters.page_size),
            games,
            page: filters.page,
            page_size: filters.page_size,
            total_count: count.count,
            filters: filters.clone(),
        })
    }

    /// Fetch a single game with the full detail projection. The route
    /// carries both a slug and an id; which one drives the lookup is
    /// configured per deployment.
    pub async fn fetch_game(&self, slug: &str, id: u64) -> Result<Game, AppError> {
        let body = QueryBuilder::game_detail(self.detail_lookup, slug, id)?;
        let token = self
            .tokens
            .get_token(&self.client)
            .await
            .map_err(FetchError::Auth)?;

        let games: Vec<Game> = match self.client.query(GAMES_ENDPOINT, &token, &body).await {
            Ok(games) => games,
            Err(err) => {
                self.note_upstream_failure(&err).await;
                return Err(FetchError::Upstream(err).into());
            }
        };

        let game = games
            .into_iter()
            .next()
            .ok_or_else(|| no_record(GAMES_ENDPOINT))
            .map_err(FetchError::Upstream)?;

        if let Some(actual) = game.slug.as_deref() {
            if actual != slug {
                tracing::warn!(
                    path_slug = slug,
                    record_slug = actual,
                    id,
                    "detail route slug does not match the fetched record"
                );
            }
        }

        Ok(game)
    }

    /// Related-entity lookup: a company by slug, with its developed and
    /// published titles nested in.
    pub async fn fetch_company(&self, slug: &str) -> Result<Company, AppError> {
        let body = QueryBuilder::company_by_slug(slug)?;
        let token = self
            .tokens
            .get_token(&self.client)
            .await
            .map_err(FetchError::Auth)?;

        let companies: Vec<Company> = match self.client.query(COMPANIES_ENDPOINT, &token, &body).await
        {
            Ok(companies) => companies,
            Err(err) => {
                self.note_upstream_failure(&err).await;
                return Err(FetchError::Upstream(err).into());
            }
        };

        companies
            .into_iter()
            .next()
            .ok_or_else(|| no_record(COMPANIES_ENDPOINT))
            .map_err(FetchError::Upstream)
            .map_err(AppError::Fetch)
    }

    /// A 401 or 403 from the metadata API means the cached token went
    /// stale or was revoked ahead of its TTL; drop it so the next request
    /// refreshes instead of failing until expiry.
    async fn note_upstream_failure(&self, err: &UpstreamError) {
        if let UpstreamError::Http {
            status: 401 | 403, ..
        } = err
        {
            tracing::warn!("metadata API rejected the bearer token, invalidating cache");
            self.tokens.invalidate().await;
        }
    }
}

fn no_record(endpoint: &str) -> UpstreamError {
    UpstreamError::Http {
        status: 404,
        endpoint: endpoint.to_string(),
        message: "empty result set".to_string(),
    }
}

fn total_pages(total_count: u64, page_size: u32) -> u64 {
    total_count.div_ceil(page_size as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_is_ceiling_division() {
        assert_eq!(total_pages(45, 20), 3);
        assert_eq!(total_pages(40, 20), 2);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(0, 20), 0);
    }

    #[test]
    fn test_no_record_maps_to_upstream_404() {
        let err = no_record(GAMES_ENDPOINT);
        assert!(matches!(err, UpstreamError::Http { status: 404, .. }));
    }
}
