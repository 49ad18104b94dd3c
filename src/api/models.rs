use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Custom deserializer: IGDB serves protocol-relative image URLs
/// (`//images.igdb.com/...`); normalize them to https at the boundary.
fn deserialize_image_url<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) if s.starts_with("//") => Ok(Some(format!("https:{}", s))),
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

// Identity endpoint models
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

// Metadata API models
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Game {
    pub id: u64,
    pub name: String,
    pub slug: Option<String>,
    pub rating: Option<f64>,
    pub summary: Option<String>,
    pub cover: Option<Image>,
    pub screenshots: Option<Vec<Image>>,
    pub genres: Option<Vec<Named>>,
    pub platforms: Option<Vec<Named>>,
    pub themes: Option<Vec<Named>>,
    pub involved_companies: Option<Vec<InvolvedCompany>>,
    pub similar_games: Option<Vec<GameSummary>>,
}

/// Trimmed game record used in listings and nested references.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GameSummary {
    pub id: u64,
    pub name: String,
    pub slug: Option<String>,
    pub rating: Option<f64>,
    pub cover: Option<Image>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Image {
    pub id: u64,
    #[serde(deserialize_with = "deserialize_image_url", default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Named {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InvolvedCompany {
    pub id: u64,
    pub company: Option<Named>,
    #[serde(default)]
    pub developer: bool,
    #[serde(default)]
    pub publisher: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Company {
    pub id: u64,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub logo: Option<Image>,
    pub developed: Option<Vec<GameSummary>>,
    pub published: Option<Vec<GameSummary>>,
}

/// `/games/count` style endpoints return a single-field object.
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct CountResponse {
    pub count: u64,
}
