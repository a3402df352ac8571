use crate::selector::ticks_to_minutes;
use serde::{Deserialize, Serialize};

pub const MOVIES_COLLECTION_TYPE: &str = "movies";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// One entry of `/Library/MediaFolders`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaFolder {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "CollectionType", default)]
    pub collection_type: Option<String>,
}

impl MediaFolder {
    /// Declared collection type, empty when the server leaves it unset.
    pub fn collection_type(&self) -> &str {
        self.collection_type.as_deref().unwrap_or_default()
    }
}

/// Paged item listing shared by the folder and item endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemsPage<T> {
    #[serde(rename = "Items", default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(rename = "TotalRecordCount", default)]
    pub total_record_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ProductionYear", default)]
    pub production_year: Option<i32>,
    #[serde(rename = "RunTimeTicks", default)]
    pub run_time_ticks: Option<i64>,
    #[serde(rename = "CommunityRating", default)]
    pub community_rating: Option<f64>,
    #[serde(rename = "Overview", default)]
    pub overview: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Library {
    pub name: String,
    pub id: String,
}

impl From<&MediaFolder> for Library {
    fn from(folder: &MediaFolder) -> Self {
        Self {
            name: folder.name.clone(),
            id: folder.id.clone(),
        }
    }
}

/// What `/random` hands back to the browser.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieResponse {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub duration: i64,
    pub rating: f64,
    pub overview: String,
    pub image_url: String,
    pub jellyfin_url: String,
}

impl MovieResponse {
    pub fn new(movie: &Movie, jellyfin_url: &str) -> Self {
        Self {
            id: movie.id.clone(),
            name: movie.name.clone(),
            year: movie.production_year.unwrap_or_default(),
            duration: ticks_to_minutes(movie.run_time_ticks.unwrap_or_default()),
            rating: movie.community_rating.unwrap_or_default(),
            overview: movie.overview.clone().unwrap_or_default(),
            image_url: format!("{}/Items/{}/Images/Primary", jellyfin_url, movie.id),
            jellyfin_url: format!("{}/web/index.html#!/details?id={}", jellyfin_url, movie.id),
        }
    }
}
