//! Learning tracks and their ratings

use std::ops::Deref;
use std::sync::{Arc, PoisonError, RwLock};

use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{Access, ApiClient};
use crate::error::{Error, Result};
use crate::payload::BodyKind;
use crate::resource::{Entity, Envelope, Resource, ResourceStore};

/// Track routes. Tracks carry an image, so create and update take
/// multipart form data.
#[derive(Debug)]
pub struct Track;

impl Resource for Track {
    const PATH: &'static str = "/api/tracks";
    const PLURAL: &'static str = "tracks";
    const SINGULAR: &'static str = "track";
    const LABEL: &'static str = "Track";
    const ACCESS: Access = Access::Bearer;
    const CREATE_BODY: BodyKind = BodyKind::Form;
    const UPDATE_BODY: BodyKind = BodyKind::Form;
}

/// Ratings are read and submitted without the bearer token
const RATINGS_ACCESS: Access = Access::Public;

/// A learner's rating of a track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingInput {
    /// Score from 1 to 5
    pub rating: u8,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl RatingInput {
    pub fn new(rating: u8) -> Self {
        Self {
            rating,
            comment: None,
        }
    }

    pub fn with_comment<T: Into<String>>(mut self, comment: T) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Check the score is between 1 and 5
    pub fn validate(&self) -> Result<()> {
        if (1..=5).contains(&self.rating) {
            Ok(())
        } else {
            Err(Error::validation("Rating must be between 1 and 5"))
        }
    }
}

/// Store holding the tracks and the ratings of the last track looked at.
///
/// Dereferences to the generic [`ResourceStore`] for the common operations.
#[derive(Debug)]
pub struct TracksStore {
    store: ResourceStore<Track>,
    ratings: RwLock<Vec<Arc<Entity>>>,
}

impl Deref for TracksStore {
    type Target = ResourceStore<Track>;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl TracksStore {
    pub fn new(client: ApiClient, page_size: usize) -> Self {
        Self {
            store: ResourceStore::new(client, page_size),
            ratings: RwLock::new(Vec::new()),
        }
    }

    /// Ratings cached by the last [`TracksStore::fetch_ratings`]
    pub fn ratings(&self) -> Vec<Arc<Entity>> {
        self.ratings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Load the ratings of a track
    pub async fn fetch_ratings(&self, id: &str) -> Result<Vec<Arc<Entity>>> {
        let path = ratings_path(id)?;
        self.store
            .run(async {
                let reply = self
                    .store
                    .send(Method::GET, &path, RATINGS_ACCESS, None, "Failed to fetch track ratings")
                    .await?;
                let ratings: Vec<Arc<Entity>> = Envelope::open(reply, "ratings")
                    .into_list()?
                    .into_iter()
                    .map(Arc::new)
                    .collect();

                debug!("fetched {} ratings for track {}", ratings.len(), id);
                *self.ratings.write().unwrap_or_else(PoisonError::into_inner) = ratings.clone();
                Ok(ratings)
            })
            .await
    }

    /// Submit a rating.
    ///
    /// When the reply carries the rated track, its `rating` and
    /// `totalRatings` are copied onto the cached entries without a refetch.
    /// The full reply is returned.
    pub async fn submit_rating(&self, id: &str, input: &RatingInput) -> Result<Value> {
        input.validate()?;
        let path = ratings_path(id)?;
        let body = serde_json::to_value(input)?;
        self.store
            .run(async {
                let reply = self
                    .store
                    .send(Method::POST, &path, RATINGS_ACCESS, Some(body.into()), "Failed to rate track")
                    .await?;

                if let Some(summary) = rating_summary(&reply) {
                    self.store
                        .replace_entry(id, |entry| Arc::new(entry.with_fields(&summary)));
                }
                Ok(reply)
            })
            .await
    }
}

fn ratings_path(id: &str) -> Result<String> {
    Ok(format!("{}/ratings", ResourceStore::<Track>::item_path(id)?))
}

/// `rating` and `totalRatings` of the track embedded in a rating reply
fn rating_summary(reply: &Value) -> Option<Map<String, Value>> {
    let track = reply.get("track")?.as_object()?;
    let summary: Map<String, Value> = ["rating", "totalRatings"]
        .iter()
        .map(|key| (key.to_string(), track.get(*key).cloned().unwrap_or(Value::Null)))
        .collect();
    Some(summary)
}
