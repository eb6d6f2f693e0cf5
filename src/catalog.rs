// src/catalog.rs
use std::fmt;
use std::rc::Rc;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::api::Backend;
use crate::error::ApiError;

pub(crate) const LOAD_FAILED: &str = "Failed to load activities. Please try again later.";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub(crate) struct Activity {
    pub description: String,
    pub schedule: String,
    pub max_participants: i64,
    #[serde(default)]
    pub participants: Vec<String>,
}

impl Activity {
    /// Not clamped: an over-full activity shows a negative count, same as the server data.
    pub(crate) fn spots_left(&self) -> i64 {
        self.max_participants - self.participants.len() as i64
    }
}

/// The `GET /activities` payload, kept in the order the server sent it.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Catalog {
    entries: Vec<(String, Activity)>,
}

impl Catalog {
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Activity)> {
        self.entries.iter().map(|(name, a)| (name.as_str(), a))
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = Catalog;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of activity name to activity details")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Catalog, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Activity>()? {
                    entries.push(entry);
                }
                Ok(Catalog { entries })
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

/// Which participant a delete button removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RemoveTarget {
    pub activity: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParticipantRow {
    pub email: String,
    /// Only present for an authenticated session.
    pub remove: Option<RemoveTarget>,
}

/// Everything one activity card displays.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ActivityCard {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub spots_left: i64,
    pub participants: Vec<ParticipantRow>,
}

impl ActivityCard {
    pub(crate) fn build(name: &str, activity: &Activity, authenticated: bool) -> Self {
        let participants = activity
            .participants
            .iter()
            .map(|email| ParticipantRow {
                email: email.clone(),
                remove: authenticated.then(|| RemoveTarget {
                    activity: name.to_string(),
                    email: email.clone(),
                }),
            })
            .collect();

        Self {
            name: name.to_string(),
            description: activity.description.clone(),
            schedule: activity.schedule.clone(),
            spots_left: activity.spots_left(),
            participants,
        }
    }

    pub(crate) fn availability(&self) -> String {
        format!("{} spots left", self.spots_left)
    }
}

/// One card per activity, server order.
pub(crate) fn cards(catalog: &Catalog, authenticated: bool) -> Vec<ActivityCard> {
    catalog
        .iter()
        .map(|(name, activity)| ActivityCard::build(name, activity, authenticated))
        .collect()
}

/// What the activity list currently shows.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CatalogState {
    Loading,
    /// `generation` grows with every successful fetch and keys the rendered list.
    Loaded { generation: u32, catalog: Rc<Catalog> },
    Failed,
}

/// Hands out refresh generations. Only the newest one may land on screen.
#[derive(Debug, Default)]
pub(crate) struct Generations {
    issued: u32,
}

impl Generations {
    pub(crate) fn next(&mut self) -> u32 {
        self.issued = self.issued.wrapping_add(1);
        self.issued
    }

    /// False once a later refresh has started; its answer supersedes this one.
    pub(crate) fn is_latest(&self, generation: u32) -> bool {
        generation == self.issued
    }
}

/// Fetches the whole catalog. No retry; a failure replaces the list with a fallback.
pub(crate) async fn refresh<B: Backend>(backend: &B, generation: u32) -> (CatalogState, Option<ApiError>) {
    match backend.activities().await {
        Ok(catalog) => (
            CatalogState::Loaded {
                generation,
                catalog: Rc::new(catalog),
            },
            None,
        ),
        Err(e) => (CatalogState::Failed, Some(e)),
    }
}
