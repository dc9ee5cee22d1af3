//! Behavior ledger: append-only per-user event log
//!
//! Likelihoods come from a collaborative-similarity heuristic over stated
//! conservation goals, not from a trained model.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::{
    similar_user_likelihood, BehaviorAction, BehaviorEvent, PeerHistory, TreeSpecies,
    NEUTRAL_LIKELIHOOD,
};
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Persistence for behavior events and stated goals
#[axum::async_trait]
pub trait BehaviorStore: Send + Sync {
    async fn append(&self, event: &BehaviorEvent) -> AppResult<()>;
    async fn events_for_user(&self, user_id: Uuid) -> AppResult<Vec<BehaviorEvent>>;
    /// Events on any of `tree_ids`, across all users
    async fn events_for_trees(&self, tree_ids: &[String]) -> AppResult<Vec<BehaviorEvent>>;
    async fn set_goals(&self, user_id: Uuid, goals: &BTreeSet<String>) -> AppResult<()>;
    async fn goals(&self, user_id: Uuid) -> AppResult<Option<BTreeSet<String>>>;
    /// Stated goals of several users; users without goals are absent
    async fn goals_for(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, BTreeSet<String>>>;
}

/// In-memory store for tests and database-less deployments
#[derive(Default)]
pub struct InMemoryBehaviorStore {
    events: RwLock<HashMap<Uuid, Vec<BehaviorEvent>>>,
    goals: RwLock<HashMap<Uuid, BTreeSet<String>>>,
}

impl InMemoryBehaviorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[axum::async_trait]
impl BehaviorStore for InMemoryBehaviorStore {
    async fn append(&self, event: &BehaviorEvent) -> AppResult<()> {
        self.events
            .write()
            .await
            .entry(event.user_id)
            .or_default()
            .push(event.clone());
        Ok(())
    }

    async fn events_for_user(&self, user_id: Uuid) -> AppResult<Vec<BehaviorEvent>> {
        Ok(self
            .events
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn events_for_trees(&self, tree_ids: &[String]) -> AppResult<Vec<BehaviorEvent>> {
        Ok(self
            .events
            .read()
            .await
            .values()
            .flatten()
            .filter(|e| tree_ids.contains(&e.tree_id))
            .cloned()
            .collect())
    }

    async fn set_goals(&self, user_id: Uuid, goals: &BTreeSet<String>) -> AppResult<()> {
        self.goals.write().await.insert(user_id, goals.clone());
        Ok(())
    }

    async fn goals(&self, user_id: Uuid) -> AppResult<Option<BTreeSet<String>>> {
        Ok(self.goals.read().await.get(&user_id).cloned())
    }

    async fn goals_for(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, BTreeSet<String>>> {
        let goals = self.goals.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| goals.get(id).map(|g| (*id, g.clone())))
            .collect())
    }
}

/// Postgres-backed store.
///
/// Expects `behavior_events` and `user_goals` tables managed outside this
/// service.
#[derive(Clone)]
pub struct PgBehaviorStore {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct BehaviorEventRow {
    user_id: Uuid,
    tree_id: String,
    action: String,
    occurred_at: DateTime<Utc>,
    region: Option<String>,
    agro_zone: Option<String>,
}

impl TryFrom<BehaviorEventRow> for BehaviorEvent {
    type Error = AppError;

    fn try_from(row: BehaviorEventRow) -> Result<Self, Self::Error> {
        let action = BehaviorAction::parse(&row.action)
            .ok_or_else(|| AppError::Internal(format!("Unknown behavior action: {}", row.action)))?;
        Ok(BehaviorEvent {
            user_id: row.user_id,
            tree_id: row.tree_id,
            action,
            timestamp: row.occurred_at,
            region: row.region,
            agro_zone: row.agro_zone,
        })
    }
}

impl PgBehaviorStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn convert(rows: Vec<BehaviorEventRow>) -> AppResult<Vec<BehaviorEvent>> {
        rows.into_iter().map(BehaviorEvent::try_from).collect()
    }
}

#[axum::async_trait]
impl BehaviorStore for PgBehaviorStore {
    async fn append(&self, event: &BehaviorEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO behavior_events (user_id, tree_id, action, occurred_at, region, agro_zone)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.user_id)
        .bind(&event.tree_id)
        .bind(event.action.as_str())
        .bind(event.timestamp)
        .bind(&event.region)
        .bind(&event.agro_zone)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn events_for_user(&self, user_id: Uuid) -> AppResult<Vec<BehaviorEvent>> {
        let rows = sqlx::query_as::<_, BehaviorEventRow>(
            r#"
            SELECT user_id, tree_id, action, occurred_at, region, agro_zone
            FROM behavior_events
            WHERE user_id = $1
            ORDER BY occurred_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Self::convert(rows)
    }

    async fn events_for_trees(&self, tree_ids: &[String]) -> AppResult<Vec<BehaviorEvent>> {
        let rows = sqlx::query_as::<_, BehaviorEventRow>(
            r#"
            SELECT user_id, tree_id, action, occurred_at, region, agro_zone
            FROM behavior_events
            WHERE tree_id = ANY($1)
            ORDER BY occurred_at ASC
            "#,
        )
        .bind(tree_ids.to_vec())
        .fetch_all(&self.db)
        .await?;

        Self::convert(rows)
    }

    async fn set_goals(&self, user_id: Uuid, goals: &BTreeSet<String>) -> AppResult<()> {
        let goals: Vec<String> = goals.iter().cloned().collect();
        sqlx::query(
            r#"
            INSERT INTO user_goals (user_id, goals, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id) DO UPDATE SET goals = EXCLUDED.goals, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(&goals)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn goals(&self, user_id: Uuid) -> AppResult<Option<BTreeSet<String>>> {
        let goals = sqlx::query_scalar::<_, Vec<String>>(
            "SELECT goals FROM user_goals WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(goals.map(|g| g.into_iter().collect()))
    }

    async fn goals_for(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, BTreeSet<String>>> {
        let rows = sqlx::query_as::<_, (Uuid, Vec<String>)>(
            "SELECT user_id, goals FROM user_goals WHERE user_id = ANY($1)",
        )
        .bind(user_ids.to_vec())
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, goals)| (user_id, goals.into_iter().collect()))
            .collect())
    }
}

/// Records behavior and turns it into per-species likelihoods
#[derive(Clone)]
pub struct BehaviorLedger {
    store: Arc<dyn BehaviorStore>,
}

impl BehaviorLedger {
    pub fn new(store: Arc<dyn BehaviorStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBehaviorStore::new()))
    }

    /// Append an event to the user's log
    pub async fn record(&self, event: BehaviorEvent) -> AppResult<()> {
        if event.tree_id.trim().is_empty() {
            return Err(AppError::validation("tree_id", "Tree id must not be empty"));
        }
        self.store.append(&event).await?;
        tracing::debug!(
            "Recorded {} for user {} on {}",
            event.action.as_str(),
            event.user_id,
            event.tree_id
        );
        Ok(())
    }

    /// Store the user's current conservation goals
    pub async fn register_goals(&self, user_id: Uuid, goals: &BTreeSet<String>) -> AppResult<()> {
        let normalized: BTreeSet<String> = goals
            .iter()
            .map(|g| g.trim().to_lowercase())
            .filter(|g| !g.is_empty())
            .collect();
        self.store.set_goals(user_id, &normalized).await
    }

    pub async fn history(&self, user_id: Uuid) -> AppResult<Vec<BehaviorEvent>> {
        self.store.events_for_user(user_id).await
    }

    /// Likelihood (0..=1) that `user_id` will like `tree_id`, based on
    /// similar users. Neutral (0.5) when there is no comparison data.
    pub async fn similar_user_likelihood(&self, user_id: Uuid, tree_id: &str) -> AppResult<f64> {
        let likelihoods = self
            .likelihoods_for_ids(user_id, &[tree_id.to_string()])
            .await?;
        Ok(likelihoods
            .get(tree_id)
            .copied()
            .unwrap_or(NEUTRAL_LIKELIHOOD))
    }

    /// Likelihoods for a set of species, keyed by species id
    pub async fn likelihoods(
        &self,
        user_id: Uuid,
        species: &[TreeSpecies],
    ) -> AppResult<HashMap<String, f64>> {
        let ids: Vec<String> = species.iter().map(|tree| tree.id.clone()).collect();
        self.likelihoods_for_ids(user_id, &ids).await
    }

    // At most three store reads regardless of how many species or peers.
    async fn likelihoods_for_ids(
        &self,
        user_id: Uuid,
        tree_ids: &[String],
    ) -> AppResult<HashMap<String, f64>> {
        let neutral = || -> HashMap<String, f64> {
            tree_ids
                .iter()
                .map(|id| (id.clone(), NEUTRAL_LIKELIHOOD))
                .collect()
        };
        if tree_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let Some(goals) = self.store.goals(user_id).await? else {
            return Ok(neutral());
        };

        let mut by_peer: BTreeMap<Uuid, Vec<BehaviorEvent>> = BTreeMap::new();
        for event in self.store.events_for_trees(tree_ids).await? {
            if event.user_id != user_id {
                by_peer.entry(event.user_id).or_default().push(event);
            }
        }
        if by_peer.is_empty() {
            return Ok(neutral());
        }

        let peer_ids: Vec<Uuid> = by_peer.keys().copied().collect();
        let mut peer_goals = self.store.goals_for(&peer_ids).await?;
        let peers: Vec<PeerHistory> = by_peer
            .into_iter()
            .map(|(peer_id, events)| PeerHistory {
                user_id: peer_id,
                goals: peer_goals.remove(&peer_id).unwrap_or_default(),
                events,
            })
            .collect();

        Ok(tree_ids
            .iter()
            .map(|id| (id.clone(), similar_user_likelihood(user_id, &goals, id, &peers)))
            .collect())
    }
}
