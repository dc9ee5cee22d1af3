//! Behavior ledger tests
//!
//! Likelihoods come from peers whose goals overlap (Jaccard > 0.3) with
//! the user's, using each peer's latest reaction to the species.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use shared::{BehaviorAction, BehaviorEvent, GrowthRate, TreeSpecies, NEUTRAL_LIKELIHOOD};
use treematch_backend::services::{BehaviorLedger, BehaviorStore, InMemoryBehaviorStore};
use treematch_backend::{AppError, AppResult};
use uuid::Uuid;

fn goals(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

fn event(user_id: Uuid, tree_id: &str, action: BehaviorAction, at: DateTime<Utc>) -> BehaviorEvent {
    BehaviorEvent {
        user_id,
        tree_id: tree_id.to_string(),
        action,
        timestamp: at,
        region: None,
        agro_zone: None,
    }
}

#[test]
fn no_goals_is_neutral() {
    tokio_test::block_on(async {
        let ledger = BehaviorLedger::in_memory();
        let likelihood = ledger
            .similar_user_likelihood(Uuid::new_v4(), "grevillea")
            .await
            .unwrap();
        assert_eq!(likelihood, NEUTRAL_LIKELIHOOD);
    });
}

#[test]
fn no_reactions_is_neutral() {
    tokio_test::block_on(async {
        let ledger = BehaviorLedger::in_memory();
        let user = Uuid::new_v4();
        ledger.register_goals(user, &goals(&["timber"])).await.unwrap();

        let likelihood = ledger.similar_user_likelihood(user, "grevillea").await.unwrap();
        assert_eq!(likelihood, NEUTRAL_LIKELIHOOD);
    });
}

#[tokio::test]
async fn similar_peers_vote_with_latest_reaction() {
    let ledger = BehaviorLedger::in_memory();
    let user = Uuid::new_v4();
    let fan = Uuid::new_v4();
    let critic = Uuid::new_v4();

    ledger.register_goals(user, &goals(&["timber", "shade"])).await.unwrap();
    ledger.register_goals(fan, &goals(&["timber", "shade", "fruit"])).await.unwrap();
    ledger.register_goals(critic, &goals(&["timber"])).await.unwrap();

    ledger
        .record(event(fan, "grevillea", BehaviorAction::Liked, t0()))
        .await
        .unwrap();
    // The critic liked it first, then changed their mind
    ledger
        .record(event(critic, "grevillea", BehaviorAction::Liked, t0()))
        .await
        .unwrap();
    ledger
        .record(event(
            critic,
            "grevillea",
            BehaviorAction::PlantedOutcome { survived: false },
            t0() + Duration::days(90),
        ))
        .await
        .unwrap();

    let likelihood = ledger.similar_user_likelihood(user, "grevillea").await.unwrap();
    assert!((likelihood - 0.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn dissimilar_peers_are_ignored() {
    let ledger = BehaviorLedger::in_memory();
    let user = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    ledger.register_goals(user, &goals(&["timber"])).await.unwrap();
    ledger
        .register_goals(stranger, &goals(&["fruit", "fodder", "medicinal"]))
        .await
        .unwrap();
    ledger
        .record(event(stranger, "neem", BehaviorAction::Disliked, t0()))
        .await
        .unwrap();

    let likelihood = ledger.similar_user_likelihood(user, "neem").await.unwrap();
    assert_eq!(likelihood, NEUTRAL_LIKELIHOOD);
}

#[tokio::test]
async fn own_events_do_not_count() {
    let ledger = BehaviorLedger::in_memory();
    let user = Uuid::new_v4();

    ledger.register_goals(user, &goals(&["shade"])).await.unwrap();
    ledger
        .record(event(user, "neem", BehaviorAction::Liked, t0()))
        .await
        .unwrap();

    let likelihood = ledger.similar_user_likelihood(user, "neem").await.unwrap();
    assert_eq!(likelihood, NEUTRAL_LIKELIHOOD);
}

#[tokio::test]
async fn surviving_plantings_count_as_positive() {
    let ledger = BehaviorLedger::in_memory();
    let user = Uuid::new_v4();
    let peer = Uuid::new_v4();

    ledger.register_goals(user, &goals(&["Shade "])).await.unwrap();
    ledger.register_goals(peer, &goals(&["shade"])).await.unwrap();
    ledger
        .record(event(
            peer,
            "neem",
            BehaviorAction::PlantedOutcome { survived: true },
            t0(),
        ))
        .await
        .unwrap();

    let likelihood = ledger.similar_user_likelihood(user, "neem").await.unwrap();
    assert_eq!(likelihood, 1.0);
}

#[tokio::test]
async fn history_is_append_only_and_per_user() {
    let ledger = BehaviorLedger::in_memory();
    let user = Uuid::new_v4();
    let other = Uuid::new_v4();

    ledger
        .record(event(user, "neem", BehaviorAction::Liked, t0()))
        .await
        .unwrap();
    ledger
        .record(event(user, "neem", BehaviorAction::Disliked, t0() + Duration::hours(1)))
        .await
        .unwrap();
    ledger
        .record(event(other, "melia", BehaviorAction::Liked, t0()))
        .await
        .unwrap();

    let history = ledger.history(user).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action, BehaviorAction::Liked);
    assert_eq!(history[1].action, BehaviorAction::Disliked);
}

#[tokio::test]
async fn blank_tree_id_is_rejected() {
    let ledger = BehaviorLedger::in_memory();
    let result = ledger
        .record(event(Uuid::new_v4(), "  ", BehaviorAction::Liked, t0()))
        .await;
    assert!(matches!(result, Err(AppError::Validation { .. })));
}

/// Counts every read that would be a database round trip
#[derive(Default)]
struct CountingStore {
    inner: InMemoryBehaviorStore,
    reads: AtomicUsize,
}

impl CountingStore {
    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }
}

#[axum::async_trait]
impl BehaviorStore for CountingStore {
    async fn append(&self, event: &BehaviorEvent) -> AppResult<()> {
        self.inner.append(event).await
    }

    async fn events_for_user(&self, user_id: Uuid) -> AppResult<Vec<BehaviorEvent>> {
        self.read();
        self.inner.events_for_user(user_id).await
    }

    async fn events_for_trees(&self, tree_ids: &[String]) -> AppResult<Vec<BehaviorEvent>> {
        self.read();
        self.inner.events_for_trees(tree_ids).await
    }

    async fn set_goals(&self, user_id: Uuid, goals: &BTreeSet<String>) -> AppResult<()> {
        self.inner.set_goals(user_id, goals).await
    }

    async fn goals(&self, user_id: Uuid) -> AppResult<Option<BTreeSet<String>>> {
        self.read();
        self.inner.goals(user_id).await
    }

    async fn goals_for(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, BTreeSet<String>>> {
        self.read();
        self.inner.goals_for(user_ids).await
    }
}

fn species(id: &str) -> TreeSpecies {
    TreeSpecies {
        id: id.to_string(),
        common_name: id.to_string(),
        scientific_name: id.to_string(),
        local_name: None,
        suitable_regions: goals(&["Nyeri"]),
        suitable_zones: goals(&["UH1"]),
        preferred_soils: goals(&["loam"]),
        suitable_climates: goals(&["highland"]),
        uses: goals(&["timber"]),
        unit_price: Decimal::from(50),
        growth_rate: GrowthRate::Fast,
        min_land_size_acres: Decimal::ONE,
    }
}

#[tokio::test]
async fn likelihoods_read_the_store_a_fixed_number_of_times() {
    let store = Arc::new(CountingStore::default());
    let ledger = BehaviorLedger::new(store.clone());
    let user = Uuid::new_v4();
    ledger.register_goals(user, &goals(&["timber", "shade"])).await.unwrap();

    let catalog: Vec<TreeSpecies> = (0..20).map(|i| species(&format!("tree-{}", i))).collect();
    for p in 0..10 {
        let peer = Uuid::new_v4();
        ledger.register_goals(peer, &goals(&["timber", "shade"])).await.unwrap();
        for (i, tree) in catalog.iter().enumerate() {
            let action = if (i + p) % 3 == 0 {
                BehaviorAction::Disliked
            } else {
                BehaviorAction::Liked
            };
            ledger.record(event(peer, &tree.id, action, t0())).await.unwrap();
        }
    }

    let before = store.reads();
    let likelihoods = ledger.likelihoods(user, &catalog).await.unwrap();
    assert!(store.reads() - before <= 3, "{} reads", store.reads() - before);
    assert_eq!(likelihoods.len(), catalog.len());

    for tree in &catalog {
        let single = ledger.similar_user_likelihood(user, &tree.id).await.unwrap();
        assert_eq!(likelihoods[&tree.id], single);
    }
    assert!(likelihoods.values().any(|l| *l != NEUTRAL_LIKELIHOOD));
}

#[tokio::test]
async fn likelihoods_without_goals_skip_event_reads() {
    let store = Arc::new(CountingStore::default());
    let ledger = BehaviorLedger::new(store.clone());

    let likelihoods = ledger
        .likelihoods(Uuid::new_v4(), &[species("melia"), species("neem")])
        .await
        .unwrap();

    assert_eq!(store.reads(), 1);
    assert!(likelihoods.values().all(|l| *l == NEUTRAL_LIKELIHOOD));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn goal() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["timber", "shade", "fruit", "fodder"]).prop_map(str::to_string)
    }

    proptest! {
        /// Likelihood is a probability for any mix of peers and reactions
        #[test]
        fn prop_likelihood_is_probability(
            user_goals in prop::collection::btree_set(goal(), 0..4),
            peers in prop::collection::vec(
                (prop::collection::btree_set(goal(), 0..4), any::<bool>()),
                0..6,
            ),
        ) {
            let likelihood = tokio_test::block_on(async {
                let ledger = BehaviorLedger::in_memory();
                let user = Uuid::new_v4();
                ledger.register_goals(user, &user_goals).await.unwrap();

                for (peer_goals, liked) in &peers {
                    let peer = Uuid::new_v4();
                    ledger.register_goals(peer, peer_goals).await.unwrap();
                    let action = if *liked {
                        BehaviorAction::Liked
                    } else {
                        BehaviorAction::Disliked
                    };
                    ledger.record(event(peer, "melia", action, t0())).await.unwrap();
                }

                ledger.similar_user_likelihood(user, "melia").await.unwrap()
            });

            prop_assert!((0.0..=1.0).contains(&likelihood));
            if peers.is_empty() {
                prop_assert_eq!(likelihood, NEUTRAL_LIKELIHOOD);
            }
        }
    }
}
