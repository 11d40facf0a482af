//! Game arena: many independent games behind one handle.
//!
//! Each game gets its own session mutex; mutations to one game never
//! block another. Reads go through a published snapshot behind a
//! read-write lock, swapped atomically at the end of every mutation, so
//! a reader always sees a state that actually existed, never a
//! half-applied mutation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use tracing::info;

use crate::catalog::{CardCatalog, CardId};
use crate::compute::ComputedState;
use crate::core::{GameId, PlayerId, SelectionId, Zone};
use crate::error::{EngineError, Result};
use crate::history::PlaySequenceLog;
use crate::selection::PendingSelection;

use super::session::{GameSession, PlacementOutcome, SavedGame, SelectionOutcome};

/// A consistent read view of one game.
#[derive(Clone, Debug)]
pub struct StateSnapshot {
    /// The computed state at publication time.
    pub computed: Arc<ComputedState>,

    /// The play log at publication time. Persistent vector; cloning
    /// into the snapshot is O(1).
    pub log: PlaySequenceLog,

    /// Open selection workflows at publication time.
    pub pending_selections: Vec<PendingSelection>,
}

struct GameHandle {
    session: Mutex<GameSession>,
    snapshot: RwLock<Arc<StateSnapshot>>,
}

impl GameHandle {
    fn new(session: GameSession) -> Self {
        let snapshot = Arc::new(take_snapshot(&session));
        Self {
            session: Mutex::new(session),
            snapshot: RwLock::new(snapshot),
        }
    }
}

fn take_snapshot(session: &GameSession) -> StateSnapshot {
    StateSnapshot {
        computed: session.computed(),
        log: session.log().clone(),
        pending_selections: session.open_selections(),
    }
}

/// Concurrent host for independent game sessions.
///
/// Games share nothing but the card catalog, which is immutable after
/// construction.
pub struct GameArena {
    catalog: Arc<CardCatalog>,
    games: RwLock<FxHashMap<GameId, Arc<GameHandle>>>,
    next_id: AtomicU64,
}

impl GameArena {
    /// Create an arena over a finished catalog.
    #[must_use]
    pub fn new(catalog: Arc<CardCatalog>) -> Self {
        Self {
            catalog,
            games: RwLock::new(FxHashMap::default()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Start a new game and return its ID.
    pub fn create_game(&self, player_count: usize) -> GameId {
        let session = GameSession::new(Arc::clone(&self.catalog), player_count);
        self.insert(session)
    }

    /// Restore a game from a saved snapshot.
    pub fn restore_game(&self, saved: SavedGame) -> GameId {
        let session = GameSession::restore(Arc::clone(&self.catalog), saved);
        self.insert(session)
    }

    fn insert(&self, session: GameSession) -> GameId {
        let id = GameId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = Arc::new(GameHandle::new(session));
        self.games
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, handle);
        info!(game = id.raw(), "game created");
        id
    }

    /// Tear down a finished game.
    pub fn remove_game(&self, id: GameId) -> Result<()> {
        self.games
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .map(|_| ())
            .ok_or(EngineError::GameNotFound(id))
    }

    /// IDs of all live games, sorted.
    #[must_use]
    pub fn game_ids(&self) -> Vec<GameId> {
        let mut ids: Vec<GameId> = self
            .games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        ids.sort_by_key(|id| id.raw());
        ids
    }

    /// Number of live games.
    #[must_use]
    pub fn len(&self) -> usize {
        self.games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if no games are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // === Mutations ===

    /// Play a card in one game.
    pub fn apply_placement(
        &self,
        game: GameId,
        owner: PlayerId,
        card: CardId,
        zone: Zone,
        face_down: bool,
    ) -> Result<PlacementOutcome> {
        self.with_session(game, |session| {
            session.apply_placement(owner, card, zone, face_down)
        })
    }

    /// Resolve a pending selection in one game.
    pub fn resolve_selection(
        &self,
        game: GameId,
        id: SelectionId,
        chosen: &[CardId],
    ) -> Result<SelectionOutcome> {
        self.with_session(game, |session| session.resolve_selection(id, chosen))
    }

    /// Run any mutation against one game's session.
    ///
    /// The session mutex serializes mutations per game; after the
    /// closure returns, the read snapshot is rebuilt and swapped in.
    /// The snapshot is refreshed even when the closure fails, since a
    /// failed mutation may still have appended log state.
    pub fn with_session<R>(
        &self,
        game: GameId,
        f: impl FnOnce(&mut GameSession) -> Result<R>,
    ) -> Result<R> {
        let handle = self.handle(game)?;
        let mut session = handle
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut session);

        let snapshot = Arc::new(take_snapshot(&session));
        *handle
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = snapshot;
        result
    }

    // === Reads ===

    /// The latest published snapshot of one game.
    ///
    /// Never blocks on in-flight mutations to the same game.
    pub fn snapshot(&self, game: GameId) -> Result<Arc<StateSnapshot>> {
        let handle = self.handle(game)?;
        let guard = handle
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(&guard))
    }

    /// The computed state of one game.
    pub fn computed(&self, game: GameId) -> Result<Arc<ComputedState>> {
        Ok(Arc::clone(&self.snapshot(game)?.computed))
    }

    /// A pending selection in one game.
    ///
    /// Served from the published snapshot: never takes the session lock
    /// and never republishes.
    pub fn pending_selection(
        &self,
        game: GameId,
        id: SelectionId,
    ) -> Result<Option<PendingSelection>> {
        Ok(self
            .snapshot(game)?
            .pending_selections
            .iter()
            .find(|s| s.selection_id == id)
            .cloned())
    }

    fn handle(&self, game: GameId) -> Result<Arc<GameHandle>> {
        self.games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&game)
            .cloned()
            .ok_or(EngineError::GameNotFound(game))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CardDefinition;
    use crate::core::CardType;

    fn catalog() -> Arc<CardCatalog> {
        let mut catalog = CardCatalog::new();
        catalog.register(
            CardDefinition::new(CardId::new(1), "A", CardType::Character, "經濟").with_power(100),
        );
        Arc::new(catalog)
    }

    const P0: PlayerId = PlayerId::new(0);

    #[test]
    fn test_games_are_independent() {
        let arena = GameArena::new(catalog());
        let g1 = arena.create_game(2);
        let g2 = arena.create_game(2);

        arena
            .with_session(g1, |session| {
                session.add_to_hand(P0, CardId::new(1));
                Ok(())
            })
            .unwrap();
        arena.apply_placement(g1, P0, CardId::new(1), Zone::Top, false).unwrap();

        assert_eq!(arena.snapshot(g1).unwrap().log.len(), 1);
        assert_eq!(arena.snapshot(g2).unwrap().log.len(), 0);
    }

    #[test]
    fn test_unknown_game_errors() {
        let arena = GameArena::new(catalog());
        assert!(matches!(
            arena.snapshot(GameId::new(42)),
            Err(EngineError::GameNotFound(_))
        ));
        assert!(matches!(
            arena.remove_game(GameId::new(42)),
            Err(EngineError::GameNotFound(_))
        ));
    }

    #[test]
    fn test_remove_game() {
        let arena = GameArena::new(catalog());
        let g = arena.create_game(2);
        assert_eq!(arena.len(), 1);

        arena.remove_game(g).unwrap();
        assert!(arena.is_empty());
        assert!(arena.snapshot(g).is_err());
    }

    #[test]
    fn test_snapshot_is_stable_across_later_mutations() {
        let arena = GameArena::new(catalog());
        let g = arena.create_game(2);
        let before = arena.snapshot(g).unwrap();

        arena
            .with_session(g, |session| {
                session.add_to_hand(P0, CardId::new(1));
                session.apply_placement(P0, CardId::new(1), Zone::Top, false)?;
                Ok(())
            })
            .unwrap();

        // The old snapshot still reads as it did; the new one moved on
        assert_eq!(before.log.len(), 0);
        assert_eq!(arena.snapshot(g).unwrap().log.len(), 1);
    }

    #[test]
    fn test_parallel_games_mutate_concurrently() {
        let arena = Arc::new(GameArena::new(catalog()));
        let ids: Vec<GameId> = (0..4).map(|_| arena.create_game(2)).collect();

        let handles: Vec<_> = ids
            .iter()
            .map(|&game| {
                let arena = Arc::clone(&arena);
                std::thread::spawn(move || {
                    arena
                        .with_session(game, |session| {
                            session.add_to_hand(P0, CardId::new(1));
                            session.apply_placement(P0, CardId::new(1), Zone::Top, false)?;
                            Ok(())
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for game in ids {
            assert_eq!(arena.snapshot(game).unwrap().log.len(), 1);
        }
    }
}
