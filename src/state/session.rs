//! Cross-activity game state and the reducer every activity mutates it through.

use tracing::{debug, warn};

use crate::{
    dao::models::StoredGameData,
    state::game::{
        ActivityKind, Difficulty, FocusSettings, GameMode, Gender, HistoryEntry, Player, Seat,
        now_millis,
    },
};

/// Lifecycle of the session as seen by the routing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Blank players, nothing to resume.
    Uninitialized,
    /// Players configured, activities can run.
    Active,
    /// Soft-stopped; history retained, re-initialization required.
    Ended,
}

/// Operations accepted by [`GameSession::dispatch`].
///
/// Input is assumed to be validated at the boundary; no action can be rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Replace both players and the difficulty, restarting the session.
    InitializePlayers {
        /// Seat one.
        player1: Player,
        /// Seat two.
        player2: Player,
        /// Starting difficulty.
        difficulty: Difficulty,
    },
    /// Record which activity is in progress (informational only).
    SetActivity(Option<ActivityKind>),
    /// Append a resolved round and return to the activity picker.
    RecordPunishment(HistoryEntry),
    /// Hand the turn to the other seat.
    SwitchTurn,
    /// Change the difficulty without touching history or turn.
    ChangeDifficulty(Difficulty),
    /// Switch between normal and focus selection.
    SetGameMode(GameMode),
    /// Add or remove a focus category.
    ToggleFocusCategory(String),
    /// Soft stop.
    EndGame,
    /// Hard stop back to the blank session.
    ResetGame,
    /// Reload a persisted snapshot.
    Restore(StoredGameData),
}

/// Root aggregate: players, turn, difficulty, focus filters, and history.
///
/// Fields are private so that every mutation goes through [`GameSession::dispatch`].
/// The `version` counter increases with every dispatched action.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    players: [Player; 2],
    difficulty: Difficulty,
    current_activity: Option<ActivityKind>,
    is_active: bool,
    current_turn: Seat,
    history: Vec<HistoryEntry>,
    focus: FocusSettings,
    version: u64,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            players: [Player::blank(Gender::Male), Player::blank(Gender::Female)],
            difficulty: Difficulty::default(),
            current_activity: None,
            is_active: false,
            current_turn: Seat::First,
            history: Vec::new(),
            focus: FocusSettings::default(),
            version: 0,
        }
    }
}

impl GameSession {
    /// Blank, uninitialized session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an action. This never fails.
    pub fn dispatch(&mut self, action: SessionAction) {
        match action {
            SessionAction::InitializePlayers {
                player1,
                player2,
                difficulty,
            } => {
                let version = self.version;
                *self = Self {
                    players: [player1, player2],
                    difficulty,
                    is_active: true,
                    version,
                    ..Self::default()
                };
            }
            SessionAction::SetActivity(kind) => self.current_activity = kind,
            SessionAction::RecordPunishment(entry) => {
                if !self.is_active {
                    warn!(
                        activity = %entry.activity,
                        "ignoring punishment recorded without an active session"
                    );
                    return;
                }
                self.history.push(entry);
                self.current_activity = None;
            }
            SessionAction::SwitchTurn => self.current_turn = self.current_turn.other(),
            SessionAction::ChangeDifficulty(difficulty) => self.difficulty = difficulty,
            SessionAction::SetGameMode(mode) => self.focus.mode = mode,
            SessionAction::ToggleFocusCategory(category) => self.focus.toggle(category),
            SessionAction::EndGame => self.is_active = false,
            SessionAction::ResetGame => {
                let version = self.version;
                *self = Self {
                    version,
                    ..Self::default()
                };
            }
            SessionAction::Restore(stored) => {
                let version = self.version;
                *self = Self {
                    players: stored.players,
                    difficulty: stored.difficulty,
                    current_activity: stored.current_activity,
                    is_active: true,
                    current_turn: stored.current_turn,
                    history: stored.history,
                    version,
                    ..Self::default()
                };
            }
        }

        self.version += 1;
        debug!(version = self.version, phase = ?self.phase(), "session updated");
    }

    /// Convenience wrapper for [`SessionAction::InitializePlayers`].
    pub fn initialize_players(&mut self, player1: Player, player2: Player, difficulty: Difficulty) {
        self.dispatch(SessionAction::InitializePlayers {
            player1,
            player2,
            difficulty,
        });
    }

    /// Convenience wrapper for [`SessionAction::RecordPunishment`].
    pub fn record_punishment(&mut self, entry: HistoryEntry) {
        self.dispatch(SessionAction::RecordPunishment(entry));
    }

    /// Convenience wrapper for [`SessionAction::SwitchTurn`].
    pub fn switch_turn(&mut self) {
        self.dispatch(SessionAction::SwitchTurn);
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        if self.is_active {
            SessionPhase::Active
        } else if self.players[0].name.is_empty() {
            SessionPhase::Uninitialized
        } else {
            SessionPhase::Ended
        }
    }

    /// Both players in seat order.
    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    /// Player sitting at `seat`.
    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat.index()]
    }

    /// Seat whose turn it is.
    pub fn current_turn(&self) -> Seat {
        self.current_turn
    }

    /// Player whose turn it is.
    pub fn current_player(&self) -> &Player {
        self.player(self.current_turn)
    }

    /// Current difficulty.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Activity in progress, if any.
    pub fn current_activity(&self) -> Option<ActivityKind> {
        self.current_activity
    }

    /// Whether a session has been initialized and not ended.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Chronological record of resolved rounds.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Focus-mode filtering parameters.
    pub fn focus(&self) -> &FocusSettings {
        &self.focus
    }

    /// Monotonic counter bumped on every dispatched action.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Serializable subset written by the persistence adapter.
    pub fn to_stored(&self) -> StoredGameData {
        StoredGameData {
            players: self.players.clone(),
            difficulty: self.difficulty,
            current_activity: self.current_activity,
            current_turn: self.current_turn,
            history: self.history.clone(),
            last_updated: now_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::game::ContentRecord;

    fn alex_and_sam() -> (Player, Player) {
        (
            Player::new("Alex", Gender::Male),
            Player::new("Sam", Gender::Female),
        )
    }

    fn entry(activity: ActivityKind, player: &Player, id: u64) -> HistoryEntry {
        HistoryEntry {
            activity,
            player_id: player.id.clone(),
            player_name: player.name.clone(),
            record: ContentRecord {
                id,
                description: format!("task {id}"),
                gender: player.gender,
                difficulty: Difficulty::Medium,
                activity,
                timer: None,
                categories: None,
            },
            timestamp: 1_700_000_000_000 + id,
        }
    }

    fn active_session() -> GameSession {
        let (p1, p2) = alex_and_sam();
        let mut session = GameSession::new();
        session.initialize_players(p1, p2, Difficulty::Medium);
        session
    }

    #[test]
    fn new_session_is_uninitialized() {
        let session = GameSession::new();
        assert_eq!(session.phase(), SessionPhase::Uninitialized);
        assert!(!session.is_active());
        assert!(session.history().is_empty());
    }

    #[test]
    fn initialize_players_starts_at_first_seat_with_empty_history() {
        let mut session = active_session();
        session.switch_turn();
        session.record_punishment(entry(ActivityKind::SpinWheel, &session.players()[1].clone(), 1));

        let (p1, p2) = alex_and_sam();
        session.initialize_players(p1.clone(), p2, Difficulty::Hard);

        assert_eq!(session.phase(), SessionPhase::Active);
        assert_eq!(session.current_turn(), Seat::First);
        assert!(session.history().is_empty());
        assert_eq!(session.difficulty(), Difficulty::Hard);
        assert_eq!(session.player(Seat::First), &p1);
    }

    #[test]
    fn switch_turn_twice_is_identity() {
        let mut session = active_session();
        let start = session.current_turn();
        session.switch_turn();
        assert_eq!(session.current_turn(), start.other());
        session.switch_turn();
        assert_eq!(session.current_turn(), start);
    }

    #[test]
    fn record_punishment_appends_and_clears_activity() {
        let mut session = active_session();
        let alex = session.player(Seat::First).clone();
        let sam = session.player(Seat::Second).clone();

        session.dispatch(SessionAction::SetActivity(Some(ActivityKind::SpinWheel)));
        let first = entry(ActivityKind::SpinWheel, &alex, 1);
        session.record_punishment(first.clone());
        assert_eq!(session.history(), &[first.clone()]);
        assert_eq!(session.current_activity(), None);

        let second = entry(ActivityKind::ScratchCard, &sam, 2);
        session.record_punishment(second.clone());
        assert_eq!(session.history(), &[first, second]);
    }

    #[test]
    fn record_without_active_session_is_ignored() {
        let mut session = GameSession::new();
        let ghost = Player::new("Ghost", Gender::Male);
        session.record_punishment(entry(ActivityKind::SpinWheel, &ghost, 1));
        assert!(session.history().is_empty());
    }

    #[test]
    fn changing_difficulty_preserves_history_turn_and_players() {
        let mut session = active_session();
        let alex = session.player(Seat::First).clone();
        session.record_punishment(entry(ActivityKind::SpinWheel, &alex, 1));
        session.switch_turn();
        let before = session.clone();

        session.dispatch(SessionAction::ChangeDifficulty(Difficulty::Easy));

        assert_eq!(session.difficulty(), Difficulty::Easy);
        assert_eq!(session.history(), before.history());
        assert_eq!(session.current_turn(), before.current_turn());
        assert_eq!(session.players(), before.players());
    }

    #[test]
    fn end_game_keeps_history_and_reset_clears_everything() {
        let mut session = active_session();
        let alex = session.player(Seat::First).clone();
        session.record_punishment(entry(ActivityKind::SpinWheel, &alex, 1));

        session.dispatch(SessionAction::EndGame);
        assert_eq!(session.phase(), SessionPhase::Ended);
        assert_eq!(session.history().len(), 1);

        session.dispatch(SessionAction::ResetGame);
        assert_eq!(session.phase(), SessionPhase::Uninitialized);
        assert!(session.history().is_empty());
        assert!(session.version() > 0);
    }

    #[test]
    fn focus_actions_only_touch_filters() {
        let mut session = active_session();
        session.dispatch(SessionAction::SetGameMode(GameMode::Focus));
        session.dispatch(SessionAction::ToggleFocusCategory("kissing".into()));
        assert!(session.focus().narrows(ActivityKind::SpinWheel));
        assert!(!session.focus().narrows(ActivityKind::BodyExplorer));
        assert_eq!(session.current_turn(), Seat::First);
    }

    #[test]
    fn sample_scenario() {
        let mut session = active_session();
        assert_eq!(session.current_turn(), Seat::First);

        let alex = session.player(Seat::First).clone();
        session.dispatch(SessionAction::SetActivity(Some(ActivityKind::SpinWheel)));
        session.record_punishment(entry(ActivityKind::SpinWheel, &alex, 7));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.current_activity(), None);

        session.switch_turn();
        assert_eq!(session.current_turn(), Seat::Second);
    }

    #[test]
    fn restore_reproduces_snapshot_fields() {
        let mut session = active_session();
        let alex = session.player(Seat::First).clone();
        session.dispatch(SessionAction::SetActivity(Some(ActivityKind::ScratchCard)));
        session.record_punishment(entry(ActivityKind::ScratchCard, &alex, 3));
        session.switch_turn();
        session.dispatch(SessionAction::SetActivity(Some(ActivityKind::SpinWheel)));

        let stored = session.to_stored();
        let mut restored = GameSession::new();
        restored.dispatch(SessionAction::Restore(stored));

        assert!(restored.is_active());
        assert_eq!(restored.players(), session.players());
        assert_eq!(restored.difficulty(), session.difficulty());
        assert_eq!(restored.current_activity(), session.current_activity());
        assert_eq!(restored.current_turn(), session.current_turn());
        assert_eq!(restored.history(), session.history());
    }
}
