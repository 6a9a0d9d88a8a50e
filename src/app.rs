//! Local terminal session: screens, slide animation and score saving.
//!
//! `App` holds no terminal state; the binary feeds it key presses and ticks
//! and draws whatever `view()` returns.

use anyhow::Context;
use crossterm::event::{KeyEvent, KeyEventKind};

use crate::core::{GameSnapshot, GameState, Latch, SimpleRng, TileRng};
use crate::input::{
    handle_key_event, handle_text_key, is_dismiss_key, should_quit, should_quit_text, TextEdit,
};
use crate::store::{fingerprint, validate_username, LeaderboardEntry, Player, ScoreStore};
use crate::term::{Screen, ScreenView, SlideAnimation};
use crate::types::{GameAction, Grid, LEADERBOARD_LIMIT, USERNAME_MAX_LEN};

/// What the event loop does after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Redraw,
    Unchanged,
    Quit,
}

impl KeyOutcome {
    fn redraw_if(changed: bool) -> Self {
        if changed {
            KeyOutcome::Redraw
        } else {
            KeyOutcome::Unchanged
        }
    }
}

pub struct App<R = SimpleRng> {
    game: GameState<R>,
    store: ScoreStore,
    fingerprint: String,
    /// `None` until a first-time player picks a username
    player: Option<Player>,
    /// Username typed so far on the entry screen
    input: String,
    screen: Screen,
    /// Screen to go back to when the leaderboard closes
    return_to: Screen,
    animation: Option<SlideAnimation>,
    /// Board currently on screen
    grid: Grid,
    snapshot: GameSnapshot,
    leaderboard: Vec<LeaderboardEntry>,
    /// Set once the current episode's score is in the store
    saved: Latch,
    status: Option<String>,
}

impl App<SimpleRng> {
    /// Session for `credential` with a [`SimpleRng`] seeded from `seed`
    pub fn seeded(credential: &str, store: ScoreStore, seed: u32) -> anyhow::Result<Self> {
        Self::build(credential, store, |best| GameState::seeded(seed, best))
    }
}

impl<R: TileRng> App<R> {
    /// Session for the player identified by `credential`. Unknown
    /// credentials start on the username entry screen.
    pub fn new(credential: &str, store: ScoreStore, rng: R) -> anyhow::Result<Self> {
        Self::build(credential, store, |best| GameState::new(best, rng))
    }

    fn build(
        credential: &str,
        store: ScoreStore,
        make_game: impl FnOnce(u32) -> GameState<R>,
    ) -> anyhow::Result<Self> {
        let fp = fingerprint(credential);
        let player = store
            .player_by_fingerprint(&fp)
            .context("looking up player")?;
        let (best, screen) = match &player {
            Some(p) => {
                let best = store.best_score(p.id).context("loading best score")?;
                tracing::info!(player_id = p.id, username = %p.username, best, "session started");
                (best, Screen::Playing)
            }
            None => {
                tracing::info!(fingerprint = %fp, "new player, asking for a username");
                (0, Screen::UsernameEntry)
            }
        };

        let game = make_game(best);
        let snapshot = game.snapshot();
        Ok(Self {
            game,
            store,
            fingerprint: fp,
            player,
            input: String::new(),
            screen,
            return_to: Screen::Playing,
            animation: None,
            grid: snapshot.board,
            snapshot,
            leaderboard: Vec::new(),
            saved: Latch::new(),
            status: None,
        })
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn game(&self) -> &GameState<R> {
        &self.game
    }

    pub fn store(&self) -> &ScoreStore {
        &self.store
    }

    /// Username of the current player; empty before registration
    pub fn player(&self) -> &str {
        self.player.as_ref().map_or("", |p| p.username.as_str())
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn snapshot(&self) -> &GameSnapshot {
        &self.snapshot
    }

    /// Everything the game view needs for the next frame
    pub fn view(&self) -> ScreenView<'_> {
        ScreenView {
            screen: self.screen,
            player: self.player(),
            input: &self.input,
            grid: &self.grid,
            leaderboard: &self.leaderboard,
            status: self.status.as_deref(),
        }
    }

    /// Route one key press to the current screen.
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.kind == KeyEventKind::Release {
            return KeyOutcome::Unchanged;
        }

        if self.screen == Screen::UsernameEntry {
            if should_quit_text(key) {
                return KeyOutcome::Quit;
            }
            return match handle_text_key(key) {
                Some(edit) => KeyOutcome::redraw_if(self.edit_username(edit)),
                None => KeyOutcome::Unchanged,
            };
        }

        if should_quit(key) {
            return KeyOutcome::Quit;
        }
        if self.screen == Screen::Leaderboard && is_dismiss_key(key) {
            return KeyOutcome::redraw_if(self.close_leaderboard());
        }
        match handle_key_event(key) {
            Some(action) => KeyOutcome::redraw_if(self.handle_action(action)),
            None => KeyOutcome::Unchanged,
        }
    }

    /// Apply one input action. Returns `true` when the screen needs a redraw.
    pub fn handle_action(&mut self, action: GameAction) -> bool {
        if self.animation.is_some() {
            return false;
        }

        match (self.screen, action) {
            (Screen::UsernameEntry, _) => false,
            (Screen::Leaderboard, GameAction::Leaderboard) => self.close_leaderboard(),
            (Screen::Leaderboard, _) => false,
            (_, GameAction::Leaderboard) => {
                self.open_leaderboard();
                true
            }
            (_, GameAction::Restart) => {
                self.game.reset();
                self.saved = Latch::new();
                self.status = None;
                self.screen = Screen::Playing;
                self.refresh();
                true
            }
            (Screen::GameOver, _) => false,
            (Screen::Playing, _) => {
                let Some(result) = self.game.apply_action(action) else {
                    return false;
                };
                if !result.moved {
                    return false;
                }
                self.animation = SlideAnimation::from_result(&result);
                if self.game.game_over() {
                    self.save_score();
                }
                self.refresh();
                true
            }
        }
    }

    /// Edit the username field; `Submit` registers the player. Returns `true`
    /// when the screen needs a redraw.
    pub fn edit_username(&mut self, edit: TextEdit) -> bool {
        if self.screen != Screen::UsernameEntry {
            return false;
        }
        match edit {
            TextEdit::Insert(c) => {
                if self.input.chars().count() >= USERNAME_MAX_LEN {
                    return false;
                }
                self.input.push(c);
                true
            }
            TextEdit::Backspace => self.input.pop().is_some(),
            TextEdit::Submit => {
                self.register();
                true
            }
        }
    }

    fn register(&mut self) {
        let username = match validate_username(&self.input) {
            Ok(name) => name.to_string(),
            Err(e) => {
                self.status = Some(e.to_string());
                return;
            }
        };
        match self.store.create_player(&self.fingerprint, &username) {
            Ok(player) => {
                tracing::info!(
                    player_id = player.id,
                    username = %player.username,
                    "player registered"
                );
                self.player = Some(player);
                self.input.clear();
                self.status = None;
                self.screen = Screen::Playing;
                self.refresh();
            }
            Err(e) => {
                tracing::warn!(error = %e, "registering player failed");
                self.status = Some(format!("Could not register: {:#}", e));
            }
        }
    }

    fn open_leaderboard(&mut self) {
        match self.store.leaderboard(LEADERBOARD_LIMIT) {
            Ok(rows) => self.leaderboard = rows,
            Err(e) => {
                tracing::warn!(error = %e, "loading leaderboard failed");
                self.leaderboard.clear();
                self.status = Some(format!("Could not load leaderboard: {:#}", e));
            }
        }
        self.return_to = self.screen;
        self.screen = Screen::Leaderboard;
    }

    fn close_leaderboard(&mut self) -> bool {
        if self.screen != Screen::Leaderboard {
            return false;
        }
        self.screen = self.return_to;
        true
    }

    /// Advance the animation by one frame. Returns `true` when the screen
    /// needs a redraw.
    pub fn tick(&mut self) -> bool {
        let Some(anim) = self.animation.as_mut() else {
            return false;
        };
        if !anim.advance() {
            self.animation = None;
        }
        self.refresh();
        true
    }

    fn refresh(&mut self) {
        self.game.snapshot_into(&mut self.snapshot);
        self.grid = match &self.animation {
            Some(anim) => anim.grid(),
            None => self.snapshot.board,
        };
        // The game-over screen waits for the last slide to finish.
        if self.animation.is_none() && self.game.game_over() && self.screen == Screen::Playing {
            self.screen = Screen::GameOver;
        }
    }

    fn save_score(&mut self) {
        let Some(player_id) = self.player.as_ref().map(|p| p.id) else {
            return;
        };
        if !self.saved.set() {
            return;
        }
        match self
            .store
            .save_score(player_id, self.game.score(), self.game.max_tile())
        {
            Ok(_) => self.status = None,
            Err(e) => {
                tracing::warn!(error = %e, "saving score failed");
                self.status = Some(format!("Could not save score: {:#}", e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Board;
    use crate::types::ANIMATION_FRAMES;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn press(app: &mut App<impl TileRng>, code: KeyCode) -> KeyOutcome {
        app.handle_key(KeyEvent::from(code))
    }

    fn type_text<R: TileRng>(app: &mut App<R>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn register<R: TileRng>(app: &mut App<R>, name: &str) {
        type_text(app, name);
        press(app, KeyCode::Enter);
    }

    fn app() -> App {
        let mut app = App::seeded("alice-key", ScoreStore::in_memory().unwrap(), 12345).unwrap();
        register(&mut app, "alice");
        app
    }

    fn finish_animation<R: TileRng>(app: &mut App<R>) {
        while app.tick() {}
    }

    /// Plays until the game ends, cycling through all four directions.
    fn play_out<R: TileRng>(app: &mut App<R>) {
        let cycle = [
            GameAction::MoveLeft,
            GameAction::MoveUp,
            GameAction::MoveRight,
            GameAction::MoveDown,
        ];
        for i in 0..100_000 {
            if app.screen() == Screen::GameOver {
                return;
            }
            app.handle_action(cycle[i % 4]);
            finish_animation(app);
        }
        panic!("game never ended");
    }

    #[test]
    fn test_new_player_starts_on_username_entry() {
        let app = App::seeded("alice-key", ScoreStore::in_memory().unwrap(), 1).unwrap();
        assert_eq!(app.screen(), Screen::UsernameEntry);
        assert_eq!(app.player(), "");
        assert_eq!(app.store().player_count().unwrap(), 0);
    }

    #[test]
    fn test_username_entry_registers_player() {
        let app = app();
        assert_eq!(app.screen(), Screen::Playing);
        assert_eq!(app.view().player, "alice");
        assert_eq!(app.store().player_count().unwrap(), 1);
        let stored = app
            .store()
            .player_by_fingerprint(&fingerprint("alice-key"))
            .unwrap()
            .unwrap();
        assert_eq!(stored.username, "alice");
    }

    #[test]
    fn test_username_entry_validates_and_edits() {
        let mut app = App::seeded("k", ScoreStore::in_memory().unwrap(), 1).unwrap();

        // Game keys type into the field.
        type_text(&mut app, "qb");
        assert_eq!(app.view().input, "qb");
        assert_eq!(press(&mut app, KeyCode::Enter), KeyOutcome::Redraw);
        assert_eq!(app.screen(), Screen::UsernameEntry);
        assert!(app.view().status.unwrap().contains("3-20"));
        assert_eq!(app.store().player_count().unwrap(), 0);

        assert_eq!(press(&mut app, KeyCode::Backspace), KeyOutcome::Redraw);
        assert_eq!(app.view().input, "q");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(press(&mut app, KeyCode::Backspace), KeyOutcome::Unchanged);

        // The field stops at the maximum length.
        type_text(&mut app, &"x".repeat(25));
        assert_eq!(app.view().input.chars().count(), USERNAME_MAX_LEN);

        assert_eq!(press(&mut app, KeyCode::Esc), KeyOutcome::Quit);
    }

    #[test]
    fn test_moves_ignored_before_registration() {
        let mut app = App::seeded("k", ScoreStore::in_memory().unwrap(), 1).unwrap();
        assert!(!app.handle_action(GameAction::MoveLeft));
        assert!(!app.handle_action(GameAction::Leaderboard));
        assert_eq!(app.game().turns(), 0);
    }

    #[test]
    fn test_move_animates_then_settles() {
        let mut app = app();
        let moved = [
            GameAction::MoveLeft,
            GameAction::MoveRight,
            GameAction::MoveUp,
            GameAction::MoveDown,
        ]
        .into_iter()
        .any(|a| app.handle_action(a));
        assert!(moved);
        assert!(app.is_animating());

        let mut frames = 0;
        while app.tick() {
            frames += 1;
        }
        assert_eq!(frames, ANIMATION_FRAMES);
        assert!(!app.is_animating());
        assert_eq!(app.view().grid, &app.snapshot().board);
    }

    #[test]
    fn test_input_ignored_while_animating() {
        let mut app = app();
        let first = [GameAction::MoveLeft, GameAction::MoveRight]
            .into_iter()
            .find(|&a| app.handle_action(a));
        assert!(first.is_some());
        let turns = app.game().turns();
        assert!(!app.handle_action(GameAction::MoveUp));
        assert!(!app.handle_action(GameAction::Restart));
        assert_eq!(app.game().turns(), turns);
    }

    #[test]
    fn test_leaderboard_toggle_returns_to_previous_screen() {
        let mut app = app();
        assert!(app.handle_action(GameAction::Leaderboard));
        assert_eq!(app.screen(), Screen::Leaderboard);
        // Moves do nothing on the leaderboard.
        assert!(!app.handle_action(GameAction::MoveLeft));
        assert!(app.handle_action(GameAction::Leaderboard));
        assert_eq!(app.screen(), Screen::Playing);
    }

    #[test]
    fn test_leaderboard_closes_on_esc_enter_space() {
        let mut app = app();
        for code in [KeyCode::Esc, KeyCode::Enter, KeyCode::Char(' ')] {
            assert_eq!(press(&mut app, KeyCode::Char('b')), KeyOutcome::Redraw);
            assert_eq!(app.screen(), Screen::Leaderboard);
            assert_eq!(press(&mut app, code), KeyOutcome::Redraw);
            assert_eq!(app.screen(), Screen::Playing, "key {:?}", code);
        }
        // Outside the leaderboard the same keys do nothing.
        assert_eq!(press(&mut app, KeyCode::Enter), KeyOutcome::Unchanged);
        assert_eq!(press(&mut app, KeyCode::Esc), KeyOutcome::Unchanged);
        assert_eq!(app.screen(), Screen::Playing);
    }

    #[test]
    fn test_quit_keys_while_playing() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Char('q')), KeyOutcome::Quit);
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyOutcome::Quit
        );
    }

    #[test]
    fn test_game_over_saves_once_and_restart() {
        let mut app = app();
        play_out(&mut app);

        assert_eq!(app.screen(), Screen::GameOver);
        assert_eq!(app.store().score_count().unwrap(), 1);
        let score = app.game().score();

        // Further moves are ignored; the leaderboard shows the saved game.
        assert!(!app.handle_action(GameAction::MoveLeft));
        app.handle_action(GameAction::Leaderboard);
        assert_eq!(app.view().leaderboard[0].score, score);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen(), Screen::GameOver);
        assert_eq!(app.store().score_count().unwrap(), 1);

        assert!(app.handle_action(GameAction::Restart));
        assert_eq!(app.screen(), Screen::Playing);
        assert_eq!(app.game().score(), 0);
        assert_eq!(app.game().best_score(), score);
        assert_eq!(app.game().episode_id(), 1);
    }

    #[test]
    fn test_game_over_screen_waits_for_animation() {
        struct FirstEmpty;
        impl TileRng for FirstEmpty {
            fn next_float(&mut self) -> f64 {
                0.5
            }
            fn next_index(&mut self, _n: usize) -> usize {
                0
            }
        }

        let mut app = App::new("alice-key", ScoreStore::in_memory().unwrap(), FirstEmpty).unwrap();
        register(&mut app, "alice");
        // One left move away from a stuck board.
        app.game = GameState::with_board(
            Board::from_grid([
                [0, 4, 8, 16],
                [8, 16, 32, 64],
                [16, 32, 64, 128],
                [32, 64, 128, 256],
            ]),
            0,
            FirstEmpty,
        );
        assert!(app.handle_action(GameAction::MoveLeft));
        assert!(app.game().game_over());
        assert_eq!(app.store().score_count().unwrap(), 1);
        assert_eq!(app.screen(), Screen::Playing);

        finish_animation(&mut app);
        assert_eq!(app.screen(), Screen::GameOver);
    }

    #[test]
    fn test_returning_player_skips_entry_and_gets_best_score() {
        let mut store = ScoreStore::in_memory().unwrap();
        let p = store.create_player(&fingerprint("alice-key"), "alice").unwrap();
        store.save_score(p.id, 2500, 256).unwrap();

        let app = App::seeded("alice-key", store, 7).unwrap();
        assert_eq!(app.screen(), Screen::Playing);
        assert_eq!(app.player(), "alice");
        assert_eq!(app.game().best_score(), 2500);
        assert_eq!(app.snapshot().best_score, 2500);
        assert_eq!(app.store().player_count().unwrap(), 1);
    }
}
