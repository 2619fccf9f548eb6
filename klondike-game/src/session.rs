use crate::config::Config;
use crate::cycle::{CycleVerdict, MAX_IDLE_CYCLES, StockCycleTracker};
use crate::event::{GameEvent, MoveRecord, RestartReason};

use klondike_common::action::Action;
use klondike_common::board::{Board, DrawOutcome, PileId, TOTAL_TABLEAUS};
use klondike_common::card::Card;
use klondike_common::deck::{Dealer, build_deck, shuffle};

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info, trace};

pub const POINTS_PER_MOVE: u32 = 10;
pub const UNDO_UNAVAILABLE: &str = "Undo functionality is not implemented in this version.";

/// Where the card(s) of a move come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Waste,
    /// The run starting at `index` of tableau `pile`.
    Tableau { pile: usize, index: usize },
}

/// Result of one bot tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The bot is off or the cards are still being dealt.
    Idle,
    Played(Action),
    /// The bot went through the stock too often without progress; the redeal
    /// was replaced by a fresh deal.
    Restarted,
    Stuck,
}

/// One game of Klondike and everything that happens to it.
///
/// All mutation goes through the methods below; each either applies completely or
/// returns `false` without touching anything.
#[derive(Debug)]
pub struct Session {
    board: Board,
    dealer: Option<Dealer>,
    rng: StdRng,
    moves: u32,
    score: u32,
    history: Vec<MoveRecord>,
    cycle: StockCycleTracker,
    bot_active: bool,
    won: bool,
    started_at: Instant,
    finished_at: Option<Instant>,
    events: Vec<GameEvent>,
    // loaded positions may be partial
    checked: bool,
}

impl Session {
    /// Starts the first game. Its cards still have to be dealt.
    pub fn new(config: &Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut session = Self::with_parts(Board::new(), rng);
        session.restart(RestartReason::NewGame);
        session
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(&Config {
            seed: Some(seed),
            ..Default::default()
        })
    }

    /// Continues from an already dealt position.
    pub fn from_board(board: Board) -> Self {
        let checked = board.is_valid();
        let mut session = Self::with_parts(board, StdRng::from_os_rng());
        session.checked = checked;
        session
    }

    fn with_parts(board: Board, rng: StdRng) -> Self {
        Self {
            board,
            dealer: None,
            rng,
            moves: 0,
            score: 0,
            history: Vec::new(),
            cycle: StockCycleTracker::default(),
            bot_active: false,
            won: false,
            started_at: Instant::now(),
            finished_at: None,
            events: Vec::new(),
            checked: true,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn stock_cycles(&self) -> u32 {
        self.cycle.cycles()
    }

    pub fn is_dealing(&self) -> bool {
        self.dealer.is_some()
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn is_bot_active(&self) -> bool {
        self.bot_active
    }

    /// Time since the game started, frozen once it is won.
    pub fn elapsed(&self) -> Duration {
        match self.finished_at {
            Some(end) => end - self.started_at,
            None => self.started_at.elapsed(),
        }
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Throws the current game away and starts dealing a fresh shuffle.
    pub fn new_game(&mut self) {
        self.restart(RestartReason::NewGame);
    }

    fn restart(&mut self, reason: RestartReason) {
        let mut deck = build_deck();
        shuffle(&mut deck, &mut self.rng);

        self.board = Board::new();
        self.dealer = Some(Dealer::new(deck));
        self.moves = 0;
        self.score = 0;
        self.history.clear();
        self.cycle.reset();
        self.won = false;
        self.started_at = Instant::now();
        self.finished_at = None;
        self.checked = true;

        info!(?reason, bot = self.bot_active, "New game");
        self.events.push(GameEvent::Restarted(reason));
        self.events.push(GameEvent::StateChanged);
    }

    /// Places one card of the deal. Returns `false` once there is nothing left to deal.
    pub fn deal_step(&mut self) -> bool {
        let Some(dealer) = self.dealer.as_mut() else {
            return false;
        };
        dealer.step(&mut self.board);
        if dealer.is_finished() {
            self.finish_deal();
        }
        self.events.push(GameEvent::StateChanged);
        true
    }

    pub fn deal_all(&mut self) {
        if self.is_dealing() {
            self.finish_deal();
            self.events.push(GameEvent::StateChanged);
        }
    }

    fn finish_deal(&mut self) {
        if let Some(dealer) = self.dealer.take() {
            dealer.finish(&mut self.board);
            self.started_at = Instant::now();
            debug!(stock = self.board.stock.len(), "Deal complete");
            self.assert_consistent();
        }
    }

    fn accepts_moves(&self) -> bool {
        !self.is_dealing() && !self.won
    }

    /// Draws up to three cards, or turns the waste over once the stock is empty.
    pub fn draw_from_stock(&mut self) -> bool {
        if !self.accepts_moves() {
            trace!("Draw refused");
            return false;
        }

        if self.bot_active
            && self.board.stock.is_empty()
            && !self.board.waste.is_empty()
            && let CycleVerdict::Restart = self.cycle.on_stock_reset()
        {
            info!(
                cycles = MAX_IDLE_CYCLES,
                "Bot cycled the stock without progress"
            );
            self.restart(RestartReason::StockCycles);
            return true;
        }

        match self.board.draw() {
            DrawOutcome::Drew(count) => {
                let plural = if count > 1 { "s" } else { "" };
                self.record_move(format!("Draw {count} card{plural} from stock"));
                true
            }
            DrawOutcome::Redealt => {
                self.record_move("Reset stock from waste".to_string());
                true
            }
            DrawOutcome::Empty => false,
        }
    }

    /// Moves `card`, which must be the top of `source`, onto its suit's foundation.
    pub fn move_to_foundation(&mut self, card: Card, source: Source) -> bool {
        if !self.accepts_moves() || !self.is_top_of(&card, source) {
            trace!(%card, ?source, "Foundation move refused");
            return false;
        }
        let moved = match source {
            Source::Waste => self.board.move_waste_to_foundation(),
            Source::Tableau { pile, .. } => self.board.move_tableau_to_foundation(pile),
        };
        if moved.is_none() {
            trace!(%card, ?source, "Foundation move refused");
            return false;
        }

        self.record_productive_move();
        self.record_move(format!("Move {card} to foundation"));
        self.check_win();
        true
    }

    /// Moves `card` onto tableau `target`. From a tableau, the whole run above
    /// `card` travels with it.
    pub fn move_to_tableau(&mut self, card: Card, target: usize, source: Source) -> bool {
        if !self.accepts_moves() || self.card_at(source).is_none_or(|c| !c.same_card(&card)) {
            trace!(%card, target, ?source, "Tableau move refused");
            return false;
        }
        let moved = match source {
            Source::Waste => self.board.move_waste_to_tableau(target),
            Source::Tableau { pile, index } => {
                self.board.move_tableau_to_tableau(pile, index, target)
            }
        };
        if moved.is_none() {
            trace!(%card, target, ?source, "Tableau move refused");
            return false;
        }

        self.record_productive_move();
        self.record_move(format!("Move {card} to tableau"));
        true
    }

    /// Moves whatever `source` holds to `target`, the way a drop would.
    pub fn move_to(&mut self, source: Source, target: PileId) -> bool {
        let Some(card) = self.card_at(source) else {
            return false;
        };
        match target {
            PileId::Foundation(_) => self.move_to_foundation(card, source),
            PileId::Tableau(idx) => self.move_to_tableau(card, idx, source),
            PileId::Stock | PileId::Waste => false,
        }
    }

    /// Click-to-move: the foundation if the card is on top, else the first tableau that takes it.
    pub fn auto_move(&mut self, source: Source) -> bool {
        let Some(card) = self.card_at(source) else {
            return false;
        };
        if self.is_top_of(&card, source) && self.board.can_move_to_foundation(&card) {
            return self.move_to_foundation(card, source);
        }
        let own_pile = match source {
            Source::Tableau { pile, .. } => Some(pile),
            Source::Waste => None,
        };
        (0..TOTAL_TABLEAUS)
            .find(|&to| Some(to) != own_pile && self.board.can_move_to_tableau(&card, to))
            .is_some_and(|to| self.move_to_tableau(card, to, source))
    }

    pub fn flip_top_card(&mut self, pile: usize) -> bool {
        if self.is_dealing() || !self.board.flip_top_card(pile) {
            return false;
        }
        self.events.push(GameEvent::StateChanged);
        true
    }

    /// Executes a planner action through the regular move operations.
    pub fn apply_action(&mut self, action: Action) -> bool {
        match action {
            Action::WasteToFoundation => self.move_to(Source::Waste, PileId::Foundation(0)),
            Action::TableauToFoundation(from) => match self.board.tableaus.get(from) {
                Some(tableau) if !tableau.is_empty() => {
                    let source = Source::Tableau {
                        pile: from,
                        index: tableau.len() - 1,
                    };
                    self.move_to(source, PileId::Foundation(0))
                }
                _ => false,
            },
            Action::WasteToTableau(to) => self.move_to(Source::Waste, PileId::Tableau(to)),
            Action::TableauToTableau(from, to, count) => {
                let index = self
                    .board
                    .tableaus
                    .get(from)
                    .and_then(|tableau| tableau.len().checked_sub(count));
                match index {
                    Some(index) => self.move_to(Source::Tableau { pile: from, index }, PileId::Tableau(to)),
                    None => false,
                }
            }
            Action::Draw => !self.board.stock.is_empty() && self.draw_from_stock(),
            Action::Redeal => {
                self.board.stock.is_empty() && !self.board.waste.is_empty() && self.draw_from_stock()
            }
        }
    }

    /// Pure probe for drag-and-drop highlighting.
    pub fn can_drop_cards(&self, cards: &[Card], target: PileId) -> bool {
        self.board.can_drop_cards(cards, target)
    }

    pub fn hint(&self) -> String {
        klondike_bot::hint(&self.board)
    }

    /// There is no undo; with a non-empty history this explains why nothing happened.
    pub fn undo(&self) -> Option<&'static str> {
        (!self.history.is_empty()).then_some(UNDO_UNAVAILABLE)
    }

    /// Refused while dealing.
    pub fn start_bot(&mut self) -> bool {
        if self.is_dealing() {
            return false;
        }
        if !self.bot_active {
            info!("Bot started");
        }
        self.bot_active = true;
        true
    }

    pub fn stop_bot(&mut self) {
        if self.bot_active {
            info!("Bot stopped");
        }
        self.bot_active = false;
    }

    /// Lets the bot play one action. The host decides the cadence.
    pub fn tick(&mut self) -> Tick {
        if !self.bot_active || self.is_dealing() {
            return Tick::Idle;
        }
        match klondike_bot::next_action(&self.board) {
            Some(action) => {
                debug!(?action, "Bot move");
                let applied = self.apply_action(action);
                debug_assert!(applied, "planner chose an illegal action {action:?}");
                if self.is_dealing() {
                    Tick::Restarted
                } else {
                    Tick::Played(action)
                }
            }
            None => {
                info!(moves = self.moves, "Bot is stuck");
                self.stop_bot();
                self.events.push(GameEvent::Stuck);
                Tick::Stuck
            }
        }
    }

    fn card_at(&self, source: Source) -> Option<Card> {
        match source {
            Source::Waste => self.board.waste.peek_top().copied(),
            Source::Tableau { pile, index } => {
                self.board.tableaus.get(pile)?.card_at(index).copied()
            }
        }
    }

    fn is_top_of(&self, card: &Card, source: Source) -> bool {
        let top = match source {
            Source::Waste => self.board.waste.peek_top(),
            Source::Tableau { pile, index } => self
                .board
                .tableaus
                .get(pile)
                .filter(|tableau| index + 1 == tableau.len())
                .and_then(|tableau| tableau.card_at(index)),
        };
        top.is_some_and(|top| top.same_card(card))
    }

    fn record_productive_move(&mut self) {
        if self.bot_active {
            self.cycle.record_productive_move();
        }
    }

    fn record_move(&mut self, description: String) {
        self.moves += 1;
        self.score += POINTS_PER_MOVE;
        debug!(moves = self.moves, score = self.score, "{description}");
        self.history.push(MoveRecord {
            description,
            timestamp: SystemTime::now(),
        });
        self.events.push(GameEvent::StateChanged);
        self.assert_consistent();
    }

    fn check_win(&mut self) {
        if self.won || !self.board.is_won() {
            return;
        }
        self.won = true;
        self.finished_at = Some(Instant::now());
        let by_bot = self.bot_active;
        self.stop_bot();
        let elapsed = self.elapsed();
        info!(score = self.score, moves = self.moves, ?elapsed, "Game won");
        self.events.push(GameEvent::Won {
            score: self.score,
            moves: self.moves,
            elapsed,
            by_bot,
        });
    }

    fn assert_consistent(&self) {
        if self.checked {
            debug_assert!(self.board.is_valid(), "cards lost or duplicated:\n{}", self.board.pretty_print());
        }
    }
}
