use eframe::egui;
use egui::{
    Color32, CornerRadius, Id, LayerId, Order, Pos2, Rect, Sense, Stroke, StrokeKind, Vec2,
};
use klondike_common::board::{DRAW_COUNT, PileId, TOTAL_FOUNDATIONS, TOTAL_TABLEAUS};
use klondike_common::card::{Card, Color};
use klondike_game::{Config, GameEvent, Session, Source};
use tracing::{debug, info};

use std::time::Duration;

const CARD_SIZE: Vec2 = Vec2::new(90.0, 130.0);
const CARD_PADDING: f32 = 10.0;
const TABLEAU_CARD_V_OFFSET: f32 = 25.0; // Vertical offset of cards in tableau pile
const WASTE_CARD_H_OFFSET: f32 = 20.0; // Horizontal offset of cards in waste pile
const MESSAGE_DURATION: f64 = 3.0;

struct Victory {
    score: u32,
    moves: u32,
    elapsed: Duration,
    until: f64,
}

/// Renders a [`Session`] and paces it with the frame clock.
pub struct KlondikeApp {
    session: Session,
    config: Config,
    foundation_rects: [Rect; TOTAL_FOUNDATIONS],
    tableau_rects: [Rect; TOTAL_TABLEAUS],
    waste_rect: Rect,
    dragged_cards: Vec<Card>,
    drag_source: Option<Source>,
    drag_offset: Vec2,
    next_deal_time: f64,
    next_bot_time: f64,
    // (when, whether the bot resumes once the cards are dealt)
    pending_restart: Option<(f64, bool)>,
    resume_bot: bool,
    victory: Option<Victory>,
    message: Option<(String, f64)>,
}

impl eframe::App for KlondikeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);

        // --- Hotkey handling ---
        if ctx.input_mut(|i| i.key_pressed(egui::Key::N)) {
            self.new_game(false);
        }
        if ctx.input_mut(|i| i.key_pressed(egui::Key::B)) {
            self.toggle_bot(now);
        }
        if ctx.input_mut(|i| i.key_pressed(egui::Key::H)) {
            self.show_hint(now);
        }
        if ctx.input_mut(|i| i.key_pressed(egui::Key::Z)) {
            self.undo(now);
        }

        let pointer = ctx.input(|i| i.pointer.clone());
        let is_pointer_down = pointer.any_down();

        // If mouse is released, record drop position. We will handle it after UI rendering.
        let mut drop_pos = None;
        if pointer.any_released() && !self.dragged_cards.is_empty() {
            drop_pos = pointer.interact_pos();
        }

        // --- UI rendering ---
        egui::TopBottomPanel::bottom("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui, now);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.style_mut().spacing.item_spacing = Vec2::splat(CARD_PADDING);

            ui.horizontal(|ui| {
                self.draw_stock(ui);
                self.draw_waste(ui);
                ui.add_space(CARD_SIZE.x + CARD_PADDING - (DRAW_COUNT - 1) as f32 * WASTE_CARD_H_OFFSET);
                for i in 0..TOTAL_FOUNDATIONS {
                    self.draw_foundation(ui, i);
                }
            });

            ui.add_space(CARD_PADDING);

            ui.horizontal_top(|ui| {
                for i in 0..TOTAL_TABLEAUS {
                    self.draw_tableau_pile(ui, i);
                }
            });

            if !self.dragged_cards.is_empty()
                && let Some(drag_pos) = pointer.interact_pos()
            {
                self.draw_dragged_cards(ctx, drag_pos + self.drag_offset);
            }
        });

        if let Some(pos) = drop_pos {
            self.handle_drop(pos);
        }
        if !is_pointer_down && !self.dragged_cards.is_empty() {
            self.cancel_drag();
        }

        self.handle_events(now);
        self.advance(now);

        if self.victory.is_some() {
            self.popup_win(ctx, now);
        }
        self.popup_message(ctx, now);

        ctx.request_repaint();
    }
}

impl KlondikeApp {
    pub fn new(session: Session, config: Config) -> Self {
        Self {
            session,
            config,
            foundation_rects: [Rect::ZERO; TOTAL_FOUNDATIONS],
            tableau_rects: [Rect::ZERO; TOTAL_TABLEAUS],
            waste_rect: Rect::ZERO,

            dragged_cards: Vec::new(),
            drag_source: None,
            drag_offset: Vec2::ZERO,

            next_deal_time: 0.0,
            next_bot_time: 0.0,
            pending_restart: None,
            resume_bot: false,
            victory: None,
            message: None,
        }
    }

    fn new_game(&mut self, resume_bot: bool) {
        self.pending_restart = None;
        self.resume_bot = resume_bot;
        self.session.new_game();
    }

    fn toggle_bot(&mut self, now: f64) {
        if self.session.is_bot_active() {
            self.session.stop_bot();
        } else if self.session.start_bot() {
            self.next_bot_time = now + self.config.bot_interval.as_secs_f64();
        }
    }

    fn show_hint(&mut self, now: f64) {
        self.message = Some((self.session.hint(), now + MESSAGE_DURATION));
    }

    fn undo(&mut self, now: f64) {
        if let Some(message) = self.session.undo() {
            self.message = Some((message.to_string(), now + MESSAGE_DURATION));
        }
    }

    fn handle_events(&mut self, now: f64) {
        for event in self.session.take_events() {
            match event {
                GameEvent::StateChanged => {}
                GameEvent::Won {
                    score,
                    moves,
                    elapsed,
                    by_bot,
                } => {
                    let until = now + self.config.celebration.as_secs_f64();
                    self.victory = Some(Victory {
                        score,
                        moves,
                        elapsed,
                        until,
                    });
                    if by_bot {
                        self.schedule_restart(until, true);
                    }
                }
                GameEvent::Stuck => {
                    self.message = Some(("The bot is stuck".to_string(), now + MESSAGE_DURATION));
                    self.schedule_restart(now, false);
                }
                GameEvent::Restarted(reason) => {
                    debug!(?reason, "Dealing");
                    self.cancel_drag();
                    self.victory = None;
                    self.next_deal_time = now;
                }
            }
        }
    }

    /// Starts a new game `restart_delay` after `after`.
    fn schedule_restart(&mut self, after: f64, resume_bot: bool) {
        let when = after + self.config.restart_delay.as_secs_f64();
        info!(resume_bot, "New game in {:?}", self.config.restart_delay);
        self.pending_restart = Some((when, resume_bot));
    }

    /// Deals, restarts and lets the bot play whenever their time has come.
    fn advance(&mut self, now: f64) {
        if let Some((when, resume_bot)) = self.pending_restart
            && now >= when
        {
            self.new_game(resume_bot);
            return;
        }

        if self.session.is_dealing() {
            if now >= self.next_deal_time {
                self.session.deal_step();
                self.next_deal_time = now + self.config.deal_interval.as_secs_f64();
            }
            return;
        }

        if self.resume_bot {
            self.resume_bot = false;
            if self.session.start_bot() {
                self.next_bot_time = now + self.config.bot_interval.as_secs_f64();
            }
        }

        if self.session.is_bot_active() && self.dragged_cards.is_empty() && now >= self.next_bot_time {
            self.session.tick();
            self.next_bot_time = now + self.config.bot_interval.as_secs_f64();
        }
    }

    fn accepts_input(&self) -> bool {
        !self.session.is_dealing() && !self.session.is_won()
    }

    /// Draw a card in the specified rectangle
    fn paint_card(painter: &egui::Painter, rect: Rect, card: &Card) {
        let bg_color = if card.face_up {
            Color32::from_gray(248)
        } else {
            Color32::from_rgb(0, 128, 128)
        };
        painter.rect_filled(rect, CornerRadius::same(5), bg_color);
        painter.rect_stroke(
            rect,
            CornerRadius::same(5),
            Stroke::new(1.0, Color32::from_gray(100)),
            StrokeKind::Inside,
        );

        if card.face_up {
            let text_color = match card.color() {
                Color::Red => Color32::from_rgb(200, 30, 30),
                Color::Black => Color32::BLACK,
            };
            let suit_symbol = card.suit().symbol();
            let label = card.to_string();
            let rank_symbol = label.trim_end_matches(suit_symbol);
            let font_id = egui::FontId::proportional(20.0);
            let padding = Vec2::new(3.0, 3.0);

            painter.text(
                rect.min + padding,
                egui::Align2::LEFT_TOP,
                rank_symbol,
                font_id.clone(),
                text_color,
            );
            painter.text(
                Pos2::new(rect.max.x - padding.x, rect.min.y + padding.y),
                egui::Align2::RIGHT_TOP,
                suit_symbol,
                font_id.clone(),
                text_color,
            );
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                suit_symbol,
                egui::FontId::proportional(36.0),
                text_color,
            );
            painter.text(
                rect.max - padding,
                egui::Align2::RIGHT_BOTTOM,
                rank_symbol,
                font_id,
                text_color,
            );
        }
    }

    /// Draw an empty pile placeholder in the specified rectangle
    fn paint_empty_pile(painter: &egui::Painter, rect: Rect) {
        painter.rect_stroke(
            rect,
            CornerRadius::same(5),
            Stroke::new(1.0, Color32::from_gray(100)),
            StrokeKind::Inside,
        );
    }

    fn draw_stock(&mut self, ui: &mut egui::Ui) {
        let (rect, response) = ui.allocate_exact_size(CARD_SIZE, Sense::click());

        if response.clicked() && self.dragged_cards.is_empty() {
            self.session.draw_from_stock();
        }

        let painter = ui.painter_at(rect);
        if self.session.board().stock.is_empty() {
            Self::paint_empty_pile(&painter, rect);
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "↺",
                egui::FontId::proportional(32.0),
                Color32::from_gray(140),
            );
        } else {
            Self::paint_card(&painter, rect, &Card::new_with_id(0));
        }
    }

    /// The last three waste cards, fanned; only the top one reacts.
    fn draw_waste(&mut self, ui: &mut egui::Ui) {
        let waste_width = CARD_SIZE.x + (DRAW_COUNT - 1) as f32 * WASTE_CARD_H_OFFSET;
        let (_, rect) = ui.allocate_space(Vec2::new(waste_width, CARD_SIZE.y));
        self.waste_rect = rect;

        let mut visible: Vec<Card> = self.session.board().waste.iter().copied().collect();
        if self.drag_source == Some(Source::Waste) {
            visible.pop();
        }
        let shown = &visible[visible.len().saturating_sub(DRAW_COUNT)..];

        let mut top_card_rect = None;
        for (i, card) in shown.iter().enumerate() {
            let card_pos = self.waste_rect.min + Vec2::new(i as f32 * WASTE_CARD_H_OFFSET, 0.0);
            let card_rect = Rect::from_min_size(card_pos, CARD_SIZE);
            Self::paint_card(ui.painter(), card_rect, card);
            top_card_rect = Some(card_rect);
        }

        let Some(top_card_rect) = top_card_rect else {
            return;
        };
        if self.drag_source.is_some() {
            return;
        }
        let response = ui.interact(
            top_card_rect,
            Id::new("waste_top_card"),
            Sense::click_and_drag(),
        );
        if response.clicked() {
            self.session.auto_move(Source::Waste);
        }
        if response.drag_started() {
            self.start_drag(Source::Waste, &response);
        }
    }

    fn draw_foundation(&mut self, ui: &mut egui::Ui, i: usize) {
        let (rect, _) = ui.allocate_exact_size(CARD_SIZE, Sense::hover());
        self.foundation_rects[i] = rect;
        let painter = ui.painter_at(rect);

        if let Some(card) = self.session.board().foundations[i].peek_top() {
            Self::paint_card(&painter, rect, card);
        } else {
            Self::paint_empty_pile(&painter, rect);
        }
    }

    fn draw_tableau_pile(&mut self, ui: &mut egui::Ui, i: usize) {
        let mut pile: Vec<Card> = self.session.board().tableaus[i].iter().copied().collect();
        if let Some(Source::Tableau { pile: from, index }) = self.drag_source
            && from == i
        {
            pile.truncate(index);
        }

        let pile_height = CARD_SIZE.y + pile.len().saturating_sub(1) as f32 * TABLEAU_CARD_V_OFFSET;
        let (_, pile_rect) = ui.allocate_space(Vec2::new(CARD_SIZE.x, pile_height));
        self.tableau_rects[i] = pile_rect;

        if pile.is_empty() {
            Self::paint_empty_pile(ui.painter(), pile_rect);
            return;
        }

        let top = pile.len() - 1;
        for (j, card) in pile.iter().enumerate() {
            let card_pos = pile_rect.min + Vec2::new(0.0, j as f32 * TABLEAU_CARD_V_OFFSET);
            let card_rect = Rect::from_min_size(card_pos, CARD_SIZE);

            if self.drag_source.is_none() && (card.face_up || j == top) {
                let response = ui.interact(
                    card_rect,
                    Id::new(("tableau", i, j)),
                    Sense::click_and_drag(),
                );
                let source = Source::Tableau { pile: i, index: j };
                if !card.face_up {
                    if response.clicked() {
                        self.session.flip_top_card(i);
                    }
                } else {
                    if response.clicked() {
                        self.session.auto_move(source);
                    }
                    if response.drag_started() {
                        self.start_drag(source, &response);
                    }
                }
            }
            Self::paint_card(ui.painter(), card_rect, card);
        }
    }

    fn draw_dragged_cards(&self, ctx: &egui::Context, pos: Pos2) {
        let layer_id = LayerId::new(Order::Tooltip, Id::new("drag_layer"));
        let painter = ctx.layer_painter(layer_id);

        for (i, card) in self.dragged_cards.iter().enumerate() {
            let card_pos = pos + Vec2::new(0.0, i as f32 * TABLEAU_CARD_V_OFFSET);
            let card_rect = Rect::from_min_size(card_pos, CARD_SIZE);
            Self::paint_card(&painter, card_rect, card);
        }
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui, now: f64) {
        ui.horizontal(|ui| {
            ui.menu_button("☰", |ui| {
                if ui
                    .add(egui::Button::new("New Game").shortcut_text("N"))
                    .clicked()
                {
                    self.new_game(false);
                    ui.close();
                }
                ui.separator();
                if ui
                    .add(egui::Button::new("Undo").shortcut_text("Z"))
                    .clicked()
                {
                    self.undo(now);
                    ui.close();
                }
            });

            let (bot_label, hover_text) = if self.session.is_bot_active() {
                ("⏸", "Stop Bot (B)")
            } else {
                ("▶", "Start Bot (B)")
            };
            let bot_button = egui::Button::new(bot_label);
            if ui
                .add_enabled(!self.session.is_dealing(), bot_button)
                .on_hover_text(hover_text)
                .clicked()
            {
                self.toggle_bot(now);
            }
            if ui.button("Hint").on_hover_text("Hint (H)").clicked() {
                self.show_hint(now);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("Score: {}", self.session.score()));
                ui.separator();
                ui.label(format!("Moves: {}", self.session.moves()));
                ui.separator();
                ui.label(format!("Time: {}", format_time(self.session.elapsed())));
            });
        });
    }

    fn start_drag(&mut self, source: Source, response: &egui::Response) {
        if !self.accepts_input() || !self.dragged_cards.is_empty() {
            return;
        }
        let board = self.session.board();
        let cards: Vec<Card> = match source {
            Source::Waste => board.waste.peek_top().into_iter().copied().collect(),
            Source::Tableau { pile, index } => {
                board.tableaus[pile].iter().skip(index).copied().collect()
            }
        };
        if cards.is_empty() || !cards[0].face_up {
            return;
        }

        self.dragged_cards = cards;
        self.drag_source = Some(source);
        if let Some(pointer_pos) = response.interact_pointer_pos() {
            self.drag_offset = response.rect.min - pointer_pos;
        }
    }

    fn handle_drop(&mut self, drop_pos: Pos2) {
        let target = (0..TOTAL_FOUNDATIONS)
            .filter(|&i| self.foundation_rects[i].contains(drop_pos))
            .map(PileId::Foundation)
            .chain(
                (0..TOTAL_TABLEAUS)
                    .filter(|&i| self.tableau_rects[i].expand2(Vec2::new(0.0, CARD_SIZE.y)).contains(drop_pos))
                    .map(PileId::Tableau),
            )
            .find(|&target| self.session.can_drop_cards(&self.dragged_cards, target));

        if let (Some(source), Some(target)) = (self.drag_source, target) {
            self.session.move_to(source, target);
        }
        self.cancel_drag();
    }

    fn cancel_drag(&mut self) {
        self.dragged_cards.clear();
        self.drag_source = None;
    }

    fn popup_win(&mut self, ctx: &egui::Context, now: f64) {
        let mut play_again = false;
        if let Some(victory) = &self.victory {
            egui::Window::new("Victory")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        let heading = if now < victory.until { "🎉 You won! 🎉" } else { "You won!" };
                        ui.heading(heading);
                        ui.label(format!(
                            "Score: {}  Moves: {}  Time: {}",
                            victory.score,
                            victory.moves,
                            format_time(victory.elapsed)
                        ));
                        if self.pending_restart.is_none() && ui.button("Play Again").clicked() {
                            play_again = true;
                        }
                    });
                });
        }
        if play_again {
            self.new_game(false);
        }
    }

    fn popup_message(&mut self, ctx: &egui::Context, now: f64) {
        if self.message.as_ref().is_some_and(|(_, until)| now >= *until) {
            self.message = None;
        }
        if let Some((message, _)) = &self.message {
            egui::Window::new("Message")
                .title_bar(false)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_TOP, [0.0, 20.0])
                .show(ctx, |ui| {
                    ui.label(message.as_str());
                });
        }
    }
}

fn format_time(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", (secs / 60).min(99), secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_app(board_str: &str) -> KlondikeApp {
        let board = klondike_common::board::Board::parse(board_str).unwrap();
        KlondikeApp::new(Session::from_board(board), Config::default())
    }

    /// Runs frames `step` seconds apart the way `update` orders them.
    fn run_frames(app: &mut KlondikeApp, from: f64, frames: usize, step: f64) -> f64 {
        let mut now = from;
        for _ in 0..frames {
            app.handle_events(now);
            app.advance(now);
            now += step;
        }
        now
    }

    #[test]
    fn test_bot_win_restarts_after_celebration() {
        let mut app = load_app(
            "Foundation1: Q♥\nFoundation2: Q♦\nFoundation3: Q♣\nFoundation4: Q♠\n\
             Tableau1: |K♥\nTableau2: |K♦\nTableau3: |K♣\nTableau4: |K♠",
        );
        assert!(app.session.start_bot());
        let now = run_frames(&mut app, 0.0, 4, 1.2);
        assert!(app.session.is_won());
        assert!(!app.session.is_bot_active());

        app.handle_events(now);
        let until = now + app.config.celebration.as_secs_f64();
        let expected = until + app.config.restart_delay.as_secs_f64();
        assert_eq!(app.pending_restart, Some((expected, true)));
        assert!(app.victory.as_ref().is_some_and(|v| v.score == 40 && v.moves == 4));

        // still celebrating
        app.advance(until);
        assert!(app.session.is_won());
        assert!(app.victory.is_some());

        app.advance(expected);
        assert!(app.session.is_dealing());
        assert!(app.pending_restart.is_none());
        app.handle_events(expected);
        assert!(app.victory.is_none());

        run_frames(&mut app, expected, 40, 0.05);
        assert!(!app.session.is_dealing());
        assert!(app.session.is_bot_active());
    }

    #[test]
    fn test_human_win_does_not_restart() {
        let mut app = load_app(
            "Foundation1: Q♥\nFoundation2: Q♦\nFoundation3: Q♣\nFoundation4: K♠\n\
             Waste: K♣\nTableau1: |K♥\nTableau2: |K♦",
        );
        assert!(app.session.auto_move(Source::Waste));
        assert!(app.session.auto_move(Source::Tableau { pile: 0, index: 0 }));
        assert!(app.session.auto_move(Source::Tableau { pile: 1, index: 0 }));
        assert!(app.session.is_won());
        app.handle_events(1.0);
        assert!(app.victory.is_some());
        assert_eq!(app.pending_restart, None);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(Duration::from_secs(0)), "00:00");
        assert_eq!(format_time(Duration::from_secs(125)), "02:05");
        assert_eq!(format_time(Duration::from_secs(10_000)), "99:40");
    }
}
