//! Cards, piles and the rules of Klondike (draw three).
pub mod action;
pub mod board;
pub mod card;
pub mod deck;
pub mod rules;
