//! Pixel geometry for the two bracket views.
//!
//! Standard view lays rounds out as columns from left to right. The
//! mirrored ("finals-center") view splits every round but the last into a
//! left half flowing right and a right half flowing left, with the final
//! in the middle.

use serde::Serialize;

use crate::bracket::{Bracket, Match};
use crate::types::{BracketConfig, ViewMode, HEADER_HEIGHT, HEADER_OFFSET};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSlot {
    pub seed: Option<u32>,
    pub name: String,
    pub is_winner: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchBox {
    pub match_id: u32,
    pub round: u32,
    /// Position of the match within its round (standard) or half (mirrored).
    pub index: usize,
    pub side: Side,
    pub rect: Rect,
    pub slots: [RenderedSlot; 2],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundHeader {
    pub round: u32,
    pub label: String,
    pub side: Side,
    pub is_finals: bool,
    pub rect: Rect,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketLayout {
    /// The mode actually used; mirrored falls back to standard for a lone final.
    pub view_mode: ViewMode,
    pub width: f32,
    pub height: f32,
    pub left_width: f32,
    pub right_width: f32,
    pub headers: Vec<RoundHeader>,
    pub matches: Vec<MatchBox>,
}

impl BracketLayout {
    pub fn match_box(&self, match_id: u32) -> Option<&MatchBox> {
        self.matches.iter().find(|b| b.match_id == match_id)
    }
}

pub fn supports_mirrored(bracket: &Bracket) -> bool {
    bracket.rounds() >= 2
}

fn column_pitch(config: &BracketConfig) -> f32 {
    config.match_width + config.round_gap
}

fn round_spacing(config: &BracketConfig, round: u32) -> f32 {
    config.match_height * 2f32.powi(round as i32 - 1)
}

/// Top edge of match `index` in `round`, before the header offset.
pub fn match_top(config: &BracketConfig, round: u32, index: usize) -> f32 {
    let spacing = round_spacing(config, round);
    spacing / 2.0 + index as f32 * spacing
}

fn match_box(config: &BracketConfig, m: &Match, index: usize, side: Side, x: f32, top: f32) -> MatchBox {
    MatchBox {
        match_id: m.id,
        round: m.round,
        index,
        side,
        rect: Rect {
            x,
            y: top + HEADER_OFFSET,
            width: config.match_width,
            height: config.match_height,
        },
        slots: [rendered_slot(m, 0), rendered_slot(m, 1)],
    }
}

fn rendered_slot(m: &Match, index: usize) -> RenderedSlot {
    let slot = &m.slots[index];
    RenderedSlot {
        seed: slot.seed,
        name: slot.name.clone(),
        is_winner: slot.is_winner,
    }
}

fn header(config: &BracketConfig, round: u32, label: String, side: Side, is_finals: bool, x: f32) -> RoundHeader {
    RoundHeader {
        round,
        label,
        side,
        is_finals,
        rect: Rect {
            x,
            y: 0.0,
            width: config.match_width,
            height: HEADER_HEIGHT,
        },
    }
}

fn canvas_height(bracket: &Bracket, config: &BracketConfig) -> f32 {
    bracket.round_matches(1).len() as f32 * config.match_height * 2.0
}

pub fn compute_layout(bracket: &Bracket, config: &BracketConfig, mode: ViewMode) -> BracketLayout {
    match mode {
        ViewMode::Mirrored if supports_mirrored(bracket) => mirrored_layout(bracket, config),
        _ => standard_layout(bracket, config),
    }
}

pub fn standard_layout(bracket: &Bracket, config: &BracketConfig) -> BracketLayout {
    let pitch = column_pitch(config);
    let mut headers = Vec::new();
    let mut matches = Vec::new();

    for round in 1..=bracket.rounds() as u32 {
        let x = (round - 1) as f32 * pitch;
        headers.push(header(config, round, format!("Round {round}"), Side::Left, false, x));
        for (index, m) in bracket.round_matches(round as usize).into_iter().enumerate() {
            matches.push(match_box(config, m, index, Side::Left, x, match_top(config, round, index)));
        }
    }

    let width = bracket.rounds() as f32 * pitch;
    BracketLayout {
        view_mode: ViewMode::Standard,
        width,
        height: canvas_height(bracket, config),
        left_width: width,
        right_width: 0.0,
        headers,
        matches,
    }
}

pub fn mirrored_layout(bracket: &Bracket, config: &BracketConfig) -> BracketLayout {
    let pitch = column_pitch(config);
    let rounds = bracket.rounds() as u32;
    let center_x = (rounds - 1) as f32 * pitch;
    let mut headers = Vec::new();
    let mut matches = Vec::new();

    for round in 1..rounds {
        let in_round = bracket.round_matches(round as usize);
        let half = in_round.len().div_ceil(2);
        let (left, right) = in_round.split_at(half);

        let left_x = (round - 1) as f32 * pitch;
        headers.push(header(config, round, format!("Round {round}"), Side::Left, false, left_x));
        for (index, m) in left.iter().enumerate() {
            matches.push(match_box(config, m, index, Side::Left, left_x, match_top(config, round, index)));
        }

        let mirrored_round = rounds - round;
        let right_x = center_x + mirrored_round as f32 * pitch;
        headers.push(header(config, round, format!("Round {round}"), Side::Right, false, right_x));
        for (index, m) in right.iter().enumerate() {
            matches.push(match_box(config, m, index, Side::Right, right_x, match_top(config, round, index)));
        }
    }

    if let Some(final_match) = bracket.round_matches(rounds as usize).first() {
        headers.push(header(config, rounds, "Finals".to_string(), Side::Center, true, center_x));
        let top = match_top(config, rounds - 1, 0);
        matches.push(match_box(config, final_match, 0, Side::Center, center_x, top));
    }

    let left_width = center_x;
    let right_start = center_x + config.match_width;
    let right_width = matches
        .iter()
        .filter(|b| b.side == Side::Right)
        .map(|b| b.rect.right() - right_start)
        .fold(0.0, f32::max);

    BracketLayout {
        view_mode: ViewMode::Mirrored,
        width: left_width + config.match_width + right_width,
        height: canvas_height(bracket, config),
        left_width,
        right_width,
        headers,
        matches,
    }
}
