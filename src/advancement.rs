use serde::Serialize;
use tracing::debug;

use crate::bracket::{Bracket, Match, Slot};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchState {
  /// A slot is still `TBD`, or both slots are `BYE` and nothing can advance.
  Pending,
  Ready,
  Decided,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
  Applied,
  Unchanged,
  Rejected,
}

pub fn match_state(m: &Match) -> MatchState {
  if m.is_decided() {
    return MatchState::Decided;
  }
  if is_selectable(m) {
    MatchState::Ready
  } else {
    MatchState::Pending
  }
}

/// A winner may be picked (or re-picked) once both slots are filled and
/// at least one of them is a real entrant.
pub fn is_selectable(m: &Match) -> bool {
  let [a, b] = &m.slots;
  !a.is_tbd() && !b.is_tbd() && !(a.is_bye() && b.is_bye())
}

fn check_slot_index(slot_index: usize) -> Result<(), String> {
  if slot_index > 1 {
    return Err(format!("Slot index {slot_index} is out of range (expected 0 or 1)."));
  }
  Ok(())
}

/// Copies the advancing slot into its fixed position in the next match.
/// The target is resolved before anything is written.
fn advance_slot(bracket: &mut Bracket, match_id: u32, winner: &Slot) -> Result<(), String> {
  let Some((next_id, slot_index)) = bracket.feed_target(match_id)? else {
    return Ok(());
  };
  let target = &mut bracket.get_mut(next_id)?.slots[slot_index];
  target.name = winner.name.clone();
  target.id = winner.id.clone();
  target.seed = winner.seed;
  debug!(match_id, next_id, slot_index, name = %winner.name, "advanced slot");
  Ok(())
}

/// Decides every round-1 match that pairs a real entrant with a `BYE`.
/// Returns how many matches were resolved.
pub fn resolve_byes(bracket: &mut Bracket) -> Result<usize, String> {
  let candidates: Vec<(u32, usize)> = bracket
    .round_matches(1)
    .into_iter()
    .filter_map(|m| match (m.slots[0].is_bye(), m.slots[1].is_bye()) {
      (true, false) => Some((m.id, 1)),
      (false, true) => Some((m.id, 0)),
      _ => None,
    })
    .collect();

  for (match_id, winner_index) in &candidates {
    let winner = bracket.get(*match_id)?.slots[*winner_index].clone();
    advance_slot(bracket, *match_id, &winner)?;
    bracket.get_mut(*match_id)?.slots[*winner_index].is_winner = true;
  }
  Ok(candidates.len())
}

pub fn select_winner(
  bracket: &mut Bracket,
  match_id: u32,
  slot_index: usize,
) -> Result<SelectOutcome, String> {
  check_slot_index(slot_index)?;
  let current = bracket
    .find(match_id)
    .ok_or_else(|| format!("Unknown match {match_id}."))?;
  if !is_selectable(current) {
    return Ok(SelectOutcome::Rejected);
  }
  if current.winner_index() == Some(slot_index) {
    return Ok(SelectOutcome::Unchanged);
  }
  let winner = current.slots[slot_index].clone();

  advance_slot(bracket, match_id, &winner)?;
  let m = bracket.get_mut(match_id)?;
  m.slots[slot_index].is_winner = true;
  m.slots[1 - slot_index].is_winner = false;
  Ok(SelectOutcome::Applied)
}

/// Renames a slot to the trimmed `new_name`. A current winner also gets
/// the new name one hop forward; ids and decisions stay as they are.
pub fn edit_name(
  bracket: &mut Bracket,
  match_id: u32,
  slot_index: usize,
  new_name: &str,
) -> Result<bool, String> {
  check_slot_index(slot_index)?;
  let new_name = new_name.trim();
  if new_name.is_empty() {
    return Err("Name must not be empty.".to_string());
  }
  let current = bracket
    .find(match_id)
    .ok_or_else(|| format!("Unknown match {match_id}."))?;
  let slot = &current.slots[slot_index];
  let forward = if slot.is_winner {
    bracket.feed_target(match_id)?
  } else {
    None
  };
  if slot.name == new_name {
    return Ok(false);
  }

  bracket.get_mut(match_id)?.slots[slot_index].name = new_name.to_string();
  if let Some((next_id, next_slot)) = forward {
    bracket.get_mut(next_id)?.slots[next_slot].name = new_name.to_string();
  }
  Ok(true)
}
