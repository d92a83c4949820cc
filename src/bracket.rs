use serde::Serialize;
use std::collections::HashMap;

use crate::seeding::SeedPlan;
use crate::types::{BYE, TBD};

pub const MATCH_STATE_SCHEDULED: &str = "SCHEDULED";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
  pub id: String,
  pub name: String,
  pub seed: Option<u32>,
  pub is_winner: bool,
  pub result_text: Option<String>,
  pub status: Option<String>,
}

impl Slot {
  fn entrant(id: String, name: String, seed: u32) -> Self {
    Slot {
      id,
      name,
      seed: Some(seed),
      is_winner: false,
      result_text: None,
      status: None,
    }
  }

  fn placeholder(match_id: u32, index: usize) -> Self {
    Slot {
      id: format!("tbd{match_id}-{}", index + 1),
      name: TBD.to_string(),
      seed: None,
      is_winner: false,
      result_text: None,
      status: None,
    }
  }

  pub fn is_tbd(&self) -> bool {
    self.name == TBD
  }

  pub fn is_bye(&self) -> bool {
    self.name == BYE
  }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
  pub id: u32,
  pub round: u32,
  pub next_match_id: Option<u32>,
  pub slots: [Slot; 2],
  pub start_time: String,
  pub state: String,
}

impl Match {
  pub fn winner_index(&self) -> Option<usize> {
    match (self.slots[0].is_winner, self.slots[1].is_winner) {
      (true, false) => Some(0),
      (false, true) => Some(1),
      _ => None,
    }
  }

  pub fn is_decided(&self) -> bool {
    self.winner_index().is_some()
  }

  pub fn is_final(&self) -> bool {
    self.next_match_id.is_none()
  }
}

/// The whole match graph. Matches are stored in id order; only slot
/// contents change after construction.
#[derive(Clone, Debug)]
pub struct Bracket {
  matches: Vec<Match>,
  index: HashMap<u32, usize>,
  participant_count: usize,
  bracket_size: usize,
  rounds: usize,
}

impl Bracket {
  pub fn matches(&self) -> &[Match] {
    &self.matches
  }

  pub fn participant_count(&self) -> usize {
    self.participant_count
  }

  pub fn bracket_size(&self) -> usize {
    self.bracket_size
  }

  pub fn rounds(&self) -> usize {
    self.rounds
  }

  pub fn find(&self, match_id: u32) -> Option<&Match> {
    self.index.get(&match_id).map(|idx| &self.matches[*idx])
  }

  /// Lookup for ids that come from the graph itself; a miss means the
  /// structure is broken.
  pub fn get(&self, match_id: u32) -> Result<&Match, String> {
    self
      .find(match_id)
      .ok_or_else(|| format!("bracket invariant violated: match {match_id} does not exist"))
  }

  pub(crate) fn get_mut(&mut self, match_id: u32) -> Result<&mut Match, String> {
    let idx = *self
      .index
      .get(&match_id)
      .ok_or_else(|| format!("bracket invariant violated: match {match_id} does not exist"))?;
    Ok(&mut self.matches[idx])
  }

  pub fn round_matches(&self, round: usize) -> Vec<&Match> {
    self.matches.iter().filter(|m| m.round as usize == round).collect()
  }

  pub fn final_match(&self) -> Result<&Match, String> {
    let mut finals = self.matches.iter().filter(|m| m.is_final());
    match (finals.next(), finals.next()) {
      (Some(m), None) => Ok(m),
      _ => Err("bracket invariant violated: expected exactly one final match".to_string()),
    }
  }

  /// Matches feeding `next_id`, in creation order.
  pub fn feeders(&self, next_id: u32) -> Vec<&Match> {
    self
      .matches
      .iter()
      .filter(|m| m.next_match_id == Some(next_id))
      .collect()
  }

  /// Where the winner of `match_id` lands: `(next match id, slot index)`.
  /// The first-created feeder fills slot 0, the second slot 1.
  pub fn feed_target(&self, match_id: u32) -> Result<Option<(u32, usize)>, String> {
    let current = self.get(match_id)?;
    let Some(next_id) = current.next_match_id else {
      return Ok(None);
    };
    self.get(next_id)?;
    let feeders = self.feeders(next_id);
    if feeders.len() != 2 {
      return Err(format!(
        "bracket invariant violated: match {next_id} has {} feeders",
        feeders.len()
      ));
    }
    let slot_index = feeders
      .iter()
      .position(|m| m.id == match_id)
      .ok_or_else(|| format!("bracket invariant violated: match {match_id} missing from feeders of {next_id}"))?;
    Ok(Some((next_id, slot_index)))
  }

  /// Full structural check of the graph.
  pub fn validate(&self) -> Result<(), String> {
    if self.matches.len() + 1 != self.bracket_size {
      return Err(format!(
        "bracket invariant violated: {} matches for bracket size {}",
        self.matches.len(),
        self.bracket_size
      ));
    }
    let final_id = self.final_match()?.id;
    if self.find(final_id).map(|m| m.round as usize) != Some(self.rounds) {
      return Err("bracket invariant violated: final is not in the last round".to_string());
    }
    let mut previous_id = 0;
    for m in &self.matches {
      if m.id <= previous_id {
        return Err(format!("bracket invariant violated: match ids not increasing at {}", m.id));
      }
      previous_id = m.id;
      if m.slots[0].is_winner && m.slots[1].is_winner {
        return Err(format!("bracket invariant violated: match {} has two winners", m.id));
      }
      if let Some(next_id) = m.next_match_id {
        let next = self.get(next_id)?;
        if next.round != m.round + 1 {
          return Err(format!(
            "bracket invariant violated: match {} (round {}) links to round {}",
            m.id, m.round, next.round
          ));
        }
        self.feed_target(m.id)?;
      }
    }
    Ok(())
  }
}

/// Builds the match graph: round 1 from consecutive seeded pairs, later
/// rounds as `TBD` placeholders linked pairwise into the next round block.
pub fn build_bracket(plan: &SeedPlan, start_time: &str) -> Result<Bracket, String> {
  let size = plan.bracket_size;
  if !size.is_power_of_two() || size < 2 || plan.slots.len() != size {
    return Err(format!(
      "Cannot build a bracket from {} seeded slots for size {size}.",
      plan.slots.len()
    ));
  }

  let mut matches = Vec::with_capacity(size - 1);
  let mut index = HashMap::new();
  let mut next_id = 1u32;

  for round in 1..=plan.rounds {
    let count = size >> round;
    let block_start = next_id;
    let is_final_round = round == plan.rounds;
    for i in 0..count {
      let id = next_id;
      next_id += 1;
      let next_match_id = if is_final_round {
        None
      } else {
        Some(block_start + count as u32 + (i / 2) as u32)
      };
      let slots = if round == 1 {
        let a = &plan.slots[i * 2];
        let b = &plan.slots[i * 2 + 1];
        [
          Slot::entrant(format!("p{}", i * 2 + 1), a.name.clone(), a.seed),
          Slot::entrant(format!("p{}", i * 2 + 2), b.name.clone(), b.seed),
        ]
      } else {
        [Slot::placeholder(id, 0), Slot::placeholder(id, 1)]
      };
      push_match(&mut matches, &mut index, id, round as u32, next_match_id, slots, start_time);
    }
  }

  let bracket = Bracket {
    matches,
    index,
    participant_count: plan.participant_count,
    bracket_size: size,
    rounds: plan.rounds,
  };
  bracket.validate()?;
  Ok(bracket)
}

fn push_match(
  matches: &mut Vec<Match>,
  index: &mut HashMap<u32, usize>,
  id: u32,
  round: u32,
  next_match_id: Option<u32>,
  slots: [Slot; 2],
  start_time: &str,
) {
  matches.push(Match {
    id,
    round,
    next_match_id,
    slots,
    start_time: start_time.to_string(),
    state: MATCH_STATE_SCHEDULED.to_string(),
  });
  index.insert(id, matches.len() - 1);
}
