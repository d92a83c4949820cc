use std::collections::HashSet;

use crate::types::{BYE, MIN_PARTICIPANTS};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededSlot {
  pub seed: u32,
  pub name: String,
}

/// Everything the builder needs: sizes plus the seeded slot list whose
/// consecutive pairs are the round-1 matchups.
#[derive(Clone, Debug)]
pub struct SeedPlan {
  pub participant_count: usize,
  pub bracket_size: usize,
  pub rounds: usize,
  pub slots: Vec<SeededSlot>,
}

impl SeedPlan {
  pub fn bye_count(&self) -> usize {
    self.bracket_size - self.participant_count
  }
}

pub fn parse_participants(text: &str) -> Vec<String> {
  text
    .lines()
    .map(|line| line.trim())
    .filter(|line| !line.is_empty())
    .map(|line| line.to_string())
    .collect()
}

/// Trims names, drops empties and requires at least two distinct entries.
pub fn normalize_names(raw: &[String]) -> Result<Vec<String>, String> {
  let names: Vec<String> = raw
    .iter()
    .map(|name| name.trim())
    .filter(|name| !name.is_empty())
    .map(|name| name.to_string())
    .collect();
  let distinct = names.iter().collect::<HashSet<_>>().len();
  if distinct < MIN_PARTICIPANTS {
    return Err(format!(
      "Please enter at least {MIN_PARTICIPANTS} participants (got {distinct} distinct name{}).",
      if distinct == 1 { "" } else { "s" }
    ));
  }
  Ok(names)
}

pub fn bracket_size(count: usize) -> usize {
  count.max(MIN_PARTICIPANTS).next_power_of_two()
}

pub fn round_count(bracket_size: usize) -> usize {
  bracket_size.max(1).trailing_zeros() as usize
}

/// Canonical seed order for a power-of-two bracket: each seed `s` of the
/// half-size order is followed by `size + 1 - s`.
pub fn seed_positions(size: usize) -> Vec<u32> {
  if size <= 1 {
    return vec![1];
  }
  let half = seed_positions(size / 2);
  let mut out = Vec::with_capacity(size);
  for seed in half {
    out.push(seed);
    out.push(size as u32 + 1 - seed);
  }
  out
}

pub fn seed_participants(raw: &[String]) -> Result<SeedPlan, String> {
  let names = normalize_names(raw)?;
  let size = bracket_size(names.len());
  let mut padded = names.clone();
  padded.resize(size, BYE.to_string());

  let slots = seed_positions(size)
    .into_iter()
    .map(|seed| SeededSlot {
      seed,
      name: padded[seed as usize - 1].clone(),
    })
    .collect();

  Ok(SeedPlan {
    participant_count: names.len(),
    bracket_size: size,
    rounds: round_count(size),
    slots,
  })
}
