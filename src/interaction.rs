//! Per-slot select/edit state machine, independent of any front-end.

use serde::{Deserialize, Serialize};

use crate::bracket::Bracket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRef {
    pub match_id: u32,
    pub slot_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum InteractionState {
    #[default]
    Idle,
    Selected { slot: SlotRef },
    Editing { slot: SlotRef, buffer: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InteractionEvent {
    Click { match_id: u32, slot_index: usize },
    ConfirmWinner,
    DoubleClick { match_id: u32, slot_index: usize },
    Input { text: String },
    Commit,
    Cancel,
}

/// A bracket mutation requested by the interaction layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionCommand {
    SelectWinner(SlotRef),
    EditName(SlotRef, String),
}

impl InteractionState {
    pub fn reset(&mut self) {
        *self = InteractionState::Idle;
    }

    /// Applies `event` and returns the mutation it asks for, if any.
    pub fn handle(&mut self, bracket: &Bracket, event: InteractionEvent) -> Result<Option<InteractionCommand>, String> {
        match event {
            InteractionEvent::Click { match_id, slot_index } => {
                let slot = slot_ref(bracket, match_id, slot_index)?;
                let m = bracket.get(match_id)?;
                if m.slots.iter().all(|s| s.is_tbd()) {
                    return Ok(None);
                }
                *self = InteractionState::Selected { slot };
                Ok(None)
            }
            InteractionEvent::ConfirmWinner => match self {
                InteractionState::Selected { slot } => {
                    let slot = *slot;
                    self.reset();
                    Ok(Some(InteractionCommand::SelectWinner(slot)))
                }
                _ => Ok(None),
            },
            InteractionEvent::DoubleClick { match_id, slot_index } => {
                let slot = slot_ref(bracket, match_id, slot_index)?;
                let buffer = bracket.get(match_id)?.slots[slot_index].name.clone();
                *self = InteractionState::Editing { slot, buffer };
                Ok(None)
            }
            InteractionEvent::Input { text } => {
                if let InteractionState::Editing { buffer, .. } = self {
                    *buffer = text;
                }
                Ok(None)
            }
            InteractionEvent::Commit => {
                let command = match self {
                    InteractionState::Editing { slot, buffer } => {
                        let trimmed = buffer.trim();
                        if trimmed.is_empty() {
                            None
                        } else {
                            Some(InteractionCommand::EditName(*slot, trimmed.to_string()))
                        }
                    }
                    _ => return Ok(None),
                };
                self.reset();
                Ok(command)
            }
            InteractionEvent::Cancel => {
                self.reset();
                Ok(None)
            }
        }
    }
}

fn slot_ref(bracket: &Bracket, match_id: u32, slot_index: usize) -> Result<SlotRef, String> {
    if slot_index > 1 {
        return Err(format!("Slot index {slot_index} is out of range (expected 0 or 1)."));
    }
    if bracket.find(match_id).is_none() {
        return Err(format!("Unknown match {match_id}."));
    }
    Ok(SlotRef { match_id, slot_index })
}
