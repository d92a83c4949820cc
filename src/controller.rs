use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::advancement::{self, match_state, MatchState, SelectOutcome};
use crate::bracket::{build_bracket, Bracket, Match};
use crate::connectors::{route_connectors, Segment};
use crate::interaction::{InteractionCommand, InteractionEvent, InteractionState};
use crate::layout::{compute_layout, BracketLayout};
use crate::seeding::seed_participants;
use crate::svg::render_svg;
use crate::types::{BracketConfig, ViewMode};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    #[serde(flatten)]
    pub inner: Match,
    pub decided: bool,
    pub status: MatchState,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketView {
    pub participant_count: usize,
    pub bracket_size: usize,
    pub rounds: usize,
    pub matches: Vec<MatchView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedBracket {
    #[serde(flatten)]
    pub layout: BracketLayout,
    pub connectors: Vec<Segment>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketSnapshot {
    pub revision: u64,
    pub view_mode: ViewMode,
    pub config: BracketConfig,
    pub interaction: InteractionState,
    pub bracket: Option<BracketView>,
    pub render: Option<RenderedBracket>,
}

/// Owns the one bracket and exposes the only ways to change it. Every
/// method runs to completion before the next one, so each mutation
/// (propagation included) is observed whole.
pub struct BracketController {
    config: BracketConfig,
    view_mode: ViewMode,
    bracket: Option<Bracket>,
    interaction: InteractionState,
    revision: u64,
}

impl BracketController {
    pub fn new(config: BracketConfig) -> Result<Self, String> {
        let config = config.validated()?;
        Ok(BracketController {
            view_mode: config.view_mode,
            config,
            bracket: None,
            interaction: InteractionState::Idle,
            revision: 0,
        })
    }

    pub fn config(&self) -> &BracketConfig {
        &self.config
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn bracket(&self) -> Option<&Bracket> {
        self.bracket.as_ref()
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    fn bracket_mut(&mut self) -> Result<&mut Bracket, String> {
        self.bracket
            .as_mut()
            .ok_or_else(|| "No bracket has been generated yet.".to_string())
    }

    pub fn generate_bracket(&mut self, names: &[String]) -> Result<(), String> {
        let plan = seed_participants(names)?;
        let start_time = Utc::now().to_rfc3339();
        let mut bracket = build_bracket(&plan, &start_time)?;
        let resolved = advancement::resolve_byes(&mut bracket)?;
        info!(
            participants = plan.participant_count,
            bracket_size = plan.bracket_size,
            rounds = plan.rounds,
            byes = plan.bye_count(),
            resolved,
            "bracket generated"
        );
        self.bracket = Some(bracket);
        self.interaction.reset();
        self.bump();
        Ok(())
    }

    pub fn select_winner(&mut self, match_id: u32, slot_index: usize) -> Result<SelectOutcome, String> {
        let outcome = advancement::select_winner(self.bracket_mut()?, match_id, slot_index)?;
        match outcome {
            SelectOutcome::Applied => {
                info!(match_id, slot_index, "winner selected");
                self.bump();
            }
            SelectOutcome::Unchanged => debug!(match_id, slot_index, "winner already selected"),
            SelectOutcome::Rejected => warn!(match_id, slot_index, "match not ready; selection ignored"),
        }
        Ok(outcome)
    }

    pub fn edit_name(&mut self, match_id: u32, slot_index: usize, new_name: &str) -> Result<bool, String> {
        let changed = advancement::edit_name(self.bracket_mut()?, match_id, slot_index, new_name)?;
        if changed {
            info!(match_id, slot_index, name = new_name.trim(), "participant renamed");
            self.bump();
        }
        Ok(changed)
    }

    pub fn reset_bracket(&mut self) {
        if self.bracket.take().is_some() {
            info!("bracket reset");
        }
        self.interaction.reset();
        self.bump();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode != mode {
            info!(from = self.view_mode.as_str(), to = mode.as_str(), "view mode changed");
            self.view_mode = mode;
            self.bump();
        }
    }

    /// Feeds one interaction event through the slot state machine and
    /// applies whatever mutation it produces.
    pub fn handle_interaction(&mut self, event: InteractionEvent) -> Result<(), String> {
        let bracket = self
            .bracket
            .as_ref()
            .ok_or_else(|| "No bracket has been generated yet.".to_string())?;
        let before = self.interaction.clone();
        let command = self.interaction.handle(bracket, event)?;
        if self.interaction != before {
            self.bump();
        }
        match command {
            Some(InteractionCommand::SelectWinner(slot)) => {
                self.select_winner(slot.match_id, slot.slot_index)?;
            }
            Some(InteractionCommand::EditName(slot, name)) => {
                self.edit_name(slot.match_id, slot.slot_index, &name)?;
            }
            None => {}
        }
        Ok(())
    }

    /// Pure function of the current state; safe to call at any time.
    pub fn render(&self) -> Result<Option<RenderedBracket>, String> {
        let Some(bracket) = self.bracket.as_ref() else {
            return Ok(None);
        };
        let layout = compute_layout(bracket, &self.config, self.view_mode);
        let connectors = route_connectors(bracket, &layout, &self.config)?;
        Ok(Some(RenderedBracket { layout, connectors }))
    }

    pub fn render_svg(&self) -> Result<Option<String>, String> {
        match self.render()? {
            Some(rendered) => render_svg(&rendered.layout, &rendered.connectors, &self.config).map(Some),
            None => Ok(None),
        }
    }

    pub fn snapshot(&self) -> Result<BracketSnapshot, String> {
        let bracket = self.bracket.as_ref().map(|bracket| BracketView {
            participant_count: bracket.participant_count(),
            bracket_size: bracket.bracket_size(),
            rounds: bracket.rounds(),
            matches: bracket
                .matches()
                .iter()
                .map(|m| MatchView {
                    inner: m.clone(),
                    decided: m.is_decided(),
                    status: match_state(m),
                })
                .collect(),
        });
        Ok(BracketSnapshot {
            revision: self.revision,
            view_mode: self.view_mode,
            config: self.config.clone(),
            interaction: self.interaction.clone(),
            bracket,
            render: self.render()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BYE, TBD};

    fn players(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Player {i}")).collect()
    }

    fn controller() -> BracketController {
        BracketController::new(BracketConfig::default()).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let config = BracketConfig {
            font_family: String::new(),
            ..BracketConfig::default()
        };
        assert!(BracketController::new(config).is_err());
    }

    #[test]
    fn generate_validates_names() {
        let mut ctl = controller();
        assert!(ctl.generate_bracket(&["Only".to_string()]).is_err());
        assert!(ctl.bracket().is_none());
        assert_eq!(ctl.revision(), 0);
    }

    #[test]
    fn generate_resolves_byes_before_any_interaction() {
        let mut ctl = controller();
        ctl.generate_bracket(&players(6)).unwrap();
        let bracket = ctl.bracket().unwrap();
        assert_eq!(bracket.bracket_size(), 8);
        assert_eq!(bracket.matches().len(), 7);
        let byes = bracket
            .round_matches(1)
            .iter()
            .flat_map(|m| m.slots.iter())
            .filter(|s| s.name == BYE)
            .count();
        assert_eq!(byes, 2);
        let round_two: Vec<(String, String)> = bracket
            .round_matches(2)
            .iter()
            .map(|m| (m.slots[0].name.clone(), m.slots[1].name.clone()))
            .collect();
        assert_eq!(
            round_two,
            vec![
                ("Player 1".to_string(), TBD.to_string()),
                ("Player 2".to_string(), TBD.to_string()),
            ]
        );
    }

    #[test]
    fn operations_before_generation_fail() {
        let mut ctl = controller();
        assert!(ctl.select_winner(1, 0).is_err());
        assert!(ctl.edit_name(1, 0, "X").is_err());
        assert!(ctl.render().unwrap().is_none());
        assert!(ctl.render_svg().unwrap().is_none());
    }

    #[test]
    fn rejected_selection_keeps_revision() {
        let mut ctl = controller();
        ctl.generate_bracket(&players(8)).unwrap();
        let revision = ctl.revision();
        assert_eq!(ctl.select_winner(7, 0).unwrap(), SelectOutcome::Rejected);
        assert_eq!(ctl.revision(), revision);
        assert_eq!(ctl.select_winner(1, 0).unwrap(), SelectOutcome::Applied);
        assert_eq!(ctl.revision(), revision + 1);
        assert_eq!(ctl.select_winner(1, 0).unwrap(), SelectOutcome::Unchanged);
        assert_eq!(ctl.revision(), revision + 1);
    }

    #[test]
    fn view_mode_switch_changes_render() {
        let mut ctl = controller();
        ctl.generate_bracket(&players(8)).unwrap();
        let standard = ctl.render().unwrap().unwrap();
        assert_eq!(standard.layout.view_mode, ViewMode::Standard);
        ctl.set_view_mode(ViewMode::Mirrored);
        let mirrored = ctl.render().unwrap().unwrap();
        assert_eq!(mirrored.layout.view_mode, ViewMode::Mirrored);
        assert!(mirrored.layout.width > standard.layout.width);
    }

    #[test]
    fn reset_clears_bracket_and_interaction() {
        let mut ctl = controller();
        ctl.generate_bracket(&players(4)).unwrap();
        ctl.handle_interaction(InteractionEvent::Click { match_id: 1, slot_index: 0 })
            .unwrap();
        assert_ne!(ctl.interaction(), &InteractionState::Idle);
        ctl.reset_bracket();
        assert!(ctl.bracket().is_none());
        assert_eq!(ctl.interaction(), &InteractionState::Idle);
        assert!(ctl.snapshot().unwrap().bracket.is_none());
    }

    #[test]
    fn interaction_drives_selection_and_rename() {
        let mut ctl = controller();
        ctl.generate_bracket(&players(4)).unwrap();
        ctl.handle_interaction(InteractionEvent::Click { match_id: 2, slot_index: 1 })
            .unwrap();
        ctl.handle_interaction(InteractionEvent::ConfirmWinner).unwrap();
        let bracket = ctl.bracket().unwrap();
        assert_eq!(bracket.get(2).unwrap().winner_index(), Some(1));
        assert_eq!(bracket.get(3).unwrap().slots[1].name, "Player 3");

        ctl.handle_interaction(InteractionEvent::DoubleClick { match_id: 2, slot_index: 1 })
            .unwrap();
        ctl.handle_interaction(InteractionEvent::Input { text: "Third".to_string() })
            .unwrap();
        ctl.handle_interaction(InteractionEvent::Commit).unwrap();
        let bracket = ctl.bracket().unwrap();
        assert_eq!(bracket.get(2).unwrap().slots[1].name, "Third");
        assert_eq!(bracket.get(3).unwrap().slots[1].name, "Third");
    }

    #[test]
    fn snapshot_serializes_match_status() {
        let mut ctl = controller();
        ctl.generate_bracket(&players(3)).unwrap();
        let snapshot = ctl.snapshot().unwrap();
        let value = serde_json::to_value(&snapshot).unwrap();
        let matches = value["bracket"]["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0]["status"], "DECIDED");
        assert_eq!(matches[0]["decided"], true);
        assert_eq!(matches[0]["nextMatchId"], 3);
        assert_eq!(matches[1]["status"], "READY");
        assert_eq!(matches[2]["status"], "PENDING");
        assert_eq!(matches[2]["nextMatchId"], serde_json::Value::Null);
        assert_eq!(value["viewMode"], "standard");
        assert_eq!(value["interaction"]["state"], "idle");
        assert!(value["render"]["connectors"].is_array());
        assert_eq!(value["render"]["width"], 560.0);
    }
}
