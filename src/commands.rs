use crate::advancement::SelectOutcome;
use crate::controller::{BracketController, BracketSnapshot};
use crate::interaction::InteractionEvent;
use crate::seeding::parse_participants;
use crate::types::*;
use serde::{Deserialize, Serialize};
use tracing::error;

// ── Payloads ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub names: Option<Vec<String>>,
    /// Raw textarea contents, one name per line.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectWinnerRequest {
    pub match_id: u32,
    pub slot_index: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditNameRequest {
    pub match_id: u32,
    pub slot_index: usize,
    pub new_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModeRequest {
    pub mode: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectWinnerResponse {
    pub outcome: &'static str,
    #[serde(flatten)]
    pub snapshot: BracketSnapshot,
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Lock the controller and run `f` against it; the lock spans the whole
/// mutation and the snapshot that follows.
fn with_controller<F, R>(state: &SharedBracketState, f: F) -> Result<R, String>
where
    F: FnOnce(&mut BracketController) -> Result<R, String>,
{
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    f(&mut guard).map_err(|e| {
        if is_invariant_error(&e) {
            error!("{e}");
        }
        e
    })
}

pub fn is_invariant_error(message: &str) -> bool {
    message.starts_with("bracket invariant violated")
}

// ── Commands ────────────────────────────────────────────────────────────

pub fn bracket_state(state: &SharedBracketState) -> Result<BracketSnapshot, String> {
    with_controller(state, |ctl| ctl.snapshot())
}

pub fn bracket_generate(request: GenerateRequest, state: &SharedBracketState) -> Result<BracketSnapshot, String> {
    let names = match (request.names, request.text) {
        (Some(names), _) => names,
        (None, Some(text)) => parse_participants(&text),
        (None, None) => return Err("Provide either \"names\" or \"text\".".to_string()),
    };
    with_controller(state, |ctl| {
        ctl.generate_bracket(&names)?;
        ctl.snapshot()
    })
}

pub fn bracket_select_winner(
    request: SelectWinnerRequest,
    state: &SharedBracketState,
) -> Result<SelectWinnerResponse, String> {
    with_controller(state, |ctl| {
        let outcome = ctl.select_winner(request.match_id, request.slot_index)?;
        Ok(SelectWinnerResponse {
            outcome: match outcome {
                SelectOutcome::Applied => "applied",
                SelectOutcome::Unchanged => "unchanged",
                SelectOutcome::Rejected => "rejected",
            },
            snapshot: ctl.snapshot()?,
        })
    })
}

pub fn bracket_edit_name(request: EditNameRequest, state: &SharedBracketState) -> Result<BracketSnapshot, String> {
    with_controller(state, |ctl| {
        ctl.edit_name(request.match_id, request.slot_index, &request.new_name)?;
        ctl.snapshot()
    })
}

pub fn bracket_reset(state: &SharedBracketState) -> Result<BracketSnapshot, String> {
    with_controller(state, |ctl| {
        ctl.reset_bracket();
        ctl.snapshot()
    })
}

pub fn bracket_set_view_mode(request: ViewModeRequest, state: &SharedBracketState) -> Result<BracketSnapshot, String> {
    let mode = ViewMode::parse(&request.mode)?;
    with_controller(state, |ctl| {
        ctl.set_view_mode(mode);
        ctl.snapshot()
    })
}

pub fn bracket_interact(event: InteractionEvent, state: &SharedBracketState) -> Result<BracketSnapshot, String> {
    with_controller(state, |ctl| {
        ctl.handle_interaction(event)?;
        ctl.snapshot()
    })
}

pub fn bracket_svg(state: &SharedBracketState) -> Result<Option<String>, String> {
    with_controller(state, |ctl| ctl.render_svg())
}
