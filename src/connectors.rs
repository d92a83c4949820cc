use serde::Serialize;

use crate::bracket::Bracket;
use crate::layout::{BracketLayout, MatchBox, Point, Side};
use crate::types::{BracketConfig, ViewMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentKind {
    /// From a match's trailing edge to the midpoint between rounds.
    Stub,
    /// Vertical join of a sibling pair.
    Spine,
    /// From the spine's midpoint into the next match.
    Feed,
    /// Straight line from a semifinal into the centered final.
    FinalFeed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub match_id: u32,
    pub kind: SegmentKind,
    pub from: Point,
    pub to: Point,
}

struct Edges {
    trailing: f32,
    leading: f32,
    direction: f32,
}

/// Horizontal edges for a winner flowing from `from` into `to`, in
/// whichever direction the layout placed them.
fn edges(from: &MatchBox, to: &MatchBox) -> Edges {
    if to.rect.x >= from.rect.x {
        Edges {
            trailing: from.rect.right(),
            leading: to.rect.x,
            direction: 1.0,
        }
    } else {
        Edges {
            trailing: from.rect.x,
            leading: to.rect.right(),
            direction: -1.0,
        }
    }
}

/// Routes a line set for every non-final match in `layout`.
pub fn route_connectors(bracket: &Bracket, layout: &BracketLayout, config: &BracketConfig) -> Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let missing = |id: u32| format!("bracket invariant violated: match {id} missing from layout");

    for m in bracket.matches() {
        let Some((next_id, slot_index)) = bracket.feed_target(m.id)? else {
            continue;
        };
        let own = layout.match_box(m.id).ok_or_else(|| missing(m.id))?;
        let next = layout.match_box(next_id).ok_or_else(|| missing(next_id))?;
        let Edges { trailing, leading, direction } = edges(own, next);
        let y = own.rect.center_y();

        if layout.view_mode == ViewMode::Mirrored && next.side == Side::Center {
            segments.push(Segment {
                match_id: m.id,
                kind: SegmentKind::FinalFeed,
                from: Point { x: trailing, y },
                to: Point { x: leading, y },
            });
            continue;
        }

        let mid_x = trailing + direction * config.round_gap / 2.0;
        segments.push(Segment {
            match_id: m.id,
            kind: SegmentKind::Stub,
            from: Point { x: trailing, y },
            to: Point { x: mid_x, y },
        });

        // The pair's shared lines belong to the sibling feeding slot 0.
        if slot_index != 0 {
            continue;
        }
        let sibling_id = bracket
            .feeders(next_id)
            .get(1)
            .map(|s| s.id)
            .ok_or_else(|| format!("bracket invariant violated: match {next_id} lacks a second feeder"))?;
        let sibling = layout.match_box(sibling_id).ok_or_else(|| missing(sibling_id))?;
        let sibling_y = sibling.rect.center_y();
        segments.push(Segment {
            match_id: m.id,
            kind: SegmentKind::Spine,
            from: Point { x: mid_x, y },
            to: Point { x: mid_x, y: sibling_y },
        });
        segments.push(Segment {
            match_id: m.id,
            kind: SegmentKind::Feed,
            from: Point { x: mid_x, y: (y + sibling_y) / 2.0 },
            to: Point { x: leading, y: next.rect.center_y() },
        });
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::build_bracket;
    use crate::layout::{mirrored_layout, standard_layout};
    use crate::seeding::seed_participants;

    fn build(n: usize) -> Bracket {
        let names: Vec<String> = (1..=n).map(|i| format!("Player {i}")).collect();
        let plan = seed_participants(&names).unwrap();
        build_bracket(&plan, "2026-01-01T00:00:00Z").unwrap()
    }

    fn count(segments: &[Segment], kind: SegmentKind) -> usize {
        segments.iter().filter(|s| s.kind == kind).count()
    }

    #[test]
    fn standard_routes_for_eight() {
        let config = BracketConfig::default();
        let bracket = build(8);
        let layout = standard_layout(&bracket, &config);
        let segments = route_connectors(&bracket, &layout, &config).unwrap();

        assert_eq!(count(&segments, SegmentKind::Stub), 6);
        assert_eq!(count(&segments, SegmentKind::Spine), 3);
        assert_eq!(count(&segments, SegmentKind::Feed), 3);
        assert_eq!(count(&segments, SegmentKind::FinalFeed), 0);

        let stub = segments
            .iter()
            .find(|s| s.match_id == 1 && s.kind == SegmentKind::Stub)
            .unwrap();
        assert_eq!(stub.from, Point { x: 200.0, y: 120.0 });
        assert_eq!(stub.to, Point { x: 240.0, y: 120.0 });

        let spine = segments
            .iter()
            .find(|s| s.match_id == 1 && s.kind == SegmentKind::Spine)
            .unwrap();
        assert_eq!(spine.from.y, 120.0);
        assert_eq!(spine.to.y, 200.0);

        let feed = segments
            .iter()
            .find(|s| s.match_id == 1 && s.kind == SegmentKind::Feed)
            .unwrap();
        let next = layout.match_box(5).unwrap();
        assert_eq!(feed.from, Point { x: 240.0, y: 160.0 });
        assert_eq!(feed.to, Point { x: next.rect.x, y: next.rect.center_y() });
        // Spine midpoint lands level with the next match's center.
        assert_eq!(feed.from.y, feed.to.y);

        assert!(segments.iter().all(|s| s.match_id != 2 || s.kind == SegmentKind::Stub));
    }

    #[test]
    fn lone_final_has_no_connectors() {
        let config = BracketConfig::default();
        let bracket = build(2);
        let layout = standard_layout(&bracket, &config);
        assert!(route_connectors(&bracket, &layout, &config).unwrap().is_empty());
    }

    #[test]
    fn mirrored_right_half_runs_leftward() {
        let config = BracketConfig::default();
        let bracket = build(8);
        let layout = mirrored_layout(&bracket, &config);
        let segments = route_connectors(&bracket, &layout, &config).unwrap();

        let right_stub = segments
            .iter()
            .find(|s| s.match_id == 3 && s.kind == SegmentKind::Stub)
            .unwrap();
        let own = layout.match_box(3).unwrap();
        assert_eq!(right_stub.from.x, own.rect.x);
        assert_eq!(right_stub.to.x, own.rect.x - config.round_gap / 2.0);

        let feed = segments
            .iter()
            .find(|s| s.match_id == 3 && s.kind == SegmentKind::Feed)
            .unwrap();
        assert_eq!(feed.to.x, layout.match_box(6).unwrap().rect.right());
    }

    #[test]
    fn mirrored_semifinals_feed_final_directly() {
        let config = BracketConfig::default();
        let bracket = build(8);
        let layout = mirrored_layout(&bracket, &config);
        let segments = route_connectors(&bracket, &layout, &config).unwrap();
        let final_box = layout.match_box(7).unwrap();

        let finals: Vec<&Segment> = segments.iter().filter(|s| s.kind == SegmentKind::FinalFeed).collect();
        assert_eq!(finals.len(), 2);
        assert!(segments.iter().all(|s| !(s.match_id == 5 || s.match_id == 6) || s.kind == SegmentKind::FinalFeed));

        let left = finals.iter().find(|s| s.match_id == 5).unwrap();
        assert_eq!(left.from, Point { x: final_box.rect.x - config.round_gap, y: final_box.rect.center_y() });
        assert_eq!(left.to, Point { x: final_box.rect.x, y: final_box.rect.center_y() });

        let right = finals.iter().find(|s| s.match_id == 6).unwrap();
        assert_eq!(right.from.x, final_box.rect.right() + config.round_gap);
        assert_eq!(right.to.x, final_box.rect.right());
        assert_eq!(right.from.y, right.to.y);
    }

    #[test]
    fn mirrored_four_player_bracket_only_has_final_feeds() {
        let config = BracketConfig::default();
        let bracket = build(4);
        let layout = mirrored_layout(&bracket, &config);
        let segments = route_connectors(&bracket, &layout, &config).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(count(&segments, SegmentKind::FinalFeed), 2);
    }

    #[test]
    fn mirrored_pairs_never_cross_halves() {
        let config = BracketConfig::default();
        for n in [16, 32, 64] {
            let bracket = build(n);
            let layout = mirrored_layout(&bracket, &config);
            for m in bracket.matches() {
                let Some(next_id) = m.next_match_id else { continue };
                let own = layout.match_box(m.id).unwrap();
                let next = layout.match_box(next_id).unwrap();
                assert!(next.side == Side::Center || next.side == own.side, "n={n} match={}", m.id);
            }
            let segments = route_connectors(&bracket, &layout, &config).unwrap();
            assert_eq!(count(&segments, SegmentKind::FinalFeed), 2);
            assert_eq!(count(&segments, SegmentKind::Stub), bracket.matches().len() - 3);
        }
    }
}
