use std::fmt::Write;

use crate::connectors::Segment;
use crate::layout::{BracketLayout, MatchBox, RoundHeader};
use crate::types::BracketConfig;

const SLOT_PADDING_X: f32 = 8.0;
const SEED_BADGE_WIDTH: f32 = 24.0;

pub fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Standalone SVG document for a computed layout.
pub fn render_svg(layout: &BracketLayout, connectors: &[Segment], config: &BracketConfig) -> Result<String, String> {
    write_svg(layout, connectors, config).map_err(|e| format!("render svg: {e}"))
}

fn write_svg(layout: &BracketLayout, connectors: &[Segment], config: &BracketConfig) -> Result<String, std::fmt::Error> {
    let colors = &config.colors;
    let mut svg = String::new();
    write!(
        svg,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\" viewBox=\"0 0 {:.0} {:.0}\" font-family=\"{}\">\n",
        layout.width,
        layout.height,
        layout.width,
        layout.height,
        escape_xml(&config.font_family),
    )?;

    svg.push_str("  <g class=\"connectors\">\n");
    for segment in connectors {
        writeln!(
            svg,
            "    <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"2\" />",
            segment.from.x,
            segment.from.y,
            segment.to.x,
            segment.to.y,
            escape_xml(&colors.connector_line),
        )?;
    }
    svg.push_str("  </g>\n");

    for header in &layout.headers {
        write_header(&mut svg, header, config)?;
    }
    for match_box in &layout.matches {
        write_match(&mut svg, match_box, config)?;
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

fn write_header(svg: &mut String, header: &RoundHeader, config: &BracketConfig) -> std::fmt::Result {
    let (bg, text) = if header.is_finals {
        (&config.colors.finals_header_bg, &config.colors.finals_header_text)
    } else {
        (&config.colors.round_header_bg, &config.colors.round_header_text)
    };
    let rect = header.rect;
    writeln!(
        svg,
        "  <g class=\"round-header\">\n    <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"6\" fill=\"{}\" />\n    <text x=\"{:.1}\" y=\"{:.1}\" fill=\"{}\" font-size=\"14\" font-weight=\"600\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>\n  </g>",
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        escape_xml(bg),
        rect.x + rect.width / 2.0,
        rect.center_y(),
        escape_xml(text),
        escape_xml(&header.label),
    )
}

fn write_match(svg: &mut String, match_box: &MatchBox, config: &BracketConfig) -> std::fmt::Result {
    let colors = &config.colors;
    let rect = match_box.rect;
    let row_height = rect.height / 2.0;
    writeln!(
        svg,
        "  <g class=\"match\" data-match-id=\"{}\">\n    <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"6\" fill=\"{}\" stroke=\"{}\" />",
        match_box.match_id,
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        escape_xml(&colors.match_bg),
        escape_xml(&colors.match_border),
    )?;

    for (index, slot) in match_box.slots.iter().enumerate() {
        let top = rect.y + row_height * index as f32;
        let baseline = top + row_height / 2.0;
        if slot.is_winner {
            writeln!(
                svg,
                "    <rect class=\"winner\" x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\" />",
                rect.x,
                top,
                rect.width,
                row_height,
                escape_xml(&colors.winner_highlight),
            )?;
        }
        let seed = slot.seed.map(|s| s.to_string()).unwrap_or_default();
        writeln!(
            svg,
            "    <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"4\" fill=\"{}\" />\n    <text x=\"{:.1}\" y=\"{:.1}\" fill=\"{}\" font-size=\"12\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>",
            rect.x + SLOT_PADDING_X,
            top + 8.0,
            SEED_BADGE_WIDTH,
            row_height - 16.0,
            escape_xml(&colors.seed_bg),
            rect.x + SLOT_PADDING_X + SEED_BADGE_WIDTH / 2.0,
            baseline,
            escape_xml(&colors.seed_text),
            seed,
        )?;
        writeln!(
            svg,
            "    <text x=\"{:.1}\" y=\"{:.1}\" fill=\"{}\" font-size=\"14\" dominant-baseline=\"middle\">{}</text>",
            rect.x + SLOT_PADDING_X * 2.0 + SEED_BADGE_WIDTH,
            baseline,
            escape_xml(&colors.participant_text),
            escape_xml(&slot.name),
        )?;
    }
    svg.push_str("  </g>\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::build_bracket;
    use crate::connectors::route_connectors;
    use crate::layout::{mirrored_layout, standard_layout};
    use crate::seeding::seed_participants;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("<A & \"B\">"), "&lt;A &amp; &quot;B&quot;&gt;");
    }

    #[test]
    fn renders_every_match_and_connector() {
        let names: Vec<String> = ["Ann", "Bo <3", "Cy", "Di", "Ed"].iter().map(|s| s.to_string()).collect();
        let bracket = build_bracket(&seed_participants(&names).unwrap(), "now").unwrap();
        let config = BracketConfig::default();
        let layout = standard_layout(&bracket, &config);
        let connectors = route_connectors(&bracket, &layout, &config).unwrap();
        let svg = render_svg(&layout, &connectors, &config).unwrap();

        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("width=\"840\""));
        assert_eq!(svg.matches("class=\"match\"").count(), 7);
        assert_eq!(svg.matches("<line ").count(), connectors.len());
        assert!(svg.contains("Bo &lt;3"));
        assert!(svg.contains("font-family=\"Inter\""));
    }

    #[test]
    fn finals_header_uses_finals_palette() {
        let names: Vec<String> = (1..=8).map(|i| format!("P{i}")).collect();
        let bracket = build_bracket(&seed_participants(&names).unwrap(), "now").unwrap();
        let mut config = BracketConfig::default();
        config.colors.finals_header_bg = "#ABCDEF".to_string();
        let layout = mirrored_layout(&bracket, &config);
        let svg = render_svg(&layout, &[], &config).unwrap();
        assert_eq!(svg.matches("#ABCDEF").count(), 1);
        assert!(svg.contains(">Finals</text>"));
    }
}
