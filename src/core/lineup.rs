use crate::domain::model::{NodeKind, RawEventNode, Side};
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// A bench row only counts once it carries a minute, i.e. the player came on.
static RE_ENTERED_PLAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\d+").expect("entered-play pattern"));

struct SideSelectors {
    section: Selector,
    starters: Selector,
    substitutes: Selector,
}

impl SideSelectors {
    fn for_side(side: Side) -> Result<Self> {
        let class = side.css_class();
        Ok(Self {
            section: parse_selector(&format!(".lineup .{class}"))?,
            starters: parse_selector(&format!(
                ".lineup .{class} .firstTeam .replaced, .lineup .{class} .firstTeam .sendingOff"
            ))?,
            substitutes: parse_selector(&format!(".lineup .{class} .reserve tr"))?,
        })
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| EtlError::SelectorError {
        message: format!("{}: {}", css, e),
    })
}

fn node_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn raw_node(kind: NodeKind, element: ElementRef<'_>, link: &Selector) -> RawEventNode {
    let href = element
        .select(link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);

    RawEventNode {
        kind,
        text: node_text(&element),
        href,
    }
}

/// Picks the substitution and sending-off entries for one side of a match page.
pub struct LineupExtractor {
    team_a: SideSelectors,
    team_b: SideSelectors,
    link: Selector,
}

impl LineupExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            team_a: SideSelectors::for_side(Side::TeamA)?,
            team_b: SideSelectors::for_side(Side::TeamB)?,
            link: parse_selector("a[href]")?,
        })
    }

    fn selectors(&self, side: Side) -> &SideSelectors {
        match side {
            Side::TeamA => &self.team_a,
            Side::TeamB => &self.team_b,
        }
    }

    /// Starters who went off (substituted or sent off) followed by substitutes
    /// who came on. A page without a lineup for `side` yields nothing.
    pub fn extract(&self, page: &Html, side: Side) -> Vec<RawEventNode> {
        let selectors = self.selectors(side);

        if page.select(&selectors.section).next().is_none() {
            tracing::debug!(side = side.css_class(), "no lineup section on page");
            return Vec::new();
        }

        let starters = page
            .select(&selectors.starters)
            .map(|element| raw_node(NodeKind::Starter, element, &self.link));

        let substitutes = page
            .select(&selectors.substitutes)
            .map(|element| raw_node(NodeKind::Substitute, element, &self.link))
            .filter(|node| RE_ENTERED_PLAY.is_match(&node.text));

        starters.chain(substitutes).collect()
    }

    pub fn extract_from_str(&self, html: &str, side: Side) -> Vec<RawEventNode> {
        let page = Html::parse_document(html);
        self.extract(&page, side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<div class="lineup">
  <div class="teamA">
    <table class="firstTeam"><tbody>
      <tr><td><a href="/players/player.sd?player_id=101">A. Keeper</a></td></tr>
      <tr class="replaced"><td><a href="/players/player.sd?player_id=102">J. Smith</a> (73)</td></tr>
      <tr class="sendingOff"><td><a href="/players/player.sd?player_id=103">K. Brown</a> (s/o 81)</td></tr>
    </tbody></table>
    <table class="reserve"><tbody>
      <tr><td><a href="/players/player.sd?player_id=201">T. Jones</a> (73)</td></tr>
      <tr><td><a href="/players/player.sd?player_id=202">U. Unused</a></td></tr>
      <tr class="replaced"><td><a href="/players/player.sd?player_id=203">V. Twice</a>
        (60-88)</td></tr>
    </tbody></table>
  </div>
  <div class="teamB">
    <table class="firstTeam"><tbody>
      <tr class="replaced"><td><a href="/players/player.sd?player_id=301">B. Away</a> (55)</td></tr>
    </tbody></table>
    <table class="reserve"><tbody>
      <tr><td><a href="/players/player.sd?player_id=401">C. Bench</a> (55)</td></tr>
    </tbody></table>
  </div>
</div>
</body></html>
"#;

    #[test]
    fn test_extract_home_side() {
        let extractor = LineupExtractor::new().unwrap();
        let nodes = extractor.extract_from_str(PAGE, Side::TeamA);

        let starters: Vec<_> = nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Starter)
            .map(|n| n.text.as_str())
            .collect();
        let subs: Vec<_> = nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Substitute)
            .map(|n| n.text.as_str())
            .collect();

        assert_eq!(starters, vec!["J. Smith (73)", "K. Brown (s/o 81)"]);
        assert_eq!(subs, vec!["T. Jones (73)", "V. Twice (60-88)"]);
        assert_eq!(
            nodes[0].href.as_deref(),
            Some("/players/player.sd?player_id=102")
        );
    }

    #[test]
    fn test_extract_away_side_is_scoped() {
        let extractor = LineupExtractor::new().unwrap();
        let nodes = extractor.extract_from_str(PAGE, Side::TeamB);

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].text, "B. Away (55)");
        assert_eq!(nodes[0].kind, NodeKind::Starter);
        assert_eq!(nodes[1].text, "C. Bench (55)");
        assert_eq!(nodes[1].kind, NodeKind::Substitute);
    }

    #[test]
    fn test_unused_substitutes_are_excluded() {
        let extractor = LineupExtractor::new().unwrap();
        let nodes = extractor.extract_from_str(PAGE, Side::TeamA);
        assert!(nodes.iter().all(|n| !n.text.contains("U. Unused")));
    }

    #[test]
    fn test_missing_lineup_section_yields_nothing() {
        let extractor = LineupExtractor::new().unwrap();
        let html = r#"<html><body><div class="lineup"><div class="teamA"></div></div></body></html>"#;
        assert!(extractor.extract_from_str(html, Side::TeamB).is_empty());
        assert!(extractor
            .extract_from_str("<html><body><p>Match postponed</p></body></html>", Side::TeamA)
            .is_empty());
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let extractor = LineupExtractor::new().unwrap();
        let page = Html::parse_document(PAGE);
        let first = extractor.extract(&page, Side::TeamA);
        let second = extractor.extract(&page, Side::TeamA);
        assert_eq!(first, second);
    }

    #[test]
    fn test_starter_with_both_classes_is_selected_once() {
        let extractor = LineupExtractor::new().unwrap();
        let html = r#"
<div class="lineup"><div class="teamA"><table class="firstTeam">
  <tr class="replaced sendingOff"><td><a href="/players/player.sd?player_id=5">D. Both</a> (s/o 40)</td></tr>
</table></div></div>"#;
        let nodes = extractor.extract_from_str(html, Side::TeamA);
        assert_eq!(nodes.len(), 1);
    }
}
