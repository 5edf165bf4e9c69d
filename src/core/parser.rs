//! Minute extraction for lineup entries.
//!
//! Soccerbase encodes the same kinds of event in a handful of parenthesised
//! shapes. Each shape is a tagged pattern tried in a fixed priority order;
//! every shape yields the same record with optional fields.

use crate::domain::model::{Event, NodeKind, RawEventNode, StarterMinutes, SubstituteMinutes};
use crate::utils::error::ExtractionError;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use url::Url;

/// Query parameter carrying the player id in lineup links.
pub const PLAYER_ID_PARAM: &str = "player_id";

const LINK_BASE: &str = "https://www.soccerbase.com/";

static RE_STARTER_SENT_OFF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(s/o\s*(?P<so>\d+)\)").expect("starter sent-off pattern"));
static RE_STARTER_OFF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((?P<off>\d+)\)").expect("starter off pattern"));

static RE_SUB_ON_OFF_SENT_OFF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((?P<on>\d+)\s*-\s*(?P<off>\d+)\s*,\s*s/o\s*(?P<so>\d+)\)")
        .expect("substitute on-off-sent-off pattern")
});
static RE_SUB_ON_OFF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((?P<on>\d+)\s*-\s*(?P<off>\d+)\)").expect("substitute on-off pattern")
});
static RE_SUB_ON_SENT_OFF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((?P<on>\d+)\s*,\s*s/o\s*(?P<so>\d+)\)").expect("substitute on-sent-off pattern")
});
static RE_SUB_ON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((?P<on>\d+)\)").expect("substitute on pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StarterShape {
    SentOff,
    Off,
}

impl StarterShape {
    const PRIORITY: [StarterShape; 2] = [StarterShape::SentOff, StarterShape::Off];

    fn pattern(self) -> &'static Regex {
        match self {
            StarterShape::SentOff => &RE_STARTER_SENT_OFF,
            StarterShape::Off => &RE_STARTER_OFF,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubstituteShape {
    OnOffSentOff,
    OnOff,
    OnSentOff,
    /// Came on and was still playing at full time. The page gives no way to
    /// tell this apart from a later event that was left out of the text.
    On,
}

impl SubstituteShape {
    const PRIORITY: [SubstituteShape; 4] = [
        SubstituteShape::OnOffSentOff,
        SubstituteShape::OnOff,
        SubstituteShape::OnSentOff,
        SubstituteShape::On,
    ];

    fn pattern(self) -> &'static Regex {
        match self {
            SubstituteShape::OnOffSentOff => &RE_SUB_ON_OFF_SENT_OFF,
            SubstituteShape::OnOff => &RE_SUB_ON_OFF,
            SubstituteShape::OnSentOff => &RE_SUB_ON_SENT_OFF,
            SubstituteShape::On => &RE_SUB_ON,
        }
    }
}

fn parse_minute(value: &str, text: &str) -> Result<u32, ExtractionError> {
    value
        .parse::<u32>()
        .map_err(|_| ExtractionError::InvalidMinuteFormat {
            value: value.to_string(),
            text: text.to_string(),
        })
}

fn captured_minute(
    caps: &Captures<'_>,
    name: &str,
    text: &str,
) -> Result<Option<u32>, ExtractionError> {
    caps.name(name)
        .map(|m| parse_minute(m.as_str(), text))
        .transpose()
}

/// Parses a starter who was substituted off `(N)` or sent off `(s/o N)`.
pub fn parse_starter_event(text: &str) -> Result<StarterMinutes, ExtractionError> {
    for shape in StarterShape::PRIORITY {
        if let Some(caps) = shape.pattern().captures(text) {
            tracing::trace!(?shape, text, "starter shape matched");
            return Ok(StarterMinutes {
                min_off: captured_minute(&caps, "off", text)?,
                min_so: captured_minute(&caps, "so", text)?,
            });
        }
    }

    Err(ExtractionError::NoMinuteFound {
        text: text.to_string(),
    })
}

/// Parses a substitute's minutes. `Ok(None)` means none of the known shapes
/// matched, which callers treat as an unrecognised format rather than an error.
pub fn parse_substitute_event(text: &str) -> Result<Option<SubstituteMinutes>, ExtractionError> {
    for shape in SubstituteShape::PRIORITY {
        if let Some(caps) = shape.pattern().captures(text) {
            tracing::trace!(?shape, text, "substitute shape matched");
            let min_on = captured_minute(&caps, "on", text)?.ok_or_else(|| {
                ExtractionError::NoMinuteFound {
                    text: text.to_string(),
                }
            })?;
            return Ok(Some(SubstituteMinutes {
                min_on,
                min_off: captured_minute(&caps, "off", text)?,
                min_so: captured_minute(&caps, "so", text)?,
            }));
        }
    }

    Ok(None)
}

/// Reads the player id out of a lineup link such as
/// `/players/player.sd?player_id=12345`.
pub fn parse_player_id(href: Option<&str>) -> Result<String, ExtractionError> {
    let href = href.ok_or_else(|| ExtractionError::MalformedLink {
        reason: "no player link in node".to_string(),
    })?;

    let base = Url::parse(LINK_BASE).map_err(|e| ExtractionError::MalformedLink {
        reason: e.to_string(),
    })?;
    let url = base.join(href).map_err(|e| ExtractionError::MalformedLink {
        reason: format!("{}: {}", href, e),
    })?;

    url.query_pairs()
        .find(|(key, _)| key == PLAYER_ID_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ExtractionError::MalformedLink {
            reason: format!("{} has no {} parameter", href, PLAYER_ID_PARAM),
        })
}

/// Turns one lineup node into at most one event for `game_id`.
pub fn parse_node(game_id: &str, node: &RawEventNode) -> Result<Option<Event>, ExtractionError> {
    let player_id = parse_player_id(node.href.as_deref())?;

    let (min_on, min_off, min_so) = match node.kind {
        NodeKind::Starter => {
            let minutes = parse_starter_event(&node.text)?;
            (None, minutes.min_off, minutes.min_so)
        }
        NodeKind::Substitute => match parse_substitute_event(&node.text)? {
            Some(minutes) => (Some(minutes.min_on), minutes.min_off, minutes.min_so),
            None => return Ok(None),
        },
    };

    Ok(Some(Event {
        game_id: game_id.to_string(),
        player_id,
        min_on,
        min_off,
        min_so,
        event_details: node.text.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(kind: NodeKind, text: &str, href: Option<&str>) -> RawEventNode {
        RawEventNode {
            kind,
            text: text.to_string(),
            href: href.map(str::to_string),
        }
    }

    #[test]
    fn test_starter_substituted_off() {
        let minutes = parse_starter_event("J. Smith (73)").unwrap();
        assert_eq!(
            minutes,
            StarterMinutes {
                min_off: Some(73),
                min_so: None
            }
        );
    }

    #[test]
    fn test_starter_sent_off() {
        let minutes = parse_starter_event("J. Smith (s/o 81)").unwrap();
        assert_eq!(
            minutes,
            StarterMinutes {
                min_off: None,
                min_so: Some(81)
            }
        );
    }

    #[test]
    fn test_starter_without_minute_is_error() {
        let err = parse_starter_event("J. Smith").unwrap_err();
        assert_eq!(
            err,
            ExtractionError::NoMinuteFound {
                text: "J. Smith".to_string()
            }
        );
    }

    #[test]
    fn test_starter_minute_overflow_is_invalid_format() {
        let err = parse_starter_event("J. Smith (99999999999)").unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidMinuteFormat { ref value, .. } if value == "99999999999"));
    }

    #[test]
    fn test_substitute_on_and_off() {
        let minutes = parse_substitute_event("T. Jones (60-88)").unwrap().unwrap();
        assert_eq!(
            minutes,
            SubstituteMinutes {
                min_on: 60,
                min_off: Some(88),
                min_so: None
            }
        );
    }

    #[test]
    fn test_substitute_on_off_and_sent_off() {
        let minutes = parse_substitute_event("T. Jones (60-88, s/o 90)")
            .unwrap()
            .unwrap();
        assert_eq!(
            minutes,
            SubstituteMinutes {
                min_on: 60,
                min_off: Some(88),
                min_so: Some(90)
            }
        );
    }

    #[test]
    fn test_substitute_still_on() {
        let minutes = parse_substitute_event("T. Jones (60)").unwrap().unwrap();
        assert_eq!(
            minutes,
            SubstituteMinutes {
                min_on: 60,
                min_off: None,
                min_so: None
            }
        );
    }

    #[test]
    fn test_substitute_on_then_sent_off() {
        let minutes = parse_substitute_event("T. Jones (46, s/o 77)")
            .unwrap()
            .unwrap();
        assert_eq!(minutes.min_on, 46);
        assert_eq!(minutes.min_off, None);
        assert_eq!(minutes.min_so, Some(77));
    }

    #[test]
    fn test_substitute_unrecognised_shape_is_none() {
        assert_eq!(parse_substitute_event("T. Jones (60+2)").unwrap(), None);
        assert_eq!(parse_substitute_event("T. Jones").unwrap(), None);
    }

    #[test]
    fn test_player_id_from_relative_link() {
        let id = parse_player_id(Some("/players/player.sd?player_id=54321")).unwrap();
        assert_eq!(id, "54321");
    }

    #[test]
    fn test_player_id_among_other_params() {
        let id = parse_player_id(Some(
            "https://www.soccerbase.com/players/player.sd?season_id=150&player_id=77",
        ))
        .unwrap();
        assert_eq!(id, "77");
    }

    #[test]
    fn test_player_id_missing_link_or_param() {
        assert!(matches!(
            parse_player_id(None),
            Err(ExtractionError::MalformedLink { .. })
        ));
        assert!(matches!(
            parse_player_id(Some("/teams/team.sd?team_id=2598")),
            Err(ExtractionError::MalformedLink { .. })
        ));
        assert!(matches!(
            parse_player_id(Some("/players/player.sd?player_id=")),
            Err(ExtractionError::MalformedLink { .. })
        ));
    }

    #[test]
    fn test_parse_node_builds_event() {
        let raw = node(
            NodeKind::Substitute,
            "T. Jones (60-88, s/o 90)",
            Some("/players/player.sd?player_id=9"),
        );
        let event = parse_node("812345", &raw).unwrap().unwrap();
        assert_eq!(event.game_id, "812345");
        assert_eq!(event.player_id, "9");
        assert_eq!(event.min_on, Some(60));
        assert_eq!(event.min_off, Some(88));
        assert_eq!(event.min_so, Some(90));
        assert_eq!(event.event_details, "T. Jones (60-88, s/o 90)");
    }

    #[test]
    fn test_parse_node_starter_without_minute_propagates() {
        let raw = node(
            NodeKind::Starter,
            "J. Smith",
            Some("/players/player.sd?player_id=1"),
        );
        assert!(matches!(
            parse_node("1", &raw),
            Err(ExtractionError::NoMinuteFound { .. })
        ));
    }

    #[test]
    fn test_parse_node_link_checked_before_minutes() {
        let raw = node(NodeKind::Starter, "J. Smith (73)", None);
        assert!(matches!(
            parse_node("1", &raw),
            Err(ExtractionError::MalformedLink { .. })
        ));
    }

    #[test]
    fn test_parse_node_unrecognised_substitute_is_none() {
        let raw = node(
            NodeKind::Substitute,
            "T. Jones (HT)",
            Some("/players/player.sd?player_id=9"),
        );
        assert_eq!(parse_node("1", &raw).unwrap(), None);
    }
}
