use crate::domain::model::Event;
use crate::utils::error::{EtlError, Result};

pub const EVENT_COLUMNS: [&str; 5] = ["game_id", "player_id", "min_on", "min_off", "min_so"];
pub const DETAILS_COLUMN: &str = "event_details";

fn minute(value: Option<u32>) -> String {
    value.map(|m| m.to_string()).unwrap_or_default()
}

/// Encodes events as CSV with a header row. Missing minutes are empty fields.
pub fn encode_events_csv(events: &[Event], include_details: bool) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = EVENT_COLUMNS.to_vec();
    if include_details {
        header.push(DETAILS_COLUMN);
    }
    writer.write_record(&header)?;

    for event in events {
        let mut row = vec![
            event.game_id.clone(),
            event.player_id.clone(),
            minute(event.min_on),
            minute(event.min_off),
            minute(event.min_so),
        ];
        if include_details {
            row.push(event.event_details.clone());
        }
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| EtlError::IoError(std::io::Error::other(e)))
}
