//! Plain-text rendering of search results for chat replies

use crate::record::SearchResult;
use crate::search::SearchOutcome;

/// Reply when no dataset is loaded
pub const UNAVAILABLE_MESSAGE: &str = "Repeater directory not configured.";

/// Reply when the search ran but matched nothing
pub const NO_MATCHES_MESSAGE: &str = "No repeaters found.";

/// Render one repeater as a reply block.
///
/// ```text
/// ## KK7CMT
/// Seattle
/// Distance: 2.512 km
/// Mode: FM
/// Downlink: 146.96000 MHz
/// Uplink: 146.36000 MHz, tone: 103.5
/// Offset: -0.600 MHz
/// ```
pub fn format_repeater(result: &SearchResult) -> String {
    let record = &result.record;

    let mut downlink = vec![format!("{:.5} MHz", record.frequency_mhz())];
    if let Some(tone) = non_blank(record.decode.as_deref()) {
        downlink.push(format!("tone: {}", tone));
    }

    let mut uplink = vec![format!(
        "{:.5} MHz",
        record.input_frequency_hz() as f64 / 1_000_000.0
    )];
    if let Some(tone) = non_blank(record.encode.as_deref()) {
        uplink.push(format!("tone: {}", tone));
    }

    let mut out = format!("## {}\n{}\n", record.callsign, record.city);
    if let Some(distance) = result.distance_km {
        out.push_str(&format!("Distance: {:.3} km\n", distance));
    }
    out.push_str(&format!(
        "Mode: {}\nDownlink: {}\nUplink: {}\nOffset: {:.3} MHz\n",
        record.mode,
        downlink.join(", "),
        uplink.join(", "),
        record.offset_mhz()
    ));

    let description = normalize_spaces(&record.description);
    if !description.is_empty() {
        out.push('\n');
        out.push_str(&description);
    }

    out
}

/// Render a whole outcome, separating blocks with a blank line
pub fn format_outcome(outcome: &SearchOutcome) -> String {
    match outcome {
        SearchOutcome::Unavailable => UNAVAILABLE_MESSAGE.to_string(),
        SearchOutcome::Matches(results) if results.is_empty() => NO_MATCHES_MESSAGE.to_string(),
        SearchOutcome::Matches(results) => results
            .iter()
            .map(format_repeater)
            .map(|block| block.trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

/// Collapse whitespace runs within lines and drop blank lines
pub fn normalize_spaces(s: &str) -> String {
    s.lines()
        .flat_map(|line| line.split('\r'))
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::sample_record;

    #[test]
    fn test_normalize_spaces() {
        assert_eq!(normalize_spaces("  a   b \n\n\r\n  c\td  "), "a b\nc d");
        assert_eq!(normalize_spaces("   \n  "), "");
    }

    #[test]
    fn test_format_repeater_with_distance() {
        let mut record = sample_record(1, "KK7CMT", 47.6, -122.3);
        record.decode = Some("103.5".to_string());
        record.description = "Linked to\n\n   the   WIDE network ".to_string();
        let text = format_repeater(&SearchResult::new(record, Some(2.5123)));

        assert_eq!(
            text,
            "## KK7CMT\nSeattle\nDistance: 2.512 km\nMode: FM\n\
             Downlink: 146.96000 MHz, tone: 103.5\n\
             Uplink: 146.36000 MHz, tone: 103.5\n\
             Offset: -0.600 MHz\n\nLinked to\nthe WIDE network"
        );
    }

    #[test]
    fn test_format_repeater_without_distance_or_tones() {
        let mut record = sample_record(1, "K7ABC", 47.6, -122.3);
        record.encode = None;
        record.offset_hz = 5_000_000;
        record.frequency_hz = 442_100_000;
        let text = format_repeater(&SearchResult::new(record, None));

        assert!(!text.contains("Distance"));
        assert!(!text.contains("tone"));
        assert!(text.contains("Uplink: 447.10000 MHz\n"));
        assert!(text.ends_with("Offset: 5.000 MHz\n"));
    }

    #[test]
    fn test_format_repeater_extreme_offset() {
        let mut record = sample_record(1, "K7ABC", 47.6, -122.3);
        record.offset_hz = i64::MAX;
        let text = format_repeater(&SearchResult::new(record, None));
        assert!(text.starts_with("## K7ABC\n"));
        assert!(text.contains("Uplink: "));
    }

    #[test]
    fn test_format_outcome() {
        assert_eq!(format_outcome(&SearchOutcome::Unavailable), UNAVAILABLE_MESSAGE);
        assert_eq!(
            format_outcome(&SearchOutcome::Matches(Vec::new())),
            NO_MATCHES_MESSAGE
        );

        let results = vec![
            SearchResult::new(sample_record(1, "A1", 0.0, 0.0), None),
            SearchResult::new(sample_record(2, "A2", 0.0, 0.0), None),
        ];
        let text = format_outcome(&SearchOutcome::Matches(results));
        assert!(text.starts_with("## A1\n"));
        assert!(text.contains("MHz\n\n## A2\n"));
    }
}
