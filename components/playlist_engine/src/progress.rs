// components/playlist_engine/src/progress.rs

/// Keywords that mark a line as download progress. Case-sensitive; both
/// spotdl and yt-dlp capitalize them in their human-readable output.
const MARKERS: [&str; 2] = ["Downloading", "Fetching"];

/// Classification of one raw backend output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Empty or whitespace-only; dropped entirely, not even raw-logged.
    Ignored,

    /// No progress marker. Goes to the raw log, leaves status untouched.
    Log,

    /// Marker followed by a bracketed token: machine-formatted progress.
    /// Kept out of the human-facing status line.
    Machine { percent: Option<u8> },

    /// Human-facing progress; `message` is the line with the marker keyword
    /// removed, and is never empty.
    Status { message: String, percent: Option<u8> },
}

/// Normalize one line of backend output. Stateless; a pure function of the
/// input line.
pub fn parse_line(raw: &str) -> ParsedLine {
    let line = raw.trim();
    if line.is_empty() {
        return ParsedLine::Ignored;
    }

    let Some((marker, at)) = MARKERS
        .iter()
        .find_map(|m| line.find(m).map(|at| (*m, at)))
    else {
        return ParsedLine::Log;
    };

    let percent = extract_percent(line);

    let after_marker = line[at + marker.len()..].trim_start();
    if after_marker.starts_with('[') {
        return ParsedLine::Machine { percent };
    }

    let message = line.replacen(marker, "", 1).trim().to_owned();
    if message.is_empty() {
        // Marker with nothing around it carries no item information.
        return ParsedLine::Log;
    }

    ParsedLine::Status { message, percent }
}

/// Best-effort scan for an `NN%` / `NN.N%` token anywhere in the line.
fn extract_percent(line: &str) -> Option<u8> {
    line.split_whitespace()
        .filter_map(|token| token.strip_suffix('%'))
        .find_map(|value| value.parse::<f64>().ok())
        .map(|p| p.clamp(0.0, 100.0).round() as u8)
}
