// bases/playlist_cli/src/output.rs
use playlist_engine::{Phase, StatusEvent, StatusSink};

/// Prints normalized status to stdout; raw backend output only when verbose.
pub struct ConsoleSink {
    verbose: bool,
}

impl ConsoleSink {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl StatusSink for ConsoleSink {
    fn event(&self, event: StatusEvent) {
        match (event.phase, event.percent) {
            (Phase::Failed, _) => eprintln!("Failed: {}", event.message),
            (_, Some(percent)) => println!("{} ({}%)", event.message, percent),
            (_, None) => println!("{}", event.message),
        }
    }

    fn raw_line(&self, line: &str) {
        if self.verbose {
            println!("{}", line);
        }
    }
}
