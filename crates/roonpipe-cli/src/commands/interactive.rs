use anyhow::Result;
use parking_lot::Mutex;
use roonpipe_core::{DisplayEntry, ResultSink, RoonPipe};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::output;
use crate::OutputFormat;

/// Prints every published set and remembers the last one for `:<n>` commands
struct PrintSink {
    format: OutputFormat,
    last: Mutex<Vec<DisplayEntry>>,
}

impl ResultSink for PrintSink {
    fn publish(&self, entries: Vec<DisplayEntry>) {
        print!("{}", output::render(&entries, self.format));
        *self.last.lock() = entries;
    }
}

/// Each stdin line is the full query text as typed so far.
/// A line of the form `:<n> <action-id>` runs an action on entry `n` of the last set.
pub async fn run(roonpipe: &RoonPipe, format: OutputFormat) -> Result<()> {
    let controller = roonpipe.controller(tokio::runtime::Handle::current());
    let sink = Arc::new(PrintSink {
        format,
        last: Mutex::new(Vec::new()),
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.strip_prefix(':') {
            Some(command) => invoke(&sink, command).await,
            None => {
                controller.submit(&line, sink.clone());
            }
        }
    }

    // Let the last query finish before exiting
    let config = roonpipe.config();
    let limit = config.search.debounce() + config.daemon.timeout();
    if tokio::time::timeout(limit, controller.settled()).await.is_err() {
        tracing::warn!("Last query did not finish within {:?}", limit);
    }

    Ok(())
}

async fn invoke(sink: &PrintSink, command: &str) {
    let Some((position, action_id)) = parse_invoke(command) else {
        eprintln!("usage: :<n> <action-id>");
        return;
    };

    let action = {
        let last = sink.last.lock();
        last.get(position.wrapping_sub(1))
            .and_then(|entry| entry.action(action_id))
            .cloned()
    };

    match action {
        Some(action) => {
            let ok = action.invoke().await;
            println!("{} {}: {}", action.title, position, if ok { "ok" } else { "failed" });
        }
        None => eprintln!("No action '{}' on entry {}", action_id, position),
    }
}

/// `"2 play_now"` -> `(2, "play_now")`
fn parse_invoke(command: &str) -> Option<(usize, &str)> {
    let mut parts = command.split_whitespace();
    let position = parts.next()?.parse().ok()?;
    let action_id = parts.next()?;
    Some((position, action_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_invoke() {
        assert_eq!(parse_invoke("2 play_now"), Some((2, "play_now")));
        assert_eq!(parse_invoke("  1   queue "), Some((1, "queue")));
        assert_eq!(parse_invoke("x queue"), None);
        assert_eq!(parse_invoke("3"), None);
    }
}
