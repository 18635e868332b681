use anyhow::Result;
use roonpipe_core::RoonPipe;

use crate::output;
use crate::OutputFormat;

pub async fn run(roonpipe: &RoonPipe, query: &str, format: OutputFormat) -> Result<()> {
    let entries = roonpipe.search(query).await;
    print!("{}", output::render(&entries, format));
    Ok(())
}
