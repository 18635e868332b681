use anyhow::{bail, Result};
use roonpipe_core::RoonPipe;
use roonpipe_protocol::PlayRequest;

pub async fn run(roonpipe: &RoonPipe, request: PlayRequest) -> Result<()> {
    if !roonpipe.is_running() {
        bail!(
            "RoonPipe is not running (no socket at {}). Start it first: roonpipe",
            roonpipe.client().socket_path().display()
        );
    }

    let item_key = request.item_key().to_string();
    if !roonpipe.play(request).await {
        bail!("Daemon did not accept the play request for {}", item_key);
    }

    println!("Playing {}", item_key);
    Ok(())
}
