use anyhow::Result;
use roonpipe_core::RoonPipe;

pub fn run(roonpipe: &RoonPipe) -> Result<()> {
    let config = roonpipe.config();

    println!("roonpipe-search status");
    println!("======================");
    println!();
    println!("Socket: {}", roonpipe.client().socket_path().display());
    println!("Daemon running: {}", if roonpipe.is_running() { "yes" } else { "no" });
    println!("Timeout: {}ms", roonpipe.client().timeout().as_millis());
    println!("Debounce: {}ms", config.search.debounce_ms);
    println!("Trigger: {:?}", config.search.trigger);
    println!("Action model: {:?}", config.presenter.action_model);
    println!("Fallback icon: {}", config.presenter.fallback_icon.display());

    Ok(())
}
