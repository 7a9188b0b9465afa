use std::time::Duration;

use padradio_proto::config::NetworkConfig;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Poll `check_url` until it answers or `timeout_secs` elapse.
pub async fn wait_for_network(config: &NetworkConfig) -> bool {
    info!("Waiting for network connectivity...");
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            warn!("Cannot build HTTP client, skipping network check: {}", e);
            return true;
        }
    };

    let deadline = Instant::now() + Duration::from_secs(config.timeout_secs);
    let interval = Duration::from_secs(config.retry_interval_secs);
    // At least one attempt, even with a zero timeout.
    loop {
        match client.get(&config.check_url).send().await {
            Ok(_) => {
                info!("Network connectivity established");
                return true;
            }
            Err(e) => debug!("Network not available: {}", e),
        }
        if Instant::now() >= deadline {
            break;
        }
        tokio::time::sleep(interval).await;
    }

    warn!("Network not available after {} seconds", config.timeout_secs);
    false
}

/// Keep waiting until the network is up.  Streams are useless without it.
pub async fn wait_until_online(config: &NetworkConfig) {
    let interval = Duration::from_secs(config.retry_interval_secs);
    while !wait_for_network(config).await {
        warn!("Retrying network connection...");
        tokio::time::sleep(interval).await;
    }
}
