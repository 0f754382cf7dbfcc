use super::{listener, App};
use anyhow::{Context, Result};
use cylinder_core::DisplayRequest;
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

impl App {
    /// Serve display requests from the network until Ctrl-C
    ///
    /// The listener runs on the async runtime; the marquee runs on a blocking
    /// thread and pulls requests straight from the queue, one scroll at a time.
    pub async fn serve(self) -> Result<()> {
        let bind = self.config.listener.bind.clone();
        let listener = TcpListener::bind(&bind)
            .await
            .with_context(|| format!("Failed to listen on {}", bind))?;
        info!("Listening for messages on {}", listener.local_addr()?);

        let (tx, rx) = mpsc::channel(self.config.listener.queue_depth.max(1));
        let stop = Arc::new(AtomicBool::new(false));

        let mut marquee = self.marquee()?;
        let feed = request_feed(rx, Arc::clone(&stop));
        let player = tokio::task::spawn_blocking(move || marquee.run(feed));

        let mut accept = tokio::spawn(listener::serve_tcp(
            listener,
            tx,
            self.config.listener.max_message_len,
        ));

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl-C")?;
                info!("Shutdown requested, finishing current message");
            }
            result = &mut accept => {
                if let Err(e) = result {
                    error!("Message listener task failed: {}", e);
                }
            }
        }

        // Queued requests are discarded; closing the listener wakes an idle
        // player so it can blank the panel and finalize the driver.
        stop.store(true, Ordering::Release);
        accept.abort();

        tokio::spawn(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Second Ctrl-C, exiting without clearing the panel");
                std::process::exit(130);
            }
        });

        let summary = player.await.context("Display task panicked")?;
        info!(
            "Stopped after {} messages ({} dropped, {} failed)",
            summary.shown, summary.dropped, summary.failed
        );
        Ok(())
    }
}

/// Blocking iterator over queued requests
///
/// Ends when every sender is gone, or at the first pull after `stop` is set.
fn request_feed(
    mut rx: mpsc::Receiver<DisplayRequest>,
    stop: Arc<AtomicBool>,
) -> impl Iterator<Item = DisplayRequest> {
    std::iter::from_fn(move || {
        if stop.load(Ordering::Acquire) {
            rx.close();
            return None;
        }
        rx.blocking_recv()
    })
}
