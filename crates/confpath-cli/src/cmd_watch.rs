use anyhow::{Context, Result};
use confpath_restconf::{ClientConfig, NotificationStream, StreamEvent};
use tokio::sync::mpsc;

pub async fn run(config: &ClientConfig, limit: Option<usize>) -> Result<()> {
    let stream = NotificationStream::new(config)?;
    let url = stream.url().to_string();
    let (tx, mut rx) = mpsc::channel(64);
    let handle = stream
        .start(tx)
        .await
        .with_context(|| format!("Failed to open notification stream {}", url))?;

    let mut seen = 0usize;
    let outcome = loop {
        if limit.is_some_and(|n| seen >= n) {
            break Ok(());
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            event = rx.recv() => match event {
                Some(StreamEvent::Message(message)) => {
                    println!("{}", serde_json::to_string(&message)?);
                    seen += 1;
                }
                Some(StreamEvent::Error(e)) => {
                    break Err(anyhow::Error::new(e).context("Notification stream failed"));
                }
                Some(StreamEvent::Closed) | None => {
                    eprintln!("Notification stream closed after {} message(s)", seen);
                    break Ok(());
                }
            }
        }
    };

    handle.stop().await;
    outcome
}
