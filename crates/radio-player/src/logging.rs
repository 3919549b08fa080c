//! tracing setup: file log plus a WARN/ERROR feed for the status line.

use std::path::PathBuf;

use tokio::sync::broadcast;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// A tracing layer that forwards warnings and errors to the shell.
struct StatusLayer {
    sender: broadcast::Sender<String>,
}

impl<S> tracing_subscriber::Layer<S> for StatusLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let level = event.metadata().level();
        if !matches!(*level, tracing::Level::WARN | tracing::Level::ERROR) {
            return;
        }
        let _ = self.sender.send(format_event(event));
    }
}

fn format_event(event: &tracing::Event<'_>) -> String {
    let mut message = format!(
        "{} [{}] ",
        chrono::Local::now().format("%H:%M:%S"),
        event.metadata().level()
    );
    let mut visitor = MessageVisitor(&mut message);
    event.record(&mut visitor);
    message
}

struct MessageVisitor<'a>(&'a mut String);

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0.push_str(&format!("{:?}", value));
        } else {
            self.0.push_str(&format!(" {}={:?}", field.name(), value));
        }
    }
}

/// Install the global subscriber. Returns the log file path and the receiving
/// end of the status feed.
pub fn init(default_filter: &str) -> anyhow::Result<(PathBuf, broadcast::Receiver<String>)> {
    let data_dir = radio_core::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("player.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let (status_tx, status_rx) = broadcast::channel::<String>(64);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(StatusLayer { sender: status_tx })
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .try_init()?;

    Ok((log_path, status_rx))
}
