//! # Demo: simulated_lot
//!
//! Runs a three-slot lot on simulated devices and serves the dashboard.
//!
//! A scripted driver parks and removes cars and waves at the gate ranger, so
//! the dashboard at <http://127.0.0.1:8080> keeps changing. Closed tickets are
//! "notified" to the console (or to Telegram when the `telegram` feature is on
//! and `TELEGRAM_TOKEN` / `TELEGRAM_CHAT_ID` are set).
//!
//! ## Flow
//! ```text
//! driver task ──► SimPresence / SimRange
//!                        │
//!                        ▼
//!                  Scheduler::run()
//!                    ├─► StatusServer (127.0.0.1:8080)
//!                    ├─► SimActuator / SimDisplay
//!                    └─► Bus ──► LogWriter, Notifier
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example simulated_lot --features logging
//! ```
//! Stop with Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use lotkeeper::hw::{SimActuator, SimDisplay, SimPresence, SimRange};
use lotkeeper::{
    LogWriter, LotConfig, NotificationSink, Notifier, NotifyError, Scheduler, StatusServer,
    Subscribe,
};

/// Prints notifications instead of delivering them.
struct ConsoleSink;

#[async_trait]
impl NotificationSink for ConsoleSink {
    async fn send(&self, recipient: &str, message: &str) -> Result<(), NotifyError> {
        println!("[notify → {recipient}]\n{message}\n");
        Ok(())
    }
}

fn notifier(cfg: &LotConfig) -> anyhow::Result<Arc<dyn Subscribe>> {
    #[cfg(feature = "telegram")]
    {
        if let (Ok(token), Ok(chat)) = (
            std::env::var("TELEGRAM_TOKEN"),
            std::env::var("TELEGRAM_CHAT_ID"),
        ) {
            let sink = lotkeeper::TelegramSink::new(token)?;
            return Ok(Arc::new(Notifier::new(sink, chat)));
        }
    }
    Ok(Arc::new(Notifier::new(ConsoleSink, cfg.notify_recipient.clone())))
}

/// One scripted step: which slots are taken and what the ranger sees.
struct Step {
    slots: [bool; 3],
    range_cm: Option<f64>,
    hold: Duration,
}

const fn step(slots: [bool; 3], range_cm: Option<f64>, secs: u64) -> Step {
    Step {
        slots,
        range_cm,
        hold: Duration::from_secs(secs),
    }
}

const SCRIPT: &[Step] = &[
    step([false, false, false], Some(8.0), 1),
    step([false, false, false], None, 4),
    step([true, false, false], None, 6),
    step([true, false, false], Some(10.0), 1),
    step([true, false, false], None, 4),
    step([true, true, false], None, 8),
    step([true, true, false], Some(9.0), 1),
    step([true, true, true], None, 10),
    // Lot full: the gate refuses and shows FULL.
    step([true, true, true], Some(7.0), 1),
    step([true, true, true], None, 5),
    step([false, true, true], None, 12),
    step([false, false, true], None, 15),
    step([false, false, false], None, 10),
];

async fn drive(slots: Vec<SimPresence>, range: SimRange, token: CancellationToken) {
    loop {
        for s in SCRIPT {
            for (sensor, present) in slots.iter().zip(s.slots) {
                sensor.set(present);
            }
            range.set(s.range_cm);
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(s.hold) => {}
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = LotConfig {
        notify_recipient: "console".into(),
        ..LotConfig::default()
    };
    let addr = std::env::var("LOTKEEPER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into());
    let server = StatusServer::bind(addr.as_str(), &cfg).await?;
    tracing::info!(addr = %server.local_addr()?, "dashboard listening");

    let slots: Vec<SimPresence> = (0..cfg.capacity).map(|_| SimPresence::new()).collect();
    let range = SimRange::new();
    let display = SimDisplay::new();
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new()), notifier(&cfg)?];

    let mut builder = Scheduler::builder(cfg)
        .with_range(range.clone())
        .with_actuator(SimActuator::new())
        .with_display(display.clone())
        .with_server(server)
        .with_subscribers(subs);
    for s in &slots {
        builder = builder.with_slot_sensor(s.clone());
    }
    let sched = builder.build()?;

    let token = CancellationToken::new();
    let driver = tokio::spawn(drive(slots, range, token.clone()));

    sched.run(token.clone()).await;
    token.cancel();
    driver.await?;

    if let Some([top, bottom]) = display.current() {
        tracing::info!(%top, %bottom, "display at shutdown");
    }
    Ok(())
}
