//! # Example: sos
//!
//! Presses the SOS button once and follows the alert to its outcome.
//!
//! Shows how to:
//! - Build an [`AlertWorkflow`] with contacts, a location provider and subscribers.
//! - Render toasts through a custom [`ToastSink`].
//! - Cancel during the countdown (`--cancel`).
//!
//! ## Flow
//! ```text
//! trigger() ──► SessionArmed ──► CountdownTick × 5 ──► DispatchStarted
//!                   │                  │
//!                   │            (--cancel at t=2 ──► SessionCancelled)
//!                   ▼
//!           LocationResolved ──► ContactDelivered × 3 ──► SessionDispatched
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example sos --features logging
//! cargo run --example sos --features logging -- --cancel
//! ```

use std::{sync::Arc, time::Duration};

use alertvisor::{
    AlertWorkflow, CancelOutcome, Config, EmergencyContact, FixedLocation, Location, LogWriter,
    Subscribe, Toast, ToastLevel, ToastNotifier, ToastSink,
};
use tracing_subscriber::EnvFilter;

/// Prints toasts the way the app's banner would show them.
struct ConsoleToasts;

#[async_trait::async_trait]
impl ToastSink for ConsoleToasts {
    async fn show(&self, toast: Toast) {
        let badge = match toast.level {
            ToastLevel::Success => "✔",
            ToastLevel::Error => "!",
        };
        println!("[toast {badge}] {}", toast.message);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cancel = std::env::args().any(|a| a == "--cancel");

    let subs: Vec<Arc<dyn Subscribe>> = vec![
        Arc::new(LogWriter::new()),
        Arc::new(ToastNotifier::new(Arc::new(ConsoleToasts))),
    ];

    let workflow = AlertWorkflow::builder(Config::default())
        .with_subscribers(subs)
        .with_contacts(vec![
            EmergencyContact::new("1", "Mom", "+1 (555) 123-4567", "Family"),
            EmergencyContact::new("2", "Dad", "+1 (555) 234-5678", "Family"),
            EmergencyContact::new("3", "Sarah", "+1 (555) 345-6789", "Friend"),
        ])
        .with_location(Arc::new(FixedLocation(Location::new(40.0, -73.0))))
        .build();

    let id = workflow.trigger().await?.session_id();
    println!("[main] SOS pressed, session {id}");

    if cancel {
        tokio::time::sleep(Duration::from_secs(2)).await;
        if let CancelOutcome::Ignored(reason) = workflow.cancel().await? {
            println!("[main] cancel ignored: {reason}");
        }
    }

    let session = workflow.resolved(id).await?;
    println!(
        "[main] session {} finished as {} (remaining={})",
        session.id,
        session.state.as_label(),
        session.seconds_remaining
    );
    if let Some(result) = &session.result {
        println!(
            "[main] delivered={} failed={} location_included={}",
            result.delivered.len(),
            result.failed.len(),
            result.location_included
        );
    }

    workflow.shutdown().await;
    Ok(())
}
