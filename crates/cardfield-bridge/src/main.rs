//! CardField demo host.
//!
//! Mounts one card field on a headless widget, types the card given on the
//! command line into it the way a user would, and prints every event the
//! host receives as one JSON line on stdout.
//!
//! ```text
//! main()
//!  └─ load DemoConfig (TOML)         -- log level, initial card field options
//!  └─ UiThread::spawn()              -- CardFieldManager on "cardfield-ui"
//!  └─ event printer task             -- ChannelEventSink ──► stdout
//!  └─ mount, focus, type, blur       -- via UiHandle
//!  └─ report validated card (last4)  -- via UiHandle
//! ```
//!
//! Example:
//!
//! ```text
//! cardfield-demo --number 4242424242424242 --expiry 12/34 --cvc 123 --no-postal-code
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cardfield_bridge::application::host::{HostEventSink, SurfaceContext};
use cardfield_bridge::application::registry::CardFieldManager;
use cardfield_bridge::infrastructure::event_sink::{ChannelEventSink, EmittedEvent};
use cardfield_bridge::infrastructure::fonts::FontCatalog;
use cardfield_bridge::infrastructure::native_surface::SimulatedCardWidget;
use cardfield_bridge::infrastructure::storage::config::{load_config, save_config, DemoConfig};
use cardfield_bridge::infrastructure::ui_thread::UiThread;
use cardfield_core::{CardField, CardFieldConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Headless CardField host.
#[derive(Debug, Parser)]
#[command(name = "cardfield-demo", about = "Drive a card field and print its host events", version)]
struct Cli {
    /// TOML configuration file.  Missing files fall back to defaults.
    #[arg(long, default_value = "cardfield.toml", env = "CARDFIELD_CONFIG")]
    config: PathBuf,

    /// Write the default configuration to `--config` and exit.
    #[arg(long)]
    write_default_config: bool,

    /// Card number to type.
    #[arg(long, default_value = "")]
    number: String,

    /// Expiry to type, e.g. `12/34`.
    #[arg(long, default_value = "")]
    expiry: String,

    /// CVC to type.
    #[arg(long, default_value = "")]
    cvc: String,

    /// Postal code to type (ignored when postal entry is disabled).
    #[arg(long, default_value = "")]
    postal_code: String,

    /// Include the full number and CVC in change events.
    #[arg(long)]
    full_details: bool,

    /// Hide the postal code field.
    #[arg(long)]
    no_postal_code: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file's options.
    fn card_field_config(&self, file: &DemoConfig) -> CardFieldConfig {
        let mut config = file.card_field.to_card_field_config();
        if self.full_details {
            config.dangerously_get_full_card_details = true;
        }
        if self.no_postal_code {
            config.postal_code_enabled = false;
        }
        config
    }

    /// The keystrokes to send, field by field, skipping empty ones.
    fn entries(&self, postal_code_enabled: bool) -> Vec<(CardField, String)> {
        let mut entries = vec![
            (CardField::CardNumber, self.number.clone()),
            (CardField::ExpiryDate, self.expiry.clone()),
            (CardField::Cvc, self.cvc.clone()),
        ];
        if postal_code_enabled {
            entries.push((CardField::PostalCode, self.postal_code.clone()));
        }
        entries.retain(|(_, text)| !text.is_empty());
        entries
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.write_default_config {
        save_config(&cli.config, &DemoConfig::default())
            .with_context(|| format!("writing {}", cli.config.display()))?;
        println!("wrote {}", cli.config.display());
        return Ok(());
    }

    let file = load_config(&cli.config).with_context(|| format!("loading {}", cli.config.display()))?;

    // `RUST_LOG` overrides the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&file.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(config = %cli.config.display(), "CardField demo starting");

    // ── Event printer ─────────────────────────────────────────────────────────
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<EmittedEvent>();
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event.to_json() {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!("failed to render event: {e}"),
            }
        }
    });

    // ── UI thread ─────────────────────────────────────────────────────────────
    let context = SurfaceContext {
        sink: Arc::new(ChannelEventSink::new(event_tx)) as Arc<dyn HostEventSink>,
        fonts: Arc::new(FontCatalog::bundled()),
    };
    let ui_thread = UiThread::spawn(move || CardFieldManager::new(SimulatedCardWidget::default, context))
        .context("starting UI thread")?;
    let ui = ui_thread.handle();

    // ── Drive the card field ──────────────────────────────────────────────────
    let config = cli.card_field_config(&file);
    let postal_code_enabled = config.postal_code_enabled;
    let id = ui.mount(config).await.context("mounting card field")?;

    ui.command(id, "focus");
    for (field, text) in cli.entries(postal_code_enabled) {
        ui.input(id, move |widget| {
            let mut events = widget.tap(field);
            events.extend(widget.type_text(&text));
            events
        });
    }
    ui.command(id, "blur");

    match ui.current_validated_card().await.context("reading card")? {
        Some(card) => info!(
            last4 = card.params.last4(),
            expiry_month = card.params.expiry_month,
            expiry_year = card.params.expiry_year,
            postal_code = card.postal_code.as_deref().unwrap_or(""),
            "card complete"
        ),
        None => info!("card incomplete"),
    }

    // ── Shutdown ──────────────────────────────────────────────────────────────
    ui.unmount(id);
    drop(ui);
    tokio::task::spawn_blocking(move || ui_thread.shutdown())
        .await
        .context("joining UI thread")??;
    printer.await.context("joining event printer")?;

    info!("CardField demo stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["cardfield-demo"]);

        assert_eq!(cli.config, PathBuf::from("cardfield.toml"));
        assert!(!cli.full_details);
        assert!(!cli.no_postal_code);
        assert!(cli.entries(true).is_empty());
    }

    #[test]
    fn test_cli_flags_override_file_options() {
        let cli = Cli::parse_from(["cardfield-demo", "--full-details", "--no-postal-code"]);

        let config = cli.card_field_config(&DemoConfig::default());

        assert!(config.dangerously_get_full_card_details);
        assert!(!config.postal_code_enabled);
    }

    #[test]
    fn test_entries_skip_postal_code_when_disabled() {
        let cli = Cli::parse_from([
            "cardfield-demo",
            "--number",
            "4242424242424242",
            "--expiry",
            "12/34",
            "--postal-code",
            "12345",
        ]);

        let fields: Vec<_> = cli.entries(false).into_iter().map(|(f, _)| f).collect();

        assert_eq!(fields, vec![CardField::CardNumber, CardField::ExpiryDate]);
    }
}
