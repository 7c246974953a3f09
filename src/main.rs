//! Order Input Engine — Interactive Session
//!
//! Runs the order form against the paper quote service and ledger,
//! driven by line commands on stdin. Session output goes to stdout,
//! structured logs to stderr.
//!
//! Wiring sequence:
//! 1. Load config (path from argv, default config.toml) + validate
//! 2. Init tracing (JSON or human-readable structured logging)
//! 3. Spawn the Prometheus metrics server when enabled
//! 4. Create the paper quoter and ledger (quote, balance and submit ports)
//! 5. Create the engine, select the first pair, connect the wallet
//! 6. Event loop: stdin commands, engine events, SIGINT
//! 7. On SIGINT/EOF/quit → drain pending work → graceful shutdown

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

mod command;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use order_input_engine::adapters::metrics::MetricsRegistry;
use order_input_engine::adapters::paper::{PaperLedger, PaperQuoter};
use order_input_engine::config::{self, AppConfig, SessionConfig};
use order_input_engine::domain::numeric_input::{ParsedInput, parse_amount};
use order_input_engine::domain::order::{AmountInput, Leg, TopOfBook};
use order_input_engine::usecases::{EngineEvent, OrderInputEngine};

use command::{Command, HELP, parse_command};

/// How long pending quotes and percentages may take to settle once
/// input has ended.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

type PaperEngine = OrderInputEngine<PaperQuoter, PaperLedger, PaperLedger>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct Session {
    config: AppConfig,
    engine: PaperEngine,
    quoter: Arc<PaperQuoter>,
    ledger: Arc<PaperLedger>,
    metrics: Arc<MetricsRegistry>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = config::loader::load_config(&path).context("Failed to load configuration")?;

    // ── 2. Initialize structured logging ────────────────────
    init_tracing(&config.session);

    info!(
        name = %config.session.name,
        version = env!("CARGO_PKG_VERSION"),
        pairs = config.pairs.len(),
        wallet = ?config.session.wallet,
        "Starting order input session"
    );

    // ── 3. Metrics server ───────────────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);
    let metrics_handle = config.metrics.enabled.then(|| {
        let server = Arc::clone(&metrics);
        let bind_address = config.metrics.bind_address.clone();
        let shutdown = shutdown_tx.subscribe();
        tokio::spawn(async move {
            if let Err(e) = server.serve(bind_address, shutdown).await {
                error!(error = %e, "Metrics server failed");
            }
        })
    });

    // ── 4. Paper collaborators ──────────────────────────────
    let quoter = Arc::new(PaperQuoter::from_config(&config.paper));
    for pair in &config.pairs {
        quoter.set_book(&pair.trading_pair(), pair.top_of_book()).await;
    }
    let ledger = Arc::new(PaperLedger::new(
        config.paper.balances.clone(),
        config.paper.approve_submissions,
    ));

    // ── 5. Engine ───────────────────────────────────────────
    let mut engine = OrderInputEngine::new(
        Arc::clone(&quoter),
        Arc::clone(&ledger),
        Arc::clone(&ledger),
        &config.engine,
    );
    if let Some(first) = config.pairs.first() {
        engine.select_pair(first.trading_pair(), first.top_of_book());
    }
    if let Some(wallet) = config.session.wallet.clone() {
        engine.connect_wallet(Some(wallet)).await;
    }

    let mut session = Session {
        config,
        engine,
        quoter,
        ledger,
        metrics,
    };
    session.print_view();

    // ── 6. Event loop ───────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("SIGINT received, shutting down");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    info!("Input closed");
                    break;
                };
                if session.handle_line(&line).await == Flow::Quit {
                    break;
                }
            }
            event = session.engine.next_event() => session.on_event(&event),
        }
    }

    // ── 7. Graceful shutdown ────────────────────────────────
    if tokio::time::timeout(DRAIN_TIMEOUT, session.drain()).await.is_err() {
        warn!("Pending quotes did not settle before shutdown");
    }
    let _ = shutdown_tx.send(());
    if let Some(handle) = metrics_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    info!("Shutdown complete");
    Ok(())
}

fn init_tracing(session: &SessionConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&session.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if session.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

impl Session {
    async fn handle_line(&mut self, line: &str) -> Flow {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(command::CommandError::Empty) => return Flow::Continue,
            Err(e) => {
                println!("error: {e}");
                return Flow::Continue;
            }
        };
        self.metrics.record_command(command.name());
        self.handle(command).await
    }

    async fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Pairs => {
                for (i, pair) in self.config.pairs.iter().enumerate() {
                    println!("{i}: {} ({})", pair.name, pair.address);
                }
                return Flow::Continue;
            }
            Command::Pair(index) => {
                let Some(pair) = self.config.pairs.get(index) else {
                    println!("error: no pair at index {index}");
                    return Flow::Continue;
                };
                self.engine
                    .select_pair(pair.trading_pair(), pair.top_of_book());
            }
            Command::Side(side) => self.engine.set_side(side),
            Command::Type(order_type) => self.engine.set_type(order_type),
            Command::Price(raw) => {
                if let Some(price) = self.commit_text(&raw) {
                    self.engine.set_price(price);
                }
            }
            Command::BestPrice => {
                if self.engine.use_best_price().is_none() {
                    println!("error: best price only applies to LIMIT orders");
                    return Flow::Continue;
                }
            }
            Command::Quantity(raw) => {
                if let Some(amount) = self.commit_text(&raw) {
                    self.engine.set_amount(Leg::Token1, amount);
                }
            }
            Command::Total(raw) => {
                if let Some(amount) = self.commit_text(&raw) {
                    self.engine.set_amount(Leg::Token2, amount);
                }
            }
            Command::Percentage(percentage) => {
                if let Err(e) = self.engine.set_percentage(percentage) {
                    println!("error: {e}");
                }
                return Flow::Continue;
            }
            Command::Max => {
                let leg = Leg::spent_by(self.engine.state().side());
                if self.engine.use_available(leg).is_none() {
                    println!("error: no available balance");
                    return Flow::Continue;
                }
            }
            Command::PostOnly => self.engine.toggle_post_only(),
            Command::Book {
                best_buy,
                best_sell,
            } => {
                let book = TopOfBook {
                    best_buy,
                    best_sell,
                };
                self.engine.update_top_of_book(book);
                if let Some(pair) = self.engine.pair().cloned() {
                    self.quoter.set_book(&pair, book).await;
                }
            }
            Command::Wallet(wallet) => self.engine.connect_wallet(wallet).await,
            Command::Balances => {
                if let Err(e) = self.engine.refresh_balances().await {
                    println!("error: {e:#}");
                }
            }
            Command::Approve(approve) => {
                self.ledger.set_approval(approve);
                return Flow::Continue;
            }
            Command::Reset => self.engine.reset_user_input(),
            Command::Submit => self.submit().await,
            Command::Show => {}
            Command::Help => {
                println!("{HELP}");
                return Flow::Continue;
            }
            Command::Quit => return Flow::Quit,
        }
        self.print_view();
        Flow::Continue
    }

    async fn submit(&mut self) {
        let order_type = self.engine.state().order_type().to_string();
        let started = Instant::now();
        match self.engine.submit().await {
            Ok(outcome) => {
                self.metrics
                    .record_submission(&order_type, &outcome, started.elapsed());
                print_json(&outcome);
            }
            Err(refusal) => {
                self.metrics.record_refusal(&refusal);
                println!("cannot submit: {refusal}");
            }
        }
    }

    fn on_event(&self, event: &EngineEvent) {
        self.metrics
            .record_event(event, self.engine.quotes_in_flight());
        match event {
            EngineEvent::QuoteRequested(_) | EngineEvent::QuoteDiscarded => {}
            EngineEvent::PercentageFailed(error) => println!("error: {error}"),
            EngineEvent::QuoteApplied
            | EngineEvent::QuoteFailed(_)
            | EngineEvent::PercentageApplied(_) => self.print_view(),
        }
    }

    /// Apply the numeric input rules to typed text. Incomplete text
    /// (e.g. `12.`) commits nothing.
    fn commit_text(&self, raw: &str) -> Option<AmountInput> {
        let parsed = parse_amount(
            raw,
            self.config.session.decimal_separator,
            self.config.engine.input_scale,
        );
        if let ParsedInput::Incomplete { text } = &parsed {
            println!("incomplete input '{text}', nothing committed");
        }
        parsed.commit()
    }

    fn print_view(&self) {
        print_json(&self.engine.view());
    }

    /// Process engine events until no percentage, quote refresh or
    /// fetch is outstanding.
    async fn drain(&mut self) {
        while self.engine.percentage_pending()
            || self.engine.quote_refresh_pending()
            || self.engine.quotes_in_flight() > 0
        {
            let event = self.engine.next_event().await;
            self.on_event(&event);
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{json}"),
        Err(e) => warn!(error = %e, "Failed to encode session output"),
    }
}
