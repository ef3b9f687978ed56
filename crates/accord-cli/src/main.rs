//! Accord terminal front end.
//!
//! Menu loop, statistics persistence, and audit log display around the
//! core engine. The protocol itself lives in `accord-core`; this binary
//! only collects input, renders results, and keeps a win counter.

use accord_core::{ChoiceSource, Engine, FileAudit, RoundOutcome};
use async_trait::async_trait;
use console::{style, Term};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const AUDIT_FILE: &str = "audit.log";
const STATS_FILE: &str = "stats.json";
const AUDIT_TAIL_LINES: usize = 20;

/// Persisted win/loss counters.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
struct Stats {
    played: u64,
    matched: u64,
}

impl Stats {
    /// Load from disk; a missing or corrupt file starts fresh.
    fn load(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}

/// Read one trimmed line from the terminal without blocking the runtime.
///
/// If a phase deadline fires while this is pending, the round drops the
/// future; the blocking read may still complete on its worker thread but
/// its result goes nowhere.
async fn prompt_line(prompt: String) -> String {
    tokio::task::spawn_blocking(move || {
        use std::io::Write;
        print!("{prompt}");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
        line.trim().to_string()
    })
    .await
    .unwrap_or_default()
}

fn parse_bit(raw: &str) -> Option<u8> {
    match raw {
        "yes" | "y" | "1" => Some(1),
        "no" | "n" | "0" => Some(0),
        _ => None,
    }
}

/// Collects choices at a shared terminal. The screen is cleared after
/// every private answer so one party's input is not visible to the
/// other.
struct TerminalSource {
    term: Term,
}

#[async_trait]
impl ChoiceSource for TerminalSource {
    async fn choose_bit(&mut self, party: &str) -> u8 {
        loop {
            let raw = prompt_line(format!("[{party}] your choice (yes/no): "))
                .await
                .to_lowercase();
            match parse_bit(&raw) {
                Some(bit) => {
                    let _ = self.term.clear_screen();
                    return bit;
                }
                None => println!("Please answer yes or no."),
            }
        }
    }

    async fn compose_message(&mut self, party: &str) -> Option<String> {
        let raw = prompt_line(format!(
            "[{party}] a short message for the other side (blank to skip): "
        ))
        .await;
        let _ = self.term.clear_screen();
        if raw.is_empty() {
            None
        } else {
            Some(raw)
        }
    }
}

fn banner(term: &Term) {
    let _ = term.clear_screen();
    println!("{}", style("=====================================").magenta());
    println!("{}", style("  ACCORD — two-party commit-reveal").magenta().bold());
    println!("{}", style("=====================================").magenta());
}

fn print_menu() {
    println!("1) Play a bit-only round");
    println!("2) Play a round with messages");
    println!("3) View statistics");
    println!("4) View audit log");
    println!("0) Exit");
}

fn show_stats(stats: &Stats) {
    println!("Rounds played : {}", stats.played);
    println!("Rounds matched: {}", stats.matched);
    if stats.played > 0 {
        println!("Match rate    : {}/{}", stats.matched, stats.played);
    }
}

fn show_audit_tail(path: &Path, lines: usize) {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let all: Vec<&str> = contents.lines().collect();
            let start = all.len().saturating_sub(lines);
            for line in &all[start..] {
                println!("{line}");
            }
        }
        Err(_) => println!("No audit log found."),
    }
}

fn render_outcome(outcome: &RoundOutcome, names: (&str, &str)) {
    match outcome {
        RoundOutcome::Completed { matched: true, .. } => {
            println!("{}  Both said yes!", style("██").green());
        }
        RoundOutcome::Completed { matched: false, .. } => {
            println!("{}  At least one said no.", style("██").magenta());
        }
        RoundOutcome::Aborted { reason } => {
            println!("{}  Round aborted: {reason}.", style("!!").yellow());
            return;
        }
    }
    if let RoundOutcome::Completed {
        message_a,
        message_b,
        ..
    } = outcome
    {
        if let Some(message) = message_a {
            println!("{} said: {message}", names.0);
        }
        if let Some(message) = message_b {
            println!("{} said: {message}", names.1);
        }
    }
}

async fn pause() {
    let _ = prompt_line("Press Enter to return to the menu...".to_string()).await;
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let term = Term::stdout();
    let audit = Arc::new(FileAudit::open(AUDIT_FILE));
    let engine = Engine::new("Alice", "Bob", audit);
    let mut source = TerminalSource {
        term: Term::stdout(),
    };
    let mut stats = Stats::load(Path::new(STATS_FILE));

    loop {
        banner(&term);
        print_menu();
        let choice = prompt_line("Select an option >>> ".to_string()).await;

        match choice.as_str() {
            "1" | "2" => {
                let require_message = choice == "2";
                let _ = term.clear_screen();
                if require_message {
                    println!("--- Round with messages ---");
                } else {
                    println!("--- Bit-only round ---");
                }

                let outcome = engine.play_round(&mut source, require_message).await;
                debug!(?outcome, "round finished");
                stats.played += 1;
                if outcome.matched() {
                    stats.matched += 1;
                }
                if let Err(err) = stats.save(Path::new(STATS_FILE)) {
                    println!("{}  could not save stats: {err}", style("!!").yellow());
                }

                render_outcome(&outcome, engine.names());
                pause().await;
            }
            "3" => {
                let _ = term.clear_screen();
                println!("--- Statistics ---");
                show_stats(&stats);
                pause().await;
            }
            "4" => {
                let _ = term.clear_screen();
                println!("--- Audit log (last {AUDIT_TAIL_LINES} lines) ---");
                show_audit_tail(Path::new(AUDIT_FILE), AUDIT_TAIL_LINES);
                pause().await;
            }
            "0" => break,
            _ => {}
        }
    }
}
