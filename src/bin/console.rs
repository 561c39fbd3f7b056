use anyhow::Result;
use crossterm::tty::IsTty;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use narriv::config::{config_path, Config};
use narriv::dashboard::{render, write_panels, Category, HttpReportApi, PhaseTiming, ScanTicket, Session};

const DEFAULT_WIDTH: u16 = 80;

const HELP: &str = "\
Type an asset to scan it, or \"A vs B\" to compare.
  :cat NAME      select asset class (stocks, crypto, predictions, ...)
  :back          return home
  :rescan        scan the report on screen again
  :watch         watch the report on screen
  :unwatch NAME  stop watching an asset
  :open NAME     show a watched asset
  :history N     reopen recent scan N
  :refresh       re-scan every watched asset
  :list          toggle the watchlist panel
  :debug         toggle raw intel
  :dismiss       clear the error banner
  :quit";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = Config::load_or_default(&config_path())?;
    let api = HttpReportApi::new(
        &config.client.proxy_url,
        Duration::from_secs(config.client.timeout_secs),
    )?;
    let session = Session::new(Arc::new(api), PhaseTiming::from_config(&config.client));
    let color = std::io::stdout().is_tty();

    tracing::info!("Using report proxy at {}", config.client.proxy_url);
    println!("{}\n", HELP);
    show(&session, color);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = match line.strip_prefix(':') {
            Some(rest) => {
                let mut parts = rest.splitn(2, ' ');
                (parts.next().unwrap_or(""), parts.next().unwrap_or("").trim())
            }
            None => {
                let ticket = session.dashboard().submit(line);
                run(&session, ticket, color).await;
                continue;
            }
        };

        match command {
            "quit" | "q" => break,
            "help" => println!("{}", HELP),
            "cat" => match arg.parse::<Category>() {
                Ok(category) => session.dashboard().set_category(category),
                Err(e) => println!("{}", e),
            },
            "back" => session.dashboard().back(),
            "rescan" => {
                let ticket = session.dashboard().rescan();
                run(&session, ticket, color).await;
                continue;
            }
            "watch" => {
                if !session.dashboard().watch_current() {
                    println!("Nothing new to watch");
                }
            }
            "unwatch" => {
                if !session.dashboard().remove_watch(arg) {
                    println!("{} is not watched", arg);
                }
            }
            "open" => {
                let ticket = session.dashboard().open_watch(arg);
                run(&session, ticket, color).await;
                continue;
            }
            "history" => match arg.parse::<usize>() {
                Ok(index) if session.dashboard().open_history(index) => {}
                _ => println!("No recent scan {}", arg),
            },
            "refresh" => {
                let processed = session
                    .refresh_watchlist(|entry| {
                        println!("  refreshed {} ({:?})", entry.asset, entry.heat.reading())
                    })
                    .await;
                if processed == 0 {
                    println!("Nothing to refresh");
                }
            }
            "list" => session.dashboard().toggle_watchlist(),
            "debug" => session.dashboard().toggle_debug(),
            "dismiss" => session.dashboard().dismiss_error(),
            other => println!("Unknown command :{} (try :help)", other),
        }
        show(&session, color);
    }

    Ok(())
}

/// Show the scanning view, wait for the reply, then show the outcome.
async fn run(session: &Session, ticket: Option<ScanTicket>, color: bool) {
    if let Some(ticket) = ticket {
        show(session, color);
        session.run(ticket).await;
    }
    show(session, color);
}

fn show(session: &Session, color: bool) {
    let panels = render(&session.dashboard());
    let width = crossterm::terminal::size()
        .ok()
        .filter(|(cols, _)| *cols > 0)
        .map_or(DEFAULT_WIDTH, |(cols, _)| cols);
    if let Err(e) = write_panels(&mut std::io::stdout(), &panels, width, color) {
        tracing::warn!("Failed to draw dashboard: {}", e);
    }
}
