//! Lichess Assistant Binary
//!
//! `watch` follows live games: JSON commands on stdin, JSON replies and
//! notifications on stdout, logs on stderr. The other subcommands are
//! one-shot lookups for humans.

use chessassist::archive::Archive;
use chessassist::archive::Dataset;
use chessassist::archive::GameRecord;
use chessassist::archive::Statistics;
use chessassist::board::Boards;
use chessassist::bus::Bus;
use chessassist::bus::Notification;
use chessassist::config::Settings;
use chessassist::credential::Credential;
use chessassist::credential::FileStorage;
use chessassist::engine::Evaluator;
use chessassist::engine::StockfishOnline;
use chessassist::incoming::Events;
use chessassist::lichess::HttpStreamer;
use chessassist::lichess::Streamer;
use chessassist::monitor::Command;
use chessassist::monitor::Monitor;
use chessassist::monitor::Reply;
use chessassist::throttle::Analyzer;
use chessassist::throttle::Throttle;
use chessassist::tracker::Rules;
use chessassist::tracker::Standard;
use chessassist::*;
use clap::Parser;
use clap::Subcommand;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::sync::broadcast;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, env = "LICHESS_URL", default_value = LICHESS_URL)]
    lichess_url: String,
    #[arg(long, env = "ENGINE_URL", default_value = ENGINE_URL)]
    engine_url: String,
    #[arg(long, env = "CHESSASSIST_STORAGE", default_value = STORAGE_PATH)]
    storage: PathBuf,
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    #[command(about = "Follow live games and stream engine suggestions")]
    Watch {
        #[arg(long, default_value_t = DEFAULT_DEPTH)]
        depth: u8,
    },
    #[command(about = "Evaluate a single position", alias = "eval")]
    Analyze {
        #[arg(long, required = true)]
        fen: String,
        #[arg(long, default_value_t = DEFAULT_DEPTH)]
        depth: u8,
        #[arg(long, help = "Shallow search, overrides --depth")]
        quick: bool,
    },
    #[command(about = "Store or clear the API token")]
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    #[command(about = "Show a public profile")]
    Profile {
        #[arg(required = true)]
        username: String,
    },
    #[command(about = "Summarize recent games of a player")]
    Games {
        #[arg(required = true)]
        username: String,
        #[arg(long, default_value_t = 100)]
        max: usize,
    },
    #[command(about = "Suggest a move in a player's game in progress")]
    Current {
        #[arg(required = true)]
        username: String,
        #[arg(long, default_value_t = CURRENT_DEPTH)]
        depth: u8,
    },
    #[command(about = "Export recent games as a training dataset")]
    Dataset {
        #[arg(required = true, num_args = 1..)]
        usernames: Vec<String>,
        #[arg(long, default_value_t = 100)]
        max: usize,
        #[arg(long, help = "Features/labels layout instead of raw records")]
        training: bool,
        #[arg(long, help = "Write to a file instead of stdout")]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    #[command(about = "Save a token; prompts when none is given")]
    Set {
        #[arg(env = "LICHESS_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log();
    let args = Args::parse();
    let settings = Settings {
        lichess_url: args.lichess_url,
        engine_url: args.engine_url,
        storage: args.storage,
        ..Settings::default()
    };
    match args.action {
        Action::Watch { depth } => watch(settings.with_depth(depth)).await,
        Action::Analyze { fen, depth, quick } => {
            let depth = if quick { QUICK_DEPTH } else { depth };
            analyze(&settings.with_depth(depth), &fen).await
        }
        Action::Token { action } => token(&settings, action),
        Action::Profile { username } => profile(&settings, &username).await,
        Action::Games { username, max } => games(&settings, &username, max).await,
        Action::Current { username, depth } => {
            current(&settings.with_depth(depth), &username).await
        }
        Action::Dataset {
            usernames,
            max,
            training,
            out,
        } => dataset(&settings, &usernames, max, training, out).await,
    }
}

async fn watch(settings: Settings) -> anyhow::Result<()> {
    let credential = Credential::load(Arc::new(FileStorage::new(settings.storage.clone())))?;
    let follower = credential.follow(STORAGE_POLL);
    let streamer: Arc<dyn Streamer> = Arc::new(HttpStreamer::new(&settings.lichess_url));
    let bus = Bus::default();
    let evaluator = Arc::new(StockfishOnline::new(&settings.engine_url));
    let analyzer = Arc::new(Analyzer::new(evaluator, bus.clone(), settings.depth));
    let throttle = Throttle::new(analyzer, settings.interval);
    let boards = Boards::new(credential.clone(), streamer.clone(), throttle, bus.clone());
    let events = Events::new(credential.clone(), streamer, boards.clone(), bus.clone());
    let monitor = Monitor::new(credential, boards, events);
    let printer = tokio::spawn(relay(bus.subscribe()));
    let watcher = monitor.launch().await;
    let mut stdin = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                log::warn!("interrupt received, stopping");
                break;
            }
            line = stdin.next_line() => match line? {
                None => break,
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => {
                    let reply = match Command::try_from(line.as_str()) {
                        Ok(command) => monitor.handle(command).await,
                        Err(e) => Reply::Error { message: e.to_string() },
                    };
                    emit(&reply)?;
                }
            },
        }
    }
    follower.abort();
    watcher.abort();
    monitor.stop().await;
    tokio::task::yield_now().await;
    printer.abort();
    Ok(())
}

/// Copy every notification to stdout as one JSON line.
async fn relay(mut rx: broadcast::Receiver<Notification>) {
    loop {
        match rx.recv().await {
            Ok(notification) => {
                if let Err(e) = emit(&notification) {
                    log::error!("could not write notification: {}", e);
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                log::warn!("stdout fell behind, {} notifications dropped", n)
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn emit<T: Serialize>(message: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, message)?;
    writeln!(stdout)?;
    Ok(stdout.flush()?)
}

async fn analyze(settings: &Settings, fen: &str) -> anyhow::Result<()> {
    Standard::default().load(fen)?;
    let evaluation = StockfishOnline::new(&settings.engine_url)
        .evaluate(fen, settings.depth)
        .await?;
    println!(
        "{:<8}{}",
        "best".bold(),
        evaluation.best_move.as_deref().unwrap_or("-").green()
    );
    if let Some(ponder) = evaluation.ponder.as_deref() {
        println!("{:<8}{}", "ponder".bold(), ponder);
    }
    match evaluation.score {
        Some(score) => println!("{:<8}{}", "eval".bold(), score.to_string().cyan()),
        None => println!("{:<8}-", "eval".bold()),
    }
    if let Some(pv) = evaluation.pv.as_deref() {
        println!("{:<8}{}", "line".bold(), pv.dimmed());
    }
    Ok(())
}

fn token(settings: &Settings, action: TokenAction) -> anyhow::Result<()> {
    let credential = Credential::load(Arc::new(FileStorage::new(settings.storage.clone())))?;
    match action {
        TokenAction::Set { token } => {
            let token = match token {
                Some(token) => token,
                None => dialoguer::Password::new()
                    .with_prompt("Lichess API token")
                    .interact()?,
            };
            match credential.set(token)? {
                true => println!("{}", "token saved".green()),
                false => println!("{}", "token unchanged".dimmed()),
            }
        }
        TokenAction::Clear => match credential.clear()? {
            true => println!("{}", "token cleared".yellow()),
            false => println!("{}", "no token stored".dimmed()),
        },
    }
    Ok(())
}

async fn profile(settings: &Settings, username: &str) -> anyhow::Result<()> {
    let profile = Archive::new(&settings.lichess_url).profile(username).await?;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

async fn games(settings: &Settings, username: &str, max: usize) -> anyhow::Result<()> {
    let records = Archive::new(&settings.lichess_url)
        .games(username, max)
        .await?
        .iter()
        .map(GameRecord::from)
        .collect::<Vec<GameRecord>>();
    let stats = Statistics::from(records.as_slice());
    println!("{} {}", "games".bold(), stats.total_games);
    println!(
        "{} {} / {} / {}",
        "w/l/d".bold(),
        stats.wins.to_string().green(),
        stats.losses.to_string().red(),
        stats.draws
    );
    println!("{} {}", "win rate".bold(), stats.win_rate);
    println!(
        "{} {}",
        "avg opponent".bold(),
        stats.average_opponent_rating
    );
    for (speed, n) in stats.by_speed.iter() {
        println!("  {:<16}{:>4}", speed, n);
    }
    for (variant, n) in stats.by_variant.iter() {
        println!("  {:<16}{:>4}", variant.dimmed(), n);
    }
    Ok(())
}

async fn current(settings: &Settings, username: &str) -> anyhow::Result<()> {
    let game = Archive::new(&settings.lichess_url)
        .current_game(username)
        .await?;
    println!("{:<8}{}", "fen".bold(), game.fen.dimmed());
    let evaluator = StockfishOnline::new(&settings.engine_url);
    let suggestion = game.analyze(&evaluator, settings.depth).await?;
    println!(
        "{:<8}{}",
        "best".bold(),
        suggestion.analysis.best_move.as_deref().unwrap_or("-").green()
    );
    if let Some(score) = suggestion.analysis.score.as_ref() {
        println!("{:<8}{}", "eval".bold(), score.to_string().cyan());
    }
    if let Some(depth) = suggestion.analysis.depth {
        println!("{:<8}{}", "depth".bold(), depth);
    }
    Ok(())
}

async fn dataset(
    settings: &Settings,
    usernames: &[String],
    max: usize,
    training: bool,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let archive = Archive::new(&settings.lichess_url);
    let dataset: Dataset = match usernames {
        [username] => archive.dataset(username, max).await?,
        _ => archive.batch(usernames, max).await,
    };
    let text = match training {
        true => serde_json::to_string_pretty(&dataset.training(&usernames.join(",")))?,
        false => dataset.export()?,
    };
    match out {
        Some(path) => {
            std::fs::write(&path, text)?;
            eprintln!(
                "{} {} samples to {}",
                "wrote".green(),
                dataset.dataset.total_samples,
                path.display()
            );
        }
        None => println!("{}", text),
    }
    Ok(())
}
