use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Subcommand, ValueEnum};
use mindfeed_core::feed::{random_interests, seeded_interests};
use mindfeed_core::{
    BreakState, Clock, Config, Event, FeedController, InterestSet, LikeStore, ManualClock, Mode,
    SystemClock,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use super::{emit, emit_all};

#[derive(Subcommand)]
pub enum FeedAction {
    /// Interactive session driven by stdin commands
    Run {
        /// Pacing mode (defaults to the configured mode)
        #[arg(long)]
        mode: Option<Mode>,
        /// Comma-separated topics (defaults to the configured interests)
        #[arg(long)]
        interests: Option<String>,
    },
    /// Scripted run on virtual time
    Simulate {
        #[arg(long)]
        mode: Option<Mode>,
        #[arg(long)]
        interests: Option<String>,
        /// Virtual session length in seconds
        #[arg(long, default_value = "600")]
        duration_secs: u64,
        /// Virtual time between ticks in milliseconds
        #[arg(long, default_value = "500")]
        step_ms: u64,
        /// Request more items every N milliseconds of virtual time
        #[arg(long, default_value = "1000")]
        scroll_every_ms: u64,
        /// Response to a break prompt
        #[arg(long, value_enum, default_value = "take")]
        on_break: BreakResponse,
        /// Stay on the completion screen instead of resuming
        #[arg(long)]
        no_resume: bool,
        /// Seed for random interest selection
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BreakResponse {
    Continue,
    Take,
    Ignore,
}

pub fn run(action: FeedAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    match action {
        FeedAction::Run { mode, interests } => {
            let mode = mode.unwrap_or(config.mode);
            let pinned = interests.as_deref().map(InterestSet::parse_list);
            run_session(&config, mode, pinned)
        }
        FeedAction::Simulate {
            mode,
            interests,
            duration_secs,
            step_ms,
            scroll_every_ms,
            on_break,
            no_resume,
            seed,
        } => {
            let mode = mode.unwrap_or(config.mode);
            let interests = resolve_interests(&config, mode, interests.as_deref(), seed);
            let script = Script {
                duration_ms: duration_secs.saturating_mul(1000),
                step_ms: step_ms.max(1),
                scroll_every_ms: scroll_every_ms.max(1),
                on_break,
                auto_resume: !no_resume,
            };
            simulate(&config, mode, interests, &script)
        }
    }
}

/// Explicit topics win; unrestricted mode may shuffle in a random set;
/// otherwise the configured selection.
fn resolve_interests(
    config: &Config,
    mode: Mode,
    explicit: Option<&str>,
    seed: Option<u64>,
) -> InterestSet {
    if let Some(raw) = explicit {
        return InterestSet::parse_list(raw);
    }
    if mode == Mode::Unrestricted && config.feed.random_unrestricted_interests {
        return match seed {
            Some(seed) => seeded_interests(seed),
            None => random_interests(&mut rand::thread_rng()),
        };
    }
    config.interest_set()
}

// ── Interactive session ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum SessionCommand {
    More,
    Continue,
    Break,
    Resume,
    Status,
    Like(String),
    Liked,
    Mode(Mode),
    Interests(InterestSet),
    Quit,
}

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };
        match (command, arg) {
            ("more", "") => Ok(Self::More),
            ("continue", "") => Ok(Self::Continue),
            ("break", "") => Ok(Self::Break),
            ("resume", "") => Ok(Self::Resume),
            ("status", "") => Ok(Self::Status),
            ("liked", "") => Ok(Self::Liked),
            ("quit" | "exit", "") => Ok(Self::Quit),
            ("like", id) if !id.is_empty() => Ok(Self::Like(id.to_string())),
            ("mode", mode) if !mode.is_empty() => {
                mode.parse::<Mode>().map(Self::Mode).map_err(|e| e.to_string())
            }
            ("interests", raw) => Ok(Self::Interests(InterestSet::parse_list(raw))),
            _ => Err(format!("unknown command: {line}")),
        }
    }
}

fn run_session(
    config: &Config,
    mode: Mode,
    pinned: Option<InterestSet>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = LikeStore::open()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut feed = FeedController::from_config(config, mode, clock)?.with_likes(store.load()?);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(session_loop(&mut feed, config, pinned));

    store.save(&feed.dispose())?;
    result
}

/// `pinned` interests (from `--interests` or the `interests` command) survive
/// mode changes; otherwise each mode resolves its own set.
async fn session_loop(
    feed: &mut FeedController,
    config: &Config,
    mut pinned: Option<InterestSet>,
) -> Result<(), Box<dyn std::error::Error>> {
    let interests = pinned
        .clone()
        .unwrap_or_else(|| resolve_interests(config, feed.mode(), None, None));
    emit_all(feed.set_interests(interests))?;

    let mut ticker = tokio::time::interval(Duration::from_millis(config.feed.tick_interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut liked_only = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => emit_all(feed.tick())?,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match line.parse::<SessionCommand>() {
                    Ok(command) => command,
                    Err(message) => {
                        eprintln!("{message}");
                        continue;
                    }
                };
                tracing::debug!(?command, "session command");
                match command {
                    SessionCommand::Quit => break,
                    SessionCommand::Liked => {
                        liked_only = !liked_only;
                        feed.set_liked_only(liked_only);
                        emit(&feed.snapshot())?;
                    }
                    SessionCommand::Mode(mode) => {
                        emit_all(feed.set_mode(mode, config.policy(mode)?))?;
                        let interests = pinned
                            .clone()
                            .unwrap_or_else(|| resolve_interests(config, mode, None, None));
                        emit_all(feed.set_interests(interests))?;
                    }
                    SessionCommand::Interests(interests) => {
                        pinned = Some(interests.clone());
                        emit_all(feed.set_interests(interests))?;
                    }
                    other => emit_all(apply(feed, other))?,
                }
            }
        }
    }
    Ok(())
}

/// Commands that need nothing beyond the controller.
fn apply(feed: &mut FeedController, command: SessionCommand) -> Vec<Event> {
    match command {
        SessionCommand::More => feed.request_more().into_iter().collect(),
        SessionCommand::Continue => feed.continue_feed(),
        SessionCommand::Break => feed.take_break().into_iter().collect(),
        SessionCommand::Resume => feed.resume().into_iter().collect(),
        SessionCommand::Status => vec![feed.snapshot()],
        SessionCommand::Like(id) => match feed.toggle_like(&id) {
            Some(event) => vec![event],
            None => {
                eprintln!("no such item: {id}");
                Vec::new()
            }
        },
        SessionCommand::Liked
        | SessionCommand::Mode(_)
        | SessionCommand::Interests(_)
        | SessionCommand::Quit => Vec::new(),
    }
}

// ── Simulation ───────────────────────────────────────────────────────

struct Script {
    duration_ms: u64,
    step_ms: u64,
    scroll_every_ms: u64,
    on_break: BreakResponse,
    auto_resume: bool,
}

fn simulate(
    config: &Config,
    mode: Mode,
    interests: InterestSet,
    script: &Script,
) -> Result<(), Box<dyn std::error::Error>> {
    let clock = ManualClock::new(0);
    let mut feed = FeedController::from_config(config, mode, Arc::new(clock.clone()))?;
    emit_all(feed.set_interests(interests))?;

    let mut next_scroll_at = script.scroll_every_ms;
    while clock.now_ms() < script.duration_ms {
        clock.advance(script.step_ms);
        let now = clock.now_ms();

        let mut events = feed.tick();
        match feed.break_state() {
            BreakState::AwaitingChoice => match script.on_break {
                BreakResponse::Continue => events.extend(feed.continue_feed()),
                BreakResponse::Take => events.extend(feed.take_break()),
                BreakResponse::Ignore => {}
            },
            BreakState::Completed if script.auto_resume => events.extend(feed.resume()),
            _ => {}
        }
        if now >= next_scroll_at {
            events.extend(feed.request_more());
            next_scroll_at = now + script.scroll_every_ms;
        }
        emit_all(events)?;
    }

    emit(&feed.snapshot())?;
    feed.dispose();
    Ok(())
}
