// src/announcer_client.rs
//
// Spectator client that reads out tombola winners as they appear.
//
// Features:
// - Polls the game node in the realtime store and diffs the winners
// - Speaks each new winner through an external TTS program or the console
// - Optional number calls, sound cues and terminal confetti
//
// Interactive Controls:
// - m: mute / unmute
// - ESC, q or Ctrl+C: exit
//
// CLI Options:
// - --gameid: Game ID to follow (default from config, or the only game in the store)
// - --config: Configuration file (default conf/announcer.conf)
// - --mute: Start muted
// - --once: Announce every current winner once and exit (implies --backlog)
// - --backlog: Also announce winners already present when joining
// - --console: Print announcements instead of using the speech program
// - --log-level: Override the configured log level
// - --listgames: List games in the store and exit

use std::error::Error;
use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;

use tombola_announcer::announcer::Announcer;
use tombola_announcer::celebration::{Celebration, NoCelebration, TerminalConfetti};
use tombola_announcer::config::{AnnouncerConfig, DEFAULT_CONFIG_PATH};
use tombola_announcer::dispatcher::AnnouncementDispatcher;
use tombola_announcer::feed::{FeedError, GameFeed};
use tombola_announcer::logging;
use tombola_announcer::player::{AnnouncementPlayer, SoundEffects, SpeechEngine};
use tombola_announcer::speech::{program_on_path, CommandSpeech, ConsoleSpeech, SilentSounds, TerminalBell};
use tombola_announcer::terminal::{self, KeyAction};

#[derive(Parser)]
#[command(name = env!("CARGO_BIN_NAME"))]
#[command(about = "Tombola Announcer - Read out winners as they happen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Game ID to follow
    #[arg(long)]
    gameid: Option<String>,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Start muted
    #[arg(long)]
    mute: bool,

    /// Announce every current winner once and exit (implies --backlog)
    #[arg(long)]
    once: bool,

    /// Announce winners already present when joining
    #[arg(long)]
    backlog: bool,

    /// Print announcements instead of speaking them
    #[arg(long)]
    console: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// List games in the store and exit
    #[arg(long)]
    listgames: bool,
}

fn build_speech(config: &AnnouncerConfig, console: bool) -> Arc<dyn SpeechEngine> {
    if console {
        return Arc::new(ConsoleSpeech::default());
    }
    if program_on_path(&config.speech_program) {
        Arc::new(CommandSpeech::new(&config.speech_program, config.speech_args.clone(), Vec::new()))
    } else {
        log::warn!(
            "Speech program '{}' not found, printing announcements instead",
            config.speech_program
        );
        Arc::new(ConsoleSpeech::default())
    }
}

fn build_announcer(config: &AnnouncerConfig, console: bool) -> Announcer {
    let interactive = std::io::stdout().is_terminal();

    let speech = build_speech(config, console);
    let sounds: Arc<dyn SoundEffects> = if interactive { Arc::new(TerminalBell) } else { Arc::new(SilentSounds) };
    let celebration: Arc<dyn Celebration> = if interactive {
        Arc::new(TerminalConfetti::default())
    } else {
        Arc::new(NoCelebration)
    };

    let player = Arc::new(AnnouncementPlayer::new(speech, sounds, config.player_settings()));
    let dispatcher = AnnouncementDispatcher::from_entropy_seed(config.inter_announcement_delay());
    Announcer::new(player, dispatcher, celebration, config.announce_numbers)
}

/// Whether winners present on the first read are announced
fn announces_backlog(args: &Args, config: &AnnouncerConfig) -> bool {
    args.backlog || args.once || config.announce_backlog
}

/// Pick the game to follow: explicit id, else the only game in the store
async fn discover_game_id(feed: &GameFeed, requested: Option<String>) -> Result<String, Box<dyn Error>> {
    if let Some(game_id) = requested {
        return Ok(game_id);
    }
    let games = feed.list_games().await?;
    match games.as_slice() {
        [] => Err("No games found in the store".into()),
        [only] => Ok(only.clone()),
        _ => Err(format!("Several games found ({}), pick one with --gameid", games.join(", ")).into()),
    }
}

async fn list_games(feed: &GameFeed) -> Result<(), Box<dyn Error>> {
    let games = feed.list_games().await?;
    if games.is_empty() {
        println!("No games found.");
    } else {
        println!("Available games:");
        for game_id in games {
            println!("  {game_id}");
        }
    }
    Ok(())
}

async fn run(args: Args, config: AnnouncerConfig) -> Result<(), Box<dyn Error>> {
    let feed = GameFeed::new(&config)?;

    if args.listgames {
        return list_games(&feed).await;
    }

    feed.test_connection().await?;
    let game_id = discover_game_id(&feed, args.gameid.clone().or_else(|| config.game_id.clone())).await?;
    println!("🎮 Following game ID: {game_id}");

    let mut announcer = build_announcer(&config, args.console);
    if args.mute || config.muted {
        announcer.queue().mute();
    }

    // First read: decide what counts as backlog
    let state = feed.fetch_state(&game_id).await?;
    terminal::show_on_terminal(&game_id, &state, announcer.queue().is_muted());
    if announces_backlog(&args, &config) {
        let events = announcer.on_game_state(state);
        terminal::print_winners(&events);
    } else {
        announcer.prime(&state);
    }

    if args.once {
        announcer.queue().wait_idle().await;
        announcer.shutdown().await;
        return Ok(());
    }

    let (key_tx, mut key_rx) = mpsc::unbounded_channel();
    let stop_keys = Arc::new(AtomicBool::new(false));
    let key_reader = terminal::spawn_key_reader(key_tx, stop_keys.clone());

    terminal::emit(&format!("🔄 Monitoring game (polling every {} seconds)...", config.poll_interval));
    let mut ticker = tokio::time::interval(Duration::from_secs(config.poll_interval));
    // The first tick completes immediately and the state was just read
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match feed.fetch_state(&game_id).await {
                    Ok(state) => {
                        let events = announcer.on_game_state(state);
                        terminal::print_winners(&events);
                    }
                    Err(FeedError::GameNotFound(id)) => {
                        log::warn!("Game '{id}' is gone from the store");
                    }
                    Err(e) => {
                        log::warn!("Failed to read game state: {e}");
                    }
                }
            }
            Some(action) = key_rx.recv() => {
                match action {
                    KeyAction::ToggleMute => {
                        if announcer.toggle_mute() {
                            terminal::emit("🔇 Announcements muted");
                        } else {
                            terminal::emit("🔊 Announcements on");
                        }
                    }
                    KeyAction::Exit => break,
                    KeyAction::None => {}
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    terminal::emit("Exiting the announcer.");
    stop_keys.store(true, Ordering::Relaxed);
    announcer.shutdown().await;
    if let Some(handle) = key_reader {
        let _ = handle.await;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Installed before the config is read so its load messages show up
    logging::init(args.log_level.as_deref().unwrap_or("info"));
    let mut config = AnnouncerConfig::load_from_or_default(&args.config);
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    logging::init(&config.log_level);

    println!("🚀 Tombola Announcer Starting...");

    if let Err(e) = run(args, config).await {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cli: &[&str]) -> Args {
        Args::parse_from(std::iter::once("tombola-announcer").chain(cli.iter().copied()))
    }

    #[test]
    fn test_once_announces_current_winners() {
        let config = AnnouncerConfig::default();
        assert!(announces_backlog(&args(&["--once"]), &config));
        assert!(announces_backlog(&args(&["--backlog"]), &config));
        assert!(!announces_backlog(&args(&[]), &config));
    }

    #[test]
    fn test_config_can_enable_backlog() {
        let config = AnnouncerConfig { announce_backlog: true, ..AnnouncerConfig::default() };
        assert!(announces_backlog(&args(&["--gameid", "g1"]), &config));
    }

    #[test]
    fn test_args_defaults() {
        let parsed = args(&["--log-level", "debug"]);
        assert_eq!(parsed.config, DEFAULT_CONFIG_PATH);
        assert_eq!(parsed.log_level.as_deref(), Some("debug"));
        assert!(parsed.gameid.is_none());
    }
}
