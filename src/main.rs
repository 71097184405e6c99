/// Entry point and playback loop.
///
///   snakegrid demo                 play the built-in demo session
///   snakegrid replay <file>        play a recorded game-channel capture
///   snakegrid record-demo <file>   write the demo session as a capture

mod config;
mod demo;
mod domain;
mod logging;
mod net;
mod sim;
mod sprite;
mod ui;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use config::ClientConfig;
use net::capture::{read_capture, write_capture};
use sim::session::GameSession;
use sprite::cache::SpriteFrameCache;
use sprite::template::TemplateSource;
use ui::canvas::{cell_px_for, dispatch, PixelCanvas};
use ui::input::InputState;
use ui::renderer::Renderer;

#[derive(Parser)]
#[command(version, about = "Terminal client for a multiplayer toroidal-grid snake game", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Play the built-in demo session (default)
    Demo,
    /// Play a recorded game-channel capture
    Replay { file: PathBuf },
    /// Write the demo session as a capture file
    RecordDemo { file: PathBuf },
}

fn main() {
    let command = Cli::parse().command.unwrap_or(Command::Demo);

    let config = ClientConfig::load();
    logging::init(&config.log);
    info!(?command, "snakegrid starting");

    let messages = match load_messages(&command) {
        Ok(Some(messages)) => messages,
        Ok(None) => return,
        Err(e) => {
            error!(error = %e, "startup failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = playback(&messages, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(played) => println!("Played {played} of {} messages.", messages.len()),
        Err(e) => {
            error!(error = %e, "playback ended");
            eprintln!("Playback error: {e}");
            std::process::exit(1);
        }
    }
}

/// Messages to play, or `None` when the command has nothing to show.
fn load_messages(command: &Command) -> Result<Option<Vec<Vec<u8>>>, Box<dyn std::error::Error>> {
    match command {
        Command::Demo => {
            if let Some(game) = demo::join_via_lobby()? {
                info!(name = %game.name, width = game.size.width, height = game.size.height, "demo game joined");
            }
            Ok(Some(demo::script()?))
        }
        Command::Replay { file: path } => {
            let messages = read_capture(path)?;
            info!(path = %path.display(), messages = messages.len(), "capture loaded");
            Ok(Some(messages))
        }
        Command::RecordDemo { file: path } => {
            let messages = demo::script()?;
            write_capture(path, &messages)?;
            println!("Wrote {} messages to {}", messages.len(), path.display());
            Ok(None)
        }
    }
}

fn sprite_source(config: &ClientConfig) -> TemplateSource {
    let Some(path) = &config.sprite_template else {
        return TemplateSource::Procedural;
    };
    match TemplateSource::load(path) {
        Ok(source) => {
            info!(path = %path.display(), "sprite sheet loaded");
            source
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "sprite sheet unusable, using built-in frames");
            TemplateSource::Procedural
        }
    }
}

/// Size the canvas to the terminal, regenerate sprite frames for every
/// hue in use, then redraw the whole world. Runs before the next draw.
fn relayout(session: &GameSession, canvas: &mut PixelCanvas, renderer: &Renderer, border: u32) {
    let Some(world) = session.world() else { return };
    let (area_w, area_h) = renderer.pixel_area();
    let cell_px = cell_px_for(area_w, area_h, world.size(), border);
    canvas.layout(world.size(), cell_px, (area_w, area_h), session.active_hues());
    dispatch(&session.repaint(), canvas);
}

/// Play `messages` in order, paced by the config. Returns how many were
/// applied once the user quits. A corrupt message ends playback.
fn playback(
    messages: &[Vec<u8>],
    renderer: &mut Renderer,
    config: &ClientConfig,
) -> Result<usize, Box<dyn std::error::Error>> {
    let border = config.view.border as u32;
    let frame_sleep = Duration::from_millis(config.view.frame_ms);
    let interval = Duration::from_millis(config.view.event_interval_ms);

    let mut session = GameSession::new();
    let mut canvas = PixelCanvas::new(SpriteFrameCache::new(sprite_source(config), 1), border);
    let mut input = InputState::new();
    let mut next = 0usize;
    let mut last_message: Option<Instant> = None;
    let mut paused = false;

    loop {
        input.drain_events();
        if input.quit_requested() {
            break;
        }
        if input.pause_toggled() {
            paused = !paused;
            info!(paused, "pause toggled");
        }

        if renderer.check_resize()? {
            let (w, h) = renderer.pixel_area();
            info!(w, h, "terminal resized");
            relayout(&session, &mut canvas, renderer, border);
        }

        let due = last_message.map_or(true, |t| t.elapsed() >= interval);
        if !paused && due && next < messages.len() {
            let events = match session.handle(&messages[next]) {
                Ok(events) => events,
                Err(e) => {
                    session.close();
                    return Err(format!("message {}: {e}", next + 1).into());
                }
            };
            next += 1;
            last_message = Some(Instant::now());
            if dispatch(&events, &mut canvas) {
                relayout(&session, &mut canvas, renderer, border);
            }
        }

        let status = status_line(&session, next, messages.len(), paused, canvas.cell_px());
        renderer.present(&canvas, &status)?;
        std::thread::sleep(frame_sleep);
    }

    session.close();
    Ok(next)
}

fn status_line(session: &GameSession, played: usize, total: usize, paused: bool, cell_px: u32) -> String {
    let world = match session.world() {
        Some(w) => {
            let own = w.player(w.self_id()).map_or(0, |p| p.cell_count());
            format!("{} | players {} | perks {} | you {} cells", w.name(), w.players().count(), w.perk_count(), own)
        }
        None => String::from("waiting for game"),
    };
    let state = if paused {
        "PAUSED"
    } else if played == total {
        "finished"
    } else {
        "playing"
    };
    format!(" {world} | {played}/{total} | {state} | cell {cell_px}px | space pause, q quit")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        let argv = std::iter::once("snakegrid").chain(args.iter().copied());
        Cli::try_parse_from(argv).map(|cli| cli.command.unwrap_or(Command::Demo))
    }

    #[test]
    fn commands_parse() {
        assert_eq!(parse(&[]).unwrap(), Command::Demo);
        assert_eq!(parse(&["demo"]).unwrap(), Command::Demo);
        assert_eq!(
            parse(&["replay", "a.cap"]).unwrap(),
            Command::Replay { file: PathBuf::from("a.cap") }
        );
        assert_eq!(
            parse(&["record-demo", "out.cap"]).unwrap(),
            Command::RecordDemo { file: PathBuf::from("out.cap") }
        );
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(parse(&["replay"]).is_err());
        assert!(parse(&["demo", "extra"]).is_err());
        assert!(parse(&["play"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn recorded_demo_replays_identically() {
        let path = std::env::temp_dir().join(format!("snakegrid-demo-{}.cap", std::process::id()));
        let messages = load_messages(&Command::RecordDemo { file: path.clone() }).unwrap();
        assert!(messages.is_none());
        let replayed = load_messages(&Command::Replay { file: path.clone() }).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(replayed, Some(demo::script().unwrap()));
    }

    #[test]
    fn status_reports_progress() {
        let session = GameSession::new();
        let line = status_line(&session, 0, 5, false, 3);
        assert!(line.contains("waiting for game"));
        assert!(line.contains("0/5"));
        assert!(status_line(&session, 5, 5, false, 3).contains("finished"));
        assert!(status_line(&session, 2, 5, true, 3).contains("PAUSED"));
    }
}
