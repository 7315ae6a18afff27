mod audio;
mod audio_api;
mod deck;
mod error;
mod middle;
mod pipeline;
mod render;
mod shared;
mod tui;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use anyhow::Context;
use crossterm::terminal;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;
use tracing_subscriber::EnvFilter;

use audio::AudioDevice;
use deck::{AudioService, SystemClock};
use middle::Middle;
use pipeline::persistence;
use shared::InputEvent;

const USAGE: &str = "usage: tapedeck [project_dir]\n       tapedeck render <mood|ambient> <seconds> <out.wav> [project_dir]";

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("render") => run_render(&args[1..]),
        Some("-h" | "--help") => {
            println!("{USAGE}");
            Ok(())
        }
        other => {
            let project_dir = match other {
                Some(dir) => PathBuf::from(dir),
                None => std::env::current_dir().unwrap_or_default(),
            };
            run_deck(&project_dir)
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn load_config(project_dir: &Path) -> pipeline::config::EngineConfig {
    persistence::load_config(project_dir).unwrap_or_default()
}

// ── offline bounce ────────────────────────────────────────────────

fn run_render(args: &[String]) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();

    let [target, seconds, out, rest @ ..] = args else {
        anyhow::bail!("{USAGE}");
    };
    let seconds: f64 = seconds
        .parse()
        .with_context(|| format!("not a length in seconds: {seconds}"))?;
    let project_dir = rest.first().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    let target = render::RenderTarget::parse(target);
    let summary = render::render_to_wav(target, seconds, Path::new(out), load_config(&project_dir))?;
    eprintln!(
        "wrote {} frames to {} (peak {:.3}, {} voices still sounding)",
        summary.frames, out, summary.peak, summary.voices_at_end
    );
    Ok(())
}

// ── terminal deck ─────────────────────────────────────────────────

fn init_file_logging(project_dir: &Path) -> anyhow::Result<()> {
    // stdout belongs to the terminal UI, so logs go to a file
    let path = persistence::log_file_path(project_dir);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run_deck(project_dir: &Path) -> anyhow::Result<()> {
    init_file_logging(project_dir)?;
    let config = load_config(project_dir);
    info!(dir = %project_dir.display(), "starting tapedeck");

    // the device opens on the first sound, not here
    let factory = || audio::start_audio().map(|handle| Box::new(handle) as Box<dyn AudioDevice>);
    let service = AudioService::new(config, factory, SystemClock::new());
    let mut middle = Middle::new(service);

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = std::time::Duration::from_millis(16); // ~60fps
    let blink_start = Instant::now();
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        let blink_on = (blink_start.elapsed().as_millis() / 250) % 2 == 0;
        let ds = middle.display_state().clone();

        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds, &tui_state, blink_on);
        })?;

        let events = tui::input::poll_input(tick_rate, &mut tui_state)?;
        for event in events {
            if event == InputEvent::Quit {
                // save before quitting
                middle.handle_input(InputEvent::StopLoop);
                if let Err(e) = persistence::save_config(project_dir, &middle.config_to_save()) {
                    tracing::warn!("could not save config: {e:#}");
                }
                drop(term);
                return Ok(());
            }
            middle.handle_input(event);
        }

        middle.tick();
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
