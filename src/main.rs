use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::Rng;
use tracing_subscriber::EnvFilter;

use circular_progress::{
    AttributeSet, CircularProgressBar, ProgressAnimationListener, ProgressBarConfig,
    ProgressCommand, ProgressWindow,
};

#[derive(Parser)]
#[command(name = "circular-progress")]
#[command(about = "Circular arc progress bar in a window", long_about = None)]
struct Cli {
    /// Attribute file (TOML) to configure the bar from
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// TTF/OTF font for the title and subtitle
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Title text drawn in the middle of the ring
    #[arg(long)]
    title: Option<String>,

    /// Subtitle text drawn below the title
    #[arg(long)]
    subtitle: Option<String>,

    /// Initial progress value
    #[arg(short, long)]
    progress: Option<i32>,

    /// Read progress values from stdin, one integer per line
    #[arg(long)]
    stdin: bool,

    /// Drive the bar with random animations
    #[arg(long)]
    demo: bool,

    /// Animate from START to END once the window opens
    #[arg(long, num_args = 2, value_names = ["START", "END"], allow_negative_numbers = true)]
    animate: Option<Vec<i32>>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate an attribute file, then print the resolved values
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Reports animation milestones to the log.
struct LogProgress;

impl ProgressAnimationListener for LogProgress {
    fn on_animation_start(&mut self) {
        tracing::debug!("animation started");
    }

    fn on_animation_finish(&mut self) {
        tracing::debug!("animation finished");
    }

    fn on_animation_progress(&mut self, progress: i32) {
        tracing::trace!(progress, "animation step");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Check { file }) = &cli.command {
        return check(file);
    }

    run(cli)
}

fn check(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    config
        .validate()
        .with_context(|| format!("invalid attribute file {}", path.display()))?;
    println!("{} is valid", path.display());
    println!("{:#?}", config);
    Ok(())
}

fn load_config(path: &Path) -> Result<ProgressBarConfig> {
    let attributes = AttributeSet::load(path)
        .with_context(|| format!("failed to read attribute file {}", path.display()))?;
    let config = attributes
        .into_config()
        .with_context(|| format!("failed to resolve attributes in {}", path.display()))?;
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProgressBarConfig::default(),
    };
    if let Some(font) = cli.font {
        config.font_path = Some(font);
    }
    if let Some(title) = cli.title {
        config.title = Some(title);
    }
    if let Some(subtitle) = cli.subtitle {
        config.subtitle = Some(subtitle);
    }
    if let Some(progress) = cli.progress {
        config.progress = progress;
    }
    config.validate().context("invalid configuration")?;

    let mut bar = CircularProgressBar::new(&config);
    bar.set_animation_listener(LogProgress);
    if let Some(&[start, end]) = cli.animate.as_deref() {
        bar.animate_progress_to(start, end);
    }

    let max_progress = bar.max_progress();
    let window = ProgressWindow::new(bar, config);

    if !cli.stdin && !cli.demo {
        window.show()?;
        return Ok(());
    }

    let (sender, receiver) = mpsc::channel();
    if cli.stdin {
        let sender = sender.clone();
        thread::spawn(move || read_progress_lines(sender));
    }
    if cli.demo {
        let sender = sender.clone();
        thread::spawn(move || run_demo(sender, max_progress));
    }
    drop(sender);

    window.show_with_commands(receiver)?;
    Ok(())
}

fn read_progress_lines(sender: Sender<ProgressCommand>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                tracing::warn!(%error, "stopped reading stdin");
                break;
            }
        };
        let value = line.trim();
        if value.is_empty() {
            continue;
        }
        match value.parse::<i32>() {
            Ok(progress) => {
                if sender.send(ProgressCommand::SetProgress(progress)).is_err() {
                    break;
                }
            }
            Err(_) => tracing::warn!(line = value, "ignoring non-integer progress value"),
        }
    }
}

fn run_demo(sender: Sender<ProgressCommand>, max_progress: i32) {
    let mut rng = rand::rng();
    let mut current = 0;
    loop {
        let target = rng.random_range(0..=max_progress.max(1));
        let commands = [
            ProgressCommand::AnimateTo {
                start: current,
                end: target,
            },
            ProgressCommand::SetTitle(percent_label(target, max_progress)),
            ProgressCommand::SetEnabled(rng.random_range(0..10) != 0),
        ];
        if commands.into_iter().any(|command| sender.send(command).is_err()) {
            break;
        }
        current = target;
        thread::sleep(Duration::from_millis(1500));
    }
}

/// `progress` as a whole percentage of `max_progress`.
fn percent_label(progress: i32, max_progress: i32) -> String {
    let percent = i64::from(progress) * 100 / i64::from(max_progress.max(1));
    format!("{percent}%")
}
