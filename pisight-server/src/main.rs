// pisight - camera assistant for the Raspberry Pi
// Press capture to analyse what the camera sees, press mode to pick what to look for

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use pisight_core::Mode;
use pisight_eye::CameraManager;
use pisight_rde::{Dispatcher, Notifier, RemoteClient, TextDetectionType, VisionApiClient};
use pisight_server::{AppConfig, LoggingConfig};
use pisight_spk::{driver_from_config, Feedback, FeedbackPlayer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pisight")]
#[command(about = "Capture-and-dispatch loop for the pisight camera assistant", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON or TOML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Analysis backend base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the button loop until interrupted
    Run {
        /// Read triggers from stdin (c = capture, m = mode, q = quit)
        #[arg(long, short)]
        keyboard: bool,
    },

    /// Take one frame and dispatch it
    Capture {
        /// Mode to dispatch in
        #[arg(long, short, default_value = "text")]
        mode: Mode,

        /// Also write the JPEG here
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Capture only
        #[arg(long)]
        no_dispatch: bool,
    },

    /// Push a message to the companion app
    Notify {
        message: String,

        /// Send to the results path instead of the info path
        #[arg(long)]
        results: bool,
    },

    /// Run Cloud Vision text detection on an image file
    Annotate {
        file: PathBuf,

        /// Use document text detection
        #[arg(long)]
        document: bool,
    },

    /// Sound the buzzer
    Beep {
        /// Number of plain pulses
        #[arg(long, short = 'n', default_value_t = 1)]
        count: u8,

        /// Play the low battery pattern instead
        #[arg(long)]
        low_battery: bool,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Print the built-in defaults instead
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config.logging);

    match cli.command {
        Commands::Run { keyboard } => {
            info!("Starting pisight against {}", config.remote.base_url);
            let stats = pisight_server::run(config, keyboard)
                .await
                .context("capture loop failed")?;
            info!("Shut down after {} events", stats.events);
            // the stdin reader can still be parked on a blocking read
            std::process::exit(0);
        }

        Commands::Capture {
            mode,
            output,
            no_dispatch,
        } => {
            config.validate()?;
            let camera = CameraManager::new(Arc::new(config.camera.clone()))?;
            let image = camera.capture().await.context("capture failed")?;
            println!("Captured {}x{}", image.width(), image.height());

            if let Some(path) = output {
                let jpeg = image.to_jpeg(config.camera.jpeg_quality)?;
                tokio::fs::write(&path, jpeg)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Wrote {}", path.display());
            }

            if !no_dispatch {
                let dispatcher = Dispatcher::from_config(&config.remote, config.camera.jpeg_quality)?;
                let outcome = dispatcher
                    .dispatch(&image, mode)
                    .await
                    .with_context(|| format!("dispatch in {} mode failed", mode))?;
                println!(
                    "{} -> {} (HTTP {}, {} attempt(s), {:?})",
                    outcome.mode, outcome.route, outcome.status, outcome.attempts, outcome.elapsed
                );
            }
        }

        Commands::Notify { message, results } => {
            let client = Arc::new(RemoteClient::new(&config.remote)?);
            let path = if results {
                config.remote.results_path.clone()
            } else {
                config.remote.info_path.clone()
            };
            let notifier = Notifier::new(client, path.clone(), config.remote.notify_faults);
            if !notifier.send_text(&path, &message).await {
                bail!("relay did not accept the message");
            }
            println!("Sent to {}", path);
        }

        Commands::Annotate { file, document } => {
            let jpeg = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let kind = if document {
                TextDetectionType::DocumentTextDetection
            } else {
                TextDetectionType::TextDetection
            };
            let client = VisionApiClient::new(&config.remote.vision_api)?;
            let annotation = client.annotate(&jpeg, kind).await?;
            println!("Inference time: {:.2} sec", annotation.elapsed.as_secs_f64());
            match annotation.text {
                Some(text) => println!("{}", text.trim_end()),
                None => println!("No text found"),
            }
        }

        Commands::Beep { count, low_battery } => {
            config.feedback.validate().map_err(anyhow::Error::msg)?;
            let driver = driver_from_config(&config.feedback)?;
            let player = FeedbackPlayer::new(Arc::new(config.feedback.clone()), driver);
            if low_battery {
                player.play(Feedback::LowBattery).await;
            } else {
                player.beep(count).await;
            }
            println!("Played on {}", player.driver_name());
        }

        Commands::Config { default } => {
            let shown = if default { AppConfig::default() } else { config };
            print!("{}", shown.to_toml()?);
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => AppConfig::default(),
    };
    config.apply_env();

    if let Some(url) = &cli.base_url {
        config.remote.base_url = url.clone();
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    Ok(config)
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}
