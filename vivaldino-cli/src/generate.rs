use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::signal;
use tracing::info;
use vivaldino_core::ContentType;

use crate::formatter::Formatter;
use crate::session::{Session, SessionOptions};
use crate::spinner::Spinner;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Content type: story, parable or speech
    #[arg(long = "type", value_name = "TYPE", default_value = "story")]
    pub content_type: ContentType,

    /// Theme of the script
    #[arg(long)]
    pub theme: Option<String>,

    /// Related news text
    #[arg(long)]
    pub news: Option<String>,

    /// Reference text whose style the script may follow
    #[arg(long)]
    pub reference: Option<String>,

    /// Read the reference text from a file
    #[arg(long, value_name = "FILE", conflicts_with = "reference")]
    pub reference_file: Option<PathBuf>,

    /// Narration voice
    #[arg(long)]
    pub voice: Option<String>,

    /// Narrate the script and play it
    #[arg(long)]
    pub speak: bool,

    /// Save the script as roteiro-<type>.txt in this directory
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// Save the narration as a WAV file
    #[arg(long, value_name = "FILE")]
    pub wav: Option<PathBuf>,
}

pub async fn run(options: SessionOptions, args: GenerateArgs) -> Result<()> {
    let session = Session::open(options)?;
    let studio = &session.studio;
    let formatter = Formatter::new();

    let reference = match &args.reference_file {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => args.reference.clone(),
    };
    studio.update_request(|r| {
        r.content_type = args.content_type;
        r.theme = args.theme.clone().unwrap_or_default();
        r.news_text = args.news.clone().unwrap_or_default();
        r.model_text = reference.unwrap_or_default();
    });

    if let Some(voice) = &args.voice {
        let selected = studio.select_voice(voice);
        if !selected.eq_ignore_ascii_case(voice) {
            formatter.print_system(&format!(
                "Voice '{voice}' is not supported; using {selected}"
            ));
        }
    }

    info!(content_type = %args.content_type, provider = %session.provider_name, "One-shot generation");
    let script = {
        let _spinner = Spinner::start("Writing script...");
        studio.generate_script().await?
    };
    formatter.print_script(&args.content_type.to_string(), &script);

    if let Some(dir) = &args.export {
        let path = studio.export_script(dir)?;
        formatter.print_system(&format!("Script saved to {}", path.display()));
    }

    if !args.speak && args.wav.is_none() {
        return Ok(());
    }

    let audio = {
        let _spinner = Spinner::start(&format!("Narrating with {}...", studio.voice()));
        studio.narrate().await?
    };

    if let Some(path) = &args.wav {
        studio.export_audio(path)?;
        formatter.print_system(&format!("Audio saved to {}", path.display()));
    }

    if args.speak {
        studio.play_audio()?;
        formatter.print_system(&format!(
            "Playing {:.1}s of narration (Ctrl-C to stop)",
            audio.duration().as_secs_f32()
        ));
        tokio::select! {
            _ = studio.playback().wait_until_idle() => {}
            _ = signal::ctrl_c() => {
                studio.stop_playback();
                formatter.print_system("Playback stopped");
            }
        }
    }

    Ok(())
}
