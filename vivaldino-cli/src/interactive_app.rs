use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::future::Future;
use tokio::signal;
use tracing::{info, warn};
use vivaldino_core::studio::StudioError;

use crate::commands::{handle_local_command, LocalCommandResult, RemoteCommand};
use crate::formatter::Formatter;
use crate::session::{Session, SessionOptions};
use crate::spinner::Spinner;

pub struct InteractiveApp {
    session: Session,
    formatter: Formatter,
}

impl InteractiveApp {
    pub fn new(options: SessionOptions) -> Result<Self> {
        let session = Session::open(options)?;
        let formatter = Formatter::new();

        formatter.print_system(&format!(
            "Using provider '{}' with settings from {}",
            session.provider_name,
            session.settings.path().display()
        ));
        formatter.print_system(
            "💡 Set /theme, /news or /reference, then /generate and /speak. /help for commands, /quit to exit",
        );

        Ok(Self { session, formatter })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new()?;

        loop {
            let line = match rl.readline(&self.formatter.prompt()) {
                Ok(line) => line,
                Err(err) => match err {
                    ReadlineError::Interrupted => {
                        continue;
                    }
                    _ => break,
                },
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            rl.add_history_entry(&line)?;

            let settings = self.session.settings.settings();
            match handle_local_command(&self.session.studio, &settings, input) {
                LocalCommandResult::Handled { msg } => self.formatter.print_system(&msg),
                LocalCommandResult::Failed { msg } => self.formatter.print_error(&msg),
                LocalCommandResult::Exit => break,
                LocalCommandResult::Remote(command) => self.run_remote(command).await,
            }
        }

        self.session.studio.stop_playback();
        println!("\nGoodbye!");
        Ok(())
    }

    async fn run_remote(&self, command: RemoteCommand) {
        let studio = &self.session.studio;
        info!(?command, "Running remote command");

        match command {
            RemoteCommand::GenerateScript => {
                let result =
                    cancellable("Writing script...", studio.generate_script()).await;
                match result {
                    Some(Ok(script)) => {
                        let title = studio.request().content_type.to_string();
                        self.formatter.print_script(&title, &script);
                    }
                    Some(Err(e)) => self.report(e),
                    None => self.formatter.print_system("Script generation cancelled"),
                }
            }
            RemoteCommand::Speak => {
                let result = cancellable(
                    &format!("Narrating with {}...", studio.voice()),
                    studio.generate_audio(),
                )
                .await;
                match result {
                    Some(Ok(audio)) => self.formatter.print_system(&format!(
                        "Playing {:.1}s of narration. /stop to stop, /play to replay",
                        audio.duration().as_secs_f32()
                    )),
                    Some(Err(e)) => self.report(e),
                    None => self.formatter.print_system("Narration cancelled"),
                }
            }
            RemoteCommand::Preview(voice) => {
                let result = cancellable(
                    &format!("Preparing a sample of {voice}..."),
                    studio.preview_voice(&voice),
                )
                .await;
                match result {
                    Some(Ok(_)) => self.formatter.print_system("Playing voice sample"),
                    Some(Err(e)) => self.report(e),
                    None => self.formatter.print_system("Preview cancelled"),
                }
            }
        }
    }

    fn report(&self, error: StudioError) {
        warn!(error = ?error, "Command failed");
        match &error {
            StudioError::Playback(_) if self.session.studio.audio().is_some() => {
                self.formatter.print_error(&format!(
                    "{error}. The narration was kept; use /save-audio <file.wav> to keep it"
                ));
            }
            _ => self.formatter.print_error(&error.to_string()),
        }
    }
}

/// Run `future` under a spinner until it completes or Ctrl-C is pressed.
/// Returns `None` when cancelled.
async fn cancellable<T>(message: &str, future: impl Future<Output = T>) -> Option<T> {
    let _spinner = Spinner::start(message);
    tokio::select! {
        result = future => Some(result),
        _ = signal::ctrl_c() => {
            info!("Request cancelled by user");
            None
        }
    }
}
