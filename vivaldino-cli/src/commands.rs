use std::path::{Path, PathBuf};
use std::str::FromStr;

use vivaldino_core::settings::Settings;
use vivaldino_core::studio::{ContentType, OperationKind};
use vivaldino_core::voice::{catalog, CATALOG, SUPPORTED_VOICES};
use vivaldino_core::{GenerationRequest, Studio};

pub enum LocalCommandResult {
    Handled {
        msg: String,
    },

    Failed {
        msg: String,
    },

    /// A command to exit the app was detected
    Exit,

    /// The command needs a provider round trip and is run by the caller
    Remote(RemoteCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    GenerateScript,
    Speak,
    Preview(String),
}

pub const HELP: &str = "\
Inputs:
  /type [story|parable|speech]  Show or set the content type
  /theme [text]                 Show or set the theme
  /news [text]                  Show or set the related news text
  /reference [text]             Show or set the reference text
  /inputs                       Show all inputs
  /clear                        Clear all inputs
Script:
  /generate                     Generate a script from the inputs
  /script                       Show the current script
  /edit <text>                  Replace the script
  /load <file>                  Replace the script with a file's contents
  /export [dir]                 Save the script as roteiro-<type>.txt
Narration:
  /voices                       List voices
  /voice [name]                 Show or select the narration voice
  /preview [name]               Hear a short greeting in a voice
  /speak                        Narrate the script and play it
  /play                         Replay the last narration
  /stop                         Stop playback
  /save-audio <file>            Save the last narration as WAV
Other:
  /status                       Show session status
  /help                         Show this help
  /quit                         Exit";

fn handled(msg: impl Into<String>) -> LocalCommandResult {
    LocalCommandResult::Handled { msg: msg.into() }
}

fn failed(msg: impl Into<String>) -> LocalCommandResult {
    LocalCommandResult::Failed { msg: msg.into() }
}

pub fn handle_local_command(studio: &Studio, settings: &Settings, input: &str) -> LocalCommandResult {
    let input = input.trim();
    if !input.starts_with('/') {
        return failed("Commands start with '/'. Type /help to see them.");
    }

    let (command, arg) = match input.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (input, ""),
    };

    match command {
        "/type" => {
            if arg.is_empty() {
                return handled(format!(
                    "Content type: {} (options: {})",
                    studio.request().content_type,
                    content_type_names()
                ));
            }
            match ContentType::from_str(arg) {
                Ok(content_type) => {
                    studio.set_content_type(content_type);
                    handled(format!("Content type set to {content_type}"))
                }
                Err(_) => failed(format!(
                    "Unknown content type '{arg}' (options: {})",
                    content_type_names()
                )),
            }
        }
        "/theme" => text_input(studio, "Theme", arg, |r| &mut r.theme),
        "/news" => text_input(studio, "News", arg, |r| &mut r.news_text),
        "/reference" => text_input(studio, "Reference text", arg, |r| &mut r.model_text),
        "/inputs" => handled(describe_inputs(studio)),
        "/clear" => {
            studio.update_request(|r| {
                r.theme.clear();
                r.news_text.clear();
                r.model_text.clear();
            });
            handled("Inputs cleared")
        }
        "/generate" => LocalCommandResult::Remote(RemoteCommand::GenerateScript),
        "/script" => {
            let script = studio.script();
            if script.trim().is_empty() {
                handled("No script yet. Use /generate, /edit or /load.")
            } else {
                handled(script)
            }
        }
        "/edit" => {
            if arg.is_empty() {
                return failed("Usage: /edit <text>");
            }
            studio.set_script(arg);
            handled(format!("Script replaced ({} characters)", arg.chars().count()))
        }
        "/load" => {
            if arg.is_empty() {
                return failed("Usage: /load <file>");
            }
            match std::fs::read_to_string(arg) {
                Ok(text) => {
                    let chars = text.chars().count();
                    studio.set_script(text);
                    handled(format!("Loaded {chars} characters from {arg}"))
                }
                Err(e) => failed(format!("Failed to read {arg}: {e}")),
            }
        }
        "/export" => {
            let dir = if arg.is_empty() {
                settings.export_dir()
            } else {
                PathBuf::from(arg)
            };
            match studio.export_script(&dir) {
                Ok(path) => handled(format!("Script saved to {}", path.display())),
                Err(e) => failed(e.to_string()),
            }
        }
        "/voices" => handled(describe_voices(studio.voice())),
        "/voice" => {
            if arg.is_empty() {
                return handled(format!("Voice: {}", studio.voice()));
            }
            let voice = studio.select_voice(arg);
            if voice.eq_ignore_ascii_case(arg) {
                handled(format!("Voice set to {voice}"))
            } else {
                handled(format!("Voice '{arg}' is not supported; using {voice}"))
            }
        }
        "/preview" => {
            let voice = if arg.is_empty() {
                studio.voice().to_string()
            } else {
                arg.to_string()
            };
            LocalCommandResult::Remote(RemoteCommand::Preview(voice))
        }
        "/speak" => LocalCommandResult::Remote(RemoteCommand::Speak),
        "/play" => match studio.play_audio() {
            Ok(()) => handled("Playing"),
            Err(e) => failed(e.to_string()),
        },
        "/stop" => {
            let was_playing = studio.is_playing();
            studio.stop_playback();
            if was_playing {
                handled("Playback stopped")
            } else {
                handled("Nothing is playing")
            }
        }
        "/save-audio" => {
            if arg.is_empty() {
                return failed("Usage: /save-audio <file.wav>");
            }
            match studio.export_audio(Path::new(arg)) {
                Ok(()) => handled(format!("Audio saved to {arg}")),
                Err(e) => failed(e.to_string()),
            }
        }
        "/status" => handled(describe_status(studio)),
        "/help" => handled(HELP),
        "/exit" | "/quit" => LocalCommandResult::Exit,
        other => failed(format!("Unknown command {other}. Type /help to see commands.")),
    }
}

fn text_input<F>(studio: &Studio, label: &str, arg: &str, field: F) -> LocalCommandResult
where
    F: FnOnce(&mut GenerationRequest) -> &mut String,
{
    if arg.is_empty() {
        let mut request = studio.request();
        let value = field(&mut request).clone();
        return handled(format!("{label}: {}", or_unset(&value)));
    }
    studio.update_request(|r| *field(r) = arg.to_string());
    handled(format!("{label} set"))
}

fn or_unset(value: &str) -> &str {
    if value.trim().is_empty() {
        "(not set)"
    } else {
        value
    }
}

fn describe_inputs(studio: &Studio) -> String {
    let request = studio.request();
    format!(
        "Type: {}\nTheme: {}\nNews: {}\nReference: {}",
        request.content_type,
        or_unset(&request.theme),
        or_unset(&request.news_text),
        or_unset(&request.model_text),
    )
}

fn describe_voices(selected: &str) -> String {
    let mut lines: Vec<String> = CATALOG
        .iter()
        .map(|profile| {
            let marker = if profile.name == selected { "*" } else { " " };
            format!("{marker} {:<14} {}", profile.name, profile.gender)
        })
        .collect();

    let others: Vec<&str> = SUPPORTED_VOICES
        .iter()
        .copied()
        .filter(|voice| catalog::find_profile(voice).is_none())
        .collect();
    if !others.is_empty() {
        lines.push(format!("Also accepted: {}", others.join(", ")));
    }
    lines.join("\n")
}

fn describe_status(studio: &Studio) -> String {
    let script = studio.script();
    let audio = studio
        .audio()
        .map(|a| format!("{:.1}s", a.duration().as_secs_f32()))
        .unwrap_or_else(|| "none".to_string());

    format!(
        "Type: {}\nVoice: {}\nScript: {} characters\nNarration: {}\nPlayback: {:?}\nScript request: {:?}\nAudio request: {:?}\nPreview request: {:?}",
        studio.request().content_type,
        studio.voice(),
        script.chars().count(),
        audio,
        studio.playback().state(),
        studio.operation_state(OperationKind::Script),
        studio.operation_state(OperationKind::Audio),
        studio.operation_state(OperationKind::Preview),
    )
}

/// Accepted content type names
fn content_type_names() -> String {
    [ContentType::Story, ContentType::Parable, ContentType::Speech]
        .iter()
        .map(|t| format!("{} ({t})", t.slug()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vivaldino_core::ai::mock::{MockBehavior, MockProvider};
    use vivaldino_core::audio::UnavailableOutput;
    use vivaldino_core::StudioConfig;

    fn studio() -> Studio {
        let mock = Arc::new(MockProvider::new(MockBehavior::Success));
        Studio::new(
            mock.clone(),
            mock,
            Arc::new(UnavailableOutput),
            StudioConfig::default(),
        )
    }

    fn message(result: LocalCommandResult) -> String {
        match result {
            LocalCommandResult::Handled { msg } => msg,
            LocalCommandResult::Failed { msg } => panic!("command failed: {msg}"),
            LocalCommandResult::Exit => panic!("unexpected exit"),
            LocalCommandResult::Remote(command) => panic!("unexpected remote {command:?}"),
        }
    }

    #[test]
    fn test_type_accepts_english_and_portuguese() {
        let studio = studio();
        let settings = Settings::default();

        message(handle_local_command(&studio, &settings, "/type parable"));
        assert_eq!(studio.request().content_type, ContentType::Parable);

        message(handle_local_command(&studio, &settings, "/type discurso"));
        assert_eq!(studio.request().content_type, ContentType::Speech);

        assert!(matches!(
            handle_local_command(&studio, &settings, "/type poem"),
            LocalCommandResult::Failed { .. }
        ));
    }

    #[test]
    fn test_inputs_are_set_and_cleared() {
        let studio = studio();
        let settings = Settings::default();

        message(handle_local_command(&studio, &settings, "/theme  A força do perdão "));
        message(handle_local_command(&studio, &settings, "/reference Um texto base"));
        let request = studio.request();
        assert_eq!(request.theme, "A força do perdão");
        assert_eq!(request.model_text, "Um texto base");

        let shown = message(handle_local_command(&studio, &settings, "/theme"));
        assert_eq!(shown, "Theme: A força do perdão");

        message(handle_local_command(&studio, &settings, "/clear"));
        assert!(!studio.request().has_input());
    }

    #[test]
    fn test_voice_selection_reports_fallback() {
        let studio = studio();
        let settings = Settings::default();

        let msg = message(handle_local_command(&studio, &settings, "/voice Nova"));
        assert!(msg.contains("using Kore"));

        let msg = message(handle_local_command(&studio, &settings, "/voice gacrux"));
        assert_eq!(msg, "Voice set to Gacrux");
        assert_eq!(studio.voice(), "Gacrux");
    }

    #[test]
    fn test_remote_commands() {
        let studio = studio();
        let settings = Settings::default();

        assert!(matches!(
            handle_local_command(&studio, &settings, "/generate"),
            LocalCommandResult::Remote(RemoteCommand::GenerateScript)
        ));
        assert!(matches!(
            handle_local_command(&studio, &settings, "/speak"),
            LocalCommandResult::Remote(RemoteCommand::Speak)
        ));
        match handle_local_command(&studio, &settings, "/preview") {
            LocalCommandResult::Remote(RemoteCommand::Preview(voice)) => assert_eq!(voice, "Kore"),
            _ => panic!("expected preview"),
        }
    }

    #[test]
    fn test_export_and_edit() {
        let studio = studio();
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            export_dir: Some(dir.path().to_path_buf()),
            ..Settings::default()
        };

        assert!(matches!(
            handle_local_command(&studio, &settings, "/export"),
            LocalCommandResult::Failed { .. }
        ));

        message(handle_local_command(&studio, &settings, "/edit Era uma vez."));
        message(handle_local_command(&studio, &settings, "/export"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("roteiro-historia.txt")).unwrap(),
            "Era uma vez."
        );
    }

    #[test]
    fn test_load_reads_file() {
        let studio = studio();
        let settings = Settings::default();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("roteiro.txt");
        std::fs::write(&file, "Linha um\nLinha dois").unwrap();

        message(handle_local_command(
            &studio,
            &settings,
            &format!("/load {}", file.display()),
        ));
        assert_eq!(studio.script(), "Linha um\nLinha dois");
    }

    #[test]
    fn test_play_without_audio_fails() {
        let studio = studio();
        let settings = Settings::default();
        assert!(matches!(
            handle_local_command(&studio, &settings, "/play"),
            LocalCommandResult::Failed { .. }
        ));
        message(handle_local_command(&studio, &settings, "/stop"));
    }

    #[test]
    fn test_exit_and_unknown() {
        let studio = studio();
        let settings = Settings::default();
        assert!(matches!(
            handle_local_command(&studio, &settings, "/quit"),
            LocalCommandResult::Exit
        ));
        assert!(matches!(
            handle_local_command(&studio, &settings, "/dance"),
            LocalCommandResult::Failed { .. }
        ));
        assert!(matches!(
            handle_local_command(&studio, &settings, "hello"),
            LocalCommandResult::Failed { .. }
        ));
    }
}
