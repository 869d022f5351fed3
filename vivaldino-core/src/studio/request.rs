use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Upper bound on characters sent for speech synthesis
pub const MAX_SPEECH_CHARS: usize = 5000;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum ContentType {
    #[default]
    #[strum(to_string = "História", serialize = "story", serialize = "historia")]
    Story,
    #[strum(to_string = "Parábola", serialize = "parable", serialize = "parabola")]
    Parable,
    #[strum(to_string = "Discurso", serialize = "speech", serialize = "discurso")]
    Speech,
}

impl ContentType {
    /// ASCII form of the label, used in export file names
    pub fn slug(&self) -> &'static str {
        match self {
            ContentType::Story => "historia",
            ContentType::Parable => "parabola",
            ContentType::Speech => "discurso",
        }
    }

    pub fn script_file_name(&self) -> String {
        format!("roteiro-{}.txt", self.slug())
    }
}

/// User inputs for one script generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub content_type: ContentType,
    #[serde(default)]
    pub theme: String,
    /// Related news text
    #[serde(default)]
    pub news_text: String,
    /// Reference text whose style the script may follow
    #[serde(default)]
    pub model_text: String,
}

impl GenerationRequest {
    /// True when at least one of theme, news text or model text has content
    pub fn has_input(&self) -> bool {
        [&self.theme, &self.news_text, &self.model_text]
            .iter()
            .any(|field| !field.trim().is_empty())
    }

    pub fn build_prompt(&self) -> String {
        let theme = or_placeholder(&self.theme, "Não especificado");
        let news = or_placeholder(&self.news_text, "Nenhuma");
        let model = or_placeholder(&self.model_text, "Nenhum");

        format!(
            "Aja como um roteirista profissional.\n\
             Crie um(a) {content_type} profundo, reflexivo, claro e envolvente.\n\
             Linguagem: Português (Brasil), acessível mas elegante.\n\
             Estrutura: Lógica e com mensagem impactante.\n\
             Tom: Inspirador e educativo.\n\
             \n\
             Informações Base:\n\
             - Tema: {theme}\n\
             - Notícia Relacionada: {news}\n\
             - Texto Modelo/Referência: {model}\n\
             \n\
             Instruções Adicionais:\n\
             Foque na essência do tema e crie uma narrativa que conecte emocionalmente com o público.",
            content_type = self.content_type,
        )
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder
    } else {
        trimmed
    }
}

/// Instruction wrapped around text sent for synthesis
pub fn speech_prompt(text: &str) -> String {
    format!("Say with a natural and expressive tone: {text}")
}

/// Greeting used to audition a voice
pub fn preview_text(voice: &str) -> String {
    format!("Olá! Eu sou a voz {voice}. Estou pronta para dar vida ao seu roteiro.")
}

/// Keep at most `max_chars` characters, never splitting one
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_content_type_parses_both_languages() {
        assert_eq!(ContentType::from_str("story").unwrap(), ContentType::Story);
        assert_eq!(ContentType::from_str("PARABLE").unwrap(), ContentType::Parable);
        assert_eq!(ContentType::from_str("discurso").unwrap(), ContentType::Speech);
        assert_eq!(ContentType::from_str("Parábola").unwrap(), ContentType::Parable);
        assert!(ContentType::from_str("poem").is_err());
    }

    #[test]
    fn test_display_is_the_portuguese_label() {
        assert_eq!(ContentType::Story.to_string(), "História");
        assert_eq!(ContentType::Parable.to_string(), "Parábola");
        assert_eq!(ContentType::Speech.to_string(), "Discurso");
    }

    #[test]
    fn test_file_names_are_ascii() {
        for content_type in ContentType::iter() {
            let name = content_type.script_file_name();
            assert!(name.is_ascii(), "{name}");
            assert!(name.starts_with("roteiro-"));
        }
        assert_eq!(ContentType::Speech.script_file_name(), "roteiro-discurso.txt");
    }

    #[test]
    fn test_has_input_ignores_whitespace() {
        let mut request = GenerationRequest::default();
        assert!(!request.has_input());
        request.news_text = "   \n".into();
        assert!(!request.has_input());
        request.model_text = "texto".into();
        assert!(request.has_input());
    }

    #[test]
    fn test_prompt_embeds_inputs_and_placeholders() {
        let request = GenerationRequest {
            content_type: ContentType::Parable,
            theme: "  Gratidão ".into(),
            news_text: String::new(),
            model_text: String::new(),
        };
        let prompt = request.build_prompt();
        assert!(prompt.contains("Crie um(a) Parábola profundo"));
        assert!(prompt.contains("- Tema: Gratidão\n"));
        assert!(prompt.contains("- Notícia Relacionada: Nenhuma\n"));
        assert!(prompt.contains("- Texto Modelo/Referência: Nenhum\n"));
        assert!(prompt.starts_with("Aja como um roteirista profissional.\n"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("ação", 2), "aç");
        assert_eq!(truncate_chars("curto", 10), "curto");
        let long = "é".repeat(MAX_SPEECH_CHARS + 10);
        assert_eq!(truncate_chars(&long, MAX_SPEECH_CHARS).chars().count(), MAX_SPEECH_CHARS);
    }

    #[test]
    fn test_preview_text_names_voice() {
        assert_eq!(
            preview_text("Gacrux"),
            "Olá! Eu sou a voz Gacrux. Estou pronta para dar vida ao seu roteiro."
        );
    }
}
