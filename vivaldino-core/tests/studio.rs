
use std::time::Duration;

use fixture::Fixture;
use vivaldino_core::ai::mock::{MockBehavior, MOCK_AUDIO_FRAMES, MOCK_SCRIPT};
use vivaldino_core::studio::{ContentType, OperationKind, OperationState, StudioError};

#[tokio::test]
async fn test_script_requires_some_input() {
    let fixture = Fixture::new();
    fixture
        .studio
        .update_request(|r| r.theme = "   ".to_string());

    let result = fixture.studio.generate_script().await;

    assert!(matches!(result, Err(StudioError::Validation(_))));
    assert_eq!(fixture.mock.get_call_count(), 0);
    assert_eq!(
        fixture.studio.operation_state(OperationKind::Script),
        OperationState::Idle
    );
}

#[tokio::test]
async fn test_script_generation_stores_script() {
    let fixture = Fixture::new();
    fixture.studio.update_request(|r| {
        r.content_type = ContentType::Speech;
        r.news_text = "Chuvas no litoral".to_string();
    });

    let script = fixture.studio.generate_script().await.unwrap();

    assert_eq!(script, MOCK_SCRIPT);
    assert_eq!(fixture.studio.script(), MOCK_SCRIPT);
    assert_eq!(
        fixture.studio.operation_state(OperationKind::Script),
        OperationState::Succeeded
    );

    let request = fixture.mock.get_last_captured_request().unwrap();
    assert_eq!(request.model, "gemini-3-flash-preview");
    assert_eq!(request.sampling.top_k, 40);
    assert!(request.prompt.contains("Crie um(a) Discurso"));
    assert!(request.prompt.contains("- Notícia Relacionada: Chuvas no litoral"));
    assert!(request.prompt.contains("- Tema: Não especificado"));
}

#[tokio::test]
async fn test_failure_keeps_previous_script() {
    let fixture = Fixture::with_mock_behavior(MockBehavior::BehaviorQueue {
        behaviors: vec![
            MockBehavior::Text {
                text: "Primeiro roteiro".to_string(),
            },
            MockBehavior::AlwaysNonRetryableError,
            MockBehavior::Text {
                text: "Terceiro roteiro".to_string(),
            },
        ],
    })
    .with_theme("Esperança");

    fixture.studio.generate_script().await.unwrap();
    let err = fixture.studio.generate_script().await.unwrap_err();

    assert!(matches!(err, StudioError::Generation(_)));
    assert_eq!(fixture.studio.script(), "Primeiro roteiro");
    assert!(matches!(
        fixture.studio.operation_state(OperationKind::Script),
        OperationState::Failed(_)
    ));

    // The busy flag was cleared by the failure
    assert_eq!(
        fixture.studio.generate_script().await.unwrap(),
        "Terceiro roteiro"
    );
}

#[tokio::test]
async fn test_empty_script_from_provider_is_a_failure() {
    let fixture =
        Fixture::with_mock_behavior(MockBehavior::Text { text: "  ".into() }).with_theme("Fé");
    fixture.studio.set_script("Anterior");

    let err = fixture.studio.generate_script().await.unwrap_err();

    assert!(matches!(err, StudioError::Generation(_)));
    assert_eq!(fixture.studio.script(), "Anterior");
}

#[tokio::test]
async fn test_duplicate_submission_is_busy() {
    let fixture = Fixture::new().with_theme("Coragem");
    fixture.mock.set_latency(Some(Duration::from_millis(50)));

    let (first, second) = tokio::join!(
        fixture.studio.generate_script(),
        fixture.studio.generate_script()
    );

    assert!(first.is_ok());
    assert!(matches!(
        second,
        Err(StudioError::Busy(OperationKind::Script))
    ));
    assert_eq!(fixture.mock.get_call_count(), 1);
}

#[tokio::test]
async fn test_script_and_audio_are_tracked_separately() {
    let fixture = Fixture::new().with_theme("Coragem");
    fixture.studio.set_script("Um roteiro já pronto.");
    fixture.mock.set_latency(Some(Duration::from_millis(20)));

    let (script, audio) = tokio::join!(
        fixture.studio.generate_script(),
        fixture.studio.generate_audio()
    );

    assert!(script.is_ok());
    assert!(audio.is_ok());
}

#[tokio::test]
async fn test_cancelled_request_clears_busy_state() {
    let fixture = Fixture::new().with_theme("Paciência");
    fixture.mock.set_latency(Some(Duration::from_secs(5)));

    let result =
        tokio::time::timeout(Duration::from_millis(20), fixture.studio.generate_script()).await;
    assert!(result.is_err());
    assert_eq!(
        fixture.studio.operation_state(OperationKind::Script),
        OperationState::Failed("cancelled".to_string())
    );

    fixture.mock.set_latency(None);
    assert!(fixture.studio.generate_script().await.is_ok());
}

#[tokio::test]
async fn test_audio_requires_script() {
    let fixture = Fixture::new();

    let result = fixture.studio.generate_audio().await;

    assert!(matches!(result, Err(StudioError::Validation(_))));
    assert_eq!(fixture.mock.get_call_count(), 0);
    assert_eq!(fixture.output.started(), 0);
}

#[tokio::test]
async fn test_audio_generation_stores_and_plays() {
    let fixture = Fixture::new();
    fixture.studio.set_script("Era uma vez um farol.");

    let audio = fixture.studio.generate_audio().await.unwrap();

    assert_eq!(audio.frames(), MOCK_AUDIO_FRAMES);
    assert_eq!(audio.sample_rate, 24000);
    assert_eq!(audio.channel_count(), 1);
    assert!(fixture.studio.audio().is_some());
    assert!(fixture.studio.is_playing());
    assert_eq!(fixture.output.started(), 1);

    let request = fixture.mock.get_last_captured_speech_request().unwrap();
    assert_eq!(request.voice, "Kore");
    assert_eq!(request.model, "gemini-2.5-flash-preview-tts");
    assert_eq!(
        request.text,
        "Say with a natural and expressive tone: Era uma vez um farol."
    );
}

#[tokio::test]
async fn test_audio_text_is_truncated() {
    let fixture = Fixture::new();
    fixture.studio.set_script("ã".repeat(6000));

    fixture.studio.generate_audio().await.unwrap();

    let request = fixture.mock.get_last_captured_speech_request().unwrap();
    let body = request
        .text
        .strip_prefix("Say with a natural and expressive tone: ")
        .unwrap();
    assert_eq!(body.chars().count(), 5000);
}

#[tokio::test]
async fn test_unknown_voice_falls_back() {
    let fixture = Fixture::new();
    fixture.studio.set_script("Texto.");

    assert_eq!(fixture.studio.select_voice("Alloy"), "Kore");
    assert_eq!(fixture.studio.select_voice("pulcherrima"), "Pulcherrima");
    fixture.studio.generate_audio().await.unwrap();

    let request = fixture.mock.get_last_captured_speech_request().unwrap();
    assert_eq!(request.voice, "Pulcherrima");
}

#[tokio::test]
async fn test_new_narration_preempts_old() {
    let fixture = Fixture::new();
    fixture.studio.set_script("Texto.");

    fixture.studio.generate_audio().await.unwrap();
    fixture.studio.generate_audio().await.unwrap();

    assert_eq!(fixture.output.started(), 2);
    assert_eq!(fixture.output.live(), 1);

    // The replaced session finishing late does not stop the new one
    fixture.output.finish(0);
    assert!(fixture.studio.is_playing());

    fixture.output.finish(1);
    assert!(!fixture.studio.is_playing());
}

#[tokio::test]
async fn test_stop_playback() {
    let fixture = Fixture::new();
    fixture.studio.stop_playback();

    fixture.studio.set_script("Texto.");
    fixture.studio.generate_audio().await.unwrap();
    fixture.studio.stop_playback();

    assert!(!fixture.studio.is_playing());
    assert_eq!(fixture.output.live(), 0);

    // Replay of the stored narration
    fixture.studio.play_audio().unwrap();
    assert!(fixture.studio.is_playing());
    assert_eq!(fixture.output.started(), 2);
}

#[tokio::test]
async fn test_invalid_audio_payload_keeps_previous_audio() {
    let fixture = Fixture::with_mock_behavior(MockBehavior::BehaviorQueue {
        behaviors: vec![MockBehavior::Success, MockBehavior::InvalidAudio],
    });
    fixture.studio.set_script("Texto.");

    let first = fixture.studio.generate_audio().await.unwrap();
    let err = fixture.studio.generate_audio().await.unwrap_err();

    assert!(matches!(err, StudioError::AudioGeneration(_)));
    assert!(std::sync::Arc::ptr_eq(&first, &fixture.studio.audio().unwrap()));
    assert_eq!(fixture.output.started(), 1);
    assert!(matches!(
        fixture.studio.operation_state(OperationKind::Audio),
        OperationState::Failed(_)
    ));
}

#[tokio::test]
async fn test_preview_does_not_replace_narration() {
    let fixture = Fixture::new();

    fixture.studio.preview_voice("Gacrux").await.unwrap();

    assert!(fixture.studio.audio().is_none());
    assert_eq!(fixture.output.started(), 1);
    let request = fixture.mock.get_last_captured_speech_request().unwrap();
    assert_eq!(request.voice, "Gacrux");
    assert!(request.text.contains("Olá! Eu sou a voz Gacrux."));
}

#[tokio::test]
async fn test_export_script_uses_content_type_name() {
    let fixture = Fixture::new();
    let dir = fixture.workspace_dir.path().join("exports");

    let empty = fixture.studio.export_script(&dir);
    assert!(matches!(empty, Err(StudioError::Validation(_))));

    fixture.studio.set_content_type(ContentType::Parable);
    fixture.studio.set_script("O semeador saiu a semear.");
    let path = fixture.studio.export_script(&dir).unwrap();

    assert_eq!(path, dir.join("roteiro-parabola.txt"));
    assert_eq!(
        std::fs::read_to_string(path).unwrap(),
        "O semeador saiu a semear."
    );
}

#[tokio::test]
async fn test_export_audio_writes_wav() {
    let fixture = Fixture::new();
    let path = fixture.workspace_dir.path().join("narracao.wav");

    assert!(matches!(
        fixture.studio.export_audio(&path),
        Err(StudioError::Validation(_))
    ));

    fixture.studio.set_script("Texto.");
    fixture.studio.generate_audio().await.unwrap();
    fixture.studio.export_audio(&path).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().sample_rate, 24000);
    assert_eq!(reader.len() as usize, MOCK_AUDIO_FRAMES);
}

#[tokio::test]
async fn test_narrate_stores_without_playing() {
    let fixture = Fixture::new();
    fixture.studio.set_script("Texto.");

    fixture.studio.narrate().await.unwrap();

    assert!(fixture.studio.audio().is_some());
    assert!(!fixture.studio.is_playing());
    assert_eq!(fixture.output.started(), 0);
}

#[tokio::test]
async fn test_retryable_failure_is_not_retried() {
    let fixture = Fixture::new().with_theme("Gratidão");
    fixture.mock.set_behavior(MockBehavior::AlwaysRetryableError);

    let err = fixture.studio.generate_script().await.unwrap_err();

    assert!(matches!(
        err,
        StudioError::Generation(vivaldino_core::AiError::Retryable(_))
    ));
    assert_eq!(fixture.mock.get_call_count(), 1);

    fixture.mock.set_behavior(MockBehavior::Success);
    assert_eq!(fixture.studio.generate_script().await.unwrap(), MOCK_SCRIPT);
    assert_eq!(fixture.mock.get_call_count(), 2);
}

#[tokio::test]
async fn test_preview_and_narration_use_their_own_voices() {
    let fixture = Fixture::new();
    fixture.studio.set_script("Texto.");
    fixture.studio.select_voice("Vindemiatrix");

    fixture.studio.preview_voice("Gacrux").await.unwrap();
    fixture.studio.narrate().await.unwrap();

    let voices: Vec<String> = fixture
        .mock
        .get_captured_speech_requests()
        .into_iter()
        .map(|r| r.voice)
        .collect();
    assert_eq!(voices, vec!["Gacrux", "Vindemiatrix"]);
    assert!(fixture.mock.get_captured_requests().is_empty());
}
