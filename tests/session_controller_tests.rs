// Lifecycle tests for the session controller, driven through fake collaborators

mod common;

use anyhow::Result;
use common::{fast_config, start_request, wait_until, Fakes};
use interview_session::evaluation::DOCUMENT_HEADER;
use interview_session::{
    DispatchOutcome, SessionController, SessionError, SessionNotice, SessionState, Speaker,
    Utterance, VoiceEvent,
};
use std::sync::atomic::Ordering;
use std::time::Duration;

#[tokio::test]
async fn test_full_session_lifecycle() -> Result<()> {
    let fakes = Fakes::new();
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());
    assert_eq!(handle.state(), SessionState::Idle);

    handle.start(start_request(Some("user-42"))).await?;
    assert_eq!(handle.state(), SessionState::Connecting);

    {
        let starts = fakes.voice.starts.lock().unwrap();
        assert_eq!(starts.len(), 1);
        assert_eq!(starts[0].0, "asst-backend");
        assert_eq!(starts[0].1.credential, "pk-test");
        assert_eq!(
            starts[0].1.variable_values.get("candidateName").map(String::as_str),
            Some("Ada")
        );
    }

    fakes.voice.emit(VoiceEvent::Started).await;
    handle.wait_for_state(SessionState::Active).await?;

    fakes.voice.say(Speaker::Interviewer, "Hello").await;
    fakes.voice.say(Speaker::Interviewer, "Hello there").await;
    fakes.voice.say(Speaker::Candidate, "Hi").await;
    fakes.voice.emit(VoiceEvent::Ended).await;

    let outcome = handle.finished().await?;
    assert_eq!(handle.state(), SessionState::Ended);
    assert_eq!(
        outcome.transcript.utterances(),
        &[
            Utterance::new(Speaker::Interviewer, "Hello there"),
            Utterance::new(Speaker::Candidate, "Hi"),
        ]
    );

    let evaluation = outcome.evaluation.expect("evaluation dispatched").await?;
    assert!(matches!(evaluation, DispatchOutcome::Recorded(_)));

    assert_eq!(
        fakes.scorer.documents(),
        vec![format!(
            "{}\n\nAI INTERVIEWER: Hello there\n\nCANDIDATE: Hi",
            DOCUMENT_HEADER
        )]
    );
    let records = fakes.store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, "user-42");

    Ok(())
}

#[tokio::test]
async fn test_empty_session_still_dispatches_header_only() -> Result<()> {
    let fakes = Fakes::new();
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());

    handle.start(start_request(Some("user-1"))).await?;
    fakes.voice.emit(VoiceEvent::Started).await;
    handle.wait_for_state(SessionState::Active).await?;

    handle.stop().await;

    let outcome = handle.finished().await?;
    assert!(outcome.transcript.is_empty());
    outcome.evaluation.expect("evaluation dispatched").await?;

    assert_eq!(fakes.scorer.documents(), vec![DOCUMENT_HEADER.to_string()]);

    Ok(())
}

#[tokio::test]
async fn test_stop_and_ended_dispatch_exactly_once() -> Result<()> {
    let fakes = Fakes::new();
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());

    handle.start(start_request(Some("user-7"))).await?;
    fakes.voice.emit(VoiceEvent::Started).await;
    handle.wait_for_state(SessionState::Active).await?;

    fakes.voice.say(Speaker::Candidate, "Done").await;
    wait_until(&handle, |stats| stats.open_turn).await?;

    handle.stop().await;
    fakes.voice.emit(VoiceEvent::Ended).await;
    handle.stop().await;

    let outcome = handle.finished().await?;
    outcome.evaluation.expect("evaluation dispatched").await?;

    assert_eq!(fakes.scorer.calls(), 1);
    assert_eq!(fakes.store.records().len(), 1);
    assert_eq!(fakes.voice.stop_count(), 1);
    assert_eq!(
        outcome.transcript.utterances(),
        &[Utterance::new(Speaker::Candidate, "Done")]
    );

    Ok(())
}

#[tokio::test]
async fn test_start_while_not_idle_is_rejected() -> Result<()> {
    let fakes = Fakes::new();
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());

    handle.start(start_request(None)).await?;

    let err = handle.start(start_request(None)).await.unwrap_err();
    assert_eq!(
        err,
        SessionError::AlreadyActive {
            state: SessionState::Connecting
        }
    );
    assert_eq!(handle.state(), SessionState::Connecting);
    assert_eq!(fakes.voice.starts.lock().unwrap().len(), 1);

    handle.stop().await;
    handle.wait_for_state(SessionState::Ended).await?;

    // An ended instance can never be restarted
    let err = handle.start(start_request(None)).await.unwrap_err();
    assert_eq!(
        err,
        SessionError::AlreadyActive {
            state: SessionState::Ended
        }
    );

    Ok(())
}

#[tokio::test]
async fn test_stop_while_idle_is_noop() -> Result<()> {
    let fakes = Fakes::new();
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());

    handle.stop().await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(handle.state(), SessionState::Idle);
    assert_eq!(fakes.scorer.calls(), 0);
    assert_eq!(fakes.voice.stop_count(), 0);

    // Still startable afterwards
    handle.start(start_request(None)).await?;
    assert_eq!(handle.state(), SessionState::Connecting);

    Ok(())
}

#[tokio::test]
async fn test_stop_while_connecting_ends_session() -> Result<()> {
    let fakes = Fakes::new();
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());

    handle.start(start_request(None)).await?;
    handle.stop().await;

    let outcome = handle.finished().await?;
    outcome.evaluation.expect("evaluation dispatched").await?;

    assert_eq!(handle.state(), SessionState::Ended);
    assert_eq!(fakes.scorer.calls(), 1);
    assert_eq!(fakes.capture.released(), 1);

    Ok(())
}

#[tokio::test]
async fn test_transport_error_terminates_session() -> Result<()> {
    let fakes = Fakes::new();
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());

    handle.start(start_request(Some("user-3"))).await?;
    fakes.voice.emit(VoiceEvent::Started).await;
    handle.wait_for_state(SessionState::Active).await?;

    fakes.voice.say(Speaker::Interviewer, "Let's begin").await;
    fakes
        .voice
        .emit(VoiceEvent::Error {
            detail: "socket closed".to_string(),
        })
        .await;
    // Anything after the error is ignored
    fakes.voice.emit(VoiceEvent::Ended).await;

    let outcome = handle.finished().await?;
    outcome.evaluation.expect("evaluation dispatched").await?;

    assert_eq!(
        outcome.transcript.utterances(),
        &[Utterance::new(Speaker::Interviewer, "Let's begin")]
    );
    assert_eq!(fakes.scorer.calls(), 1);
    // The transport ended the call itself; no stop command is sent
    assert_eq!(fakes.voice.stop_count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_voice_start_failure_ends_session() -> Result<()> {
    let fakes = Fakes::new();
    fakes.voice.fail_start.store(true, Ordering::SeqCst);
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());

    let err = handle.start(start_request(None)).await.unwrap_err();
    assert!(matches!(err, SessionError::Transport(_)));

    let outcome = handle.finished().await?;
    outcome.evaluation.expect("evaluation dispatched").await?;

    assert_eq!(handle.state(), SessionState::Ended);
    assert_eq!(fakes.capture.acquired(), 1);
    assert_eq!(fakes.capture.released(), 1);

    Ok(())
}

#[tokio::test]
async fn test_capture_failure_ends_session_before_calling() -> Result<()> {
    let fakes = Fakes::new();
    fakes.capture.fail_acquire.store(true, Ordering::SeqCst);
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());

    let err = handle.start(start_request(None)).await.unwrap_err();
    assert!(matches!(err, SessionError::Capture(_)));

    handle.wait_for_state(SessionState::Ended).await?;
    assert!(fakes.voice.starts.lock().unwrap().is_empty());
    assert_eq!(fakes.capture.released(), 0);

    Ok(())
}

#[tokio::test]
async fn test_capture_released_on_each_exit_path() -> Result<()> {
    // User stop
    let fakes = Fakes::new();
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());
    handle.start(start_request(None)).await?;
    fakes.voice.emit(VoiceEvent::Started).await;
    handle.wait_for_state(SessionState::Active).await?;
    handle.stop().await;
    handle.wait_for_state(SessionState::Ended).await?;
    assert_eq!(fakes.capture.acquired(), 1);
    assert_eq!(fakes.capture.released(), 1);

    // Transport ended
    let fakes = Fakes::new();
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());
    handle.start(start_request(None)).await?;
    fakes.voice.emit(VoiceEvent::Started).await;
    fakes.voice.emit(VoiceEvent::Ended).await;
    handle.wait_for_state(SessionState::Ended).await?;
    assert_eq!(fakes.capture.released(), 1);

    // Transport error
    let fakes = Fakes::new();
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());
    handle.start(start_request(None)).await?;
    fakes
        .voice
        .emit(VoiceEvent::Error {
            detail: "401".to_string(),
        })
        .await;
    handle.wait_for_state(SessionState::Ended).await?;
    assert_eq!(fakes.capture.released(), 1);

    Ok(())
}

#[tokio::test]
async fn test_fragments_outside_active_are_dropped() -> Result<()> {
    let fakes = Fakes::new();
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());

    handle.start(start_request(None)).await?;
    // Still connecting
    fakes.voice.say(Speaker::Interviewer, "early").await;
    fakes.voice.emit(VoiceEvent::Started).await;
    fakes.voice.say(Speaker::Interviewer, "Welcome").await;
    fakes.voice.emit(VoiceEvent::Ended).await;

    let outcome = handle.finished().await?;
    assert_eq!(
        outcome.transcript.utterances(),
        &[Utterance::new(Speaker::Interviewer, "Welcome")]
    );

    Ok(())
}

#[tokio::test]
async fn test_speaking_flag_tracks_assistant() -> Result<()> {
    let fakes = Fakes::new();
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());

    handle.start(start_request(None)).await?;
    fakes.voice.emit(VoiceEvent::Started).await;
    fakes.voice.emit(VoiceEvent::SpeakingStarted).await;
    wait_until(&handle, |stats| stats.assistant_speaking).await?;

    fakes.voice.emit(VoiceEvent::SpeakingEnded).await;
    wait_until(&handle, |stats| !stats.assistant_speaking).await?;

    assert_eq!(handle.state(), SessionState::Active);
    handle.stop().await;

    Ok(())
}

#[tokio::test]
async fn test_live_transcript_and_stats() -> Result<()> {
    let fakes = Fakes::new();
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());

    handle.start(start_request(None)).await?;
    fakes.voice.emit(VoiceEvent::Started).await;
    fakes.voice.say(Speaker::Interviewer, "First question").await;
    fakes.voice.say(Speaker::Candidate, "First answer").await;

    let stats = wait_until(&handle, |stats| stats.utterance_count == 1).await?;
    assert!(stats.open_turn);
    assert!(stats.started_at.is_some());
    assert_eq!(
        handle.transcript().utterances(),
        &[Utterance::new(Speaker::Interviewer, "First question")]
    );

    handle.stop().await;
    handle.wait_for_state(SessionState::Ended).await?;

    // The open candidate turn is flushed at termination
    assert_eq!(handle.transcript().len(), 2);
    assert!(!handle.stats().open_turn);

    Ok(())
}

#[tokio::test]
async fn test_missing_subject_skips_persistence() -> Result<()> {
    let fakes = Fakes::new();
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());

    handle.start(start_request(None)).await?;
    fakes.voice.emit(VoiceEvent::Started).await;
    fakes.voice.emit(VoiceEvent::Ended).await;

    let outcome = handle.finished().await?;
    let evaluation = outcome.evaluation.expect("evaluation dispatched").await?;

    assert!(matches!(evaluation, DispatchOutcome::Unrecorded(_)));
    assert!(fakes.store.records().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_scoring_failure_does_not_block_termination() -> Result<()> {
    let fakes = Fakes::new();
    *fakes.scorer.reply.lock().unwrap() =
        Err(SessionError::Scoring("500 Internal Server Error".to_string()));
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());
    let mut notices = handle.subscribe_notices();

    handle.start(start_request(Some("user-9"))).await?;
    fakes.voice.emit(VoiceEvent::Started).await;
    fakes.voice.emit(VoiceEvent::Ended).await;

    let outcome = handle.finished().await?;
    assert_eq!(handle.state(), SessionState::Ended);

    let evaluation = outcome.evaluation.expect("evaluation dispatched").await?;
    assert!(matches!(evaluation, DispatchOutcome::ScoringFailed(_)));
    assert!(fakes.store.records().is_empty());

    let notice = tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            match notices.recv().await {
                Ok(SessionNotice::EvaluationFailed { reason, .. }) => return Some(reason),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    })
    .await?;
    assert!(notice.is_some_and(|reason| reason.contains("500")));

    Ok(())
}

#[tokio::test]
async fn test_presence_warning_during_active_session() -> Result<()> {
    let mut fakes = Fakes::new();
    fakes.detector = std::sync::Arc::new(common::FakeDetector::seeing(0));
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());
    let mut notices = handle.subscribe_notices();

    handle.start(start_request(None)).await?;
    fakes.voice.emit(VoiceEvent::Started).await;

    let notice = tokio::time::timeout(Duration::from_secs(2), notices.recv()).await??;
    assert!(matches!(notice, SessionNotice::SubjectNotVisible { .. }));
    assert_eq!(handle.state(), SessionState::Active);

    handle.stop().await;
    handle.wait_for_state(SessionState::Ended).await?;

    // Monitor stops with the session
    tokio::time::sleep(Duration::from_millis(50)).await;
    let calls = fakes.detector.calls();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fakes.detector.calls(), calls);

    Ok(())
}

#[tokio::test]
async fn test_no_presence_checks_while_connecting() -> Result<()> {
    let fakes = Fakes::new();
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());

    handle.start(start_request(None)).await?;

    // Several presence intervals pass before the call connects
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(handle.state(), SessionState::Connecting);
    assert_eq!(fakes.detector.calls(), 0);

    fakes.voice.emit(VoiceEvent::Started).await;
    handle.wait_for_state(SessionState::Active).await?;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while fakes.detector.calls() == 0 {
        assert!(tokio::time::Instant::now() < deadline, "no presence check while active");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    handle.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_dropping_every_handle_ends_live_session() -> Result<()> {
    let fakes = Fakes::new();
    let handle = SessionController::spawn(fast_config(), fakes.collaborators());

    handle.start(start_request(Some("user-9"))).await?;
    fakes.voice.emit(VoiceEvent::Started).await;
    handle.wait_for_state(SessionState::Active).await?;
    fakes.voice.say(Speaker::Candidate, "Still here").await;
    wait_until(&handle, |stats| stats.open_turn).await?;

    drop(handle);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while fakes.capture.released() == 0 || fakes.store.records().is_empty() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "session kept running after its handles were dropped"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(fakes.capture.released(), 1);
    assert_eq!(fakes.scorer.calls(), 1);
    assert!(fakes.scorer.documents()[0].ends_with("CANDIDATE: Still here"));
    assert_eq!(fakes.voice.stop_count(), 1);

    // Presence monitor stopped with the session
    let calls = fakes.detector.calls();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fakes.detector.calls(), calls);

    Ok(())
}
