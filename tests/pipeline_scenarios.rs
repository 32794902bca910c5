mod support;

use factcheck_rs::{Adjudication, Citation, Error, FactCheckResponse, Stage};
use serde_json::json;
use support::{runner, FakeLlm, FakeSearcher, ASSESS, CLASSIFY};

fn three_hits() -> Vec<serde_json::Value> {
    vec![
        json!({"title": "A", "url": "http://a", "content": "The sky appears blue due to Rayleigh scattering."}),
        json!({"title": "B", "url": "http://b", "content": "Blue sky explained."}),
        json!({"title": null, "url": "http://c", "snippet": "Why is the sky blue?"}),
    ]
}

#[tokio::test]
async fn sky_is_blue_is_fact_checked() {
    let llm = FakeLlm::new()
        .reply(CLASSIFY, r#"{"is_claim": true, "reason": "physical claim"}"#)
        .reply(ASSESS, r#"{"verdict": "true", "explanation": "...", "citations": [{"title":"A","url":"http://a"}]}"#);
    let search = FakeSearcher::with(three_hits());
    let r = runner(llm.clone(), search.clone());

    let resp = r.run("The sky is blue.", "s1").await.unwrap();
    assert_eq!(
        resp,
        FactCheckResponse::FactChecked {
            verdict: Adjudication::True,
            explanation: "...".into(),
            citations: vec![Citation { title: "A".into(), url: "http://a".into() }],
        }
    );
    assert_eq!(
        serde_json::to_value(&resp).unwrap(),
        json!({"status": "fact_checked", "verdict": "true", "explanation": "...",
               "citations": [{"title": "A", "url": "http://a"}]})
    );

    let queries = search.queries.lock().unwrap().clone();
    assert_eq!(queries, vec![("The sky is blue.".to_string(), 6)]);

    // finished runs keep no checkpoint
    assert!(r.checkpoint("s1").await.is_none());
    assert!(matches!(r.resume("s1").await, Err(Error::UnknownSession(_))));
}

#[tokio::test]
async fn filler_short_circuits() {
    let llm = FakeLlm::new().reply(CLASSIFY, r#"{"is_claim": false, "reason": "filler, no assertion"}"#);
    let search = FakeSearcher::with(three_hits());
    let r = runner(llm.clone(), search.clone());

    let resp = r.run("Let me see how we say that.", "s2").await.unwrap();
    assert_eq!(
        serde_json::to_value(&resp).unwrap(),
        json!({"status": "not_a_claim", "reason": "filler, no assertion"})
    );
    assert_eq!(search.query_count(), 0);
    assert_eq!(llm.calls_to(ASSESS), 0);
    assert!(r.checkpoint("s2").await.is_none());
}

#[tokio::test]
async fn empty_citations_use_research_in_order() {
    let llm = FakeLlm::new()
        .reply(CLASSIFY, r#"{"is_claim": true}"#)
        .reply(ASSESS, r#"{"verdict": "unsubstantiated", "explanation": "mixed", "citations": []}"#);
    let r = runner(llm, FakeSearcher::with(three_hits()));

    match r.run("claim", "s3").await.unwrap() {
        FactCheckResponse::FactChecked { verdict, citations, .. } => {
            assert_eq!(verdict, Adjudication::Unsubstantiated);
            let pairs: Vec<_> = citations.iter().map(|c| (c.title.as_str(), c.url.as_str())).collect();
            assert_eq!(pairs, vec![("A", "http://a"), ("B", "http://b"), ("(no title)", "http://c")]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn fenced_then_clean_classification_retries_once() {
    let llm = FakeLlm::new()
        .reply(CLASSIFY, "```json\n{is_claim: yes}\n```")
        .reply(CLASSIFY, r#"{"is_claim": false, "reason": "question"}"#);
    let r = runner(llm.clone(), FakeSearcher::with(vec![]));

    let resp = r.run("Is that okay?", "s4").await.unwrap();
    assert_eq!(resp, FactCheckResponse::NotAClaim { reason: "question".into() });
    assert_eq!(llm.calls_to(CLASSIFY), 2);
}

#[tokio::test]
async fn malformed_output_is_surfaced_not_downgraded() {
    let llm = FakeLlm::new()
        .reply(CLASSIFY, r#"{"is_claim": true}"#)
        .reply(ASSESS, "I think it's true")
        .reply(ASSESS, "Definitely true")
        .reply(ASSESS, "true!");
    let r = runner(llm.clone(), FakeSearcher::with(three_hits()));

    let err = r.run("claim", "s5").await.unwrap_err();
    assert!(matches!(err, Error::MalformedModelOutput { attempts: 3, .. }));
    assert_eq!(llm.calls_to(ASSESS), 3);
}

#[tokio::test]
async fn invalid_verdict_is_a_validation_error() {
    let llm = FakeLlm::new()
        .reply(CLASSIFY, r#"{"is_claim": true}"#)
        .reply(ASSESS, r#"{"verdict": "maybe", "explanation": "hmm"}"#);
    let r = runner(llm.clone(), FakeSearcher::with(three_hits()));

    let err = r.run("claim", "s6").await.unwrap_err();
    assert!(matches!(err, Error::Validation { ref field, .. } if field == "verdict"));
    // validation failures are not retried
    assert_eq!(llm.calls_to(ASSESS), 1);
}

#[tokio::test]
async fn search_failure_is_fatal_and_resumable() {
    let llm = FakeLlm::new().reply(CLASSIFY, r#"{"is_claim": true, "reason": "claim"}"#);
    let r = runner(llm.clone(), FakeSearcher::failing());

    let err = r.run("The Eiffel Tower is taller than 400 meters.", "s7").await.unwrap_err();
    assert!(matches!(err, Error::EvidenceRetrieval(_)));
    assert_eq!(llm.calls_to(ASSESS), 0);

    let cp = r.checkpoint("s7").await.unwrap();
    assert_eq!(cp.next, Stage::Researching);
    assert_eq!(cp.state.is_claim, Some(true));
    assert!(cp.state.verdict.is_none());

    // resuming re-runs the failed stage, not classification
    let err = r.resume("s7").await.unwrap_err();
    assert!(matches!(err, Error::EvidenceRetrieval(_)));
    assert_eq!(llm.calls_to(CLASSIFY), 1);
}

#[tokio::test]
async fn empty_search_stops_before_assessment() {
    let llm = FakeLlm::new()
        .reply(CLASSIFY, r#"{"is_claim": true, "reason": "claim"}"#)
        .reply(ASSESS, r#"{"verdict": "unsubstantiated", "explanation": "no sources"}"#);
    let search = FakeSearcher::with(vec![]);
    let r = runner(llm.clone(), search.clone());

    let err = r.run("The moon is cheese.", "s9").await.unwrap_err();
    assert!(matches!(err, Error::EvidenceRetrieval(_)));
    assert_eq!(search.query_count(), 1);
    assert_eq!(llm.calls_to(ASSESS), 0);
}

#[tokio::test]
async fn resume_after_transient_assess_failure() {
    let llm = FakeLlm::new().reply(CLASSIFY, r#"{"is_claim": true}"#);
    let r = runner(llm.clone(), FakeSearcher::with(three_hits()));

    // no scripted reply for the assess model: the fake reports a generation error
    let err = r.run("claim", "s8").await.unwrap_err();
    assert!(matches!(err, Error::Generation(_)));
    assert_eq!(r.checkpoint("s8").await.unwrap().next, Stage::Assessing);

    llm.reply(ASSESS, r#"{"verdict": "false", "explanation": "refuted"}"#);
    let resp = r.resume("s8").await.unwrap();
    assert!(matches!(resp, FactCheckResponse::FactChecked { verdict: Adjudication::False, .. }));
    assert_eq!(llm.calls_to(CLASSIFY), 1);

    // once finished, the session is gone
    assert!(r.checkpoint("s8").await.is_none());
    assert!(matches!(r.resume("s8").await, Err(Error::UnknownSession(_))));
}

#[tokio::test]
async fn failed_research_checkpoint_holds_normalized_state() {
    let llm = FakeLlm::new().reply(CLASSIFY, r#"{"is_claim": true}"#);
    let r = runner(llm, FakeSearcher::with(three_hits()));

    // research succeeds, assessment has no scripted reply
    r.run("The sky is blue.", "s10").await.unwrap_err();
    let cp = r.checkpoint("s10").await.unwrap();
    assert_eq!(cp.next, Stage::Assessing);
    assert_eq!(cp.state.research.len(), 3);
    assert_eq!(cp.state.research[2].title, "(no title)");
    assert!(cp.state.verdict.is_none());
}

#[tokio::test]
async fn many_finished_runs_leave_no_checkpoints() {
    let llm = FakeLlm::new();
    for _ in 0..50 {
        llm.reply(CLASSIFY, r#"{"is_claim": false, "reason": "filler"}"#);
    }
    let r = runner(llm, FakeSearcher::with(vec![]));

    for i in 0..50 {
        let session = format!("done-{i}");
        r.run("uh huh", &session).await.unwrap();
        assert!(r.checkpoint(&session).await.is_none());
    }
}

#[tokio::test]
async fn unknown_session_cannot_resume() {
    let r = runner(FakeLlm::new(), FakeSearcher::with(vec![]));
    assert!(matches!(r.resume("nobody").await, Err(Error::UnknownSession(_))));
}

#[tokio::test]
async fn concurrent_sessions_do_not_share_state() {
    let llm = FakeLlm::new()
        .reply(CLASSIFY, r#"{"is_claim": false, "reason": "one"}"#)
        .reply(CLASSIFY, r#"{"is_claim": false, "reason": "two"}"#);
    let r = runner(llm, FakeSearcher::with(vec![]));

    let (a, b) = tokio::join!(r.run("first", "a"), r.run("second", "b"));
    let reasons = {
        let mut v = vec![a.unwrap(), b.unwrap()]
            .into_iter()
            .map(|resp| match resp {
                FactCheckResponse::NotAClaim { reason } => reason,
                other => panic!("unexpected {other:?}"),
            })
            .collect::<Vec<_>>();
        v.sort();
        v
    };
    assert_eq!(reasons, vec!["one", "two"]);
}

#[tokio::test]
async fn concurrent_failures_keep_separate_checkpoints() {
    let llm = FakeLlm::new()
        .reply(CLASSIFY, r#"{"is_claim": true}"#)
        .reply(CLASSIFY, r#"{"is_claim": true}"#);
    let r = runner(llm, FakeSearcher::with(three_hits()));

    let (a, b) = tokio::join!(r.run("first", "a"), r.run("second", "b"));
    assert!(matches!(a, Err(Error::Generation(_))));
    assert!(matches!(b, Err(Error::Generation(_))));
    assert_eq!(r.checkpoint("a").await.unwrap().state.input_text, "first");
    assert_eq!(r.checkpoint("b").await.unwrap().state.input_text, "second");
}
