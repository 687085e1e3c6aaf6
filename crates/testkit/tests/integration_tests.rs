//! Integration tests for the fake model and provider
//!
//! These drive the fakes through the public `agents` contract, the same way an
//! agent workflow under test would.

use agents::{Agent, Model, ModelError, ModelInput, ModelProvider, ModelRequest, RunConfig, Runner};
use agents_testkit::{
    fake_model_provider, init_test_tracing, no_delay_provider, FakeModel, FakeModelProvider,
    FakeModelProviderFactory,
};
use futures_util::future::join_all;
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

#[tokio::test]
async fn test_agent_with_fake_provider() {
    init_test_tracing();
    let provider = fake_model_provider();
    let agent = Agent::new("Test Agent")
        .with_model("gpt-4")
        .with_instructions("You are a test agent.");

    let result = Runner::run(
        &agent,
        "Hello!",
        &RunConfig::new(provider.model_provider()).with_max_turns(1),
    )
    .await
    .unwrap();

    assert!(result.final_output.contains("Fake response"));
    assert_eq!(result.last_response_id.as_deref(), Some("fake-response-1"));

    let record = provider.get_model("gpt-4").last_call().unwrap();
    assert_eq!(
        record.system_instructions.as_deref(),
        Some("You are a test agent.")
    );
    assert_eq!(record.input, ModelInput::from("Hello!"));
}

#[tokio::test]
async fn test_multiple_agents_share_provider() {
    let provider = no_delay_provider();
    let agent1 = Agent::new("Agent 1").with_model("gpt-4").with_instructions("First");
    let agent2 = Agent::new("Agent 2").with_model("gpt-4").with_instructions("Second");
    let run_config = RunConfig::new(provider.model_provider()).with_max_turns(1);

    let first = Runner::run(&agent1, "Hello", &run_config).await.unwrap();
    let second = Runner::run(&agent2, "World", &run_config).await.unwrap();

    assert_eq!(first.final_output, "Fake response #1");
    assert_eq!(second.final_output, "Fake response #2");

    // Both runs used the same model instance
    let model = provider.get_model("gpt-4");
    assert_eq!(model.call_count(), 2);
    let instructions: Vec<_> = model
        .call_history()
        .into_iter()
        .map(|record| record.system_instructions)
        .collect();
    assert_eq!(
        instructions,
        vec![Some("First".to_string()), Some("Second".to_string())]
    );
}

#[tokio::test]
async fn test_call_count_matches_history_after_n_calls() {
    let model = FakeModel::new(Duration::ZERO);

    for n in 1..=20u64 {
        model
            .get_response(ModelRequest::new(format!("call {n}")))
            .await
            .unwrap();
        assert_eq!(model.call_count(), n);
        assert_eq!(model.call_history().len() as u64, n);
    }
}

#[tokio::test]
async fn test_custom_factory_sees_index_and_input_in_order() {
    let model = FakeModel::builder()
        .delay(Duration::ZERO)
        .response_factory(|i, input| format!("{i}:{input}"))
        .build();

    let mut outputs = Vec::new();
    for _ in 0..3 {
        let response = model.get_response(ModelRequest::new("x")).await.unwrap();
        outputs.push(response.output_text().unwrap());
    }

    assert_eq!(outputs, vec!["1:x", "2:x", "3:x"]);
}

#[test]
fn test_identity_stability() {
    let provider = FakeModelProvider::new(Duration::ZERO);

    let first = provider.get_model("gpt-4");
    let second = provider.get_model("gpt-4");

    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_state_is_visible_through_every_handle() {
    let provider = FakeModelProvider::new(Duration::ZERO);
    let first = provider.get_model("gpt-4");
    let second = provider.get_model("gpt-4");

    first.get_response(ModelRequest::new("Hello")).await.unwrap();

    assert_eq!(second.call_count(), 1);
    assert_eq!(second.call_history()[0].input, ModelInput::from("Hello"));
}

#[test]
fn test_providers_never_share_models() {
    let provider_a = FakeModelProvider::new(Duration::ZERO);
    let provider_b = FakeModelProvider::new(Duration::ZERO);

    let from_a = provider_a.get_model("gpt-4");
    let from_b = provider_b.get_model("gpt-4");

    assert!(!Arc::ptr_eq(&from_a, &from_b));
}

#[tokio::test]
async fn test_clear_then_get_model_returns_fresh_instance() {
    let provider = FakeModelProvider::new(Duration::ZERO);
    let old = provider.get_model("gpt-4");
    old.get_response(ModelRequest::new("a")).await.unwrap();
    old.get_response(ModelRequest::new("b")).await.unwrap();

    provider.clear();
    let new = provider.get_model("gpt-4");

    assert!(!Arc::ptr_eq(&old, &new));
    assert_eq!(new.call_count(), 0);
    // The old handle is still usable and keeps its own state
    assert_eq!(old.call_count(), 2);
}

#[tokio::test]
async fn test_reset_is_idempotent() {
    let model = FakeModel::new(Duration::ZERO);
    model.get_response(ModelRequest::new("a")).await.unwrap();

    for _ in 0..3 {
        model.reset();
        assert_eq!(model.call_count(), 0);
        assert!(model.call_history().is_empty());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_get_unique_gap_free_indices() {
    const CALLS: u64 = 200;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_by_factory = seen.clone();
    let model = Arc::new(
        FakeModel::builder()
            .delay(Duration::from_millis(1))
            .response_factory(move |i, input| {
                seen_by_factory.lock().unwrap().push(i);
                format!("{i}|{input}")
            })
            .build(),
    );

    let handles = (0..CALLS).map(|n| {
        let model = model.clone();
        tokio::spawn(async move {
            model
                .get_response(ModelRequest::new(format!("call-{n}")))
                .await
                .unwrap()
        })
    });
    let responses: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(model.call_count(), CALLS);
    let history = model.call_history();
    assert_eq!(history.len() as u64, CALLS);

    let indices: HashSet<u64> = seen.lock().unwrap().iter().copied().collect();
    assert_eq!(indices, (1..=CALLS).collect::<HashSet<_>>());
    assert_eq!(seen.lock().unwrap().len() as u64, CALLS);

    // The index a call was given matches its position in the history
    for response in responses {
        let text = response.output_text().unwrap();
        let (index, input) = text.split_once('|').unwrap();
        let index: u64 = index.parse().unwrap();
        let record = &history[(index - 1) as usize];
        assert_eq!(record.call_index, index);
        assert_eq!(record.input, ModelInput::from(input));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_delay_does_not_serialize_concurrent_calls() {
    let model = Arc::new(FakeModel::new(Duration::from_millis(200)));
    let start = Instant::now();

    let handles = (0..10).map(|_| {
        let model = model.clone();
        tokio::spawn(async move { model.get_response(ModelRequest::new("x")).await })
    });
    for joined in join_all(handles).await {
        joined.unwrap().unwrap();
    }

    // Ten sequential sleeps would take two seconds
    assert!(start.elapsed() < Duration::from_millis(1500));
    assert_eq!(model.call_count(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lookups_resolve_one_instance() {
    let provider = Arc::new(FakeModelProvider::new(Duration::ZERO));

    let handles = (0..32).map(|_| {
        let provider = provider.clone();
        tokio::spawn(async move { provider.get_model("gpt-4") })
    });
    let models: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert!(models.iter().all(|m| Arc::ptr_eq(m, &models[0])));
    assert_eq!(provider.get_all_models().len(), 1);
}

#[tokio::test]
async fn test_zero_delay_provider_is_fast() {
    let provider = no_delay_provider();
    let model = provider.get_model("gpt-4");
    let start = Instant::now();

    for _ in 0..50 {
        model.get_response(ModelRequest::new("x")).await.unwrap();
    }

    // 50 calls at the default delay would take five seconds
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_failing_factory_surfaces_through_runner() {
    let factory = FakeModelProviderFactory::new();
    let provider = factory.create_with(
        FakeModelProvider::builder()
            .delay(Duration::ZERO)
            .try_response_factory(|i, _input| {
                if i > 1 {
                    Err(format!("no canned response for call {i}"))
                } else {
                    Ok("first".to_string())
                }
            }),
    );
    let agent = Agent::new("Test").with_model("gpt-4");
    let run_config = RunConfig::new(provider.clone());

    let first = Runner::run(&agent, "a", &run_config).await.unwrap();
    assert_eq!(first.final_output, "first");

    let err = Runner::run(&agent, "b", &run_config).await.unwrap_err();
    match err {
        agents::RunnerError::Model(ModelError::ResponseFactory(source)) => {
            assert_eq!(source.to_string(), "no canned response for call 2")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_panicking_factory_unwinds_and_leaves_model_usable() {
    let model = Arc::new(
        FakeModel::builder()
            .delay(Duration::ZERO)
            .response_factory(|i, _input| {
                if i == 1 {
                    panic!("factory bug on call {i}");
                }
                format!("ok {i}")
            })
            .build(),
    );

    let first = {
        let model = model.clone();
        tokio::spawn(async move { model.get_response(ModelRequest::new("a")).await })
    };
    let joined = first.await;
    assert!(joined.unwrap_err().is_panic());

    // The call was recorded before the factory ran
    assert_eq!(model.call_count(), 1);

    let response = model.get_response(ModelRequest::new("b")).await.unwrap();
    assert_eq!(response.output_text().as_deref(), Some("ok 2"));
    assert_eq!(model.call_count(), 2);
    assert_eq!(model.call_history().len(), 2);
}

#[tokio::test]
async fn test_provider_is_injectable_as_trait_object() {
    let fake = Arc::new(FakeModelProvider::new(Duration::ZERO));
    let provider: Arc<dyn ModelProvider> = fake.clone();

    let model = provider.get_model("claude");
    let response = model.get_response(ModelRequest::new("Hi")).await.unwrap();

    assert_eq!(response.output_text().as_deref(), Some("Fake response #1"));
    assert_eq!(fake.get_model("claude").call_count(), 1);
}

#[tokio::test]
async fn test_provider_factory_built_providers_keep_their_settings() {
    let factory = FakeModelProviderFactory::new();
    let slow = factory.create(Duration::from_millis(50));
    let custom = factory.create_with(
        FakeModelProvider::builder()
            .delay(Duration::ZERO)
            .response_factory(|_i, input| format!("Custom: {input}")),
    );

    assert_eq!(slow.get_model("gpt-4").delay(), Duration::from_millis(50));
    let response = custom
        .get_model("gpt-4")
        .get_response(ModelRequest::new("Hello"))
        .await
        .unwrap();
    assert_eq!(response.output_text().as_deref(), Some("Custom: Hello"));
}
