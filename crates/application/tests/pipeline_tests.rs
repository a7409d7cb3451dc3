//! End-to-end pipeline tests over the service facade
//!
//! Exercises the full path with a real coordinator, tracker, and scorer; the
//! provider ports are mocked and the cache is a minimal in-memory double.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use application::{
    ApplicationError, AssistantService, CacheStats, ChatCompletionPort, ChatReply, ChatTurn,
    CoordinatorOptions, ExpressionResolver, ExpressionScorer, PipelineOptions, RequestCoordinator,
    ResponseCachePort, TokenBudgetTracker, VisionPort, VisionVerdict, WeatherSnapshotPort,
};
use async_trait::async_trait;
use domain::{Expression, WeatherSnapshot};
use mockall::mock;
use parking_lot::Mutex;

mock! {
    Chat {}

    #[async_trait]
    impl ChatCompletionPort for Chat {
        async fn send_chat(
            &self,
            system_prompt: &str,
            user_prompt: &str,
            history: &[ChatTurn],
        ) -> Result<ChatReply, ApplicationError>;
    }
}

mock! {
    Vision {}

    #[async_trait]
    impl VisionPort for Vision {
        async fn analyze_expression_images(
            &self,
            content: &str,
            candidates: &[application::ExpressionCandidateImage],
        ) -> Result<VisionVerdict, ApplicationError>;
    }
}

/// Fixed-snapshot weather source
struct FixedWeather(Option<WeatherSnapshot>);

impl WeatherSnapshotPort for FixedWeather {
    fn current(&self) -> Option<WeatherSnapshot> {
        self.0.clone()
    }
}

/// Weather source whose snapshot can be swapped mid-test
#[derive(Default)]
struct SwappableWeather(Mutex<Option<WeatherSnapshot>>);

impl SwappableWeather {
    fn set(&self, snapshot: WeatherSnapshot) {
        *self.0.lock() = Some(snapshot);
    }
}

impl WeatherSnapshotPort for SwappableWeather {
    fn current(&self) -> Option<WeatherSnapshot> {
        self.0.lock().clone()
    }
}

/// Minimal in-memory cache double; stores forever, counts hits and misses
#[derive(Default)]
struct FakeCache {
    entries: Mutex<HashMap<String, String>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

#[async_trait]
impl ResponseCachePort for FakeCache {
    async fn get(&self, key: &str) -> Result<Option<String>, ApplicationError> {
        let found = self.entries.lock().get(key).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::SeqCst);
        } else {
            self.misses.fetch_add(1, Ordering::SeqCst);
        }
        Ok(found)
    }

    async fn set(&self, key: &str, value: String, _ttl: Duration) -> Result<(), ApplicationError> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn contains(&self, key: &str) -> Result<bool, ApplicationError> {
        Ok(self.entries.lock().contains_key(key))
    }

    async fn remove(&self, key: &str) -> Result<(), ApplicationError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), ApplicationError> {
        self.entries.lock().clear();
        Ok(())
    }

    async fn cleanup(&self) -> Result<u64, ApplicationError> {
        Ok(0)
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::SeqCst),
            misses: self.misses.load(Ordering::SeqCst),
            entries: self.entries.lock().len() as u64,
        }
    }
}

fn jakarta() -> WeatherSnapshot {
    WeatherSnapshot {
        temperature: Some(35.0),
        condition: Some("Clear".to_string()),
        location: Some("Jakarta".to_string()),
        ..Default::default()
    }
}

fn reply(content: &str) -> ChatReply {
    ChatReply {
        content: content.to_string(),
        model: "test-model".to_string(),
        tokens_used: Some(64),
    }
}

fn service(chat: MockChat, snapshot: Option<WeatherSnapshot>) -> AssistantService {
    AssistantService::new(
        Arc::new(chat),
        Arc::new(FixedWeather(snapshot)),
        Arc::new(FakeCache::default()),
        Arc::new(TokenBudgetTracker::new()),
        Arc::new(RequestCoordinator::new()),
        ExpressionResolver::new(ExpressionScorer::new()),
        PipelineOptions {
            debounce: false,
            ..PipelineOptions::default()
        },
    )
}

#[tokio::test]
async fn weather_grounded_message_flows_end_to_end() {
    let mut chat = MockChat::new();
    chat.expect_send_chat()
        .withf(|system, user, _| {
            system.contains("Kumo")
                && user.contains("Jakarta")
                && user.contains("35\u{b0}C")
                && user.ends_with("what should I wear")
        })
        .times(1)
        .returning(|_, _, _| Ok(reply("So hot today, wear something light!")));

    let service = service(chat, Some(jakarta()));
    let answer = service.send_message("what should I wear").await.unwrap();

    assert_eq!(answer.response_text, "So hot today, wear something light!");
    assert_eq!(answer.expression, Expression::Hot);
    assert!(answer.confidence >= 0.5);
    assert_eq!(service.daily_usage().requests, 1);
}

#[tokio::test]
async fn repeated_message_is_served_from_cache() {
    let mut chat = MockChat::new();
    chat.expect_send_chat()
        .times(1)
        .returning(|_, _, _| Ok(reply("Bring an umbrella!")));

    let service = service(chat, Some(jakarta()));

    let first = service.send_message("do I need an umbrella").await.unwrap();
    // Different spacing and case still hit the same normalized key.
    let second = service
        .send_message("  Do I NEED an   umbrella ")
        .await
        .unwrap();

    assert_eq!(first.response_text, second.response_text);
    assert_eq!(first.expression, Expression::Rainy);

    let stats = service.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
}

#[tokio::test]
async fn changed_weather_invalidates_the_cache_key() {
    let mut chat = MockChat::new();
    let mut sequence = mockall::Sequence::new();
    chat.expect_send_chat()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _, _| Ok(reply("Sunny and clear.")));
    chat.expect_send_chat()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _, _| Ok(reply("Freezing, bundle up.")));

    let weather = Arc::new(SwappableWeather::default());
    weather.set(jakarta());

    let service = AssistantService::new(
        Arc::new(chat),
        Arc::clone(&weather) as Arc<dyn WeatherSnapshotPort>,
        Arc::new(FakeCache::default()),
        Arc::new(TokenBudgetTracker::new()),
        Arc::new(RequestCoordinator::new()),
        ExpressionResolver::new(ExpressionScorer::new()),
        PipelineOptions {
            debounce: false,
            ..PipelineOptions::default()
        },
    );

    let warm = service.send_message("how is it outside").await.unwrap();
    assert_eq!(warm.response_text, "Sunny and clear.");

    let mut snapshot = jakarta();
    snapshot.temperature = Some(-2.0);
    snapshot.condition = Some("Snow".to_string());
    weather.set(snapshot);

    // Same message, different weather: the cached answer must not be reused.
    let cold = service.send_message("how is it outside").await.unwrap();
    assert_eq!(cold.response_text, "Freezing, bundle up.");
    assert_eq!(service.cache_stats().entries, 2);
}

#[tokio::test]
async fn concurrent_identical_sends_share_one_provider_call() {
    let mut chat = MockChat::new();
    chat.expect_send_chat()
        .times(1)
        .returning(|_, _, _| Ok(reply("One answer for everyone.")));

    let service = Arc::new(service(chat, None));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(
            async move { service.send_message("hello").await },
        ));
    }

    for handle in handles {
        let answer = handle.await.unwrap().unwrap();
        assert_eq!(answer.response_text, "One answer for everyone.");
    }
    assert_eq!(service.coordinator_stats().executions, 1);
}

#[tokio::test]
async fn oversized_message_is_rejected_before_dispatch() {
    let mut chat = MockChat::new();
    chat.expect_send_chat().times(0);

    let service = AssistantService::new(
        Arc::new(chat),
        Arc::new(FixedWeather(None)),
        Arc::new(FakeCache::default()),
        Arc::new(TokenBudgetTracker::new()),
        Arc::new(RequestCoordinator::new()),
        ExpressionResolver::new(ExpressionScorer::new()),
        PipelineOptions {
            max_tokens_per_request: 150,
            debounce: false,
            ..PipelineOptions::default()
        },
    );

    let oversized = "word ".repeat(500);
    let err = service.send_message(&oversized).await.unwrap_err();
    assert!(matches!(err, ApplicationError::BudgetExceeded(_)));
    assert_eq!(service.cache_stats().misses, 0);
    assert_eq!(service.daily_usage().requests, 0);
}

#[tokio::test]
async fn provider_failure_reaches_the_caller_once_per_burst() {
    let mut chat = MockChat::new();
    chat.expect_send_chat()
        .times(1)
        .returning(|_, _, _| Err(ApplicationError::ChatCall("rate limited".to_string())));

    let service = Arc::new(service(chat, None));

    let a = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.send_message("hello").await })
    };
    let b = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.send_message("hello").await })
    };

    for handle in [a, b] {
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, ApplicationError::ChatCall(_)));
    }
    // Failures are not cached; nothing to replay.
    assert_eq!(service.cache_stats().entries, 0);
}

#[tokio::test]
async fn vision_confirmation_refines_the_expression() {
    let mut chat = MockChat::new();
    chat.expect_send_chat()
        .times(1)
        .returning(|_, _, _| Ok(reply("I'm so sorry, that failed")));

    let mut vision = MockVision::new();
    vision
        .expect_analyze_expression_images()
        .times(1)
        .returning(|_, _| {
            Ok(VisionVerdict {
                expression_name: "embarrassed".to_string(),
                confidence: 0.8,
                reason: "flustered tone".to_string(),
            })
        });

    let service = AssistantService::new(
        Arc::new(chat),
        Arc::new(FixedWeather(None)),
        Arc::new(FakeCache::default()),
        Arc::new(TokenBudgetTracker::new()),
        Arc::new(RequestCoordinator::new()),
        ExpressionResolver::with_vision(ExpressionScorer::new(), Arc::new(vision), "/mascot"),
        PipelineOptions {
            debounce: false,
            ..PipelineOptions::default()
        },
    );

    let answer = service.send_message("run the report").await.unwrap();
    assert_eq!(answer.expression, Expression::Embarrassed);
    assert!((answer.confidence - 0.8).abs() < 1e-6);
}

#[tokio::test]
async fn flush_cancels_a_debounced_send() {
    let mut chat = MockChat::new();
    chat.expect_send_chat().times(0);

    let service = Arc::new(AssistantService::new(
        Arc::new(chat),
        Arc::new(FixedWeather(None)),
        Arc::new(FakeCache::default()),
        Arc::new(TokenBudgetTracker::new()),
        Arc::new(RequestCoordinator::new()),
        ExpressionResolver::new(ExpressionScorer::new()),
        PipelineOptions::default(),
    ));

    let waiter = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.send_message("hello").await })
    };

    // Let the call register its debounce timer, then cancel it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    service.flush(Some("hello"));

    let err = waiter.await.unwrap().unwrap_err();
    assert!(matches!(err, ApplicationError::Coordination(_)));
    assert!(!err.is_user_visible());
}

#[test]
fn coordinator_options_reexport_is_usable() {
    assert!(CoordinatorOptions::default().debounce);
}
