// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use krishi_config::model::MemoryConfig;
use krishi_memory::{ConversationMemory, MessageRole};
use krishi_test_utils::MockEmbedder;

fn memory(window: usize) -> (Arc<MockEmbedder>, ConversationMemory) {
    let embedder = Arc::new(MockEmbedder::new());
    let config = MemoryConfig {
        transcript_window: window,
        ..Default::default()
    };
    let mem = ConversationMemory::new(embedder.clone(), &config);
    (embedder, mem)
}

#[tokio::test]
async fn empty_memory_loads_nothing() {
    let (embedder, mem) = memory(10);
    let ctx = mem.load("anything").await.unwrap();
    assert!(ctx.is_empty());
    // No index entries, so the query is not embedded.
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn saved_turns_appear_in_transcript() {
    let (_, mem) = memory(10);
    mem.save("When should I sow wheat?", "<p>Early November.</p>")
        .await
        .unwrap();

    let ctx = mem.load("wheat irrigation").await.unwrap();
    assert_eq!(ctx.messages.len(), 2);
    assert_eq!(ctx.messages[0].role, MessageRole::Human);
    assert_eq!(ctx.messages[0].content, "When should I sow wheat?");
    assert_eq!(ctx.messages[1].role, MessageRole::Ai);
    // Still in the window, so not repeated as a retrieved turn.
    assert!(ctx.relevant.is_empty());
}

#[tokio::test]
async fn turns_outside_window_are_retrieved() {
    let (_, mem) = memory(1);
    mem.save("How to control cotton bollworm?", "<p>Use pheromone traps.</p>")
        .await
        .unwrap();
    mem.save("Is it going to rain?", "<p>Light showers.</p>")
        .await
        .unwrap();

    let ctx = mem.load("cotton bollworm again").await.unwrap();
    assert_eq!(ctx.messages.len(), 2);
    assert_eq!(ctx.messages[0].content, "Is it going to rain?");
    assert_eq!(ctx.relevant.len(), 1);
    assert_eq!(ctx.relevant[0].input, "How to control cotton bollworm?");
}

#[tokio::test]
async fn clear_forgets_both_stores() {
    let (_, mem) = memory(1);
    mem.save("q1", "a1").await.unwrap();
    mem.save("q2", "a2").await.unwrap();
    assert_eq!(mem.sizes().await, (1, 2));

    mem.clear().await;
    assert_eq!(mem.sizes().await, (0, 0));
    assert!(mem.load("q1").await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_embedding_writes_neither_store() {
    let (embedder, mem) = memory(10);
    embedder.set_failing(true);
    assert!(mem.save("q", "a").await.is_err());
    assert_eq!(mem.sizes().await, (0, 0));
}

#[tokio::test]
async fn stores_stay_in_step() {
    let (_, mem) = memory(0);
    for i in 0..7 {
        mem.save(&format!("question {i}"), &format!("answer {i}"))
            .await
            .unwrap();
    }
    assert_eq!(mem.sizes().await, (7, 7));
}
