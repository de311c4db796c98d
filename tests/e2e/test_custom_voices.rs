use crate::e2e::helpers;

use helpers::{constant_embedding, CachedVoiceContext, TestContext};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;
use uuid::Uuid;
use chrono::Utc;
use std::sync::Arc;
use voice_forge::domain::voice::{CustomVoice, Embedding};
use voice_forge::error::AppError;
use voice_forge::infrastructure::repositories::CustomVoiceRepository;

async fn create_voice(ctx: &TestContext, user: Uuid, body: serde_json::Value) -> serde_json::Value {
    let response = ctx.client.post_as("/voice/custom", &body, user).await.unwrap();
    response.assert_status(StatusCode::CREATED);
    response.body.clone().unwrap()
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_create_custom_voice_from_two_builtins(ctx: &TestContext) {
    let user = helpers::new_user();

    let body = create_voice(
        ctx,
        user,
        json!({"name": "mix1", "voiceId1": "af_bella", "voiceId2": "am_adam"}),
    )
    .await;

    assert_eq!(body["name"], "mix1");
    assert_eq!(body["voiceId1"], "af_bella");
    assert_eq!(body["voiceId2"], "am_adam");
    assert_eq!(body["weight1"], 0.5);
    assert_eq!(body["weight2"], 0.5);
    assert_eq!(body["userId"], user.to_string());

    let storage_path = body["storagePath"].as_str().unwrap();
    assert!(storage_path.starts_with(&format!("voices/{}/", user)));
    assert!(storage_path.ends_with(".npy"));
    assert!(body["voiceUrl"].as_str().unwrap().contains(storage_path));

    // Stored tensor is the equal-weight average of 1.0 and 3.0
    let stored = ctx.store.object(storage_path).expect("embedding should be stored");
    let embedding = Embedding::from_npy_bytes(&stored).unwrap();
    assert_eq!(embedding, constant_embedding(2.0));
    assert_eq!(embedding.shape(), &helpers::VOICE_SHAPE);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_synthesize_with_stored_blend(ctx: &TestContext) {
    let user = helpers::new_user();
    create_voice(
        ctx,
        user,
        json!({
            "name": "mix1",
            "voiceId1": "af_bella",
            "voiceId2": "am_adam",
            "weight1": 0.25,
            "weight2": 0.75
        }),
    )
    .await;

    let response = ctx
        .client
        .post_as("/voice/synthesize", &json!({"text": "Hello", "voiceId": "mix1"}), user)
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.field_str("voice").as_deref(), Some("mix1"));
    // 1.0 + 0.75 * (3.0 - 1.0)
    assert_eq!(ctx.synthesizer.last_voice(), Some(constant_embedding(2.5)));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_duplicate_name_without_second_row(ctx: &TestContext) {
    let user = helpers::new_user();
    let body = json!({"name": "mix1", "voiceId1": "af_bella", "voiceId2": "am_adam"});
    create_voice(ctx, user, body.clone()).await;
    let puts_after_first = ctx.store.put_count();

    let response = ctx.client.post_as("/voice/custom", &body, user).await.unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_code("DUPLICATE_VOICE_NAME");
    assert_eq!(ctx.fixtures.get_custom_voice_count(user).await.unwrap(), 1);
    assert_eq!(ctx.store.put_count(), puts_after_first);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_allow_one_of_two_concurrent_creates(ctx: &TestContext) {
    let user = helpers::new_user();
    let body = json!({"name": "mix1", "voiceId1": "af_bella", "voiceId2": "am_adam"});

    let (first, second) = futures::future::join(
        ctx.client.post_as("/voice/custom", &body, user),
        ctx.client.post_as("/voice/custom", &body, user),
    )
    .await;
    let (first, second) = (first.unwrap(), second.unwrap());

    let mut statuses = vec![first.status, second.status];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);

    let rejected = if first.status == StatusCode::BAD_REQUEST {
        &first
    } else {
        &second
    };
    rejected.assert_error_code("DUPLICATE_VOICE_NAME");
    assert_eq!(ctx.fixtures.get_custom_voice_count(user).await.unwrap(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_map_unique_violation_to_duplicate_name(ctx: &TestContext) {
    let user = helpers::new_user();
    ctx.fixtures
        .create_custom_voice(user, "mix1", &format!("voices/{}/first.npy", user))
        .await
        .unwrap();

    // Insert that skips the name check, as a racing request would
    let repo = CustomVoiceRepository::new(Arc::new(ctx.pool.clone()));
    let mut tx = repo.begin().await.unwrap();
    let voice = CustomVoice {
        id: Uuid::new_v4(),
        user_id: user,
        voice_name: "mix1".to_string(),
        voice_id1: "af_bella".to_string(),
        voice_id2: "am_adam".to_string(),
        weight1: 0.5,
        weight2: 0.5,
        storage_path: format!("voices/{}/second.npy", user),
        created_at: Utc::now(),
    };

    let result = repo.create(&mut tx, &voice).await;

    assert!(matches!(result, Err(AppError::DuplicateVoiceName(ref name)) if name == "mix1"));
    drop(tx);
    assert_eq!(ctx.fixtures.get_custom_voice_count(user).await.unwrap(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_scope_names_per_user(ctx: &TestContext) {
    let body = json!({"name": "mix1", "voiceId1": "af_bella", "voiceId2": "am_adam"});
    let alice = helpers::new_user();
    let bob = helpers::new_user();

    create_voice(ctx, alice, body.clone()).await;
    create_voice(ctx, bob, body).await;

    // Each user only sees their own voices
    let response = ctx.client.get_as("/voice/custom", bob).await.unwrap();
    let voices = response.body.as_ref().unwrap().as_array().unwrap().clone();
    assert_eq!(voices.len(), 1);
    assert_eq!(voices[0]["userId"], bob.to_string());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_zero_weights(ctx: &TestContext) {
    let user = helpers::new_user();

    let response = ctx
        .client
        .post_as(
            "/voice/custom",
            &json!({
                "name": "silent",
                "voiceId1": "af_bella",
                "voiceId2": "am_adam",
                "weight1": 0,
                "weight2": 0
            }),
            user,
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_code("INVALID_WEIGHTS");
    assert_eq!(ctx.store.put_count(), 0);
    assert_eq!(ctx.fixtures.get_custom_voice_count(user).await.unwrap(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_out_of_range_weights(ctx: &TestContext) {
    let response = ctx
        .client
        .post_as(
            "/voice/custom",
            &json!({
                "name": "loud",
                "voiceId1": "af_bella",
                "voiceId2": "am_adam",
                "weight1": 1.5
            }),
            helpers::new_user(),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_code("INVALID_WEIGHTS");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_weights_just_outside_range(ctx: &TestContext) {
    let user = helpers::new_user();

    for (weight1, weight2) in [(1.000_000_01, 0.5), (0.5, -1e-50)] {
        let response = ctx
            .client
            .post_as(
                "/voice/custom",
                &json!({
                    "name": "edge",
                    "voiceId1": "af_bella",
                    "voiceId2": "am_adam",
                    "weight1": weight1,
                    "weight2": weight2
                }),
                user,
            )
            .await
            .unwrap();

        response
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_error_code("INVALID_WEIGHTS");
    }

    assert_eq!(ctx.store.put_count(), 0);
    assert_eq!(ctx.fixtures.get_custom_voice_count(user).await.unwrap(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unknown_source_voice(ctx: &TestContext) {
    let user = helpers::new_user();

    let response = ctx
        .client
        .post_as(
            "/voice/custom",
            &json!({"name": "mix1", "voiceId1": "af_bella", "voiceId2": "nope"}),
            user,
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_code("VOICE_NOT_FOUND");
    assert_eq!(ctx.store.put_count(), 0);
    assert_eq!(ctx.fixtures.get_custom_voice_count(user).await.unwrap(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_require_name_and_sources(ctx: &TestContext) {
    let user = helpers::new_user();

    ctx.client
        .post_as("/voice/custom", &json!({"voiceId1": "af_bella", "voiceId2": "am_adam"}), user)
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_code("MISSING_PARAMETERS")
        .assert_error_message("name");

    ctx.client
        .post_as("/voice/custom", &json!({"name": "mix1", "voiceId1": "af_bella"}), user)
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_code("MISSING_PARAMETERS")
        .assert_error_message("voiceId2");

    ctx.client
        .post_as(
            "/voice/custom",
            &json!({"name": "../mix", "voiceId1": "af_bella", "voiceId2": "am_adam"}),
            user,
        )
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_code("INVALID_INPUT");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_let_custom_voice_shadow_builtin(ctx: &TestContext) {
    let user = helpers::new_user();
    create_voice(
        ctx,
        user,
        json!({"name": "af_bella", "voiceId1": "am_adam", "voiceId2": "am_adam"}),
    )
    .await;

    ctx.client
        .post_as("/voice/synthesize", &json!({"text": "Hello", "voiceId": "af_bella"}), user)
        .await
        .unwrap()
        .assert_status(StatusCode::OK);
    assert_eq!(ctx.synthesizer.last_voice(), Some(constant_embedding(3.0)));

    // Other users still get the built-in
    ctx.client
        .post_as(
            "/voice/synthesize",
            &json!({"text": "Hello", "voiceId": "af_bella"}),
            helpers::new_user(),
        )
        .await
        .unwrap()
        .assert_status(StatusCode::OK);
    assert_eq!(ctx.synthesizer.last_voice(), Some(constant_embedding(1.0)));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_blend_from_a_custom_source(ctx: &TestContext) {
    let user = helpers::new_user();
    create_voice(
        ctx,
        user,
        json!({"name": "mix1", "voiceId1": "af_bella", "voiceId2": "am_adam"}),
    )
    .await;

    let body = create_voice(
        ctx,
        user,
        json!({
            "name": "mix2",
            "voiceId1": "mix1",
            "voiceId2": "af_sky",
            "weight1": 1.0,
            "weight2": 1.0
        }),
    )
    .await;

    let stored = ctx.store.object(body["storagePath"].as_str().unwrap()).unwrap();
    // (2.0 + -1.0) / 2
    assert_eq!(Embedding::from_npy_bytes(&stored).unwrap(), constant_embedding(0.5));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_missing_artifact_distinctly(ctx: &TestContext) {
    let user = helpers::new_user();
    let body = create_voice(
        ctx,
        user,
        json!({"name": "mix1", "voiceId1": "af_bella", "voiceId2": "am_adam"}),
    )
    .await;
    assert!(ctx.store.remove(body["storagePath"].as_str().unwrap()));

    let response = ctx
        .client
        .post_as("/voice/synthesize", &json!({"text": "Hello", "voiceId": "mix1"}), user)
        .await
        .unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_code("ARTIFACT_UNAVAILABLE")
        .assert_error_message("Delete and recreate");
    assert_eq!(ctx.synthesizer.call_count(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_row_without_artifact_as_unavailable(ctx: &TestContext) {
    let user = helpers::new_user();
    ctx.fixtures
        .create_custom_voice(user, "ghost", &format!("voices/{}/missing.npy", user))
        .await
        .unwrap();

    ctx.client
        .post_as("/voice/synthesize", &json!({"text": "Hello", "voiceId": "ghost"}), user)
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_code("ARTIFACT_UNAVAILABLE");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_custom_voices_ordered_by_name(ctx: &TestContext) {
    let user = helpers::new_user();
    for name in ["zephyr", "alpha", "mid"] {
        create_voice(
            ctx,
            user,
            json!({"name": name, "voiceId1": "af_bella", "voiceId2": "am_adam"}),
        )
        .await;
    }

    let response = ctx.client.get_as("/voice/custom", user).await.unwrap();

    response.assert_status(StatusCode::OK);
    let voices = response.body.as_ref().unwrap().as_array().unwrap().clone();
    let names: Vec<&str> = voices.iter().map(|v| v["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["alpha", "mid", "zephyr"]);
    assert!(voices.iter().all(|v| v["voiceUrl"].is_string()));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_delete_owned_custom_voice_and_artifact(ctx: &TestContext) {
    let user = helpers::new_user();
    let body = create_voice(
        ctx,
        user,
        json!({"name": "mix1", "voiceId1": "af_bella", "voiceId2": "am_adam"}),
    )
    .await;
    let id = body["id"].as_str().unwrap();
    let storage_path = body["storagePath"].as_str().unwrap();

    ctx.client
        .delete_as(&format!("/voice/custom/{}", id), user)
        .await
        .unwrap()
        .assert_status(StatusCode::NO_CONTENT);

    assert_eq!(ctx.fixtures.get_custom_voice_count(user).await.unwrap(), 0);
    assert!(ctx.store.object(storage_path).is_none());

    // The name is free again
    create_voice(
        ctx,
        user,
        json!({"name": "mix1", "voiceId1": "af_bella", "voiceId2": "am_adam"}),
    )
    .await;
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_delete_another_users_voice(ctx: &TestContext) {
    let owner = helpers::new_user();
    let body = create_voice(
        ctx,
        owner,
        json!({"name": "mix1", "voiceId1": "af_bella", "voiceId2": "am_adam"}),
    )
    .await;

    ctx.client
        .delete_as(
            &format!("/voice/custom/{}", body["id"].as_str().unwrap()),
            helpers::new_user(),
        )
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_code("NOT_FOUND");

    assert_eq!(ctx.fixtures.get_custom_voice_count(owner).await.unwrap(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_malformed_voice_id_on_delete(ctx: &TestContext) {
    ctx.client
        .delete_as("/voice/custom/not-a-uuid", helpers::new_user())
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_code("INVALID_INPUT");
}

#[test_context(CachedVoiceContext)]
#[tokio::test]
async fn it_should_serve_cached_embedding_until_voice_is_deleted(ctx: &CachedVoiceContext) {
    let user = helpers::new_user();
    let body = create_voice(
        ctx,
        user,
        json!({"name": "mix1", "voiceId1": "af_bella", "voiceId2": "am_adam"}),
    )
    .await;
    let synthesize = json!({"text": "Hello", "voiceId": "mix1"});

    for _ in 0..2 {
        ctx.client
            .post_as("/voice/synthesize", &synthesize, user)
            .await
            .unwrap()
            .assert_status(StatusCode::OK);
    }
    // Second request is served from memory
    assert_eq!(ctx.store.get_count(), 1);
    assert_eq!(ctx.synthesizer.last_voice(), Some(constant_embedding(2.0)));

    ctx.client
        .delete_as(&format!("/voice/custom/{}", body["id"].as_str().unwrap()), user)
        .await
        .unwrap()
        .assert_status(StatusCode::NO_CONTENT);

    ctx.client
        .post_as("/voice/synthesize", &synthesize, user)
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_code("VOICE_NOT_FOUND");

    // A recreated voice of the same name resolves to its new blend
    create_voice(
        ctx,
        user,
        json!({
            "name": "mix1",
            "voiceId1": "af_bella",
            "voiceId2": "am_adam",
            "weight1": 1.0,
            "weight2": 0.0
        }),
    )
    .await;
    ctx.client
        .post_as("/voice/synthesize", &synthesize, user)
        .await
        .unwrap()
        .assert_status(StatusCode::OK);
    assert_eq!(ctx.store.get_count(), 2);
    assert_eq!(ctx.synthesizer.last_voice(), Some(constant_embedding(1.0)));
}
