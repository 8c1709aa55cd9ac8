//! PostgreSQL store tests
//!
//! Run against a scratch database:
//! `DATABASE_URL=postgres://... cargo test -p share-api --test pg_store_tests -- --ignored`
//!
//! Tests share one database, so they run serially and only assert on rows
//! they created themselves (except where noted).

use db_pool::{create_pool, DbConfig};
use serial_test::serial;
use share_api::db::{NewMessage, NewPost, NewUser, PgStore, Store, StoreError, UserRecord};
use uuid::Uuid;

async fn pg_store() -> PgStore {
    let config = DbConfig::from_env("share-api-tests").expect("DATABASE_URL must be set");
    let pool = create_pool(config).await.expect("database should be reachable");
    let store = PgStore::new(pool);
    store.migrate().await.expect("migrations should apply");
    store
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

async fn insert_user(store: &PgStore) -> UserRecord {
    let username = unique("user");
    store
        .insert_user(NewUser {
            email: format!("{username}@example.com"),
            username,
            password_hash: "$argon2id$placeholder".to_string(),
        })
        .await
        .expect("user insert should succeed")
}

fn new_post(title: &str, created_by: Uuid) -> NewPost {
    NewPost {
        title: title.to_string(),
        image_url: "https://example.com/a.png".to_string(),
        categories: vec!["Art".to_string(), "Nature".to_string()],
        description: "desc".to_string(),
        created_by,
    }
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
#[serial]
#[ignore = "Requires PostgreSQL database"]
async fn test_insert_and_find_user() {
    let store = pg_store().await;
    let user = insert_user(&store).await;

    assert!(user.favorites.is_empty());

    let found = store
        .find_user_by_username(&user.username)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(found.email, user.email);

    assert!(store
        .find_user_by_username(&unique("missing"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
#[serial]
#[ignore = "Requires PostgreSQL database"]
async fn test_duplicate_username_maps_to_duplicate() {
    let store = pg_store().await;
    let user = insert_user(&store).await;

    let result = store
        .insert_user(NewUser {
            username: user.username.clone(),
            email: "other@example.com".to_string(),
            password_hash: "hash".to_string(),
        })
        .await;

    assert!(matches!(result, Err(StoreError::Duplicate(name)) if name == user.username));
}

#[tokio::test]
#[serial]
#[ignore = "Requires PostgreSQL database"]
async fn test_find_users_by_ids_skips_unknown() {
    let store = pg_store().await;
    let a = insert_user(&store).await;
    let b = insert_user(&store).await;

    let mut found: Vec<Uuid> = store
        .find_users_by_ids(&[a.id, Uuid::new_v4(), b.id])
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    found.sort();

    let mut expected = vec![a.id, b.id];
    expected.sort();
    assert_eq!(found, expected);
}

// =============================================================================
// Posts
// =============================================================================

#[tokio::test]
#[serial]
#[ignore = "Requires PostgreSQL database"]
async fn test_insert_and_find_post() {
    let store = pg_store().await;
    let user = insert_user(&store).await;

    let post = store.insert_post(new_post("Sunset", user.id)).await.unwrap();
    assert_eq!(post.likes, 0);
    assert!(post.messages.is_empty());
    assert_eq!(post.categories, vec!["Art", "Nature"]);

    let found = store.find_post(post.id).await.unwrap().unwrap();
    assert_eq!(found.title, "Sunset");
    assert_eq!(found.created_by, user.id);

    assert!(store.find_post(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
#[ignore = "Requires PostgreSQL database"]
async fn test_post_with_unknown_author_is_accepted() {
    let store = pg_store().await;
    let ghost = Uuid::new_v4();

    let post = store.insert_post(new_post("Orphan", ghost)).await.unwrap();

    assert_eq!(post.created_by, ghost);
    assert!(store.find_users_by_ids(&[ghost]).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
#[ignore = "Requires PostgreSQL database"]
async fn test_list_posts_newest_first_and_unbounded_limit() {
    let store = pg_store().await;
    let user = insert_user(&store).await;

    let mut ids = Vec::new();
    for i in 0..3 {
        ids.push(store.insert_post(new_post(&format!("post {i}"), user.id)).await.unwrap().id);
    }

    // Serial execution: the three newest rows are ours
    let newest: Vec<Uuid> = store
        .list_posts(0, Some(3))
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(newest, vec![ids[2], ids[1], ids[0]]);

    let skipped: Vec<Uuid> = store
        .list_posts(1, Some(1))
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(skipped, vec![ids[1]]);

    let total = store.count_posts().await.unwrap();
    let all = store.list_posts(0, None).await.unwrap();
    assert_eq!(all.len() as i64, total);
}

#[tokio::test]
#[serial]
#[ignore = "Requires PostgreSQL database"]
async fn test_find_posts_by_ids() {
    let store = pg_store().await;
    let user = insert_user(&store).await;
    let post = store.insert_post(new_post("Batch", user.id)).await.unwrap();

    let found = store
        .find_posts_by_ids(&[post.id, Uuid::new_v4()])
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, post.id);
}

// =============================================================================
// Messages, likes, favorites
// =============================================================================

#[tokio::test]
#[serial]
#[ignore = "Requires PostgreSQL database"]
async fn test_prepend_message_round_trips_through_jsonb() {
    let store = pg_store().await;
    let user = insert_user(&store).await;
    let post = store.insert_post(new_post("Chat", user.id)).await.unwrap();

    let mut stored = Vec::new();
    for body in ["first", "second"] {
        let message = store
            .prepend_message(
                post.id,
                NewMessage {
                    message_body: body.to_string(),
                    message_user: user.id,
                },
            )
            .await
            .unwrap()
            .unwrap();
        stored.push(message);
    }

    let found = store.find_post(post.id).await.unwrap().unwrap();
    assert_eq!(found.messages.len(), 2);
    assert_eq!(found.messages[0], stored[1]);
    assert_eq!(found.messages[1], stored[0]);

    let missing = store
        .prepend_message(
            Uuid::new_v4(),
            NewMessage {
                message_body: "lost".to_string(),
                message_user: user.id,
            },
        )
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
#[serial]
#[ignore = "Requires PostgreSQL database"]
async fn test_add_likes_is_unguarded() {
    let store = pg_store().await;
    let user = insert_user(&store).await;
    let post = store.insert_post(new_post("Likes", user.id)).await.unwrap();

    assert_eq!(store.add_likes(post.id, 1).await.unwrap(), Some(1));
    assert_eq!(store.add_likes(post.id, -1).await.unwrap(), Some(0));
    assert_eq!(store.add_likes(post.id, -1).await.unwrap(), Some(-1));
    assert_eq!(store.add_likes(Uuid::new_v4(), 1).await.unwrap(), None);
}

#[tokio::test]
#[serial]
#[ignore = "Requires PostgreSQL database"]
async fn test_favorites_are_an_ordered_set() {
    let store = pg_store().await;
    let user = insert_user(&store).await;
    let first = store.insert_post(new_post("one", user.id)).await.unwrap();
    let second = store.insert_post(new_post("two", user.id)).await.unwrap();

    store.add_favorite(&user.username, second.id).await.unwrap();
    store.add_favorite(&user.username, first.id).await.unwrap();
    let favorites = store.add_favorite(&user.username, second.id).await.unwrap();
    assert_eq!(favorites, Some(vec![second.id, first.id]));

    let favorites = store.remove_favorite(&user.username, second.id).await.unwrap();
    assert_eq!(favorites, Some(vec![first.id]));

    // removing an absent id leaves the set alone
    let favorites = store.remove_favorite(&user.username, second.id).await.unwrap();
    assert_eq!(favorites, Some(vec![first.id]));

    let nobody = unique("nobody");
    assert_eq!(store.add_favorite(&nobody, first.id).await.unwrap(), None);
    assert_eq!(store.remove_favorite(&nobody, first.id).await.unwrap(), None);
}

#[tokio::test]
#[serial]
#[ignore = "Requires PostgreSQL database"]
async fn test_health_check() {
    let store = pg_store().await;
    store.health_check().await.unwrap();
}
