use axum::http::{Method, StatusCode};
use integration_tests::{TestApp, TestUser};
use serde_json::{json, Value};
use uuid::Uuid;

async fn create_site(app: &TestApp, admin: &TestUser, name: &str) -> String {
    let res = app
        .request(
            Method::POST,
            "/sites",
            Some(admin),
            Some(json!({ "name": name, "description": "Ocean views" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{:?}", res.body);
    res.body["id"].as_str().unwrap().to_string()
}

async fn add_comment(app: &TestApp, site_id: &str, caller: &TestUser, rating: u8, text: &str) -> Value {
    let res = app
        .request(
            Method::POST,
            &format!("/sites/{site_id}/comments"),
            Some(caller),
            Some(json!({ "rating": rating, "text": text })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{:?}", res.body);
    res.body
}

fn comment_ids(site: &Value) -> Vec<String> {
    site["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn cliffside_comment_lifecycle() {
    let app = TestApp::new();
    let admin = app.register("admin", true);
    let alice = app.register("alice", false);
    let bob = app.register("bob", false);

    let created = app
        .request(
            Method::POST,
            "/sites",
            Some(&admin),
            Some(json!({ "name": "Cliffside", "description": "Ocean views" })),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["comments"], json!([]));
    let site_id = created.body["id"].as_str().unwrap().to_string();

    let site = add_comment(&app, &site_id, &alice, 5, "Great").await;
    assert_eq!(site["comments"].as_array().unwrap().len(), 1);
    assert_eq!(site["comments"][0]["author"]["id"], alice.id.to_string());
    let comment_id = site["comments"][0]["id"].as_str().unwrap().to_string();
    let comment_uri = format!("/sites/{site_id}/comments/{comment_id}");

    let denied = app
        .request(Method::PUT, &comment_uri, Some(&bob), Some(json!({ "text": "Mine now" })))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["message"], "You are not authorized to update this comment!");

    let updated = app
        .request(
            Method::PUT,
            &comment_uri,
            Some(&alice),
            Some(json!({ "text": "Great, bring bug spray" })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["comments"][0]["rating"], 5);
    assert_eq!(updated.body["comments"][0]["text"], "Great, bring bug spray");

    let rerated = app
        .request(Method::PUT, &comment_uri, Some(&alice), Some(json!({ "rating": 3 })))
        .await;
    assert_eq!(rerated.status, StatusCode::OK);
    assert_eq!(rerated.body["comments"][0]["rating"], 3);
    assert_eq!(rerated.body["comments"][0]["text"], "Great, bring bug spray");

    let deleted = app.request(Method::DELETE, &comment_uri, Some(&alice), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["comments"], json!([]));
}

#[tokio::test]
async fn missing_site_is_404_naming_the_id() {
    let app = TestApp::new();
    let missing = Uuid::now_v7();

    for uri in [format!("/sites/{missing}"), format!("/sites/{missing}/comments")] {
        let res = app.request(Method::GET, &uri, None, None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert!(res.body["message"].as_str().unwrap().contains(&missing.to_string()));
    }
}

#[tokio::test]
async fn bulk_comment_put_is_refused_and_changes_nothing() {
    let app = TestApp::new();
    let admin = app.register("admin", true);
    let alice = app.register("alice", false);
    let site_id = create_site(&app, &admin, "Cliffside").await;
    add_comment(&app, &site_id, &alice, 4, "Windy").await;

    let uri = format!("/sites/{site_id}/comments");
    let res = app
        .request(Method::PUT, &uri, Some(&admin), Some(json!([{ "rating": 1, "text": "x" }])))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(
        res.body["message"],
        format!("PUT operation not supported on /sites/{site_id}/comments")
    );

    let listed = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);
    assert_eq!(listed.body[0]["text"], "Windy");
}

#[tokio::test]
async fn delete_all_comments_requires_admin() {
    let app = TestApp::new();
    let admin = app.register("admin", true);
    let alice = app.register("alice", false);
    let bob = app.register("bob", false);
    let site_id = create_site(&app, &admin, "Cliffside").await;
    add_comment(&app, &site_id, &alice, 4, "one").await;
    add_comment(&app, &site_id, &bob, 3, "two").await;

    let uri = format!("/sites/{site_id}/comments");
    let rejected = app.request(Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(rejected.status, StatusCode::FORBIDDEN);

    let cleared = app.request(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(cleared.body["comments"], json!([]));

    let anonymous = app.request(Method::DELETE, &uri, None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn removing_one_comment_keeps_the_others_in_order() {
    let app = TestApp::new();
    let admin = app.register("admin", true);
    let alice = app.register("alice", false);
    let bob = app.register("bob", false);
    let site_id = create_site(&app, &admin, "Cliffside").await;
    add_comment(&app, &site_id, &alice, 5, "first").await;
    add_comment(&app, &site_id, &bob, 4, "second").await;
    let site = add_comment(&app, &site_id, &alice, 3, "third").await;
    let ids = comment_ids(&site);

    let denied = app
        .request(Method::DELETE, &format!("/sites/{site_id}/comments/{}", ids[1]), Some(&alice), None)
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["message"], "You are not authorized to delete this comment!");

    let res = app
        .request(Method::DELETE, &format!("/sites/{site_id}/comments/{}", ids[1]), Some(&bob), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(comment_ids(&res.body), vec![ids[0].clone(), ids[2].clone()]);
}

#[tokio::test]
async fn unknown_comment_is_404_not_403() {
    let app = TestApp::new();
    let admin = app.register("admin", true);
    let alice = app.register("alice", false);
    let site_id = create_site(&app, &admin, "Cliffside").await;
    let missing = Uuid::now_v7();

    let res = app
        .request(
            Method::PUT,
            &format!("/sites/{site_id}/comments/{missing}"),
            Some(&alice),
            Some(json!({ "rating": 2 })),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], format!("Comment {missing} not found"));
}

#[tokio::test]
async fn client_supplied_author_is_ignored() {
    let app = TestApp::new();
    let admin = app.register("admin", true);
    let alice = app.register("alice", false);
    let site_id = create_site(&app, &admin, "Cliffside").await;

    let res = app
        .request(
            Method::POST,
            &format!("/sites/{site_id}/comments"),
            Some(&alice),
            Some(json!({ "rating": 5, "text": "Great", "author": admin.id })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["comments"][0]["author"]["id"], alice.id.to_string());
}

#[tokio::test]
async fn deleted_author_reads_as_null() {
    let app = TestApp::new();
    let admin = app.register("admin", true);
    let alice = app.register("alice", false);
    let site_id = create_site(&app, &admin, "Cliffside").await;
    let site = add_comment(&app, &site_id, &alice, 5, "Great").await;
    let comment_id = comment_ids(&site).remove(0);

    app.users.remove(alice.id);

    let listed = app
        .request(Method::GET, &format!("/sites/{site_id}/comments"), None, None)
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body[0]["author"], Value::Null);
    assert_eq!(listed.body[0]["text"], "Great");

    let one = app
        .request(Method::GET, &format!("/sites/{site_id}/comments/{comment_id}"), None, None)
        .await;
    assert_eq!(one.status, StatusCode::OK);
    assert_eq!(one.body["author"], Value::Null);

    let all = app.request(Method::GET, "/sites", None, None).await;
    assert_eq!(all.body[0]["comments"][0]["author"], Value::Null);
}

#[tokio::test]
async fn posting_to_a_single_comment_is_not_supported() {
    let app = TestApp::new();
    let admin = app.register("admin", true);
    let alice = app.register("alice", false);
    let site_id = create_site(&app, &admin, "Cliffside").await;
    let site = add_comment(&app, &site_id, &alice, 5, "Great").await;
    let comment_id = comment_ids(&site).remove(0);

    let res = app
        .request(
            Method::POST,
            &format!("/sites/{site_id}/comments/{comment_id}"),
            Some(&alice),
            Some(json!({ "rating": 1 })),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(
        res.body["message"],
        format!("POST operation not supported on /sites/{site_id}/comments/{comment_id}")
    );
}
