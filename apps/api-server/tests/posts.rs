#[macro_use]
mod common;

use actix_web::http::{StatusCode, header};
use actix_web::test;
use serde_json::{Value, json};

use common::{bearer, post_body, test_state};
use devconnect_core::domain::{Role, User};

macro_rules! create_post {
    ($app:expr, $token:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&$token))
            .set_json($body)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body
    }};
}

#[actix_web::test]
async fn test_dashboard_requires_session() {
    let app = test_app!(test_state());

    let req = test::TestRequest::get().uri("/api/dashboard").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/sign-in");
}

#[actix_web::test]
async fn test_create_post_derives_slug_read_time_and_tags() {
    let app = test_app!(test_state());
    let token = sign_up!(app, "ada@dev.io");

    let post = create_post!(
        app,
        token,
        post_body("Hello, World!", true, &["  Web   Dev!! ", "Rust", "rust"])
    );

    assert_eq!(post["slug"], "hello-world");
    assert_eq!(post["read_time"], 3);
    let tags: Vec<&str> = post["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["slug"].as_str().unwrap())
        .collect();
    assert_eq!(tags, vec!["web-dev", "rust"]);
}

#[actix_web::test]
async fn test_taken_slug_gets_suffix() {
    let app = test_app!(test_state());
    let token = sign_up!(app, "ada@dev.io");

    let first = create_post!(app, token, post_body("Same Title", true, &[]));
    let second = create_post!(app, token, post_body("Same Title", true, &[]));

    assert_eq!(first["slug"], "same-title");
    let slug = second["slug"].as_str().unwrap();
    assert!(slug.starts_with("same-title-"));
    assert_eq!(slug.len(), "same-title-".len() + 8);
}

#[actix_web::test]
async fn test_article_visibility() {
    let app = test_app!(test_state());
    let token = sign_up!(app, "ada@dev.io");

    create_post!(app, token, post_body("Draft Post", false, &[]));
    create_post!(app, token, post_body("Live Post", true, &["rust"]));

    let req = test::TestRequest::get().uri("/api/articles/draft-post").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::get().uri("/api/articles/live-post").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["author"]["name"], "Dev");
    assert_eq!(body["tags"][0]["slug"], "rust");
    assert!(body["content"].is_string());
    assert!(body.get("bookmarked").is_none());
}

#[actix_web::test]
async fn test_tag_page_lists_published_posts() {
    let app = test_app!(test_state());
    let token = sign_up!(app, "ada@dev.io");

    create_post!(app, token, post_body("First", true, &["rust"]));
    create_post!(app, token, post_body("Hidden", false, &["rust"]));
    create_post!(app, token, post_body("Second", true, &["rust"]));

    let req = test::TestRequest::get().uri("/api/tags/rust").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["tag"]["name"], "rust");
    let slugs: Vec<&str> = body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["second", "first"]);

    let req = test::TestRequest::get().uri("/api/tags/cobol").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_only_author_or_admin_may_modify() {
    let state = test_state();
    let users = state.repos.users.clone();
    let app = test_app!(state);

    let author = sign_up!(app, "ada@dev.io");
    let other = sign_up!(app, "bob@dev.io");
    let admin = sign_up!(app, "root@dev.io");

    let mut root: User = users.find_by_email("root@dev.io").await.unwrap().unwrap();
    root.role = Role::Admin;
    users.update(root).await.unwrap();

    let post = create_post!(app, author, post_body("Mine", true, &["rust"]));
    let uri = format!("/api/posts/{}", post["id"].as_str().unwrap());

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&other))
        .set_json(post_body("Stolen", true, &[]))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&admin))
        .set_json(post_body("Edited", true, &["web"]))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["title"], "Edited");
    assert_eq!(body["slug"], "mine");
    assert_eq!(body["author"]["name"], "Dev");
    assert_eq!(body["tags"][0]["slug"], "web");

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&other))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&author))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::get().uri("/api/articles/mine").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_invalid_post_is_rejected() {
    let app = test_app!(test_state());
    let token = sign_up!(app, "ada@dev.io");

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "   ", "content": "body" }))
        .to_request();

    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn test_bookmarks_are_idempotent_and_listed_on_dashboard() {
    let app = test_app!(test_state());
    let token = sign_up!(app, "ada@dev.io");

    let post = create_post!(app, token, post_body("Keep Me", true, &[]));
    let uri = format!("/api/posts/{}/bookmark", post["id"].as_str().unwrap());

    let mut ids = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(&token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        ids.push(body["id"].clone());
    }
    assert_eq!(ids[0], ids[1]);

    let req = test::TestRequest::get()
        .uri("/api/articles/keep-me")
        .insert_header(bearer(&token))
        .to_request();
    let article: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(article["bookmarked"], true);

    let req = test::TestRequest::get()
        .uri("/api/dashboard")
        .insert_header(bearer(&token))
        .to_request();
    let dashboard: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(dashboard["posts"].as_array().unwrap().len(), 1);
    assert_eq!(dashboard["bookmarks"].as_array().unwrap().len(), 1);
    assert_eq!(dashboard["bookmarks"][0]["post"]["slug"], "keep-me");

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::get()
        .uri("/api/dashboard")
        .insert_header(bearer(&token))
        .to_request();
    let dashboard: Value = test::call_and_read_body_json(&app, req).await;
    assert!(dashboard["bookmarks"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_comments() {
    let app = test_app!(test_state());
    let token = sign_up!(app, "ada@dev.io");

    let post = create_post!(app, token, post_body("Discuss", true, &[]));
    let uri = format!("/api/posts/{}/comments", post["id"].as_str().unwrap());

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({ "content": "anonymous" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    for content in ["first", "second"] {
        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(&token))
            .set_json(json!({ "content": content }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = test::TestRequest::get().uri(&uri).to_request();
    let comments: Value = test::call_and_read_body_json(&app, req).await;
    let contents: Vec<&str> = comments
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["first", "second"]);
    assert_eq!(comments[0]["author"]["name"], "Dev");

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&token))
        .set_json(json!({ "content": "   " }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn test_developer_directory() {
    let app = test_app!(test_state());
    sign_up!(app, "ada@dev.io");
    sign_up!(app, "bob@dev.io");

    let req = test::TestRequest::get().uri("/api/developers").to_request();
    let developers: Value = test::call_and_read_body_json(&app, req).await;

    let developers = developers.as_array().unwrap();
    assert_eq!(developers.len(), 2);
    assert!(developers.iter().all(|d| d.get("email").is_none()));
    assert_eq!(developers[0]["role"], "USER");
}

#[actix_web::test]
async fn test_malformed_post_id_is_not_found() {
    let app = test_app!(test_state());

    let req = test::TestRequest::get()
        .uri("/api/posts/not-a-uuid/comments")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}
