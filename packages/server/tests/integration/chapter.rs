use serde_json::{Value, json};
use uuid::Uuid;

use crate::common::{TestApp, routes, token_for};

/// `(id, title, position)` of each chapter in the course view, in view order.
fn chapters(view: &Value) -> Vec<(Uuid, String, i64)> {
    view["chapters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| {
            (
                c["id"].as_str().unwrap().parse().unwrap(),
                c["title"].as_str().unwrap().to_string(),
                c["position"].as_i64().unwrap(),
            )
        })
        .collect()
}

mod create {
    use super::*;

    #[tokio::test]
    async fn first_chapter_gets_position_one() {
        let app = TestApp::spawn().await;
        let token = token_for("user_alice");
        let course_id = app.create_course(&token, "Intro").await;

        let res = app
            .post_with_token(
                &routes::chapters(course_id),
                &json!({ "title": "Welcome" }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["message"], "Chapter created!");
        assert_eq!(res.body["chapter"]["position"], 1);
        assert_eq!(res.body["chapter"]["title"], "Welcome");
        assert_eq!(res.body["chapter"]["course_id"], course_id.to_string());
    }

    #[tokio::test]
    async fn appends_after_highest_position() {
        let app = TestApp::spawn().await;
        let token = token_for("user_alice");
        let course_id = app.create_course(&token, "Intro").await;
        for title in ["One", "Two", "Three"] {
            app.create_chapter(&token, course_id, title).await;
        }

        let res = app
            .post_with_token(
                &routes::chapters(course_id),
                &json!({ "title": "Four" }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["chapter"]["position"], 4);

        let view = app.course_view(&token, course_id).await;
        let positions: Vec<i64> = chapters(&view).into_iter().map(|c| c.2).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn positions_are_per_course() {
        let app = TestApp::spawn().await;
        let token = token_for("user_alice");
        let first = app.create_course(&token, "First").await;
        let second = app.create_course(&token, "Second").await;
        app.create_chapter(&token, first, "A").await;
        app.create_chapter(&token, first, "B").await;

        let res = app
            .post_with_token(&routes::chapters(second), &json!({ "title": "X" }), &token)
            .await;

        assert_eq!(res.body["chapter"]["position"], 1);
    }

    #[tokio::test]
    async fn empty_title_is_rejected() {
        let app = TestApp::spawn().await;
        let token = token_for("user_alice");
        let course_id = app.create_course(&token, "Intro").await;

        let res = app
            .post_with_token(&routes::chapters(course_id), &json!({ "title": " " }), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        let view = app.course_view(&token, course_id).await;
        assert!(chapters(&view).is_empty());
    }
}

mod reorder {
    use super::*;

    async fn course_with_chapters(app: &TestApp, token: &str) -> (Uuid, Vec<Uuid>) {
        let course_id = app.create_course(token, "Intro").await;
        let mut ids = Vec::new();
        for title in ["A", "B", "C"] {
            ids.push(app.create_chapter(token, course_id, title).await);
        }
        (course_id, ids)
    }

    #[tokio::test]
    async fn assigns_index_plus_one() {
        let app = TestApp::spawn().await;
        let token = token_for("user_alice");
        let (course_id, ids) = course_with_chapters(&app, &token).await;
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        let res = app
            .put_with_token(
                &routes::chapters_reorder(course_id),
                &json!({ "list": [
                    { "id": c, "position": 0 },
                    { "id": a, "position": 1 },
                    { "id": b, "position": 2 },
                ] }),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["message"], "Chapters reordered!");

        let view = app.course_view(&token, course_id).await;
        let order: Vec<(Uuid, i64)> = chapters(&view).into_iter().map(|c| (c.0, c.2)).collect();
        assert_eq!(order, vec![(c, 1), (a, 2), (b, 3)]);
    }

    #[tokio::test]
    async fn identity_order_is_stable() {
        let app = TestApp::spawn().await;
        let token = token_for("user_alice");
        let (course_id, ids) = course_with_chapters(&app, &token).await;

        let list: Vec<Value> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| json!({ "id": id, "position": i }))
            .collect();
        for _ in 0..2 {
            let res = app
                .put_with_token(
                    &routes::chapters_reorder(course_id),
                    &json!({ "list": list }),
                    &token,
                )
                .await;
            assert_eq!(res.status, 200);
        }

        let view = app.course_view(&token, course_id).await;
        let titles: Vec<String> = chapters(&view).into_iter().map(|c| c.1).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn invalid_batches_leave_order_untouched() {
        let app = TestApp::spawn().await;
        let token = token_for("user_alice");
        let (course_id, ids) = course_with_chapters(&app, &token).await;
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        let other_course = app.create_course(&token, "Other").await;
        let foreign = app.create_chapter(&token, other_course, "Foreign").await;

        let cases = [
            // empty
            json!({ "list": [] }),
            // missing a chapter
            json!({ "list": [{ "id": b, "position": 0 }, { "id": a, "position": 1 }] }),
            // chapter from another course
            json!({ "list": [
                { "id": c, "position": 0 },
                { "id": b, "position": 1 },
                { "id": foreign, "position": 2 },
            ] }),
            // unknown chapter
            json!({ "list": [
                { "id": c, "position": 0 },
                { "id": b, "position": 1 },
                { "id": Uuid::now_v7(), "position": 2 },
            ] }),
            // duplicate id
            json!({ "list": [
                { "id": c, "position": 0 },
                { "id": c, "position": 1 },
                { "id": a, "position": 2 },
            ] }),
            // duplicate position
            json!({ "list": [
                { "id": c, "position": 0 },
                { "id": b, "position": 0 },
                { "id": a, "position": 1 },
            ] }),
            // gap in positions
            json!({ "list": [
                { "id": c, "position": 0 },
                { "id": b, "position": 1 },
                { "id": a, "position": 5 },
            ] }),
            // negative position
            json!({ "list": [
                { "id": c, "position": -1 },
                { "id": b, "position": 0 },
                { "id": a, "position": 1 },
            ] }),
        ];

        for body in cases {
            let res = app
                .put_with_token(&routes::chapters_reorder(course_id), &body, &token)
                .await;
            assert_eq!(res.status, 400, "{body}: {}", res.text);
            assert_eq!(res.code(), "VALIDATION_ERROR");
        }

        let view = app.course_view(&token, course_id).await;
        let order: Vec<(Uuid, i64)> = chapters(&view).into_iter().map(|c| (c.0, c.2)).collect();
        assert_eq!(order, vec![(a, 1), (b, 2), (c, 3)]);

        let other = app.course_view(&token, other_course).await;
        assert_eq!(chapters(&other)[0].2, 1);
    }

    #[tokio::test]
    async fn append_after_reorder_continues_sequence() {
        let app = TestApp::spawn().await;
        let token = token_for("user_alice");
        let (course_id, ids) = course_with_chapters(&app, &token).await;

        let res = app
            .put_with_token(
                &routes::chapters_reorder(course_id),
                &json!({ "list": [
                    { "id": ids[2], "position": 0 },
                    { "id": ids[1], "position": 1 },
                    { "id": ids[0], "position": 2 },
                ] }),
                &token,
            )
            .await;
        assert_eq!(res.status, 200);

        let res = app
            .post_with_token(&routes::chapters(course_id), &json!({ "title": "D" }), &token)
            .await;
        assert_eq!(res.body["chapter"]["position"], 4);
    }
}

mod get {
    use super::*;

    #[tokio::test]
    async fn returns_chapter_of_course() {
        let app = TestApp::spawn().await;
        let token = token_for("user_alice");
        let course_id = app.create_course(&token, "Intro").await;
        let chapter_id = app.create_chapter(&token, course_id, "Welcome").await;

        let res = app
            .get_with_token(&routes::chapter(course_id, chapter_id), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "Welcome");
        assert_eq!(res.body["position"], 1);
    }

    #[tokio::test]
    async fn chapter_of_other_course_is_not_found() {
        let app = TestApp::spawn().await;
        let token = token_for("user_alice");
        let course_id = app.create_course(&token, "Intro").await;
        let other = app.create_course(&token, "Other").await;
        let chapter_id = app.create_chapter(&token, other, "Elsewhere").await;

        let res = app
            .get_with_token(&routes::chapter(course_id, chapter_id), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
    }
}
