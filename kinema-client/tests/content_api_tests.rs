mod common;

use common::{test_setup, tokens};
use kinema_client::ApiError;
use kinema_client::catalog::{self, ProgressStats};
use kinema_model::{
    AnswerType, Difficulty, NewTask, NewTopic, SchoolClass, TaskImage,
};
use mockito::Matcher;
use serde_json::{Value, json};

fn task_json(id: &str, topic_id: &str, difficulty: &str, status: &str, day: u32) -> Value {
    json!({
        "id": id,
        "title": format!("Task {id}"),
        "description": "",
        "content": "",
        "bodyMd": "",
        "difficulty": difficulty,
        "status": status,
        "topicId": topic_id,
        "createdAt": format!("2024-09-{day:02}T10:00:00Z"),
        "updatedAt": format!("2024-09-{day:02}T10:00:00Z")
    })
}

fn topic_json(id: &str, class: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Topic {id}"),
        "slug": id,
        "createdAt": "2024-09-01T10:00:00Z",
        "updatedAt": "2024-09-01T10:00:00Z",
        "schoolClass": class
    })
}

#[tokio::test]
async fn lists_topics() {
    let mut setup = test_setup(&tokens("A1", "R1")).await;
    setup
        .server
        .mock("GET", "/api/v1/content/topics")
        .match_header("authorization", "Bearer A1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([topic_json("t1", "NINE"), topic_json("t2", "ELEVEN")]).to_string())
        .create_async()
        .await;

    let topics = setup.client.content().topics().await.unwrap();

    assert_eq!(topics.len(), 2);
    assert_eq!(topics[0].school_class, Some(SchoolClass::Nine));
    assert_eq!(topics[1].title, "Topic t2");
}

#[tokio::test]
async fn non_success_status_becomes_status_error() {
    let mut setup = test_setup(&tokens("A1", "R1")).await;
    setup
        .server
        .mock("GET", "/api/v1/content/tasks/missing")
        .with_status(404)
        .with_body(r#"{"message":"Task not found"}"#)
        .create_async()
        .await;

    let err = setup.client.content().task("missing").await.unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
    assert!(!err.is_session_expired());
    match err {
        ApiError::Status { body, .. } => assert!(body.contains("Task not found")),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_body_is_decode_error() {
    let mut setup = test_setup(&tokens("A1", "R1")).await;
    setup
        .server
        .mock("GET", "/api/v1/content/tasks/drafts")
        .with_status(200)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    let err = setup.client.content().draft_tasks().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn creates_topic_with_class() {
    let mut setup = test_setup(&tokens("A1", "R1")).await;
    let mock = setup
        .server
        .mock("POST", "/api/v1/content/topics")
        .match_body(Matcher::Json(json!({ "title": "Optics", "schoolClass": "NINE" })))
        .with_status(201)
        .with_body(topic_json("t9", "NINE").to_string())
        .expect(1)
        .create_async()
        .await;

    let topic = setup
        .client
        .content()
        .create_topic(&NewTopic {
            title: "Optics".into(),
            school_class: SchoolClass::Nine,
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(topic.id, "t9");
}

#[tokio::test]
async fn creates_task_as_multipart_with_image() {
    let mut setup = test_setup(&tokens("A1", "R1")).await;
    let mock = setup
        .server
        .mock("POST", "/api/v1/content/tasks")
        .match_header("authorization", "Bearer A1")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".into()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="title""#.into()),
            Matcher::Regex("Inclined plane".into()),
            Matcher::Regex(r#"name="difficulty""#.into()),
            Matcher::Regex("HARD".into()),
            Matcher::Regex(r#"filename="plane.png""#.into()),
        ]))
        .with_status(201)
        .with_body(task_json("42", "t1", "HARD", "DRAFT", 1).to_string())
        .expect(1)
        .create_async()
        .await;

    let task = setup
        .client
        .content()
        .create_task(&NewTask {
            title: "Inclined plane".into(),
            body_md: "A block slides".into(),
            difficulty: Difficulty::Hard,
            topic_id: "t1".into(),
            official_solution: "a = g sin(theta)".into(),
            correct_answer: "4.9".into(),
            answer_type: AnswerType::Number,
            image: Some(TaskImage {
                file_name: "plane.png".into(),
                mime_type: "image/png".into(),
                bytes: b"not really a png".to_vec(),
            }),
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(task.id, "42");
    assert_eq!(task.difficulty, Difficulty::Hard);
}

#[tokio::test]
async fn publishes_and_deletes_tasks() {
    let mut setup = test_setup(&tokens("A1", "R1")).await;
    let publish = setup
        .server
        .mock("POST", "/api/v1/content/tasks/publish")
        .match_body(Matcher::Json(json!({ "taskId": "42" })))
        .with_status(200)
        .with_body(task_json("42", "t1", "EASY", "PUBLISHED", 1).to_string())
        .expect(1)
        .create_async()
        .await;
    let delete = setup
        .server
        .mock("DELETE", "/api/v1/content/tasks/42")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let task = setup.client.content().publish_task("42").await.unwrap();
    assert!(task.status.is_published());
    setup.client.content().delete_task("42").await.unwrap();

    publish.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn submits_answer() {
    let mut setup = test_setup(&tokens("A1", "R1")).await;
    setup
        .server
        .mock("POST", "/api/v1/content/tasks/42/submit")
        .match_body(Matcher::Json(json!({ "answer": "9.8" })))
        .with_status(200)
        .with_body(r#"{"isCorrect":true,"attempts":2}"#)
        .create_async()
        .await;

    let result = setup
        .client
        .content()
        .submit_answer("42", "9.8")
        .await
        .unwrap();

    assert!(result.is_accepted());
    assert_eq!(result.details.get("attempts"), Some(&json!(2)));
}

#[tokio::test]
async fn lists_users() {
    let mut setup = test_setup(&tokens("A1", "R1")).await;
    setup
        .server
        .mock("GET", "/api/v1/users")
        .with_status(200)
        .with_body(
            json!([{
                "id": "u1",
                "email": "root@example.com",
                "name": "Root",
                "role": "ADMIN",
                "createdAt": "2024-01-01T00:00:00Z"
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let users = setup.client.users().users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].role.is_admin());
}

#[tokio::test]
async fn catalog_skips_failing_topics_and_sorts() {
    let mut setup = test_setup(&tokens("A1", "R1")).await;
    setup
        .server
        .mock("GET", "/api/v1/content/topics")
        .with_status(200)
        .with_body(json!([topic_json("t1", "SEVEN"), topic_json("t2", "EIGHT")]).to_string())
        .create_async()
        .await;
    setup
        .server
        .mock("GET", "/api/v1/content/topics/t1/tasks")
        .with_status(200)
        .with_body(
            json!([
                task_json("hard", "t1", "HARD", "PUBLISHED", 1),
                task_json("draft", "t1", "EASY", "DRAFT", 1),
                task_json("easy", "t1", "EASY", "PUBLISHED", 3),
            ])
            .to_string(),
        )
        .create_async()
        .await;
    setup
        .server
        .mock("GET", "/api/v1/content/topics/t2/tasks")
        .with_status(500)
        .create_async()
        .await;
    setup
        .server
        .mock("GET", "/api/v1/content/tasks/progress")
        .with_status(200)
        .with_body(r#"[{"taskId":"easy","status":"SOLVED"}]"#)
        .create_async()
        .await;

    let tasks = catalog::load_published(setup.client.content()).await.unwrap();
    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["easy", "hard"]);

    let progress = setup.client.content().progress().await.unwrap();
    let stats = ProgressStats::new(&tasks, &progress);
    assert_eq!(stats.solved, 1);
    assert!((stats.completion_percent() - 50.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn updates_topic_and_task() {
    let mut setup = test_setup(&tokens("A1", "R1")).await;
    let topic = setup
        .server
        .mock("PUT", "/api/v1/content/topics/t1")
        .match_body(Matcher::Json(json!({ "title": "Waves", "schoolClass": "TEN" })))
        .with_status(200)
        .with_body(topic_json("t1", "TEN").to_string())
        .expect(1)
        .create_async()
        .await;
    let task = setup
        .server
        .mock("PUT", "/api/v1/content/tasks/42")
        .match_body(Matcher::Json(json!({
            "title": "Pendulum",
            "bodyMd": "Find the period",
            "difficulty": "MEDIUM",
            "topicId": "t1"
        })))
        .with_status(200)
        .with_body(task_json("42", "t1", "MEDIUM", "DRAFT", 2).to_string())
        .expect(1)
        .create_async()
        .await;

    let updated_topic = setup
        .client
        .content()
        .update_topic(
            "t1",
            &NewTopic {
                title: "Waves".into(),
                school_class: SchoolClass::Ten,
            },
        )
        .await
        .unwrap();
    let updated_task = setup
        .client
        .content()
        .update_task(
            "42",
            &kinema_model::TaskUpdate {
                title: "Pendulum".into(),
                body_md: "Find the period".into(),
                difficulty: Difficulty::Medium,
                topic_id: "t1".into(),
                official_solution: None,
                correct_answer: None,
                answer_type: None,
            },
        )
        .await
        .unwrap();

    topic.assert_async().await;
    task.assert_async().await;
    assert_eq!(updated_topic.school_class, Some(SchoolClass::Ten));
    assert_eq!(updated_task.difficulty, Difficulty::Medium);
}

#[tokio::test]
async fn catalog_reuses_fetched_topics() {
    let mut setup = test_setup(&tokens("A1", "R1")).await;
    let topics_mock = setup
        .server
        .mock("GET", "/api/v1/content/topics")
        .with_status(200)
        .with_body(json!([topic_json("t1", "NINE")]).to_string())
        .expect(1)
        .create_async()
        .await;
    setup
        .server
        .mock("GET", "/api/v1/content/topics/t1/tasks")
        .with_status(200)
        .with_body(json!([task_json("a", "t1", "MEDIUM", "PUBLISHED", 2)]).to_string())
        .expect(1)
        .create_async()
        .await;

    let topics = setup.client.content().topics().await.unwrap();
    let tasks = catalog::load_published_for(setup.client.content(), &topics)
        .await
        .unwrap();

    topics_mock.assert_async().await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(catalog::topic_class(&topics, &tasks[0].topic_id), 9);
}
