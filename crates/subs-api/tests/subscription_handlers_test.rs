//! Integration tests for subscription and cost handlers
//!
//! Requests go through the full actix service with the in-memory
//! repository behind the lifecycle service.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{http::header, http::StatusCode, test, web, App};
    use serde_json::{json, Value};
    use subs_api::configure;
    use subs_core::traits::SubscriptionRepository;
    use subs_db::MemorySubscriptionRepository;
    use subs_services::{DynSubscriptionService, SubscriptionService};

    const USER: &str = "11111111-1111-1111-1111-111111111111";

    fn service_data() -> web::Data<DynSubscriptionService> {
        let repo: Arc<dyn SubscriptionRepository> = Arc::new(MemorySubscriptionRepository::new());
        web::Data::new(SubscriptionService::new(repo))
    }

    fn netflix() -> Value {
        json!({
            "service_name": "Netflix",
            "price": 100,
            "user_id": USER,
            "start_date": "01-2024",
            "end_date": "06-2024"
        })
    }

    macro_rules! app {
        () => {
            test::init_service(App::new().app_data(service_data()).configure(configure)).await
        };
    }

    #[actix_web::test]
    async fn test_heartbeat() {
        let app = app!();

        let req = test::TestRequest::get().uri("/heartbeat").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_create_then_get() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/subscriptions")
            .set_json(netflix())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/subscriptions/1"
        );
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["start_date"], "01-2024");
        assert_eq!(body["end_date"], "06-2024");

        let req = test::TestRequest::get().uri("/subscriptions/1").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["service_name"], "Netflix");
        assert_eq!(body["user_id"], USER);
    }

    #[actix_web::test]
    async fn test_duplicate_create_is_conflict() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/subscriptions")
            .set_json(netflix())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/subscriptions")
            .set_json(netflix())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "user already has subscription to this service");
        assert_eq!(body["code"], "duplicate_subscription");
    }

    #[actix_web::test]
    async fn test_invalid_fields_are_listed() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/subscriptions")
            .set_json(json!({
                "service_name": "Netflix",
                "price": 100,
                "user_id": "nope",
                "start_date": "2024-01"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["fields"][0]["field"], "start_date");
        assert_eq!(body["fields"][1]["description"], "user_id should be uuid");
    }

    #[actix_web::test]
    async fn test_malformed_input_is_bad_request() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/subscriptions")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "bad request");

        let req = test::TestRequest::get().uri("/subscriptions/abc").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/subscriptions?page=first")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_update_and_delete_lifecycle() {
        let app = app!();

        let req = test::TestRequest::put()
            .uri("/subscriptions/1")
            .set_json(netflix())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/subscriptions")
            .set_json(netflix())
            .to_request();
        test::call_service(&app, req).await;

        let mut changed = netflix();
        changed["price"] = json!(120);
        changed["end_date"] = json!("");
        let req = test::TestRequest::put()
            .uri("/subscriptions/1")
            .set_json(changed)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["price"], 120);
        assert!(body.get("end_date").is_none());

        let req = test::TestRequest::delete().uri("/subscriptions/1").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri("/subscriptions/1").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_list_pagination() {
        let app = app!();

        for i in 1..=25 {
            let req = test::TestRequest::post()
                .uri("/subscriptions")
                .set_json(json!({
                    "service_name": format!("svc-{:02}", i),
                    "price": 10,
                    "user_id": USER,
                    "start_date": "01-2024"
                }))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get()
            .uri("/subscriptions?page=2&limit=10")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 10);
        assert_eq!(data[0]["id"], 11);
        assert_eq!(data[9]["id"], 20);
        assert_eq!(body["pagination"]["total"], 25);
        assert_eq!(body["pagination"]["total_pages"], 3);
    }

    #[actix_web::test]
    async fn test_total_cost() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/subscriptions")
            .set_json(netflix())
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get()
            .uri("/costs/total?start_date=03-2024&end_date=12-2024")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "total_cost": 300 }));

        let req = test::TestRequest::get()
            .uri("/costs/total?start_date=03-2024")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
