//! REST adapters against a mock backend.

use std::sync::Arc;

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

use ag_core::filters::Filters;
use ag_core::ids::{DemandId, ListingId, MatchId, TransportId, UserId};
use ag_core::marketplace::{
    AssignDriver, Demand, MatchCommand, MatchStatus, Produce, SmsRequest, SuggestionQuery,
};
use ag_core::ports::{
    ApiError, MatchPort, MessagePort, ResourceReadPort, ResourceWritePort, SmsPort, TransportPort,
    UserProfilePort, VerificationAdminPort,
};
use ag_core::user::{ProfileUpdate, Tier, VerificationDecision, VerificationStatus};
use ag_infra::{ApiClient, StaticSession};

async fn backend() -> (ServerGuard, ApiClient) {
    let server = Server::new_async().await;
    let client = ApiClient::new(
        &format!("{}/api", server.url()),
        Arc::new(StaticSession::new(Some("tok".into()))),
    )
    .unwrap();
    (server, client)
}

#[tokio::test]
async fn list_sends_only_non_empty_filters() {
    let (mut server, client) = backend().await;
    let mock = server
        .mock("GET", "/api/demand")
        .match_query(Matcher::Exact("crop=maize&minPrice=50".into()))
        .match_header("authorization", "Bearer tok")
        .with_body(json!([{"_id": "d1", "crop": "maize"}]).to_string())
        .create_async()
        .await;

    let filters = Filters::new()
        .with("crop", "maize")
        .with("county", "")
        .with("minPrice", 50);
    let demands = ResourceReadPort::<Demand>::list(&client, &filters)
        .await
        .unwrap();

    assert_eq!(demands.len(), 1);
    assert_eq!(demands[0].id, DemandId::from("d1"));
    mock.assert_async().await;
}

#[tokio::test]
async fn detail_and_delete_use_the_resource_path() {
    let (mut server, client) = backend().await;
    server
        .mock("GET", "/api/produce/p1")
        .with_body(json!({"_id": "p1", "crop": "beans"}).to_string())
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/api/produce/p1")
        .with_status(204)
        .create_async()
        .await;

    let id = ListingId::from("p1");
    let listing = ResourceReadPort::<Produce>::get(&client, &id).await.unwrap();
    ResourceWritePort::<Produce>::delete(&client, &id)
        .await
        .unwrap();

    assert_eq!(listing.crop, "beans");
    delete.assert_async().await;
}

#[tokio::test]
async fn transport_views_are_posted() {
    let (mut server, client) = backend().await;
    let mock = server
        .mock("POST", "/api/transport/t1/views")
        .with_body(json!({"views": 4}).to_string())
        .expect(1)
        .create_async()
        .await;

    client
        .increment_views(&TransportId::from("t1"))
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn assign_driver_posts_the_assignment() {
    let (mut server, client) = backend().await;
    let mock = server
        .mock("POST", "/api/match/m1/assign-driver")
        .match_body(Matcher::Json(json!({"driverId": "u9"})))
        .with_body(json!({"_id": "m1", "status": "in_transit"}).to_string())
        .create_async()
        .await;

    let updated = client
        .apply(
            &MatchId::from("m1"),
            &MatchCommand::AssignDriver(AssignDriver {
                driver_id: UserId::from("u9"),
                transport_id: None,
            }),
        )
        .await
        .unwrap();

    assert_eq!(updated.status, MatchStatus::InTransit);
    mock.assert_async().await;
}

#[tokio::test]
async fn suggestions_carry_type_and_limit() {
    let (mut server, client) = backend().await;
    let mock = server
        .mock("GET", "/api/matching/suggestions")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("type".into(), "forDemand".into()),
            Matcher::UrlEncoded("demandId".into(), "d1".into()),
            Matcher::UrlEncoded("limit".into(), "5".into()),
        ]))
        .with_body(json!([{"score": 0.9, "reasons": ["same county"]}]).to_string())
        .create_async()
        .await;

    let suggestions = client
        .suggestions(&SuggestionQuery::ForDemand {
            demand_id: DemandId::from("d1"),
            limit: 5,
        })
        .await
        .unwrap();

    assert_eq!(suggestions[0].reasons, ["same county"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn tier_update_sends_a_partial_body() {
    let (mut server, client) = backend().await;
    let mock = server
        .mock("PUT", "/api/users/me")
        .match_body(Matcher::Json(json!({"tier": "pro"})))
        .with_body(json!({"_id": "u1", "tier": "pro"}).to_string())
        .create_async()
        .await;

    let record = client
        .update_current_user(&ProfileUpdate::tier(Tier::Pro))
        .await
        .unwrap();

    assert_eq!(record.tier, Some(Tier::Pro));
    mock.assert_async().await;
}

#[tokio::test]
async fn missing_profile_is_a_404() {
    let (mut server, client) = backend().await;
    server
        .mock("GET", "/api/users/me")
        .with_status(404)
        .with_body(json!({"error": "User not found"}).to_string())
        .create_async()
        .await;

    let err = client.current_user().await.unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn verify_accepts_wrapped_user() {
    let (mut server, client) = backend().await;
    server
        .mock("POST", "/api/users/u2/verify")
        .match_body(Matcher::Json(json!({
            "verificationStatus": "rejected",
            "verificationRejectedReason": "blurry ID"
        })))
        .with_body(
            json!({
                "message": "User verification updated",
                "user": {"_id": "u2", "verificationStatus": "rejected"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let record = client
        .verify_user(&UserId::from("u2"), &VerificationDecision::reject("blurry ID"))
        .await
        .unwrap();

    assert_eq!(record.verification_status, VerificationStatus::Rejected);
}

#[tokio::test]
async fn mark_read_and_sms_ignore_response_bodies() {
    let (mut server, client) = backend().await;
    let read = server
        .mock("PUT", "/api/messages/read/m1")
        .with_body("ok")
        .create_async()
        .await;
    let sms = server
        .mock("POST", "/api/sms/send")
        .match_body(Matcher::Json(json!({"to": "+254700000000", "message": "Hello"})))
        .with_body(json!({"success": true}).to_string())
        .create_async()
        .await;

    client.mark_read(&MatchId::from("m1")).await.unwrap();
    client
        .send_sms(&SmsRequest::new("+254700000000", "Hello").unwrap())
        .await
        .unwrap();

    read.assert_async().await;
    sms.assert_async().await;
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let (mut server, client) = backend().await;
    server
        .mock("GET", "/api/messages/match/m1")
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let err = client.thread(&MatchId::from("m1")).await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
}
