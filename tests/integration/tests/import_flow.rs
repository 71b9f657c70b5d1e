//! Import runs.

use iam_cli::commands::import_all;
use iam_cli::summary::Summary;
use iam_core::{KeywordConfig, ResourceType};
use iam_integration_tests::{TestEnv, API_BASE};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn import_resolves_keywords_and_creates_resources() {
    let mut env = TestEnv::new().await.unwrap();
    env.config.keywords = KeywordConfig::from_json_str(
        r#"{"KEYWORD_MAPPINGS": {"ENV": "prod"},
            "IDENTITY_PROVIDERS": {"Google": {"KEYWORD_MAPPINGS": {"ENV": "google-prod"}}}}"#,
        |_| None,
    )
    .unwrap();
    env.write_local(
        "IdentityProviders/Google.yml",
        "identityProviderName: Google\nhomeRealmIdentifier: https://{{ENV}}.example.com\n",
    )
    .unwrap();
    env.mount_empty_lists(&[]).await;

    Mock::given(method("POST"))
        .and(path(format!("{API_BASE}/identity-providers/import")))
        .and(body_string_contains("homeRealmIdentifier: https://google-prod.example.com"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&env.server)
        .await;

    let mut summary = Summary::default();
    import_all(&env.api, &env.config, env.base_dir(), &mut summary).await;

    assert_eq!(summary.resource(ResourceType::IdentityProviders).imported, 1);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn existing_application_conflict_retries_as_update() {
    let env = TestEnv::new().await.unwrap();
    env.write_local("Applications/Pickup.yml", "applicationName: Pickup\n")
        .unwrap();
    env.mount_empty_lists(&[]).await;

    Mock::given(method("POST"))
        .and(path(format!("{API_BASE}/applications/import")))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&env.server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("{API_BASE}/applications/import")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&env.server)
        .await;

    let mut summary = Summary::default();
    import_all(&env.api, &env.config, env.base_dir(), &mut summary).await;

    assert_eq!(summary.resource(ResourceType::Applications).updated, 1);
    assert_eq!(summary.total_requests, 1);
}

#[tokio::test]
async fn resident_identity_provider_is_updated_in_place() {
    let env = TestEnv::new().await.unwrap();
    env.write_local("IdentityProviders/LOCAL.yml", "identityProviderName: LOCAL\n")
        .unwrap();
    env.mount_empty_lists(&[]).await;

    Mock::given(method("PUT"))
        .and(path(format!("{API_BASE}/identity-providers/LOCAL/import")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&env.server)
        .await;

    let mut summary = Summary::default();
    import_all(&env.api, &env.config, env.base_dir(), &mut summary).await;

    assert_eq!(summary.resource(ResourceType::IdentityProviders).updated, 1);
}

#[tokio::test]
async fn deletion_removes_only_unprotected_missing_resources() {
    let mut env = TestEnv::new().await.unwrap();
    env.config.tool.allow_delete = true;
    env.write_local("UserStores/SECONDARY.yml", "name: SECONDARY\n")
        .unwrap();
    env.mount_list(
        ResourceType::UserStores,
        &[("UFJJTUFSWQ", "PRIMARY"), ("U0VDT05EQVJZ", "SECONDARY"), ("T0xE", "OLD")],
    )
    .await;
    env.mount_empty_lists(&[ResourceType::UserStores]).await;

    Mock::given(method("DELETE"))
        .and(path(format!("{API_BASE}/userstores/T0xE")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&env.server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("{API_BASE}/userstores/U0VDT05EQVJZ/file")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&env.server)
        .await;

    let mut summary = Summary::default();
    import_all(&env.api, &env.config, env.base_dir(), &mut summary).await;

    let stores = summary.resource(ResourceType::UserStores);
    assert_eq!((stores.deleted, stores.updated), (1, 1));
    assert!(stores.failed.is_empty());
}
