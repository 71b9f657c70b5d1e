//! Export runs.

use iam_cli::commands::export_all;
use iam_cli::summary::Summary;
use iam_core::{ExportFormat, KeywordConfig, ResourceType};
use iam_integration_tests::{TestEnv, API_BASE};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const EXPORTED_APP: &str = "\
applicationName: Pickup
inboundAuthenticationConfig:
  inboundAuthenticationRequestConfigs:
  - inboundAuthKey: pickup-client
    inboundAuthType: oauth2
    properties:
    - name: callbackUrl
      value: https://prod.example.com/callback
    - name: clientSecret
      value: '********'
";

async fn mount_app_export(env: &TestEnv, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("{API_BASE}/applications/a1/exportFile")))
        .and(query_param("exportSecrets", "false"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=Pickup.yml")
                .set_body_string(body),
        )
        .mount(&env.server)
        .await;
}

async fn mount_resident_idp(env: &TestEnv) {
    Mock::given(method("GET"))
        .and(path(format!("{API_BASE}/identity-providers/LOCAL/export")))
        .respond_with(ResponseTemplate::new(200).set_body_string("identityProviderName: LOCAL\n"))
        .mount(&env.server)
        .await;
}

fn keywords(env: &mut TestEnv) {
    env.config.keywords = KeywordConfig::from_json_str(
        r#"{"KEYWORD_MAPPINGS": {"ENV": "prod", "PICKUP_SECRET": "s3cr3t"}}"#,
        |_| None,
    )
    .unwrap();
}

#[tokio::test]
async fn first_export_writes_server_content() {
    let env = TestEnv::new().await.unwrap();
    env.mount_list(ResourceType::Applications, &[("a1", "Pickup")]).await;
    env.mount_empty_lists(&[ResourceType::Applications]).await;
    mount_app_export(&env, EXPORTED_APP).await;
    mount_resident_idp(&env).await;

    let mut summary = Summary::default();
    export_all(&env.api, &env.config, env.base_dir(), ExportFormat::Yaml, &mut summary).await;

    assert_eq!(env.read_local("Applications/Pickup.yml").unwrap(), EXPORTED_APP);
    assert_eq!(
        env.read_local("IdentityProviders/LOCAL.yml").unwrap(),
        "identityProviderName: LOCAL\n"
    );
    assert_eq!(summary.successful, 2);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn reexport_preserves_placeholders_and_keeps_drift() {
    let mut env = TestEnv::new().await.unwrap();
    keywords(&mut env);
    env.write_local(
        "Applications/Pickup.yml",
        "\
applicationName: Pickup
description: '{{ENV}} pickup'
inboundAuthenticationConfig:
  inboundAuthenticationRequestConfigs:
  - inboundAuthKey: pickup-client
    inboundAuthType: oauth2
    properties:
    - name: clientSecret
      value: '{{PICKUP_SECRET}}'
    - name: callbackUrl
      value: https://{{ENV}}.example.com/callback
",
    )
    .unwrap();

    let exported = EXPORTED_APP.replace(
        "applicationName: Pickup\n",
        "applicationName: Pickup\ndescription: staging pickup\n",
    );
    env.mount_list(ResourceType::Applications, &[("a1", "Pickup")]).await;
    env.mount_empty_lists(&[ResourceType::Applications]).await;
    mount_app_export(&env, &exported).await;
    mount_resident_idp(&env).await;

    let mut summary = Summary::default();
    export_all(&env.api, &env.config, env.base_dir(), ExportFormat::Yaml, &mut summary).await;

    assert_eq!(
        env.read_local("Applications/Pickup.yml").unwrap(),
        "\
applicationName: Pickup
description: staging pickup
inboundAuthenticationConfig:
  inboundAuthenticationRequestConfigs:
  - inboundAuthKey: pickup-client
    inboundAuthType: oauth2
    properties:
    - name: callbackUrl
      value: https://{{ENV}}.example.com/callback
    - name: clientSecret
      value: '{{PICKUP_SECRET}}'
"
    );
}

#[tokio::test]
async fn json_export_is_written_as_json() {
    let env = TestEnv::new().await.unwrap();
    env.mount_list(ResourceType::UserStores, &[("U0VDT05EQVJZ", "SECONDARY")])
        .await;
    env.mount_empty_lists(&[ResourceType::UserStores]).await;
    mount_resident_idp(&env).await;
    Mock::given(method("GET"))
        .and(path(format!("{API_BASE}/userstores/U0VDT05EQVJZ/export")))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"name": "SECONDARY", "properties": [{"name": "ConnectionPassword", "value": "ENCRYPTED PROPERTY"}]}"#,
        ))
        .mount(&env.server)
        .await;

    let mut summary = Summary::default();
    export_all(&env.api, &env.config, env.base_dir(), ExportFormat::Json, &mut summary).await;

    assert_eq!(
        env.read_local("UserStores/SECONDARY.json").unwrap(),
        "{\n  \"name\": \"SECONDARY\",\n  \"properties\": [\n    {\n      \"name\": \"ConnectionPassword\",\n      \"value\": \"********\"\n    }\n  ]\n}\n"
    );
}

#[tokio::test]
async fn failed_listing_skips_only_that_type() {
    let env = TestEnv::new().await.unwrap();
    Mock::given(method("GET"))
        .and(path(format!("{API_BASE}/applications")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&env.server)
        .await;
    env.mount_empty_lists(&[ResourceType::Applications]).await;
    mount_resident_idp(&env).await;

    let mut summary = Summary::default();
    export_all(&env.api, &env.config, env.base_dir(), ExportFormat::Yaml, &mut summary).await;

    assert!(env.local_path("IdentityProviders/LOCAL.yml").exists());
    assert_eq!(summary.resource(ResourceType::Applications).exported, 0);
}
