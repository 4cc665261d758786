//! Tests for loading and building grabber configuration

use autoimage::GrabberConfig;
use autoimage::config::DEFAULT_IMAGE_QUERIES;

mod common;

#[tokio::test]
async fn test_load_partial_json_file() {
    let temp_dir = common::create_test_dir().expect("temp dir");
    let path = temp_dir.path().join("grabber.json");
    tokio::fs::write(
        &path,
        r#"{
            "image_class": "lead-image",
            "image_queries": "//figure//img[1]\n\n//*[@class=\"entry\"]//img[1]\n",
            "site_url": "https://blog.example.com",
            "fetch": { "timeout_secs": 3 }
        }"#,
    )
    .await
    .expect("write config");

    let config = GrabberConfig::load(&path).await.expect("load config");

    assert_eq!(config.image_class(), "lead-image");
    assert_eq!(config.destination_query(), "//a[1]");
    assert_eq!(
        config.image_queries(),
        ["//figure//img[1]", r#"//*[@class="entry"]//img[1]"#]
    );
    assert_eq!(config.site_url(), Some("https://blog.example.com"));
    assert!(config.single_view_only());
    assert_eq!(config.fetch().timeout_secs(), 3);
    assert_eq!(config.fetch().max_page_size_bytes(), 10 * 1024 * 1024);
    assert_eq!(config.fetch().user_agent(), None);
}

#[tokio::test]
async fn test_load_missing_or_invalid_file() {
    let temp_dir = common::create_test_dir().expect("temp dir");
    assert!(GrabberConfig::load(temp_dir.path().join("missing.json")).await.is_err());

    let path = temp_dir.path().join("broken.json");
    tokio::fs::write(&path, "{ not json").await.expect("write config");
    assert!(GrabberConfig::load(&path).await.is_err());
}

#[tokio::test]
async fn test_saved_config_loads_back() {
    let temp_dir = common::create_test_dir().expect("temp dir");
    let path = temp_dir.path().join("grabber.json");
    let config = GrabberConfig::builder()
        .push_image_query("div.hero img")
        .single_view_only(false)
        .user_agent("autoimage/0.3")
        .build()
        .expect("valid configuration");

    tokio::fs::write(&path, config.to_json_string().expect("serialize"))
        .await
        .expect("write config");
    let loaded = GrabberConfig::load(&path).await.expect("load config");

    assert_eq!(loaded, config);
    assert_eq!(loaded.image_queries().len(), DEFAULT_IMAGE_QUERIES.len() + 1);
    assert_eq!(loaded.image_queries().last().map(String::as_str), Some("div.hero img"));
}

#[test]
fn test_site_url_override() {
    let config = GrabberConfig::default()
        .with_site_url("http://localhost:8080")
        .expect("valid site url");
    assert_eq!(config.site_url(), Some("http://localhost:8080"));

    assert!(GrabberConfig::default().with_site_url("localhost").is_err());
}
