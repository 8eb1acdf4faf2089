//! Integration tests for the harvester
//!
//! These tests use wiremock to serve search results pages and CSV documents
//! and run the full harvest cycle end-to-end.

use csv_harvest::config::{Config, FormatterConfig, SearchConfig, StorageConfig};
use csv_harvest::crawler::{clean_directory, run_harvest};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock search endpoint
fn create_test_config(server_uri: &str, dir: &Path, max_links: usize) -> Config {
    Config {
        search: SearchConfig {
            endpoint: format!("{}/search?q={{query}}", server_uri),
            next_selector: "a.next".to_string(),
            max_links,
            settle_delay_ms: 0, // No settling needed against the mock
            page_timeout_ms: 2000,
            ..SearchConfig::default()
        },
        storage: StorageConfig {
            links_file: dir.join("links.txt").to_string_lossy().into_owned(),
            csv_dir: dir.join("csv_files").to_string_lossy().into_owned(),
            output_path: dir.join("out.csv").to_string_lossy().into_owned(),
        },
        formatter: FormatterConfig {
            enabled: false,
            ..FormatterConfig::default()
        },
        ..Config::default()
    }
}

/// Mounts two results pages and the documents they link to
async fn mount_search_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                <a href="/files/people.csv">People</a>
                <a href="/files/listings.csv">Listings</a>
                <a href="/about.html">About</a>
                <a href="/files/missing.csv">Missing</a>
                <a class="next" href="/search/page2">Next</a>
            </body></html>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                <a href="/files/people.csv">People again</a>
                <a href="/files/budget.csv">Budget</a>
            </body></html>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/people.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "ID,Name,Phone,Zip\n1,Jane,(555) 123-4567,90210\n2,Bob,555,10001\n3,Ann,555.987.6543,60601\n",
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/listings.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "Name,Phone,Notes\nJoe,5551112222,listing agent\n",
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/missing.csv"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/budget.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Year,Amount\n2023,100\n"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_across_pages() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    mount_search_site(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, dir.path(), 50);

    let stats = run_harvest(config, "contact list")
        .await
        .expect("Harvest failed");

    assert_eq!(stats.links_collected, 4);
    assert_eq!(stats.pages_visited, 2);
    assert_eq!(stats.documents_written, 1);
    assert_eq!(stats.rows_written, 2);
    assert_eq!(stats.skipped.get("policy-excluded"), Some(&1));
    assert_eq!(stats.skipped.get("fetch-failed"), Some(&1));
    assert_eq!(stats.skipped.get("no-relevant-columns"), Some(&1));

    // Only the document that passed every check is stored
    let csv_dir = dir.path().join("csv_files");
    let stored: Vec<_> = std::fs::read_dir(&csv_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(stored, vec!["people.csv".to_string()]);
    assert_eq!(
        std::fs::read_to_string(csv_dir.join("people.csv")).unwrap(),
        "Name,Phone,Zip\nJane,5551234567,90210\nAnn,5559876543,60601\n"
    );

    // Every collected link is remembered in collection order, failures included
    let links = std::fs::read_to_string(dir.path().join("links.txt")).unwrap();
    let expected: Vec<String> = ["people", "listings", "missing", "budget"]
        .iter()
        .map(|name| format!("{}/files/{}.csv", base_url, name))
        .collect();
    assert_eq!(links.lines().collect::<Vec<_>>(), expected);
}

#[tokio::test]
async fn test_second_run_collects_nothing_already_seen() {
    let server = MockServer::start().await;
    mount_search_site(&server).await;

    let dir = TempDir::new().unwrap();

    let first = run_harvest(create_test_config(&server.uri(), dir.path(), 2), "contacts")
        .await
        .unwrap();
    assert_eq!(first.links_collected, 2);

    let second = run_harvest(create_test_config(&server.uri(), dir.path(), 2), "contacts")
        .await
        .unwrap();
    assert_eq!(second.links_collected, 2);

    let links = std::fs::read_to_string(dir.path().join("links.txt")).unwrap();
    let lines: Vec<&str> = links.lines().collect();
    assert_eq!(lines.len(), 4);

    // The newest links come first, and no link is stored twice
    assert_eq!(lines[0], format!("{}/files/missing.csv", server.uri()));
    assert_eq!(lines[1], format!("{}/files/budget.csv", server.uri()));
    assert_eq!(lines[2], format!("{}/files/people.csv", server.uri()));
    assert_eq!(lines[3], format!("{}/files/listings.csv", server.uri()));
}

#[tokio::test]
async fn test_limit_reached_on_first_page_does_not_paginate() {
    let server = MockServer::start().await;
    mount_search_site(&server).await;

    let dir = TempDir::new().unwrap();
    let stats = run_harvest(create_test_config(&server.uri(), dir.path(), 3), "contacts")
        .await
        .unwrap();

    assert_eq!(stats.links_collected, 3);
    assert_eq!(stats.pages_visited, 1);

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != "/search/page2"));
}

#[tokio::test]
async fn test_search_failure_writes_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let result = run_harvest(create_test_config(&server.uri(), dir.path(), 50), "contacts").await;

    assert!(result.is_err());
    assert!(!dir.path().join("links.txt").exists());
    assert!(!dir.path().join("csv_files").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_formatter_runs_after_documents_are_written() {
    let server = MockServer::start().await;
    mount_search_site(&server).await;

    let dir = TempDir::new().unwrap();
    let script = dir.path().join("format.sh");
    std::fs::write(&script, "cat \"$1\"/*.csv > \"$2\"\n").unwrap();

    let mut config = create_test_config(&server.uri(), dir.path(), 50);
    config.formatter = FormatterConfig {
        enabled: true,
        program: "sh".to_string(),
        format_script: Some(script.to_string_lossy().into_owned()),
        split_script: None,
    };

    run_harvest(config, "contacts").await.unwrap();

    assert_eq!(
        std::fs::read_to_string(dir.path().join("out.csv")).unwrap(),
        "Name,Phone,Zip\nJane,5551234567,90210\nAnn,5559876543,60601\n"
    );
}

#[tokio::test]
async fn test_clean_dir_mode_needs_no_search() {
    let dir = TempDir::new().unwrap();
    let csv_dir = dir.path().join("csv_files");
    std::fs::create_dir_all(&csv_dir).unwrap();
    std::fs::write(
        csv_dir.join("old.csv"),
        "Contact Name,Phone Number,Company\nJane,+1 555 123 4567,Acme\n",
    )
    .unwrap();

    // The endpoint is never contacted in this mode
    let config = create_test_config("http://127.0.0.1:1", dir.path(), 50);
    let stats = clean_directory(&config).await.unwrap();

    assert_eq!(stats.documents_written, 1);
    assert_eq!(
        std::fs::read_to_string(csv_dir.join("old.csv")).unwrap(),
        "Contact Name,Phone Number\nJane,15551234567\n"
    );
}

#[tokio::test]
async fn test_cyclic_pagination_terminates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="/files/people.csv">People</a><a class="next" href="/search/page2">Next</a>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="/files/people.csv">People</a><a class="next" href="/search?q=contacts">Next</a>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/people.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Name,Phone\nJane,5551234567\n"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 50);

    let stats = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        run_harvest(config, "contacts"),
    )
    .await
    .expect("harvest did not terminate")
    .unwrap();

    assert_eq!(stats.links_collected, 1);
    assert_eq!(stats.pages_visited, 2);

    let requests = server.received_requests().await.unwrap();
    let page_loads = requests
        .iter()
        .filter(|r| r.url.path().starts_with("/search"))
        .count();
    assert_eq!(page_loads, 3);
}

#[tokio::test]
async fn test_documents_with_same_name_are_all_kept() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="/north/data.csv">North</a><a href="/south/data.csv">South</a>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/north/data.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Name,Phone\nAnn,5551110000\n"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/south/data.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Name,Phone\nBob,5552220000\n"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let stats = run_harvest(create_test_config(&server.uri(), dir.path(), 50), "contacts")
        .await
        .unwrap();

    let csv_dir = dir.path().join("csv_files");
    assert_eq!(stats.documents_written, 2);
    assert_eq!(
        std::fs::read_to_string(csv_dir.join("data.csv")).unwrap(),
        "Name,Phone\nAnn,5551110000\n"
    );
    assert_eq!(
        std::fs::read_to_string(csv_dir.join("data-1.csv")).unwrap(),
        "Name,Phone\nBob,5552220000\n"
    );
}
