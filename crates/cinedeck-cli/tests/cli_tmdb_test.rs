#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::predicate;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Writes a config pointing the CLI at the mock server.
fn write_config(dir: &std::path::Path, server: &MockServer) {
    let config = format!(
        "[tmdb]\napi_key = \"test-key\"\nbase_url = \"{}/3\"\n",
        server.uri()
    );
    std::fs::write(dir.join("config.toml"), config).unwrap();
}

fn cinedeck(dir: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("cinedeck");
    cmd.env("RUST_LOG", "info")
        .env_remove("TMDB_API_KEY")
        .env_remove("OTEL_EXPORTER_OTLP_ENDPOINT")
        .arg("--dir")
        .arg(dir);
    cmd
}

#[tokio::test]
async fn test_category_lists_first_page() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/top_rated"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("language", "en"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(include_str!(
            "../../../fixtures/tmdb/movie_top_rated_page1.json"
        )))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &server);

    // Act & Assert
    cinedeck(dir.path())
        .args(["category", "top-rated", "--language", "en-US"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The Godfather"))
        .stdout(predicate::str::contains("more available"));
}

#[tokio::test]
async fn test_category_surfaces_tmdb_error() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/popular"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"status_code":7,"status_message":"Invalid API key: You must be granted a valid key.","success":false}"#,
        ))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &server);

    // Act & Assert
    cinedeck(dir.path())
        .args(["category", "popular"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid API key"));
}

#[tokio::test]
async fn test_favorites_add_uses_saved_language() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/238"))
        .and(query_param("language", "tr-TR"))
        .respond_with(ResponseTemplate::new(200).set_body_string(include_str!(
            "../../../fixtures/tmdb/movie_details_238.json"
        )))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &server);

    // Act
    cinedeck(dir.path())
        .args(["favorites", "add", "238"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added The Godfather to favorites"));

    // Assert
    cinedeck(dir.path())
        .args(["favorites", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The Godfather"))
        .stdout(predicate::str::contains("Total: 1 favorites"));
}

#[tokio::test]
async fn test_login_then_whoami() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/authentication/token/new"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(include_str!("../../../fixtures/tmdb/token_new.json")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/3/authentication/token/validate_with_login"))
        .and(body_json(serde_json::json!({
            "username": "cinephile",
            "password": "s3cret",
            "request_token": "ff5c7eeb5a8870efe3cd7fc5c282cffd26800ecd",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(include_str!("../../../fixtures/tmdb/token_new.json")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/3/authentication/session/new"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(include_str!("../../../fixtures/tmdb/session_new.json")),
        )
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &server);

    // Act
    cinedeck(dir.path())
        .args(["login", "--username", "cinephile"])
        .env("TMDB_PASSWORD", "s3cret")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as cinephile"));

    // Assert
    cinedeck(dir.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("TMDB user cinephile"));
}

#[tokio::test]
async fn test_login_rejected_credentials() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/authentication/token/new"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(include_str!("../../../fixtures/tmdb/token_new.json")),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/3/authentication/token/validate_with_login"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"status_code":30,"status_message":"Invalid username and/or password: You did not provide a valid login.","success":false}"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/3/authentication/session/new"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &server);

    // Act & Assert
    cinedeck(dir.path())
        .args(["login", "--username", "cinephile", "--password", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid username and/or password"));
    cinedeck(dir.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in"));
}

/// Mounts a one-movie listing on `endpoint`.
async fn mount_lane(server: &MockServer, endpoint: &str, id: u64, title: &str) {
    let body = serde_json::json!({
        "page": 1,
        "results": [{ "id": id, "title": title, "vote_average": 7.5, "release_date": "2024-05-01" }],
        "total_pages": 3,
        "total_results": 60,
    });
    Mock::given(method("GET"))
        .and(path(format!("/3/{endpoint}")))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_browse_shows_all_four_lanes() {
    // Arrange
    let server = MockServer::start().await;
    mount_lane(&server, "movie/top_rated", 101, "Lane Top Rated").await;
    mount_lane(&server, "movie/upcoming", 102, "Lane Upcoming").await;
    mount_lane(&server, "movie/now_playing", 103, "Lane Now Playing").await;
    mount_lane(&server, "movie/popular", 104, "Lane Popular").await;
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &server);

    // Act & Assert
    cinedeck(dir.path())
        .args(["browse", "--language", "en"])
        .assert()
        .success()
        .stdout(predicate::str::contains("== top-rated =="))
        .stdout(predicate::str::contains("== upcoming =="))
        .stdout(predicate::str::contains("== now-playing =="))
        .stdout(predicate::str::contains("== popular =="))
        .stdout(predicate::str::contains("Lane Top Rated"))
        .stdout(predicate::str::contains("Lane Upcoming"))
        .stdout(predicate::str::contains("Lane Now Playing"))
        .stdout(predicate::str::contains("Lane Popular"));
}

#[tokio::test]
async fn test_browse_keeps_other_lanes_when_one_fails() {
    // Arrange
    let server = MockServer::start().await;
    mount_lane(&server, "movie/top_rated", 101, "Lane Top Rated").await;
    mount_lane(&server, "movie/now_playing", 103, "Lane Now Playing").await;
    mount_lane(&server, "movie/popular", 104, "Lane Popular").await;
    Mock::given(method("GET"))
        .and(path("/3/movie/upcoming"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &server);

    // Act & Assert
    cinedeck(dir.path())
        .args(["browse"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Network error, please try again."))
        .stdout(predicate::str::contains("Lane Top Rated"))
        .stdout(predicate::str::contains("Lane Popular"));
}
