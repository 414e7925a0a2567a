use http::Request;

use gh_broker::model::GithubRequest;

fn get(uri: &str) -> Request<Vec<u8>> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(http::header::USER_AGENT, "test-agent")
        .body(Vec::new())
        .unwrap()
}

#[test]
fn key_includes_path_and_query() {
    let req = GithubRequest::new(get("https://api.github.com/user/repos?per_page=100&page=1"))
        .expect("request");
    assert_eq!(req.key(), "GET /user/repos?per_page=100&page=1");
}

#[test]
fn key_without_query_has_no_separator() {
    let req = GithubRequest::new(get(
        "https://api.github.com/repos/octocat/Hello-World/stats/contributors",
    ))
    .expect("request");
    assert_eq!(req.key(), "GET /repos/octocat/Hello-World/stats/contributors");
}

#[test]
fn user_agent_is_required() {
    let req = Request::builder()
        .method("GET")
        .uri("https://api.github.com/user/repos")
        .body(Vec::new())
        .unwrap();
    assert!(GithubRequest::new(req).is_err());
}

#[test]
fn replayed_requests_keep_headers_and_body() {
    let original = Request::builder()
        .method("POST")
        .uri("https://api.github.com/graphql")
        .header(http::header::USER_AGENT, "test-agent")
        .header(http::header::ACCEPT, "application/vnd.github+json")
        .body(b"{}".to_vec())
        .unwrap();
    let req = GithubRequest::new(original).expect("request");

    let first = req.request().expect("first copy");
    let second = req.request().expect("second copy");
    for copy in [first, second] {
        assert_eq!(copy.method(), http::Method::POST);
        assert_eq!(copy.headers()[http::header::USER_AGENT], "test-agent");
        assert_eq!(copy.headers()[http::header::ACCEPT], "application/vnd.github+json");
        assert_eq!(copy.body(), b"{}");
    }
}
