use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use pocowebc::commands::{self, Globals};
use pocowebc::{Cli, Client, Error, OutputMode, Settings};

type Requests = Arc<Mutex<Vec<String>>>;

fn response(status: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    )
}

/// Serves the canned responses in order (the last one repeats) and records
/// the head of every request.
async fn serve(responses: Vec<String>) -> (String, Requests) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/rest", listener.local_addr().unwrap());
    let requests: Requests = Arc::default();
    let recorded = requests.clone();
    tokio::spawn(async move {
        let mut n = 0;
        loop {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let read = socket.read(&mut buf).await.unwrap();
                if read == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..read]);
            }
            recorded
                .lock()
                .unwrap()
                .push(String::from_utf8_lossy(&head).into_owned());
            let reply = &responses[n.min(responses.len() - 1)];
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            n += 1;
        }
    });
    (base, requests)
}

fn request_line(requests: &Requests, n: usize) -> String {
    requests.lock().unwrap()[n].lines().next().unwrap().to_string()
}

fn globals(url: &str) -> Globals {
    Globals {
        settings: Settings {
            url: url.to_string(),
            auth: "token".to_string(),
            skip_verify: false,
            config_path: None,
        },
        mode: OutputMode::Default,
        color: false,
    }
}

#[tokio::test]
async fn test_image_is_fetched_from_host_root() {
    let (base, requests) = serve(vec![response("200 OK", "image/png", "png")]).await;
    let client = Client::authenticate(&base, "token", false).unwrap();

    let image = client.get_image("/img/1/2.png").await.unwrap();

    assert_eq!(image, b"png");
    assert_eq!(request_line(&requests, 0), "GET /img/1/2.png HTTP/1.1");
}

#[tokio::test]
async fn test_book_archive_is_fetched_from_host_root() {
    let (base, requests) = serve(vec![
        response("200 OK", "application/json", r#"{"archive":"/books/1.zip"}"#),
        response("200 OK", "application/zip", "PK"),
    ])
    .await;
    let client = Client::authenticate(&base, "token", false).unwrap();

    let archive = client.download_book(1).await.unwrap();

    assert_eq!(archive, b"PK");
    assert_eq!(request_line(&requests, 0), "GET /rest/books/1/download HTTP/1.1");
    assert_eq!(request_line(&requests, 1), "GET /books/1.zip HTTP/1.1");
}

#[tokio::test]
async fn test_zip_download_checks_content_type() {
    let (base, _) = serve(vec![response("200 OK", "text/plain", "not a zip")]).await;
    let client = Client::authenticate(&base, "token", false).unwrap();

    let err = client.download_pool(true).await.unwrap_err();

    assert!(matches!(err, Error::BadContentType(ref t) if t == "text/plain"));
}

#[tokio::test]
async fn test_error_status_becomes_api_error() {
    let (base, _) = serve(vec![response("403 Forbidden", "text/plain", "forbidden\n")]).await;
    let client = Client::authenticate(&base, "token", false).unwrap();

    let err = client.get_books().await.unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status.as_u16(), 403);
            assert_eq!(message, "forbidden");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let (base, requests) = serve(vec![response("200 OK", "application/json", r#"{"books":[]}"#)]).await;
    let client = Client::authenticate(&base, "secret", false).unwrap();

    client.get_books().await.unwrap();

    let head = requests.lock().unwrap()[0].to_lowercase();
    assert!(head.starts_with("get /rest/books http/1.1"));
    assert!(head.contains("authorization: bearer secret"), "{}", head);
}

#[tokio::test]
async fn test_invalid_id_aborts_before_any_request() {
    let (base, requests) = serve(vec![response("200 OK", "application/json", "{}")]).await;
    let cli = Cli::try_parse_from(["pocowebc", "delete", "books", "1", "x"]).unwrap();

    let err = commands::run(cli.command, &globals(&base)).await.unwrap_err();

    assert!(format!("{:#}", err).contains("x"));
    assert!(requests.lock().unwrap().is_empty(), "Book 1 must not be deleted");
}

#[tokio::test]
async fn test_search_all_needs_positive_max() {
    let (base, requests) = serve(vec![response("200 OK", "application/json", "{}")]).await;
    let cli = Cli::try_parse_from(["pocowebc", "search", "--all", "--max", "0", "1", "word"]).unwrap();

    let err = commands::run(cli.command, &globals(&base)).await.unwrap_err();

    assert!(err.to_string().contains("--max"));
    assert!(requests.lock().unwrap().is_empty());
}
