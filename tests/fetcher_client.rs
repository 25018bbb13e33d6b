use std::time::Duration;

use adevar::fetcher::{FetchError, Fetcher};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn fetcher() -> Fetcher {
    Fetcher::new(Duration::from_secs(5))
}

#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stiri/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(
                    "<html><head><title>Știri</title></head><body>Bună ziua</body></html>"
                        .as_bytes(),
                )
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/stiri/1", mock_server.uri());
    let page = fetcher().fetch(&url).await.unwrap();

    assert!(page.status.is_success());
    assert!(page.body.contains("Bună ziua"));
    assert_eq!(page.url_final.as_str(), url);
    assert_eq!(page.encoding, "UTF-8");
}

#[tokio::test]
async fn test_fetch_non_success_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/lipsa"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let url = format!("{}/lipsa", mock_server.uri());

    match fetcher().fetch(&url).await {
        Err(FetchError::Http { status }) => assert_eq!(status.as_u16(), 404),
        other => panic!("Expected HTTP 404 error, got {:?}", other.map(|p| p.status)),
    }
}

#[tokio::test]
async fn test_redirect_to_internal_address_is_refused() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vechi"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", "http://169.254.169.254/latest/meta-data"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/vechi", mock_server.uri());

    match fetcher().fetch(&url).await {
        Err(FetchError::RedirectBlocked(target)) => {
            assert_eq!(target, "http://169.254.169.254/latest/meta-data");
        }
        other => panic!("Expected RedirectBlocked, got {:?}", other.map(|p| p.url_final)),
    }
}

#[tokio::test]
async fn test_redirect_to_loopback_is_refused() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vechi"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/nou"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/nou"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let url = format!("{}/vechi", mock_server.uri());
    let result = fetcher().fetch(&url).await;

    assert!(matches!(result, Err(FetchError::RedirectBlocked(_))));
}

#[tokio::test]
async fn test_fetch_gzip_compression() {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let original = "<html><body><article>Conținut comprimat</article></body></html>";

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(original.as_bytes()).unwrap();
    let compressed = encoder.finish().unwrap();

    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gzip"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(compressed)
                .insert_header("Content-Type", "text/html; charset=utf-8")
                .insert_header("Content-Encoding", "gzip"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/gzip", mock_server.uri());
    let page = fetcher().fetch(&url).await.unwrap();

    assert!(page.body.contains("Conținut comprimat"));
}

#[tokio::test]
async fn test_fetch_decodes_legacy_charset() {
    // "Știre" in windows-1250: Ş is 0xAA, the rest is ASCII.
    let mut body = b"<html><body><p>".to_vec();
    body.extend_from_slice(&[0xAA]);
    body.extend_from_slice(b"tire</p></body></html>");

    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cp1250"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body)
                .insert_header("Content-Type", "text/html; charset=windows-1250"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/cp1250", mock_server.uri());
    let page = fetcher().fetch(&url).await.unwrap();

    assert_eq!(page.encoding, "windows-1250");
    assert!(page.body.contains("Ştire"));
}

#[tokio::test]
async fn test_fetch_unsupported_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/imagine"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0xFF, 0xD8, 0xFF]) // JPEG header
                .insert_header("Content-Type", "image/jpeg"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/imagine", mock_server.uri());

    match fetcher().fetch(&url).await {
        Err(FetchError::UnsupportedContentType(content_type)) => {
            assert_eq!(content_type, "image/jpeg");
        }
        _ => panic!("Expected UnsupportedContentType error"),
    }
}

#[tokio::test]
async fn test_fetch_body_too_large() {
    let mock_server = MockServer::start().await;

    let large_body = "x".repeat(4096);

    Mock::given(method("GET"))
        .and(path("/mare"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(large_body.as_bytes())
                .insert_header("Content-Type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/mare", mock_server.uri());
    let result = fetcher().with_max_body(1024).fetch(&url).await;

    match result {
        Err(FetchError::BodyTooLarge(size)) => assert_eq!(size, 4096),
        _ => panic!("Expected BodyTooLarge error"),
    }
}

#[tokio::test]
async fn test_fetch_chunked_body_stops_at_limit() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Streams 64 KiB chunks without a Content-Length until the client hangs up.
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;

        let head = "HTTP/1.1 200 OK\r\n\
                    Content-Type: text/html\r\n\
                    Transfer-Encoding: chunked\r\n\r\n";
        if socket.write_all(head.as_bytes()).await.is_err() {
            return;
        }

        let chunk = "x".repeat(64 * 1024);
        let frame = format!("{:x}\r\n{}\r\n", chunk.len(), chunk);
        for _ in 0..100_000 {
            if socket.write_all(frame.as_bytes()).await.is_err() {
                return;
            }
        }
    });

    let url = format!("http://{}/fara-sfarsit", addr);
    let result = Fetcher::new(Duration::from_secs(10))
        .with_max_body(256 * 1024)
        .fetch(&url)
        .await;

    match result {
        Err(FetchError::BodyTooLarge(size)) => {
            assert!(size > 256 * 1024);
            assert!(size <= 320 * 1024, "read {} bytes before stopping", size);
        }
        Err(other) => panic!("Expected BodyTooLarge, got {}", other),
        Ok(page) => panic!("Expected BodyTooLarge, got {} bytes", page.body.len()),
    }
}

#[tokio::test]
async fn test_fetch_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/lent"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes("<html></html>".as_bytes())
                .insert_header("Content-Type", "text/html")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/lent", mock_server.uri());
    let result = Fetcher::new(Duration::from_millis(200)).fetch(&url).await;

    match result {
        Err(err) => assert!(err.is_timeout(), "expected timeout, got {err}"),
        Ok(_) => panic!("Expected timeout"),
    }
}

#[tokio::test]
async fn test_fetch_invalid_url() {
    match fetcher().fetch("nu-este-url").await {
        Err(FetchError::InvalidUrl(_)) => {}
        _ => panic!("Expected InvalidUrl error"),
    }
}
