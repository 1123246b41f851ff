use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct BookView {
    title: String,
    author: String,
    cover_url: String,
}

#[derive(Debug, Deserialize)]
struct ListingResponse {
    page: usize,
    revealed: usize,
    total: usize,
    has_more: bool,
    books: Vec<BookView>,
}

#[derive(Debug, Deserialize)]
struct ChallengeProgress {
    year: i32,
    goal: u32,
    books_read: usize,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    total_books: u64,
    total_pages: u64,
    total_series: usize,
    challenge: ChallengeProgress,
    current_book: Option<BookView>,
    last_read_book: Option<BookView>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_dir(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("reading_shelf_http_{tag}_{}_{}", std::process::id(), nanos));
    std::fs::create_dir_all(path.join("data")).unwrap();
    path
}

fn write_fixture(dir: &Path) {
    let books: Vec<serde_json::Value> = (1..=11)
        .map(|n| {
            serde_json::json!({
                "Title": format!("Книга {n:02}"),
                "Author": if n % 2 == 0 { "Author Even" } else { "Author Odd" },
                "Number of Pages": 100 + n * 10,
                "My Rating": n % 6,
                "Date Read": format!("2025-{:02}-10", (n % 12) + 1),
                "Date Added": format!("2025-{:02}-01", (n % 12) + 1),
                "Series": if n <= 3 { Some("Трилогия") } else { None },
                "Genres": if n % 3 == 0 { vec!["Фантастика"] } else { vec!["Классика", "Драма"] },
                "Exclusive Shelf": "read",
                "Cover URL": "http://books.google.com/books/content?id=x",
                "Book Id": format!("{n}")
            })
        })
        .chain([
            serde_json::json!({
                "Title": "Текущая",
                "Author": "Now Reading",
                "Exclusive Shelf": "currently-reading",
                "Book Id": "500"
            }),
            serde_json::json!({
                "Title": "В планах",
                "Author": "Later",
                "Exclusive Shelf": "to-read"
            }),
        ])
        .collect();

    let stats = serde_json::json!({
        "total_books": 11,
        "total_pages": 1760,
        "books_2025": 11,
        "book_list": books
    });
    std::fs::write(dir.join("reading_stats.json"), serde_json::to_vec(&stats).unwrap()).unwrap();
    std::fs::write(
        dir.join("data/author_mapping.json"),
        r#"{ "Author Odd": "Нечётный Автор" }"#.as_bytes(),
    )
    .unwrap();
}

fn command(data_dir: &Path, port: u16) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_reading_shelf"));
    command
        .env("PORT", port.to_string())
        .env("READING_SHELF_DATA_DIR", data_dir)
        .env("READING_CHALLENGE_YEAR", "2025")
        .env("READING_CHALLENGE_GOAL", "50")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    command
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/summary")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_dir = unique_data_dir("server");
    write_fixture(&data_dir);
    let child = command(&data_dir, port)
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

#[tokio::test]
async fn http_books_reveal_pages_cumulatively() {
    let server = shared_server().await;
    let client = Client::new();

    let first: ListingResponse = client
        .get(format!("{}/api/books?sort=title-asc", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first.page, 0);
    assert_eq!(first.total, 11);
    assert_eq!(first.revealed, 9);
    assert!(first.has_more);
    assert_eq!(first.books[0].title, "Книга 01");
    assert_eq!(first.books[0].author, "Нечётный Автор");
    assert!(first.books[0].cover_url.starts_with("https://books.google.com"));

    let second: ListingResponse = client
        .get(format!("{}/api/books?sort=title-asc&page=1", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second.revealed, 11);
    assert_eq!(second.books.len(), 11);
    assert!(!second.has_more);
}

#[tokio::test]
async fn http_books_filter_by_series_and_genre() {
    let server = shared_server().await;
    let client = Client::new();

    let listing: ListingResponse = client
        .get(format!("{}/api/books", server.base_url))
        .query(&[("series", "Трилогия"), ("genre", "Фантастика")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing.total, 1);
    assert_eq!(listing.books[0].title, "Книга 03");
}

#[tokio::test]
async fn http_unknown_book_is_not_found() {
    let server = shared_server().await;
    let response = Client::new()
        .get(format!("{}/api/books/does-not-exist", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let found = Client::new()
        .get(format!("{}/api/books/500", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(found.status().is_success());
}

#[tokio::test]
async fn http_summary_reports_totals_and_challenge() {
    let server = shared_server().await;
    let summary: SummaryResponse = Client::new()
        .get(format!("{}/api/summary", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(summary.total_books, 11);
    assert_eq!(summary.total_pages, 1760);
    assert_eq!(summary.total_series, 1);
    assert_eq!(summary.challenge.year, 2025);
    assert_eq!(summary.challenge.goal, 50);
    assert_eq!(summary.challenge.books_read, 11);
    assert_eq!(summary.current_book.map(|b| b.title), Some("Текущая".to_string()));
    assert!(summary.last_read_book.is_some());
}

#[tokio::test]
async fn http_charts_and_dashboard_page() {
    let server = shared_server().await;
    let client = Client::new();

    let charts: serde_json::Value = client
        .get(format!("{}/api/charts", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(charts["ratings"].as_array().is_some_and(|r| !r.is_empty()));
    assert!(charts["genres"].as_array().is_some_and(|g| g.len() <= 5));

    let html = client
        .get(format!("{}/?sort=pages-desc", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Книжная полка"));
    assert!(html.contains("Показать ещё"));
    assert!(html.contains("В планах"));
}

#[tokio::test]
async fn missing_stats_document_stops_startup() {
    let data_dir = unique_data_dir("missing");
    let status = command(&data_dir, pick_free_port())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("failed to run server");
    assert!(!status.success());
}
