//! HTTP front end: an index page, the two trigger routes and a health check.

use crate::funpay::{FunPayExtractor, Lot};
use crate::{run_inspect, run_parse, HunterError, PageSource};
use axum::{
    extract::State,
    response::{Html, Json},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn PageSource>,
    pub extractor: FunPayExtractor,
    pub listing_url: Arc<str>,
}

impl AppState {
    pub fn new(source: impl PageSource + 'static, listing_url: &str) -> Self {
        Self {
            source: Arc::new(source),
            extractor: FunPayExtractor,
            listing_url: listing_url.into(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/parse", get(parse_page))
        .route("/debug", get(debug_page))
        .route("/health", get(health))
        .route("/api/lots", get(lots_json))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState, port: u16) -> Result<(), HunterError> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

async fn index() -> Html<String> {
    let now = chrono::Local::now().format("%H:%M:%S");
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>FunPay Hunter</title>
    <style>
        body {{ font-family: Arial; margin: 40px; }}
        .btn {{
            display: inline-block; padding: 10px 20px; margin: 5px;
            background: #007bff; color: white; text-decoration: none; border-radius: 5px;
        }}
        .btn-orange {{ background: #fd7e14; }}
    </style>
</head>
<body>
    <h1>FunPay Hunter</h1>
    <p><strong>Статус:</strong> сервер работает</p>
    <p><strong>Время:</strong> {now}</p>
    <h3>Действия:</h3>
    <a href="/parse" class="btn">Запустить парсинг</a>
    <a href="/debug" class="btn btn-orange">Анализ структуры</a>
</body>
</html>"#
    ))
}

async fn parse_page(State(state): State<AppState>) -> Html<String> {
    let lots = run_parse(state.source.as_ref(), &state.extractor, &state.listing_url).await;
    Html(render_lots(&lots))
}

async fn lots_json(State(state): State<AppState>) -> Json<Vec<Lot>> {
    Json(run_parse(state.source.as_ref(), &state.extractor, &state.listing_url).await)
}

async fn debug_page(State(state): State<AppState>) -> Html<String> {
    let ok = run_inspect(state.source.as_ref(), &state.extractor, &state.listing_url).await;
    let heading = if ok {
        "Анализ структуры выполнен"
    } else {
        "Не удалось загрузить страницу"
    };
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Анализ структуры</title></head>
<body style="font-family:Arial; margin:20px;">
    <a href="/">&larr; Назад</a>
    <h2>{heading}</h2>
    <p>Подробности о структуре карточек товаров записаны в лог сервера.</p>
    <p><a href="/parse">Запустить парсинг &rarr;</a></p>
</body>
</html>"#
    ))
}

async fn health() -> &'static str {
    "OK"
}

fn render_lots(lots: &[Lot]) -> String {
    let mut result = String::new();
    if lots.is_empty() {
        result.push_str(
            r#"<div style="background:#f8d7da; padding:20px; border-radius:5px;">
    <h2>Товары не найдены</h2>
    <p>Парсер не нашел товаров Black Russia.</p>
    <p>Попробуйте <a href="/debug">проанализировать структуру</a>.</p>
</div>"#,
        );
    } else {
        result.push_str(&format!(
            "<h2>Найдено {} товаров Black Russia:</h2>",
            lots.len()
        ));
        for lot in lots {
            let badge = if lot.seller_online {
                "ОНЛАЙН"
            } else {
                "ОФФЛАЙН"
            };
            result.push_str(&format!(
                r#"
<div style="border:1px solid #ddd; padding:15px; margin:10px; border-radius:5px;">
    <h4>{}</h4>
    <p><strong>Цена:</strong> {} руб. ({})</p>
    <p><strong>Статус продавца:</strong> {}</p>
    <p><strong>ID продавца:</strong> {}</p>
    <p><a href="{}" target="_blank">Открыть на FunPay</a></p>
</div>"#,
                escape(&lot.title),
                lot.price,
                escape(&lot.raw_price_text),
                badge,
                escape(&lot.seller_id),
                escape(&lot.link),
            ));
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Результаты парсинга</title></head>
<body style="font-family:Arial; margin:20px;">
    <a href="/">&larr; Назад</a>
    {result}
</body>
</html>"#
    )
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::funpay::LISTING_URL;
    use crate::test_utils::StaticSource;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use pretty_assertions::assert_eq;
    use std::fs;
    use tower::ServiceExt;

    async fn get_body(source: StaticSource, uri: &str) -> (StatusCode, String) {
        let app = build_router(AppState::new(source, LISTING_URL));
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn fixture() -> StaticSource {
        let html = fs::read_to_string("tests/htmls/chips.html").expect("Invalid file url");
        StaticSource::page(html)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_body(StaticSource::failing(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_index_links_actions() {
        let (status, body) = get_body(StaticSource::failing(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"href="/parse""#));
        assert!(body.contains(r#"href="/debug""#));
    }

    #[tokio::test]
    async fn test_parse_page_renders_lots() {
        let (status, body) = get_body(fixture(), "/parse").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Найдено 3 товаров Black Russia"));
        assert!(body.contains("<strong>Цена:</strong> 1500 руб. (1 500₽)"));
        assert!(body.contains(r#"href="https://funpay.com/chips/offer?id=20001""#));
        assert!(body.contains("ОФФЛАЙН"));
    }

    #[tokio::test]
    async fn test_parse_page_fetch_failure() {
        let (status, body) = get_body(StaticSource::failing(), "/parse").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Товары не найдены"));
    }

    #[tokio::test]
    async fn test_parse_page_escapes_markup() {
        let html = r#"<a class="tc-item" href="/lots/1">
            <div class="tc-desc-text">Black Russia &lt;script&gt;alert(1)&lt;/script&gt;</div>
            <div class="tc-price">100 ₽</div>
        </a>"#;
        let (_, body) = get_body(StaticSource::page(html), "/parse").await;
        assert!(body.contains("Black Russia &lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!body.contains("<script>"));
    }

    #[tokio::test]
    async fn test_lots_json() {
        let (status, body) = get_body(fixture(), "/api/lots").await;
        assert_eq!(status, StatusCode::OK);

        let lots: serde_json::Value = serde_json::from_str(&body).unwrap();
        let ids = lots
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["seller_id"].as_str().unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["501", "502", ""]);
    }

    #[tokio::test]
    async fn test_debug_page() {
        let (status, body) = get_body(fixture(), "/debug").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Анализ структуры выполнен"));

        let (_, body) = get_body(StaticSource::failing(), "/debug").await;
        assert!(body.contains("Не удалось загрузить страницу"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }
}
