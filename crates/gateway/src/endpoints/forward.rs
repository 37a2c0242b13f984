//! # 転送ゲートウェイ
//!
//! `/download` 以外の全リクエストを上流カタログサイトへ転送する。
//! Vault配下のHTMLページには、ダウンロードフォームの送信先を
//! ローカルの `/download` に書き換えるスクリプトを追記する。

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::AppState;

/// スクリプト注入の対象になるパスプレフィックス
const VAULT_PREFIX: &str = "/vault";

/// スクリプト注入の対象になるContent-Type（完全一致で判定する）
const HTML_CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// Vault配下のHTMLに追記するスクリプト断片。
/// ページ内のダウンロードフォームの送信先を `/download` に差し替える。
const DOWNLOAD_FORM_SCRIPT: &str = r#"
<script>
window.addEventListener('DOMContentLoaded', () => {
	const form = document.querySelector('#download_form');
	form.action = '/download';
});
</script>
"#;

/// 転送ゲートウェイハンドラ。
///
/// 受信リクエストのパス+クエリを上流ベースURLへそのまま連結し、
/// ヘッダを引き継いだGETリクエストとして実行する。レスポンスの
/// ステータス・ヘッダ・ボディを呼び出し元へそのまま返す。
///
/// このハンドラはエラーを返さない。失敗はすべてステータスコード
/// のみのレスポンスでその場で打ち切る（400: 転送先URLの構築失敗、
/// 500: 転送失敗）。
pub async fn handle_forward(State(state): State<Arc<AppState>>, req: Request) -> Response {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
        .to_string();
    let target = format!("{}{}", state.upstream_base, path_and_query);

    let target_url = match reqwest::Url::parse(&target) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(target = %target, error = %e, "転送先URLの構築に失敗");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    // 受信ヘッダを引き継ぐ。Accept-Encodingを外して上流に非圧縮の
    // ボディを返させる（圧縮されているとスクリプトを追記できない）。
    // Hostはhyperが通常ヘッダとして見せるため、そのまま転送すると
    // 上流のホスト名と食い違う。
    let mut outbound_headers = HeaderMap::new();
    for (name, value) in req.headers() {
        if *name == header::ACCEPT_ENCODING || *name == header::HOST {
            continue;
        }
        outbound_headers.insert(name, value.clone());
    }

    let upstream = match state
        .http_client
        .get(target_url)
        .headers(outbound_headers)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            tracing::error!(target = %target, error = %e, "上流への転送に失敗");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let status = upstream.status();
    let is_html = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.as_bytes() == HTML_CONTENT_TYPE.as_bytes())
        .unwrap_or(false);

    // ボディの差し替えで長さが変わるため、長さ系のヘッダは引き継がず
    // hyperの再計算に任せる。
    let mut reply_headers = HeaderMap::new();
    for (name, value) in upstream.headers() {
        if *name == header::CONTENT_LENGTH || *name == header::TRANSFER_ENCODING {
            continue;
        }
        reply_headers.append(name, value.clone());
    }

    let body = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(target = %target, error = %e, "上流ボディの読み取りに失敗");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if path_and_query.starts_with(VAULT_PREFIX) && is_html {
        let mut injected = body.to_vec();
        injected.extend_from_slice(DOWNLOAD_FORM_SCRIPT.as_bytes());
        return (status, reply_headers, injected).into_response();
    }

    (status, reply_headers, body.to_vec()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::body::Body;
    use axum::routing::get;
    use axum::Router;

    use crate::endpoints::test_helpers::{start_mock_server, test_state};

    /// handle_forwardへ渡すリクエストを構築する。
    fn forward_request(uri: &str, headers: &[(&str, &str)]) -> Request {
        let mut builder = axum::http::Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    /// レスポンスボディをバイト列で読み出す。
    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    /// Accept-Encodingは転送されず、他の受信ヘッダは転送されることを確認
    #[tokio::test]
    async fn test_accept_encoding_not_forwarded() {
        let app = Router::new().route(
            "/page",
            get(|headers: axum::http::HeaderMap| async move {
                format!(
                    "accept-encoding={} probe={}",
                    headers.contains_key("accept-encoding"),
                    headers
                        .get("x-probe")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-"),
                )
            }),
        );
        let port = start_mock_server(app).await;
        let state = test_state(&format!("http://127.0.0.1:{port}"), "", HashMap::new());

        let req = forward_request("/page", &[("accept-encoding", "gzip, br"), ("x-probe", "1")]);
        let response = handle_forward(State(state), req).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"accept-encoding=false probe=1");
    }

    /// パスとクエリがそのまま上流へ連結されることを確認
    #[tokio::test]
    async fn test_path_and_query_forwarded_verbatim() {
        let app = Router::new().route(
            "/page",
            get(|axum::extract::RawQuery(query): axum::extract::RawQuery| async move {
                query.unwrap_or_default()
            }),
        );
        let port = start_mock_server(app).await;
        let state = test_state(&format!("http://127.0.0.1:{port}"), "", HashMap::new());

        let response =
            handle_forward(State(state), forward_request("/page?x=1&y=2", &[])).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"x=1&y=2");
    }

    /// Vault配下のHTMLにスクリプトが追記されることを確認
    #[tokio::test]
    async fn test_injects_script_into_vault_html() {
        let app = Router::new().route(
            "/vault/123",
            get(|| async {
                (
                    [(axum::http::header::CONTENT_TYPE, "text/html; charset=UTF-8")],
                    "<html><body>rom page</body></html>",
                )
            }),
        );
        let port = start_mock_server(app).await;
        let state = test_state(&format!("http://127.0.0.1:{port}"), "", HashMap::new());

        let response = handle_forward(State(state), forward_request("/vault/123", &[])).await;

        assert_eq!(response.status(), StatusCode::OK);
        let expected = format!("<html><body>rom page</body></html>{DOWNLOAD_FORM_SCRIPT}");
        assert_eq!(body_bytes(response).await, expected.as_bytes());
    }

    /// Vault外のHTMLにはスクリプトを追記しないことを確認
    #[tokio::test]
    async fn test_no_injection_outside_vault() {
        let app = Router::new().route(
            "/news",
            get(|| async {
                (
                    [(axum::http::header::CONTENT_TYPE, "text/html; charset=UTF-8")],
                    "<html>news</html>",
                )
            }),
        );
        let port = start_mock_server(app).await;
        let state = test_state(&format!("http://127.0.0.1:{port}"), "", HashMap::new());

        let response = handle_forward(State(state), forward_request("/news", &[])).await;

        assert_eq!(body_bytes(response).await, b"<html>news</html>");
    }

    /// Content-Typeが完全一致しない場合は追記しないことを確認
    #[tokio::test]
    async fn test_no_injection_for_other_content_type() {
        // charsetなしの text/html は完全一致しないので対象外
        let app = Router::new().route(
            "/vault/456",
            get(|| async {
                (
                    [(axum::http::header::CONTENT_TYPE, "text/html")],
                    "<html>vault</html>",
                )
            }),
        );
        let port = start_mock_server(app).await;
        let state = test_state(&format!("http://127.0.0.1:{port}"), "", HashMap::new());

        let response = handle_forward(State(state), forward_request("/vault/456", &[])).await;

        assert_eq!(body_bytes(response).await, b"<html>vault</html>");
    }

    /// 上流レスポンスのステータスとヘッダが引き継がれることを確認
    #[tokio::test]
    async fn test_status_and_response_headers_copied() {
        let app = Router::new().route(
            "/missing",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    [("x-catalog", "miss")],
                    "not found page",
                )
            }),
        );
        let port = start_mock_server(app).await;
        let state = test_state(&format!("http://127.0.0.1:{port}"), "", HashMap::new());

        let response = handle_forward(State(state), forward_request("/missing", &[])).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get("x-catalog").and_then(|v| v.to_str().ok()),
            Some("miss")
        );
        assert_eq!(body_bytes(response).await, b"not found page");
    }

    /// 上流へ到達できない場合は500のみを返すことを確認
    #[tokio::test]
    async fn test_unreachable_upstream_returns_500() {
        let state = test_state("http://127.0.0.1:9", "", HashMap::new());

        let response = handle_forward(State(state), forward_request("/page", &[])).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_bytes(response).await.is_empty());
    }

    /// 転送先URLを構築できない場合は400のみを返すことを確認
    #[tokio::test]
    async fn test_invalid_upstream_returns_400() {
        let state = test_state("::not a base::", "", HashMap::new());

        let response = handle_forward(State(state), forward_request("/page", &[])).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_bytes(response).await.is_empty());
    }
}
