//! # エンドポイントテスト用共通ヘルパー
//!
//! forward, downloadテストで共有するモックサーバー起動と
//! テスト用ステート構築。

use std::collections::HashMap;
use std::sync::Arc;

use romshelf_ingest::RouteTable;

use crate::config::AppState;

/// テスト用AppStateを構築する。
pub(crate) fn test_state(
    upstream_base: &str,
    download_endpoint: &str,
    routes: HashMap<String, String>,
) -> Arc<AppState> {
    Arc::new(AppState {
        upstream_base: upstream_base.to_string(),
        download_endpoint: download_endpoint.to_string(),
        http_client: reqwest::Client::new(),
        routes: RouteTable::new(routes),
    })
}

/// テスト用モックHTTPサーバーを起動し、ポート番号を返す。
pub(crate) async fn start_mock_server(app: axum::Router) -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    port
}

/// メモリ上でZIPアーカイブを組み立ててバイト列で返す。
pub(crate) fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    use std::io::Write;

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
