//! # Romshelf ゲートウェイ
//!
//! レトロゲームカタログサイト向けのパーソナルメディア取得プロキシ。
//!
//! ## 役割
//! - `/download` 以外の全トラフィックを上流カタログサイトへ透過転送
//! - Vault配下のHTMLへダウンロードフォーム書き換えスクリプトを追記
//! - `/download?mediaId=<id>` でアーカイブを取得し、拡張子ごとの
//!   保存先ディレクトリへ展開
//!
//! ## 設定（環境変数）
//! - `ROMSHELF_BIND` — リッスンアドレス（デフォルト: `0.0.0.0:3000`）
//! - `ROMSHELF_UPSTREAM` — 上流カタログサイトのベースURL
//! - `ROMSHELF_DOWNLOAD_ENDPOINT` — アーカイブダウンロードエンドポイント
//! - `ROMSHELF_ROUTES` — 拡張子→保存先ディレクトリのJSONオブジェクト

mod config;
mod endpoints;
mod error;

use std::collections::HashMap;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use config::AppState;
use endpoints::{handle_download, handle_forward};
use romshelf_ingest::RouteTable;

/// ルートテーブル未指定時のデフォルト（RetroPieのSNES ROMディレクトリ）。
fn default_routes() -> RouteTable {
    let mut routes = HashMap::new();
    routes.insert("smc".to_string(), "/home/pi/RetroPie/roms/snes/".to_string());
    routes.insert("sfc".to_string(), "/home/pi/RetroPie/roms/snes/".to_string());
    RouteTable::new(routes)
}

/// ルーターを構築する。`/download` だけが取り込みエンドポイントで、
/// 残りの全パスはフォールバックとして転送ゲートウェイへ届く。
fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/download", get(handle_download))
        .fallback(handle_forward)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let bind_addr =
        std::env::var("ROMSHELF_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let upstream_base =
        std::env::var("ROMSHELF_UPSTREAM").unwrap_or_else(|_| "https://vimm.net".to_string());
    let download_endpoint = std::env::var("ROMSHELF_DOWNLOAD_ENDPOINT")
        .unwrap_or_else(|_| "https://download4.vimm.net/download/".to_string());

    let routes = match std::env::var("ROMSHELF_ROUTES") {
        Ok(json) => RouteTable::from_json(&json)
            .map_err(|e| anyhow::anyhow!("ROMSHELF_ROUTESが不正です: {e}"))?,
        Err(_) => default_routes(),
    };

    tracing::info!(
        upstream = %upstream_base,
        routes = routes.len(),
        "設定を読み込みました"
    );

    let state = Arc::new(AppState {
        upstream_base,
        download_endpoint,
        http_client: reqwest::Client::new(),
        routes,
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("ゲートウェイを {} で起動します", bind_addr);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
