//! # ダウンロードエンドポイント
//!
//! `GET /download?mediaId=<id>`
//!
//! ## 処理フロー
//! 1. 上流ダウンロードエンドポイントからアーカイブを取得する
//! 2. ボディを作業ディレクトリの `<id>.zip` に書き出す
//! 3. ルートテーブルに従ってエントリを保存先へ展開する
//! 4. 一時アーカイブを削除する（失敗は警告ログのみ）

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use serde::Deserialize;

use crate::config::AppState;
use crate::error::GatewayError;

/// `/download` のクエリパラメータ。
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    /// 取得対象アーカイブの識別子。省略時は空文字列のまま上流へ渡す。
    #[serde(rename = "mediaId", default)]
    pub media_id: String,
}

/// ダウンロードハンドラ。
///
/// 識別子は検証せずそのままURLと一時ファイル名に使う。
/// 同じ識別子への同時リクエストは同じ一時ファイルと保存先を
/// 取り合う（排他制御はしない）。
pub async fn handle_download(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DownloadQuery>,
    headers: HeaderMap,
) -> Result<&'static str, GatewayError> {
    let media_id = query.media_id;
    let url = format!("{}?mediaId={}", state.download_endpoint, media_id);

    // 受信ヘッダを引き継ぐ。Refererは上流サイトのルートに固定する
    // （上流がダウンロード許可の判定に使う）。
    let mut outbound_headers = HeaderMap::new();
    for (name, value) in &headers {
        if *name == header::REFERER || *name == header::HOST {
            continue;
        }
        outbound_headers.insert(name, value.clone());
    }
    let referer = format!("{}/", state.upstream_base);
    outbound_headers.insert(
        header::REFERER,
        HeaderValue::from_str(&referer)
            .map_err(|e| GatewayError::Internal(format!("Refererの構築に失敗: {e}")))?,
    );

    let response = state
        .http_client
        .get(&url)
        .headers(outbound_headers)
        .send()
        .await
        .map_err(|e| GatewayError::Fetch(format!("{url}: {e}")))?;

    let body = response
        .bytes()
        .await
        .map_err(|e| GatewayError::BodyRead(e.to_string()))?;

    // ボディを一時アーカイブとして書き出す（既存ファイルは上書き）
    let archive_path = format!("{media_id}.zip");
    tokio::fs::write(&archive_path, &body)
        .await
        .map_err(|e| GatewayError::Persist(format!("{archive_path}: {e}")))?;

    // zipの読み取りはブロッキングI/Oなのでワーカースレッドで実行する
    let saved = {
        let state = state.clone();
        let path = archive_path.clone();
        tokio::task::spawn_blocking(move || {
            romshelf_ingest::extract_archive(&path, &state.routes)
        })
        .await
        .map_err(|e| GatewayError::Internal(format!("展開タスクの実行に失敗: {e}")))??
    };

    // 展開に成功した場合のみ一時アーカイブを片付ける。
    // 削除失敗は警告にとどめ、呼び出し元へは成功を返す。
    if let Err(e) = tokio::fs::remove_file(&archive_path).await {
        tracing::warn!(path = %archive_path, error = %e, "一時アーカイブの削除に失敗");
    }

    tracing::info!(media_id = %media_id, saved = saved.len(), "アーカイブの取り込みが完了");

    Ok("Saved")
}
