//! # ゲートウェイエラー型
//!
//! 取り込みパイプライン共通のエラー型。どの段階で失敗したかを
//! メッセージに持つ。転送ゲートウェイはエラーを返さず、ステータス
//! コードのみでその場で打ち切る（`endpoints/forward.rs`）。

use axum::http::StatusCode;

/// アーカイブ取り込みパイプラインのエラー型。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// ダウンロードリクエストの送信に失敗
    #[error("コンテンツの取得に失敗: {0}")]
    Fetch(String),
    /// レスポンスボディの読み取りに失敗
    #[error("ボディの読み取りに失敗: {0}")]
    BodyRead(String),
    /// 一時アーカイブの書き込みに失敗
    #[error("アーカイブの書き込みに失敗: {0}")]
    Persist(String),
    /// アーカイブの展開に失敗
    #[error(transparent)]
    Ingest(#[from] romshelf_ingest::IngestError),
    /// 内部エラー（ブロッキングタスクの実行失敗等）
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!(error = %self, "取り込みに失敗");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
