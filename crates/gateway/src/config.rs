//! # ゲートウェイ設定・共有状態
//!
//! 環境変数からの設定読み込みは `main.rs` で行い、ここでは
//! ゲートウェイの共有状態を定義する。

use romshelf_ingest::RouteTable;

/// ゲートウェイの共有状態。
/// 起動時に一度構築され、以後は読み取り専用。
pub struct AppState {
    /// 転送先カタログサイトのベースURL（末尾スラッシュなし）
    pub upstream_base: String,
    /// アーカイブダウンロードエンドポイントのURL
    pub download_endpoint: String,
    /// 共有HTTPクライアント。
    /// タイムアウトは設定しない。ハングした上流はそのリクエスト
    /// だけを塞ぎ、他のハンドラには影響しない。
    pub http_client: reqwest::Client,
    /// 拡張子→保存先ディレクトリのルートテーブル
    pub routes: RouteTable,
}
