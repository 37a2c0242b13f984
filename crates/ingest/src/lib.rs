//! # Romshelf アーカイブ取り込みライブラリ
//!
//! ダウンロード済みZIPアーカイブからROMファイルを抽出し、
//! 拡張子ごとに設定された保存先ディレクトリへ振り分ける。
//!
//! ## 処理フロー
//! 1. 拡張子→保存先のルートテーブルを構築する
//! 2. アーカイブをエントリ順に走査する
//! 3. テーブルに載っている拡張子のエントリだけを保存先へコピーする

mod error;
mod extract;
mod routes;

pub use error::IngestError;
pub use extract::extract_archive;
pub use routes::{file_ext, RouteTable};
