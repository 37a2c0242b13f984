//! # 取り込みエラー型
//!
//! アーカイブ取り込みの全段階で共通のエラー型。
//! どの段階で失敗したかをメッセージに持つ。

/// アーカイブ取り込みのエラー型。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// アーカイブのオープンに失敗（壊れたZIP、非ZIPコンテンツ等）
    #[error("アーカイブを開けません: {0}")]
    Open(String),
    /// アーカイブエントリの読み取りに失敗
    #[error("アーカイブエントリを読み取れません: {0}")]
    Entry(String),
    /// 保存先ファイルの作成に失敗
    #[error("保存先ファイルを作成できません: {0}")]
    Create(String),
    /// エントリ内容のコピーに失敗
    #[error("エントリのコピーに失敗: {0}")]
    Copy(String),
    /// ルートテーブルのパースに失敗
    #[error("ルートテーブルのパースに失敗: {0}")]
    Routes(String),
}
