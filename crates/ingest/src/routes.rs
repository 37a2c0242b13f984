//! # 拡張子ルートテーブル
//!
//! 拡張子文字列から保存先ディレクトリへの静的マッピング。
//! 起動時に一度構築され、以後は読み取り専用。

use std::collections::HashMap;

use crate::error::IngestError;

/// ファイル名の拡張子を返す。
///
/// 最後の `.` より後ろの部分文字列で、`.` を含まない名前は
/// 名前全体がそのまま拡張子になる。大文字小文字は区別する。
pub fn file_ext(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// 拡張子→保存先ディレクトリの静的マッピング。
///
/// 保存先の値は検証なしでエントリ名と連結されるため、
/// 末尾に `/` を付けたディレクトリパスを指定する。
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<String, String>,
}

impl RouteTable {
    /// マッピングからテーブルを構築する。
    pub fn new(routes: HashMap<String, String>) -> Self {
        Self { routes }
    }

    /// JSONオブジェクト（拡張子→ディレクトリ）からテーブルを構築する。
    pub fn from_json(json: &str) -> Result<Self, IngestError> {
        let routes: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| IngestError::Routes(format!("JSONのデコードに失敗: {e}")))?;
        Ok(Self::new(routes))
    }

    /// 拡張子に対応する保存先ディレクトリを返す。未登録の拡張子はNone。
    pub fn dest_for(&self, ext: &str) -> Option<&str> {
        self.routes.get(ext).map(String::as_str)
    }

    /// 登録されている拡張子の数。
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// テーブルが空かどうか。
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
