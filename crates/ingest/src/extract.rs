//! # アーカイブ展開
//!
//! ZIPアーカイブをエントリ順に走査し、ルートテーブルに載っている
//! 拡張子のエントリだけを保存先ディレクトリへコピーする。

use std::fs::File;
use std::io;

use zip::ZipArchive;

use crate::error::IngestError;
use crate::routes::{file_ext, RouteTable};

/// アーカイブを展開し、保存したファイルのパス一覧を返す。
///
/// テーブルに載っていない拡張子のエントリは読み飛ばす（エラーではない）。
/// 保存先は `ディレクトリ + エントリ名` の連結そのままで、既存ファイルは
/// 上書きされる。途中のエントリで失敗した場合は全体をエラーで打ち切り、
/// それまでに保存したファイルはそのまま残る。
pub fn extract_archive(path: &str, routes: &RouteTable) -> Result<Vec<String>, IngestError> {
    let file = File::open(path).map_err(|e| IngestError::Open(format!("{path}: {e}")))?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| IngestError::Open(format!("{path}: {e}")))?;

    let mut saved = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| IngestError::Entry(format!("index {i}: {e}")))?;

        let name = entry.name().to_string();
        let dir = match routes.dest_for(file_ext(&name)) {
            Some(dir) => dir,
            None => continue,
        };

        // 保存先はディレクトリとエントリ名の連結そのまま
        let dest_path = format!("{dir}{name}");
        let mut dest = File::create(&dest_path)
            .map_err(|e| IngestError::Create(format!("{dest_path}: {e}")))?;

        io::copy(&mut entry, &mut dest)
            .map_err(|e| IngestError::Copy(format!("{dest_path}: {e}")))?;

        tracing::info!(path = %dest_path, "エントリを保存しました");
        saved.push(dest_path);
    }

    Ok(saved)
}
