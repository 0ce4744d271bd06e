use crate::domain::metadata::MetadataError;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("画像のエンコードに失敗しました: {0}")]
    Encode(#[from] image::ImageError),

    #[error("メタデータを付け直せませんでした: {0}")]
    Metadata(#[from] MetadataError),

    #[error("'{path}' への書き込みに失敗しました: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("元ファイル '{path}' を削除できませんでした: {source}")]
    RemoveSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// 書き込みの結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// 同名の出力が既にあり、上書きの許可もないため書き込まなかった
    AlreadyExists,
}

/// 出力ファイルを書き込み、ディスクへの同期まで完了させます。
///
/// `overwrite` が偽のときは既存のファイルを決して上書きしません。
pub fn write_output(path: &Path, bytes: &[u8], overwrite: bool) -> Result<WriteOutcome, WriteError> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let to_write_error = |source: io::Error| WriteError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = match options.open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(WriteOutcome::AlreadyExists),
        Err(e) => return Err(to_write_error(e)),
    };
    file.write_all(bytes).map_err(to_write_error)?;
    file.sync_all().map_err(to_write_error)?;
    Ok(WriteOutcome::Written)
}

/// 元ファイルを削除します。出力の書き込みが確定した後にだけ呼び出してください。
pub fn remove_source(path: &Path) -> Result<(), WriteError> {
    fs::remove_file(path).map_err(|source| WriteError::RemoveSource {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_new_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out_1x1.png");
        assert_eq!(write_output(&path, b"abc", false).unwrap(), WriteOutcome::Written);
        assert_eq!(fs::read(&path).unwrap(), b"abc");
    }

    #[test]
    fn existing_file_is_left_alone_without_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out_1x1.png");
        fs::write(&path, b"old").unwrap();
        assert_eq!(write_output(&path, b"new", false).unwrap(), WriteOutcome::AlreadyExists);
        assert_eq!(fs::read(&path).unwrap(), b"old");
    }

    #[test]
    fn overwrite_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out_1x1.png");
        fs::write(&path, b"old content").unwrap();
        assert_eq!(write_output(&path, b"new", true).unwrap(), WriteOutcome::Written);
        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        let err = write_output(&path, b"x", false).unwrap_err();
        assert!(matches!(err, WriteError::Write { .. }));
    }

    #[test]
    fn remove_missing_source_reports_error() {
        let dir = tempdir().unwrap();
        let err = remove_source(&dir.path().join("gone.jpg")).unwrap_err();
        assert!(matches!(err, WriteError::RemoveSource { .. }));
    }
}
