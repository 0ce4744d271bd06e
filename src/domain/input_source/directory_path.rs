use super::path_error::PathError;
use crate::domain::output_file::output_path::OUTPUT_SUFFIX;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 処理対象として扱う画像の拡張子（小文字）。
pub const SUPPORTED_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff", "webp"];

// 構造体としてDirectoryPathを定義
#[derive(Debug)]
pub struct DirectoryPath {
    pub path: PathBuf,
}

impl DirectoryPath {
    // コンストラクタ: パスを受け取り、バリデーションを行う
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, PathError> {
        let path = path.as_ref();

        // パスが存在し、かつディレクトリであることを検証
        if !path.exists() {
            return Err(PathError::InvalidPath(format!(
                "パス '{}' は存在しません。",
                path.display()
            )));
        }
        if !path.is_dir() {
            return Err(PathError::InvalidPath(format!(
                "パス '{}' はディレクトリではありません。",
                path.display()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    // 内部のPathBufへの参照を返す
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// ディレクトリ直下（非再帰）にある処理対象の画像ファイルを、パス順に並べて返します。
    ///
    /// 既に `_1x1` が付いた出力ファイルは対象外です。
    pub fn image_files(&self) -> Result<Vec<PathBuf>, PathError> {
        let mut files = Vec::new();
        // min_depth(1) でルート自身を、max_depth(1) でサブディレクトリの中身を除外する
        for entry in WalkDir::new(&self.path).min_depth(1).max_depth(1) {
            let entry = entry?;
            if entry.file_type().is_file() && is_image_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
        // 読み取り順序は保証されないためソートする
        files.sort();
        Ok(files)
    }
}

/// パスが処理対象の画像ファイル名であるか、拡張子とファイル名で判定します。
pub fn is_image_file(path: &Path) -> bool {
    // `file_stem` がないとドットファイル (`.DS_Store` など) を誤判定するためチェック
    let stem = match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) if !stem.starts_with('.') => stem,
        _ => return false,
    };
    if stem.contains(OUTPUT_SUFFIX) {
        return false;
    }
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

// Displayトレイトの実装（表示用）
impl fmt::Display for DirectoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
