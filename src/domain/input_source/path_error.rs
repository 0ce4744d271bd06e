use thiserror::Error;

// 入力パスに関するエラー型
#[derive(Debug, Error)]
pub enum PathError {
    #[error("無効なパスです: {0}")]
    InvalidPath(String),

    #[error("ディレクトリの走査に失敗しました: {0}")]
    WalkError(#[from] walkdir::Error),
}
