//! アプリケーションのメインワークフローを定義するモジュール。
//!
//! このモジュールは、UI層（`cli`）とドメイン層（`domain`）を仲介し、
//! 正方形化の処理フローを 1 ファイルずつ順番に実行します。

use crate::cli::Args;
use photo_squarer::config::RunConfig;
use photo_squarer::domain::compositor::compose;
use photo_squarer::domain::input_source::directory_path::DirectoryPath;
use photo_squarer::domain::input_source::path_resolver::resolve_for_host;
use photo_squarer::domain::output_file::encoder::encode_with_metadata;
use photo_squarer::domain::output_file::output_path::{output_format, output_path_for};
use photo_squarer::domain::output_file::writer::{remove_source, write_output, WriteOutcome};
use photo_squarer::domain::source_image::SourceFile;
use photo_squarer::domain::watermark::Watermark;
use photo_squarer::error::AppError;
use std::path::Path;

/// 1 回の実行の集計結果。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, PartialEq, Eq)]
enum FileOutcome {
    Processed,
    Skipped,
}

// --- public な main 関数 ---

/// アプリケーションのメインロジックを実行します。
///
/// # 戻り値
/// * `Ok(RunSummary)`: フォルダ全体の処理を終えた場合。個々のファイルの失敗は集計に含まれます。
/// * `Err(AppError)`: フォルダ・透かし・設定ファイルが不正で、処理を始められない場合。
pub fn run(args: Args) -> Result<RunSummary, AppError> {
    // 1. パスの正規化 (Windows 形式のパスを変換)
    let folder = resolve_for_host(&args.image_folder);
    let watermark_path = args.watermark_path.as_deref().map(resolve_for_host);
    let config_path = args.config.as_deref().map(resolve_for_host);

    // 2. 設定の読み込み
    let config = RunConfig::load(config_path.as_deref(), args.delete_originals, args.overwrite)?;

    process_folder(&folder, watermark_path.as_deref(), &config)
}

/// フォルダ直下の画像をすべて処理します。
pub fn process_folder(
    folder: &Path,
    watermark_path: Option<&Path>,
    config: &RunConfig,
) -> Result<RunSummary, AppError> {
    // フォルダと透かしの不備は、どのファイルにも手を付ける前にエラーとする
    let input_dir = DirectoryPath::new(folder)?;
    let watermark = match watermark_path {
        Some(path) => {
            let mark = Watermark::load(path, config.watermark_size_ratio, config.watermark_opacity)?;
            log::info!(
                "透かしを使用します: {} (幅 {:.0}%, 不透明度 {:.2})",
                path.display(),
                mark.size_ratio() * 100.0,
                mark.opacity()
            );
            Some(mark)
        }
        None => None,
    };

    log::info!("フォルダを走査します: {} (余白色 {})", input_dir, config.border_color);
    if config.delete_originals {
        log::warn!("処理が完了した元画像は削除されます。");
    }

    let mut summary = RunSummary::default();
    for path in input_dir.image_files()? {
        match process_file(&path, watermark.as_ref(), config) {
            Ok(FileOutcome::Processed) => summary.processed += 1,
            Ok(FileOutcome::Skipped) => summary.skipped += 1,
            Err(e) => {
                // 1 ファイルの失敗で全体は止めない
                log::error!("'{}' を処理できませんでした: {}", path.display(), e);
                summary.failed += 1;
            }
        }
    }

    log::info!(
        "処理が完了しました: 成功 {} 件 / スキップ {} 件 / 失敗 {} 件",
        summary.processed,
        summary.skipped,
        summary.failed
    );
    Ok(summary)
}

// --- private なヘルパー関数 ---

/// 1 枚の画像を読み込み、正方形化して書き出します。
fn process_file(
    path: &Path,
    watermark: Option<&Watermark>,
    config: &RunConfig,
) -> Result<FileOutcome, AppError> {
    let file = SourceFile::detect(path)?;
    let format = output_format(file.format());
    let output_path = output_path_for(file.path(), format);

    if output_path.exists() && !config.overwrite {
        log::warn!(
            "'{}' は既に存在するためスキップします (--overwrite で上書き)",
            output_path.display()
        );
        return Ok(FileOutcome::Skipped);
    }

    // 出力先の確認が済んでからデコードする
    let source = file.decode()?;
    let composition = compose(&source.image, config.border_color, watermark)?;
    let encoded = encode_with_metadata(&composition.image, format, config.jpeg_quality, &source.metadata)?;

    if write_output(&output_path, &encoded, config.overwrite)? == WriteOutcome::AlreadyExists {
        log::warn!("'{}' が作成されたためスキップします", output_path.display());
        return Ok(FileOutcome::Skipped);
    }

    let action = if composition.watermarked {
        "余白 + 透かし"
    } else {
        "余白"
    };
    log::info!(
        "'{}' -> '{}' ({}, {}x{})",
        path.display(),
        output_path.display(),
        action,
        composition.geometry.canvas_size,
        composition.geometry.canvas_size
    );

    // 出力の書き込みが確定してから元画像を削除する
    if config.delete_originals {
        match remove_source(path) {
            Ok(()) => log::info!("  -> 元画像を削除しました: {}", path.display()),
            Err(e) => log::error!("  -> {}", e),
        }
    }

    Ok(FileOutcome::Processed)
}
