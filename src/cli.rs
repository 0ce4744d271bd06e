use clap::Parser;

/// フォルダ内の写真に余白を付けて正方形 (1:1) にするツール
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// 処理対象の画像が入ったフォルダのパス (Windows 形式のパスも可)
    #[arg(required = true)]
    pub image_folder: String,

    /// 右下に重ねる透かし画像のパス (オプション: 省略時は余白のみ)
    pub watermark_path: Option<String>,

    /// 出力の書き込みが完了した元画像を削除する
    #[arg(long)]
    pub delete_originals: bool,

    /// 同名の出力ファイルが既にある場合に上書きする
    #[arg(long)]
    pub overwrite: bool,

    /// 余白色・JPEG品質・透かしの大きさと不透明度を上書きする JSON 設定ファイル
    #[arg(short, long)]
    pub config: Option<String>,
}
