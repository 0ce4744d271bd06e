use std::path::PathBuf;

/// ユーザーが入力したパスを、実行中のOSで扱える形に正規化します。
///
/// Windows 以外では `C:\Users\me` のような Windows 形式のパスを
/// WSL 流の `/mnt/c/Users/me` に変換します。`/` で始まるパスはそのまま返します。
pub fn resolve_user_path(input: &str, host_is_windows: bool) -> PathBuf {
    if host_is_windows || input.starts_with('/') {
        return PathBuf::from(input);
    }

    let unix_style = input.replace('\\', "/");
    let bytes = unix_style.as_bytes();
    // 先頭が "X:/" ならドライブレターとみなす
    if bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/' {
        let drive = (bytes[0] as char).to_ascii_lowercase();
        return PathBuf::from(format!("/mnt/{}/{}", drive, &unix_style[3..]));
    }
    PathBuf::from(unix_style)
}

/// 現在のホストに合わせて [`resolve_user_path`] を呼び出します。
pub fn resolve_for_host(input: &str) -> PathBuf {
    resolve_user_path(input, cfg!(windows))
}
