use lazy_static::lazy_static;
use regex::Regex;

/// YouTube 视频页面前缀
pub const YOUTUBE_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

lazy_static! {
    // 文件名中允许保留的字符之外的一切
    static ref UNSAFE_FILENAME_CHARS: Regex =
        Regex::new(r"[^A-Za-z0-9\-_ \[\]()]").expect("文件名正则无效");
}

/// 将标题转换为可安全用作文件名的字符串
///
/// 所有不在 `[A-Za-z0-9-_ \[\]()]` 中的字符逐个替换为 `_`，
/// 因此输出的字符数与输入相同。
pub fn sanitize_filename(filename: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(filename, "_").into_owned()
}

/// 根据视频标识生成观看链接
pub fn youtube_link(reference: &str) -> String {
    format!("{}{}", YOUTUBE_URL_PREFIX, reference)
}

/// 转义 HTML 特殊字符，避免标题破坏进度页面结构
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
