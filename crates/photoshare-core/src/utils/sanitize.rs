//! 存储文件名净化工具

/// 只保留存储文件名中安全的字符，阻止路径穿越
pub fn sanitize_stored_filename(input: &str) -> String {
    let mut out = String::with_capacity(input.len().min(128));
    for c in input.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
            out.push(c);
        }
        if out.len() >= 128 {
            break;
        }
    }

    let out = out.trim_matches('.').to_string();
    if out.is_empty() || out.contains("..") {
        "unknown".to_string()
    } else {
        out
    }
}
