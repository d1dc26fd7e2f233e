use crate::utils::path::get_extension_lowercase;

/// 根据对象键的扩展名猜测 MIME 类型
///
/// 没有扩展名或无法识别时返回 `None`，此时不覆盖存储端记录的 Content-Type。
///
/// # 参数
///
/// * `key` - 对象键或文件路径
pub fn guess_mime_type(key: &str) -> Option<String> {
    let ext = get_extension_lowercase(key);
    if ext.is_empty() {
        return None;
    }

    mime_guess::from_ext(&ext)
        .first()
        .map(|mime| mime.essence_str().to_string())
}
