use std::path::Path;

/// 从文件路径或文件名中获取扩展名，并转换为小写
///
/// # 参数
///
/// * `path` - 文件路径或文件名
///
/// # 返回值
///
/// 返回小写的文件扩展名字符串，如果没有扩展名则返回空字符串
///
/// # 示例
///
/// ```
/// use park_image_server::utils::path::get_extension_lowercase;
///
/// assert_eq!(get_extension_lowercase("images/park.JPG"), "jpg");
/// assert_eq!(get_extension_lowercase("path/to/image.PNG"), "png");
/// assert_eq!(get_extension_lowercase("noext"), "");
/// assert_eq!(get_extension_lowercase(".hidden"), "");
/// ```
pub fn get_extension_lowercase(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default()
}

/// 从对象引用中提取存储桶内的对象键
///
/// 引用可以是对象键本身，也可以是包含对象键的完整 URL，
/// 此时对象键位于 `marker`（如 `.myqcloud.com/`）之后。
/// 不以 `http` 开头的引用视为已经是对象键；提取失败时原样返回。
///
/// # 示例
///
/// ```
/// use park_image_server::utils::path::extract_object_key;
///
/// let url = "https://parks-1391406291.cos.ap-guangzhou.myqcloud.com/images/a.jpg";
/// assert_eq!(extract_object_key(url, ".myqcloud.com/"), "images/a.jpg");
/// assert_eq!(extract_object_key("images/a.jpg", ".myqcloud.com/"), "images/a.jpg");
/// ```
pub fn extract_object_key<'a>(reference: &'a str, marker: &str) -> &'a str {
    if !reference.starts_with("http") || marker.is_empty() {
        return reference;
    }

    match reference.split_once(marker) {
        Some((_, key)) if !key.is_empty() => key,
        _ => reference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = ".myqcloud.com/";

    #[test]
    fn test_extract_object_key_from_full_url() {
        assert_eq!(
            extract_object_key(
                "https://parks-1391406291.cos.ap-guangzhou.myqcloud.com/images/test.jpg",
                MARKER
            ),
            "images/test.jpg"
        );
    }

    #[test]
    fn test_extract_object_key_keeps_bare_key() {
        assert_eq!(extract_object_key("images/test.jpg", MARKER), "images/test.jpg");
        assert_eq!(extract_object_key("", MARKER), "");
    }

    #[test]
    fn test_extract_object_key_falls_back_to_input() {
        // 其他域名的链接无法提取，原样作为对象键
        let other = "https://example.com/images/test.jpg";
        assert_eq!(extract_object_key(other, MARKER), other);

        // 标记之后没有内容
        let bare_host = "https://parks.cos.ap-guangzhou.myqcloud.com/";
        assert_eq!(extract_object_key(bare_host, MARKER), bare_host);
    }

    #[test]
    fn test_extract_object_key_keeps_query_and_nested_path() {
        assert_eq!(
            extract_object_key("https://b.cos.myqcloud.com/a/b/c.png?x=1", MARKER),
            "a/b/c.png?x=1"
        );
    }
}
