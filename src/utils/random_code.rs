use rand::Rng;

const CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz23456789";

/// 生成指定长度的随机字符串
///
/// 字符集排除了容易混淆的 0/O、1/l/I。
pub fn generate_random_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CODE_CHARSET.len());
            CODE_CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_code_length() {
        assert_eq!(generate_random_code(8).len(), 8);
        assert_eq!(generate_random_code(16).len(), 16);
    }

    #[test]
    fn test_generate_random_code_charset() {
        let code = generate_random_code(64);
        assert!(code.bytes().all(|b| CODE_CHARSET.contains(&b)));
    }
}
