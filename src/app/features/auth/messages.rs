//! Display strings for authentication failures.
//!
//! The auth service reports failures with provider-style English messages;
//! users see fixed Japanese text chosen by substring.

/// (substring of the raw message, message shown to the user). First match wins.
const AUTH_ERROR_MESSAGES: &[(&str, &str)] = &[
    (
        "Invalid login credentials",
        "メールアドレスまたはパスワードが正しくありません。",
    ),
    (
        "Email not confirmed",
        "メールアドレスの確認が完了していません。受信したメールをご確認ください。",
    ),
    (
        "User already registered",
        "このメールアドレスは既に登録されています。",
    ),
    (
        "Password should be at least",
        "パスワードは8文字以上で入力してください。",
    ),
    (
        "Password should contain",
        "パスワードには大文字・小文字・数字を含めてください。",
    ),
    (
        "Password should be at most",
        "パスワードは128文字以内で入力してください。",
    ),
    (
        "Password is required",
        "パスワードを入力してください。",
    ),
    (
        "Unable to validate email address",
        "有効なメールアドレスを入力してください。",
    ),
    (
        "Passwords do not match",
        "パスワードが一致しません。",
    ),
    (
        "rate limit",
        "リクエストが多すぎます。しばらくしてから再度お試しください。",
    ),
];

/// Translate a raw authentication error for display.
/// Unknown messages keep the raw text so they can still be diagnosed.
pub fn translate_auth_error(raw: &str) -> String {
    AUTH_ERROR_MESSAGES
        .iter()
        .find(|(needle, _)| raw.contains(needle))
        .map(|(_, shown)| shown.to_string())
        .unwrap_or_else(|| format!("認証エラーが発生しました: {}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_credentials_has_fixed_message() {
        assert_eq!(
            translate_auth_error("Invalid login credentials"),
            "メールアドレスまたはパスワードが正しくありません。"
        );
    }

    #[test]
    fn matches_by_substring() {
        assert_eq!(
            translate_auth_error("AuthApiError: User already registered (422)"),
            "このメールアドレスは既に登録されています。"
        );
        assert_eq!(
            translate_auth_error("Password should be at least 8 characters"),
            "パスワードは8文字以上で入力してください。"
        );
    }

    #[test]
    fn unknown_message_falls_back_with_raw_text() {
        let shown = translate_auth_error("Something odd happened");
        assert!(shown.starts_with("認証エラーが発生しました"));
        assert!(shown.contains("Something odd happened"));
    }
}
