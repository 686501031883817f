//! Fixed rule tables for the policy engine
//!
//! Tables are compiled once on first use and never change afterwards.

use lazy_static::lazy_static;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;

/// A compiled pattern and the label used in its message
pub struct Rule<R> {
    pub pattern: R,
    pub label: &'static str,
}

pub type PathRule = Rule<Regex>;
pub type ContentRule = Rule<BytesRegex>;

lazy_static! {
    /// Case-insensitive patterns over the file path
    pub static ref SENSITIVE_FILE_RULES: Vec<PathRule> = vec![
        path_rule(r"(?i)\.env$", "environment file"),
        path_rule(r"(?i)\.env\.", "environment file"),
        path_rule(r"(?i)credentials", "credentials file"),
        path_rule(r"(?i)secret", "secrets file"),
        path_rule(r"(?i)private[_-]?key", "private key"),
        path_rule(r"(?i)id_rsa", "SSH private key"),
        path_rule(r"(?i)id_ed25519", "SSH private key"),
        path_rule(r"(?i)\.pem$", "PEM certificate or key"),
        path_rule(r"(?i)\.(p12|pfx)$", "PKCS#12 keystore"),
        path_rule(r"(?i)\.key$", "key file"),
    ];

    /// Credential shapes searched for in file content
    pub static ref SECRET_CONTENT_RULES: Vec<ContentRule> = vec![
        content_rule(r"AKIA[0-9A-Z]{16}", "AWS Access Key ID"),
        content_rule(
            r"-----BEGIN (?:RSA |EC |DSA |OPENSSH )?PRIVATE KEY-----",
            "private key",
        ),
        content_rule(r"ghp_[A-Za-z0-9]{36}", "GitHub personal access token"),
        content_rule(r"gho_[A-Za-z0-9]{36}", "GitHub OAuth token"),
        content_rule(r"(?:ghu|ghs)_[A-Za-z0-9]{36}", "GitHub app token"),
        content_rule(r"sk-[A-Za-z0-9]{48}", "OpenAI API key"),
        content_rule(r"xox[baprs]-[0-9A-Za-z-]{10,48}", "Slack token"),
        // Non-empty quoted literal assigned to a password or API key name
        content_rule(r#"(?i)password\s*=\s*["'][^"']+["']"#, "hardcoded password"),
        content_rule(r#"(?i)api[_-]?key\s*=\s*["'][^"']+["']"#, "hardcoded API key"),
    ];
}

fn path_rule(pattern: &str, label: &'static str) -> PathRule {
    Rule {
        pattern: Regex::new(pattern).unwrap(),
        label,
    }
}

fn content_rule(pattern: &str, label: &'static str) -> ContentRule {
    Rule {
        pattern: BytesRegex::new(pattern).unwrap(),
        label,
    }
}

/// Labels of every sensitive-file rule matching `path`, one per rule
pub fn sensitive_matches(path: &str) -> impl Iterator<Item = &'static str> + '_ {
    SENSITIVE_FILE_RULES
        .iter()
        .filter(move |rule| rule.pattern.is_match(path))
        .map(|rule| rule.label)
}

/// Labels of every secret rule matching `content`, one per rule
pub fn secret_matches(content: &[u8]) -> impl Iterator<Item = &'static str> + '_ {
    SECRET_CONTENT_RULES
        .iter()
        .filter(move |rule| rule.pattern.is_match(content))
        .map(|rule| rule.label)
}
