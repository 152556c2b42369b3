// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Smart Fuzzing Sub-generators
 * Shape-specific invalid values for email/url/number/date/json inputs
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

/// Malformed local parts, domains and structurally invalid addresses
pub fn fuzz_email(email: &str) -> Vec<String> {
    let mut fuzzed = Vec::new();

    if let Some((user, domain)) = email.split_once('@') {
        fuzzed.push(format!("{}@{}", "A".repeat(100), domain));
        fuzzed.push(format!("..@{}", domain));
        fuzzed.push(format!("{}+test@{}", user, domain));
        fuzzed.push(format!("<{}>@{}", user, domain));

        fuzzed.push(format!("{}@", user));
        fuzzed.push(format!("{}@.", user));
        fuzzed.push(format!("{}@localhost", user));
        fuzzed.push(format!("{}@127.0.0.1", user));
    }

    fuzzed.extend(
        ["@", "@@", "test@", "@test", "test@@test"]
            .iter()
            .map(|s| s.to_string()),
    );

    fuzzed
}

/// Scheme swaps, traversal suffixes and debug parameters
pub fn fuzz_url(url: &str) -> Vec<String> {
    let mut fuzzed = vec![
        url.replace("http://", "file://"),
        url.replace("http://", "javascript:"),
        url.replace("http://", "data:"),
        format!("{}/../../../etc/passwd", url),
        format!("{}/.git/config", url),
        format!("{}/.env", url),
    ];

    if url.contains('?') {
        fuzzed.push(format!("{}&debug=1", url));
        fuzzed.push(format!("{}&admin=true", url));
    }

    fuzzed
}

/// Neighbouring values, sign/scale flips and IEEE edges
pub fn fuzz_number(number: &str) -> Vec<String> {
    let mut fuzzed = Vec::new();

    if let Ok(num) = number.parse::<f64>() {
        fuzzed.push((num - 1.0).to_string());
        fuzzed.push((num + 1.0).to_string());
        fuzzed.push((-num).to_string());
        fuzzed.push((num * 2.0).to_string());
        fuzzed.push(if num != 0.0 { (num / 2.0).to_string() } else { "0".to_string() });
        fuzzed.push("0".to_string());
        fuzzed.push("-1".to_string());
        fuzzed.push("1".to_string());

        fuzzed.push("inf".to_string());
        fuzzed.push("-inf".to_string());
        fuzzed.push("nan".to_string());
        fuzzed.push((2u64.pow(31) - 1).to_string());
        fuzzed.push((-(2i64.pow(31))).to_string());
        fuzzed.push((2u64.pow(32) - 1).to_string());
    }

    fuzzed
}

/// Invalid calendar dates, epoch edges and format variations
pub fn fuzz_date(date: &str) -> Vec<String> {
    let mut fuzzed: Vec<String> = [
        "0000-00-00", "9999-99-99",
        "2024-13-01", "2024-01-32",
        "2024-02-30", "2023-02-29",
        "1970-01-01", "2038-01-19",
        "1900-01-01", "2100-12-31",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    if date.contains('-') {
        fuzzed.push(date.replace('-', "/"));
        fuzzed.push(date.replace('-', "."));
    }

    fuzzed
}

/// Malformed structures, non-JSON literals and prototype pollution
pub fn fuzz_json(_json: &str) -> Vec<String> {
    let mut fuzzed: Vec<String> = [
        "{", "}", "[", "]",
        "{\"test\": }", "{\"test\": \"value\"",
        "{\"test\": undefined}", "{\"test\": NaN}",
        "{\"__proto__\": {\"isAdmin\": true}}",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    // Deeply nested object
    fuzzed.push(format!("{}1{}", "{\"a\": ".repeat(1000), "}".repeat(1000)));

    fuzzed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_fuzz_splits_on_at() {
        let fuzzed = fuzz_email("user@example.com");
        assert!(fuzzed.contains(&"user@localhost".to_string()));
        assert!(fuzzed.contains(&format!("{}@example.com", "A".repeat(100))));
        assert!(fuzzed.contains(&"@@".to_string()));
    }

    #[test]
    fn test_url_fuzz_swaps_scheme() {
        let fuzzed = fuzz_url("http://example.com/page");
        assert!(fuzzed.contains(&"file://example.com/page".to_string()));
        assert!(fuzzed.iter().any(|f| f.ends_with("/etc/passwd")));
    }

    #[test]
    fn test_url_fuzz_appends_debug_params_only_with_query() {
        let fuzzed = fuzz_url("http://example.com/page?id=1");
        assert!(fuzzed.contains(&"http://example.com/page?id=1&debug=1".to_string()));

        let no_query = fuzz_url("http://example.com/page");
        assert!(!no_query.iter().any(|f| f.contains("debug=1")));
    }

    #[test]
    fn test_number_fuzz_neighbours() {
        let fuzzed = fuzz_number("42");
        assert!(fuzzed.contains(&"41".to_string()));
        assert!(fuzzed.contains(&"43".to_string()));
        assert!(fuzzed.contains(&"nan".to_string()));
    }

    #[test]
    fn test_date_fuzz_invalid_calendar_dates() {
        let fuzzed = fuzz_date("2024-06-15");
        assert!(fuzzed.contains(&"2024-13-01".to_string()));
        assert!(fuzzed.contains(&"2024/06/15".to_string()));
    }

    #[test]
    fn test_json_fuzz_prototype_pollution() {
        let fuzzed = fuzz_json("{\"a\": 1}");
        assert!(fuzzed
            .iter()
            .any(|f| f.contains("__proto__")));
    }
}
