/// Expand `${NAME}` and `${NAME:-fallback}` placeholders from the process
/// environment.
///
/// Placeholders that cannot be resolved and have no fallback are kept verbatim.
pub fn substitute_env(input: &str) -> String {
    expand(input, |name| std::env::var(name).ok())
}

fn expand(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated placeholder, copy the remainder untouched.
            out.push_str(&rest[start..]);
            return out;
        };

        let placeholder = &after[..end];
        let (name, fallback) = match placeholder.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (placeholder, None),
        };

        match lookup(name).or_else(|| fallback.map(str::to_owned)) {
            Some(value) if !name.is_empty() => out.push_str(&value),
            _ => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn lookup(name: &str) -> Option<String> {
        match name {
            "COURIER_TEST_POLICY" => Some("skip".to_string()),
            _ => None,
        }
    }

    #[rstest]
    #[case("policy = \"${COURIER_TEST_POLICY}\"", "policy = \"skip\"")]
    #[case("${COURIER_MISSING}", "${COURIER_MISSING}")]
    #[case("${COURIER_MISSING:-error}", "error")]
    #[case("${COURIER_TEST_POLICY:-error}", "skip")]
    #[case("${}", "${}")]
    #[case("tail ${COURIER_TEST_POLICY", "tail ${COURIER_TEST_POLICY")]
    #[case("a ${COURIER_TEST_POLICY} b ${COURIER_TEST_POLICY}", "a skip b skip")]
    fn expands_placeholders(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(expand(input, lookup), expected);
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(substitute_env("include_inherited = true"), "include_inherited = true");
    }
}
