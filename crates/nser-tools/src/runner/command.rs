//! Argument vector construction and command-line rendering

use crate::registry::ToolDefinition;

/// Final argument vector: `default_args ++ user_args ++ [target]`
#[must_use]
pub fn build_args(def: &ToolDefinition, user_args: &[String], target: &str) -> Vec<String> {
    def.default_args
        .iter()
        .chain(user_args)
        .cloned()
        .chain(std::iter::once(target.to_string()))
        .collect()
}

/// Render a human-readable command line for history display.
///
/// Never re-parsed or executed. The binary is printed as registered; only
/// arguments are quoted.
#[must_use]
pub fn render_command_line(binary: &str, args: &[String]) -> String {
    std::iter::once(binary.to_string())
        .chain(args.iter().map(|arg| quote_arg(arg)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_arg(arg: &str) -> String {
    if arg.contains([' ', '\t', '"', '\'']) {
        format!("{arg:?}")
    } else {
        arg.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ToolCategory;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_argument_order() {
        let def = ToolDefinition::new("t", ToolCategory::Scanning, "t").with_default_args(["a", "b"]);
        let args = build_args(&def, &strings(&["c", "d"]), "t.example");
        assert_eq!(args, strings(&["a", "b", "c", "d", "t.example"]));
    }

    #[test]
    fn test_target_is_last_without_user_args() {
        let def = ToolDefinition::new("nuclei", ToolCategory::Scanning, "nuclei")
            .with_default_args(["-silent"]);
        assert_eq!(build_args(&def, &[], "10.0.0.1"), strings(&["-silent", "10.0.0.1"]));
    }

    #[test]
    fn test_plain_args_render_bare() {
        let line = render_command_line("nmap", &strings(&["-sV", "-p", "1-1000", "10.0.0.1"]));
        assert_eq!(line, "nmap -sV -p 1-1000 10.0.0.1");
    }

    #[test]
    fn test_args_with_spaces_are_quoted() {
        let line = render_command_line("ffuf", &strings(&["-H", "User-Agent: nser", "-u", "x"]));
        assert_eq!(line, "ffuf -H \"User-Agent: nser\" -u x");
    }

    #[test]
    fn test_binary_is_never_quoted() {
        let line = render_command_line("/opt/My Tools/nmap", &strings(&["-sV", "a b"]));
        assert_eq!(line, "/opt/My Tools/nmap -sV \"a b\"");
    }

    #[test]
    fn test_quote_characters_are_escaped() {
        assert_eq!(quote_arg("it's"), "\"it's\"");
        assert_eq!(quote_arg("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote_arg("a\tb"), "\"a\\tb\"");
    }
}
