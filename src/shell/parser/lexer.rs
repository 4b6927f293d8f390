/// Splits a raw command line into word and operator tokens.
///
/// Whitespace outside quotes ends the current word, so runs of spaces
/// collapse. Single and double quotes make everything up to the matching
/// quote literal, including operator characters and the other quote
/// character; the quotes themselves are consumed but not emitted. The
/// operators `>>`, `>`, `<`, `|` and `;` are emitted as standalone tokens
/// even when glued to a word (`a>b` is three tokens), with `>>` matched
/// greedily before `>`.
///
/// An unterminated quote is not an error: the remaining input is taken
/// literally up to the end of the string.
///
/// Empty words are dropped even when produced by an empty quoted string,
/// so `''` and `""` yield no token rather than an empty argument. This
/// diverges from POSIX shells and is deliberate.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut quote: Option<char> = None;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            } else {
                word.push(c);
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            c if c.is_whitespace() => flush(&mut tokens, &mut word),
            '>' => {
                flush(&mut tokens, &mut word);
                if chars.peek() == Some(&'>') {
                    chars.next();
                    tokens.push(">>".to_string());
                } else {
                    tokens.push(">".to_string());
                }
            }
            '<' => {
                flush(&mut tokens, &mut word);
                tokens.push("<".to_string());
            }
            '|' => {
                flush(&mut tokens, &mut word);
                tokens.push("|".to_string());
            }
            ';' => {
                flush(&mut tokens, &mut word);
                tokens.push(";".to_string());
            }
            _ => word.push(c),
        }
    }
    flush(&mut tokens, &mut word);

    tokens
}

fn flush(tokens: &mut Vec<String>, word: &mut String) {
    if !word.is_empty() {
        tokens.push(std::mem::take(word));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(tokenize("echo hello world"), words(&["echo", "hello", "world"]));
    }

    #[test]
    fn test_quoted_string() {
        assert_eq!(tokenize(r#"echo "hello world""#), words(&["echo", "hello world"]));
    }

    #[test]
    fn test_single_quoted() {
        assert_eq!(tokenize("echo 'hello world'"), words(&["echo", "hello world"]));
    }

    #[test]
    fn test_output_redirection() {
        assert_eq!(
            tokenize("echo test > file.txt"),
            words(&["echo", "test", ">", "file.txt"])
        );
    }

    #[test]
    fn test_append_redirection() {
        assert_eq!(
            tokenize("echo test >> file.txt"),
            words(&["echo", "test", ">>", "file.txt"])
        );
    }

    #[test]
    fn test_input_redirection() {
        assert_eq!(tokenize("cat < file.txt"), words(&["cat", "<", "file.txt"]));
    }

    #[test]
    fn test_mixed_quotes_and_operators() {
        assert_eq!(
            tokenize(r#"sort "data file.txt" > output.txt"#),
            words(&["sort", "data file.txt", ">", "output.txt"])
        );
    }

    #[test]
    fn test_multiple_spaces() {
        assert_eq!(
            tokenize("echo    hello     world"),
            words(&["echo", "hello", "world"])
        );
    }

    #[test]
    fn test_operator_glued_to_word() {
        assert_eq!(
            tokenize("file.txt>out.txt"),
            words(&["file.txt", ">", "out.txt"])
        );
    }

    #[test]
    fn test_quote_inside_word() {
        assert_eq!(tokenize(r#"foo"bar baz"qux"#), words(&["foobar bazqux"]));
    }

    #[test]
    fn test_other_quote_is_literal() {
        assert_eq!(tokenize(r#"echo "it's fine""#), words(&["echo", "it's fine"]));
    }

    #[test]
    fn test_operators_inside_quotes_are_literal() {
        assert_eq!(tokenize(r#"echo "a > b | c""#), words(&["echo", "a > b | c"]));
    }

    #[test]
    fn test_unterminated_quote_is_permissive() {
        assert_eq!(tokenize(r#"echo "unfinished"#), words(&["echo", "unfinished"]));
    }

    #[test]
    fn test_empty_quotes_yield_no_token() {
        assert_eq!(tokenize("echo ''"), words(&["echo"]));
        assert_eq!(tokenize(r#"echo """#), words(&["echo"]));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(tokenize(""), Vec::<String>::new());
        assert_eq!(tokenize("   "), Vec::<String>::new());
    }
}
