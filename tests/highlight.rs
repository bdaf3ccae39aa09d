use hades::highlight;

const TERM_OPEN: &str = "\x1b[4m\x1b[1m";
const TERM_CLOSE: &str = "\x1b[22m\x1b[24m";
const WHITE: &str = "\x1b[38;2;255;255;255m";
const FG_RESET: &str = "\x1b[39m";

#[test]
fn plain_text_is_unchanged() {
    for text in ["", "hello", "a [bracket] and {brace}", "tilde ~ alone", "多字节"] {
        assert_eq!(highlight(text), text);
    }
}

#[test]
fn term_and_value() {
    assert_eq!(
        highlight("load ~[config] from ~{/etc/app}"),
        format!("load {TERM_OPEN}config{TERM_CLOSE} from {WHITE}[/etc/app]{FG_RESET}")
    );
}

#[test]
fn capture_is_non_greedy() {
    assert_eq!(
        highlight("~[a] and ~[b]"),
        format!("{TERM_OPEN}a{TERM_CLOSE} and {TERM_OPEN}b{TERM_CLOSE}")
    );
}

#[test]
fn escapes_are_literal() {
    assert_eq!(highlight(r"\~[not a term]"), "~[not a term]");
    assert_eq!(highlight(r"\{ \} \[ \]"), "{ } [ ]");
}

#[test]
fn unterminated_span_stays() {
    assert_eq!(highlight("~[open"), "~[open");
    assert_eq!(highlight("~{open"), "~{open");
}

#[test]
fn value_inside_term() {
    assert_eq!(
        highlight("~[path ~{x}]"),
        format!("{TERM_OPEN}path {WHITE}[x]{FG_RESET}{TERM_CLOSE}")
    );
}
