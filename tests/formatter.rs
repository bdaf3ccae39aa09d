use chrono::{Local, TimeZone};
use hades::fmt::{Formatter, strip_ansi};
use hades::{ErrorInfo, Field, Level, Locale, LogEvent, error_cause, error_data, format_event};
use std::sync::Arc;

fn at_noon(level: Level, fields: Vec<Field>) -> LogEvent {
    let time = Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    LogEvent::new(level, fields).timestamp(time)
}

fn plain(event: &LogEvent) -> hades::FormattedRecord {
    format_event(event, false, &Locale::english())
}

#[test]
fn where_only() {
    let record = plain(&at_noon(Level::Info, vec!["sys".into()]));
    assert_eq!(record.line, "[24-05-01 12:00:00:000][INFO] sys");
    assert_eq!(record.stack_block, None);
}

#[test]
fn two_spaces_around_sections() {
    let record = plain(&at_noon(Level::Info, vec!["sys".into(), "load".into()]));
    assert_eq!(record.line, "[24-05-01 12:00:00:000][INFO] sys >  load");

    let record = plain(&at_noon(
        Level::Warn,
        vec!["sys".into(), "load".into(), "a".into(), 2.into()],
    ));
    assert_eq!(record.line, "[24-05-01 12:00:00:000][WARN] sys >  load  a\n\t2");
}

#[test]
fn empty_what_skips_arrow() {
    let record = plain(&at_noon(
        Level::Info,
        vec!["sys".into(), "".into(), "result".into()],
    ));
    assert_eq!(record.line, "[24-05-01 12:00:00:000][INFO] sys  result");
}

#[test]
fn empty_fields_render_nothing() {
    let record = plain(&at_noon(Level::Info, vec![]));
    assert_eq!(record.line, "");
    assert_eq!(record.stack_block, None);
}

#[test]
fn missing_results_are_skipped() {
    let record = plain(&at_noon(
        Level::Info,
        vec![
            "a".into(),
            "b".into(),
            Field::Missing,
            "c".into(),
            Option::<&str>::None.into(),
        ],
    ));
    assert_eq!(record.line, "[24-05-01 12:00:00:000][INFO] a >  b  c");
}

#[test]
fn json_message_is_used() {
    let record = plain(&at_noon(
        Level::Info,
        vec![
            "a".into(),
            "b".into(),
            serde_json::json!({"message": "from json", "code": 7}).into(),
            serde_json::json!({"code": 7}).into(),
        ],
    ));
    assert_eq!(
        record.line,
        "[24-05-01 12:00:00:000][INFO] a >  b  from json\n\t{\"code\":7}"
    );
}

#[test]
fn cause_chain_texts() {
    let err = error_cause("a", error_cause("b", ErrorInfo::new("c")));
    let record = plain(&at_noon(
        Level::Error,
        vec!["x".into(), "y".into(), err.into()],
    ));

    assert_eq!(
        record.line,
        "[24-05-01 12:00:00:000][ERROR] x >  y  a\n\t--> b\n\t--> c"
    );
    let block = record.stack_block.unwrap();
    assert!(block.starts_with(&record.line));
    assert_eq!(block.matches("\n--------------\n").count(), 2);
}

#[test]
fn terminal_cause_value() {
    let err = error_cause("a", "not an error");
    let record = plain(&at_noon(Level::Error, vec!["x".into(), "y".into(), err.into()]));
    assert!(record.line.ends_with("a\n\t--> not an error"));
    assert_eq!(
        record.stack_block.unwrap().matches("\n--------------\n").count(),
        0
    );
}

#[test]
fn bare_error_is_plain_text() {
    let record = plain(&at_noon(
        Level::Error,
        vec!["x".into(), "y".into(), ErrorInfo::bare("just a message").into()],
    ));
    assert!(record.line.ends_with("y  just a message"));
    assert_eq!(record.stack_block, None);
}

#[test]
fn stack_block_layout() {
    let err = error_data(
        ErrorInfo::new("boom").with_stack("Error: boom\n    at main"),
        "ctx",
    );
    let record = plain(&at_noon(Level::Error, vec!["x".into(), "y".into(), err.into()]));

    assert_eq!(
        record.stack_block.unwrap(),
        [
            "[24-05-01 12:00:00:000][ERROR] x >  y  boom",
            "-------------- Stack --------------",
            "boom\nError: boom\n\tat main\n[Data] ctx",
            "===================================\n",
        ]
        .join("\n")
    );
}

#[test]
fn std_errors_follow_source() {
    let io = std::io::Error::other("disk full");
    let err = hades::Error::Io(io);
    let record = plain(&at_noon(
        Level::Error,
        vec!["x".into(), "y".into(), (&err).into()],
    ));
    assert!(record.line.ends_with("I/O error: disk full\n\t--> disk full"));
}

#[test]
fn highlighted_line_strips_to_plain() {
    let event = at_noon(
        Level::Info,
        vec!["~[sys]".into(), "load ~{x}".into(), "ok".into()],
    );
    let colored = format_event(&event, true, &Locale::english());
    assert!(colored.line.starts_with("\x1b[38;2;"));
    assert_eq!(
        strip_ansi(&colored.line),
        "[24-05-01 12:00:00:000][INFO] sys >  load [x]  ok"
    );
}

#[test]
fn chinese_labels() {
    let formatter = Formatter::new(Arc::new(Locale::load("zh-CN"))).highlighted(false);
    let record = formatter.format(&at_noon(Level::Warn, vec!["a".into()]));
    assert_eq!(record.line, "[24-05-01 12:00:00:000][警告] a");
}
