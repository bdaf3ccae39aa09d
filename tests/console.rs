use hades::{ConsoleOutput, ErrorInfo, Field, Formatter, Level, LogEvent, Output, UpdateMarker};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Shared(Arc<Mutex<Vec<u8>>>);

impl Shared {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Shared {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn console() -> (ConsoleOutput, Shared, Shared) {
    let out = Shared::default();
    let err = Shared::default();
    let console = ConsoleOutput::with_writers(
        Formatter::default().highlighted(false).time_format("T"),
        Box::new(out.clone()),
        Box::new(err.clone()),
    );
    (console, out, err)
}

fn event(what: &str, marker: Option<UpdateMarker>) -> LogEvent {
    LogEvent::new(Level::Info, vec![Field::from("job"), Field::from(what)]).marker(marker)
}

#[test]
fn plain_lines_append() {
    let (console, out, err) = console();
    console.write(&event("a", None)).unwrap();
    console.write(&event("b", None)).unwrap();
    assert_eq!(out.text(), "[T][INFO] job >  a\n[T][INFO] job >  b\n");
    assert_eq!(err.text(), "");
}

#[test]
fn updates_rewrite_in_place_until_done() {
    let (console, out, _) = console();
    console
        .write(&event("10%", Some(UpdateMarker::InPlaceUpdate)))
        .unwrap();
    console
        .write(&event("50%", Some(UpdateMarker::InPlaceUpdate)))
        .unwrap();
    console
        .write(&event("100%", Some(UpdateMarker::InPlaceDone)))
        .unwrap();
    console.write(&event("next", None)).unwrap();

    let erase = "\x1b[1A\x1b[2K";
    assert_eq!(
        out.text(),
        format!(
            "[T][INFO] job >  10%\n{erase}[T][INFO] job >  50%\n{erase}[T][INFO] job >  100%\n[T][INFO] job >  next\n"
        )
    );
}

#[test]
fn stack_block_goes_to_stderr() {
    let (console, out, err) = console();
    let failed = LogEvent::new(
        Level::Error,
        vec!["job".into(), "run".into(), ErrorInfo::new("boom").into()],
    );
    console.write(&failed).unwrap();

    assert_eq!(out.text(), "[T][ERROR] job >  run  boom\n");
    assert!(err.text().starts_with("[T][ERROR] job >  run  boom\n-------------- Stack"));
}
