use std::io::IsTerminal;

pub mod check;
pub mod compare;
pub mod detect;
pub mod run;
pub mod worker;

#[derive(Clone, Copy)]
pub enum Status {
    Ok,
    Warn,
    Fail,
}

// ONE-LINE STATUS MARKER, COLORED ONLY ON A TERMINAL
pub fn status(kind: Status, msg: &str) {
    let (tag, color) = match kind {
        Status::Ok => (" OK ", "32"),
        Status::Warn => ("WARN", "33"),
        Status::Fail => ("FAIL", "31"),
    };
    if std::io::stdout().is_terminal() {
        println!("\x1b[{}m[{}]\x1b[0m {}", color, tag, msg);
    } else {
        println!("[{}] {}", tag, msg);
    }
}
