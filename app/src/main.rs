mod logger;
mod shell;

use rustyline::{DefaultEditor, error::ReadlineError};

use logger::{ChannelLogger, LOG_ENV};
use shell::{Flow, Shell};

fn main() -> rustyline::Result<()> {
    let level = logger::level_from(std::env::var(LOG_ENV).ok().as_deref());
    let log_recv = match ChannelLogger::install(level) {
        Ok(receiver) => Some(receiver),
        Err(err) => {
            eprintln!("logging disabled: {err}");
            None
        }
    };

    let mut editor = DefaultEditor::new()?;
    let mut shell = Shell::new();
    println!("rusty bus shell, 'help' lists commands");

    loop {
        let line = match editor.readline("bus> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        };
        let _ = editor.add_history_entry(line.as_str());

        let flow = shell.run_line(&line);

        if let Some(receiver) = &log_recv {
            for message in receiver.try_iter() {
                println!("[{}] {}: {}", message.level, message.target, message.message);
            }
        }
        for output in shell.take_output() {
            println!("{output}");
        }

        match flow {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(err) => eprintln!("error: {err}"),
        }
    }
    Ok(())
}
