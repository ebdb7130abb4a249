use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use rusty_bus::{
    Handle, Registry,
    widget::{Collection, SpawnError, Toolkit, Widget, listener},
};
use thiserror::Error;

/// Largest widget count a single `spawn` accepts.
pub const MAX_SPAWN: usize = 10_000;

const SPAWN_USAGE: &str = "spawn [n], n from 0 to 10000";

pub const HELP: &str = "\
spawn [n]               create n widgets (default 1, at most 10000)
destroy <id>            destroy a widget
sub <event> <id>...     subscribe widgets to an event
unsub <event> <id>...   unsubscribe widgets from an event
pub <event> [arg]...    publish an event with optional arguments
events                  list events and their subscribers
widgets                 list live widgets
help                    show this text
exit | quit             leave the shell";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a widget id")]
    BadId(String),

    #[error("no widget #{0}")]
    NoSuchWidget(u32),

    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error(transparent)]
    Registry(#[from] rusty_bus::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Spawn(usize),
    Destroy(u32),
    Sub { event: String, ids: Vec<u32> },
    Unsub { event: String, ids: Vec<u32> },
    Pub { event: String, args: Vec<String> },
    Events,
    Widgets,
    Help,
    Exit,
}

impl Command {
    /// Parses one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let rest: Vec<&str> = words.collect();

        let command = match name {
            "spawn" => match rest.as_slice() {
                [] => Self::Spawn(1),
                [n] => match n.parse() {
                    Ok(count) if count <= MAX_SPAWN => Self::Spawn(count),
                    _ => return Err(CommandError::Usage(SPAWN_USAGE)),
                },
                _ => return Err(CommandError::Usage(SPAWN_USAGE)),
            },
            "destroy" => match rest.as_slice() {
                [id] => Self::Destroy(parse_id(id)?),
                _ => return Err(CommandError::Usage("destroy <id>")),
            },
            "sub" => match rest.split_first() {
                Some((event, ids)) if !ids.is_empty() => Self::Sub {
                    event: (*event).to_owned(),
                    ids: parse_ids(ids)?,
                },
                _ => return Err(CommandError::Usage("sub <event> <id>...")),
            },
            "unsub" => match rest.split_first() {
                Some((event, ids)) if !ids.is_empty() => Self::Unsub {
                    event: (*event).to_owned(),
                    ids: parse_ids(ids)?,
                },
                _ => return Err(CommandError::Usage("unsub <event> <id>...")),
            },
            "pub" => match rest.split_first() {
                Some((event, args)) => Self::Pub {
                    event: (*event).to_owned(),
                    args: args.iter().map(|a| (*a).to_owned()).collect(),
                },
                None => return Err(CommandError::Usage("pub <event> [arg]...")),
            },
            "events" => Self::Events,
            "widgets" => Self::Widgets,
            "help" => Self::Help,
            "exit" | "quit" => Self::Exit,
            other => return Err(CommandError::Unknown(other.to_owned())),
        };
        Ok(Some(command))
    }
}

fn parse_id(word: &str) -> Result<u32, CommandError> {
    word.trim_start_matches('#')
        .parse()
        .map_err(|_| CommandError::BadId(word.to_owned()))
}

fn parse_ids(words: &[&str]) -> Result<Vec<u32>, CommandError> {
    words.iter().map(|w| parse_id(w)).collect()
}

/// What the read loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// A registry over an in-memory toolkit, driven by text commands.
///
/// Everything a command prints, including listener output produced during a publish, is
/// buffered and collected with [`take_output`](Self::take_output).
pub struct Shell {
    toolkit: Rc<Toolkit<String>>,
    registry: Registry<Collection<String>>,
    widgets: BTreeMap<u32, Widget>,
    output: Rc<RefCell<Vec<String>>>,
}

impl Shell {
    pub fn new() -> Self {
        Self {
            toolkit: Toolkit::shared(),
            registry: Registry::new(),
            widgets: BTreeMap::new(),
            output: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn run_line(&mut self, line: &str) -> Result<Flow, CommandError> {
        match Command::parse(line)? {
            Some(command) => self.execute(command),
            None => Ok(Flow::Continue),
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow, CommandError> {
        match command {
            Command::Spawn(count) => {
                let spawned = self.toolkit.spawn_many(count)?;
                for widget in &spawned {
                    self.widgets.insert(widget.id().value(), *widget);
                }
                self.print(join(spawned.iter()));
            }
            Command::Destroy(id) => {
                let widget = self.widget(id)?;
                self.toolkit.destroy(widget);
                self.widgets.remove(&id);
                self.print(format!("destroyed {widget}"));
            }
            Command::Sub { event, ids } => {
                let target = self.collection(&ids)?;
                let output = Rc::clone(&self.output);
                self.registry.subscribe(
                    &target,
                    &event,
                    listener(move |ev, args: &[String]| {
                        output.borrow_mut().push(format!(
                            "{} <- {}({})",
                            ev.target(),
                            ev.name(),
                            args.join(", ")
                        ));
                    }),
                )?;
                self.print(format!("subscribed {} to '{event}'", join(target.iter())));
            }
            Command::Unsub { event, ids } => {
                let target = self.collection(&ids)?;
                let removed = self.registry.unsubscribe(&target, &event);
                self.print(removed.to_string());
            }
            Command::Pub { event, args } => {
                let published = self.registry.publish_with(&event, &args);
                self.print(published.to_string());
            }
            Command::Events => {
                let names = self.registry.event_names();
                if names.is_empty() {
                    self.print("no subscriptions".to_owned());
                }
                for name in names {
                    if let Some(aggregate) = self.registry.subscribers(&name) {
                        self.print(format!(
                            "{name}: {} [{}]",
                            aggregate.len(),
                            join(aggregate.iter())
                        ));
                    }
                }
            }
            Command::Widgets => {
                self.print(join(self.widgets.values()));
            }
            Command::Help => self.print(HELP.to_owned()),
            Command::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    /// Drains everything printed since the last call.
    pub fn take_output(&self) -> Vec<String> {
        std::mem::take(&mut *self.output.borrow_mut())
    }

    fn print(&self, line: String) {
        self.output.borrow_mut().push(line);
    }

    fn widget(&self, id: u32) -> Result<Widget, CommandError> {
        self.widgets
            .get(&id)
            .copied()
            .ok_or(CommandError::NoSuchWidget(id))
    }

    fn collection(&self, ids: &[u32]) -> Result<Collection<String>, CommandError> {
        let widgets = ids
            .iter()
            .map(|id| self.widget(*id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Collection::of(&self.toolkit, widgets))
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(" ")
}
