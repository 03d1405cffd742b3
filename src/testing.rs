//! Fakes for exercising workflows without a console or a service executable.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;

use crate::bridge::{BridgeError, Command, RecordsService, ServiceReply};
use crate::terminal::Terminal;

type Responder = Box<dyn Fn(&[String]) -> Result<ServiceReply, BridgeError>>;

/// Records every command; replies per keyword, empty stdout otherwise.
#[derive(Default)]
pub struct FakeService {
    responders: HashMap<&'static str, Responder>,
    calls: RefCell<Vec<(String, Vec<String>)>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, keyword: &'static str, stdout: &str) -> Self {
        let stdout = stdout.to_string();
        self.respond_with(keyword, move |_| Ok(ServiceReply::ok(stdout.clone())))
    }

    pub fn respond_with<F>(mut self, keyword: &'static str, f: F) -> Self
    where
        F: Fn(&[String]) -> Result<ServiceReply, BridgeError> + 'static,
    {
        self.responders.insert(keyword, Box::new(f));
        self
    }

    /// Replies like the service's life-expectancy lookup for the given codes.
    pub fn with_countries(self, known: &'static [&'static str]) -> Self {
        self.respond_with("get-life-expectancy", move |args| {
            if known.contains(&args[0].as_str()) {
                Ok(ServiceReply::ok("78.5"))
            } else {
                Ok(ServiceReply::ok("Invalid country code"))
            }
        })
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, keyword: &str) -> Vec<Vec<String>> {
        self.calls
            .borrow()
            .iter()
            .filter(|(k, _)| k == keyword)
            .map(|(_, args)| args.clone())
            .collect()
    }
}

impl RecordsService for FakeService {
    fn call(&self, command: &Command) -> Result<ServiceReply, BridgeError> {
        let args = command.args();
        self.calls
            .borrow_mut()
            .push((command.keyword().to_string(), args.clone()));
        match self.responders.get(command.keyword()) {
            Some(responder) => responder(&args),
            None => Ok(ServiceReply::ok("")),
        }
    }
}

/// Feeds queued lines and keeps everything printed.
#[derive(Debug, Default)]
pub struct ScriptedTerminal {
    inputs: VecDeque<String>,
    output: Vec<String>,
}

impl ScriptedTerminal {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            output: Vec::new(),
        }
    }

    pub fn transcript(&self) -> String {
        self.output.join("\n")
    }

    pub fn count(&self, needle: &str) -> usize {
        self.output.iter().filter(|l| l.contains(needle)).count()
    }

    pub fn remaining_inputs(&self) -> usize {
        self.inputs.len()
    }
}

impl Terminal for ScriptedTerminal {
    fn prompt(&mut self, message: &str) -> io::Result<String> {
        self.output.push(message.to_string());
        self.inputs
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }

    fn say(&mut self, message: &str) {
        self.output.push(message.to_string());
    }
}
