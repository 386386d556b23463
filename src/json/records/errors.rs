use std::cell::RefCell;
use std::error::Error as _;
use std::fmt;
use std::fmt::Display;
use std::rc::Rc;

use owo_colors::{OwoColorize, Stream};
use thiserror::Error;

/// Wrapper around the ways appending a record to the output file can fail
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to append record to the output file")]
    Io(#[from] std::io::Error),
}

/// Holds the flat key of the record whose write failed
#[derive(Debug)]
pub struct IndexedWriteError {
    pub location: String,
    pub error: WriteError,
}

impl IndexedWriteError {
    pub(crate) fn new(location: String, error: WriteError) -> Self {
        Self { location, error }
    }
}

impl fmt::Display for IndexedWriteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Record {}: {}", self.location, self.error)?;
        if let Some(source) = self.error.source() {
            write!(f, "; {source}")?;
        }
        Ok(())
    }
}

/// Storage for errors encountered while appending records.
/// Shared so the sink can collect while the caller keeps a handle to
/// inspect afterwards.
#[derive(Debug)]
pub struct Errors<E> {
    pub container: Rc<RefCell<Vec<E>>>,
}

impl<E> Errors<E> {
    pub fn new(container: Rc<RefCell<Vec<E>>>) -> Self {
        Self { container }
    }

    pub fn new_ref(&self) -> Self {
        Self {
            container: Rc::clone(&self.container),
        }
    }

    pub fn push(&self, value: E) {
        self.container.borrow_mut().push(value)
    }

    pub fn is_empty(&self) -> bool {
        self.container.borrow().is_empty()
    }
}

impl<E: Display> Errors<E> {
    pub fn eprint(&self) {
        let stream = Stream::Stdout;
        if !self.container.borrow().is_empty() {
            eprintln!("{}", self.if_supports_color(stream, |text| text.red()));
        }
    }
}

impl<E> Default for Errors<E> {
    fn default() -> Self {
        Self::new(Rc::new(RefCell::new(vec![])))
    }
}

impl<E: Display> fmt::Display for Errors<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for i in self.container.borrow().as_slice() {
            writeln!(f, "{i}")?;
        }
        Ok(())
    }
}
