//*****************
//External crates
//*****************
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate slog;

//*****************
//Modules declaration
//*****************
pub mod logging;
pub mod message;
pub mod mobility;
pub mod router;
pub mod substrate;
pub mod tests;

//*****************
//Errors
//*****************
use std::error::Error;
use std::fmt;

/// Identity of a node in the network. Nodes are addressed by their unique name.
pub type NodeId = String;

/// Error struct for this crate
#[derive(Debug)]
pub struct DtnAodvError {
    pub cause: Option<Box<dyn Error>>,
    pub kind: DtnAodvErrorKind,
}

/// Types of errors produced in this crate
#[derive(Debug)]
pub enum DtnAodvErrorKind {
    /// Failures in configuration of the router
    Configuration(String),
    /// Failures related to [de]serializing data
    Serialization(String),
    /// The host's message store rejected an operation
    Storage(String),
}

impl Error for DtnAodvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self.cause {
            Some(ref cause) => Some(&**cause),
            None => None,
        }
    }
}

impl fmt::Display for DtnAodvError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl fmt::Display for DtnAodvErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DtnAodvErrorKind::Configuration(msg) => write!(f, "{}", msg),
            DtnAodvErrorKind::Serialization(msg) => write!(f, "{}", msg),
            DtnAodvErrorKind::Storage(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<DtnAodvErrorKind> for DtnAodvError {
    fn from(kind: DtnAodvErrorKind) -> DtnAodvError {
        DtnAodvError { cause: None, kind }
    }
}
