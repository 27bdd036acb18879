//! Batch-or-single unification.
//!
//! A batch in jlrpc is a run of LF-delimited JSON objects inside one read
//! segment, not a JSON array. [`BatchOrSingle`] is the uniform container the
//! client call surface and the server hand around: parsing one line yields
//! `One`, two or more yield `Many`, zero fail as
//! [`JlrpcError::EmptyInput`](super::error::JlrpcError::EmptyInput).

use super::error::{JlrpcError, Result};
use super::request::Request;
use super::response::Response;

/// A framed JSON-RPC object: anything that can be parsed from and serialized
/// to a single JSON Lines record.
///
/// Implemented by [`Request`] and [`Response`]; [`BatchOrSingle`] is generic
/// over this seam rather than over the concrete types.
pub trait FramedMessage: Sized {
    /// Parses one record; a trailing LF is tolerated.
    fn from_line(line: &[u8]) -> Result<Self>;

    /// Serializes to one LF-terminated record.
    fn to_line(&self) -> Result<Vec<u8>>;
}

impl FramedMessage for Request {
    fn from_line(line: &[u8]) -> Result<Self> {
        Request::from_line(line)
    }

    fn to_line(&self) -> Result<Vec<u8>> {
        Request::to_line(self)
    }
}

impl FramedMessage for Response {
    fn from_line(line: &[u8]) -> Result<Self> {
        Response::from_line(line)
    }

    fn to_line(&self) -> Result<Vec<u8>> {
        Response::to_line(self)
    }
}

/// One framed object or an ordered batch of them.
///
/// # Example
///
/// ```
/// use jlrpc_common::protocol::{BatchOrSingle, Request, RequestId};
///
/// let batch = BatchOrSingle::many(vec![
///     Request::new("foo", Some(RequestId::Number(1))).unwrap(),
///     Request::notification("bar").unwrap(),
/// ]);
/// let bytes = batch.to_bytes().unwrap();
/// let parsed: BatchOrSingle<Request> = BatchOrSingle::from_bytes(&bytes).unwrap();
/// assert_eq!(parsed.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOrSingle<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> BatchOrSingle<T> {
    /// Wraps a single object.
    pub fn one(item: T) -> Self {
        BatchOrSingle::One(item)
    }

    /// Wraps an ordered batch. Intended for two or more elements; a
    /// one-element vector is normalized to `One` and an empty vector is
    /// rejected.
    pub fn many(items: Vec<T>) -> Self {
        BatchOrSingle::Many(items)
    }

    /// Builds from a vector, normalizing the cardinality.
    pub fn from_vec(mut items: Vec<T>) -> Result<Self> {
        match items.len() {
            0 => Err(JlrpcError::EmptyInput),
            1 => Ok(BatchOrSingle::One(items.remove(0))),
            _ => Ok(BatchOrSingle::Many(items)),
        }
    }

    /// Number of contained objects.
    pub fn len(&self) -> usize {
        match self {
            BatchOrSingle::One(_) => 1,
            BatchOrSingle::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `index`-th object, in wire order.
    pub fn get(&self, index: usize) -> Option<&T> {
        match self {
            BatchOrSingle::One(item) if index == 0 => Some(item),
            BatchOrSingle::One(_) => None,
            BatchOrSingle::Many(items) => items.get(index),
        }
    }

    /// Iterates the contained objects in wire order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let slice: &[T] = match self {
            BatchOrSingle::One(item) => std::slice::from_ref(item),
            BatchOrSingle::Many(items) => items,
        };
        slice.iter()
    }

    /// Consumes the container into a vector, preserving order.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            BatchOrSingle::One(item) => vec![item],
            BatchOrSingle::Many(items) => items,
        }
    }
}

impl<T: FramedMessage> BatchOrSingle<T> {
    /// Parses an LF-separated run of records.
    ///
    /// Empty lines are skipped; every remaining line must independently
    /// validate or the whole batch fails. Zero records fail as
    /// [`JlrpcError::EmptyInput`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut items = Vec::new();
        for line in bytes.split(|&b| b == b'\n') {
            if line.is_empty() {
                continue;
            }
            items.push(T::from_line(line)?);
        }
        Self::from_vec(items)
    }

    /// Serializes every record as its own LF-terminated line; the
    /// per-element terminator is the only separator.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for item in self.iter() {
            out.extend_from_slice(&item.to_line()?);
        }
        Ok(out)
    }
}

impl<'a, T> IntoIterator for &'a BatchOrSingle<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            BatchOrSingle::One(item) => std::slice::from_ref(item).iter(),
            BatchOrSingle::Many(items) => items.iter(),
        }
    }
}
