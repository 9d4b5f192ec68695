//! Blocking client
//!
//! Sends requests over one TCP connection and reads one reply each.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use crate::error::{FerroError, Result};
use crate::protocol::{read_value, write_request, Request, Value};

pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send a request and wait for its reply
    pub fn send(&mut self, request: &Request) -> Result<Value> {
        write_request(&mut self.writer, request)?;
        read_value(&mut self.reader)?.ok_or(FerroError::UnexpectedEof)
    }

    /// Convenience wrapper: `client.call(["SET", "k", "v"])`
    pub fn call<I, T>(&mut self, parts: I) -> Result<Value>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let request = Request::from_parts(parts)?;
        self.send(&request)
    }
}
