//! The blocking RPC client.

use std::io::Write;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use jlrpc_common::{
    BatchOrSingle, JlrpcError, LineReader, Request, Response, Result, DEFAULT_READ_BUFFER_SIZE,
};

/// Timeout for establishing connections.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for [`RpcClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Capacity of the response line buffer; bounds the longest frame.
    pub read_buffer_size: usize,
    /// Optional bound on how long a call waits for each response frame.
    /// `None` blocks until the server answers or closes.
    pub read_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            read_timeout: None,
        }
    }
}

/// A blocking JSON Lines RPC client over one TCP connection.
///
/// Calls are issued sequentially: each [`call`](RpcClient::call) writes all
/// request frames, then reads response frames until every request that
/// carried an id has been answered, in arrival order. Notifications never
/// read.
#[derive(Debug)]
pub struct RpcClient {
    stream: TcpStream,
    reader: LineReader,
    read_timeout: Option<Duration>,
}

impl RpcClient {
    /// Connects with the default configuration.
    pub fn connect(addr: &str) -> Result<Self> {
        Self::with_config(addr, ClientConfig::default())
    }

    /// Connects to `addr`, trying each resolved address until one succeeds.
    pub fn with_config(addr: &str, config: ClientConfig) -> Result<Self> {
        let socket_addrs = addr
            .to_socket_addrs()
            .map_err(|e| JlrpcError::Connection(format!("invalid address '{addr}': {e}")))?;

        let mut last_err = None;
        for socket_addr in socket_addrs {
            match TcpStream::connect_timeout(&socket_addr, CONNECT_TIMEOUT) {
                Ok(stream) => {
                    stream.set_read_timeout(config.read_timeout).map_err(|e| {
                        JlrpcError::Connection(format!("failed to set read timeout: {e}"))
                    })?;
                    debug!(peer = %socket_addr, "connected");
                    return Ok(Self {
                        stream,
                        reader: LineReader::with_capacity(config.read_buffer_size),
                        read_timeout: config.read_timeout,
                    });
                }
                Err(e) => last_err = Some(e),
            }
        }

        Err(JlrpcError::Connection(format!(
            "failed to connect to {addr}: {}",
            last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no addresses resolved".to_string())
        )))
    }

    /// The connected peer address.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }

    /// Issues a call: writes every frame of `requests`, then reads one
    /// response frame per request that carries an id.
    ///
    /// Responses are returned in arrival order. Notifications inside the
    /// batch contribute no expected response; a batch consisting only of
    /// notifications is rejected with
    /// [`JlrpcError::EmptyInput`] before any bytes are written
    /// (use [`notify_all`](RpcClient::notify_all) for that).
    pub fn call(&mut self, requests: BatchOrSingle<Request>) -> Result<BatchOrSingle<Response>> {
        let expected = requests
            .iter()
            .filter(|request| !request.is_notification())
            .count();
        if expected == 0 {
            return Err(JlrpcError::EmptyInput);
        }

        self.stream.write_all(&requests.to_bytes()?)?;

        let mut responses = Vec::with_capacity(expected);
        while responses.len() < expected {
            let frame = self.next_frame()?;
            responses.push(Response::from_line(&frame)?);
        }
        BatchOrSingle::from_vec(responses)
    }

    /// Convenience wrapper around [`call`](RpcClient::call) for a single
    /// request.
    pub fn call_one(&mut self, request: Request) -> Result<Response> {
        match self.call(BatchOrSingle::one(request))? {
            BatchOrSingle::One(response) => Ok(response),
            BatchOrSingle::Many(_) => Err(JlrpcError::InvalidResponse(
                "one request answered by several responses".to_string(),
            )),
        }
    }

    /// Writes one request and never reads. Intended for notifications; a
    /// request that carries an id will be answered by the server, and that
    /// response stays unread until a later call consumes the stream.
    pub fn notify(&mut self, request: &Request) -> Result<()> {
        self.stream.write_all(&request.to_line()?)?;
        Ok(())
    }

    /// Writes a run of requests as concatenated frames and never reads.
    pub fn notify_all(&mut self, requests: &[Request]) -> Result<()> {
        let mut bytes = Vec::new();
        for request in requests {
            bytes.extend_from_slice(&request.to_line()?);
        }
        self.stream.write_all(&bytes)?;
        Ok(())
    }

    /// Reads exactly one frame, mapping a would-block under a configured
    /// read timeout to [`JlrpcError::Timeout`].
    fn next_frame(&mut self) -> Result<Vec<u8>> {
        loop {
            match self.reader.read_frame(&mut self.stream)? {
                Some(frame) => return Ok(frame.to_vec()),
                None => match self.read_timeout {
                    Some(timeout) => {
                        return Err(JlrpcError::Timeout(timeout.as_millis() as u64))
                    }
                    None => continue,
                },
            }
        }
    }
}
