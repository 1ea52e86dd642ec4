use std::io::{BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::codec::{Reply, RespCodec};
use crate::error::{RespError, RespResult};

/// A single blocking connection to a RESP server.
///
/// Owns the TCP stream exclusively. Every command is one blocking round
/// trip bounded by the per-operation timeout; an expired timeout surfaces
/// as [`RespError::Timeout`]. The connection closes when the value drops.
pub struct RespConnection {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
    endpoint: String,
}

impl RespConnection {
    /// Connect to `host:port` within `connect_timeout`, then bound every
    /// subsequent read and write by `operation_timeout`.
    pub fn connect(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        operation_timeout: Duration,
    ) -> RespResult<Self> {
        let endpoint = format!("{host}:{port}");
        let connect_err = |reason: String| RespError::Connect {
            endpoint: endpoint.clone(),
            reason,
        };

        let addrs: Vec<_> = (host, port)
            .to_socket_addrs()
            .map_err(|e| connect_err(e.to_string()))?
            .collect();
        let mut stream = None;
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, connect_timeout) {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => last_err = Some(e),
            }
        }
        let stream = stream.ok_or_else(|| {
            let reason = last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no addresses resolved".to_string());
            connect_err(reason)
        })?;

        stream
            .set_read_timeout(Some(operation_timeout))
            .map_err(|e| connect_err(e.to_string()))?;
        stream
            .set_write_timeout(Some(operation_timeout))
            .map_err(|e| connect_err(e.to_string()))?;
        let reader = BufReader::new(stream.try_clone().map_err(|e| connect_err(e.to_string()))?);

        debug!(%endpoint, "connected to backing store");
        Ok(Self {
            stream,
            reader,
            endpoint,
        })
    }

    /// The `host:port` this connection was established against.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one command and read its reply.
    ///
    /// An `-ERR` reply from the server surfaces as [`RespError::Server`].
    pub fn command(&mut self, args: &[&[u8]]) -> RespResult<Reply> {
        let buf = RespCodec::encode_command(args);
        self.stream.write_all(&buf).map_err(RespError::from_io)?;
        self.stream.flush().map_err(RespError::from_io)?;
        match RespCodec::read_reply(&mut self.reader)? {
            Reply::Error(msg) => Err(RespError::Server(msg)),
            reply => Ok(reply),
        }
    }

    /// `PING` — verify the server is alive and speaking RESP.
    pub fn ping(&mut self) -> RespResult<()> {
        match self.command(&[b"PING"])? {
            Reply::Simple(s) if s == "PONG" => Ok(()),
            other => Err(unexpected("PING", &other)),
        }
    }

    /// `SET key value` — store a binary-safe value.
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> RespResult<()> {
        match self.command(&[b"SET", key, value])? {
            Reply::Simple(s) if s == "OK" => Ok(()),
            other => Err(unexpected("SET", &other)),
        }
    }

    /// `GET key` — fetch a value; `None` when the key is absent.
    pub fn get(&mut self, key: &[u8]) -> RespResult<Option<Vec<u8>>> {
        match self.command(&[b"GET", key])? {
            Reply::Bulk(data) => Ok(Some(data)),
            Reply::Nil => Ok(None),
            other => Err(unexpected("GET", &other)),
        }
    }

    /// `DEL key [key ...]` — returns how many keys were removed.
    pub fn del(&mut self, keys: &[&[u8]]) -> RespResult<u64> {
        let mut args: Vec<&[u8]> = Vec::with_capacity(1 + keys.len());
        args.push(b"DEL");
        args.extend_from_slice(keys);
        match self.command(&args)? {
            Reply::Integer(n) if n >= 0 => Ok(n as u64),
            other => Err(unexpected("DEL", &other)),
        }
    }

    /// One `SCAN` step: returns the next cursor and a batch of matching
    /// keys. A returned cursor of 0 means the iteration is complete.
    pub fn scan(&mut self, cursor: u64, pattern: &[u8], count: u64) -> RespResult<(u64, Vec<Vec<u8>>)> {
        let cursor_text = cursor.to_string();
        let count_text = count.to_string();
        let reply = self.command(&[
            b"SCAN",
            cursor_text.as_bytes(),
            b"MATCH",
            pattern,
            b"COUNT",
            count_text.as_bytes(),
        ])?;
        let items = match reply {
            Reply::Array(items) => items,
            other => return Err(unexpected("SCAN", &other)),
        };
        let mut items = items.into_iter();
        let (Some(cursor_reply), Some(keys_reply), None) =
            (items.next(), items.next(), items.next())
        else {
            return Err(RespError::Protocol("SCAN reply must have 2 elements".into()));
        };
        let cursor_bytes = match cursor_reply {
            Reply::Bulk(bytes) => bytes,
            other => return Err(unexpected("SCAN cursor", &other)),
        };
        let next_cursor: u64 = std::str::from_utf8(&cursor_bytes)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| RespError::Protocol("SCAN returned a non-numeric cursor".into()))?;
        let key_replies = match keys_reply {
            Reply::Array(key_replies) => key_replies,
            other => return Err(unexpected("SCAN keys", &other)),
        };
        let mut keys = Vec::with_capacity(key_replies.len());
        for key_reply in key_replies {
            match key_reply {
                Reply::Bulk(key) => keys.push(key),
                other => return Err(unexpected("SCAN key", &other)),
            }
        }
        Ok((next_cursor, keys))
    }
}

impl std::fmt::Debug for RespConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RespConnection")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

fn unexpected(command: &str, reply: &Reply) -> RespError {
    RespError::Protocol(format!("unexpected {command} reply: {reply:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader as StdBufReader, Write as _};
    use std::net::TcpListener;
    use std::thread;

    const SHORT: Duration = Duration::from_millis(500);

    /// Accept one connection and answer every line-framed command from a
    /// canned script. Enough server to exercise the client paths.
    fn one_shot_server(replies: Vec<&'static [u8]>) -> (String, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = StdBufReader::new(stream.try_clone().unwrap());
            let mut stream = stream;
            for reply in replies {
                // Consume the inbound command: the array header tells us
                // how many bulk strings follow (two lines each).
                let mut header = String::new();
                if reader.read_line(&mut header).unwrap() == 0 {
                    return;
                }
                let argc: usize = header.trim_start_matches('*').trim().parse().unwrap();
                let mut skip = String::new();
                for _ in 0..argc * 2 {
                    skip.clear();
                    reader.read_line(&mut skip).unwrap();
                }
                stream.write_all(reply).unwrap();
            }
        });
        ("127.0.0.1".to_string(), port)
    }

    #[test]
    fn ping_roundtrip() {
        let (host, port) = one_shot_server(vec![b"+PONG\r\n".as_slice()]);
        let mut conn = RespConnection::connect(&host, port, SHORT, SHORT).unwrap();
        conn.ping().unwrap();
    }

    #[test]
    fn get_and_set_helpers() {
        let (host, port) = one_shot_server(vec![
            b"+OK\r\n".as_slice(),
            b"$3\r\nabc\r\n".as_slice(),
            b"$-1\r\n".as_slice(),
        ]);
        let mut conn = RespConnection::connect(&host, port, SHORT, SHORT).unwrap();
        conn.set(b"k", b"abc").unwrap();
        assert_eq!(conn.get(b"k").unwrap(), Some(b"abc".to_vec()));
        assert_eq!(conn.get(b"missing").unwrap(), None);
    }

    #[test]
    fn server_error_reply_surfaces_as_server_error() {
        let (host, port) = one_shot_server(vec![b"-ERR boom\r\n".as_slice()]);
        let mut conn = RespConnection::connect(&host, port, SHORT, SHORT).unwrap();
        assert!(matches!(
            conn.command(&[b"GET", b"k"]),
            Err(RespError::Server(msg)) if msg.contains("boom")
        ));
    }

    #[test]
    fn scan_parses_cursor_and_keys() {
        let (host, port) =
            one_shot_server(vec![b"*2\r\n$1\r\n0\r\n*2\r\n$1\r\na\r\n$1\r\nb\r\n".as_slice()]);
        let mut conn = RespConnection::connect(&host, port, SHORT, SHORT).unwrap();
        let (cursor, keys) = conn.scan(0, b"*", 10).unwrap();
        assert_eq!(cursor, 0);
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn connect_to_unreachable_endpoint_fails() {
        // Bind a port, then drop the listener so nothing accepts there.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let result = RespConnection::connect("127.0.0.1", port, SHORT, SHORT);
        assert!(matches!(result, Err(RespError::Connect { .. })));
    }

    #[test]
    fn silent_server_times_out() {
        // Accepts the connection but never replies.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (_stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_secs(2));
        });
        let mut conn = RespConnection::connect("127.0.0.1", port, SHORT, SHORT).unwrap();
        assert!(matches!(conn.ping(), Err(RespError::Timeout)));
        drop(conn);
        handle.join().unwrap();
    }
}
